use chrono::{DateTime, Utc};
use serde::Serialize;

use super::monitor::QueryOutcome;
use crate::domain::exchange::ExchangeId;
use crate::domain::price::{PriceBoard, PriceRow};
use crate::shared::types::MarketType;
use crate::shared::utils::format_price;

/// Result of a one-shot lookup
#[derive(Debug, Serialize)]
pub struct LookupReport {
    pub token: String,
    pub market: MarketType,
    pub found: bool,
    pub rows: Vec<PriceRow>,

    // Метаданные
    pub exchanges_queried: Vec<ExchangeId>,
    pub timestamp: DateTime<Utc>,
}

impl LookupReport {
    pub fn new(
        token: &str,
        market: MarketType,
        exchanges_queried: Vec<ExchangeId>,
        outcome: &QueryOutcome,
    ) -> Self {
        let board = PriceBoard::from_resolution(&outcome.results);
        Self {
            token: token.to_string(),
            market,
            found: !board.is_empty(),
            rows: board.resolution_rows(&outcome.errors),
            exchanges_queried,
            timestamp: Utc::now(),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Plain-text table: exchange, symbol, price, change, then the error if any
pub fn format_table(rows: &[PriceRow]) -> String {
    let mut lines = vec![format!(
        "{:<12} {:<16} {:>18} {:>10}",
        "EXCHANGE", "SYMBOL", "PRICE", "CHANGE"
    )];
    for row in rows {
        let price = row.price.map(format_price).unwrap_or_else(|| "—".to_string());
        let mut line = format!(
            "{:<12} {:<16} {:>18} {:>10}",
            row.exchange.display_name(),
            row.symbol.as_deref().unwrap_or("—"),
            price,
            row.delta_text()
        );
        if let Some(error) = &row.error {
            line.push_str("  ");
            line.push_str(error);
        }
        lines.push(line.trim_end().to_string());
    }
    lines.join("\n")
}

/// `name: url` lines in display order
pub fn format_links(urls: &[(ExchangeId, String)]) -> String {
    urls.iter()
        .filter(|(_, url)| !url.is_empty())
        .map(|(id, url)| format!("{:<12} {}", id.display_name(), url))
        .collect::<Vec<_>>()
        .join("\n")
}

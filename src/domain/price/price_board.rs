//! Per-session board of bound symbols and baseline prices

use serde::Serialize;
use std::collections::HashMap;

use super::{PriceAnalyzer, PriceDelta};
use crate::domain::exchange::ExchangeId;
use crate::shared::types::ResolvedInstrument;

#[derive(Debug, Clone)]
struct Binding {
    symbol: String,
    url: String,
    baseline: f64,
}

/// One line of a result table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceRow {
    pub exchange: ExchangeId,
    pub symbol: Option<String>,
    pub price: Option<f64>,
    pub delta: Option<PriceDelta>,
    pub url: Option<String>,
    pub error: Option<String>,
}

impl PriceRow {
    /// Text of the change column
    pub fn delta_text(&self) -> String {
        match (self.price, self.delta, &self.error) {
            (Some(_), Some(delta), _) => delta.to_string(),
            (None, _, Some(_)) => "ERROR".to_string(),
            _ => "—".to_string(),
        }
    }
}

/// Symbols bound at first resolution together with their baseline prices.
///
/// Bindings are written once and never updated, so every refresh compares
/// against the price seen when the session started.
#[derive(Debug, Clone, Default)]
pub struct PriceBoard {
    bindings: HashMap<ExchangeId, Binding>,
}

impl PriceBoard {
    pub fn from_resolution(results: &HashMap<ExchangeId, ResolvedInstrument>) -> Self {
        let bindings = results
            .iter()
            .map(|(id, instrument)| {
                (
                    *id,
                    Binding {
                        symbol: instrument.symbol.clone(),
                        url: instrument.url.clone(),
                        baseline: instrument.price,
                    },
                )
            })
            .collect();
        Self { bindings }
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Exchange to symbol map used for refresh polls
    pub fn known_symbols(&self) -> HashMap<ExchangeId, String> {
        self.bindings
            .iter()
            .map(|(id, binding)| (*id, binding.symbol.clone()))
            .collect()
    }

    pub fn baseline(&self, exchange: ExchangeId) -> Option<f64> {
        self.bindings.get(&exchange).map(|b| b.baseline)
    }

    /// Venue links in display order
    pub fn urls(&self) -> Vec<(ExchangeId, String)> {
        let mut urls: Vec<_> = self
            .bindings
            .iter()
            .map(|(id, binding)| (*id, binding.url.clone()))
            .collect();
        urls.sort_by_key(|(id, _)| id.display_rank());
        urls
    }

    /// Rows for the first resolution: every price equals its own baseline.
    pub fn resolution_rows(&self, errors: &HashMap<ExchangeId, String>) -> Vec<PriceRow> {
        let prices = self
            .bindings
            .iter()
            .map(|(id, binding)| (*id, binding.baseline))
            .collect();
        self.rows(&prices, errors)
    }

    /// Rows for a refresh cycle. Bound exchanges that returned neither a
    /// price nor an error still get a row, without price.
    pub fn rows(
        &self,
        prices: &HashMap<ExchangeId, f64>,
        errors: &HashMap<ExchangeId, String>,
    ) -> Vec<PriceRow> {
        let mut exchanges: Vec<ExchangeId> = self.bindings.keys().copied().collect();
        for id in errors.keys() {
            if !exchanges.contains(id) {
                exchanges.push(*id);
            }
        }
        exchanges.sort_by_key(|id| id.display_rank());

        exchanges
            .into_iter()
            .map(|id| {
                let binding = self.bindings.get(&id);
                let price = if binding.is_some() {
                    prices.get(&id).copied()
                } else {
                    None
                };
                PriceRow {
                    exchange: id,
                    symbol: binding.map(|b| b.symbol.clone()),
                    price,
                    delta: PriceAnalyzer::delta(binding.map(|b| b.baseline), price),
                    url: binding.map(|b| b.url.clone()),
                    error: errors.get(&id).cloned(),
                }
            })
            .collect()
    }
}

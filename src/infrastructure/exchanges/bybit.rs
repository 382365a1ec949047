//! Bybit v5 market tickers (spot and linear)

use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;

use super::common::{fetch_json, first_present, parse_price, probe_by_price, RawPrice};
use crate::domain::exchange::symbol::{base_asset, strip_quote};
use crate::domain::exchange::{ExchangeClient, ExchangeId};
use crate::infrastructure::http::{HttpRequest, HttpTransport, RetryPolicy, RetryingClient};
use crate::shared::errors::ExchangeError;
use crate::shared::types::{MarketType, ResolvedInstrument};

pub const TICKERS_API: &str = "https://api.bybit.com/v5/market/tickers";

#[derive(Debug, Deserialize)]
struct TickersResponse {
    result: Option<TickersResult>,
}

#[derive(Debug, Deserialize)]
struct TickersResult {
    #[serde(default)]
    list: Vec<Ticker>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Ticker {
    last_price: Option<RawPrice>,
    price: Option<RawPrice>,
}

pub struct BybitClient {
    http: RetryingClient,
}

impl BybitClient {
    pub fn new(transport: Arc<dyn HttpTransport>, policy: RetryPolicy) -> Self {
        Self {
            http: RetryingClient::new(transport, ExchangeId::Bybit, policy),
        }
    }

    fn candidates(token: &str, market: MarketType) -> Vec<String> {
        let base = base_asset(token, None, market, &[]);
        if base.is_empty() {
            return Vec::new();
        }
        vec![format!("{}USDT", base)]
    }

    async fn fetch_ticker(&self, symbol: &str, market: MarketType) -> Result<Option<f64>, ExchangeError> {
        let category = match market {
            MarketType::Spot => "spot",
            MarketType::Perp => "linear",
        };
        let request = HttpRequest::get(TICKERS_API)
            .query("category", category)
            .query("symbol", symbol);
        let name = format!("bybit {} {}", category, symbol);

        let Some(response) = fetch_json::<TickersResponse>(&self.http, &request, &name).await else {
            return Ok(None);
        };
        let Some(ticker) = response.result.as_ref().and_then(|r| r.list.first()) else {
            return Ok(None);
        };

        let raw = match market {
            // some spot snapshots carry `price` instead of `lastPrice`
            MarketType::Spot => first_present(ticker.last_price.as_ref(), ticker.price.as_ref()),
            MarketType::Perp => ticker.last_price.as_ref(),
        };
        parse_price(self.id(), symbol, raw)
    }
}

#[async_trait]
impl ExchangeClient for BybitClient {
    fn id(&self) -> ExchangeId {
        ExchangeId::Bybit
    }

    fn spot_candidates(&self, token: &str) -> Vec<String> {
        Self::candidates(token, MarketType::Spot)
    }

    fn futures_candidates(&self, token: &str) -> Vec<String> {
        Self::candidates(token, MarketType::Perp)
    }

    async fn resolve_spot(&self, token: &str) -> Result<Option<ResolvedInstrument>, ExchangeError> {
        let candidates = self.spot_candidates(token);
        let found = probe_by_price(self.id(), &candidates, |symbol| {
            self.fetch_ticker(symbol, MarketType::Spot)
        })
        .await?;
        Ok(found.map(|(symbol, price)| ResolvedInstrument::new(symbol, price, self.spot_link(symbol))))
    }

    async fn spot_price(&self, symbol: &str) -> Result<Option<f64>, ExchangeError> {
        self.fetch_ticker(symbol, MarketType::Spot).await
    }

    fn spot_link(&self, symbol: &str) -> String {
        format!("https://www.bybit.com/spot/trade/{}/USDT", strip_quote(symbol))
    }

    async fn resolve_futures(&self, token: &str) -> Result<Option<ResolvedInstrument>, ExchangeError> {
        let candidates = self.futures_candidates(token);
        let found = probe_by_price(self.id(), &candidates, |symbol| {
            self.fetch_ticker(symbol, MarketType::Perp)
        })
        .await?;
        Ok(found.map(|(symbol, price)| ResolvedInstrument::new(symbol, price, self.futures_link(symbol))))
    }

    async fn futures_price(&self, symbol: &str) -> Result<Option<f64>, ExchangeError> {
        self.fetch_ticker(symbol, MarketType::Perp).await
    }

    fn futures_link(&self, symbol: &str) -> String {
        format!("https://www.bybit.com/trade/usdt/{}USDT", strip_quote(symbol))
    }
}

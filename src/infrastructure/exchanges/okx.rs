//! OKX spot and USDT swaps

use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;

use super::common::{fetch_json, parse_price, probe_by_price, RawPrice};
use crate::domain::exchange::symbol::base_asset;
use crate::domain::exchange::{ExchangeClient, ExchangeId};
use crate::infrastructure::http::{HttpRequest, HttpTransport, RetryPolicy, RetryingClient};
use crate::shared::errors::ExchangeError;
use crate::shared::types::{MarketType, ResolvedInstrument};

pub const TICKER_API: &str = "https://www.okx.com/api/v5/market/ticker";

#[derive(Debug, Deserialize)]
struct TickerResponse {
    #[serde(default)]
    data: Option<Vec<Ticker>>,
}

#[derive(Debug, Deserialize)]
struct Ticker {
    last: Option<RawPrice>,
}

pub struct OkxClient {
    http: RetryingClient,
}

impl OkxClient {
    pub fn new(transport: Arc<dyn HttpTransport>, policy: RetryPolicy) -> Self {
        Self {
            http: RetryingClient::new(transport, ExchangeId::Okx, policy),
        }
    }

    /// Instrument ids on OKX: `ETH-USDT` for spot, `ETH-USDT-SWAP` for swaps
    fn inst_id(token: &str, market: MarketType) -> Option<String> {
        let base = match market {
            MarketType::Spot => base_asset(token, Some('-'), market, &[]),
            MarketType::Perp => base_asset(token, Some('-'), market, &["SWAP"]),
        };
        if base.is_empty() {
            return None;
        }
        Some(match market {
            MarketType::Spot => format!("{}-USDT", base),
            MarketType::Perp => format!("{}-USDT-SWAP", base),
        })
    }

    async fn fetch_last(&self, inst_id: &str, label: &str) -> Result<Option<f64>, ExchangeError> {
        let request = HttpRequest::get(TICKER_API).query("instId", inst_id);
        let name = format!("okx {} {}", label, inst_id);
        let Some(response) = fetch_json::<TickerResponse>(&self.http, &request, &name).await else {
            return Ok(None);
        };
        let ticker = response.data.as_ref().and_then(|data| data.first());
        match ticker {
            Some(ticker) => parse_price(self.id(), inst_id, ticker.last.as_ref()),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl ExchangeClient for OkxClient {
    fn id(&self) -> ExchangeId {
        ExchangeId::Okx
    }

    fn spot_candidates(&self, token: &str) -> Vec<String> {
        Self::inst_id(token, MarketType::Spot).into_iter().collect()
    }

    fn futures_candidates(&self, token: &str) -> Vec<String> {
        Self::inst_id(token, MarketType::Perp).into_iter().collect()
    }

    async fn resolve_spot(&self, token: &str) -> Result<Option<ResolvedInstrument>, ExchangeError> {
        let candidates = self.spot_candidates(token);
        let found = probe_by_price(self.id(), &candidates, |inst_id| self.fetch_last(inst_id, "spot")).await?;
        Ok(found.map(|(inst_id, price)| ResolvedInstrument::new(inst_id, price, self.spot_link(inst_id))))
    }

    async fn spot_price(&self, symbol: &str) -> Result<Option<f64>, ExchangeError> {
        self.fetch_last(symbol, "spot price").await
    }

    fn spot_link(&self, symbol: &str) -> String {
        format!("https://www.okx.com/ru/trade-spot/{}", symbol)
    }

    async fn resolve_futures(&self, token: &str) -> Result<Option<ResolvedInstrument>, ExchangeError> {
        let candidates = self.futures_candidates(token);
        let found = probe_by_price(self.id(), &candidates, |inst_id| self.fetch_last(inst_id, "perp")).await?;
        Ok(found.map(|(inst_id, price)| ResolvedInstrument::new(inst_id, price, self.futures_link(inst_id))))
    }

    async fn futures_price(&self, symbol: &str) -> Result<Option<f64>, ExchangeError> {
        self.fetch_last(symbol, "perp price").await
    }

    fn futures_link(&self, symbol: &str) -> String {
        format!("https://www.okx.com/ru/trade-swap/{}", symbol)
    }
}

//! Bitget spot (v1 tickers list) and USDT-M mix contracts

use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;

use super::common::{fetch_json, first_present, parse_price, probe_by_price, RawPrice};
use crate::domain::exchange::symbol::base_asset;
use crate::domain::exchange::{ExchangeClient, ExchangeId};
use crate::infrastructure::http::{HttpRequest, HttpTransport, RetryPolicy, RetryingClient};
use crate::shared::errors::ExchangeError;
use crate::shared::types::{MarketType, ResolvedInstrument};

pub const SPOT_API: &str = "https://api.bitget.com/api/spot/v1/market/tickers";
pub const MIX_API: &str = "https://api.bitget.com/api/mix/v1/market/ticker";

const PRODUCT_TYPE: &str = "umcbl";

#[derive(Debug, Deserialize)]
struct SpotTickers {
    #[serde(default)]
    data: Vec<SpotTicker>,
}

#[derive(Debug, Deserialize)]
struct SpotTicker {
    #[serde(default)]
    symbol: String,
    close: Option<RawPrice>,
    last: Option<RawPrice>,
}

#[derive(Debug, Deserialize)]
struct MixResponse {
    data: Option<MixTicker>,
}

#[derive(Debug, Deserialize)]
struct MixTicker {
    last: Option<RawPrice>,
}

pub struct BitgetClient {
    http: RetryingClient,
}

impl BitgetClient {
    pub fn new(transport: Arc<dyn HttpTransport>, policy: RetryPolicy) -> Self {
        Self {
            http: RetryingClient::new(transport, ExchangeId::Bitget, policy),
        }
    }

    /// The spot endpoint may return the whole market; only the entry for
    /// `symbol` counts.
    async fn fetch_spot(&self, symbol: &str) -> Result<Option<f64>, ExchangeError> {
        let request = HttpRequest::get(SPOT_API).query("symbol", symbol);
        let name = format!("bitget spot {}", symbol);
        let Some(tickers) = fetch_json::<SpotTickers>(&self.http, &request, &name).await else {
            return Ok(None);
        };
        let wanted = symbol.to_ascii_uppercase();
        match tickers
            .data
            .iter()
            .find(|t| t.symbol.to_ascii_uppercase() == wanted)
        {
            Some(ticker) => parse_price(
                self.id(),
                symbol,
                first_present(ticker.close.as_ref(), ticker.last.as_ref()),
            ),
            None => Ok(None),
        }
    }

    async fn fetch_mix(&self, symbol: &str) -> Result<Option<f64>, ExchangeError> {
        let request = HttpRequest::get(MIX_API)
            .query("symbol", symbol)
            .query("productType", PRODUCT_TYPE);
        let name = format!("bitget mix {}", symbol);
        let Some(response) = fetch_json::<MixResponse>(&self.http, &request, &name).await else {
            return Ok(None);
        };
        match response.data {
            Some(ticker) => parse_price(self.id(), symbol, ticker.last.as_ref()),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl ExchangeClient for BitgetClient {
    fn id(&self) -> ExchangeId {
        ExchangeId::Bitget
    }

    fn spot_candidates(&self, token: &str) -> Vec<String> {
        let base = base_asset(token, None, MarketType::Spot, &["SPBL"]);
        if base.is_empty() {
            return Vec::new();
        }
        vec![format!("{}USDT", base)]
    }

    fn futures_candidates(&self, token: &str) -> Vec<String> {
        let base = base_asset(token, None, MarketType::Perp, &["UMCBL"]);
        if base.is_empty() {
            return Vec::new();
        }
        vec![format!("{}USDT_UMCBL", base)]
    }

    async fn resolve_spot(&self, token: &str) -> Result<Option<ResolvedInstrument>, ExchangeError> {
        let candidates = self.spot_candidates(token);
        let found = probe_by_price(self.id(), &candidates, |symbol| self.fetch_spot(symbol)).await?;
        Ok(found.map(|(symbol, price)| ResolvedInstrument::new(symbol, price, self.spot_link(symbol))))
    }

    async fn spot_price(&self, symbol: &str) -> Result<Option<f64>, ExchangeError> {
        self.fetch_spot(symbol).await
    }

    fn spot_link(&self, symbol: &str) -> String {
        let symbol = symbol.trim().to_ascii_uppercase();
        let base = symbol.strip_suffix("USDT").unwrap_or(&symbol);
        format!("https://www.bitget.com/spot/{}USDT_SPBL", base)
    }

    async fn resolve_futures(&self, token: &str) -> Result<Option<ResolvedInstrument>, ExchangeError> {
        let candidates = self.futures_candidates(token);
        let found = probe_by_price(self.id(), &candidates, |symbol| self.fetch_mix(symbol)).await?;
        Ok(found.map(|(symbol, price)| ResolvedInstrument::new(symbol, price, self.futures_link(symbol))))
    }

    async fn futures_price(&self, symbol: &str) -> Result<Option<f64>, ExchangeError> {
        self.fetch_mix(symbol).await
    }

    fn futures_link(&self, symbol: &str) -> String {
        format!("https://www.bitget.com/futures/usdt/{}", symbol)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::http::scripted::{Route, ScriptedTransport};
    use serde_json::json;

    fn bitget(transport: ScriptedTransport) -> BitgetClient {
        BitgetClient::new(Arc::new(transport), RetryPolicy::default())
    }

    #[test]
    fn test_candidates_strip_venue_suffixes() {
        let bitget = bitget(ScriptedTransport::new());
        assert_eq!(bitget.spot_candidates("arb"), vec!["ARBUSDT"]);
        assert_eq!(bitget.spot_candidates("ARBUSDT_SPBL"), vec!["ARBUSDT"]);
        assert_eq!(bitget.futures_candidates("arb"), vec!["ARBUSDT_UMCBL"]);
        assert_eq!(bitget.futures_candidates("ARBUSDT_UMCBL"), vec!["ARBUSDT_UMCBL"]);
        assert_eq!(bitget.futures_candidates("arb-perp"), vec!["ARBUSDT_UMCBL"]);
    }

    #[tokio::test]
    async fn test_spot_picks_matching_entry() {
        let bitget = bitget(ScriptedTransport::new().with(
            Route::get(SPOT_API).query("symbol", "ARBUSDT").json(
                200,
                json!({"code": "00000", "data": [
                    {"symbol": "BTCUSDT", "close": "64000"},
                    {"symbol": "ARBUSDT", "close": "", "last": "1.12"}
                ]}),
            ),
        ));

        let found = bitget.resolve_spot("arb").await.unwrap().unwrap();
        assert_eq!(found.symbol, "ARBUSDT");
        assert_eq!(found.price, 1.12);
        assert_eq!(found.url, "https://www.bitget.com/spot/ARBUSDT_SPBL");
    }

    #[tokio::test]
    async fn test_spot_without_matching_entry() {
        let bitget = bitget(ScriptedTransport::new().with(
            Route::get(SPOT_API).json(200, json!({"data": [{"symbol": "BTCUSDT", "close": "64000"}]})),
        ));
        assert_eq!(bitget.resolve_spot("arb").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_mix_contract() {
        let bitget = bitget(ScriptedTransport::new().with(
            Route::get(MIX_API)
                .query("symbol", "ARBUSDT_UMCBL")
                .query("productType", "umcbl")
                .json(200, json!({"code": "00000", "data": {"symbol": "ARBUSDT_UMCBL", "last": "1.13"}})),
        ));

        let found = bitget.resolve_futures("ARB").await.unwrap().unwrap();
        assert_eq!(found.symbol, "ARBUSDT_UMCBL");
        assert_eq!(found.url, "https://www.bitget.com/futures/usdt/ARBUSDT_UMCBL");
        assert_eq!(bitget.futures_price("ARBUSDT_UMCBL").await.unwrap(), Some(1.13));
    }
}

//! Binance spot and USDT-margined perpetuals

use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;

use super::common::{fetch_json, parse_price, probe_by_price, RawPrice};
use crate::domain::exchange::symbol::{base_asset, strip_quote};
use crate::domain::exchange::{ExchangeClient, ExchangeId};
use crate::infrastructure::http::{HttpRequest, HttpTransport, RetryPolicy, RetryingClient};
use crate::shared::errors::ExchangeError;
use crate::shared::types::{MarketType, ResolvedInstrument};

pub const SPOT_API: &str = "https://api.binance.com/api/v3/ticker/price";
pub const FUT_API: &str = "https://fapi.binance.com/fapi/v1/ticker/price";

#[derive(Debug, Deserialize)]
struct TickerPrice {
    price: Option<RawPrice>,
}

pub struct BinanceClient {
    http: RetryingClient,
}

impl BinanceClient {
    pub fn new(transport: Arc<dyn HttpTransport>, policy: RetryPolicy) -> Self {
        Self {
            http: RetryingClient::new(transport, ExchangeId::Binance, policy),
        }
    }

    fn candidates(token: &str, market: MarketType) -> Vec<String> {
        let base = base_asset(token, None, market, &[]);
        if base.is_empty() {
            return Vec::new();
        }
        vec![format!("{}USDT", base)]
    }

    async fn fetch_price(&self, api: &str, symbol: &str, label: &str) -> Result<Option<f64>, ExchangeError> {
        let request = HttpRequest::get(api).query("symbol", symbol);
        let name = format!("binance {} {}", label, symbol);
        match fetch_json::<TickerPrice>(&self.http, &request, &name).await {
            Some(ticker) => parse_price(self.id(), symbol, ticker.price.as_ref()),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl ExchangeClient for BinanceClient {
    fn id(&self) -> ExchangeId {
        ExchangeId::Binance
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
            self.fetch_price(SPOT_API, symbol, "spot")
        })
        .await?;
        Ok(found.map(|(symbol, price)| ResolvedInstrument::new(symbol, price, self.spot_link(symbol))))
    }

    async fn spot_price(&self, symbol: &str) -> Result<Option<f64>, ExchangeError> {
        self.fetch_price(SPOT_API, symbol, "spot price").await
    }

    fn spot_link(&self, symbol: &str) -> String {
        format!(
            "https://www.binance.com/en/trade/{}_USDT?type=spot",
            strip_quote(symbol)
        )
    }

    async fn resolve_futures(&self, token: &str) -> Result<Option<ResolvedInstrument>, ExchangeError> {
        let candidates = self.futures_candidates(token);
        let found = probe_by_price(self.id(), &candidates, |symbol| {
            self.fetch_price(FUT_API, symbol, "fut")
        })
        .await?;
        Ok(found.map(|(symbol, price)| ResolvedInstrument::new(symbol, price, self.futures_link(symbol))))
    }

    async fn futures_price(&self, symbol: &str) -> Result<Option<f64>, ExchangeError> {
        self.fetch_price(FUT_API, symbol, "fut price").await
    }

    fn futures_link(&self, symbol: &str) -> String {
        format!("https://www.binance.com/en/futures/{}USDT", strip_quote(symbol))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::http::scripted::{Route, ScriptedTransport};
    use serde_json::json;

    fn client(transport: ScriptedTransport) -> (BinanceClient, Arc<ScriptedTransport>) {
        let transport = Arc::new(transport);
        (BinanceClient::new(transport.clone(), RetryPolicy::default()), transport)
    }

    #[test]
    fn test_candidates() {
        let (binance, _) = client(ScriptedTransport::new());
        assert_eq!(binance.spot_candidates("eth"), vec!["ETHUSDT"]);
        assert_eq!(binance.spot_candidates(" eth/usdt "), vec!["ETHUSDT"]);
        assert_eq!(binance.futures_candidates("BTC-PERP"), vec!["BTCUSDT"]);
        assert_eq!(binance.futures_candidates("$sol"), vec!["SOLUSDT"]);
        assert_eq!(binance.spot_candidates("$SOL/USDT"), vec!["SOLUSDT"]);
        assert!(binance.futures_candidates("usdt").is_empty());
    }

    #[tokio::test]
    async fn test_resolve_futures() {
        let (binance, _) = client(ScriptedTransport::new().with(
            Route::get(FUT_API)
                .query("symbol", "ETHUSDT")
                .json(200, json!({"symbol": "ETHUSDT", "price": "3012.55"})),
        ));

        let found = binance.resolve_futures("eth").await.unwrap().unwrap();
        assert_eq!(found.symbol, "ETHUSDT");
        assert_eq!(found.price, 3012.55);
        assert_eq!(found.url, "https://www.binance.com/en/futures/ETHUSDT");
    }

    #[tokio::test]
    async fn test_unknown_symbol_is_not_an_error() {
        let (binance, transport) = client(ScriptedTransport::new().with(
            Route::get(SPOT_API).json(400, json!({"code": -1121, "msg": "Invalid symbol."})),
        ));

        assert_eq!(binance.resolve_spot("nope").await.unwrap(), None);
        assert_eq!(transport.count(SPOT_API), 1);
    }

    #[tokio::test]
    async fn test_known_symbol_price() {
        let (binance, _) = client(ScriptedTransport::new().with(
            Route::get(SPOT_API)
                .query("symbol", "BTCUSDT")
                .json(200, json!({"symbol": "BTCUSDT", "price": "64000.00"})),
        ));
        assert_eq!(binance.spot_price("BTCUSDT").await.unwrap(), Some(64000.0));
        assert_eq!(
            binance.spot_link("BTCUSDT"),
            "https://www.binance.com/en/trade/BTC_USDT?type=spot"
        );
    }
}

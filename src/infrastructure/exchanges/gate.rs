//! Gate spot pairs and USDT-settled futures.
//!
//! Gate's ticker endpoints do not reliably reject unknown instruments, so
//! resolution checks the pair/contract metadata endpoint first and only asks
//! for a price once that answers 200.

use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, info};

use super::common::{fetch_json, parse_price, RawPrice};
use crate::domain::exchange::symbol::base_asset;
use crate::domain::exchange::{ExchangeClient, ExchangeId};
use crate::infrastructure::http::{HttpRequest, HttpTransport, RetryPolicy, RetryingClient};
use crate::shared::errors::ExchangeError;
use crate::shared::types::{MarketType, ResolvedInstrument};

pub const SPOT_API_BASE: &str = "https://api.gateio.ws/api/v4";
pub const FX_API_BASE: &str = "https://fx-api.gateio.ws/api/v4";
const SETTLE: &str = "usdt";

#[derive(Debug, Deserialize)]
struct Ticker {
    last: Option<RawPrice>,
}

pub struct GateClient {
    http: RetryingClient,
}

impl GateClient {
    pub fn new(transport: Arc<dyn HttpTransport>, policy: RetryPolicy) -> Self {
        Self {
            http: RetryingClient::new(transport, ExchangeId::Gate, policy),
        }
    }

    pub fn spot_pair_url(pair: &str) -> String {
        format!("{}/spot/currency_pairs/{}", SPOT_API_BASE, pair)
    }

    pub fn contract_url(contract: &str) -> String {
        format!("{}/futures/{}/contracts/{}", FX_API_BASE, SETTLE, contract)
    }

    pub fn spot_tickers_url() -> String {
        format!("{}/spot/tickers", SPOT_API_BASE)
    }

    pub fn futures_tickers_url() -> String {
        format!("{}/futures/{}/tickers", FX_API_BASE, SETTLE)
    }

    fn candidate(token: &str, market: MarketType) -> Vec<String> {
        let base = base_asset(token, Some('_'), market, &[]);
        if base.is_empty() {
            return Vec::new();
        }
        vec![format!("{}_USDT", base)]
    }

    /// Metadata lookup; only a 200 counts as "listed"
    async fn exists(&self, url: String, name: &str) -> bool {
        match self.http.request(&HttpRequest::get(url), name).await {
            Some(response) => response.is_ok(),
            None => false,
        }
    }

    async fn fetch_last(
        &self,
        url: String,
        key: &str,
        symbol: &str,
    ) -> Result<Option<f64>, ExchangeError> {
        let request = HttpRequest::get(url).query(key, symbol);
        let name = format!("gate ticker {}", symbol);
        let Some(tickers) = fetch_json::<Vec<Ticker>>(&self.http, &request, &name).await else {
            return Ok(None);
        };
        match tickers.first() {
            Some(ticker) => parse_price(self.id(), symbol, ticker.last.as_ref()),
            None => {
                debug!("[gate] empty ticker list for {}", symbol);
                Ok(None)
            }
        }
    }

    async fn resolve_with<'a>(
        &self,
        candidates: &'a [String],
        market: MarketType,
    ) -> Result<Option<(&'a str, f64)>, ExchangeError> {
        let mut listed = None;
        for symbol in candidates {
            let (url, name) = match market {
                MarketType::Spot => (Self::spot_pair_url(symbol), format!("gate pair check {}", symbol)),
                MarketType::Perp => (Self::contract_url(symbol), format!("gate contract check {}", symbol)),
            };
            if self.exists(url, &name).await {
                info!("[gate] {} {} is listed", market, symbol);
                listed = Some(symbol.as_str());
                break;
            }
            debug!("[gate] {} {} is not listed", market, symbol);
        }

        let Some(symbol) = listed else {
            return Ok(None);
        };
        let price = self.price_for_symbol(symbol, market).await?;
        Ok(price.map(|price| (symbol, price)))
    }
}

#[async_trait]
impl ExchangeClient for GateClient {
    fn id(&self) -> ExchangeId {
        ExchangeId::Gate
    }

    fn spot_candidates(&self, token: &str) -> Vec<String> {
        Self::candidate(token, MarketType::Spot)
    }

    fn futures_candidates(&self, token: &str) -> Vec<String> {
        Self::candidate(token, MarketType::Perp)
    }

    async fn resolve_spot(&self, token: &str) -> Result<Option<ResolvedInstrument>, ExchangeError> {
        let candidates = self.spot_candidates(token);
        let found = self.resolve_with(&candidates, MarketType::Spot).await?;
        Ok(found.map(|(pair, price)| ResolvedInstrument::new(pair, price, self.spot_link(pair))))
    }

    async fn spot_price(&self, symbol: &str) -> Result<Option<f64>, ExchangeError> {
        self.fetch_last(Self::spot_tickers_url(), "currency_pair", symbol).await
    }

    fn spot_link(&self, symbol: &str) -> String {
        format!("https://www.gate.com/trade/{}", symbol)
    }

    async fn resolve_futures(&self, token: &str) -> Result<Option<ResolvedInstrument>, ExchangeError> {
        let candidates = self.futures_candidates(token);
        let found = self.resolve_with(&candidates, MarketType::Perp).await?;
        Ok(found.map(|(contract, price)| {
            ResolvedInstrument::new(contract, price, self.futures_link(contract))
        }))
    }

    async fn futures_price(&self, symbol: &str) -> Result<Option<f64>, ExchangeError> {
        self.fetch_last(Self::futures_tickers_url(), "contract", symbol).await
    }

    fn futures_link(&self, symbol: &str) -> String {
        format!("https://www.gate.com/futures/USDT/{}", symbol)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::http::scripted::{Route, ScriptedTransport};
    use serde_json::json;

    fn client(transport: ScriptedTransport) -> (GateClient, Arc<ScriptedTransport>) {
        let transport = Arc::new(transport);
        (GateClient::new(transport.clone(), RetryPolicy::default()), transport)
    }

    fn listed_contract(contract: &str, last: &str) -> ScriptedTransport {
        ScriptedTransport::new()
            .with(Route::get(&GateClient::contract_url(contract)).json(200, json!({"name": contract})))
            .with(
                Route::get(&GateClient::futures_tickers_url())
                    .query("contract", contract)
                    .json(200, json!([{"contract": contract, "last": last}])),
            )
    }

    #[test]
    fn test_candidates() {
        let (gate, _) = client(ScriptedTransport::new());
        assert_eq!(gate.spot_candidates("eth"), vec!["ETH_USDT"]);
        assert_eq!(gate.spot_candidates("eth/usdt"), vec!["ETH_USDT"]);
        assert_eq!(gate.futures_candidates("eth-perp"), vec!["ETH_USDT"]);
        assert_eq!(gate.futures_candidates("ETH_USDT"), vec!["ETH_USDT"]);
    }

    #[tokio::test]
    async fn test_resolve_checks_existence_then_price() {
        let (gate, transport) = client(listed_contract("ETH_USDT", "3005.2"));

        let found = gate.resolve_futures("eth").await.unwrap().unwrap();
        assert_eq!(found.symbol, "ETH_USDT");
        assert_eq!(found.price, 3005.2);
        assert_eq!(found.url, "https://www.gate.com/futures/USDT/ETH_USDT");

        let requests = transport.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].url, GateClient::contract_url("ETH_USDT"));
        assert_eq!(requests[1].query_value("contract"), Some("ETH_USDT"));
    }

    #[tokio::test]
    async fn test_unlisted_pair_skips_price_call() {
        let (gate, transport) = client(ScriptedTransport::new().with(
            Route::get(&GateClient::spot_pair_url("NOPE_USDT"))
                .json(400, json!({"label": "INVALID_CURRENCY_PAIR"})),
        ));

        assert_eq!(gate.resolve_spot("nope").await.unwrap(), None);
        assert_eq!(transport.count(&GateClient::spot_tickers_url()), 0);
    }

    #[tokio::test]
    async fn test_known_symbol_refresh_does_not_probe() {
        let (gate, transport) = client(listed_contract("BTC_USDT", "64000"));

        assert_eq!(gate.futures_price("BTC_USDT").await.unwrap(), Some(64000.0));
        assert_eq!(transport.count(&format!("{}/futures/usdt/contracts", FX_API_BASE)), 0);
    }

    #[tokio::test]
    async fn test_empty_ticker_list_is_not_found() {
        let (gate, _) = client(
            ScriptedTransport::new()
                .with(Route::get(&GateClient::contract_url("ETH_USDT")).json(200, json!({"name": "ETH_USDT"})))
                .with(Route::get(&GateClient::spot_tickers_url()).json(200, json!([])))
                .with(Route::get(&GateClient::futures_tickers_url()).json(200, json!([]))),
        );

        assert_eq!(gate.spot_price("ETH_USDT").await.unwrap(), None);
        assert_eq!(gate.futures_price("ETH_USDT").await.unwrap(), None);
        assert_eq!(gate.resolve_futures("eth").await.unwrap(), None);
    }
}

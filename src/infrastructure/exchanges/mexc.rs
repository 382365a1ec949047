//! MEXC spot and contract markets

use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;

use super::common::{fetch_json, first_present, parse_price, probe_by_price, RawPrice};
use crate::domain::exchange::symbol::{base_asset, strip_quote};
use crate::domain::exchange::{ExchangeClient, ExchangeId};
use crate::infrastructure::http::{HttpRequest, HttpTransport, RetryPolicy, RetryingClient};
use crate::shared::errors::ExchangeError;
use crate::shared::types::{MarketType, ResolvedInstrument};

pub const SPOT_API: &str = "https://api.mexc.com/api/v3/ticker/price";
pub const CONTRACT_API: &str = "https://contract.mexc.com/api/v1/contract/ticker";

#[derive(Debug, Deserialize)]
struct SpotTicker {
    price: Option<RawPrice>,
}

#[derive(Debug, Deserialize)]
struct ContractResponse {
    data: Option<ContractData>,
}

/// The contract endpoint returns either one ticker or a list of them
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ContractData {
    Many(Vec<ContractTicker>),
    One(ContractTicker),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ContractTicker {
    last_price: Option<RawPrice>,
    last: Option<RawPrice>,
}

impl ContractData {
    fn first(&self) -> Option<&ContractTicker> {
        match self {
            ContractData::Many(list) => list.first(),
            ContractData::One(ticker) => Some(ticker),
        }
    }
}

pub struct MexcClient {
    http: RetryingClient,
}

impl MexcClient {
    pub fn new(transport: Arc<dyn HttpTransport>, policy: RetryPolicy) -> Self {
        Self {
            http: RetryingClient::new(transport, ExchangeId::Mexc, policy),
        }
    }

    async fn fetch_spot(&self, symbol: &str) -> Result<Option<f64>, ExchangeError> {
        let request = HttpRequest::get(SPOT_API).query("symbol", symbol);
        let name = format!("mexc spot {}", symbol);
        match fetch_json::<SpotTicker>(&self.http, &request, &name).await {
            Some(ticker) => parse_price(self.id(), symbol, ticker.price.as_ref()),
            None => Ok(None),
        }
    }

    async fn fetch_contract(&self, symbol: &str) -> Result<Option<f64>, ExchangeError> {
        let request = HttpRequest::get(CONTRACT_API).query("symbol", symbol);
        let name = format!("mexc contract {}", symbol);
        let Some(response) = fetch_json::<ContractResponse>(&self.http, &request, &name).await else {
            return Ok(None);
        };
        match response.data.as_ref().and_then(ContractData::first) {
            Some(ticker) => parse_price(
                self.id(),
                symbol,
                first_present(ticker.last_price.as_ref(), ticker.last.as_ref()),
            ),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl ExchangeClient for MexcClient {
    fn id(&self) -> ExchangeId {
        ExchangeId::Mexc
    }

    fn spot_candidates(&self, token: &str) -> Vec<String> {
        let base = base_asset(token, None, MarketType::Spot, &[]);
        if base.is_empty() {
            return Vec::new();
        }
        vec![format!("{}USDT", base)]
    }

    /// Contracts are listed as `BTC_USDT`; the plain spelling is tried first
    fn futures_candidates(&self, token: &str) -> Vec<String> {
        let base = base_asset(token, None, MarketType::Perp, &[]);
        if base.is_empty() {
            return Vec::new();
        }
        vec![format!("{}USDT", base), format!("{}_USDT", base)]
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
        format!("https://www.mexc.com/exchange/{}_USDT", strip_quote(symbol))
    }

    async fn resolve_futures(&self, token: &str) -> Result<Option<ResolvedInstrument>, ExchangeError> {
        let candidates = self.futures_candidates(token);
        let found = probe_by_price(self.id(), &candidates, |symbol| self.fetch_contract(symbol)).await?;
        Ok(found.map(|(symbol, price)| ResolvedInstrument::new(symbol, price, self.futures_link(symbol))))
    }

    async fn futures_price(&self, symbol: &str) -> Result<Option<f64>, ExchangeError> {
        self.fetch_contract(symbol).await
    }

    fn futures_link(&self, symbol: &str) -> String {
        let symbol = symbol.trim().to_ascii_uppercase();
        let contract = match symbol.strip_suffix("USDT") {
            Some(base) if !symbol.contains('_') => format!("{}_USDT", base),
            _ => symbol.clone(),
        };
        format!("https://futures.mexc.com/exchange/{}", contract)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::http::scripted::{Route, ScriptedTransport};
    use serde_json::json;

    fn client(transport: ScriptedTransport) -> (MexcClient, Arc<ScriptedTransport>) {
        let transport = Arc::new(transport);
        (MexcClient::new(transport.clone(), RetryPolicy::default()), transport)
    }

    #[test]
    fn test_futures_candidates_order() {
        let (mexc, _) = client(ScriptedTransport::new());
        assert_eq!(mexc.futures_candidates("pepe"), vec!["PEPEUSDT", "PEPE_USDT"]);
        assert_eq!(mexc.futures_candidates("PEPE_USDT"), vec!["PEPEUSDT", "PEPE_USDT"]);
        assert_eq!(mexc.spot_candidates("pepe"), vec!["PEPEUSDT"]);
    }

    #[tokio::test]
    async fn test_second_candidate_resolves() {
        let (mexc, transport) = client(ScriptedTransport::new()
            .with(
                Route::get(CONTRACT_API)
                    .query("symbol", "PEPEUSDT")
                    .json(200, json!({"success": false, "code": 1001})),
            )
            .with(
                Route::get(CONTRACT_API)
                    .query("symbol", "PEPE_USDT")
                    .json(200, json!({"success": true, "data": {"symbol": "PEPE_USDT", "lastPrice": "0.0000112"}})),
            ));

        let found = mexc.resolve_futures("pepe").await.unwrap().unwrap();
        assert_eq!(found.symbol, "PEPE_USDT");
        assert_eq!(found.price, 0.0000112);
        assert_eq!(found.url, "https://futures.mexc.com/exchange/PEPE_USDT");
        assert_eq!(transport.count(CONTRACT_API), 2);
    }

    #[tokio::test]
    async fn test_contract_data_list_and_last_fallback() {
        let (mexc, _) = client(ScriptedTransport::new().with(
            Route::get(CONTRACT_API)
                .query("symbol", "BTC_USDT")
                .json(200, json!({"data": [{"symbol": "BTC_USDT", "last": "64000.1"}]})),
        ));
        assert_eq!(mexc.futures_price("BTC_USDT").await.unwrap(), Some(64000.1));
    }

    #[test]
    fn test_links() {
        let (mexc, _) = client(ScriptedTransport::new());
        assert_eq!(mexc.futures_link("BTCUSDT"), "https://futures.mexc.com/exchange/BTC_USDT");
        assert_eq!(mexc.futures_link("BTC_USDT"), "https://futures.mexc.com/exchange/BTC_USDT");
        assert_eq!(mexc.spot_link("BTCUSDT"), "https://www.mexc.com/exchange/BTC_USDT");
    }
}

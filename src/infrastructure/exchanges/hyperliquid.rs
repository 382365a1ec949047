//! Hyperliquid perpetuals via the public `info` endpoint. No spot support.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tracing::{info, warn};

use super::common::{fetch_json, parse_price, RawPrice};
use crate::domain::exchange::{ExchangeClient, ExchangeId};
use crate::infrastructure::http::{HttpRequest, HttpTransport, RetryPolicy, RetryingClient};
use crate::shared::errors::ExchangeError;
use crate::shared::types::ResolvedInstrument;

pub const INFO_API: &str = "https://api.hyperliquid.xyz/info";

const QUOTES: [&str; 3] = ["USDT", "USDC", "USD"];

#[derive(Debug, Deserialize)]
struct Meta {
    #[serde(default)]
    universe: Vec<Asset>,
}

#[derive(Debug, Deserialize)]
struct Asset {
    #[serde(default)]
    name: String,
}

pub struct HyperliquidClient {
    http: RetryingClient,
}

impl HyperliquidClient {
    pub fn new(transport: Arc<dyn HttpTransport>, policy: RetryPolicy) -> Self {
        Self {
            http: RetryingClient::new(transport, ExchangeId::Hyperliquid, policy),
        }
    }

    /// Upper-case coin name with `PERP`, punctuation and a trailing quote removed
    pub fn normalize_coin(token: &str) -> String {
        let mut coin: String = token
            .trim()
            .to_ascii_uppercase()
            .replace("PERP", "")
            .chars()
            .filter(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
            .collect();
        for quote in QUOTES {
            if let Some(rest) = coin.strip_suffix(quote) {
                coin = rest.to_string();
            }
        }
        coin
    }

    /// Exact universe entry, else the single entry containing the coin.
    /// Ambiguous or empty matches give `None`.
    pub fn match_coin(token: &str, universe: &BTreeSet<String>) -> Option<String> {
        let coin = Self::normalize_coin(token);
        if coin.is_empty() {
            return None;
        }
        if universe.contains(&coin) {
            return Some(coin);
        }
        let mut partial = universe.iter().filter(|name| name.contains(coin.as_str()));
        match (partial.next(), partial.next()) {
            (Some(only), None) => Some(only.clone()),
            _ => None,
        }
    }

    async fn fetch_universe(&self) -> Option<BTreeSet<String>> {
        let request = HttpRequest::post_json(INFO_API, json!({"type": "meta"}));
        let meta = fetch_json::<Meta>(&self.http, &request, "hyperliquid universe").await?;
        Some(
            meta.universe
                .into_iter()
                .map(|asset| asset.name.to_ascii_uppercase())
                .filter(|name| !name.is_empty())
                .collect(),
        )
    }

    async fn fetch_all_mids(&self) -> Option<HashMap<String, RawPrice>> {
        let request = HttpRequest::post_json(INFO_API, json!({"type": "allMids"}));
        let mids = fetch_json::<HashMap<String, RawPrice>>(&self.http, &request, "hyperliquid mids").await?;
        Some(
            mids.into_iter()
                .map(|(coin, price)| (coin.to_ascii_uppercase(), price))
                .collect(),
        )
    }
}

#[async_trait]
impl ExchangeClient for HyperliquidClient {
    fn id(&self) -> ExchangeId {
        ExchangeId::Hyperliquid
    }

    fn spot_candidates(&self, _token: &str) -> Vec<String> {
        Vec::new()
    }

    /// The normalized coin; the universe decides whether it is listed
    fn futures_candidates(&self, token: &str) -> Vec<String> {
        let coin = Self::normalize_coin(token);
        if coin.is_empty() {
            Vec::new()
        } else {
            vec![coin]
        }
    }

    async fn resolve_spot(&self, _token: &str) -> Result<Option<ResolvedInstrument>, ExchangeError> {
        Ok(None)
    }

    async fn spot_price(&self, _symbol: &str) -> Result<Option<f64>, ExchangeError> {
        Ok(None)
    }

    fn spot_link(&self, _symbol: &str) -> String {
        String::new()
    }

    async fn resolve_futures(&self, token: &str) -> Result<Option<ResolvedInstrument>, ExchangeError> {
        let Some(universe) = self.fetch_universe().await else {
            return Ok(None);
        };
        let Some(coin) = Self::match_coin(token, &universe) else {
            info!("[hyperliquid] '{}' is not in the universe", token);
            return Ok(None);
        };

        match self.futures_price(&coin).await? {
            Some(price) => {
                let url = self.futures_link(&coin);
                Ok(Some(ResolvedInstrument::new(coin, price, url)))
            }
            None => {
                warn!("[hyperliquid] no mid price for {}", coin);
                Ok(None)
            }
        }
    }

    /// Mid price keyed by the upper-case coin, whatever prefix the UI shows
    async fn futures_price(&self, symbol: &str) -> Result<Option<f64>, ExchangeError> {
        let Some(mids) = self.fetch_all_mids().await else {
            return Ok(None);
        };
        let key = symbol.to_ascii_uppercase();
        parse_price(self.id(), &key, mids.get(&key))
    }

    fn futures_link(&self, symbol: &str) -> String {
        format!("https://app.hyperliquid.xyz/trade/{}", symbol)
    }
}

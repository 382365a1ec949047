//! Fan-out over every enabled exchange client

use futures::future::join_all;
use futures::FutureExt;
use std::any::Any;
use std::collections::HashMap;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::domain::exchange::{ExchangeClient, ExchangeId};
use crate::shared::errors::ExchangeError;
use crate::shared::types::{MarketType, ResolvedInstrument};

/// Outcome of a full resolution across exchanges
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryOutcome {
    pub results: HashMap<ExchangeId, ResolvedInstrument>,
    pub errors: HashMap<ExchangeId, String>,
}

impl QueryOutcome {
    /// No venue listed the token and none failed
    pub fn is_not_found(&self) -> bool {
        self.results.is_empty() && self.errors.is_empty()
    }
}

/// Outcome of a known-symbol refresh
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceRefresh {
    pub prices: HashMap<ExchangeId, f64>,
    pub errors: HashMap<ExchangeId, String>,
}

/// Runs the same operation on all clients concurrently and merges the
/// per-exchange outcomes. A failing or panicking branch only lands in the
/// errors map; its siblings are unaffected.
pub struct Monitor {
    clients: Vec<Arc<dyn ExchangeClient>>,
}

impl Monitor {
    pub fn new(clients: Vec<Arc<dyn ExchangeClient>>) -> Self {
        Self { clients }
    }

    pub fn exchanges(&self) -> Vec<ExchangeId> {
        self.clients.iter().map(|c| c.id()).collect()
    }

    fn client(&self, id: ExchangeId) -> Option<&Arc<dyn ExchangeClient>> {
        self.clients.iter().find(|c| c.id() == id)
    }

    /// Full symbol search on every client supporting `market`
    pub async fn query(&self, token: &str, market: MarketType) -> QueryOutcome {
        let branches = self
            .clients
            .iter()
            .filter(|client| {
                let supported = client.supports(market);
                if !supported {
                    debug!("{} has no {} market, skipped", client.id(), market);
                }
                supported
            })
            .map(|client| {
                let id = client.id();
                async move { (id, guarded(id, client.resolve(token, market)).await) }
            });

        let mut outcome = QueryOutcome::default();
        for (id, result) in join_all(branches).await {
            match result {
                Ok(Some(instrument)) => {
                    info!(
                        "✅ {}: {} = {} ({})",
                        id, instrument.symbol, instrument.price, instrument.url
                    );
                    outcome.results.insert(id, instrument);
                }
                Ok(None) => debug!("{}: {} not listed", id, token),
                Err(err) => {
                    warn!("❌ {}", err);
                    outcome.errors.insert(id, err.to_string());
                }
            }
        }
        outcome
    }

    /// Price refresh for symbols bound by an earlier `query`. Exchanges that
    /// are not in this monitor, or do not support `market`, are skipped.
    pub async fn fetch_prices_for_known_symbols(
        &self,
        known_symbols: &HashMap<ExchangeId, String>,
        market: MarketType,
    ) -> PriceRefresh {
        let branches = known_symbols.iter().filter_map(|(&id, symbol)| {
            let Some(client) = self.client(id) else {
                debug!("no client for {}, skipped", id);
                return None;
            };
            if !client.supports(market) {
                return None;
            }
            Some(async move {
                (id, guarded(id, client.price_for_symbol(symbol, market)).await)
            })
        });

        let mut refresh = PriceRefresh::default();
        for (id, result) in join_all(branches).await {
            match result {
                Ok(Some(price)) => {
                    refresh.prices.insert(id, price);
                }
                Ok(None) => debug!("{}: no price this cycle", id),
                Err(err) => {
                    warn!("❌ {}", err);
                    refresh.errors.insert(id, err.to_string());
                }
            }
        }
        refresh
    }
}

/// Awaits one branch, turning a panic into an error for that exchange
async fn guarded<T, F>(exchange: ExchangeId, branch: F) -> Result<T, ExchangeError>
where
    F: Future<Output = Result<T, ExchangeError>>,
{
    match AssertUnwindSafe(branch).catch_unwind().await {
        Ok(result) => result,
        Err(payload) => Err(ExchangeError::Panicked {
            exchange,
            detail: panic_message(payload.as_ref()),
        }),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg.to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

//! Exchange client capability contract

use async_trait::async_trait;

use super::ExchangeId;
use crate::shared::errors::ExchangeError;
use crate::shared::types::{MarketType, ResolvedInstrument};

/// Common interface for all exchange adapters.
///
/// Resolution methods return `Ok(None)` when the token is simply not listed
/// (or the venue did not answer). `Err` is reserved for payloads the adapter
/// cannot interpret; the monitor records those per exchange.
#[async_trait]
pub trait ExchangeClient: Send + Sync {
    fn id(&self) -> ExchangeId;

    fn name(&self) -> &'static str {
        self.id().as_str()
    }

    /// Static capability flag, checked before any request is made
    fn supports(&self, market: MarketType) -> bool {
        self.id().supports(market)
    }

    /// Venue-specific spellings to try for a spot pair, in order
    fn spot_candidates(&self, token: &str) -> Vec<String>;

    /// Venue-specific spellings to try for a perpetual contract, in order
    fn futures_candidates(&self, token: &str) -> Vec<String>;

    async fn resolve_spot(&self, token: &str) -> Result<Option<ResolvedInstrument>, ExchangeError>;

    async fn spot_price(&self, symbol: &str) -> Result<Option<f64>, ExchangeError>;

    fn spot_link(&self, symbol: &str) -> String;

    async fn resolve_futures(
        &self,
        token: &str,
    ) -> Result<Option<ResolvedInstrument>, ExchangeError>;

    async fn futures_price(&self, symbol: &str) -> Result<Option<f64>, ExchangeError>;

    fn futures_link(&self, symbol: &str) -> String;

    async fn resolve(
        &self,
        token: &str,
        market: MarketType,
    ) -> Result<Option<ResolvedInstrument>, ExchangeError> {
        match market {
            MarketType::Spot => self.resolve_spot(token).await,
            MarketType::Perp => self.resolve_futures(token).await,
        }
    }

    /// Price for a symbol bound by an earlier resolution. Never re-runs
    /// candidate generation or existence checks.
    async fn price_for_symbol(
        &self,
        symbol: &str,
        market: MarketType,
    ) -> Result<Option<f64>, ExchangeError> {
        match market {
            MarketType::Spot => self.spot_price(symbol).await,
            MarketType::Perp => self.futures_price(symbol).await,
        }
    }

    fn link(&self, symbol: &str, market: MarketType) -> String {
        match market {
            MarketType::Spot => self.spot_link(symbol),
            MarketType::Perp => self.futures_link(symbol),
        }
    }
}

//! Registry of supported centralized exchanges

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::shared::errors::AppError;
use crate::shared::types::MarketType;

/// Supported exchanges, declared in display priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExchangeId {
    Gate,
    Hyperliquid,
    Binance,
    Okx,
    Bybit,
    Mexc,
    Bitget,
}

impl ExchangeId {
    /// All exchanges in display priority order
    pub fn all() -> &'static [ExchangeId] {
        &[
            ExchangeId::Gate,
            ExchangeId::Hyperliquid,
            ExchangeId::Binance,
            ExchangeId::Okx,
            ExchangeId::Bybit,
            ExchangeId::Mexc,
            ExchangeId::Bitget,
        ]
    }

    /// Name used in configuration files and result maps
    pub fn as_str(&self) -> &'static str {
        match self {
            ExchangeId::Gate => "gate",
            ExchangeId::Hyperliquid => "hyperliquid",
            ExchangeId::Binance => "binance",
            ExchangeId::Okx => "okx",
            ExchangeId::Bybit => "bybit",
            ExchangeId::Mexc => "mexc",
            ExchangeId::Bitget => "bitget",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ExchangeId::Gate => "Gate",
            ExchangeId::Hyperliquid => "Hyperliquid",
            ExchangeId::Binance => "Binance",
            ExchangeId::Okx => "OKX",
            ExchangeId::Bybit => "Bybit",
            ExchangeId::Mexc => "MEXC",
            ExchangeId::Bitget => "Bitget",
        }
    }

    /// Position in result tables, lower comes first
    pub fn display_rank(&self) -> usize {
        Self::all()
            .iter()
            .position(|id| id == self)
            .unwrap_or(usize::MAX)
    }

    /// Whether the venue lists the given market at all.
    /// Hyperliquid only trades perpetuals.
    pub fn supports(&self, market: MarketType) -> bool {
        match (self, market) {
            (ExchangeId::Hyperliquid, MarketType::Spot) => false,
            _ => true,
        }
    }
}

impl fmt::Display for ExchangeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExchangeId {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_ascii_lowercase();
        Self::all()
            .iter()
            .copied()
            .find(|id| id.as_str() == name || (name == "gateio" && *id == ExchangeId::Gate))
            .ok_or(AppError::UnknownExchange(name))
    }
}

//! Common types used across the application

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::shared::errors::AppError;

/// Market selected for a monitoring session. Fixed for the whole session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarketType {
    Spot,
    #[serde(alias = "futures", alias = "perpetual")]
    Perp,
}

impl MarketType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MarketType::Spot => "spot",
            MarketType::Perp => "perp",
        }
    }

    /// Label used in status lines
    pub fn label(&self) -> &'static str {
        match self {
            MarketType::Spot => "Spot",
            MarketType::Perp => "Futures",
        }
    }
}

impl fmt::Display for MarketType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MarketType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "spot" => Ok(MarketType::Spot),
            "perp" | "futures" | "perpetual" => Ok(MarketType::Perp),
            other => Err(AppError::InvalidMarketType(other.to_string())),
        }
    }
}

/// Instrument found for a token on one exchange
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedInstrument {
    /// Exchange-native identifier, reused verbatim for every refresh
    pub symbol: String,
    pub price: f64,
    /// Trading page on the venue's website
    pub url: String,
}

impl ResolvedInstrument {
    pub fn new(symbol: impl Into<String>, price: f64, url: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            price,
            url: url.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_market_type_parsing() {
        assert_eq!("spot".parse::<MarketType>().unwrap(), MarketType::Spot);
        assert_eq!(" PERP ".parse::<MarketType>().unwrap(), MarketType::Perp);
        assert_eq!("Futures".parse::<MarketType>().unwrap(), MarketType::Perp);
        assert!(matches!(
            "margin".parse::<MarketType>(),
            Err(AppError::InvalidMarketType(_))
        ));
    }

    #[test]
    fn test_market_type_serde_aliases() {
        #[derive(Deserialize)]
        struct Wrapper {
            market: MarketType,
        }
        let w: Wrapper = toml::from_str("market = \"futures\"").unwrap();
        assert_eq!(w.market, MarketType::Perp);
        let w: Wrapper = toml::from_str("market = \"spot\"").unwrap();
        assert_eq!(w.market, MarketType::Spot);
    }
}

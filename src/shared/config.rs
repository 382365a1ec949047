use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::domain::exchange::ExchangeId;
use crate::shared::errors::AppError;
use crate::shared::types::MarketType;

/// Network settings shared by every exchange client of a session
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct NetworkCfg {
    pub timeout_secs: u64,
    pub max_retries: u32,
}

impl Default for NetworkCfg {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            max_retries: 3,
        }
    }
}

impl NetworkCfg {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct MonitorCfg {
    pub interval_secs: u64,
    pub market: MarketType,
    pub track_prices: bool,
    pub exchanges: Vec<String>,
}

impl Default for MonitorCfg {
    fn default() -> Self {
        Self {
            interval_secs: 5,
            market: MarketType::Perp,
            track_prices: true,
            exchanges: ExchangeId::all()
                .iter()
                .map(|id| id.as_str().to_string())
                .collect(),
        }
    }
}

impl MonitorCfg {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub network: NetworkCfg,
    pub monitor: MonitorCfg,
}

impl AppConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, AppError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            AppError::ConfigError(format!("Failed to read config file {}: {}", path.display(), e))
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, AppError> {
        let cfg: Self = toml::from_str(content)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reject settings the core cannot run with
    pub fn validate(&self) -> Result<(), AppError> {
        if self.network.max_retries == 0 {
            return Err(AppError::ConfigError("network.max_retries must be at least 1".into()));
        }
        if self.network.timeout_secs == 0 {
            return Err(AppError::ConfigError("network.timeout_secs must be at least 1".into()));
        }
        if self.monitor.interval_secs == 0 {
            return Err(AppError::ConfigError("monitor.interval_secs must be at least 1".into()));
        }
        self.enabled_exchanges().map(|_| ())
    }

    /// Parsed exchange list, in configured order, without duplicates
    pub fn enabled_exchanges(&self) -> Result<Vec<ExchangeId>, AppError> {
        let mut ids = Vec::with_capacity(self.monitor.exchanges.len());
        for name in &self.monitor.exchanges {
            let id: ExchangeId = name.parse()?;
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
        if ids.is_empty() {
            return Err(AppError::NoExchangesEnabled);
        }
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.network.timeout(), Duration::from_secs(10));
        assert_eq!(cfg.network.max_retries, 3);
        assert_eq!(cfg.monitor.interval(), Duration::from_secs(5));
        assert!(cfg.monitor.track_prices);
        assert_eq!(cfg.enabled_exchanges().unwrap().len(), 7);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let cfg = AppConfig::from_toml(
            r#"
            [monitor]
            market = "spot"
            exchanges = ["binance", "okx", "binance"]
            "#,
        )
        .unwrap();
        assert_eq!(cfg.monitor.market, MarketType::Spot);
        assert_eq!(cfg.network.max_retries, 3);
        assert_eq!(
            cfg.enabled_exchanges().unwrap(),
            vec![ExchangeId::Binance, ExchangeId::Okx]
        );
    }

    #[test]
    fn test_unknown_exchange_rejected() {
        let err = AppConfig::from_toml("[monitor]\nexchanges = [\"kraken\"]").unwrap_err();
        assert!(matches!(err, AppError::UnknownExchange(name) if name == "kraken"));
    }

    #[test]
    fn test_zero_retries_rejected() {
        let err = AppConfig::from_toml("[network]\nmax_retries = 0").unwrap_err();
        assert!(matches!(err, AppError::ConfigError(_)));
    }

    #[test]
    fn test_empty_exchange_list_rejected() {
        let err = AppConfig::from_toml("[monitor]\nexchanges = []").unwrap_err();
        assert!(matches!(err, AppError::NoExchangesEnabled));
    }
}

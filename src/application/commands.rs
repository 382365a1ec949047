//! CLI commands and handlers
use clap::{Parser, Subcommand};
use std::sync::Arc;
use tracing::{info, warn};

use crate::application::monitor::Monitor;
use crate::application::report::{format_links, format_table, LookupReport};
use crate::application::session::{
    MonitoringSession, SessionConfig, SessionEnd, SessionReporter, StatusLine,
};
use crate::domain::exchange::ExchangeId;
use crate::domain::price::PriceRow;
use crate::infrastructure::exchanges::ExchangeFactory;
use crate::infrastructure::http::{HttpTransport, ReqwestTransport, RetryPolicy};
use crate::shared::config::AppConfig;
use crate::shared::errors::AppError;
use crate::shared::types::MarketType;

#[derive(Parser)]
#[command(name = "trade-helper", version)]
#[command(about = "Find a token on CEX spot and perpetual markets and watch its price")]
pub struct Cli {
    /// Path to config file (optional)
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Per-request timeout in seconds (overrides config)
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// Attempts per request (overrides config)
    #[arg(long, global = true)]
    pub retries: Option<u32>,

    /// Debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// CLI has higher priority than the config file
    pub fn apply_network_overrides(&self, config: &mut AppConfig) {
        if let Some(timeout) = self.timeout {
            config.network.timeout_secs = timeout;
        }
        if let Some(retries) = self.retries {
            config.network.max_retries = retries;
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Resolve a token on every exchange, then refresh its prices
    Watch {
        /// Token, e.g. ETH, eth/usdt, BTC-PERP
        token: String,

        /// Market type (spot, perp)
        #[arg(short, long)]
        market: Option<MarketType>,

        /// Refresh interval in seconds
        #[arg(short, long)]
        interval: Option<u64>,

        /// Comma-separated exchange list
        #[arg(short, long, value_delimiter = ',')]
        exchanges: Option<Vec<String>>,

        /// Print the first table and exit
        #[arg(long)]
        once: bool,

        /// Stop after N refresh cycles
        #[arg(long)]
        cycles: Option<u64>,
    },

    /// Resolve a token once and print the result
    Lookup {
        token: String,

        /// Market type (spot, perp)
        #[arg(short, long)]
        market: Option<MarketType>,

        /// Comma-separated exchange list
        #[arg(short, long, value_delimiter = ',')]
        exchanges: Option<Vec<String>>,

        /// Print a JSON report instead of a table
        #[arg(long)]
        json: bool,
    },

    /// List supported exchanges and their markets
    Exchanges,
}

/// Prints session tables to stdout
#[derive(Debug, Default)]
pub struct ConsoleReporter;

impl SessionReporter for ConsoleReporter {
    fn on_resolved(&mut self, status: &StatusLine, rows: &[PriceRow], urls: &[(ExchangeId, String)]) {
        println!("\n{}\n{}", status, format_table(rows));
        let links = format_links(urls);
        if !links.is_empty() {
            println!("\n{}", links);
        }
    }

    fn on_refresh(&mut self, status: &StatusLine, rows: &[PriceRow]) {
        println!("\n{}\n{}", status, format_table(rows));
    }

    fn on_not_found(&mut self, token: &str, market: MarketType) {
        println!("Symbol not found: {} ({})", token, market.label());
    }
}

pub struct CommandExecutor;

impl CommandExecutor {
    /// Execute the selected command
    pub async fn execute(command: Commands, config: AppConfig) -> Result<(), AppError> {
        match command {
            Commands::Watch { token, market, interval, exchanges, once, cycles } => {
                let mut config = config;
                if let Some(market) = market {
                    config.monitor.market = market;
                }
                if let Some(interval) = interval {
                    config.monitor.interval_secs = interval;
                }
                if let Some(exchanges) = exchanges {
                    config.monitor.exchanges = exchanges;
                }
                if once {
                    config.monitor.track_prices = false;
                }
                Self::execute_watch_command(&token, cycles, config).await
            }
            Commands::Lookup { token, market, exchanges, json } => {
                let mut config = config;
                if let Some(market) = market {
                    config.monitor.market = market;
                }
                if let Some(exchanges) = exchanges {
                    config.monitor.exchanges = exchanges;
                }
                Self::execute_lookup_command(&token, json, config).await
            }
            Commands::Exchanges => Self::execute_exchanges_command(),
        }
    }

    /// Execute watch command
    async fn execute_watch_command(
        token: &str,
        cycles: Option<u64>,
        config: AppConfig,
    ) -> Result<(), AppError> {
        let token = validate_token(token)?;
        config.validate()?;
        let monitor = build_monitor(&config)?;

        info!("🚀 Запуск мониторинга {}", token);
        info!("   Рынок: {}", config.monitor.market.label());
        info!("   Интервал обновления: {}s", config.monitor.interval_secs);
        info!("   Биржи: {}", config.monitor.exchanges.join(", "));

        let session_config = SessionConfig {
            token: token.clone(),
            market: config.monitor.market,
            interval: config.monitor.interval(),
            track_prices: config.monitor.track_prices,
            max_cycles: cycles,
        };
        let session = MonitoringSession::new(monitor, session_config);

        let mut reporter = ConsoleReporter;
        let summary = session.run(&mut reporter, shutdown_signal()).await;
        info!(
            "✅ Сессия {} завершена: {:?}, циклов: {}",
            summary.id, summary.end, summary.cycles
        );

        match summary.end {
            SessionEnd::NotFound => Err(AppError::SymbolNotFound(token)),
            _ => Ok(()),
        }
    }

    /// Execute lookup command
    async fn execute_lookup_command(token: &str, json: bool, config: AppConfig) -> Result<(), AppError> {
        let token = validate_token(token)?;
        config.validate()?;
        let market = config.monitor.market;
        let monitor = build_monitor(&config)?;

        info!("🔍 Поиск {} ({})...", token, market.label());
        let outcome = monitor.query(&token, market).await;
        let report = LookupReport::new(&token, market, monitor.exchanges(), &outcome);

        if json {
            let body = report
                .to_json()
                .map_err(|e| AppError::ConfigError(format!("Failed to serialize report: {}", e)))?;
            println!("{}", body);
        } else if outcome.is_not_found() {
            ConsoleReporter.on_not_found(&token, market);
        } else {
            println!("{}", format_table(&report.rows));
        }

        if outcome.is_not_found() {
            return Err(AppError::SymbolNotFound(token));
        }
        Ok(())
    }

    /// Execute exchanges command
    fn execute_exchanges_command() -> Result<(), AppError> {
        println!("{:<12} {:<6} {:<6}", "EXCHANGE", "SPOT", "PERP");
        for id in ExchangeId::all() {
            let mark = |market: MarketType| if id.supports(market) { "yes" } else { "-" };
            println!(
                "{:<12} {:<6} {:<6}",
                id.as_str(),
                mark(MarketType::Spot),
                mark(MarketType::Perp)
            );
        }
        Ok(())
    }
}

/// Trimmed token; empty input never reaches the network
pub fn validate_token(token: &str) -> Result<String, AppError> {
    let token = token.trim();
    if token.is_empty() {
        return Err(AppError::EmptyToken);
    }
    Ok(token.to_string())
}

/// Enabled exchanges that trade the configured market
fn session_exchanges(config: &AppConfig) -> Result<Vec<ExchangeId>, AppError> {
    let market = config.monitor.market;
    let ids: Vec<ExchangeId> = config
        .enabled_exchanges()?
        .into_iter()
        .filter(|id| id.supports(market))
        .collect();
    if ids.is_empty() {
        return Err(AppError::NoExchangesEnabled);
    }
    Ok(ids)
}

/// One shared transport for every client of the command
fn build_monitor(config: &AppConfig) -> Result<Monitor, AppError> {
    let ids = session_exchanges(config)?;
    let transport: Arc<dyn HttpTransport> = Arc::new(ReqwestTransport::new()?);
    let factory = ExchangeFactory::new(transport, RetryPolicy::from(&config.network));
    Ok(Monitor::new(factory.create_clients(&ids)))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("⚠️ Не удалось установить обработчик Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_watch_arguments() {
        let cli = Cli::try_parse_from([
            "trade-helper", "--retries", "5", "watch", "eth", "--market", "spot",
            "--exchanges", "binance,okx", "--cycles", "3",
        ])
        .unwrap();

        let mut config = AppConfig::default();
        cli.apply_network_overrides(&mut config);
        assert_eq!(config.network.max_retries, 5);
        assert_eq!(config.network.timeout_secs, 10);

        match cli.command {
            Commands::Watch { token, market, exchanges, cycles, once, .. } => {
                assert_eq!(token, "eth");
                assert_eq!(market, Some(MarketType::Spot));
                assert_eq!(exchanges, Some(vec!["binance".to_string(), "okx".to_string()]));
                assert_eq!(cycles, Some(3));
                assert!(!once);
            }
            _ => panic!("expected watch"),
        }
    }

    #[test]
    fn test_market_aliases_and_rejection() {
        let cli = Cli::try_parse_from(["trade-helper", "lookup", "btc", "-m", "futures"]).unwrap();
        assert!(matches!(cli.command, Commands::Lookup { market: Some(MarketType::Perp), .. }));

        assert!(Cli::try_parse_from(["trade-helper", "lookup", "btc", "-m", "margin"]).is_err());
    }

    #[test]
    fn test_empty_token_is_rejected() {
        assert!(matches!(validate_token("   "), Err(AppError::EmptyToken)));
        assert_eq!(validate_token("  eth ").unwrap(), "eth");
    }

    #[tokio::test]
    async fn test_unknown_exchange_fails_before_network() {
        let command = Commands::Lookup {
            token: "eth".to_string(),
            market: None,
            exchanges: Some(vec!["kraken".to_string()]),
            json: false,
        };
        let err = CommandExecutor::execute(command, AppConfig::default()).await.unwrap_err();
        assert!(matches!(err, AppError::UnknownExchange(name) if name == "kraken"));
    }

    #[tokio::test]
    async fn test_no_exchange_for_market_fails_before_network() {
        let command = Commands::Lookup {
            token: "eth".to_string(),
            market: Some(MarketType::Spot),
            exchanges: Some(vec!["hyperliquid".to_string()]),
            json: false,
        };
        let err = CommandExecutor::execute(command, AppConfig::default()).await.unwrap_err();
        assert!(matches!(err, AppError::NoExchangesEnabled));
    }

    #[test]
    fn test_session_exchanges_skip_unsupported_market() {
        let mut config = AppConfig::default();
        config.monitor.market = MarketType::Spot;
        let ids = session_exchanges(&config).unwrap();
        assert_eq!(ids.len(), 6);
        assert!(!ids.contains(&ExchangeId::Hyperliquid));

        config.monitor.market = MarketType::Perp;
        assert_eq!(session_exchanges(&config).unwrap().len(), 7);
    }
}

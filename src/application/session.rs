//! Monitoring session: resolve the token once, then poll the bound symbols

use chrono::{DateTime, Local};
use std::fmt;
use std::future::Future;
use std::time::Duration;
use tracing::{info, info_span, warn, Instrument};

use super::monitor::Monitor;
use crate::domain::exchange::ExchangeId;
use crate::domain::price::{PriceBoard, PriceRow};
use crate::shared::types::MarketType;
use crate::shared::utils::generate_id;

/// Session settings
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub token: String,
    pub market: MarketType,
    pub interval: Duration,
    /// `false` resolves once, reports and stops
    pub track_prices: bool,
    /// Stop after this many refresh cycles (unbounded when `None`)
    pub max_cycles: Option<u64>,
}

impl SessionConfig {
    pub fn new(token: impl Into<String>, market: MarketType) -> Self {
        Self {
            token: token.into(),
            market,
            interval: Duration::from_secs(5),
            track_prices: true,
            max_cycles: None,
        }
    }
}

/// Header shown above every table
#[derive(Debug, Clone)]
pub struct StatusLine {
    pub market: MarketType,
    pub token: String,
    pub updated: DateTime<Local>,
}

impl StatusLine {
    fn now(market: MarketType, token: &str) -> Self {
        Self {
            market,
            token: token.trim().to_ascii_uppercase(),
            updated: Local::now(),
        }
    }
}

impl fmt::Display for StatusLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} • {} • updated {}",
            self.market.label(),
            self.token,
            self.updated.format("%H:%M:%S%.3f")
        )
    }
}

/// Receives what the session wants to show
pub trait SessionReporter {
    /// First table, right after resolution, with the venue links
    fn on_resolved(&mut self, status: &StatusLine, rows: &[PriceRow], urls: &[(ExchangeId, String)]);

    fn on_refresh(&mut self, status: &StatusLine, rows: &[PriceRow]);

    fn on_not_found(&mut self, token: &str, market: MarketType);
}

/// Why a session stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// No venue listed the token
    NotFound,
    /// Every venue that answered failed
    ErrorsOnly,
    /// Tracking disabled, stopped after the first table
    Resolved,
    CyclesCompleted,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionSummary {
    pub id: String,
    pub resolved: usize,
    pub cycles: u64,
    pub end: SessionEnd,
}

/// One resolve-then-refresh run over a monitor.
///
/// The session owns the monitor and with it the clients and their shared
/// transport, which are released when `run` returns on any path.
pub struct MonitoringSession {
    id: String,
    monitor: Monitor,
    config: SessionConfig,
}

impl MonitoringSession {
    pub fn new(monitor: Monitor, config: SessionConfig) -> Self {
        Self {
            id: generate_id(),
            monitor,
            config,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Runs until the token is reported as missing, tracking is off, the
    /// cycle limit is reached or `shutdown` completes. Cancellation is
    /// honoured both while waiting and while a fan-out is in flight.
    pub async fn run<R, S>(self, reporter: &mut R, shutdown: S) -> SessionSummary
    where
        R: SessionReporter + ?Sized,
        S: Future<Output = ()>,
    {
        let span = info_span!(
            "session",
            id = %self.id,
            token = %self.config.token,
            market = %self.config.market
        );
        self.drive(reporter, shutdown).instrument(span).await
    }

    async fn drive<R, S>(self, reporter: &mut R, shutdown: S) -> SessionSummary
    where
        R: SessionReporter + ?Sized,
        S: Future<Output = ()>,
    {
        let token = self.config.token.as_str();
        let market = self.config.market;
        let mut summary = SessionSummary {
            id: self.id.clone(),
            resolved: 0,
            cycles: 0,
            end: SessionEnd::Cancelled,
        };
        tokio::pin!(shutdown);

        info!("🔍 Поиск {} ({}) на {} биржах...", token, market, self.monitor.exchanges().len());
        let outcome = tokio::select! {
            outcome = self.monitor.query(token, market) => outcome,
            _ = &mut shutdown => {
                info!("⏹️ Остановлено во время поиска");
                return summary;
            }
        };

        if outcome.is_not_found() {
            warn!("Symbol not found: {}", token);
            reporter.on_not_found(token, market);
            summary.end = SessionEnd::NotFound;
            return summary;
        }

        let board = PriceBoard::from_resolution(&outcome.results);
        summary.resolved = board.len();
        reporter.on_resolved(
            &StatusLine::now(market, token),
            &board.resolution_rows(&outcome.errors),
            &board.urls(),
        );

        if board.is_empty() {
            warn!("⚠️ Ни одна биржа не вернула цену, ошибок: {}", outcome.errors.len());
            summary.end = SessionEnd::ErrorsOnly;
            return summary;
        }
        if !self.config.track_prices {
            summary.end = SessionEnd::Resolved;
            return summary;
        }

        let known = board.known_symbols();
        info!("📈 Отслеживание {} символов каждые {:?}", known.len(), self.config.interval);

        loop {
            if let Some(max) = self.config.max_cycles {
                if summary.cycles >= max {
                    summary.end = SessionEnd::CyclesCompleted;
                    return summary;
                }
            }

            let refresh = tokio::select! {
                refresh = async {
                    tokio::time::sleep(self.config.interval).await;
                    self.monitor.fetch_prices_for_known_symbols(&known, market).await
                } => refresh,
                _ = &mut shutdown => {
                    info!("⏹️ Мониторинг остановлен после {} циклов", summary.cycles);
                    summary.end = SessionEnd::Cancelled;
                    return summary;
                }
            };

            summary.cycles += 1;
            reporter.on_refresh(
                &StatusLine::now(market, token),
                &board.rows(&refresh.prices, &refresh.errors),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::exchange::ExchangeClient;
    use crate::infrastructure::exchanges::ExchangeFactory;
    use crate::infrastructure::http::scripted::{Route, ScriptedTransport};
    use crate::infrastructure::http::RetryPolicy;
    use chrono::TimeZone;
    use serde_json::json;
    use std::sync::Arc;

    const BINANCE_FUT: &str = "https://fapi.binance.com/fapi/v1/ticker/price";

    #[derive(Default)]
    struct Recorder {
        resolved: Vec<Vec<PriceRow>>,
        refreshes: Vec<Vec<PriceRow>>,
        not_found: Vec<String>,
    }

    impl SessionReporter for Recorder {
        fn on_resolved(&mut self, _status: &StatusLine, rows: &[PriceRow], _urls: &[(ExchangeId, String)]) {
            self.resolved.push(rows.to_vec());
        }

        fn on_refresh(&mut self, _status: &StatusLine, rows: &[PriceRow]) {
            self.refreshes.push(rows.to_vec());
        }

        fn on_not_found(&mut self, token: &str, _market: MarketType) {
            self.not_found.push(token.to_string());
        }
    }

    fn binance_monitor(transport: ScriptedTransport) -> Monitor {
        let factory = ExchangeFactory::new(Arc::new(transport), RetryPolicy::default());
        let clients: Vec<Arc<dyn ExchangeClient>> = factory.create_clients(&[ExchangeId::Binance]);
        Monitor::new(clients)
    }

    fn config(cycles: Option<u64>) -> SessionConfig {
        SessionConfig {
            interval: Duration::from_secs(5),
            max_cycles: cycles,
            ..SessionConfig::new("ETH", MarketType::Perp)
        }
    }

    #[test]
    fn test_status_line_format() {
        let status = StatusLine {
            market: MarketType::Perp,
            token: "ETH".to_string(),
            updated: Local.with_ymd_and_hms(2024, 5, 1, 9, 3, 7).unwrap(),
        };
        assert_eq!(status.to_string(), "Futures • ETH • updated 09:03:07.000");

        let typed = StatusLine::now(MarketType::Spot, " eth/usdt");
        assert!(typed.to_string().starts_with("Spot • ETH/USDT • updated "));
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_cycles_track_delta() {
        let transport = ScriptedTransport::new()
            .with(Route::get(BINANCE_FUT).json(200, json!({"price": "100.0"})).times(1))
            .with(Route::get(BINANCE_FUT).json(200, json!({"price": "105.0"})).times(1))
            .with(Route::get(BINANCE_FUT).json(200, json!({"price": "95.0"})));
        let session = MonitoringSession::new(binance_monitor(transport), config(Some(2)));

        let mut recorder = Recorder::default();
        let summary = session.run(&mut recorder, std::future::pending::<()>()).await;

        assert_eq!(summary.end, SessionEnd::CyclesCompleted);
        assert_eq!(summary.resolved, 1);
        assert_eq!(summary.cycles, 2);
        assert_eq!(recorder.resolved[0][0].delta_text(), "0.000%");
        assert_eq!(recorder.refreshes[0][0].delta_text(), "+5.000%");
        assert_eq!(recorder.refreshes[1][0].delta_text(), "-5.000%");
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_refresh_price_has_no_delta() {
        let transport = ScriptedTransport::new()
            .with(Route::get(BINANCE_FUT).json(200, json!({"price": "100.0"})).times(1))
            .with(Route::get(BINANCE_FUT).text(502, "bad gateway"));
        let session = MonitoringSession::new(binance_monitor(transport), config(Some(1)));

        let mut recorder = Recorder::default();
        session.run(&mut recorder, std::future::pending::<()>()).await;

        let row = &recorder.refreshes[0][0];
        assert_eq!(row.price, None);
        assert_eq!(row.delta, None);
        assert_eq!(row.delta_text(), "—");
    }

    #[tokio::test]
    async fn test_not_found_ends_before_refresh() {
        let session = MonitoringSession::new(binance_monitor(ScriptedTransport::new()), config(None));

        let mut recorder = Recorder::default();
        let summary = session.run(&mut recorder, std::future::pending::<()>()).await;

        assert_eq!(summary.end, SessionEnd::NotFound);
        assert_eq!(recorder.not_found, vec!["ETH".to_string()]);
        assert!(recorder.resolved.is_empty());
    }

    #[tokio::test]
    async fn test_tracking_disabled_stops_after_resolution() {
        let transport = ScriptedTransport::new().with(Route::get(BINANCE_FUT).json(200, json!({"price": "100.0"})));
        let mut cfg = config(None);
        cfg.track_prices = false;
        let session = MonitoringSession::new(binance_monitor(transport), cfg);

        let mut recorder = Recorder::default();
        let summary = session.run(&mut recorder, std::future::pending::<()>()).await;

        assert_eq!(summary.end, SessionEnd::Resolved);
        assert_eq!(recorder.resolved.len(), 1);
        assert!(recorder.refreshes.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_cancels_between_cycles() {
        let transport = ScriptedTransport::new().with(Route::get(BINANCE_FUT).json(200, json!({"price": "100.0"})));
        let session = MonitoringSession::new(binance_monitor(transport), config(None));

        let mut recorder = Recorder::default();
        let shutdown = tokio::time::sleep(Duration::from_secs(12));
        let summary = session.run(&mut recorder, shutdown).await;

        assert_eq!(summary.end, SessionEnd::Cancelled);
        assert_eq!(summary.cycles, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_cancels_in_flight_resolution() {
        let transport = ScriptedTransport::new().with(
            Route::get(BINANCE_FUT)
                .json(200, json!({"price": "100.0"}))
                .delay(Duration::from_secs(60)),
        );
        let session = MonitoringSession::new(binance_monitor(transport), config(None));

        let mut recorder = Recorder::default();
        let summary = session
            .run(&mut recorder, tokio::time::sleep(Duration::from_secs(1)))
            .await;

        assert_eq!(summary.end, SessionEnd::Cancelled);
        assert_eq!(summary.resolved, 0);
        assert!(recorder.resolved.is_empty());
    }
}

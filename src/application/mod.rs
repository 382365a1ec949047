//! Application layer - use cases and services

pub mod commands;
pub mod monitor;
pub mod report;
pub mod session;

pub use commands::{Cli, CommandExecutor, Commands, ConsoleReporter};
pub use monitor::{Monitor, PriceRefresh, QueryOutcome};
pub use report::LookupReport;
pub use session::{MonitoringSession, SessionConfig, SessionEnd, SessionReporter, SessionSummary, StatusLine};

//! Trade Helper - locate a token across CEX spot and perpetual markets
//! and track its price against the first value seen

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod shared;

// Re-export main types for convenience
pub use application::{Monitor, MonitoringSession};
pub use domain::exchange::{ExchangeClient, ExchangeId};
pub use domain::price::PriceBoard;
pub use infrastructure::exchanges::ExchangeFactory;
pub use shared::types::{MarketType, ResolvedInstrument};

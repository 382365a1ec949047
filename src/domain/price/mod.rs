//! Price domain - baseline tracking and change analysis

mod price_analyzer;
mod price_board;

pub use price_analyzer::{PriceAnalyzer, PriceDelta};
pub use price_board::{PriceBoard, PriceRow};

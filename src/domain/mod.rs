//! Domain layer - venues, symbols and price tracking

pub mod exchange;
pub mod price;

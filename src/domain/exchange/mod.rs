//! Exchange domain - supported venues and the client capability contract

mod exchange_client;
mod exchange_registry;
pub mod symbol;

pub use exchange_client::ExchangeClient;
pub use exchange_registry::ExchangeId;

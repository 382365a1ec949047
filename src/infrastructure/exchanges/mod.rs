//! Exchange adapters over the shared HTTP transport

mod common;
pub mod binance;
pub mod bitget;
pub mod bybit;
pub mod factory;
pub mod gate;
pub mod hyperliquid;
pub mod mexc;
pub mod okx;

pub use binance::BinanceClient;
pub use bitget::BitgetClient;
pub use bybit::BybitClient;
pub use factory::ExchangeFactory;
pub use gate::GateClient;
pub use hyperliquid::HyperliquidClient;
pub use mexc::MexcClient;
pub use okx::OkxClient;

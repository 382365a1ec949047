use std::sync::Arc;

use super::binance::BinanceClient;
use super::bitget::BitgetClient;
use super::bybit::BybitClient;
use super::gate::GateClient;
use super::hyperliquid::HyperliquidClient;
use super::mexc::MexcClient;
use super::okx::OkxClient;
use crate::domain::exchange::{ExchangeClient, ExchangeId};
use crate::infrastructure::http::{HttpTransport, RetryPolicy};

/// Factory for creating exchange clients that share one transport
pub struct ExchangeFactory {
    transport: Arc<dyn HttpTransport>,
    policy: RetryPolicy,
}

impl ExchangeFactory {
    pub fn new(transport: Arc<dyn HttpTransport>, policy: RetryPolicy) -> Self {
        Self { transport, policy }
    }

    /// Create the client for a single venue
    pub fn create_client(&self, id: ExchangeId) -> Arc<dyn ExchangeClient> {
        let transport = Arc::clone(&self.transport);
        match id {
            ExchangeId::Gate => Arc::new(GateClient::new(transport, self.policy)),
            ExchangeId::Hyperliquid => Arc::new(HyperliquidClient::new(transport, self.policy)),
            ExchangeId::Binance => Arc::new(BinanceClient::new(transport, self.policy)),
            ExchangeId::Okx => Arc::new(OkxClient::new(transport, self.policy)),
            ExchangeId::Bybit => Arc::new(BybitClient::new(transport, self.policy)),
            ExchangeId::Mexc => Arc::new(MexcClient::new(transport, self.policy)),
            ExchangeId::Bitget => Arc::new(BitgetClient::new(transport, self.policy)),
        }
    }

    /// Clients in the given order
    pub fn create_clients(&self, ids: &[ExchangeId]) -> Vec<Arc<dyn ExchangeClient>> {
        ids.iter().map(|&id| self.create_client(id)).collect()
    }
}

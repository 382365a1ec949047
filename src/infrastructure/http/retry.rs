//! Retrying request primitive

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, warn};

use super::{HttpRequest, HttpResponse, HttpTransport};
use crate::domain::exchange::ExchangeId;
use crate::shared::config::NetworkCfg;

/// Attempts, per-request timeout and linear backoff step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub timeout: Duration,
    pub backoff_step: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            timeout: Duration::from_secs(10),
            backoff_step: Duration::from_secs(1),
        }
    }
}

impl From<&NetworkCfg> for RetryPolicy {
    fn from(cfg: &NetworkCfg) -> Self {
        Self {
            max_retries: cfg.max_retries.max(1),
            timeout: cfg.timeout(),
            ..Self::default()
        }
    }
}

impl RetryPolicy {
    /// Pause before the attempt following `attempt` (zero-based): 1s, 2s, 3s...
    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.backoff_step * (attempt + 1)
    }
}

/// Issues one request with bounded retries on transport failure.
///
/// Any received response is returned as is, whatever its status. When every
/// attempt fails at the transport level the result is `None`.
#[derive(Clone)]
pub struct RetryingClient {
    transport: Arc<dyn HttpTransport>,
    exchange: ExchangeId,
    policy: RetryPolicy,
}

impl RetryingClient {
    pub fn new(transport: Arc<dyn HttpTransport>, exchange: ExchangeId, policy: RetryPolicy) -> Self {
        Self {
            transport,
            exchange,
            policy,
        }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub async fn request(&self, request: &HttpRequest, request_name: &str) -> Option<HttpResponse> {
        let attempts = self.policy.max_retries.max(1);

        for attempt in 0..attempts {
            match self.transport.send(request, self.policy.timeout).await {
                Ok(response) => {
                    debug!(
                        "[{}] {} -> HTTP {}",
                        self.exchange, request_name, response.status
                    );
                    return Some(response);
                }
                Err(e) => {
                    warn!(
                        "[{}] Attempt {}/{} for '{}' failed: {}",
                        self.exchange,
                        attempt + 1,
                        attempts,
                        request_name,
                        e
                    );
                    if attempt + 1 < attempts {
                        tokio::time::sleep(self.policy.delay_after(attempt)).await;
                    }
                }
            }
        }

        error!(
            "[{}] All {} attempts for '{}' failed",
            self.exchange, attempts, request_name
        );
        None
    }
}

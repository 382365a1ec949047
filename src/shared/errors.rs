//! Error handling for the application

use thiserror::Error;

use crate::domain::exchange::ExchangeId;

/// Transport-level failures. Only the retry primitive ever sees these;
/// exhaustion is reported as an absent response, not as an error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("request timed out")]
    Timeout,

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("transport error: {0}")]
    Other(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout
        } else if err.is_connect() {
            TransportError::Connect(err.to_string())
        } else {
            TransportError::Other(err.to_string())
        }
    }
}

/// Exchange adapter errors.
///
/// "Not found" is never an error: a non-200 status, a body that is not JSON
/// or a missing price field all resolve to `Ok(None)`. These variants cover
/// payloads the adapter cannot make sense of.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExchangeError {
    #[error("{exchange}: invalid price {raw:?} for {symbol}")]
    InvalidPrice {
        exchange: ExchangeId,
        symbol: String,
        raw: String,
    },

    #[error("{exchange}: unexpected payload: {detail}")]
    UnexpectedPayload {
        exchange: ExchangeId,
        detail: String,
    },

    #[error("{exchange}: lookup panicked: {detail}")]
    Panicked {
        exchange: ExchangeId,
        detail: String,
    },
}

impl ExchangeError {
    pub fn exchange(&self) -> ExchangeId {
        match self {
            ExchangeError::InvalidPrice { exchange, .. }
            | ExchangeError::UnexpectedPayload { exchange, .. }
            | ExchangeError::Panicked { exchange, .. } => *exchange,
        }
    }
}

/// General application error
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Unknown exchange: {0}")]
    UnknownExchange(String),

    #[error("Invalid market type: {0} (expected spot or perp)")]
    InvalidMarketType(String),

    #[error("No exchanges enabled")]
    NoExchangesEnabled,

    #[error("Token must not be empty")]
    EmptyToken,

    #[error("Token '{0}' not found on any exchange")]
    SymbolNotFound(String),

    #[error("HTTP client error: {0}")]
    Transport(String),

    #[error("IO error: {0}")]
    Io(String),
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Io(err.to_string())
    }
}

impl From<TransportError> for AppError {
    fn from(err: TransportError) -> Self {
        AppError::Transport(err.to_string())
    }
}

impl From<toml::de::Error> for AppError {
    fn from(err: toml::de::Error) -> Self {
        AppError::ConfigError(format!("Failed to parse config file: {}", err))
    }
}

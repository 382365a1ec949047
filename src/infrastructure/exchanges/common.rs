//! Helpers shared by the exchange adapters

use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::future::Future;
use tracing::debug;

use crate::domain::exchange::ExchangeId;
use crate::infrastructure::http::{HttpRequest, RetryingClient};
use crate::shared::errors::ExchangeError;

/// Price field as venues send it: usually a decimal string, sometimes a number
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawPrice {
    Number(f64),
    Text(String),
}

impl RawPrice {
    fn is_blank(&self) -> bool {
        matches!(self, RawPrice::Text(s) if s.trim().is_empty())
    }
}

/// First of the two fields that carries a value
pub fn first_present<'a>(
    primary: Option<&'a RawPrice>,
    fallback: Option<&'a RawPrice>,
) -> Option<&'a RawPrice> {
    primary.filter(|p| !p.is_blank()).or(fallback)
}

/// Converts a raw price field.
///
/// Absent or blank fields and non-positive values mean "no price". Text
/// that is not a number is a payload error.
pub fn parse_price(
    exchange: ExchangeId,
    symbol: &str,
    raw: Option<&RawPrice>,
) -> Result<Option<f64>, ExchangeError> {
    let value = match raw {
        None => return Ok(None),
        Some(RawPrice::Number(n)) => *n,
        Some(RawPrice::Text(text)) => {
            let text = text.trim();
            if text.is_empty() {
                return Ok(None);
            }
            text.parse::<f64>().map_err(|_| ExchangeError::InvalidPrice {
                exchange,
                symbol: symbol.to_string(),
                raw: text.to_string(),
            })?
        }
    };

    if value.is_finite() && value > 0.0 {
        Ok(Some(value))
    } else {
        debug!("[{}] {}: ignoring non-positive price {}", exchange, symbol, value);
        Ok(None)
    }
}

/// GET/POST and decode a 200 JSON body. No response, another status or an
/// undecodable body all give `None`.
pub async fn fetch_json<T: DeserializeOwned>(
    http: &RetryingClient,
    request: &HttpRequest,
    request_name: &str,
) -> Option<T> {
    let response = http.request(request, request_name).await?;
    if !response.is_ok() {
        debug!("'{}' answered HTTP {}", request_name, response.status);
        return None;
    }
    let decoded = response.json::<T>();
    if decoded.is_none() {
        debug!("'{}' returned an unexpected body", request_name);
    }
    decoded
}

/// Tries candidates in order and returns the first one with a price.
/// Candidates without a price are skipped; payload errors abort the probe.
pub async fn probe_by_price<'a, F, Fut>(
    exchange: ExchangeId,
    candidates: &'a [String],
    mut fetch: F,
) -> Result<Option<(&'a str, f64)>, ExchangeError>
where
    F: FnMut(&'a str) -> Fut,
    Fut: Future<Output = Result<Option<f64>, ExchangeError>>,
{
    for symbol in candidates {
        match fetch(symbol.as_str()).await? {
            Some(price) => return Ok(Some((symbol.as_str(), price))),
            None => debug!("[{}] candidate {} did not resolve", exchange, symbol),
        }
    }
    Ok(None)
}

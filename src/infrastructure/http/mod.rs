//! HTTP plumbing shared by all exchange adapters

mod retry;
mod transport;
#[cfg(any(test, feature = "testkit"))]
pub mod scripted;

pub use retry::{RetryPolicy, RetryingClient};
pub use transport::{HttpMethod, HttpRequest, HttpResponse, HttpTransport, ReqwestTransport};

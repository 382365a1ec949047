//! In-memory transport with scripted replies, for tests

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Mutex;
use std::time::Duration;

use super::{HttpMethod, HttpRequest, HttpResponse, HttpTransport};
use crate::shared::errors::TransportError;

#[derive(Debug, Clone)]
enum Reply {
    Respond(HttpResponse),
    Fail(TransportError),
}

/// A canned reply for requests matching method, url, query subset and body
#[derive(Debug, Clone)]
pub struct Route {
    method: HttpMethod,
    url: String,
    query: Vec<(String, String)>,
    body: Option<Value>,
    reply: Reply,
    delay: Option<Duration>,
    remaining: Option<usize>,
}

impl Route {
    pub fn get(url: &str) -> Self {
        Self::new(HttpMethod::Get, url, None)
    }

    pub fn post(url: &str, body: Value) -> Self {
        Self::new(HttpMethod::Post, url, Some(body))
    }

    fn new(method: HttpMethod, url: &str, body: Option<Value>) -> Self {
        Self {
            method,
            url: url.to_string(),
            query: Vec::new(),
            body,
            reply: Reply::Respond(HttpResponse::new(200, "{}")),
            delay: None,
            remaining: None,
        }
    }

    pub fn query(mut self, key: &str, value: &str) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    pub fn json(mut self, status: u16, body: Value) -> Self {
        self.reply = Reply::Respond(HttpResponse::new(status, body.to_string()));
        self
    }

    pub fn text(mut self, status: u16, body: &str) -> Self {
        self.reply = Reply::Respond(HttpResponse::new(status, body));
        self
    }

    /// Connection refused on every matching request
    pub fn fail(mut self) -> Self {
        self.reply = Reply::Fail(TransportError::Connect("connection refused".to_string()));
        self
    }

    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Only match the first `n` requests, then fall through to later routes
    pub fn times(mut self, n: usize) -> Self {
        self.remaining = Some(n);
        self
    }

    fn matches(&self, request: &HttpRequest) -> bool {
        self.method == request.method
            && self.url == request.url
            && self
                .query
                .iter()
                .all(|(k, v)| request.query_value(k) == Some(v.as_str()))
            && (self.body.is_none() || self.body == request.json)
            && self.remaining != Some(0)
    }
}

/// Records every request and answers from the first matching route.
/// Unmatched requests get an empty 404.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    routes: Mutex<Vec<Route>>,
    log: Mutex<Vec<HttpRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(self, route: Route) -> Self {
        self.add(route);
        self
    }

    pub fn add(&self, route: Route) {
        self.routes.lock().unwrap().push(route);
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.log.lock().unwrap().clone()
    }

    /// Number of requests whose url starts with `url_prefix`
    pub fn count(&self, url_prefix: &str) -> usize {
        self.log
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.url.starts_with(url_prefix))
            .count()
    }

    fn pick(&self, request: &HttpRequest) -> (Option<Duration>, Reply) {
        let mut routes = self.routes.lock().unwrap();
        match routes.iter_mut().find(|route| route.matches(request)) {
            Some(route) => {
                if let Some(remaining) = route.remaining.as_mut() {
                    *remaining -= 1;
                }
                (route.delay, route.reply.clone())
            }
            None => (None, Reply::Respond(HttpResponse::new(404, ""))),
        }
    }
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn send(
        &self,
        request: &HttpRequest,
        _timeout: Duration,
    ) -> Result<HttpResponse, TransportError> {
        self.log.lock().unwrap().push(request.clone());
        let (delay, reply) = self.pick(request);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        match reply {
            Reply::Respond(response) => Ok(response),
            Reply::Fail(err) => Err(err),
        }
    }
}

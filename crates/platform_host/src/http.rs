//! HTTP transport contracts used by network-probing commands.

use std::{cell::RefCell, future::Future, pin::Pin, rc::Rc};

use serde::{Deserialize, Serialize};

/// Object-safe boxed future used by [`HttpTransport`].
///
/// Dropping the future abandons the request; browser adapters abort the underlying fetch.
pub type HttpFuture<T> = Pin<Box<dyn Future<Output = T>>>;

/// Cross-origin request mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FetchMode {
    /// Regular CORS request with a readable response.
    #[default]
    Cors,
    /// Opaque request; only reachability is observable.
    NoCors,
}

/// Outbound HTTP request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpRequest {
    /// Upper-case HTTP method.
    pub method: String,
    /// Absolute target URL.
    pub url: String,
    /// Request headers in insertion order.
    pub headers: Vec<(String, String)>,
    /// Optional text body.
    pub body: Option<String>,
    /// Cross-origin mode.
    pub mode: FetchMode,
    /// Bypass HTTP caches when set.
    pub no_store: bool,
}

impl HttpRequest {
    /// Creates a `GET` request in CORS mode.
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: "GET".to_string(),
            url: url.into(),
            headers: Vec::new(),
            body: None,
            mode: FetchMode::Cors,
            no_store: false,
        }
    }

    /// Replaces the method.
    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = method.into().to_ascii_uppercase();
        self
    }

    /// Appends a header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Sets the text body.
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Sets the cross-origin mode.
    pub fn with_mode(mut self, mode: FetchMode) -> Self {
        self.mode = mode;
        self
    }

    /// Disables caching for this request.
    pub fn no_store(mut self) -> Self {
        self.no_store = true;
        self
    }
}

/// HTTP response as observed by the host.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HttpResponse {
    /// Status code (`0` for opaque responses).
    pub status: u16,
    /// Status text reported by the host.
    pub status_text: String,
    /// Response headers, names lower-cased.
    pub headers: Vec<(String, String)>,
    /// Raw body bytes.
    pub body: Vec<u8>,
    /// Whether the response was opaque (no-cors).
    pub opaque: bool,
}

impl HttpResponse {
    /// Creates a successful response with a text body.
    pub fn ok_text(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            status_text: "OK".to_string(),
            headers: Vec::new(),
            body: body.into().into_bytes(),
            opaque: false,
        }
    }

    /// Creates a response with the given status and text body.
    pub fn with_status(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into().into_bytes(),
            ..Self::default()
        }
    }

    /// Creates an opaque response.
    pub fn opaque() -> Self {
        Self {
            opaque: true,
            ..Self::default()
        }
    }

    /// Appends a header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .push((name.into().to_ascii_lowercase(), value.into()));
        self
    }

    /// Returns whether the status is in the 2xx range.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Returns the body decoded as UTF-8, replacing invalid sequences.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Looks up a header by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Host service that performs HTTP requests.
pub trait HttpTransport {
    /// Sends one request.
    fn send(&self, request: HttpRequest) -> HttpFuture<Result<HttpResponse, String>>;
}

#[derive(Debug, Clone, Copy, Default)]
/// Transport for hosts without network access.
pub struct NoopHttpTransport;

impl HttpTransport for NoopHttpTransport {
    fn send(&self, _request: HttpRequest) -> HttpFuture<Result<HttpResponse, String>> {
        Box::pin(async { Err("network unavailable".to_string()) })
    }
}

#[derive(Debug, Clone)]
enum MemoryRoute {
    Respond(HttpResponse),
    Fail(String),
    Hang,
}

#[derive(Debug, Default)]
struct MemoryHttpState {
    routes: Vec<(String, MemoryRoute)>,
    requests: Vec<HttpRequest>,
}

#[derive(Debug, Clone, Default)]
/// Scripted transport that answers by URL prefix and records every request.
///
/// Routes are matched in registration order; unmatched requests fail with `no route`.
pub struct MemoryHttpTransport {
    state: Rc<RefCell<MemoryHttpState>>,
}

impl MemoryHttpTransport {
    /// Answers requests whose URL starts with `prefix`.
    pub fn respond(&self, prefix: impl Into<String>, response: HttpResponse) {
        self.route(prefix, MemoryRoute::Respond(response));
    }

    /// Fails requests whose URL starts with `prefix`.
    pub fn fail(&self, prefix: impl Into<String>, message: impl Into<String>) {
        self.route(prefix, MemoryRoute::Fail(message.into()));
    }

    /// Never settles requests whose URL starts with `prefix`.
    pub fn hang(&self, prefix: impl Into<String>) {
        self.route(prefix, MemoryRoute::Hang);
    }

    /// Returns the requests sent so far.
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.state.borrow().requests.clone()
    }

    fn route(&self, prefix: impl Into<String>, route: MemoryRoute) {
        self.state.borrow_mut().routes.push((prefix.into(), route));
    }
}

impl HttpTransport for MemoryHttpTransport {
    fn send(&self, request: HttpRequest) -> HttpFuture<Result<HttpResponse, String>> {
        let route = {
            let mut state = self.state.borrow_mut();
            let route = state
                .routes
                .iter()
                .find(|(prefix, _)| request.url.starts_with(prefix.as_str()))
                .map(|(_, route)| route.clone());
            state.requests.push(request.clone());
            route
        };
        Box::pin(async move {
            match route {
                Some(MemoryRoute::Respond(response)) => Ok(response),
                Some(MemoryRoute::Fail(message)) => Err(message),
                Some(MemoryRoute::Hang) => std::future::pending().await,
                None => Err(format!("no route for {}", request.url)),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use futures::executor::block_on;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn memory_transport_matches_prefix_and_records_requests() {
        let transport = MemoryHttpTransport::default();
        transport.respond("https://api.example/", HttpResponse::ok_text("{\"ip\":\"1\"}"));
        transport.fail("https://down.example/", "offline");

        let ok = block_on(transport.send(HttpRequest::get("https://api.example/ip")))
            .expect("routed response");
        assert_eq!(ok.text(), "{\"ip\":\"1\"}");
        assert!(ok.is_success());

        let err = block_on(transport.send(HttpRequest::get("https://down.example/")))
            .expect_err("failing route");
        assert_eq!(err, "offline");

        let missing = block_on(transport.send(HttpRequest::get("https://other/")))
            .expect_err("unrouted");
        assert!(missing.starts_with("no route"));
        assert_eq!(transport.requests().len(), 3);
    }

    #[test]
    fn request_builder_normalizes_method_and_headers() {
        let request = HttpRequest::get("https://x/")
            .with_method("post")
            .with_header("Content-Type", "application/json")
            .with_body("{}")
            .with_mode(FetchMode::NoCors);
        assert_eq!(request.method, "POST");
        assert_eq!(request.headers.len(), 1);
        assert_eq!(request.mode, FetchMode::NoCors);

        let response = HttpResponse::ok_text("").with_header("Content-Type", "text/plain");
        assert_eq!(response.header("content-type"), Some("text/plain"));
    }
}

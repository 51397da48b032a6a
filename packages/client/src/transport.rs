//! HTTP transport abstraction.
//!
//! The executor never talks to reqwest directly. It hands a prepared
//! [`Request`] to a [`Transport`], which lets tests substitute canned
//! responses and avoid the network entirely.

use std::collections::HashMap;
use std::fmt;
use std::io::Read;
use std::time::Duration;

use reqwest::blocking::Client;
use url::Url;

/// Error produced by a transport when the round trip itself fails.
pub type TransportError = Box<dyn std::error::Error + Send + Sync>;

/// HTTP methods understood by the database REST API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    GET,
    PUT,
    POST,
    PATCH,
    DELETE,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::GET => "GET",
            Method::PUT => "PUT",
            Method::POST => "POST",
            Method::PATCH => "PATCH",
            Method::DELETE => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Method> for http::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::GET => http::Method::GET,
            Method::PUT => http::Method::PUT,
            Method::POST => http::Method::POST,
            Method::PATCH => http::Method::PATCH,
            Method::DELETE => http::Method::DELETE,
        }
    }
}

/// A fully prepared request, ready to hand to a [`Transport`].
#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    pub url: Url,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
}

impl Request {
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_body(mut self, body: Vec<u8>) -> Self {
        self.body = Some(body);
        self
    }

    /// The request path, without the query string (which may carry the auth token).
    pub fn path(&self) -> &str {
        self.url.path()
    }
}

/// A response whose body has not been read yet.
///
/// The body stream is owned by the response; dropping the response releases it.
pub struct Response {
    pub status: u16,
    pub headers: HashMap<String, String>,
    pub body: Box<dyn Read + Send>,
}

impl Response {
    pub fn new(status: u16, body: Box<dyn Read + Send>) -> Self {
        Self {
            status,
            headers: HashMap::new(),
            body,
        }
    }

    /// Check if the response status indicates success (2xx)
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Canonical reason phrase for the status, e.g. "Not Found".
    pub fn status_text(&self) -> &'static str {
        http::StatusCode::from_u16(self.status)
            .ok()
            .and_then(|s| s.canonical_reason())
            .unwrap_or("Unknown")
    }
}

impl fmt::Debug for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Response")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}

/// Trait for executing HTTP requests.
///
/// Implementations can use real HTTP clients or mock responses for testing.
pub trait Transport: Send + Sync {
    /// Execute a request and return the response with its body unread.
    fn send(&self, request: Request) -> Result<Response, TransportError>;
}

/// Production transport using the blocking reqwest client.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Create a new transport with the given timeout.
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    /// Create with default timeout of 30 seconds.
    pub fn with_default_timeout() -> Result<Self, reqwest::Error> {
        Self::new(Duration::from_secs(30))
    }

    /// Wrap an already configured reqwest client.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

impl Transport for ReqwestTransport {
    fn send(&self, request: Request) -> Result<Response, TransportError> {
        let method: http::Method = request.method.into();
        let mut req_builder = self.client.request(method, request.url);

        for (name, value) in &request.headers {
            req_builder = req_builder.header(name.as_str(), value.as_str());
        }

        if let Some(body) = request.body {
            req_builder = req_builder.body(body);
        }

        let response = req_builder.send()?;

        let mut headers = HashMap::new();
        for (name, value) in response.headers() {
            if let Ok(v) = value.to_str() {
                headers.insert(name.to_string(), v.to_string());
            }
        }

        Ok(Response {
            status: response.status().as_u16(),
            headers,
            body: Box::new(response),
        })
    }
}

/// Mock transport for testing.
///
/// Returns canned responses and counts how many response bodies were released.
#[cfg(test)]
pub mod mock {
    use super::*;
    use std::io::Cursor;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    /// A canned response: status plus raw body bytes.
    #[derive(Debug, Clone)]
    pub struct Canned {
        pub status: u16,
        pub body: Vec<u8>,
    }

    /// Body reader that bumps a shared counter when dropped.
    struct TrackedBody {
        inner: Cursor<Vec<u8>>,
        released: Arc<AtomicUsize>,
    }

    impl Read for TrackedBody {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            self.inner.read(buf)
        }
    }

    impl Drop for TrackedBody {
        fn drop(&mut self) {
            self.released.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[derive(Clone, Default)]
    pub struct MockTransport {
        responses: Arc<Mutex<HashMap<String, Canned>>>,
        default_response: Arc<Mutex<Option<Canned>>>,
        recorded_requests: Arc<Mutex<Vec<Request>>>,
        error_message: Arc<Mutex<Option<String>>>,
        released: Arc<AtomicUsize>,
    }

    impl MockTransport {
        pub fn new() -> Self {
            Self::default()
        }

        /// Add a response for a specific URL path.
        pub fn with_response(self, path: impl Into<String>, status: u16, body: &str) -> Self {
            self.responses.lock().unwrap().insert(
                path.into(),
                Canned {
                    status,
                    body: body.as_bytes().to_vec(),
                },
            );
            self
        }

        /// Set a default response when no path matches.
        pub fn with_default_response(self, status: u16, body: &str) -> Self {
            *self.default_response.lock().unwrap() = Some(Canned {
                status,
                body: body.as_bytes().to_vec(),
            });
            self
        }

        /// Configure to fail all requests with a transport error.
        pub fn fail_with(self, message: impl Into<String>) -> Self {
            *self.error_message.lock().unwrap() = Some(message.into());
            self
        }

        pub fn recorded_requests(&self) -> Vec<Request> {
            self.recorded_requests.lock().unwrap().clone()
        }

        /// Number of response bodies dropped so far.
        pub fn released_bodies(&self) -> usize {
            self.released.load(Ordering::SeqCst)
        }
    }

    impl Transport for MockTransport {
        fn send(&self, request: Request) -> Result<Response, TransportError> {
            let path = request.path().to_string();
            self.recorded_requests.lock().unwrap().push(request);

            if let Some(msg) = self.error_message.lock().unwrap().clone() {
                return Err(msg.into());
            }

            let canned = self
                .responses
                .lock()
                .unwrap()
                .get(&path)
                .cloned()
                .or_else(|| self.default_response.lock().unwrap().clone())
                .unwrap_or(Canned {
                    status: 404,
                    body: br#"{"error":"Not Found"}"#.to_vec(),
                });

            let body = TrackedBody {
                inner: Cursor::new(canned.body),
                released: Arc::clone(&self.released),
            };
            Ok(Response::new(canned.status, Box::new(body)))
        }
    }
}

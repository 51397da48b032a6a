//! References to locations in the remote database.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use url::Url;

use crate::error::Error;
use crate::query::{self, QueryOption};
use crate::transport::{Method, ReqwestTransport, Request, Transport};

/// A handle to one location in the database.
///
/// Cloning is cheap; children created with [`Ref::child`] share the parent's
/// transport and credentials.
#[derive(Clone)]
pub struct Ref {
    base: Url,
    segments: Vec<String>,
    auth: Option<String>,
    transport: Arc<dyn Transport>,
}

impl Ref {
    /// Create a reference from a database URL, e.g.
    /// `https://my-db.example.com/users/alice`.
    ///
    /// The URL path becomes the referenced location. Requests go through a
    /// [`ReqwestTransport`] with the default timeout.
    pub fn new(url: &str) -> Result<Self, Error> {
        let transport = ReqwestTransport::with_default_timeout()
            .map_err(|e| Error::Transport(Box::new(e)))?;
        Self::with_transport_at(url, Arc::new(transport))
    }

    /// Create a reference that sends requests through `transport`.
    pub fn with_transport_at(url: &str, transport: Arc<dyn Transport>) -> Result<Self, Error> {
        let mut base = Url::parse(url)?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(Error::InvalidUrl {
                message: format!("unsupported scheme '{}' in {}", base.scheme(), url),
            });
        }
        if base.cannot_be_a_base() {
            return Err(Error::InvalidUrl {
                message: format!("{} cannot be a base URL", url),
            });
        }

        let segments = split_path(base.path());
        base.set_path("");
        base.set_query(None);
        base.set_fragment(None);

        Ok(Self {
            base,
            segments,
            auth: None,
            transport,
        })
    }

    /// Attach an auth token, sent as the `auth` query parameter.
    pub fn with_auth(mut self, token: impl Into<String>) -> Self {
        self.auth = Some(token.into());
        self
    }

    /// Replace the transport used by this reference.
    pub fn with_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = transport;
        self
    }

    /// Replace the transport with a reqwest transport using `timeout`.
    pub fn with_timeout(self, timeout: Duration) -> Result<Self, Error> {
        let transport =
            ReqwestTransport::new(timeout).map_err(|e| Error::Transport(Box::new(e)))?;
        Ok(self.with_transport(Arc::new(transport)))
    }

    /// Reference to a location relative to this one.
    ///
    /// Empty segments are ignored, so `"/a//b/"` and `"a/b"` are the same child.
    pub fn child(&self, sub_path: &str) -> Ref {
        let mut child = self.clone();
        child.segments.extend(split_path(sub_path));
        child
    }

    /// The last path segment, or `None` for the database root.
    pub fn key(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    /// The normalised location, e.g. `/users/alice`.
    pub fn path(&self) -> String {
        format!("/{}", self.segments.join("/"))
    }

    /// The REST endpoint URL for this location, without query parameters.
    ///
    /// Fails for `.` and `..` segments, which would otherwise be dropped by URL
    /// normalisation and address a different location than [`Ref::path`].
    pub fn url(&self) -> Result<Url, Error> {
        if let Some(dot) = self.segments.iter().find(|s| matches!(s.as_str(), "." | "..")) {
            return Err(Error::InvalidUrl {
                message: format!("relative segment '{}' in path {}", dot, self.path()),
            });
        }

        let mut url = self.base.clone();
        {
            let mut path = url.path_segments_mut().map_err(|_| Error::InvalidUrl {
                message: format!("{} cannot be a base URL", self.base),
            })?;
            path.clear();
            match self.segments.split_last() {
                Some((last, parents)) => {
                    path.extend(parents);
                    path.push(&format!("{}.json", last));
                }
                None => {
                    path.push(".json");
                }
            }
        }
        Ok(url)
    }

    /// Build the transport client and a prepared request for `method`.
    ///
    /// Query options are validated and applied in order; the first invalid
    /// option aborts before anything is sent.
    pub fn client_and_request(
        &self,
        method: Method,
        body: Option<Vec<u8>>,
        opts: &[QueryOption],
    ) -> Result<(Arc<dyn Transport>, Request), Error> {
        let mut params = Vec::new();
        if let Some(token) = &self.auth {
            params.push(("auth".to_string(), token.clone()));
        }
        query::apply_all(opts, &mut params)?;

        let mut url = self.url()?;
        if !params.is_empty() {
            url.query_pairs_mut().extend_pairs(params);
        }

        let mut request = Request::new(method, url);
        if let Some(body) = body {
            request = request
                .with_header("Content-Type", "application/json")
                .with_body(body);
        }

        Ok((Arc::clone(&self.transport), request))
    }
}

impl fmt::Debug for Ref {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ref")
            .field("base", &self.base.as_str())
            .field("path", &self.path())
            .field("auth", &self.auth.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

fn split_path(path: &str) -> Vec<String> {
    path.split('/')
        .filter(|c| !c.is_empty())
        .map(|c| c.to_string())
        .collect()
}

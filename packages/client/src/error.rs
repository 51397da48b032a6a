use crate::transport::TransportError;

/// Broad classification of an [`Error`], for callers that want to branch on
/// the failure class without matching every variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The outgoing value could not be serialized.
    Marshal,
    /// The network round trip failed.
    Transport,
    /// The server answered with a non-2xx status.
    Server,
    /// The response (or local JSON input) could not be decoded.
    Unmarshal,
    /// The reference or a query option was invalid.
    Usage,
}

/// Errors produced by the client.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The request value could not be serialized; nothing was sent.
    #[error("could not marshal json: {0}")]
    Marshal(#[source] serde_json::Error),

    /// The HTTP round trip failed (connect, DNS, TLS, timeout, I/O).
    #[error("could not execute request: {0}")]
    Transport(#[source] TransportError),

    /// The server answered with a status outside 200-299.
    #[error("{message}")]
    Server {
        status: u16,
        message: String,
        /// Parsed error body, if the server sent valid JSON.
        body: Option<serde_json::Value>,
    },

    /// The response body, or local JSON input, could not be decoded.
    #[error("could not unmarshal json: {0}")]
    Unmarshal(#[source] serde_json::Error),

    /// The database URL could not be parsed.
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// The URL or path cannot address a database location.
    #[error("Invalid URL: {message}")]
    InvalidUrl { message: String },

    /// A query option failed validation; nothing was sent.
    #[error("invalid query option {option}: {message}")]
    InvalidOption {
        option: &'static str,
        message: String,
    },
}

impl Error {
    /// Failure class of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Marshal(_) => ErrorKind::Marshal,
            Error::Transport(_) => ErrorKind::Transport,
            Error::Server { .. } => ErrorKind::Server,
            Error::Unmarshal(_) => ErrorKind::Unmarshal,
            Error::Url(_) | Error::InvalidUrl { .. } | Error::InvalidOption { .. } => {
                ErrorKind::Usage
            }
        }
    }

    /// HTTP status for server errors.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Server { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Build a server error from a status and the raw error body.
    ///
    /// A JSON object with a string `error` field yields that string; any
    /// other JSON is rendered compactly; anything else gets a generic message.
    pub(crate) fn server(status: u16, reason: &str, raw: &[u8]) -> Self {
        let body: Option<serde_json::Value> = serde_json::from_slice(raw).ok();

        let message = match &body {
            Some(serde_json::Value::Object(map)) => match map.get("error") {
                Some(serde_json::Value::String(s)) => s.clone(),
                _ => serde_json::Value::Object(map.clone()).to_string(),
            },
            Some(serde_json::Value::Null) | None => {
                format!("server error: {} {}", status, reason)
            }
            Some(other) => other.to_string(),
        };

        Error::Server {
            status,
            message,
            body,
        }
    }
}

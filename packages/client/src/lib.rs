//! # rtdb-client
//!
//! Blocking REST client for hierarchical JSON realtime databases.
//!
//! Every operation is a single HTTP round trip against a [`Ref`], a handle to
//! one location in the database tree. Request values are serialized with
//! serde; responses are decoded into any `DeserializeOwned` type. JSON numbers
//! decoded into [`Value`] keep their exact text, so large integers and
//! high-precision decimals survive a read/write round trip.
//!
//! ```ignore
//! use rtdb_client::{QueryOption, Ref, Value};
//!
//! let db = Ref::new("https://my-db.example.com")?.with_auth(token);
//! let users = db.child("users");
//!
//! // POST, server picks the key
//! let key = users.push(&serde_json::json!({"name": "ann"}))?;
//!
//! // GET with query options
//! let first: Value = users.get(&[QueryOption::OrderByKey, QueryOption::LimitToFirst(10)])?;
//!
//! // PATCH and DELETE
//! users.child(&key).update(&serde_json::json!({"age": 31}))?;
//! users.child(&key).remove()?;
//! ```
//!
//! Failures come back as a single [`Error`]; use [`Error::kind`] to tell
//! marshal, transport, server and unmarshal failures apart.

pub mod error;
pub mod ops;
pub mod query;
pub mod reference;
pub mod request;
pub mod rules;
pub mod transport;

pub use error::{Error, ErrorKind};
pub use ops::{get, push, remove, server_timestamp, set, update};
pub use query::{QueryOption, WriteSizeLimit};
pub use reference::Ref;
pub use request::{do_request, do_request_no_content};
pub use rules::{get_rules_json, set_rules, set_rules_json};
pub use transport::{Method, ReqwestTransport, Request, Response, Transport, TransportError};

/// Generic JSON document; numbers keep their exact textual form.
pub use serde_json::Value;

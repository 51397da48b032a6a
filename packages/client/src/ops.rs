//! Read, write, push, update and remove.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Error;
use crate::query::QueryOption;
use crate::reference::Ref;
use crate::request::{do_request, do_request_no_content};
use crate::transport::Method;

/// Retrieve the value stored at `r`.
pub fn get<D: DeserializeOwned>(r: &Ref, opts: &[QueryOption]) -> Result<D, Error> {
    do_request(Method::GET, r, None::<&()>, opts)
}

/// Overwrite the value stored at `r` with `v`.
pub fn set<V: Serialize + ?Sized>(r: &Ref, v: &V) -> Result<(), Error> {
    do_request_no_content(Method::PUT, r, Some(v), &[])
}

#[derive(Deserialize)]
struct PushResponse {
    name: String,
}

/// Append `v` under a server-generated child key of `r`, returning the key.
pub fn push<V: Serialize + ?Sized>(r: &Ref, v: &V) -> Result<String, Error> {
    let res: PushResponse = do_request(Method::POST, r, Some(v), &[])?;
    Ok(res.name)
}

/// Merge the fields of `v` into the value stored at `r`.
pub fn update<V: Serialize + ?Sized>(r: &Ref, v: &V) -> Result<(), Error> {
    do_request_no_content(Method::PATCH, r, Some(v), &[])
}

/// Delete the value stored at `r`.
pub fn remove(r: &Ref) -> Result<(), Error> {
    do_request_no_content(Method::DELETE, r, None::<&()>, &[])
}

/// Placeholder the server replaces with its own clock, in milliseconds since
/// the epoch.
pub fn server_timestamp() -> Value {
    serde_json::json!({ ".sv": "timestamp" })
}

impl Ref {
    /// See [`crate::ops::get`].
    pub fn get<D: DeserializeOwned>(&self, opts: &[QueryOption]) -> Result<D, Error> {
        get(self, opts)
    }

    /// See [`crate::ops::set`].
    pub fn set<V: Serialize + ?Sized>(&self, v: &V) -> Result<(), Error> {
        set(self, v)
    }

    /// See [`crate::ops::push`].
    pub fn push<V: Serialize + ?Sized>(&self, v: &V) -> Result<String, Error> {
        push(self, v)
    }

    /// See [`crate::ops::update`].
    pub fn update<V: Serialize + ?Sized>(&self, v: &V) -> Result<(), Error> {
        update(self, v)
    }

    /// See [`crate::ops::remove`].
    pub fn remove(&self) -> Result<(), Error> {
        remove(self)
    }
}

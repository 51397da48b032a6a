//! The request pipeline: serialize, build, send, classify, decode.

use std::io::{BufReader, Read};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::Error;
use crate::query::QueryOption;
use crate::reference::Ref;
use crate::transport::{Method, Response};

/// Perform `method` against `r` with optional body `value`, decoding the
/// response into `D`.
///
/// Numbers in the response keep their exact textual form when `D` is (or
/// contains) a [`serde_json::Value`].
pub fn do_request<V, D>(
    method: Method,
    r: &Ref,
    value: Option<&V>,
    opts: &[QueryOption],
) -> Result<D, Error>
where
    V: Serialize + ?Sized,
    D: DeserializeOwned,
{
    let response = send(method, r, value, opts)?;
    decode(response)
}

/// Like [`do_request`], but the response body is never decoded.
pub fn do_request_no_content<V>(
    method: Method,
    r: &Ref,
    value: Option<&V>,
    opts: &[QueryOption],
) -> Result<(), Error>
where
    V: Serialize + ?Sized,
{
    send(method, r, value, opts).map(drop)
}

/// Run everything up to and including status classification.
///
/// The returned response is known to be 2xx. Its body is released when the
/// response is dropped, whichever way the caller exits.
fn send<V>(method: Method, r: &Ref, value: Option<&V>, opts: &[QueryOption]) -> Result<Response, Error>
where
    V: Serialize + ?Sized,
{
    let body = value
        .map(|v| serde_json::to_vec(v).map_err(Error::Marshal))
        .transpose()?;

    let (client, request) = r.client_and_request(method, body, opts)?;

    tracing::debug!(method = %method, path = request.path(), "sending request");
    let response = client.send(request).map_err(Error::Transport)?;
    tracing::debug!(method = %method, path = %r.path(), status = response.status, "received response");

    check_server_error(response)
}

fn check_server_error(mut response: Response) -> Result<Response, Error> {
    if response.is_success() {
        return Ok(response);
    }

    let mut raw = Vec::new();
    if let Err(e) = response.body.read_to_end(&mut raw) {
        tracing::debug!(error = %e, "could not read error body");
        raw.clear();
    }

    let err = Error::server(response.status, response.status_text(), &raw);
    tracing::warn!(status = response.status, error = %err, "server rejected request");
    Err(err)
}

fn decode<D: DeserializeOwned>(response: Response) -> Result<D, Error> {
    serde_json::from_reader(BufReader::new(response.body)).map_err(Error::Unmarshal)
}

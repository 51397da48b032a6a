//! Security rules management.

use serde::Serialize;
use serde_json::value::RawValue;
use serde_json::Value;

use crate::error::Error;
use crate::reference::Ref;
use crate::request::{do_request, do_request_no_content};
use crate::transport::Method;

/// Location of the security rules, relative to the database root.
pub const RULES_PATH: &str = "/.settings/rules";

/// Replace the security rules with `v`.
pub fn set_rules<V: Serialize + ?Sized>(r: &Ref, v: &V) -> Result<(), Error> {
    do_request_no_content(Method::PUT, &r.child(RULES_PATH), Some(v), &[])
}

/// Replace the security rules with JSON text.
///
/// The input is parsed locally first, so malformed JSON never reaches the
/// server.
pub fn set_rules_json(r: &Ref, buf: &[u8]) -> Result<(), Error> {
    let v: Value = serde_json::from_slice(buf).map_err(Error::Unmarshal)?;
    set_rules(r, &v)
}

/// Fetch the security rules exactly as the server sent them.
pub fn get_rules_json(r: &Ref) -> Result<Vec<u8>, Error> {
    let raw: Box<RawValue> = do_request(Method::GET, &r.child(RULES_PATH), None::<&()>, &[])?;
    Ok(raw.get().as_bytes().to_vec())
}

impl Ref {
    /// Replace the security rules at this reference's rules location.
    pub fn set_rules<V: Serialize + ?Sized>(&self, v: &V) -> Result<(), Error> {
        set_rules(self, v)
    }

    /// Replace the security rules with JSON text, validated locally first.
    pub fn set_rules_json(&self, buf: &[u8]) -> Result<(), Error> {
        set_rules_json(self, buf)
    }

    /// Fetch the security rules as the exact bytes the server sent.
    pub fn get_rules_json(&self) -> Result<Vec<u8>, Error> {
        get_rules_json(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::transport::mock::MockTransport;
    use serde_json::json;
    use std::sync::Arc;

    fn root(transport: &MockTransport) -> Ref {
        Ref::with_transport_at("https://db.example.com", Arc::new(transport.clone())).unwrap()
    }

    #[test]
    fn set_rules_puts_to_rules_path() {
        let transport = MockTransport::new().with_default_response(200, "{}");

        set_rules(&root(&transport), &json!({"rules": {".read": true}})).unwrap();

        let recorded = transport.recorded_requests();
        assert_eq!(recorded[0].method, Method::PUT);
        assert_eq!(recorded[0].path(), "/.settings/rules.json");
        assert_eq!(
            recorded[0].body.as_deref(),
            Some(&br#"{"rules":{".read":true}}"#[..])
        );
    }

    #[test]
    fn set_rules_json_preserves_numbers() {
        let transport = MockTransport::new().with_default_response(200, "{}");

        root(&transport)
            .set_rules_json(br#"{"rules": {"limit": 12345678901234567890123}}"#)
            .unwrap();

        let recorded = transport.recorded_requests();
        assert_eq!(
            recorded[0].body.as_deref(),
            Some(&br#"{"rules":{"limit":12345678901234567890123}}"#[..])
        );
    }

    #[test]
    fn set_rules_json_rejects_malformed_input_locally() {
        let transport = MockTransport::new().with_default_response(200, "{}");

        let err = set_rules_json(&root(&transport), br#"{"rules": }"#).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Unmarshal);
        assert!(transport.recorded_requests().is_empty());
    }

    #[test]
    fn get_rules_json_returns_raw_bytes() {
        let raw = r#"{"rules":{".read":true,  ".write":false}}"#;
        let transport = MockTransport::new().with_response("/.settings/rules.json", 200, raw);

        let bytes = get_rules_json(&root(&transport)).unwrap();

        assert_eq!(bytes, raw.as_bytes());
        assert_eq!(transport.recorded_requests()[0].method, Method::GET);
    }

    #[test]
    fn get_rules_json_from_child_uses_nested_path() {
        let transport = MockTransport::new().with_default_response(200, "{}");

        get_rules_json(&root(&transport).child("tenant")).unwrap();

        assert_eq!(
            transport.recorded_requests()[0].path(),
            "/tenant/.settings/rules.json"
        );
    }

    #[test]
    fn get_rules_json_server_error() {
        let transport = MockTransport::new()
            .with_default_response(401, r#"{"error":"Permission denied"}"#);

        let err = root(&transport).get_rules_json().unwrap_err();

        assert_eq!(err.to_string(), "Permission denied");
    }
}

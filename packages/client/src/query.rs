//! Query options that shape a request.
//!
//! Options are applied in order, each appending one or more query parameters.

use std::time::Duration;

use serde_json::Value;

use crate::error::Error;

/// Longest read timeout the server accepts.
const MAX_TIMEOUT: Duration = Duration::from_secs(15 * 60);

/// Size limit for writes, enforced server side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteSizeLimit {
    Tiny,
    Small,
    Medium,
    Large,
    Unlimited,
}

impl WriteSizeLimit {
    fn as_str(&self) -> &'static str {
        match self {
            WriteSizeLimit::Tiny => "tiny",
            WriteSizeLimit::Small => "small",
            WriteSizeLimit::Medium => "medium",
            WriteSizeLimit::Large => "large",
            WriteSizeLimit::Unlimited => "unlimited",
        }
    }
}

/// A single request-shaping parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOption {
    /// Order children by the given child key.
    OrderBy(String),
    OrderByKey,
    OrderByValue,
    OrderByPriority,
    StartAt(Value),
    EndAt(Value),
    EqualTo(Value),
    LimitToFirst(u32),
    LimitToLast(u32),
    /// Return only the keys at this location, with `true` as every value.
    Shallow,
    PrettyPrint,
    /// Ask the server not to echo written data back.
    Silent,
    /// Include priority metadata in the response.
    Export,
    /// Server-side read timeout.
    Timeout(Duration),
    WriteSizeLimit(WriteSizeLimit),
}

impl QueryOption {
    pub fn name(&self) -> &'static str {
        match self {
            QueryOption::OrderBy(_)
            | QueryOption::OrderByKey
            | QueryOption::OrderByValue
            | QueryOption::OrderByPriority => "orderBy",
            QueryOption::StartAt(_) => "startAt",
            QueryOption::EndAt(_) => "endAt",
            QueryOption::EqualTo(_) => "equalTo",
            QueryOption::LimitToFirst(_) => "limitToFirst",
            QueryOption::LimitToLast(_) => "limitToLast",
            QueryOption::Shallow => "shallow",
            QueryOption::PrettyPrint | QueryOption::Silent => "print",
            QueryOption::Export => "format",
            QueryOption::Timeout(_) => "timeout",
            QueryOption::WriteSizeLimit(_) => "writeSizeLimit",
        }
    }

    /// Render this option as a query parameter value.
    pub fn value(&self) -> Result<String, Error> {
        let value = match self {
            QueryOption::OrderBy(key) => {
                if key.is_empty() {
                    return Err(self.invalid("child key must not be empty"));
                }
                Value::String(key.clone()).to_string()
            }
            QueryOption::OrderByKey => "\"$key\"".to_string(),
            QueryOption::OrderByValue => "\"$value\"".to_string(),
            QueryOption::OrderByPriority => "\"$priority\"".to_string(),
            QueryOption::StartAt(v) | QueryOption::EndAt(v) | QueryOption::EqualTo(v) => {
                match v {
                    Value::Array(_) | Value::Object(_) => {
                        return Err(self.invalid("filter value must be a scalar"))
                    }
                    _ => v.to_string(),
                }
            }
            QueryOption::LimitToFirst(n) | QueryOption::LimitToLast(n) => {
                if *n == 0 {
                    return Err(self.invalid("limit must be positive"));
                }
                n.to_string()
            }
            QueryOption::Shallow => "true".to_string(),
            QueryOption::PrettyPrint => "pretty".to_string(),
            QueryOption::Silent => "silent".to_string(),
            QueryOption::Export => "export".to_string(),
            QueryOption::Timeout(d) => {
                let ms = d.as_millis();
                if ms == 0 || *d > MAX_TIMEOUT {
                    return Err(self.invalid("timeout must be between 1ms and 15min"));
                }
                format!("{}ms", ms)
            }
            QueryOption::WriteSizeLimit(limit) => limit.as_str().to_string(),
        };
        Ok(value)
    }

    fn invalid(&self, message: &str) -> Error {
        Error::InvalidOption {
            option: self.name(),
            message: message.to_string(),
        }
    }
}

/// Fold options over a parameter list, in order.
pub(crate) fn apply_all(
    options: &[QueryOption],
    params: &mut Vec<(String, String)>,
) -> Result<(), Error> {
    for option in options {
        params.push((option.name().to_string(), option.value()?));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn order_by_is_json_quoted() {
        assert_eq!(
            QueryOption::OrderBy("height".into()).value().unwrap(),
            "\"height\""
        );
        assert_eq!(QueryOption::OrderByKey.value().unwrap(), "\"$key\"");
    }

    #[test]
    fn filter_values_render_as_json_literals() {
        assert_eq!(QueryOption::EqualTo(json!(25)).value().unwrap(), "25");
        assert_eq!(QueryOption::StartAt(json!("a")).value().unwrap(), "\"a\"");
        assert_eq!(QueryOption::EndAt(json!(false)).value().unwrap(), "false");
        assert!(QueryOption::EqualTo(json!({"a": 1})).value().is_err());
    }

    #[test]
    fn limits_must_be_positive() {
        assert_eq!(QueryOption::LimitToLast(3).value().unwrap(), "3");
        let err = QueryOption::LimitToFirst(0).value().unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid query option limitToFirst: limit must be positive"
        );
    }

    #[test]
    fn timeout_bounds() {
        assert_eq!(
            QueryOption::Timeout(Duration::from_secs(3)).value().unwrap(),
            "3000ms"
        );
        assert!(QueryOption::Timeout(Duration::ZERO).value().is_err());
        assert!(QueryOption::Timeout(Duration::from_secs(16 * 60))
            .value()
            .is_err());
    }

    #[test]
    fn apply_all_keeps_order() {
        let mut params = Vec::new();
        apply_all(
            &[
                QueryOption::OrderByValue,
                QueryOption::LimitToFirst(2),
                QueryOption::Shallow,
                QueryOption::WriteSizeLimit(WriteSizeLimit::Small),
            ],
            &mut params,
        )
        .unwrap();

        let names: Vec<&str> = params.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(
            names,
            ["orderBy", "limitToFirst", "shallow", "writeSizeLimit"]
        );
        assert_eq!(params[3].1, "small");
    }

    #[test]
    fn apply_all_stops_at_first_invalid() {
        let mut params = Vec::new();
        let result = apply_all(
            &[QueryOption::Export, QueryOption::LimitToLast(0)],
            &mut params,
        );
        assert!(result.is_err());
    }
}

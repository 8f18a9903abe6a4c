//! Flattening errors (cause chain included) into plain JSON-safe records.
//!
//! [`HttpError::to_object`] merges the variant's fixed metadata and the
//! instance's fields into one flat `serde_json::Map`: variant constants
//! first, instance fields second, so an instance field wins a key collision.
//! A linked cause serializes recursively in place as a nested record —
//! output depth matches the actual cause-chain depth and contains no live
//! error references.
//!
//! `trace`/`stack` keys are excluded by default at every nesting level;
//! callers can exclude more keys by exact name or [`regex::Regex`] pattern.
//! A visited set keyed on shared-pointer identity bounds recursion, so even
//! a pathological cause graph terminates.
//!
//! The [`serde::Serialize`] impl for [`HttpError`] delegates here with the
//! default exclusions, which makes instances directly usable with
//! structured-logging sinks and `serde_json`.

use std::collections::HashSet;

use regex::Regex;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use crate::error::{Cause, HttpError};

/// Keys never emitted, at any nesting level.
const DEFAULT_EXCLUDED: &[&str] = &["stack", "trace"];

/// A field-exclusion rule for [`HttpError::to_object`].
#[derive(Debug, Clone)]
pub enum Exclude {
    /// Exclude a field by exact key.
    Field(String),
    /// Exclude every field whose key matches the pattern.
    Pattern(Regex),
}

impl Exclude {
    /// Exclude a field by exact key.
    #[must_use]
    pub fn field(key: impl Into<String>) -> Self {
        Self::Field(key.into())
    }

    /// Exclude every field whose key matches the pattern.
    #[must_use]
    pub fn pattern(pattern: Regex) -> Self {
        Self::Pattern(pattern)
    }

    fn matches(&self, key: &str) -> bool {
        match self {
            Self::Field(name) => name == key,
            Self::Pattern(pattern) => pattern.is_match(key),
        }
    }
}

impl From<&str> for Exclude {
    fn from(key: &str) -> Self {
        Self::field(key)
    }
}

impl From<String> for Exclude {
    fn from(key: String) -> Self {
        Self::Field(key)
    }
}

impl From<Regex> for Exclude {
    fn from(pattern: Regex) -> Self {
        Self::Pattern(pattern)
    }
}

fn is_excluded(key: &str, excludes: &[Exclude]) -> bool {
    DEFAULT_EXCLUDED.contains(&key) || excludes.iter().any(|rule| rule.matches(key))
}

fn insert_unless_excluded(
    out: &mut Map<String, Value>,
    key: &str,
    value: Value,
    excludes: &[Exclude],
) {
    if !is_excluded(key, excludes) {
        out.insert(key.to_string(), value);
    }
}

impl HttpError {
    /// Serialize this error and its cause chain into a flat record.
    ///
    /// `excludes` adds to the default `trace`/`stack` exclusions and applies
    /// at every nesting level. Serializing the same instance twice with the
    /// same exclusions yields structurally equal records.
    #[must_use]
    pub fn to_object(&self, excludes: &[Exclude]) -> Map<String, Value> {
        let mut visited: HashSet<*const ()> = HashSet::new();
        visited.insert(std::ptr::from_ref(self).cast());
        serialize_error(self, excludes, &mut visited)
    }
}

impl Serialize for HttpError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_object(&[]).serialize(serializer)
    }
}

fn serialize_error(
    err: &HttpError,
    excludes: &[Exclude],
    visited: &mut HashSet<*const ()>,
) -> Map<String, Value> {
    let mut out = Map::new();
    // Variant-level constants first; instance fields override on collision.
    insert_unless_excluded(&mut out, "name", Value::from(err.name()), excludes);
    insert_unless_excluded(&mut out, "code", Value::from(err.code()), excludes);
    insert_unless_excluded(&mut out, "title", Value::from(err.title()), excludes);
    insert_unless_excluded(&mut out, "statusCode", Value::from(err.status()), excludes);
    if let Some(message) = err.message() {
        insert_unless_excluded(&mut out, "message", Value::from(message), excludes);
    }
    if let Some(details) = err.details() {
        insert_unless_excluded(&mut out, "details", details.clone(), excludes);
    }
    for (key, value) in err.fields() {
        insert_unless_excluded(&mut out, key, value.clone(), excludes);
    }
    if let Some(cause) = err.cause() {
        if !is_excluded("cause", excludes) {
            out.insert(
                "cause".to_string(),
                Value::Object(serialize_cause(cause, excludes, visited)),
            );
        }
    }
    out
}

fn serialize_cause(
    cause: &Cause,
    excludes: &[Exclude],
    visited: &mut HashSet<*const ()>,
) -> Map<String, Value> {
    if !visited.insert(cause.identity()) {
        // Already serialized somewhere up the chain: emit a summary instead
        // of recursing again.
        let mut out = Map::new();
        insert_unless_excluded(&mut out, "name", Value::from(cause.name()), excludes);
        insert_unless_excluded(&mut out, "message", Value::from(cause.to_string()), excludes);
        return out;
    }
    match cause.as_http() {
        Some(inner) => serialize_error(inner, excludes, visited),
        None => serialize_foreign(cause.name(), cause.as_error(), excludes, visited),
    }
}

fn serialize_foreign(
    name: &str,
    error: &(dyn std::error::Error + 'static),
    excludes: &[Exclude],
    visited: &mut HashSet<*const ()>,
) -> Map<String, Value> {
    let mut out = Map::new();
    insert_unless_excluded(&mut out, "name", Value::from(name), excludes);
    insert_unless_excluded(&mut out, "message", Value::from(error.to_string()), excludes);
    if let Some(source) = error.source() {
        let identity: *const () = std::ptr::from_ref(source).cast();
        if visited.insert(identity) && !is_excluded("cause", excludes) {
            out.insert(
                "cause".to_string(),
                Value::Object(serialize_foreign("Error", source, excludes, visited)),
            );
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::registry;
    use crate::error::ErrorConfig;
    use serde_json::json;

    fn chain_of_three() -> HttpError {
        let not_found = registry().get("NotFound").unwrap();
        let bad_gateway = registry().get("BadGateway").unwrap();
        let service_unavailable = registry().get("ServiceUnavailable").unwrap();

        let innermost = not_found.build("record 42 missing");
        let middle = bad_gateway.build(innermost);
        service_unavailable.build(
            ErrorConfig::new()
                .message("shedding load")
                .cause(middle)
                .field("retryAfter", 30),
        )
    }

    #[test]
    fn test_nested_causes_flatten_to_records() {
        let record = chain_of_three().to_object(&[]);

        assert_eq!(record["name"], json!("ServiceUnavailable"));
        assert_eq!(record["statusCode"], json!(503));
        assert_eq!(record["retryAfter"], json!(30));

        let middle = record["cause"].as_object().expect("nested record");
        assert_eq!(middle["name"], json!("BadGateway"));
        let innermost = middle["cause"].as_object().expect("deep nested record");
        assert_eq!(innermost["name"], json!("NotFound"));
        assert_eq!(innermost["message"], json!("record 42 missing"));
        assert!(innermost.get("cause").is_none());
    }

    #[test]
    fn test_trace_is_excluded_by_default_at_every_level() {
        let value = Value::Object(chain_of_three().to_object(&[]));
        assert_no_key(&value, "trace");
        assert_no_key(&value, "stack");
    }

    #[test]
    fn test_exact_name_exclusion_applies_to_nested_causes() {
        let record = chain_of_three().to_object(&[Exclude::from("message")]);
        let value = Value::Object(record);
        assert_no_key(&value, "message");
    }

    #[test]
    fn test_pattern_exclusion() {
        let record = chain_of_three().to_object(&[Exclude::pattern(Regex::new("^retry").unwrap())]);
        assert!(record.get("retryAfter").is_none());
        assert_eq!(record["name"], json!("ServiceUnavailable"));
    }

    #[test]
    fn test_serialization_is_idempotent() {
        let err = chain_of_three();
        let excludes = [Exclude::from("details")];
        assert_eq!(err.to_object(&excludes), err.to_object(&excludes));
    }

    #[test]
    fn test_name_present_without_message() {
        let conflict = registry().get("Conflict").unwrap();
        let err = conflict.build(ErrorConfig::new().details(json!({"key": "k1"})));
        let record = err.to_object(&[]);
        assert_eq!(record["name"], json!("Conflict"));
        assert!(record.get("message").is_none());
        assert_eq!(record["details"], json!({"key": "k1"}));
    }

    #[test]
    fn test_foreign_cause_serializes_name_and_message() {
        let bad_gateway = registry().get("BadGateway").unwrap();
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "peer reset");
        let err = bad_gateway.build(crate::error::Cause::foreign(io));
        let record = err.to_object(&[]);
        let cause = record["cause"].as_object().unwrap();
        assert_eq!(cause["name"], json!("Error"));
        assert_eq!(cause["message"], json!("peer reset"));
    }

    #[test]
    fn test_revisited_cause_collapses_to_summary() {
        let not_found = registry().get("NotFound").unwrap();
        let inner = not_found.build("seen once");
        let cause = Cause::from(inner);

        let mut visited: HashSet<*const ()> = HashSet::new();
        visited.insert(cause.identity());
        let record = serialize_cause(&cause, &[], &mut visited);
        assert_eq!(record["name"], json!("NotFound"));
        assert!(record.get("cause").is_none());
        assert!(record.get("statusCode").is_none());
    }

    #[test]
    fn test_deep_chain_terminates() {
        let internal = registry().get("InternalServerError").unwrap();
        let mut err = internal.build("bottom");
        for _ in 0..50 {
            err = internal.build(err);
        }
        let root = Value::Object(err.to_object(&[]));
        let mut depth = 0;
        let mut node = &root;
        while let Some(cause) = node.get("cause") {
            depth += 1;
            node = cause;
        }
        assert_eq!(depth, 50);
    }

    #[test]
    fn test_serde_serialize_matches_to_object() {
        let err = chain_of_three();
        let via_serde = serde_json::to_value(&err).unwrap();
        assert_eq!(via_serde, Value::Object(err.to_object(&[])));
    }

    fn assert_no_key(value: &Value, key: &str) {
        match value {
            Value::Object(map) => {
                assert!(!map.contains_key(key), "unexpected key `{key}`");
                for nested in map.values() {
                    assert_no_key(nested, key);
                }
            }
            Value::Array(items) => {
                for item in items {
                    assert_no_key(item, key);
                }
            }
            _ => {}
        }
    }
}

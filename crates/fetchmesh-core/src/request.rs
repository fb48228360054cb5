//! Fetch requests and cache fingerprints.
//!
//! A [`FetchRequest`] names an operation (`latest_rates`, `ip_location`, ...)
//! and carries its parameters in canonical string form. Keys are trimmed and
//! lowercased on entry and the map is ordered, so two logically identical
//! requests always derive the same [`Fingerprint`] regardless of the order
//! the caller supplied the arguments in.

use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

use serde::Serialize;

use crate::error::ConfigError;

/// A parameter value rendered canonically before fingerprinting.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Flag(bool),
}

impl ParamValue {
    fn render(&self) -> String {
        match self {
            Self::Text(value) => value.trim().to_owned(),
            Self::Integer(value) => value.to_string(),
            // `{}` on f64 prints the shortest round-trippable form, which is
            // stable for equal inputs.
            Self::Float(value) => value.to_string(),
            Self::Flag(value) => value.to_string(),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        Self::Flag(value)
    }
}

/// One fetch call: an operation name plus canonicalized parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchRequest {
    operation: String,
    params: BTreeMap<String, String>,
}

impl FetchRequest {
    pub fn new(operation: impl Into<String>) -> Result<Self, ConfigError> {
        let operation = operation.into().trim().to_ascii_lowercase();
        if operation.is_empty() {
            return Err(ConfigError::EmptyOperation);
        }
        Ok(Self {
            operation,
            params: BTreeMap::new(),
        })
    }

    /// Sets a parameter, overwriting any previous value for the key.
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        let key = key.into().trim().to_ascii_lowercase();
        self.params.insert(key, value.into().render());
        self
    }

    /// Inserts a canonical default only when the caller omitted the key, so
    /// an explicit value and an omitted optional fingerprint identically.
    pub fn with_default(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        let key = key.into().trim().to_ascii_lowercase();
        self.params.entry(key).or_insert_with(|| value.into().render());
        self
    }

    pub fn operation(&self) -> &str {
        &self.operation
    }

    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    pub fn params(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    /// Derives the deterministic cache key for this request.
    pub fn fingerprint(&self) -> Fingerprint {
        let mut key = urlencoding::encode(&self.operation).into_owned();
        for (name, value) in &self.params {
            key.push(if key.contains('?') { '&' } else { '?' });
            key.push_str(&urlencoding::encode(name));
            key.push('=');
            key.push_str(&urlencoding::encode(value));
        }
        Fingerprint(key)
    }
}

/// Deterministic cache key derived from a [`FetchRequest`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Fingerprint {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_operation() {
        assert_eq!(
            FetchRequest::new("  ").expect_err("must fail"),
            ConfigError::EmptyOperation
        );
    }

    #[test]
    fn fingerprint_ignores_argument_order() {
        let first = FetchRequest::new("pair_rate")
            .expect("valid operation")
            .with_param("base", "USD")
            .with_param("target", "EUR");
        let second = FetchRequest::new("pair_rate")
            .expect("valid operation")
            .with_param("target", "EUR")
            .with_param("base", "USD");

        assert_eq!(first.fingerprint(), second.fingerprint());
    }

    #[test]
    fn omitted_default_matches_explicit_value() {
        let explicit = FetchRequest::new("forecast")
            .expect("valid operation")
            .with_param("days", 7_i64);
        let defaulted = FetchRequest::new("forecast")
            .expect("valid operation")
            .with_default("days", 7_i64);

        assert_eq!(explicit.fingerprint(), defaulted.fingerprint());
    }

    #[test]
    fn explicit_value_wins_over_default() {
        let request = FetchRequest::new("forecast")
            .expect("valid operation")
            .with_param("days", 3_i64)
            .with_default("days", 7_i64);

        assert_eq!(request.param("days"), Some("3"));
    }

    #[test]
    fn keys_are_trimmed_and_lowercased() {
        let request = FetchRequest::new("GEOCODE")
            .expect("valid operation")
            .with_param("  Name ", "Berlin");

        assert_eq!(request.operation(), "geocode");
        assert_eq!(request.param("name"), Some("Berlin"));
    }

    #[test]
    fn numeric_values_render_canonically() {
        let request = FetchRequest::new("forecast")
            .expect("valid operation")
            .with_param("latitude", 52.52_f64)
            .with_param("count", 10_i64)
            .with_param("metric", true);

        assert_eq!(request.param("latitude"), Some("52.52"));
        assert_eq!(request.param("count"), Some("10"));
        assert_eq!(request.param("metric"), Some("true"));
    }

    #[test]
    fn fingerprint_percent_encodes_values() {
        let request = FetchRequest::new("country_by_name")
            .expect("valid operation")
            .with_param("name", "new zealand");

        assert_eq!(
            request.fingerprint().as_str(),
            "country_by_name?name=new%20zealand"
        );
    }
}

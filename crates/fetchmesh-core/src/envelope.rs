//! The uniform result and wire envelope returned to callers.
//!
//! Every fetch, no matter how many providers were tried or why they failed,
//! surfaces as one [`FetchResult`]; [`ResponseEnvelope`] is its serialized
//! shape. Per-provider diagnostics live in the failure's attempt list.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ErrorKind;
use crate::resolver::ProviderAttempt;
use crate::timestamp::UtcTimestamp;

/// Outcome of one `fetch` call. The only type callers ever see.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchResult {
    Success {
        value: Value,
        source_provider: Option<String>,
        served_from_cache: bool,
    },
    Failure {
        kind: ErrorKind,
        message: String,
        retry_after: Option<Duration>,
        attempts: Vec<ProviderAttempt>,
    },
}

impl FetchResult {
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub const fn served_from_cache(&self) -> bool {
        matches!(
            self,
            Self::Success {
                served_from_cache: true,
                ..
            }
        )
    }

    pub fn value(&self) -> Option<&Value> {
        match self {
            Self::Success { value, .. } => Some(value),
            Self::Failure { .. } => None,
        }
    }

    /// Serializable wire shape, stamped with the current time.
    pub fn to_envelope(&self) -> ResponseEnvelope {
        match self {
            Self::Success {
                value,
                source_provider,
                served_from_cache,
            } => ResponseEnvelope {
                status: EnvelopeStatus::Success,
                data: Some(value.clone()),
                error: None,
                served_from_cache: *served_from_cache,
                source_provider: source_provider.clone(),
                timestamp: UtcTimestamp::now(),
            },
            Self::Failure {
                kind,
                message,
                retry_after,
                attempts,
            } => ResponseEnvelope {
                status: EnvelopeStatus::Error,
                data: None,
                error: Some(EnvelopeErrorBody {
                    kind: *kind,
                    message: message.clone(),
                    retry_after_secs: retry_after.map(|duration| duration.as_secs()),
                    attempted_providers: attempts
                        .iter()
                        .map(|attempt| AttemptBody {
                            provider: attempt.provider.clone(),
                            kind: attempt.error.kind(),
                            message: attempt.error.message().to_owned(),
                        })
                        .collect(),
                }),
                served_from_cache: false,
                source_provider: None,
                timestamp: UtcTimestamp::now(),
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnvelopeStatus {
    Success,
    Error,
}

/// One failed provider attempt, as serialized in the error body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttemptBody {
    pub provider: String,
    pub kind: ErrorKind,
    pub message: String,
}

/// Error block of the wire envelope, present iff `status == error`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvelopeErrorBody {
    pub kind: ErrorKind,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry_after_secs: Option<u64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attempted_providers: Vec<AttemptBody>,
}

/// Stable serialized response shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    pub status: EnvelopeStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<EnvelopeErrorBody>,
    pub served_from_cache: bool,
    pub source_provider: Option<String>,
    pub timestamp: UtcTimestamp,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProviderError;
    use serde_json::json;

    #[test]
    fn success_envelope_carries_data_and_source() {
        let result = FetchResult::Success {
            value: json!({"rate": 0.91}),
            source_provider: Some(String::from("exchangerate-api")),
            served_from_cache: false,
        };

        let envelope = result.to_envelope();
        let serialized = serde_json::to_value(&envelope).expect("serializable");

        assert_eq!(serialized["status"], "success");
        assert_eq!(serialized["data"]["rate"], 0.91);
        assert_eq!(serialized["source_provider"], "exchangerate-api");
        assert_eq!(serialized["served_from_cache"], false);
        assert!(serialized.get("error").is_none());
    }

    #[test]
    fn cache_hit_envelope_flags_the_cache() {
        let result = FetchResult::Success {
            value: json!(1),
            source_provider: Some(String::from("cache")),
            served_from_cache: true,
        };

        assert!(result.served_from_cache());
        let serialized = serde_json::to_value(result.to_envelope()).expect("serializable");
        assert_eq!(serialized["served_from_cache"], true);
    }

    #[test]
    fn failure_envelope_lists_attempted_providers() {
        let result = FetchResult::Failure {
            kind: ErrorKind::Network,
            message: String::from("all providers failed"),
            retry_after: None,
            attempts: vec![ProviderAttempt {
                provider: String::from("primary"),
                error: ProviderError::http(500, "upstream returned status 500"),
            }],
        };

        let serialized = serde_json::to_value(result.to_envelope()).expect("serializable");
        assert_eq!(serialized["status"], "error");
        assert_eq!(serialized["error"]["kind"], "NetworkError");
        assert_eq!(
            serialized["error"]["attempted_providers"][0]["provider"],
            "primary"
        );
        assert_eq!(
            serialized["error"]["attempted_providers"][0]["kind"],
            "HttpError"
        );
        assert!(serialized.get("data").is_none());
        assert!(serialized["source_provider"].is_null());
    }

    #[test]
    fn quota_failure_carries_retry_after_seconds() {
        let result = FetchResult::Failure {
            kind: ErrorKind::QuotaExceeded,
            message: String::from("quota exhausted"),
            retry_after: Some(Duration::from_secs(90)),
            attempts: Vec::new(),
        };

        let serialized = serde_json::to_value(result.to_envelope()).expect("serializable");
        assert_eq!(serialized["error"]["kind"], "QuotaExceeded");
        assert_eq!(serialized["error"]["retry_after_secs"], 90);
        assert!(serialized["error"].get("attempted_providers").is_none());
    }

    #[test]
    fn envelope_timestamp_is_rfc3339() {
        let result = FetchResult::Success {
            value: json!(1),
            source_provider: None,
            served_from_cache: false,
        };

        let serialized = serde_json::to_value(result.to_envelope()).expect("serializable");
        let timestamp = serialized["timestamp"].as_str().expect("timestamp string");
        UtcTimestamp::parse(timestamp).expect("must be RFC3339");
    }
}

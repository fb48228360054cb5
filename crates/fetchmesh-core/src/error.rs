//! Error taxonomy shared by every layer of the crate.
//!
//! Two families exist: [`ConfigError`] for construction-time mistakes, which
//! are fatal and never retried, and [`ProviderError`] for runtime failures of
//! a single provider attempt, which the resolver treats as values and falls
//! through. [`ErrorKind`] is the stable label both families surface on the
//! wire.

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Normalized error label used in envelopes and attempt diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    #[serde(rename = "NetworkError")]
    Network,
    #[serde(rename = "HttpError")]
    Http,
    #[serde(rename = "ParseError")]
    Parse,
    #[serde(rename = "AuthError")]
    Auth,
    #[serde(rename = "RateLimited")]
    RateLimited,
    #[serde(rename = "NotFound")]
    NotFound,
    #[serde(rename = "UnknownError")]
    Unknown,
    #[serde(rename = "QuotaExceeded")]
    QuotaExceeded,
    #[serde(rename = "ConfigError")]
    Config,
}

impl ErrorKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Network => "NetworkError",
            Self::Http => "HttpError",
            Self::Parse => "ParseError",
            Self::Auth => "AuthError",
            Self::RateLimited => "RateLimited",
            Self::NotFound => "NotFound",
            Self::Unknown => "UnknownError",
            Self::QuotaExceeded => "QuotaExceeded",
            Self::Config => "ConfigError",
        }
    }
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Misconfiguration detected while assembling a fetcher, resolver, or
/// provider. Surfaced at setup time, never from `fetch`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("operation name cannot be empty")]
    EmptyOperation,
    #[error("provider name cannot be empty")]
    EmptyProviderName,
    #[error("base url cannot be empty")]
    EmptyBaseUrl,

    #[error("cache ttl must be greater than zero")]
    ZeroCacheTtl,
    #[error("quota limit must be greater than zero")]
    ZeroQuotaLimit,
    #[error("quota window must be greater than zero")]
    ZeroQuotaWindow,
    #[error("throttle limit must be greater than zero")]
    ZeroThrottleLimit,
    #[error("throttle window must be greater than zero")]
    ZeroThrottleWindow,

    #[error("at least one provider must be configured")]
    NoProviders,
    #[error("provider '{name}' is configured more than once")]
    DuplicateProvider { name: String },
    #[error("provider '{name}' registers no endpoints")]
    NoEndpoints { name: String },
    #[error("operation '{operation}' has more than one endpoint template")]
    DuplicateEndpoint { operation: String },
    #[error("provider '{name}' uses a '{{key}}' path placeholder but no path credential is configured")]
    MissingPathCredential { name: String },
}

/// Failure of one provider attempt, normalized across transports and APIs.
///
/// Constructors fix the [`ErrorKind`] and the retry hint so the resolver and
/// retry policy can reason about attempts uniformly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderError {
    kind: ErrorKind,
    message: String,
    status: Option<u16>,
    timeout: bool,
    retryable: bool,
}

impl ProviderError {
    pub fn network(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Network,
            message: message.into(),
            status: None,
            timeout: false,
            retryable: true,
        }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Network,
            message: message.into(),
            status: None,
            timeout: true,
            retryable: true,
        }
    }

    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Http,
            message: message.into(),
            status: Some(status),
            timeout: false,
            retryable: status == 408 || status >= 500,
        }
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Parse,
            message: message.into(),
            status: None,
            timeout: false,
            retryable: false,
        }
    }

    pub fn auth(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Auth,
            message: message.into(),
            status: None,
            timeout: false,
            retryable: false,
        }
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::RateLimited,
            message: message.into(),
            status: None,
            timeout: false,
            retryable: true,
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::NotFound,
            message: message.into(),
            status: None,
            timeout: false,
            retryable: false,
        }
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Unknown,
            message: message.into(),
            status: None,
            timeout: false,
            retryable: false,
        }
    }

    pub const fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// HTTP status for [`ErrorKind::Http`] failures; `None` otherwise.
    pub const fn status(&self) -> Option<u16> {
        self.status
    }

    /// Whether a network failure was a timeout rather than a broken transport.
    pub const fn is_timeout(&self) -> bool {
        self.timeout
    }

    pub const fn retryable(&self) -> bool {
        self.retryable
    }
}

impl Display for ProviderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.kind.as_str())
    }
}

impl std::error::Error for ProviderError {}

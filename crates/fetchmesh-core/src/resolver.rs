//! Fallback iteration over an ordered provider chain.
//!
//! Every provider outcome is a value: a success stops the chain, any failure
//! is recorded and the next provider is tried. Nothing a provider returns can
//! escape as a panic or a raw transport error.

use std::fmt::{Display, Formatter};
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{ConfigError, ErrorKind, ProviderError};
use crate::provider::ProviderClient;
use crate::request::FetchRequest;

/// One failed provider attempt, in chain order.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderAttempt {
    pub provider: String,
    pub error: ProviderError,
}

/// Successful resolution, tagged with the provider that served it and the
/// failed attempts that preceded it.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub value: Value,
    pub provider: String,
    pub attempts: Vec<ProviderAttempt>,
}

/// Every eligible provider failed (or none was eligible).
#[derive(Debug, Clone, PartialEq)]
pub struct ResolutionError {
    kind: ErrorKind,
    message: String,
    attempts: Vec<ProviderAttempt>,
}

impl ResolutionError {
    pub const fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn attempts(&self) -> &[ProviderAttempt] {
        &self.attempts
    }

    pub fn into_attempts(self) -> Vec<ProviderAttempt> {
        self.attempts
    }
}

impl Display for ResolutionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.kind.as_str())
    }
}

impl std::error::Error for ResolutionError {}

/// Ordered provider chain. Construction validates the chain once; `resolve`
/// then walks it in (priority, declaration order).
pub struct FallbackResolver {
    providers: Vec<Arc<dyn ProviderClient>>,
}

impl std::fmt::Debug for FallbackResolver {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FallbackResolver")
            .field(
                "providers",
                &self
                    .providers
                    .iter()
                    .map(|p| p.descriptor().name().to_owned())
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl FallbackResolver {
    pub fn new(providers: Vec<Arc<dyn ProviderClient>>) -> Result<Self, ConfigError> {
        if providers.is_empty() {
            return Err(ConfigError::NoProviders);
        }

        let mut seen = std::collections::HashSet::new();
        for provider in &providers {
            let name = provider.descriptor().name();
            if !seen.insert(name.to_owned()) {
                return Err(ConfigError::DuplicateProvider {
                    name: name.to_owned(),
                });
            }
        }

        // Stable sort keeps declaration order for equal priorities.
        let mut providers = providers;
        providers.sort_by_key(|provider| provider.descriptor().priority());

        Ok(Self { providers })
    }

    pub fn provider_names(&self) -> Vec<&str> {
        self.providers
            .iter()
            .map(|provider| provider.descriptor().name())
            .collect()
    }

    /// Tries providers in order until one succeeds.
    ///
    /// Providers that do not support the request's operation are skipped
    /// without counting as attempts. A failing provider (auth, rate limit,
    /// transport, anything) is recorded and the chain moves on; nothing is
    /// permanently disabled.
    pub async fn resolve(&self, request: &FetchRequest) -> Result<Resolution, ResolutionError> {
        let operation = request.operation();
        let mut attempts = Vec::new();

        for provider in &self.providers {
            let descriptor = provider.descriptor();
            if !descriptor.supports(operation) {
                debug!(
                    provider = descriptor.name(),
                    operation, "provider does not support operation, skipping"
                );
                continue;
            }

            match provider.fetch(request).await {
                Ok(value) => {
                    if !attempts.is_empty() {
                        warn!(
                            provider = descriptor.name(),
                            failed_attempts = attempts.len(),
                            "fallback succeeded after earlier provider failures"
                        );
                    }
                    return Ok(Resolution {
                        value,
                        provider: descriptor.name().to_owned(),
                        attempts,
                    });
                }
                Err(error) => {
                    warn!(
                        provider = descriptor.name(),
                        kind = error.kind().as_str(),
                        error = error.message(),
                        "provider attempt failed, falling through"
                    );
                    attempts.push(ProviderAttempt {
                        provider: descriptor.name().to_owned(),
                        error,
                    });
                }
            }
        }

        if attempts.is_empty() {
            return Err(ResolutionError {
                kind: ErrorKind::Config,
                message: format!("no configured provider supports operation '{operation}'"),
                attempts,
            });
        }

        // The last attempt's kind labels the aggregate; the full list stays
        // available for diagnostics.
        let last = attempts.last().expect("attempts is non-empty");
        Err(ResolutionError {
            kind: last.error.kind(),
            message: format!(
                "all {} eligible provider(s) failed for operation '{operation}'; last: {}",
                attempts.len(),
                last.error.message()
            ),
            attempts,
        })
    }
}

//! Cached multi-provider fetch core.
//!
//! Thin API-wrapper agents keep reimplementing the same plumbing: an HTTP
//! call, a TTL cache in front of it, a fallback provider when the first one
//! fails, and a quota counter so a free tier is not burned through. This
//! crate implements that pattern once:
//!
//! - [`CacheStore`]: fingerprint-keyed TTL cache, lazy expiry.
//! - [`QuotaTracker`]: atomic check-and-increment against a rolling window.
//! - [`ProviderClient`] / [`RestProvider`]: one-call adapters over an
//!   [`HttpClient`] transport, failures normalized into [`ErrorKind`].
//! - [`FallbackResolver`]: ordered provider chain, first success wins.
//! - [`CachedFetcher`]: the composition and sole public entry point.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use fetchmesh_core::{CachedFetcher, FetchRequest, ReqwestHttpClient};
//! use fetchmesh_core::providers::exchange_rate;
//!
//! let transport = Arc::new(ReqwestHttpClient::new());
//! let fetcher = CachedFetcher::new(
//!     exchange_rate::suggested_config(),
//!     vec![
//!         Arc::new(exchange_rate::primary(api_key, transport.clone())?),
//!         Arc::new(exchange_rate::fallback(transport)?),
//!     ],
//! )?;
//!
//! let request = FetchRequest::new("pair_rate")?
//!     .with_param("base", "USD")
//!     .with_param("target", "EUR");
//! let envelope = fetcher.fetch(&request).await.to_envelope();
//! ```
//!
//! The crate installs no tracing subscriber and reads no environment
//! variables; credentials and logging are the embedding application's job.

pub mod cache;
pub mod config;
pub mod envelope;
pub mod error;
pub mod fetcher;
pub mod http;
pub mod provider;
pub mod providers;
pub mod quota;
pub mod request;
pub mod resolver;
pub mod retry;
pub mod throttle;
pub mod timestamp;

pub use cache::{CacheEntry, CacheStats, CacheStore};
pub use config::FetcherConfig;
pub use envelope::{
    AttemptBody, EnvelopeErrorBody, EnvelopeStatus, FetchResult, ResponseEnvelope,
};
pub use error::{ConfigError, ErrorKind, ProviderError};
pub use fetcher::{CachedFetcher, FetcherStats};
pub use http::{
    HttpAuth, HttpClient, HttpError, HttpMethod, HttpRequest, HttpResponse, NoopHttpClient,
    ReqwestHttpClient,
};
pub use provider::{ProviderClient, ProviderDescriptor, ProviderFuture};
pub use providers::{EndpointTemplate, RestProvider, RestProviderBuilder};
pub use quota::{QuotaDecision, QuotaStats, QuotaTracker};
pub use request::{FetchRequest, Fingerprint, ParamValue};
pub use resolver::{FallbackResolver, ProviderAttempt, Resolution, ResolutionError};
pub use retry::{Backoff, RetryPolicy};
pub use throttle::ProviderThrottle;
pub use timestamp::UtcTimestamp;

//! The public entry point: cache, quota, and fallback composed into `fetch`.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn, Instrument};
use uuid::Uuid;

use crate::cache::{CacheStats, CacheStore};
use crate::config::FetcherConfig;
use crate::envelope::FetchResult;
use crate::error::{ConfigError, ErrorKind};
use crate::provider::ProviderClient;
use crate::quota::{QuotaDecision, QuotaStats, QuotaTracker};
use crate::request::FetchRequest;
use crate::resolver::FallbackResolver;

/// Per-instance counters plus component snapshots.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FetcherStats {
    pub fetches: u64,
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub quota_denials: u64,
    pub provider_failures: u64,
    pub cache: CacheStats,
    pub quota: QuotaStats,
}

/// Cached multi-provider fetcher.
///
/// Owns its [`CacheStore`] and [`QuotaTracker`] exclusively; constructing one
/// fetcher per agent keeps state instance-scoped with no process-wide
/// singletons. A fetch walks the fixed pipeline: fingerprint, cache check,
/// quota check, fallback resolution, cache write. Runtime failures never
/// panic and never surface as `Err`; they are [`FetchResult`] values.
impl std::fmt::Debug for CachedFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachedFetcher")
            .field("resolver", &self.resolver)
            .finish_non_exhaustive()
    }
}

pub struct CachedFetcher {
    config: FetcherConfig,
    cache: CacheStore,
    quota: QuotaTracker,
    resolver: FallbackResolver,
    fetches: AtomicU64,
    cache_hits: AtomicU64,
    cache_misses: AtomicU64,
    quota_denials: AtomicU64,
    provider_failures: AtomicU64,
}

impl CachedFetcher {
    /// Validates the configuration and provider chain once; misconfiguration
    /// fails here, never at first fetch.
    pub fn new(
        config: FetcherConfig,
        providers: Vec<Arc<dyn ProviderClient>>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let quota = QuotaTracker::new(config.quota_limit, config.quota_window)?;
        let resolver = FallbackResolver::new(providers)?;

        Ok(Self {
            config,
            cache: CacheStore::new(),
            quota,
            resolver,
            fetches: AtomicU64::new(0),
            cache_hits: AtomicU64::new(0),
            cache_misses: AtomicU64::new(0),
            quota_denials: AtomicU64::new(0),
            provider_failures: AtomicU64::new(0),
        })
    }

    pub fn config(&self) -> &FetcherConfig {
        &self.config
    }

    /// Fetches data for the request, respecting cache and quota and falling
    /// back across providers.
    pub async fn fetch(&self, request: &FetchRequest) -> FetchResult {
        let request_id = Uuid::new_v4();
        let span = tracing::debug_span!(
            "fetch",
            %request_id,
            operation = %request.operation()
        );
        self.fetch_inner(request).instrument(span).await
    }

    async fn fetch_inner(&self, request: &FetchRequest) -> FetchResult {
        self.fetches.fetch_add(1, Ordering::Relaxed);
        let fingerprint = request.fingerprint();

        // Cache hit: no quota consumed, no network call.
        if let Some(entry) = self.cache.get(&fingerprint).await {
            self.cache_hits.fetch_add(1, Ordering::Relaxed);
            debug!(%fingerprint, "serving from cache");
            return FetchResult::Success {
                value: entry.into_value(),
                source_provider: None,
                served_from_cache: true,
            };
        }
        self.cache_misses.fetch_add(1, Ordering::Relaxed);

        // One quota slot per fetch that reaches the network phase; internal
        // provider retries do not re-consume.
        match self.quota.try_consume() {
            QuotaDecision::Allowed { .. } => {
                if let Some(message) = self.quota.warning() {
                    warn!("{message}");
                }
            }
            QuotaDecision::Denied { retry_after } => {
                self.quota_denials.fetch_add(1, Ordering::Relaxed);
                return FetchResult::Failure {
                    kind: ErrorKind::QuotaExceeded,
                    message: format!(
                        "quota of {} requests per window exhausted; retry in {}s",
                        self.config.quota_limit,
                        retry_after.as_secs()
                    ),
                    retry_after: Some(retry_after),
                    attempts: Vec::new(),
                };
            }
        }

        match self.resolver.resolve(request).await {
            Ok(resolution) => {
                // The write happens only after a fully successful resolve, so
                // a cancelled fetch never leaves a partial entry behind.
                if let Err(error) = self
                    .cache
                    .put(fingerprint, resolution.value.clone(), self.config.cache_ttl)
                    .await
                {
                    // Unreachable with a validated config; config is checked
                    // at construction.
                    warn!(error = %error, "cache write rejected");
                }
                info!(provider = %resolution.provider, "fetch resolved");
                FetchResult::Success {
                    value: resolution.value,
                    source_provider: Some(resolution.provider),
                    served_from_cache: false,
                }
            }
            Err(error) => {
                self.provider_failures.fetch_add(1, Ordering::Relaxed);
                warn!(kind = error.kind().as_str(), error = error.message(), "fetch failed");
                FetchResult::Failure {
                    kind: error.kind(),
                    message: error.message().to_owned(),
                    retry_after: None,
                    attempts: error.into_attempts(),
                }
            }
        }
    }

    /// Drops the cached entry for one request; returns whether one existed.
    pub async fn invalidate(&self, request: &FetchRequest) -> bool {
        self.cache.invalidate(&request.fingerprint()).await
    }

    pub async fn clear_cache(&self) -> usize {
        self.cache.clear().await
    }

    pub async fn purge_expired(&self) -> usize {
        self.cache.purge_expired().await
    }

    pub fn quota_warning(&self) -> Option<String> {
        self.quota.warning()
    }

    pub async fn stats(&self) -> FetcherStats {
        FetcherStats {
            fetches: self.fetches.load(Ordering::Relaxed),
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            cache_misses: self.cache_misses.load(Ordering::Relaxed),
            quota_denials: self.quota_denials.load(Ordering::Relaxed),
            provider_failures: self.provider_failures.load(Ordering::Relaxed),
            cache: self.cache.stats().await,
            quota: self.quota.stats(),
        }
    }
}

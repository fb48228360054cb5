//! Exchange-rate providers.
//!
//! Primary: exchangerate-api.com v6, which carries the API key as a path
//! segment. Fallback: open.er-api.com v6, keyless but latest-rates only.

use std::sync::Arc;
use std::time::Duration;

use crate::config::FetcherConfig;
use crate::error::ConfigError;
use crate::http::{HttpAuth, HttpClient};
use crate::providers::rest::{EndpointTemplate, RestProvider};

pub const OP_LATEST_RATES: &str = "latest_rates";
pub const OP_PAIR_RATE: &str = "pair_rate";

/// exchangerate-api.com v6, tried first. Supports `latest_rates` and
/// `pair_rate`; the key is embedded in the URL path.
pub fn primary(api_key: impl Into<String>, transport: Arc<dyn HttpClient>) -> Result<RestProvider, ConfigError> {
    RestProvider::builder("exchangerate-api", 1, "https://v6.exchangerate-api.com/v6", transport)
        .auth(HttpAuth::PathSegment(api_key.into()))
        .endpoint(OP_LATEST_RATES, EndpointTemplate::new("/{key}/latest/{base}"))
        .endpoint(OP_PAIR_RATE, EndpointTemplate::new("/{key}/pair/{base}/{target}"))
        .timeout(Duration::from_secs(30))
        .build()
}

/// open.er-api.com v6 keyless fallback; `latest_rates` only.
pub fn fallback(transport: Arc<dyn HttpClient>) -> Result<RestProvider, ConfigError> {
    RestProvider::builder("open-er-api", 2, "https://open.er-api.com/v6", transport)
        .endpoint(OP_LATEST_RATES, EndpointTemplate::new("/latest/{base}"))
        .timeout(Duration::from_secs(30))
        .build()
}

/// Free-tier defaults: one-hour cache, 1500 calls per rolling 30 days.
pub fn suggested_config() -> FetcherConfig {
    FetcherConfig::default()
}

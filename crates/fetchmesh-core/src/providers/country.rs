//! Country information via restcountries.com v3.1 (keyless).

use std::sync::Arc;
use std::time::Duration;

use crate::config::FetcherConfig;
use crate::error::ConfigError;
use crate::http::HttpClient;
use crate::providers::rest::{EndpointTemplate, RestProvider};

pub const OP_COUNTRY_BY_NAME: &str = "country_by_name";
pub const OP_COUNTRY_BY_CODE: &str = "country_by_code";
pub const OP_ALL_COUNTRIES: &str = "all_countries";

pub fn restcountries(transport: Arc<dyn HttpClient>) -> Result<RestProvider, ConfigError> {
    RestProvider::builder("restcountries", 1, "https://restcountries.com/v3.1", transport)
        .endpoint(OP_COUNTRY_BY_NAME, EndpointTemplate::new("/name/{name}"))
        .endpoint(OP_COUNTRY_BY_CODE, EndpointTemplate::new("/alpha/{code}"))
        .endpoint(OP_ALL_COUNTRIES, EndpointTemplate::new("/all"))
        .timeout(Duration::from_secs(30))
        .build()
}

/// Country facts barely change; day-long cache.
pub fn suggested_config() -> FetcherConfig {
    FetcherConfig {
        cache_ttl: Duration::from_secs(24 * 3600),
        quota_limit: 10_000,
        quota_window: Duration::from_secs(24 * 3600),
    }
}

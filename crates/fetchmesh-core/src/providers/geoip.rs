//! Public-IP echo and IP geolocation providers.
//!
//! `current_ip` comes from api.ipify.org; `ip_location` has a redundant pair,
//! ipapi.co first and ip-api.com as fallback. All three are keyless.

use std::sync::Arc;
use std::time::Duration;

use crate::config::FetcherConfig;
use crate::error::ConfigError;
use crate::http::HttpClient;
use crate::providers::rest::{EndpointTemplate, RestProvider};

pub const OP_CURRENT_IP: &str = "current_ip";
pub const OP_IP_LOCATION: &str = "ip_location";

pub fn ip_echo(transport: Arc<dyn HttpClient>) -> Result<RestProvider, ConfigError> {
    RestProvider::builder("ipify", 1, "https://api.ipify.org", transport)
        .endpoint(
            OP_CURRENT_IP,
            EndpointTemplate::new("").with_static_query("format", "json"),
        )
        .timeout(Duration::from_secs(10))
        .build()
}

pub fn primary_location(transport: Arc<dyn HttpClient>) -> Result<RestProvider, ConfigError> {
    RestProvider::builder("ipapi", 1, "https://ipapi.co", transport)
        .endpoint(OP_IP_LOCATION, EndpointTemplate::new("/{ip}/json/"))
        .timeout(Duration::from_secs(10))
        .build()
}

pub fn fallback_location(transport: Arc<dyn HttpClient>) -> Result<RestProvider, ConfigError> {
    RestProvider::builder("ip-api", 2, "http://ip-api.com", transport)
        .endpoint(OP_IP_LOCATION, EndpointTemplate::new("/json/{ip}"))
        .timeout(Duration::from_secs(10))
        .build()
}

/// Addresses move rarely; ten-minute cache, generous daily budget.
pub fn suggested_config() -> FetcherConfig {
    FetcherConfig {
        cache_ttl: Duration::from_secs(600),
        quota_limit: 1000,
        quota_window: Duration::from_secs(24 * 3600),
    }
}

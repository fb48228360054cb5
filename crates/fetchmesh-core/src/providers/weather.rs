//! Open-Meteo weather providers: forecast, historical archive, geocoding.
//! All keyless; parameters ride the query string.

use std::sync::Arc;
use std::time::Duration;

use crate::config::FetcherConfig;
use crate::error::ConfigError;
use crate::http::HttpClient;
use crate::providers::rest::{EndpointTemplate, RestProvider};

pub const OP_FORECAST: &str = "forecast";
pub const OP_HISTORICAL_WEATHER: &str = "historical_weather";
pub const OP_GEOCODE: &str = "geocode";

pub fn forecast(transport: Arc<dyn HttpClient>) -> Result<RestProvider, ConfigError> {
    RestProvider::builder("open-meteo-forecast", 1, "https://api.open-meteo.com", transport)
        .endpoint(
            OP_FORECAST,
            EndpointTemplate::new("/v1/forecast")
                .with_copy_param("latitude")
                .with_copy_param("longitude")
                .with_copy_param("daily")
                .with_copy_param("hourly")
                .with_copy_param("forecast_days")
                .with_copy_param("timezone"),
        )
        .timeout(Duration::from_secs(15))
        .build()
}

pub fn archive(transport: Arc<dyn HttpClient>) -> Result<RestProvider, ConfigError> {
    RestProvider::builder("open-meteo-archive", 1, "https://archive-api.open-meteo.com", transport)
        .endpoint(
            OP_HISTORICAL_WEATHER,
            EndpointTemplate::new("/v1/archive")
                .with_copy_param("latitude")
                .with_copy_param("longitude")
                .with_copy_param("start_date")
                .with_copy_param("end_date")
                .with_copy_param("daily")
                .with_copy_param("timezone"),
        )
        .timeout(Duration::from_secs(15))
        .build()
}

pub fn geocoder(transport: Arc<dyn HttpClient>) -> Result<RestProvider, ConfigError> {
    RestProvider::builder("open-meteo-geocoding", 1, "https://geocoding-api.open-meteo.com", transport)
        .endpoint(
            OP_GEOCODE,
            EndpointTemplate::new("/v1/search")
                .with_copy_param("name")
                .with_copy_param("count"),
        )
        .timeout(Duration::from_secs(10))
        .build()
}

/// Forecasts go stale quickly; half-hour cache.
pub fn suggested_config() -> FetcherConfig {
    FetcherConfig {
        cache_ttl: Duration::from_secs(1800),
        quota_limit: 10_000,
        quota_window: Duration::from_secs(24 * 3600),
    }
}

//! Provider adapters: the generic REST adapter plus preset builders for the
//! public APIs the agent catalog wraps. Presets configure endpoints,
//! credential placement, and timeouts only; payloads stay opaque JSON.

pub mod country;
pub mod exchange_rate;
pub mod geoip;
pub mod rest;
pub mod weather;

pub use rest::{EndpointTemplate, RestProvider, RestProviderBuilder};

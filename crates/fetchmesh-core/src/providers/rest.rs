//! Generic REST provider built from endpoint templates.
//!
//! Most public data APIs differ only in URL shape, credential placement, and
//! timeout. [`RestProvider`] captures that: a builder registers one
//! [`EndpointTemplate`] per operation and the adapter renders the URL from
//! the request's canonical parameters, so a new provider needs configuration
//! rather than a new client implementation.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tracing::debug;

use crate::error::{ConfigError, ProviderError};
use crate::http::{HttpAuth, HttpClient, HttpRequest};
use crate::provider::{ProviderClient, ProviderDescriptor, ProviderFuture};
use crate::request::FetchRequest;
use crate::retry::RetryPolicy;
use crate::throttle::ProviderThrottle;

/// URL recipe for one operation.
///
/// Path segments may reference request parameters as `{param}`; `{key}` is
/// reserved for a path-carried credential. Listed parameters are copied from
/// the request into the query string; static pairs are always appended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointTemplate {
    path: String,
    copy_params: Vec<String>,
    static_query: Vec<(String, String)>,
}

impl EndpointTemplate {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            copy_params: Vec::new(),
            static_query: Vec::new(),
        }
    }

    /// Copies the named request parameter into the query string when present.
    pub fn with_copy_param(mut self, name: impl Into<String>) -> Self {
        self.copy_params.push(name.into().to_ascii_lowercase());
        self
    }

    pub fn with_static_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.static_query.push((name.into(), value.into()));
        self
    }

    fn uses_path_credential(&self) -> bool {
        self.path.contains("{key}")
    }

    fn render(
        &self,
        base_url: &str,
        request: &FetchRequest,
        auth: &HttpAuth,
    ) -> Result<String, ProviderError> {
        let mut path = self.path.clone();

        if let HttpAuth::PathSegment(key) = auth {
            path = path.replace("{key}", key);
        }

        // Remaining placeholders come from request parameters.
        while let Some(start) = path.find('{') {
            let end = path[start..].find('}').map(|offset| start + offset).ok_or_else(|| {
                ProviderError::unknown(format!("unbalanced placeholder in path template '{}'", self.path))
            })?;
            let name = &path[start + 1..end];
            let value = request.param(name).ok_or_else(|| {
                ProviderError::unknown(format!("request is missing required parameter '{name}'"))
            })?;
            let encoded = urlencoding::encode(value).into_owned();
            path.replace_range(start..=end, &encoded);
        }

        let mut url = format!("{}{}", base_url.trim_end_matches('/'), path);
        let mut separator = if url.contains('?') { '&' } else { '?' };
        let mut push_pair = |url: &mut String, name: &str, value: &str| {
            url.push(separator);
            url.push_str(&urlencoding::encode(name));
            url.push('=');
            url.push_str(&urlencoding::encode(value));
            separator = '&';
        };

        for name in &self.copy_params {
            if let Some(value) = request.param(name) {
                push_pair(&mut url, name, value);
            }
        }
        for (name, value) in &self.static_query {
            push_pair(&mut url, name, value);
        }
        if let HttpAuth::QueryParam { name, value } = auth {
            push_pair(&mut url, name, value);
        }

        Ok(url)
    }
}

/// Builder for [`RestProvider`]; `build` validates the whole configuration.
pub struct RestProviderBuilder {
    name: String,
    priority: u32,
    base_url: String,
    endpoints: Vec<(String, EndpointTemplate)>,
    auth: HttpAuth,
    timeout: Duration,
    retry: RetryPolicy,
    throttle: Option<ProviderThrottle>,
    transport: Arc<dyn HttpClient>,
}

impl RestProviderBuilder {
    pub fn new(
        name: impl Into<String>,
        priority: u32,
        base_url: impl Into<String>,
        transport: Arc<dyn HttpClient>,
    ) -> Self {
        Self {
            name: name.into(),
            priority,
            base_url: base_url.into(),
            endpoints: Vec::new(),
            auth: HttpAuth::None,
            timeout: Duration::from_secs(30),
            retry: RetryPolicy::default(),
            throttle: None,
            transport,
        }
    }

    pub fn endpoint(mut self, operation: impl Into<String>, template: EndpointTemplate) -> Self {
        self.endpoints
            .push((operation.into().trim().to_ascii_lowercase(), template));
        self
    }

    pub fn auth(mut self, auth: HttpAuth) -> Self {
        self.auth = auth;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn throttle(mut self, throttle: ProviderThrottle) -> Self {
        self.throttle = Some(throttle);
        self
    }

    pub fn build(self) -> Result<RestProvider, ConfigError> {
        let name = self.name.trim().to_owned();
        if name.is_empty() {
            return Err(ConfigError::EmptyProviderName);
        }
        if self.base_url.trim().is_empty() {
            return Err(ConfigError::EmptyBaseUrl);
        }

        let mut endpoints = HashMap::new();
        for (operation, template) in self.endpoints {
            if template.uses_path_credential()
                && !matches!(self.auth, HttpAuth::PathSegment(_))
            {
                return Err(ConfigError::MissingPathCredential { name });
            }
            if endpoints.insert(operation.clone(), template).is_some() {
                return Err(ConfigError::DuplicateEndpoint { operation });
            }
        }

        let descriptor =
            ProviderDescriptor::new(name, self.priority, endpoints.keys().cloned())?;

        Ok(RestProvider {
            descriptor,
            base_url: self.base_url,
            endpoints,
            auth: self.auth,
            timeout: self.timeout,
            retry: self.retry,
            throttle: self.throttle,
            transport: self.transport,
        })
    }
}

/// Configured REST adapter for one external provider.
pub struct RestProvider {
    descriptor: ProviderDescriptor,
    base_url: String,
    endpoints: HashMap<String, EndpointTemplate>,
    auth: HttpAuth,
    timeout: Duration,
    retry: RetryPolicy,
    throttle: Option<ProviderThrottle>,
    transport: Arc<dyn HttpClient>,
}

impl std::fmt::Debug for RestProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestProvider")
            .field("descriptor", &self.descriptor)
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl RestProvider {
    pub fn builder(
        name: impl Into<String>,
        priority: u32,
        base_url: impl Into<String>,
        transport: Arc<dyn HttpClient>,
    ) -> RestProviderBuilder {
        RestProviderBuilder::new(name, priority, base_url, transport)
    }

    async fn fetch_once(&self, url: &str) -> Result<Value, ProviderError> {
        let request = HttpRequest::get(url)
            .with_auth(&self.auth)
            .with_timeout(self.timeout);

        let response = self.transport.execute(request).await.map_err(|error| {
            if error.is_timeout() {
                ProviderError::timeout(format!(
                    "{} timed out after {}s",
                    self.descriptor.name(),
                    self.timeout.as_secs()
                ))
            } else {
                ProviderError::network(error.message().to_owned())
            }
        })?;

        if response.is_success() {
            return serde_json::from_str(&response.body)
                .map_err(|error| ProviderError::parse(format!("malformed response body: {error}")));
        }

        match response.status {
            401 | 403 => Err(ProviderError::auth(format!(
                "{} rejected the credential (status {})",
                self.descriptor.name(),
                response.status
            ))),
            404 => Err(ProviderError::not_found("no data for this request")),
            429 => Err(ProviderError::rate_limited(format!(
                "{} rate limit hit (status 429)",
                self.descriptor.name()
            ))),
            status => Err(ProviderError::http(
                status,
                format!("upstream returned status {status}"),
            )),
        }
    }

    async fn fetch_with_retries(&self, request: &FetchRequest) -> Result<Value, ProviderError> {
        if let Some(throttle) = &self.throttle {
            if let Err(wait) = throttle.try_acquire() {
                // Pre-emptive denial: no network call spent.
                return Err(ProviderError::rate_limited(format!(
                    "{} throttled; retry in {:.2}s",
                    self.descriptor.name(),
                    wait.as_secs_f64()
                )));
            }
        }

        let operation = request.operation();
        let template = self.endpoints.get(operation).ok_or_else(|| {
            ProviderError::unknown(format!(
                "{} has no endpoint for operation '{operation}'",
                self.descriptor.name()
            ))
        })?;
        let url = template.render(&self.base_url, request, &self.auth)?;

        let mut retries_used = 0;
        loop {
            debug!(provider = self.descriptor.name(), attempt = retries_used + 1, "dispatching request");
            let error = match self.fetch_once(&url).await {
                Ok(value) => return Ok(value),
                Err(error) => error,
            };

            if !self.retry.should_retry(&error, retries_used) {
                return Err(error);
            }

            let delay = self.retry.delay_for_attempt(retries_used);
            retries_used += 1;
            debug!(
                provider = self.descriptor.name(),
                retry = retries_used,
                delay_ms = delay.as_millis() as u64,
                "retrying after transient failure"
            );
            tokio::time::sleep(delay).await;
        }
    }
}

impl ProviderClient for RestProvider {
    fn descriptor(&self) -> &ProviderDescriptor {
        &self.descriptor
    }

    fn fetch<'a>(&'a self, request: &'a FetchRequest) -> ProviderFuture<'a> {
        Box::pin(self.fetch_with_retries(request))
    }
}

//! Provider adapter contract.

use std::collections::BTreeSet;
use std::future::Future;
use std::pin::Pin;

use serde::Serialize;
use serde_json::Value;

use crate::error::{ConfigError, ProviderError};
use crate::request::FetchRequest;

/// Identity, ordering, and capabilities of one provider.
///
/// Lower priority is tried first; ties are broken by declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProviderDescriptor {
    name: String,
    priority: u32,
    operations: BTreeSet<String>,
}

impl ProviderDescriptor {
    pub fn new<I, S>(name: impl Into<String>, priority: u32, operations: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let name = name.into().trim().to_owned();
        if name.is_empty() {
            return Err(ConfigError::EmptyProviderName);
        }

        let operations = operations
            .into_iter()
            .map(|operation| operation.into().trim().to_ascii_lowercase())
            .collect::<BTreeSet<_>>();
        if operations.is_empty() {
            return Err(ConfigError::NoEndpoints { name });
        }

        Ok(Self {
            name,
            priority,
            operations,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub const fn priority(&self) -> u32 {
        self.priority
    }

    pub fn supports(&self, operation: &str) -> bool {
        self.operations.contains(operation)
    }

    pub fn operations(&self) -> impl Iterator<Item = &str> {
        self.operations.iter().map(String::as_str)
    }
}

pub type ProviderFuture<'a> =
    Pin<Box<dyn Future<Output = Result<Value, ProviderError>> + Send + 'a>>;

/// One-call adapter to a single external data provider.
///
/// An implementation performs exactly one logical network call per `fetch`
/// (internal retries aside), owns no cache and no quota bookkeeping, and maps
/// every failure into the normalized [`ProviderError`] taxonomy.
pub trait ProviderClient: Send + Sync {
    fn descriptor(&self) -> &ProviderDescriptor;

    fn fetch<'a>(&'a self, request: &'a FetchRequest) -> ProviderFuture<'a>;
}

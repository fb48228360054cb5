//! Shared fakes for the behavioral suites: a scriptable provider and a
//! scriptable HTTP transport, both deterministic and offline.

use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use fetchmesh_core::{
    FetchRequest, HttpClient, HttpError, HttpRequest, HttpResponse, ProviderClient,
    ProviderDescriptor, ProviderError, ProviderFuture,
};
use serde_json::Value;

/// Provider that replays a scripted sequence of outcomes, then repeats the
/// last configured default. Records how often it was invoked.
pub struct ScriptedProvider {
    descriptor: ProviderDescriptor,
    script: Mutex<VecDeque<Result<Value, ProviderError>>>,
    default: Result<Value, ProviderError>,
    calls: AtomicUsize,
}

impl ScriptedProvider {
    /// Provider that always yields the same outcome.
    pub fn fixed(
        name: &str,
        priority: u32,
        operations: &[&str],
        outcome: Result<Value, ProviderError>,
    ) -> Arc<Self> {
        Arc::new(Self {
            descriptor: ProviderDescriptor::new(name, priority, operations.iter().copied())
                .expect("valid descriptor"),
            script: Mutex::new(VecDeque::new()),
            default: outcome,
            calls: AtomicUsize::new(0),
        })
    }

    /// Provider that replays `script` in order, then repeats `default`.
    pub fn scripted(
        name: &str,
        priority: u32,
        operations: &[&str],
        script: Vec<Result<Value, ProviderError>>,
        default: Result<Value, ProviderError>,
    ) -> Arc<Self> {
        Arc::new(Self {
            descriptor: ProviderDescriptor::new(name, priority, operations.iter().copied())
                .expect("valid descriptor"),
            script: Mutex::new(script.into()),
            default,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ProviderClient for ScriptedProvider {
    fn descriptor(&self) -> &ProviderDescriptor {
        &self.descriptor
    }

    fn fetch<'a>(&'a self, _request: &'a FetchRequest) -> ProviderFuture<'a> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let outcome = self
            .script
            .lock()
            .expect("script lock is not poisoned")
            .pop_front()
            .unwrap_or_else(|| self.default.clone());
        Box::pin(async move { outcome })
    }
}

/// Transport that replays scripted responses and records the URLs it served.
pub struct ScriptedHttpClient {
    script: Mutex<VecDeque<Result<HttpResponse, HttpError>>>,
    urls: Mutex<Vec<String>>,
}

impl ScriptedHttpClient {
    pub fn new(script: Vec<Result<HttpResponse, HttpError>>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            urls: Mutex::new(Vec::new()),
        })
    }

    pub fn urls(&self) -> Vec<String> {
        self.urls.lock().expect("urls lock is not poisoned").clone()
    }
}

impl HttpClient for ScriptedHttpClient {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
        self.urls
            .lock()
            .expect("urls lock is not poisoned")
            .push(request.url.clone());
        let outcome = self
            .script
            .lock()
            .expect("script lock is not poisoned")
            .pop_front()
            .unwrap_or_else(|| Ok(HttpResponse::ok_json("{}")));
        Box::pin(async move { outcome })
    }
}

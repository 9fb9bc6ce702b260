//! In-memory fetcher and a call-counting resolver wrapper.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use modhost_resolver::{ArtifactLocator, Fetch, FetchError, Resolve, ResolvedArtifact};

#[derive(Debug, Default)]
struct Served {
    bodies: HashMap<String, Vec<u8>>,
    calls: HashMap<String, usize>,
}

/// Serves bytes from memory and counts fetches per URL.
///
/// Clones share state, so a test can keep one handle and give another to a
/// resolver. Unknown URLs answer [`FetchError::NotFound`].
#[derive(Debug, Clone, Default)]
pub struct CountingFetcher {
    inner: Arc<Mutex<Served>>,
}

impl CountingFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn serve(&self, url: &str, body: &[u8]) {
        self.inner
            .lock()
            .unwrap()
            .bodies
            .insert(url.to_string(), body.to_vec());
    }

    pub fn calls(&self, url: &str) -> usize {
        self.inner.lock().unwrap().calls.get(url).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.inner.lock().unwrap().calls.values().sum()
    }
}

impl Fetch for CountingFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let mut served = self.inner.lock().unwrap();
        *served.calls.entry(url.to_string()).or_default() += 1;
        served.bodies.get(url).cloned().ok_or(FetchError::NotFound)
    }
}

/// Wraps a resolver and counts `resolve` calls per locator.
#[derive(Debug)]
pub struct CountingResolver<R> {
    inner: R,
    calls: Mutex<HashMap<ArtifactLocator, usize>>,
}

impl<R: Resolve> CountingResolver<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            calls: Mutex::new(HashMap::new()),
        }
    }

    pub fn calls(&self, locator: &ArtifactLocator) -> usize {
        self.calls.lock().unwrap().get(locator).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().values().sum()
    }
}

impl<R: Resolve> Resolve for CountingResolver<R> {
    fn resolve(&self, locator: &ArtifactLocator) -> modhost_resolver::Result<ResolvedArtifact> {
        *self.calls.lock().unwrap().entry(locator.clone()).or_default() += 1;
        self.inner.resolve(locator)
    }
}

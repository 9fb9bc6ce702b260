//! Module dispatcher that offers an artifact to every registered handler
//!
//! Matching is non-exclusive: every handler whose `can_handle` accepts the
//! artifact installs it, in registration order, and nothing is deduplicated.
//! An artifact that is both a bundle and an application is installed twice.

use modhost_resolver::{ArtifactLocator, ResolvedArtifact};

use crate::error::Result;
use crate::handler::ModuleHandler;
use crate::handlers::{ApplicationHandler, BundleHandler, WasmHandler};
use crate::runtime::{ModuleHandle, ModuleRuntime, Properties};

/// Ordered set of module handlers.
pub struct ModuleDispatcher {
    handlers: Vec<Box<dyn ModuleHandler>>,
}

impl ModuleDispatcher {
    /// Create a dispatcher with no handlers.
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }

    /// Create a dispatcher with the bundle, application and wasm handlers,
    /// in that order.
    pub fn with_builtins(default_start_level: u32) -> Self {
        let mut dispatcher = Self::new();
        dispatcher.register(Box::new(BundleHandler::new(default_start_level)));
        dispatcher.register(Box::new(ApplicationHandler::new()));
        dispatcher.register(Box::new(WasmHandler::new()));
        dispatcher
    }

    /// Append a handler after the existing ones.
    pub fn register(&mut self, handler: Box<dyn ModuleHandler>) {
        self.handlers.push(handler);
    }

    pub fn handler_names(&self) -> Vec<&str> {
        self.handlers.iter().map(|h| h.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Handlers that accept `artifact`, in registration order.
    ///
    /// A `type_hint` naming a registered handler (ignoring ASCII case) limits
    /// the search to that handler. A hint that names no handler is ignored
    /// and every handler is consulted.
    pub fn claimants<'a>(
        &'a self,
        artifact: &ResolvedArtifact,
        type_hint: Option<&str>,
    ) -> Vec<&'a dyn ModuleHandler> {
        let hint = type_hint.filter(|hint| {
            let known = self.handler(hint).is_some();
            if !known {
                tracing::warn!(
                    "No handler is named '{hint}', offering {} to every handler",
                    artifact.locator
                );
            }
            known
        });

        self.handlers
            .iter()
            .map(|h| h.as_ref())
            .filter(|h| hint.is_none_or(|hint| h.name().eq_ignore_ascii_case(hint)))
            .filter(|h| h.can_handle(artifact))
            .collect()
    }

    /// The handler registered under `name`, ignoring ASCII case.
    pub fn handler(&self, name: &str) -> Option<&dyn ModuleHandler> {
        self.handlers
            .iter()
            .map(|h| h.as_ref())
            .find(|h| h.name().eq_ignore_ascii_case(name))
    }

    /// Install `artifact` through every handler that claims it.
    ///
    /// Returns one handle per installation. An empty result means no handler
    /// recognised the artifact; the caller decides whether that is fatal.
    pub fn dispatch(
        &self,
        runtime: &dyn ModuleRuntime,
        artifact: &ResolvedArtifact,
        type_hint: Option<&str>,
        properties: &Properties,
    ) -> Result<Vec<ModuleHandle>> {
        let claimants = self.claimants(artifact, type_hint);
        if claimants.is_empty() {
            tracing::debug!("No handler claims {}", artifact.locator);
            return Ok(Vec::new());
        }

        let mut handles = Vec::with_capacity(claimants.len());
        for handler in claimants {
            tracing::debug!("Handler '{}' claims {}", handler.name(), artifact.locator);
            handles.push(handler.install(runtime, artifact, properties)?);
        }
        Ok(handles)
    }

    /// Uninstall every unit the runtime holds for `locator`.
    pub fn remove(&self, runtime: &dyn ModuleRuntime, locator: &ArtifactLocator) -> Result<()> {
        runtime.uninstall(locator)?;
        Ok(())
    }
}

impl Default for ModuleDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ModuleDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModuleDispatcher")
            .field("handlers", &self.handler_names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtins_are_ordered() {
        let dispatcher = ModuleDispatcher::with_builtins(80);
        assert_eq!(dispatcher.handler_names(), vec!["bundle", "application", "wasm"]);
    }

    #[test]
    fn empty_dispatcher_claims_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.wasm");
        std::fs::write(&file, b"\0asm").unwrap();
        let artifact = ResolvedArtifact::new(ArtifactLocator::new("a"), file);

        assert!(ModuleDispatcher::new().claimants(&artifact, None).is_empty());
    }
}

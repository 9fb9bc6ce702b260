//! Collaborators threaded through every load and remove.

use std::sync::Arc;

use modhost_modules::{ModuleDispatcher, ModuleRuntime};
use modhost_resolver::Resolve;

/// How strictly the manager treats declared modules no handler claims.
///
/// Strict by default: an extension is only recorded as installed when every
/// module it declared was installed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadPolicy {
    /// Fail the load instead of warning when a module has no handler.
    pub strict_module_types: bool,
}

impl Default for LoadPolicy {
    fn default() -> Self {
        Self {
            strict_module_types: true,
        }
    }
}

impl LoadPolicy {
    /// Warn about unclaimed modules and keep loading.
    pub fn lenient() -> Self {
        Self {
            strict_module_types: false,
        }
    }
}

/// Resolver, dispatcher and runtime used by an [`ExtensionManager`](crate::ExtensionManager).
#[derive(Clone)]
pub struct OrchestrationContext {
    pub resolver: Arc<dyn Resolve>,
    pub dispatcher: Arc<ModuleDispatcher>,
    pub runtime: Arc<dyn ModuleRuntime>,
    pub policy: LoadPolicy,
}

impl OrchestrationContext {
    pub fn new(
        resolver: Arc<dyn Resolve>,
        dispatcher: Arc<ModuleDispatcher>,
        runtime: Arc<dyn ModuleRuntime>,
    ) -> Self {
        Self {
            resolver,
            dispatcher,
            runtime,
            policy: LoadPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: LoadPolicy) -> Self {
        self.policy = policy;
        self
    }
}

impl std::fmt::Debug for OrchestrationContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrchestrationContext")
            .field("dispatcher", &self.dispatcher)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

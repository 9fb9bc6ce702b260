//! ModuleHandler trait for recognising and installing one packaging format

use modhost_resolver::ResolvedArtifact;

use crate::error::Result;
use crate::runtime::{ModuleHandle, ModuleRuntime, Properties};

/// One module packaging format.
///
/// `can_handle` inspects the artifact's content and must not have side
/// effects. `install` delegates to the runtime.
pub trait ModuleHandler: Send + Sync {
    /// Short identifier, matched against a module's `type` hint.
    fn name(&self) -> &str;

    fn can_handle(&self, artifact: &ResolvedArtifact) -> bool;

    fn install(
        &self,
        runtime: &dyn ModuleRuntime,
        artifact: &ResolvedArtifact,
        properties: &Properties,
    ) -> Result<ModuleHandle>;
}

//! Self-contained applications: archives carrying `MODHOST-INF/application.json`.

use modhost_fs::MetaEntry;
use modhost_fs::archive;
use modhost_resolver::ResolvedArtifact;
use serde::Deserialize;

use super::read_manifest;
use crate::error::Result;
use crate::handler::ModuleHandler;
use crate::runtime::{InstallRequest, ModuleHandle, ModuleKind, ModuleRuntime, Properties};

/// Contents of `MODHOST-INF/application.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ApplicationManifest {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ApplicationHandler;

impl ApplicationHandler {
    pub fn new() -> Self {
        Self
    }
}

impl ModuleHandler for ApplicationHandler {
    fn name(&self) -> &str {
        "application"
    }

    fn can_handle(&self, artifact: &ResolvedArtifact) -> bool {
        archive::contains_entry(&artifact.path, MetaEntry::ApplicationManifest.as_str())
    }

    fn install(
        &self,
        runtime: &dyn ModuleRuntime,
        artifact: &ResolvedArtifact,
        properties: &Properties,
    ) -> Result<ModuleHandle> {
        let manifest: ApplicationManifest =
            read_manifest(&artifact.path, MetaEntry::ApplicationManifest)?.unwrap_or_default();
        let name = manifest
            .name
            .or_else(|| {
                artifact
                    .path
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
            })
            .unwrap_or_else(|| artifact.locator.to_string());

        let handle = runtime.install(InstallRequest {
            locator: artifact.locator.clone(),
            path: artifact.path.clone(),
            kind: ModuleKind::Application { name },
            properties: properties.clone(),
        })?;
        Ok(handle)
    }
}

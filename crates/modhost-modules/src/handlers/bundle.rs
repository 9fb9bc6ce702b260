//! Native bundle modules: archives carrying `MODHOST-INF/module.json`.

use modhost_fs::MetaEntry;
use modhost_fs::archive;
use modhost_resolver::ResolvedArtifact;
use serde::Deserialize;

use super::read_manifest;
use crate::error::Result;
use crate::handler::ModuleHandler;
use crate::runtime::{InstallRequest, ModuleHandle, ModuleKind, ModuleRuntime, Properties};

pub const DEFAULT_START_LEVEL: u32 = 80;

/// Module property overriding the start level.
pub const START_LEVEL_PROPERTY: &str = "start_level";

/// Contents of `MODHOST-INF/module.json`. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct BundleManifest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub start_level: Option<u32>,
}

#[derive(Debug, Clone)]
pub struct BundleHandler {
    default_start_level: u32,
}

impl BundleHandler {
    pub fn new(default_start_level: u32) -> Self {
        Self {
            default_start_level,
        }
    }

    /// Property, then manifest, then the configured default.
    fn start_level(&self, manifest: &BundleManifest, properties: &Properties) -> u32 {
        properties
            .get(START_LEVEL_PROPERTY)
            .and_then(serde_json::Value::as_u64)
            .and_then(|v| u32::try_from(v).ok())
            .or(manifest.start_level)
            .unwrap_or(self.default_start_level)
    }
}

impl Default for BundleHandler {
    fn default() -> Self {
        Self::new(DEFAULT_START_LEVEL)
    }
}

impl ModuleHandler for BundleHandler {
    fn name(&self) -> &str {
        "bundle"
    }

    fn can_handle(&self, artifact: &ResolvedArtifact) -> bool {
        archive::contains_entry(&artifact.path, MetaEntry::ModuleManifest.as_str())
    }

    fn install(
        &self,
        runtime: &dyn ModuleRuntime,
        artifact: &ResolvedArtifact,
        properties: &Properties,
    ) -> Result<ModuleHandle> {
        let manifest: BundleManifest =
            read_manifest(&artifact.path, MetaEntry::ModuleManifest)?.unwrap_or_default();
        let start_level = self.start_level(&manifest, properties);

        tracing::debug!(
            "Installing bundle {} ({}) at start level {start_level}",
            artifact.locator,
            manifest.name.as_deref().unwrap_or("unnamed")
        );

        let handle = runtime.install(InstallRequest {
            locator: artifact.locator.clone(),
            path: artifact.path.clone(),
            kind: ModuleKind::Bundle { start_level },
            properties: properties.clone(),
        })?;
        Ok(handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn start_level_precedence() {
        let handler = BundleHandler::new(80);
        let manifest = BundleManifest {
            start_level: Some(50),
            ..Default::default()
        };
        let mut props = Properties::new();

        assert_eq!(handler.start_level(&BundleManifest::default(), &props), 80);
        assert_eq!(handler.start_level(&manifest, &props), 50);

        props.insert(START_LEVEL_PROPERTY.into(), json!(30));
        assert_eq!(handler.start_level(&manifest, &props), 30);
    }

    #[test]
    fn non_numeric_start_level_property_is_ignored() {
        let handler = BundleHandler::default();
        let mut props = Properties::new();
        props.insert(START_LEVEL_PROPERTY.into(), json!("early"));

        assert_eq!(
            handler.start_level(&BundleManifest::default(), &props),
            DEFAULT_START_LEVEL
        );
    }
}

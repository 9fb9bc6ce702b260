//! Extension and module records.
//!
//! # Example descriptor
//!
//! ```json
//! {
//!   "name": "web-console",
//!   "version": "2.1.0",
//!   "extension": ["mvn:org.example/http/1.0/json"],
//!   "module": [
//!     { "location": "mvn:org.example/console/2.1.0/tar", "type": "bundle",
//!       "properties": { "start_level": 60 } }
//!   ]
//! }
//! ```

use modhost_modules::Properties;
use modhost_resolver::ArtifactLocator;
use serde::{Deserialize, Serialize};

/// One deployable unit declared by an extension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Module {
    pub location: ArtifactLocator,
    /// Restricts installation to the handler of this name.
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_hint: Option<String>,
    #[serde(default, skip_serializing_if = "Properties::is_empty")]
    pub properties: Properties,
}

impl Module {
    pub fn new(location: impl Into<ArtifactLocator>) -> Self {
        Self {
            location: location.into(),
            type_hint: None,
            properties: Properties::new(),
        }
    }
}

/// A named, versioned package of inner extensions and modules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Extension {
    pub name: String,
    pub version: String,
    /// Inner extensions, loaded in order before any module.
    #[serde(default, rename = "extension")]
    pub extensions: Vec<ArtifactLocator>,
    #[serde(default, rename = "module")]
    pub modules: Vec<Module>,
}

impl Extension {
    /// Check fields serde cannot: non-empty name and version.
    pub(crate) fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("extension name must not be empty".to_string());
        }
        if self.version.trim().is_empty() {
            return Err(format!("extension '{}' has an empty version", self.name));
        }
        if self.modules.iter().any(|m| m.location.as_str().trim().is_empty()) {
            return Err(format!(
                "extension '{}' declares a module with an empty location",
                self.name
            ));
        }
        if self.extensions.iter().any(|l| l.as_str().trim().is_empty()) {
            return Err(format!(
                "extension '{}' declares an inner extension with an empty locator",
                self.name
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn parse_full_descriptor() {
        let ext: Extension = serde_json::from_value(json!({
            "name": "web",
            "version": "1.0",
            "extension": ["a.json", "b.json"],
            "module": [
                { "location": "m1.wasm" },
                { "location": "m2.tar", "type": "bundle", "properties": { "start_level": 60 } }
            ]
        }))
        .unwrap();

        assert_eq!(ext.extensions, vec![ArtifactLocator::new("a.json"), ArtifactLocator::new("b.json")]);
        assert_eq!(ext.modules.len(), 2);
        assert_eq!(ext.modules[1].type_hint.as_deref(), Some("bundle"));
        assert_eq!(ext.modules[1].properties["start_level"], json!(60));
        assert!(ext.validate().is_ok());
    }

    #[test]
    fn optional_lists_default_empty() {
        let ext: Extension = serde_json::from_value(json!({ "name": "x", "version": "1" })).unwrap();
        assert!(ext.extensions.is_empty());
        assert!(ext.modules.is_empty());
    }

    #[test]
    fn empty_version_is_invalid() {
        let ext: Extension = serde_json::from_value(json!({ "name": "x", "version": " " })).unwrap();
        assert!(ext.validate().is_err());
    }
}

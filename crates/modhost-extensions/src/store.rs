//! Installed extension registry.

use std::collections::BTreeMap;

use modhost_resolver::ArtifactLocator;

use crate::model::Extension;

/// Extensions currently installed, keyed by the locator they were loaded
/// from.
///
/// A locator is present only once its extension and everything it declared
/// has been installed, and until it is explicitly removed.
#[derive(Debug, Clone, Default)]
pub struct ExtensionStore {
    entries: BTreeMap<ArtifactLocator, Extension>,
}

impl ExtensionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, locator: &ArtifactLocator) -> bool {
        self.entries.contains_key(locator)
    }

    pub fn get(&self, locator: &ArtifactLocator) -> Option<&Extension> {
        self.entries.get(locator)
    }

    /// Record an installed extension, returning any previous entry.
    pub fn insert(&mut self, locator: ArtifactLocator, extension: Extension) -> Option<Extension> {
        self.entries.insert(locator, extension)
    }

    pub fn remove(&mut self, locator: &ArtifactLocator) -> Option<Extension> {
        self.entries.remove(locator)
    }

    /// Installed locators, sorted.
    pub fn locators(&self) -> Vec<ArtifactLocator> {
        self.entries.keys().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ArtifactLocator, &Extension)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

//! Extension graph manager.
//!
//! Loading an extension installs, in order: its inner extensions (depth
//! first, declaration order), its declared modules, then its own artifact.
//! A module the runtime already holds is not installed again. The locator is recorded in the [`ExtensionStore`] only after all of that
//! succeeded. Any failure aborts the whole call; inner extensions that
//! finished loading before the failure stay recorded.
//!
//! Recursive removal walks the same graph and uninstalls what it declared.
//! The store entry is dropped only once every uninstall succeeded, so a
//! failed removal leaves the extension recorded as installed.

use std::sync::{Mutex, MutexGuard, PoisonError};

use modhost_modules::Properties;
use modhost_resolver::{ArtifactLocator, ResolvedArtifact};

use crate::context::OrchestrationContext;
use crate::descriptor::{is_plain_descriptor, read_descriptor};
use crate::error::{Error, Result};
use crate::model::{Extension, Module};
use crate::store::ExtensionStore;

/// Loads and removes extensions and owns the installed registry.
///
/// Each public call holds the store lock for its whole duration, so two
/// concurrent loads of the same locator install it once.
#[derive(Debug)]
pub struct ExtensionManager {
    context: OrchestrationContext,
    store: Mutex<ExtensionStore>,
}

impl ExtensionManager {
    pub fn new(context: OrchestrationContext) -> Self {
        Self {
            context,
            store: Mutex::new(ExtensionStore::new()),
        }
    }

    pub fn context(&self) -> &OrchestrationContext {
        &self.context
    }

    /// Load the extension at `locator` and everything it declares.
    ///
    /// Loading an already installed locator is a no-op.
    pub fn load(&self, locator: &ArtifactLocator) -> Result<()> {
        let mut store = self.lock()?;
        let mut walk = Vec::new();
        self.load_into(&mut store, locator, &mut walk)
    }

    /// Remove the extension at `locator`.
    ///
    /// Without `recursive` only the registry entry is dropped. With it, inner
    /// extensions are removed recursively and every declared module, plus the
    /// extension's own artifact, is uninstalled first. Removing a locator
    /// that is not installed is a no-op.
    pub fn remove(&self, locator: &ArtifactLocator, recursive: bool) -> Result<()> {
        let mut store = self.lock()?;
        let mut walk = Vec::new();
        self.remove_from(&mut store, locator, recursive, &mut walk)
    }

    pub fn is_installed(&self, locator: &ArtifactLocator) -> bool {
        self.snapshot().contains(locator)
    }

    /// Installed locators, sorted.
    pub fn installed(&self) -> Vec<ArtifactLocator> {
        self.snapshot().locators()
    }

    pub fn get(&self, locator: &ArtifactLocator) -> Option<Extension> {
        self.snapshot().get(locator).cloned()
    }

    fn lock(&self) -> Result<MutexGuard<'_, ExtensionStore>> {
        self.store.lock().map_err(|_| Error::StorePoisoned)
    }

    /// Read access survives poisoning; only mutations refuse a poisoned store.
    fn snapshot(&self) -> MutexGuard<'_, ExtensionStore> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn load_into(
        &self,
        store: &mut ExtensionStore,
        locator: &ArtifactLocator,
        walk: &mut Vec<ArtifactLocator>,
    ) -> Result<()> {
        if store.contains(locator) {
            tracing::info!("Extension {locator} is already installed");
            return Ok(());
        }
        if let Some(start) = walk.iter().position(|l| l == locator) {
            let mut path: Vec<String> = walk[start..].iter().map(ToString::to_string).collect();
            path.push(locator.to_string());
            return Err(Error::Cycle { path });
        }

        let artifact = self.context.resolver.resolve(locator)?;
        let extension = read_descriptor(&artifact)?;
        tracing::info!(
            "Loading extension {} {} from {locator}",
            extension.name,
            extension.version
        );

        walk.push(locator.clone());
        let result = self.install_graph(store, &artifact, &extension, walk);
        walk.pop();
        result?;

        tracing::info!("Extension {} {} installed", extension.name, extension.version);
        store.insert(locator.clone(), extension);
        Ok(())
    }

    fn install_graph(
        &self,
        store: &mut ExtensionStore,
        artifact: &ResolvedArtifact,
        extension: &Extension,
        walk: &mut Vec<ArtifactLocator>,
    ) -> Result<()> {
        for inner in &extension.extensions {
            self.load_into(store, inner, walk)?;
        }
        for module in &extension.modules {
            self.install_module(extension, module)?;
        }
        self.install_self(artifact)
    }

    fn install_module(&self, extension: &Extension, module: &Module) -> Result<()> {
        if self.context.runtime.contains(&module.location) {
            tracing::debug!(
                "Module {} of extension {} is already installed",
                module.location,
                extension.name
            );
            return Ok(());
        }

        let artifact = self
            .context
            .resolver
            .resolve(&module.location)
            .map_err(|source| Error::ModuleNotFound {
                module: module.location.to_string(),
                extension: extension.name.clone(),
                source,
            })?;

        let handles = self.context.dispatcher.dispatch(
            self.context.runtime.as_ref(),
            &artifact,
            module.type_hint.as_deref(),
            &module.properties,
        )?;
        if handles.is_empty() {
            self.unhandled(&module.location)?;
        }
        Ok(())
    }

    /// An extension's own artifact is installable as a module too.
    ///
    /// Every extension artifact carries a descriptor, so one that no handler
    /// claims is complete as it is.
    fn install_self(&self, artifact: &ResolvedArtifact) -> Result<()> {
        if self.context.runtime.contains(&artifact.locator) {
            return Ok(());
        }
        let handles = self.context.dispatcher.dispatch(
            self.context.runtime.as_ref(),
            artifact,
            None,
            &Properties::new(),
        )?;
        if handles.is_empty() {
            let shape = if is_plain_descriptor(artifact) {
                "descriptor"
            } else {
                "descriptor archive"
            };
            tracing::debug!("{} is a {shape} only", artifact.locator);
        }
        Ok(())
    }

    fn unhandled(&self, locator: &ArtifactLocator) -> Result<()> {
        if self.context.policy.strict_module_types {
            return Err(Error::UnhandledModuleType {
                module: locator.to_string(),
            });
        }
        tracing::warn!("No module handler can install {locator}, skipping");
        Ok(())
    }

    fn remove_from(
        &self,
        store: &mut ExtensionStore,
        locator: &ArtifactLocator,
        recursive: bool,
        walk: &mut Vec<ArtifactLocator>,
    ) -> Result<()> {
        if !store.contains(locator) {
            tracing::debug!("Extension {locator} is not installed, nothing to remove");
            return Ok(());
        }
        if walk.contains(locator) {
            return Ok(());
        }

        if recursive {
            walk.push(locator.clone());
            let result = self.uninstall_graph(store, locator, walk);
            walk.pop();
            result?;
        }

        store.remove(locator);
        tracing::info!("Removed extension {locator}");
        Ok(())
    }

    fn uninstall_graph(
        &self,
        store: &mut ExtensionStore,
        locator: &ArtifactLocator,
        walk: &mut Vec<ArtifactLocator>,
    ) -> Result<()> {
        let artifact = self.context.resolver.resolve(locator)?;
        let extension = read_descriptor(&artifact)?;

        for inner in &extension.extensions {
            self.remove_from(store, inner, true, walk)?;
        }
        for module in &extension.modules {
            self.uninstall_module(&module.location)?;
        }
        self.uninstall_module(locator)
    }

    /// Modules shared between extensions may already be gone.
    fn uninstall_module(&self, locator: &ArtifactLocator) -> Result<()> {
        let runtime = self.context.runtime.as_ref();
        if !runtime.contains(locator) {
            tracing::debug!("Module {locator} is not held by the runtime");
            return Ok(());
        }
        self.context.dispatcher.remove(runtime, locator)?;
        Ok(())
    }
}

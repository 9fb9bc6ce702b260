//! The module runtime seam and an in-process implementation.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, PoisonError};

use modhost_resolver::ArtifactLocator;

use crate::error::RuntimeError;

/// Free-form module properties, as declared in a descriptor or config file.
pub type Properties = BTreeMap<String, serde_json::Value>;

/// Identity of one installed unit, issued by the runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModuleHandle(u64);

impl ModuleHandle {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn id(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ModuleHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// How the runtime should host an artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModuleKind {
    /// Native module, started at the given start level.
    Bundle { start_level: u32 },
    /// Self-contained application run as a managed service.
    Application { name: String },
    /// WebAssembly module.
    Wasm,
}

impl ModuleKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Bundle { .. } => "bundle",
            Self::Application { .. } => "application",
            Self::Wasm => "wasm",
        }
    }
}

/// Everything the runtime needs to install one unit.
#[derive(Debug, Clone, PartialEq)]
pub struct InstallRequest {
    pub locator: ArtifactLocator,
    pub path: PathBuf,
    pub kind: ModuleKind,
    pub properties: Properties,
}

/// The dynamic module host.
///
/// A locator is installed at most once per [`ModuleKind`]: installing it
/// again through the same mechanism returns the existing handle, while two
/// mechanisms yield two handles. `uninstall` removes every unit installed
/// from that locator.
pub trait ModuleRuntime: Send + Sync {
    fn install(&self, request: InstallRequest) -> Result<ModuleHandle, RuntimeError>;

    fn uninstall(&self, locator: &ArtifactLocator) -> Result<(), RuntimeError>;

    /// Whether any unit installed from `locator` is present.
    fn contains(&self, locator: &ArtifactLocator) -> bool;
}

/// A unit held by [`LocalRuntime`].
#[derive(Debug, Clone, PartialEq)]
pub struct InstalledModule {
    pub handle: ModuleHandle,
    pub locator: ArtifactLocator,
    pub path: PathBuf,
    pub kind: ModuleKind,
    pub properties: Properties,
}

#[derive(Debug, Default)]
struct RuntimeState {
    next_id: u64,
    modules: BTreeMap<ModuleHandle, InstalledModule>,
}

/// In-process runtime that tracks installed units in memory.
#[derive(Debug, Default)]
pub struct LocalRuntime {
    state: Mutex<RuntimeState>,
}

impl LocalRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, RuntimeState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Snapshot of installed units in handle order.
    pub fn modules(&self) -> Vec<InstalledModule> {
        self.state().modules.values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.state().modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ModuleRuntime for LocalRuntime {
    fn install(&self, request: InstallRequest) -> Result<ModuleHandle, RuntimeError> {
        if !request.path.is_file() {
            return Err(RuntimeError::Install {
                locator: request.locator.to_string(),
                message: format!("{} is not a readable file", request.path.display()),
            });
        }

        let mut state = self.state();
        if let Some(existing) = state
            .modules
            .values()
            .find(|m| m.locator == request.locator && m.kind == request.kind)
        {
            tracing::debug!(
                "{} {} is already installed as {}",
                request.kind.label(),
                request.locator,
                existing.handle
            );
            return Ok(existing.handle);
        }

        state.next_id += 1;
        let handle = ModuleHandle::new(state.next_id);

        tracing::info!(
            "Installed {} {} as {handle}",
            request.kind.label(),
            request.locator
        );
        state.modules.insert(
            handle,
            InstalledModule {
                handle,
                locator: request.locator,
                path: request.path,
                kind: request.kind,
                properties: request.properties,
            },
        );
        Ok(handle)
    }

    fn uninstall(&self, locator: &ArtifactLocator) -> Result<(), RuntimeError> {
        let mut state = self.state();
        let before = state.modules.len();
        state.modules.retain(|_, m| &m.locator != locator);
        let removed = before - state.modules.len();

        if removed == 0 {
            return Err(RuntimeError::NotInstalled {
                locator: locator.to_string(),
            });
        }
        tracing::info!("Uninstalled {locator} ({removed} unit(s))");
        Ok(())
    }

    fn contains(&self, locator: &ArtifactLocator) -> bool {
        self.state().modules.values().any(|m| &m.locator == locator)
    }
}

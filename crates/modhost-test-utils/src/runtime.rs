//! [`RecordingRuntime`], a module runtime that remembers every call.

use std::collections::HashSet;
use std::sync::Mutex;

use modhost_modules::{InstallRequest, ModuleHandle, ModuleKind, ModuleRuntime, RuntimeError};
use modhost_resolver::ArtifactLocator;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuntimeEvent {
    Installed {
        locator: ArtifactLocator,
        kind: ModuleKind,
    },
    Uninstalled {
        locator: ArtifactLocator,
    },
}

#[derive(Debug, Default)]
struct State {
    events: Vec<RuntimeEvent>,
    held: Vec<ArtifactLocator>,
    fail_install: HashSet<ArtifactLocator>,
    fail_uninstall: HashSet<ArtifactLocator>,
}

/// Runtime double that records installs and uninstalls in call order.
///
/// Failures can be scripted per locator with [`fail_install`](Self::fail_install)
/// and [`fail_uninstall`](Self::fail_uninstall).
#[derive(Debug, Default)]
pub struct RecordingRuntime {
    state: Mutex<State>,
}

impl RecordingRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_install(&self, locator: &ArtifactLocator) {
        self.state.lock().unwrap().fail_install.insert(locator.clone());
    }

    pub fn fail_uninstall(&self, locator: &ArtifactLocator) {
        self.state.lock().unwrap().fail_uninstall.insert(locator.clone());
    }

    pub fn events(&self) -> Vec<RuntimeEvent> {
        self.state.lock().unwrap().events.clone()
    }

    /// Locators in install order, one entry per install call.
    pub fn installs(&self) -> Vec<ArtifactLocator> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                RuntimeEvent::Installed { locator, .. } => Some(locator),
                RuntimeEvent::Uninstalled { .. } => None,
            })
            .collect()
    }

    /// Locators in uninstall order.
    pub fn uninstalls(&self) -> Vec<ArtifactLocator> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                RuntimeEvent::Uninstalled { locator } => Some(locator),
                RuntimeEvent::Installed { .. } => None,
            })
            .collect()
    }

    pub fn held(&self) -> Vec<ArtifactLocator> {
        self.state.lock().unwrap().held.clone()
    }
}

impl ModuleRuntime for RecordingRuntime {
    fn install(&self, request: InstallRequest) -> Result<ModuleHandle, RuntimeError> {
        let mut state = self.state.lock().unwrap();
        if state.fail_install.contains(&request.locator) {
            return Err(RuntimeError::Install {
                locator: request.locator.to_string(),
                message: "scripted failure".into(),
            });
        }
        state.held.push(request.locator.clone());
        state.events.push(RuntimeEvent::Installed {
            locator: request.locator,
            kind: request.kind,
        });
        Ok(ModuleHandle::new(state.events.len() as u64))
    }

    fn uninstall(&self, locator: &ArtifactLocator) -> Result<(), RuntimeError> {
        let mut state = self.state.lock().unwrap();
        if state.fail_uninstall.contains(locator) {
            return Err(RuntimeError::Uninstall {
                locator: locator.to_string(),
                message: "scripted failure".into(),
            });
        }
        if !state.held.contains(locator) {
            return Err(RuntimeError::NotInstalled {
                locator: locator.to_string(),
            });
        }
        state.held.retain(|l| l != locator);
        state.events.push(RuntimeEvent::Uninstalled {
            locator: locator.clone(),
        });
        Ok(())
    }

    fn contains(&self, locator: &ArtifactLocator) -> bool {
        self.state.lock().unwrap().held.contains(locator)
    }
}

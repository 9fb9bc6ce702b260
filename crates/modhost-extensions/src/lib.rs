//! Extension system for modhost.
//!
//! An extension is a named, versioned descriptor that pulls in other
//! extensions and modules. This crate reads descriptors, keeps the registry
//! of installed extensions and walks extension graphs on load and remove.

pub mod context;
pub mod descriptor;
pub mod error;
pub mod manager;
pub mod model;
pub mod store;

pub use context::{LoadPolicy, OrchestrationContext};
pub use descriptor::read_descriptor;
pub use error::{DescriptorError, Error, Result};
pub use manager::ExtensionManager;
pub use model::{Extension, Module};
pub use store::ExtensionStore;

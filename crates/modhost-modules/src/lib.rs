//! Module installation for modhost
//!
//! - [`ModuleRuntime`]: the dynamic module host, consumed through a trait
//! - [`ModuleHandler`]: one packaging format (bundle, application, wasm)
//! - [`ModuleDispatcher`]: offers an artifact to every handler

pub mod dispatcher;
pub mod error;
pub mod handler;
pub mod handlers;
pub mod runtime;

pub use dispatcher::ModuleDispatcher;
pub use error::{Error, Result, RuntimeError};
pub use handler::ModuleHandler;
pub use handlers::{ApplicationHandler, BundleHandler, DEFAULT_START_LEVEL, WasmHandler};
pub use runtime::{
    InstallRequest, InstalledModule, LocalRuntime, ModuleHandle, ModuleKind, ModuleRuntime,
    Properties,
};

//! Error types for modhost-modules

use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

/// Failures reported by a [`ModuleRuntime`](crate::ModuleRuntime).
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    #[error("failed to install {locator}: {message}")]
    Install { locator: String, message: String },

    #[error("failed to uninstall {locator}: {message}")]
    Uninstall { locator: String, message: String },

    #[error("no module installed from {locator}")]
    NotInstalled { locator: String },
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Runtime(#[from] RuntimeError),

    #[error("invalid manifest {entry} in {path}: {message}")]
    InvalidManifest {
        path: PathBuf,
        entry: &'static str,
        message: String,
    },

    #[error("Filesystem error: {0}")]
    Fs(#[from] modhost_fs::Error),
}

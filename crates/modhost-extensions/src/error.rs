use std::path::PathBuf;

/// Errors from reading an extension descriptor.
#[derive(Debug, thiserror::Error)]
pub enum DescriptorError {
    /// Neither the file nor the archive entry holds a descriptor.
    #[error("extension descriptor not found in {path}")]
    NotFound { path: PathBuf },

    /// The descriptor exists but does not have the expected shape.
    #[error("invalid extension descriptor {path}: {message}")]
    Format { path: PathBuf, message: String },

    /// I/O failure while reading the artifact.
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: modhost_fs::Error,
    },
}

/// Errors from loading or removing extensions.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The extension locator itself could not be resolved.
    #[error(transparent)]
    Resolve(#[from] modhost_resolver::Error),

    #[error(transparent)]
    Descriptor(#[from] DescriptorError),

    /// A module declared by an extension could not be resolved.
    #[error("module {module} declared by extension '{extension}' not found: {source}")]
    ModuleNotFound {
        module: String,
        extension: String,
        source: modhost_resolver::Error,
    },

    /// No registered handler can install the artifact.
    #[error("no module handler can install {module}")]
    UnhandledModuleType { module: String },

    /// An extension (transitively) includes itself.
    #[error("extension cycle: {}", path.join(" -> "))]
    Cycle { path: Vec<String> },

    /// Install or uninstall failed in a handler or the runtime.
    #[error(transparent)]
    Module(#[from] modhost_modules::Error),

    /// A previous call panicked while holding the store lock.
    #[error("installed extension store is poisoned")]
    StorePoisoned,
}

impl Error {
    /// The runtime failure behind this error, if any.
    pub fn runtime_error(&self) -> Option<&modhost_modules::RuntimeError> {
        match self {
            Self::Module(modhost_modules::Error::Runtime(e)) => Some(e),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

//! Error types for modhost-cli

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

/// Errors that can occur in CLI operations
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] modhost_meta::Error),

    #[error(transparent)]
    Resolve(#[from] modhost_resolver::Error),

    #[error(transparent)]
    Descriptor(#[from] modhost_extensions::DescriptorError),

    #[error(transparent)]
    Extension(#[from] modhost_extensions::Error),

    #[error(transparent)]
    Module(#[from] modhost_modules::Error),

    #[error(transparent)]
    Fs(#[from] modhost_fs::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("failed to serialize output: {0}")]
    Json(#[from] serde_json::Error),

    /// User-facing error with a message
    #[error("{message}")]
    User { message: String },
}

impl CliError {
    /// Create a new user error with the given message
    pub fn user(message: impl Into<String>) -> Self {
        Self::User {
            message: message.into(),
        }
    }
}

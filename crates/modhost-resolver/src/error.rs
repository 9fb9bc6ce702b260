//! Error types for modhost-resolver

pub type Result<T> = std::result::Result<T, Error>;

/// Reasons a locator could not be mapped to a local file.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The locator string does not match any recognised form.
    #[error("malformed artifact locator '{locator}': {reason}")]
    Malformed { locator: String, reason: String },

    /// No configured source holds the artifact.
    #[error("artifact {locator} not found (searched: {})", searched.join(", "))]
    NotFound {
        locator: String,
        searched: Vec<String>,
    },

    /// The network transfer failed.
    #[error("failed to fetch {url}: {message}")]
    Fetch { url: String, message: String },

    /// Writing or reading the local cache failed.
    #[error("Filesystem error: {0}")]
    Fs(#[from] modhost_fs::Error),
}

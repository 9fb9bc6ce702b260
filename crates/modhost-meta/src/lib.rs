//! Configuration for the modhost bootstrapper.
//!
//! Describes where the host lives on disk, which artifact repositories the
//! resolver consults, and what gets installed at startup.

pub mod config;
pub mod error;
pub mod loader;

pub use config::{ApplicationConfig, HostConfig, RepositoryConfig};
pub use error::{Error, Result};
pub use loader::{ConfigSource, load_host_config};

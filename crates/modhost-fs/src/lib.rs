//! Filesystem layer for modhost
//!
//! Provides normalized paths, atomic locked writes, checksums, format-agnostic
//! configuration loading and read-only access to archive entries.

pub mod archive;
pub mod checksum;
pub mod config;
pub mod constants;
pub mod error;
pub mod io;
pub mod path;

pub use config::{ConfigFormat, load_config};
pub use constants::MetaEntry;
pub use error::{Error, Result};
pub use io::RobustnessConfig;
pub use path::NormalizedPath;

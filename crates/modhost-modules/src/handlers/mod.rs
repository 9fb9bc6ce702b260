//! Built-in module handlers.

mod application;
mod bundle;
mod wasm;

pub use application::{ApplicationHandler, ApplicationManifest};
pub use bundle::{BundleHandler, BundleManifest, DEFAULT_START_LEVEL, START_LEVEL_PROPERTY};
pub use wasm::WasmHandler;

use std::path::Path;

use modhost_fs::MetaEntry;
use modhost_fs::archive::{self, ArchiveFormat};
use serde::de::DeserializeOwned;

use crate::error::{Error, Result};

/// Read and parse a JSON manifest entry from an archive module.
///
/// Returns `Ok(None)` when `path` is not an archive or lacks the entry.
pub(crate) fn read_manifest<T: DeserializeOwned>(path: &Path, entry: MetaEntry) -> Result<Option<T>> {
    let Some(format) = ArchiveFormat::detect(path)? else {
        return Ok(None);
    };
    let Some(bytes) = archive::read_entry(path, format, entry.as_str())? else {
        return Ok(None);
    };
    serde_json::from_slice(&bytes)
        .map(Some)
        .map_err(|e| Error::InvalidManifest {
            path: path.to_path_buf(),
            entry: entry.as_str(),
            message: e.to_string(),
        })
}

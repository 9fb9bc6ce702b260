//! Content-addressed download cache.
//!
//! Every remote URL maps to `<root>/<h[..2]>/<h>/<file name>` where `h` is
//! the SHA-256 of the URL. Entries are written with
//! [`write_atomic`](modhost_fs::io::write_atomic), so an entry either exists
//! complete or not at all.

use std::fs;
use std::path::{Path, PathBuf};

use modhost_fs::checksum::sha256_hex;
use modhost_fs::io::{RobustnessConfig, write_atomic};
use modhost_fs::{Error as FsError, NormalizedPath};

use crate::error::Result;

const FALLBACK_FILE_NAME: &str = "artifact";

#[derive(Debug, Clone)]
pub struct ArtifactCache {
    root: NormalizedPath,
    robustness: RobustnessConfig,
}

impl ArtifactCache {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: NormalizedPath::new(root),
            robustness: RobustnessConfig::default(),
        }
    }

    pub fn with_robustness(mut self, robustness: RobustnessConfig) -> Self {
        self.robustness = robustness;
        self
    }

    pub fn root(&self) -> PathBuf {
        self.root.to_native()
    }

    /// Where the entry for `url` lives, whether or not it exists yet.
    pub fn entry_path(&self, url: &str) -> PathBuf {
        let key = sha256_hex(url.as_bytes());
        self.root
            .join(&key[..2])
            .join(&key)
            .join(&file_name_of(url))
            .to_native()
    }

    /// The cached file for `url`, if present.
    pub fn get(&self, url: &str) -> Option<PathBuf> {
        let path = self.entry_path(url);
        path.is_file().then_some(path)
    }

    /// Store `content` as the entry for `url` and return its path.
    pub fn put(&self, url: &str, content: &[u8]) -> Result<PathBuf> {
        let path = self.entry_path(url);
        write_atomic(&NormalizedPath::new(&path), content, self.robustness)?;
        Ok(path)
    }

    /// Remove every cached entry.
    pub fn clear(&self) -> Result<()> {
        let root = self.root.to_native();
        if root.exists() {
            tracing::info!("Clearing artifact cache {}", root.display());
            fs::remove_dir_all(&root).map_err(|e| FsError::io(&root, e))?;
        }
        Ok(())
    }
}

/// Last path segment of a URL, without query or fragment.
fn file_name_of(url: &str) -> String {
    let without_query = url.split(['?', '#']).next().unwrap_or(url);
    without_query
        .rsplit('/')
        .next()
        .filter(|s| !s.is_empty() && !s.contains(':') && *s != "." && *s != "..")
        .unwrap_or(FALLBACK_FILE_NAME)
        .to_string()
}

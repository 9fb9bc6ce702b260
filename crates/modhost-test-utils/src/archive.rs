//! [`ArchiveBuilder`] for module and extension archive fixtures.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use flate2::Compression;
use flate2::write::GzEncoder;

pub const EXTENSION_ENTRY: &str = "MODHOST-INF/extension.json";
pub const MODULE_ENTRY: &str = "MODHOST-INF/module.json";
pub const APPLICATION_ENTRY: &str = "MODHOST-INF/application.json";

/// Collects entries and writes them as a tar or tar.gz archive.
///
/// # Example
///
/// ```rust,no_run
/// use modhost_test_utils::ArchiveBuilder;
///
/// let path = ArchiveBuilder::new()
///     .bundle_manifest()
///     .entry("lib/code.bin", b"\x01")
///     .write_tar("/tmp/core.tar".as_ref());
/// ```
#[derive(Debug, Clone, Default)]
pub struct ArchiveBuilder {
    entries: Vec<(String, Vec<u8>)>,
}

impl ArchiveBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entry(mut self, name: &str, content: &[u8]) -> Self {
        self.entries.push((name.to_string(), content.to_vec()));
        self
    }

    pub fn json_entry(self, name: &str, value: &serde_json::Value) -> Self {
        let content = serde_json::to_vec_pretty(value).unwrap();
        self.entry(name, &content)
    }

    /// Add an empty `module.json`, making the archive a bundle.
    pub fn bundle_manifest(self) -> Self {
        self.entry(MODULE_ENTRY, b"{}")
    }

    /// Add an `application.json` naming the application.
    pub fn application_manifest(self, name: &str) -> Self {
        self.json_entry(APPLICATION_ENTRY, &serde_json::json!({ "name": name }))
    }

    /// Add an extension descriptor.
    pub fn descriptor(self, descriptor: &serde_json::Value) -> Self {
        self.json_entry(EXTENSION_ENTRY, descriptor)
    }

    pub fn write_tar(&self, path: &Path) -> PathBuf {
        let mut builder = tar::Builder::new(File::create(path).unwrap());
        self.append_all(&mut builder);
        builder.finish().unwrap();
        path.to_path_buf()
    }

    pub fn write_tar_gz(&self, path: &Path) -> PathBuf {
        let encoder = GzEncoder::new(File::create(path).unwrap(), Compression::default());
        let mut builder = tar::Builder::new(encoder);
        self.append_all(&mut builder);
        builder.into_inner().unwrap().finish().unwrap();
        path.to_path_buf()
    }

    fn append_all<W: Write>(&self, builder: &mut tar::Builder<W>) {
        for (name, content) in &self.entries {
            let mut header = tar::Header::new_gnu();
            header.set_size(content.len() as u64);
            header.set_mode(0o644);
            header.set_cksum();
            builder
                .append_data(&mut header, name, content.as_slice())
                .unwrap();
        }
    }
}

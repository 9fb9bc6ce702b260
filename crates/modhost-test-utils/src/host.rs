//! [`TestHost`] builder for extension graph scenarios.

use std::fs;
use std::path::{Path, PathBuf};

use modhost_resolver::{ArtifactLocator, ArtifactResolver};
use serde_json::json;
use tempfile::TempDir;

use crate::archive::ArchiveBuilder;
use crate::fetch::CountingFetcher;

/// A temporary directory holding descriptors and module artifacts.
///
/// Every writer returns the locator of the file it wrote, so graphs can be
/// assembled bottom-up:
///
/// ```rust,no_run
/// use modhost_test_utils::TestHost;
///
/// let host = TestHost::new();
/// let m1 = host.wasm("m1.wasm");
/// let inner = host.descriptor("inner.json", "inner", "1.0", &[], &[]);
/// let outer = host.descriptor("outer.json", "outer", "1.0", &[&inner], &[&m1]);
/// ```
pub struct TestHost {
    temp_dir: TempDir,
}

impl Default for TestHost {
    fn default() -> Self {
        Self::new()
    }
}

impl TestHost {
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().unwrap(),
        }
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.root().join(relative)
    }

    pub fn cache_dir(&self) -> PathBuf {
        self.path("cache")
    }

    /// Locator for a file under the root, whether or not it exists.
    pub fn locator(&self, relative: &str) -> ArtifactLocator {
        ArtifactLocator::new(self.path(relative).to_string_lossy())
    }

    pub fn write(&self, relative: &str, content: &[u8]) -> ArtifactLocator {
        let path = self.path(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
        self.locator(relative)
    }

    /// Write a plain JSON extension descriptor.
    pub fn descriptor(
        &self,
        relative: &str,
        name: &str,
        version: &str,
        extensions: &[&ArtifactLocator],
        modules: &[&ArtifactLocator],
    ) -> ArtifactLocator {
        let value = json!({
            "name": name,
            "version": version,
            "extension": extensions.iter().map(|l| l.as_str()).collect::<Vec<_>>(),
            "module": modules
                .iter()
                .map(|l| json!({ "location": l.as_str() }))
                .collect::<Vec<_>>(),
        });
        self.descriptor_json(relative, &value)
    }

    pub fn descriptor_json(&self, relative: &str, value: &serde_json::Value) -> ArtifactLocator {
        self.write(relative, &serde_json::to_vec_pretty(value).unwrap())
    }

    /// Write a minimal WebAssembly module.
    pub fn wasm(&self, relative: &str) -> ArtifactLocator {
        self.write(relative, b"\0asm\x01\0\0\0")
    }

    /// Write a tar bundle carrying an empty `module.json`.
    pub fn bundle(&self, relative: &str) -> ArtifactLocator {
        self.archive(relative, &ArchiveBuilder::new().bundle_manifest())
    }

    /// Write `builder` as a tar archive.
    pub fn archive(&self, relative: &str, builder: &ArchiveBuilder) -> ArtifactLocator {
        let path = self.path(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        builder.write_tar(&path);
        self.locator(relative)
    }

    /// Resolver over this directory with an offline fetcher.
    pub fn resolver(&self) -> ArtifactResolver {
        self.resolver_with(CountingFetcher::new(), &[])
    }

    /// Relative path locators are taken from the host root.
    pub fn resolver_with(&self, fetcher: CountingFetcher, repositories: &[String]) -> ArtifactResolver {
        ArtifactResolver::with_fetcher(self.cache_dir(), repositories, Box::new(fetcher))
            .with_base_dir(self.root())
    }
}

//! Well-known entries inside module and extension archives.

use std::path::Path;

/// Reserved metadata entries recognised inside an archive container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetaEntry {
    /// The reserved metadata directory itself
    MetaDir,
    /// Extension descriptor (`extension.json`)
    ExtensionDescriptor,
    /// Bundle module manifest (`module.json`)
    ModuleManifest,
    /// Managed application manifest (`application.json`)
    ApplicationManifest,
}

impl MetaEntry {
    /// Get the archive-relative path of the entry.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MetaDir => "MODHOST-INF",
            Self::ExtensionDescriptor => "MODHOST-INF/extension.json",
            Self::ModuleManifest => "MODHOST-INF/module.json",
            Self::ApplicationManifest => "MODHOST-INF/application.json",
        }
    }
}

impl AsRef<Path> for MetaEntry {
    fn as_ref(&self) -> &Path {
        Path::new(self.as_str())
    }
}

impl AsRef<str> for MetaEntry {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl std::fmt::Display for MetaEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entries_live_under_meta_dir() {
        for entry in [
            MetaEntry::ExtensionDescriptor,
            MetaEntry::ModuleManifest,
            MetaEntry::ApplicationManifest,
        ] {
            assert!(entry.as_str().starts_with(MetaEntry::MetaDir.as_str()));
        }
    }
}

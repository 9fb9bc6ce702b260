//! Extension descriptor reader.
//!
//! A descriptor is either the resolved file itself (plain JSON) or the
//! `MODHOST-INF/extension.json` entry of a tar or tar.gz archive.

use std::fs;
use std::path::Path;

use modhost_fs::MetaEntry;
use modhost_fs::archive::{self, ArchiveFormat};
use modhost_resolver::ResolvedArtifact;

use crate::error::DescriptorError;
use crate::model::Extension;

/// Read the extension descriptor carried by `artifact`.
///
/// # Errors
///
/// - [`DescriptorError::NotFound`] if the file is missing, or is an archive
///   without the descriptor entry
/// - [`DescriptorError::Format`] if the content is not a valid descriptor
pub fn read_descriptor(artifact: &ResolvedArtifact) -> Result<Extension, DescriptorError> {
    let path = artifact.path.as_path();
    if !path.is_file() {
        return Err(DescriptorError::NotFound {
            path: path.to_path_buf(),
        });
    }

    let bytes = match detect(path)? {
        Some(format) => read_archive_entry(path, format)?,
        None => fs::read(path).map_err(|e| DescriptorError::Read {
            path: path.to_path_buf(),
            source: modhost_fs::Error::io(path, e),
        })?,
    };

    parse(path, &bytes)
}

/// Whether `artifact` is a plain descriptor file rather than an archive.
pub fn is_plain_descriptor(artifact: &ResolvedArtifact) -> bool {
    matches!(ArchiveFormat::detect(&artifact.path), Ok(None))
}

fn detect(path: &Path) -> Result<Option<ArchiveFormat>, DescriptorError> {
    ArchiveFormat::detect(path).map_err(|source| DescriptorError::Read {
        path: path.to_path_buf(),
        source,
    })
}

fn read_archive_entry(path: &Path, format: ArchiveFormat) -> Result<Vec<u8>, DescriptorError> {
    match archive::read_entry(path, format, MetaEntry::ExtensionDescriptor.as_str()) {
        Ok(Some(bytes)) => Ok(bytes),
        Ok(None) => Err(DescriptorError::NotFound {
            path: path.to_path_buf(),
        }),
        Err(modhost_fs::Error::Archive { message, .. }) => Err(DescriptorError::Format {
            path: path.to_path_buf(),
            message,
        }),
        Err(source) => Err(DescriptorError::Read {
            path: path.to_path_buf(),
            source,
        }),
    }
}

fn parse(path: &Path, bytes: &[u8]) -> Result<Extension, DescriptorError> {
    let format_err = |message: String| DescriptorError::Format {
        path: path.to_path_buf(),
        message,
    };
    let extension: Extension = serde_json::from_slice(bytes).map_err(|e| format_err(e.to_string()))?;
    extension.validate().map_err(format_err)?;
    Ok(extension)
}

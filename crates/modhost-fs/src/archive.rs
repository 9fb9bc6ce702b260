//! Read-only access to entries inside archive containers.
//!
//! Modules and extensions ship as tar archives, optionally gzip-compressed.
//! Nothing is extracted to disk: callers only need to know whether a
//! well-known metadata entry exists and, for descriptors, read its bytes.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Component, Path};

use flate2::read::GzDecoder;
use tar::Archive;

use crate::{Error, Result, io};

/// Metadata entries larger than this are rejected.
const MAX_ENTRY_SIZE: u64 = 16 * 1024 * 1024;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];
const USTAR_OFFSET: usize = 257;
const USTAR_MAGIC: &[u8; 5] = b"ustar";

/// Container format detected from a file's leading bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    Tar,
    TarGz,
}

impl ArchiveFormat {
    /// Detect the archive format of `path`, or `None` for a non-archive file.
    pub fn detect(path: &Path) -> Result<Option<Self>> {
        let head = io::read_prefix(path, USTAR_OFFSET + USTAR_MAGIC.len())?;
        if head.starts_with(&GZIP_MAGIC) {
            return Ok(Some(Self::TarGz));
        }
        if head.len() >= USTAR_OFFSET + USTAR_MAGIC.len()
            && &head[USTAR_OFFSET..USTAR_OFFSET + USTAR_MAGIC.len()] == USTAR_MAGIC
        {
            return Ok(Some(Self::Tar));
        }
        Ok(None)
    }
}

/// Read the named entry from the archive at `path`.
///
/// Returns `Ok(None)` when the archive has no such entry. Entry names are
/// compared after dropping any leading `./`.
pub fn read_entry(path: &Path, format: ArchiveFormat, entry_name: &str) -> Result<Option<Vec<u8>>> {
    let file = File::open(path).map_err(|e| Error::io(path, e))?;
    let reader = BufReader::new(file);
    match format {
        ArchiveFormat::Tar => find_entry(Archive::new(reader), path, entry_name),
        ArchiveFormat::TarGz => find_entry(Archive::new(GzDecoder::new(reader)), path, entry_name),
    }
}

/// Whether `path` is an archive containing `entry_name`.
///
/// Unreadable or non-archive files simply report `false`.
pub fn contains_entry(path: &Path, entry_name: &str) -> bool {
    match ArchiveFormat::detect(path) {
        Ok(Some(format)) => matches!(read_entry(path, format, entry_name), Ok(Some(_))),
        _ => false,
    }
}

fn find_entry<R: Read>(mut archive: Archive<R>, path: &Path, entry_name: &str) -> Result<Option<Vec<u8>>> {
    let archive_err = |message: String| Error::Archive {
        path: path.to_path_buf(),
        message,
    };

    let entries = archive
        .entries()
        .map_err(|e| archive_err(format!("failed to read archive entries: {e}")))?;

    for entry_result in entries {
        let mut entry =
            entry_result.map_err(|e| archive_err(format!("failed to read archive entry: {e}")))?;

        let matches = {
            let entry_path = entry
                .path()
                .map_err(|e| archive_err(format!("invalid entry path: {e}")))?;
            normalized_entry_name(&entry_path) == entry_name
        };
        if !matches {
            continue;
        }

        let size = entry.header().size().unwrap_or(0);
        if size > MAX_ENTRY_SIZE {
            return Err(archive_err(format!(
                "entry {entry_name} is {size} bytes (max {MAX_ENTRY_SIZE})"
            )));
        }

        let mut content = Vec::new();
        entry
            .by_ref()
            .take(MAX_ENTRY_SIZE)
            .read_to_end(&mut content)
            .map_err(|e| archive_err(format!("failed to read {entry_name}: {e}")))?;
        return Ok(Some(content));
    }

    Ok(None)
}

fn normalized_entry_name(path: &Path) -> String {
    path.components()
        .filter(|c| !matches!(c, Component::CurDir))
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use std::fs;

    fn tar_bytes(entries: &[(&str, &[u8])]) -> Vec<u8> {
        let mut builder = tar::Builder::new(Vec::new());
        for (name, data) in entries {
            let mut header = tar::Header::new_gnu();
            header.set_size(data.len() as u64);
            header.set_mode(0o644);
            header.set_cksum();
            builder.append_data(&mut header, name, *data).unwrap();
        }
        builder.into_inner().unwrap()
    }

    #[test]
    fn detects_plain_tar_and_reads_entry() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ext.tar");
        fs::write(&path, tar_bytes(&[("MODHOST-INF/extension.json", b"{}")])).unwrap();

        assert_eq!(ArchiveFormat::detect(&path).unwrap(), Some(ArchiveFormat::Tar));
        let content = read_entry(&path, ArchiveFormat::Tar, "MODHOST-INF/extension.json").unwrap();
        assert_eq!(content.as_deref(), Some(&b"{}"[..]));
    }

    #[test]
    fn detects_gzip_tar() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mod.tar.gz");
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        std::io::Write::write_all(
            &mut encoder,
            &tar_bytes(&[("./MODHOST-INF/module.json", b"{\"name\":\"m\"}")]),
        )
        .unwrap();
        fs::write(&path, encoder.finish().unwrap()).unwrap();

        assert_eq!(ArchiveFormat::detect(&path).unwrap(), Some(ArchiveFormat::TarGz));
        assert!(contains_entry(&path, "MODHOST-INF/module.json"));
        assert!(!contains_entry(&path, "MODHOST-INF/application.json"));
    }

    #[test]
    fn plain_file_is_not_an_archive() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("extension.json");
        fs::write(&path, "{\"name\":\"x\",\"version\":\"1\"}").unwrap();

        assert_eq!(ArchiveFormat::detect(&path).unwrap(), None);
        assert!(!contains_entry(&path, "MODHOST-INF/extension.json"));
    }
}

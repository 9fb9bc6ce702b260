//! Artifact locators and repository coordinates.
//!
//! A locator is an opaque string until someone needs to resolve it. It is
//! classified on demand:
//!
//! | Form | Kind |
//! |---|---|
//! | `http://…`, `https://…` | [`LocatorKind::Url`] |
//! | `mvn:group/artifact/version[/type[/classifier]]` | [`LocatorKind::Coordinate`] |
//! | `group:artifact:version[:type[:classifier]]` | [`LocatorKind::Coordinate`] |
//! | `file:…` or anything else | [`LocatorKind::Path`] |

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

const MVN_PREFIX: &str = "mvn:";
const FILE_PREFIX: &str = "file:";
const DEFAULT_PACKAGING: &str = "jar";

/// Opaque identifier of a module or extension artifact.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArtifactLocator(String);

/// Classified form of an [`ArtifactLocator`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocatorKind {
    Path(PathBuf),
    Url(String),
    Coordinate(Coordinate),
}

impl ArtifactLocator {
    pub fn new(locator: impl Into<String>) -> Self {
        Self(locator.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Classify the locator.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Malformed`] for an empty locator or a coordinate
    /// with missing segments.
    pub fn kind(&self) -> Result<LocatorKind> {
        let raw = self.0.trim();
        if raw.is_empty() {
            return Err(self.malformed("locator is empty"));
        }

        if raw.starts_with("http://") || raw.starts_with("https://") {
            return Ok(LocatorKind::Url(raw.to_string()));
        }

        if let Some(rest) = raw.strip_prefix(MVN_PREFIX) {
            return Coordinate::from_segments(rest.split('/'))
                .map(LocatorKind::Coordinate)
                .map_err(|reason| self.malformed(reason));
        }

        if let Some(rest) = raw.strip_prefix(FILE_PREFIX) {
            let path = rest.strip_prefix("//").unwrap_or(rest);
            if path.is_empty() {
                return Err(self.malformed("file locator has no path"));
            }
            return Ok(LocatorKind::Path(PathBuf::from(path)));
        }

        if raw.contains(':') && !raw.contains('/') && !raw.contains('\\') {
            return Coordinate::from_segments(raw.split(':'))
                .map(LocatorKind::Coordinate)
                .map_err(|reason| self.malformed(reason));
        }

        Ok(LocatorKind::Path(PathBuf::from(raw)))
    }

    fn malformed(&self, reason: impl Into<String>) -> Error {
        Error::Malformed {
            locator: self.0.clone(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for ArtifactLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ArtifactLocator {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for ArtifactLocator {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

/// A `group:artifact:version` repository coordinate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Coordinate {
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
    pub packaging: String,
    pub classifier: Option<String>,
}

impl Coordinate {
    fn from_segments<'a>(segments: impl Iterator<Item = &'a str>) -> std::result::Result<Self, String> {
        let parts: Vec<&str> = segments.map(str::trim).collect();
        if parts.len() < 3 {
            return Err(format!(
                "expected group, artifact and version, got {} segment(s)",
                parts.len()
            ));
        }
        if parts.len() > 5 {
            return Err(format!("too many segments ({})", parts.len()));
        }
        if parts[..3].iter().any(|p| p.is_empty()) {
            return Err("group, artifact and version must not be empty".to_string());
        }

        let optional = |idx: usize| {
            parts
                .get(idx)
                .filter(|s| !s.is_empty())
                .map(|s| s.to_string())
        };

        Ok(Self {
            group_id: parts[0].to_string(),
            artifact_id: parts[1].to_string(),
            version: parts[2].to_string(),
            packaging: optional(3).unwrap_or_else(|| DEFAULT_PACKAGING.to_string()),
            classifier: optional(4),
        })
    }

    /// Path of the artifact relative to a repository root.
    pub fn repository_path(&self) -> String {
        format!(
            "{}/{}/{}/{}",
            self.group_id.replace('.', "/"),
            self.artifact_id,
            self.version,
            self.file_name()
        )
    }

    /// `artifact-version[-classifier].packaging`
    pub fn file_name(&self) -> String {
        match &self.classifier {
            Some(classifier) => format!(
                "{}-{}-{}.{}",
                self.artifact_id, self.version, classifier, self.packaging
            ),
            None => format!("{}-{}.{}", self.artifact_id, self.version, self.packaging),
        }
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.group_id, self.artifact_id, self.version)
    }
}

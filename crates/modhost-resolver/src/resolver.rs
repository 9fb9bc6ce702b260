//! Locator resolution.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use modhost_fs::NormalizedPath;

use crate::cache::ArtifactCache;
use crate::error::{Error, Result};
use crate::fetch::{Fetch, FetchError, HttpFetcher};
use crate::locator::{ArtifactLocator, Coordinate, LocatorKind};

/// A locator together with the local file it resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedArtifact {
    pub locator: ArtifactLocator,
    pub path: PathBuf,
}

impl ResolvedArtifact {
    pub fn new(locator: ArtifactLocator, path: impl Into<PathBuf>) -> Self {
        Self {
            locator,
            path: path.into(),
        }
    }
}

/// Maps a locator to a readable local file.
///
/// Implementations must be idempotent: resolving the same locator twice
/// yields the same path without fetching again.
pub trait Resolve: Send + Sync {
    fn resolve(&self, locator: &ArtifactLocator) -> Result<ResolvedArtifact>;
}

/// An artifact repository consulted for coordinate locators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Repository {
    /// A directory laid out like a Maven repository.
    Local(PathBuf),
    /// An `http(s)://` base URL.
    Remote(String),
}

impl Repository {
    pub fn parse(url: &str) -> Self {
        let url = url.trim();
        if url.starts_with("http://") || url.starts_with("https://") {
            return Self::Remote(url.trim_end_matches('/').to_string());
        }
        let path = url
            .strip_prefix("file://")
            .or_else(|| url.strip_prefix("file:"))
            .unwrap_or(url);
        Self::Local(PathBuf::from(path))
    }

    fn describe(&self) -> String {
        match self {
            Self::Local(path) => path.display().to_string(),
            Self::Remote(url) => url.clone(),
        }
    }
}

/// Resolves paths, URLs and repository coordinates.
///
/// Remote artifacts are downloaded once into an [`ArtifactCache`]; local
/// files are returned in place. Relative paths, including relative local
/// repositories, are taken from the base directory when one is set and from
/// the process working directory otherwise.
pub struct ArtifactResolver {
    base_dir: Option<PathBuf>,
    repositories: Vec<Repository>,
    cache: ArtifactCache,
    fetcher: Box<dyn Fetch>,
    /// Held across check-cache-then-fetch so one URL is never fetched twice.
    fetch_guard: Mutex<()>,
}

impl ArtifactResolver {
    /// Build a resolver backed by [`HttpFetcher`].
    pub fn new(cache_dir: impl AsRef<Path>, repositories: &[String]) -> Result<Self> {
        let fetcher = HttpFetcher::new().map_err(|e| Error::Fetch {
            url: String::new(),
            message: e.to_string(),
        })?;
        Ok(Self::with_fetcher(cache_dir, repositories, Box::new(fetcher)))
    }

    pub fn with_fetcher(
        cache_dir: impl AsRef<Path>,
        repositories: &[String],
        fetcher: Box<dyn Fetch>,
    ) -> Self {
        Self {
            base_dir: None,
            repositories: repositories.iter().map(|r| Repository::parse(r)).collect(),
            cache: ArtifactCache::new(cache_dir),
            fetcher,
            fetch_guard: Mutex::new(()),
        }
    }

    /// Anchor relative path locators and local repositories at `base_dir`.
    pub fn with_base_dir(mut self, base_dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(base_dir.into());
        self
    }

    pub fn base_dir(&self) -> Option<&Path> {
        self.base_dir.as_deref()
    }

    pub fn cache(&self) -> &ArtifactCache {
        &self.cache
    }

    pub fn repositories(&self) -> &[Repository] {
        &self.repositories
    }

    fn anchored(&self, path: &Path) -> PathBuf {
        match &self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        }
    }

    fn resolve_path(&self, locator: &ArtifactLocator, path: &Path) -> Result<ResolvedArtifact> {
        let path = self.anchored(path);
        let path = path.as_path();
        if !path.is_file() {
            return Err(Error::NotFound {
                locator: locator.to_string(),
                searched: vec![path.display().to_string()],
            });
        }
        let canonical = NormalizedPath::canonical(path)
            .map_err(|e| modhost_fs::Error::io(path, e))?
            .to_native();
        Ok(ResolvedArtifact::new(locator.clone(), canonical))
    }

    fn resolve_url(&self, locator: &ArtifactLocator, url: &str) -> Result<ResolvedArtifact> {
        match self.fetch_cached(url) {
            Ok(path) => Ok(ResolvedArtifact::new(locator.clone(), path)),
            Err(FetchError::NotFound) => Err(Error::NotFound {
                locator: locator.to_string(),
                searched: vec![url.to_string()],
            }),
            Err(e) => Err(Error::Fetch {
                url: url.to_string(),
                message: e.to_string(),
            }),
        }
    }

    fn resolve_coordinate(
        &self,
        locator: &ArtifactLocator,
        coordinate: &Coordinate,
    ) -> Result<ResolvedArtifact> {
        let relative = coordinate.repository_path();
        let mut searched = Vec::with_capacity(self.repositories.len());

        for repository in &self.repositories {
            match repository {
                Repository::Local(root) => {
                    let candidate = self.anchored(root).join(&relative);
                    if candidate.is_file() {
                        tracing::debug!("Resolved {coordinate} in {}", root.display());
                        return self.resolve_path(locator, &candidate);
                    }
                }
                Repository::Remote(base) => {
                    let url = format!("{base}/{relative}");
                    match self.fetch_cached(&url) {
                        Ok(path) => {
                            tracing::debug!("Resolved {coordinate} from {base}");
                            return Ok(ResolvedArtifact::new(locator.clone(), path));
                        }
                        Err(FetchError::NotFound) => {}
                        Err(e) => {
                            return Err(Error::Fetch {
                                url,
                                message: e.to_string(),
                            });
                        }
                    }
                }
            }
            searched.push(repository.describe());
        }

        Err(Error::NotFound {
            locator: locator.to_string(),
            searched,
        })
    }

    /// Serve `url` from the cache, downloading it on first use.
    fn fetch_cached(&self, url: &str) -> std::result::Result<PathBuf, FetchError> {
        let _guard = self
            .fetch_guard
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if let Some(path) = self.cache.get(url) {
            tracing::debug!("Cache hit for {url}");
            return Ok(path);
        }

        let bytes = self.fetcher.fetch(url)?;
        let path = self
            .cache
            .put(url, &bytes)
            .map_err(|e| FetchError::Failed(format!("failed to cache download: {e}")))?;
        tracing::info!("Downloaded {url} ({} bytes)", bytes.len());
        Ok(path)
    }
}

impl Resolve for ArtifactResolver {
    fn resolve(&self, locator: &ArtifactLocator) -> Result<ResolvedArtifact> {
        match locator.kind()? {
            LocatorKind::Path(path) => self.resolve_path(locator, &path),
            LocatorKind::Url(url) => self.resolve_url(locator, &url),
            LocatorKind::Coordinate(coordinate) => self.resolve_coordinate(locator, &coordinate),
        }
    }
}

impl std::fmt::Debug for ArtifactResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArtifactResolver")
            .field("base_dir", &self.base_dir)
            .field("repositories", &self.repositories)
            .field("cache", &self.cache.root())
            .finish()
    }
}

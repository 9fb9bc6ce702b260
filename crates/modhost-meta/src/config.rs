//! Host configuration types
//!
//! ```toml
//! base_dir = "/opt/modhost"
//! cache_dir = "cache"
//! default_start_level = 80
//! extensions = ["mvn:org.example/web-extension/1.0.0"]
//!
//! [[repositories]]
//! url = "https://repo1.maven.org/maven2"
//!
//! [[applications]]
//! url = "/srv/apps/shop.tar.gz"
//! type = "application"
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Maven Central, consulted after the local repository by default.
pub const CENTRAL_REPOSITORY: &str = "https://repo1.maven.org/maven2";

/// Complete host configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostConfig {
    /// Root directory of the host installation.
    #[serde(default = "default_base_dir")]
    pub base_dir: PathBuf,
    /// Artifact cache directory, relative to `base_dir` unless absolute.
    #[serde(default = "default_cache_dir")]
    pub cache_dir: PathBuf,
    /// Wipe the artifact cache before the first resolution.
    #[serde(default)]
    pub clear_cache: bool,
    /// Treat a module no handler claims as an error instead of a warning.
    #[serde(default = "default_strict_module_types")]
    pub strict_module_types: bool,
    /// Start level handed to the runtime for bundles that do not declare one.
    #[serde(default = "default_start_level")]
    pub default_start_level: u32,
    /// Artifact repositories for coordinate locators, in lookup order.
    #[serde(default = "default_repositories")]
    pub repositories: Vec<RepositoryConfig>,
    /// Module locators installed at startup.
    #[serde(default)]
    pub modules: Vec<String>,
    /// Extension locators loaded at startup.
    #[serde(default)]
    pub extensions: Vec<String>,
    /// Applications started after modules and extensions.
    #[serde(default)]
    pub applications: Vec<ApplicationConfig>,
}

/// One artifact repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryConfig {
    /// Directory path, `file:` URL, or `http(s)://` base URL.
    ///
    /// A leading `~/` is expanded to the user's home directory.
    pub url: String,
}

impl RepositoryConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    /// The URL with a leading `~/` expanded.
    pub fn expanded_url(&self) -> String {
        match (self.url.strip_prefix("~/"), dirs::home_dir()) {
            (Some(rest), Some(home)) => home.join(rest).to_string_lossy().into_owned(),
            _ => self.url.clone(),
        }
    }
}

/// An application started by the bootstrapper.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Artifact locator of the application.
    pub url: String,
    /// Handler name to install it with; any handler when absent.
    #[serde(default, rename = "type")]
    pub app_type: Option<String>,
    /// Properties passed through to the runtime.
    #[serde(default)]
    pub properties: BTreeMap<String, serde_json::Value>,
}

fn default_base_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_cache_dir() -> PathBuf {
    PathBuf::from("cache")
}

fn default_strict_module_types() -> bool {
    true
}

fn default_start_level() -> u32 {
    80
}

fn default_repositories() -> Vec<RepositoryConfig> {
    let mut repositories = Vec::new();
    if dirs::home_dir().is_some() {
        repositories.push(RepositoryConfig::new("~/.m2/repository"));
    }
    repositories.push(RepositoryConfig::new(CENTRAL_REPOSITORY));
    repositories
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            base_dir: default_base_dir(),
            cache_dir: default_cache_dir(),
            clear_cache: false,
            strict_module_types: default_strict_module_types(),
            default_start_level: default_start_level(),
            repositories: default_repositories(),
            modules: Vec::new(),
            extensions: Vec::new(),
            applications: Vec::new(),
        }
    }
}

impl HostConfig {
    /// Absolute or base-relative cache directory.
    pub fn cache_path(&self) -> PathBuf {
        resolve_against(&self.base_dir, &self.cache_dir)
    }

    /// Repository URLs with `~/` expanded, in lookup order.
    pub fn repository_urls(&self) -> Vec<String> {
        self.repositories.iter().map(RepositoryConfig::expanded_url).collect()
    }

    /// Check the values serde cannot.
    pub fn validate(&self) -> Result<()> {
        if self.default_start_level == 0 {
            return Err(Error::InvalidConfig {
                message: "default_start_level must be at least 1".to_string(),
            });
        }
        if let Some(repo) = self.repositories.iter().find(|r| r.url.trim().is_empty()) {
            return Err(Error::InvalidConfig {
                message: format!("repository url must not be empty: {repo:?}"),
            });
        }
        if let Some(app) = self.applications.iter().find(|a| a.url.trim().is_empty()) {
            return Err(Error::InvalidConfig {
                message: format!("application url must not be empty: {app:?}"),
            });
        }
        Ok(())
    }
}

fn resolve_against(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

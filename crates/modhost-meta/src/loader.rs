//! Configuration discovery and environment overrides
//!
//! Lookup order:
//! 1. an explicit path (the `--config` flag); it must exist
//! 2. the `MODHOST_CONFIG` environment variable; a missing file is logged and skipped
//! 3. `modhost.toml`, `modhost.json` or `modhost.yaml` in the working directory
//! 4. built-in defaults
//!
//! `MODHOST_BASE` then replaces `base_dir`, and the comma separated
//! `MODHOST_MODULES` / `MODHOST_EXTENSIONS` lists are appended.

use std::path::{Path, PathBuf};

use modhost_fs::{NormalizedPath, load_config};

use crate::config::HostConfig;
use crate::error::{Error, Result};

pub const CONFIG_ENV: &str = "MODHOST_CONFIG";
pub const BASE_ENV: &str = "MODHOST_BASE";
pub const MODULES_ENV: &str = "MODHOST_MODULES";
pub const EXTENSIONS_ENV: &str = "MODHOST_EXTENSIONS";

/// File names probed in the working directory.
pub const DEFAULT_CONFIG_FILES: &[&str] = &["modhost.toml", "modhost.json", "modhost.yaml"];

/// Where the effective configuration came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    File(PathBuf),
    Defaults,
}

/// Load the host configuration using the process environment.
pub fn load_host_config(explicit: Option<&Path>, cwd: &Path) -> Result<(HostConfig, ConfigSource)> {
    load_with_env(explicit, cwd, |key| std::env::var(key).ok())
}

/// Load the host configuration with a custom environment lookup.
pub fn load_with_env(
    explicit: Option<&Path>,
    cwd: &Path,
    env: impl Fn(&str) -> Option<String>,
) -> Result<(HostConfig, ConfigSource)> {
    let source = locate(explicit, cwd, &env)?;

    let mut config = match &source {
        ConfigSource::File(path) => {
            tracing::info!("Reading configuration {}", path.display());
            load_config::<HostConfig>(&NormalizedPath::new(path))?
        }
        ConfigSource::Defaults => HostConfig::default(),
    };

    apply_env_overrides(&mut config, &env);
    config.validate()?;
    Ok((config, source))
}

fn locate(
    explicit: Option<&Path>,
    cwd: &Path,
    env: &impl Fn(&str) -> Option<String>,
) -> Result<ConfigSource> {
    if let Some(path) = explicit {
        if !path.is_file() {
            return Err(Error::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }
        return Ok(ConfigSource::File(path.to_path_buf()));
    }

    if let Some(value) = env(CONFIG_ENV).filter(|v| !v.trim().is_empty()) {
        let path = PathBuf::from(value);
        if path.is_file() {
            return Ok(ConfigSource::File(path));
        }
        tracing::warn!("{} {} doesn't exist", CONFIG_ENV, path.display());
    }

    Ok(DEFAULT_CONFIG_FILES
        .iter()
        .map(|name| cwd.join(name))
        .find(|path| path.is_file())
        .map_or(ConfigSource::Defaults, ConfigSource::File))
}

/// Apply `MODHOST_*` overrides on top of a loaded configuration.
pub fn apply_env_overrides(config: &mut HostConfig, env: &impl Fn(&str) -> Option<String>) {
    if let Some(base) = env(BASE_ENV).filter(|v| !v.trim().is_empty()) {
        config.base_dir = PathBuf::from(base);
    }
    if let Some(modules) = env(MODULES_ENV) {
        config.modules.extend(split_list(&modules));
    }
    if let Some(extensions) = env(EXTENSIONS_ENV) {
        config.extensions.extend(split_list(&extensions));
    }
}

fn split_list(value: &str) -> impl Iterator<Item = String> + '_ {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

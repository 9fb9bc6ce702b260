//! Bootstrap sequence: wire the resolver, dispatcher, runtime and extension
//! manager from a [`HostConfig`], then install what the configuration lists.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use modhost_extensions::{ExtensionManager, LoadPolicy, OrchestrationContext};
use modhost_meta::{ApplicationConfig, HostConfig};
use modhost_modules::{
    LocalRuntime, ModuleDispatcher, ModuleHandle, ModuleRuntime, Properties,
};
use modhost_resolver::{ArtifactLocator, ArtifactResolver, LocatorKind, Resolve};

use crate::error::{CliError, Result};

pub const BANNER_ENV: &str = "MODHOST_BANNER";

pub const DEFAULT_BANNER: &str = r"
                      _ _               _
  _ __ ___   ___   __| | |__   ___  ___| |_
 | '_ ` _ \ / _ \ / _` | '_ \ / _ \/ __| __|
 | | | | | | (_) | (_| | | | | (_) \__ \ |_
 |_| |_| |_|\___/ \__,_|_| |_|\___/|___/\__|
";

/// Outcome of starting the configured applications.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ApplicationReport {
    pub started: Vec<String>,
    pub failed: Vec<String>,
}

/// A wired module host.
pub struct Host {
    config: HostConfig,
    base_dir: PathBuf,
    runtime: Arc<LocalRuntime>,
    resolver: Arc<ArtifactResolver>,
    dispatcher: Arc<ModuleDispatcher>,
    extensions: ExtensionManager,
}

impl Host {
    /// Build a host rooted at `config.base_dir`, resolved against `cwd`.
    pub fn new(config: HostConfig, cwd: &Path) -> Result<Self> {
        let base_dir = if config.base_dir.is_absolute() {
            config.base_dir.clone()
        } else {
            cwd.join(&config.base_dir)
        };
        let cache_dir = if config.cache_dir.is_absolute() {
            config.cache_dir.clone()
        } else {
            base_dir.join(&config.cache_dir)
        };

        let resolver = Arc::new(
            ArtifactResolver::new(&cache_dir, &config.repository_urls())?.with_base_dir(base_dir.clone()),
        );
        if config.clear_cache {
            resolver.cache().clear()?;
        }
        let dispatcher = Arc::new(ModuleDispatcher::with_builtins(config.default_start_level));
        let runtime = Arc::new(LocalRuntime::new());

        let context = OrchestrationContext::new(resolver.clone(), dispatcher.clone(), runtime.clone())
            .with_policy(LoadPolicy {
                strict_module_types: config.strict_module_types,
            });

        Ok(Self {
            config,
            base_dir,
            runtime,
            resolver,
            dispatcher,
            extensions: ExtensionManager::new(context),
        })
    }

    pub fn runtime(&self) -> &LocalRuntime {
        &self.runtime
    }

    pub fn resolver(&self) -> &ArtifactResolver {
        &self.resolver
    }

    pub fn extensions(&self) -> &ExtensionManager {
        &self.extensions
    }

    /// Relative path locators are taken relative to the base directory.
    pub fn locator(&self, raw: &str) -> ArtifactLocator {
        let locator = ArtifactLocator::new(raw);
        match locator.kind() {
            Ok(LocatorKind::Path(path)) if path.is_relative() => {
                ArtifactLocator::new(self.base_dir.join(path).to_string_lossy())
            }
            _ => locator,
        }
    }

    /// Run the full bootstrap: modules, extensions, then applications.
    ///
    /// Module and extension failures abort the boot. Application failures are
    /// logged and skipped, but at least one configured application must start.
    pub fn boot(&self) -> Result<ApplicationReport> {
        let started = Instant::now();
        log_banner();
        tracing::info!("Base directory: {}", self.base_dir.display());
        tracing::info!("Cache directory: {}", self.resolver.cache().root().display());

        for module in &self.config.modules {
            self.install_module(&self.locator(module), None, &Properties::new())?;
        }
        for extension in &self.config.extensions {
            self.extensions.load(&self.locator(extension))?;
        }

        let report = self.start_applications();
        if !self.config.applications.is_empty() && report.started.is_empty() {
            return Err(CliError::user(format!(
                "none of the {} configured application(s) started",
                self.config.applications.len()
            )));
        }

        tracing::info!("Started in {:.3} seconds", started.elapsed().as_secs_f64());
        Ok(report)
    }

    /// Resolve and install one module outside any extension.
    pub fn install_module(
        &self,
        locator: &ArtifactLocator,
        type_hint: Option<&str>,
        properties: &Properties,
    ) -> Result<Vec<ModuleHandle>> {
        let artifact = self.resolver.resolve(locator)?;
        let runtime: &dyn ModuleRuntime = self.runtime.as_ref();
        let handles = self
            .dispatcher
            .dispatch(runtime, &artifact, type_hint, properties)?;

        if handles.is_empty() {
            if self.config.strict_module_types {
                return Err(modhost_extensions::Error::UnhandledModuleType {
                    module: locator.to_string(),
                }
                .into());
            }
            tracing::warn!("No module handler can install {locator}, skipping");
        }
        Ok(handles)
    }

    /// Start every configured application, continuing past failures.
    pub fn start_applications(&self) -> ApplicationReport {
        let mut report = ApplicationReport::default();
        for app in &self.config.applications {
            match self.start_application(app) {
                Ok(()) => report.started.push(app.url.clone()),
                Err(e) => {
                    tracing::warn!("Can't start application {}: {e}", app.url);
                    report.failed.push(app.url.clone());
                }
            }
        }
        report
    }

    fn start_application(&self, app: &ApplicationConfig) -> Result<()> {
        let locator = self.locator(&app.url);
        let handles = self.install_module(&locator, app.app_type.as_deref(), &app.properties)?;
        if handles.is_empty() {
            return Err(CliError::user(format!("no handler can start {locator}")));
        }
        tracing::info!("Started application {locator}");
        Ok(())
    }
}

fn log_banner() {
    let banner = std::env::var(BANNER_ENV).unwrap_or_else(|_| DEFAULT_BANNER.to_string());
    for line in banner.lines().filter(|l| !l.trim().is_empty()) {
        tracing::info!("{line}");
    }
}

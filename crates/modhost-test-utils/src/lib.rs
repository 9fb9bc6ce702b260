//! Shared test utilities for the modhost workspace.
//!
//! This crate is a dev-dependency only, never published.
//!
//! # Modules
//!
//! - [`archive`]: [`ArchiveBuilder`] for tar and tar.gz module fixtures
//! - [`host`]: [`TestHost`], a temporary directory of extensions and modules
//! - [`runtime`]: [`RecordingRuntime`] that logs installs and uninstalls
//! - [`fetch`]: [`CountingFetcher`] and [`CountingResolver`]

pub mod archive;
pub mod fetch;
pub mod host;
pub mod runtime;

pub use archive::ArchiveBuilder;
pub use fetch::{CountingFetcher, CountingResolver};
pub use host::TestHost;
pub use runtime::{RecordingRuntime, RuntimeEvent};

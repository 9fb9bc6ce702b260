//! Artifact resolution for modhost.
//!
//! Turns an opaque [`ArtifactLocator`] (filesystem path, network URL or
//! repository coordinate) into a [`ResolvedArtifact`]: a readable local file.
//! Downloads go through a content-addressed cache so a locator is fetched at
//! most once.

pub mod cache;
pub mod error;
pub mod fetch;
pub mod locator;
pub mod resolver;

pub use cache::ArtifactCache;
pub use error::{Error, Result};
pub use fetch::{Fetch, FetchError, HttpFetcher};
pub use locator::{ArtifactLocator, Coordinate, LocatorKind};
pub use resolver::{ArtifactResolver, Repository, ResolvedArtifact, Resolve};

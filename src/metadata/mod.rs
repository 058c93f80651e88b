//! Bottle metadata sources.
//!
//! Sizing needs the download and installed size of each bottle, which live
//! outside the inventory snapshot and are fetched on demand.

mod http;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::package::Package;

pub use http::{DEFAULT_API_URL, HttpBottleSource};

/// Sizes published for a package's bottle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BottleMetadata {
    pub download_size: u64,
    pub installed_size: u64,
}

/// Fetches bottle metadata for a package. Calls may fail independently.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BottleMetadataSource: Send + Sync {
    async fn fetch_bottle_metadata(&self, package: &Package, quiet: bool) -> Result<BottleMetadata>;
}

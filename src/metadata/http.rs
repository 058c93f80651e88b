use anyhow::{Context, Result};
use async_trait::async_trait;
use log::debug;
use serde::Deserialize;

use crate::http::HttpClient;
use crate::package::Package;

use super::{BottleMetadata, BottleMetadataSource};

/// Metadata API used when neither `--api-url` nor `KEGUP_API_URL` is set.
pub const DEFAULT_API_URL: &str = "https://bottles.kegup.dev/api";

#[derive(Deserialize)]
struct BottleResponse {
    download_size: u64,
    installed_size: u64,
}

/// Bottle metadata served as JSON from `<api_url>/bottles/<name>.json`.
pub struct HttpBottleSource {
    client: HttpClient,
    api_url: String,
}

impl HttpBottleSource {
    pub fn new(client: HttpClient, api_url: &str) -> Self {
        Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
        }
    }

    /// URL the metadata for `package` is fetched from.
    pub fn metadata_url(&self, package: &Package) -> String {
        match package.bottle().and_then(|bottle| bottle.url.as_deref()) {
            Some(url) => url.to_string(),
            None => format!("{}/bottles/{}.json", self.api_url, package.name),
        }
    }
}

#[async_trait]
impl BottleMetadataSource for HttpBottleSource {
    #[tracing::instrument(skip(self, package), fields(package = %package.name))]
    async fn fetch_bottle_metadata(&self, package: &Package, quiet: bool) -> Result<BottleMetadata> {
        let url = self.metadata_url(package);
        if quiet {
            debug!("Fetching bottle metadata for {} from {}", package.name, url);
        } else {
            println!("==> Fetching bottle metadata for {}", package.name);
        }

        let response: BottleResponse = self
            .client
            .get_json(&url)
            .await
            .with_context(|| format!("Failed to fetch bottle metadata for {}", package.name))?;

        Ok(BottleMetadata {
            download_size: response.download_size,
            installed_size: response.installed_size,
        })
    }
}

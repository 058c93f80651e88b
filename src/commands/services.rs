//! Service factory for building command dependencies.
//!
//! Services are built from configuration values but are not part of the
//! configuration itself.

use anyhow::Result;
use log::debug;
use reqwest::Client;

use crate::{http::HttpClient, metadata::HttpBottleSource};

use super::config::Config;

const USER_AGENT: &str = concat!("kegup/", env!("KEGUP_VERSION"));

/// Build the HTTP client shared by every network collaborator
pub fn build_http_client() -> Result<HttpClient> {
    let client = Client::builder().user_agent(USER_AGENT).build()?;
    Ok(HttpClient::new(client))
}

/// Build the bottle metadata source from configuration
pub fn build_metadata_source(config: &Config) -> Result<HttpBottleSource> {
    let http_client = build_http_client()?;
    debug!("Using bottle metadata API at {}", config.api_url);
    Ok(HttpBottleSource::new(http_client, &config.api_url))
}

/// Container for all services needed by the commands
pub struct Services {
    pub metadata: HttpBottleSource,
}

impl Services {
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self {
            metadata: build_metadata_source(config)?,
        })
    }
}

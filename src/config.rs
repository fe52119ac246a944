//! Server configuration.
//!
//! The configuration is read from a YAML file whose path is given on the
//! command line. Every key is optional; missing keys fall back to the
//! defaults below.

use std::path::Path;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::CatalogError;

/// Default openEO API version implemented by this server.
pub const DEFAULT_API_VERSION: &str = "1.1.0";

/// Default STAC version of the catalog payloads.
pub const DEFAULT_STAC_VERSION: &str = "1.0.0";

/// STAC extensions referenced by collection and item documents.
pub const STAC_EXTENSIONS: [&str; 1] =
    ["https://stac-extensions.github.io/datacube/v2.2.0/schema.json"];

/// Default public URL of the server.
pub const DEFAULT_SERVER_URL: &str = "http://localhost:5000";

/// Default server identifier.
pub const DEFAULT_SERVER_ID: &str = "geodb-openeo";

/// Default server title.
pub const DEFAULT_SERVER_TITLE: &str = "geoDB openEO API";

/// Default server description.
pub const DEFAULT_SERVER_DESCRIPTION: &str = "Catalog of geoDB collections.";

/// Selects the datastore implementation backing the catalog.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DataStoreKind {
    /// Collections are served from geoDB via its PostgREST API.
    #[default]
    GeoDb,
    /// Collections are held in memory. Intended for demos and tests.
    Memory,
}

/// Connection and credential settings for the geoDB PostgREST API.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct GeoDbSettings {
    /// Base URL of the PostgREST endpoint
    pub postgrest_url: Url,
    /// OAuth2 client id
    pub client_id: String,
    /// OAuth2 client secret
    pub client_secret: String,
    /// OAuth2 token endpoint domain
    pub auth_domain: Url,
    /// The geoDB database holding the collections. Uses the account's
    /// default database if not set.
    #[serde(default)]
    pub database: Option<String>,
}

/// Server configuration
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct Config {
    /// openEO API version reported by the capabilities documents
    pub api_version: String,
    /// STAC version stamped onto every collection and item document
    pub stac_version: String,
    /// Public URL of the server, reported by the well-known document
    pub server_url: String,
    /// Server identifier reported by the root document
    pub server_id: String,
    /// Server title reported by the root document
    pub server_title: String,
    /// Server description reported by the root document
    pub server_description: String,
    /// Which datastore serves the collections
    pub datastore: DataStoreKind,
    /// geoDB connection settings, required when `datastore` is `geodb`
    pub geodb: Option<GeoDbSettings>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            api_version: DEFAULT_API_VERSION.to_string(),
            stac_version: DEFAULT_STAC_VERSION.to_string(),
            server_url: DEFAULT_SERVER_URL.to_string(),
            server_id: DEFAULT_SERVER_ID.to_string(),
            server_title: DEFAULT_SERVER_TITLE.to_string(),
            server_description: DEFAULT_SERVER_DESCRIPTION.to_string(),
            datastore: DataStoreKind::default(),
            geodb: None,
        }
    }
}

/// Load the configuration from a YAML file.
///
/// # Arguments
///
/// * `path`: Path to the configuration file
pub fn load_config(path: impl AsRef<Path>) -> Result<Config, CatalogError> {
    let content = std::fs::read_to_string(path)?;
    let config = serde_yaml::from_str(&content)?;
    Ok(config)
}

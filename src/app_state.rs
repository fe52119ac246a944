//! Shared application state.

use std::sync::Arc;

use crate::cli::CommandLineArgs;
use crate::config::{Config, DataStoreKind};
use crate::datastore::{DataStore, MemoryStore};
use crate::error::CatalogError;
use crate::geodb::GeoDbStore;

/// Shared application state passed to each request handler.
pub struct AppState {
    /// Command line arguments.
    pub args: CommandLineArgs,

    /// Server configuration.
    pub config: Config,

    /// The datastore serving the collections.
    pub store: Box<dyn DataStore>,
}

impl AppState {
    /// Create and return an [AppState].
    ///
    /// The datastore is selected by the configuration.
    pub fn new(args: &CommandLineArgs, config: Config) -> Result<Self, CatalogError> {
        let store: Box<dyn DataStore> = match config.datastore {
            DataStoreKind::GeoDb => {
                let settings = config.geodb.clone().ok_or_else(|| CatalogError::Config {
                    reason: "datastore is geodb but no geodb settings are configured".to_string(),
                })?;
                Box::new(GeoDbStore::new(settings))
            }
            DataStoreKind::Memory => Box::new(MemoryStore::new()),
        };

        Ok(Self {
            args: args.clone(),
            config,
            store,
        })
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState").finish_non_exhaustive()
    }
}

/// AppState wrapped in an Atomic Reference Count (Arc) to allow multiple references.
pub type SharedAppState = Arc<AppState>;

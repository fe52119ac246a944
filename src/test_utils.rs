use std::sync::Arc;

use geojson::feature::Id;
use geojson::{Feature, Geometry};
use serde_json::{json, Value};

use crate::app_state::{AppState, SharedAppState};
use crate::cli::CommandLineArgs;
use crate::config::{Config, DataStoreKind};
use crate::datastore::{MemoryCollection, MemoryStore};
use crate::models::{Bbox, Extent};
use crate::vector_cube::VectorCubeMetadata;

/// A polygon feature covering the Hamburg area, with id "0".
pub(crate) fn hamburg_feature() -> Feature {
    polygon_feature(
        "0",
        vec![
            vec![9.0, 52.0],
            vec![9.0, 54.0],
            vec![11.0, 54.0],
            vec![11.0, 52.0],
            vec![10.0, 53.0],
            vec![9.8, 53.4],
            vec![9.2, 52.1],
            vec![9.0, 52.0],
        ],
        json!({"name": "hamburg", "population": 1700000}),
    )
}

/// A polygon feature covering the Paderborn area, with id "1".
pub(crate) fn paderborn_feature() -> Feature {
    polygon_feature(
        "1",
        vec![
            vec![8.7, 51.3],
            vec![8.7, 51.8],
            vec![8.8, 51.8],
            vec![8.8, 51.3],
            vec![8.7, 51.3],
        ],
        json!({"name": "paderborn", "population": 150000}),
    )
}

fn polygon_feature(id: &str, ring: Vec<Vec<f64>>, properties: Value) -> Feature {
    Feature {
        bbox: None,
        geometry: Some(Geometry::new(geojson::Value::Polygon(vec![ring]))),
        id: Some(Id::String(id.to_string())),
        properties: properties.as_object().cloned(),
        foreign_members: None,
    }
}

/// A MemoryStore with a two-feature collection and an empty collection.
pub(crate) fn memory_store() -> MemoryStore {
    let mut store = MemoryStore::new();
    let mut summaries = serde_json::Map::new();
    summaries.insert(
        "properties".to_string(),
        json!([{"name": "name"}, {"name": "population"}]),
    );
    store.add_collection(
        "collection_1",
        MemoryCollection {
            metadata: VectorCubeMetadata {
                title: "collection_1".to_string(),
                version: Some("0.3.1".to_string()),
                extent: Extent::of_bbox(Bbox::new(8.0, 51.0, 12.0, 52.0)),
                summaries,
                ..Default::default()
            },
            features: vec![hamburg_feature(), paderborn_feature()],
        },
    );
    store.add_collection(
        "empty_collection",
        MemoryCollection {
            metadata: VectorCubeMetadata {
                title: "empty_collection".to_string(),
                ..Default::default()
            },
            features: Vec::new(),
        },
    );
    store
}

/// A configuration selecting the in-memory datastore.
pub(crate) fn test_config() -> Config {
    Config {
        datastore: DataStoreKind::Memory,
        ..Default::default()
    }
}

/// Command line arguments as parsed from an empty command line.
pub(crate) fn test_args() -> CommandLineArgs {
    CommandLineArgs {
        host: "0.0.0.0".to_string(),
        port: 5000,
        config: "config.yml".to_string(),
        https: false,
        cert_file: "~/.config/geodb-openeo/certs/cert.pem".to_string(),
        key_file: "~/.config/geodb-openeo/certs/key.pem".to_string(),
        graceful_shutdown_timeout: 60,
    }
}

/// An AppState over the memory store fixture.
pub(crate) fn test_state() -> AppState {
    AppState {
        args: test_args(),
        config: test_config(),
        store: Box::new(memory_store()),
    }
}

/// A shared AppState over the memory store fixture.
pub(crate) fn shared_test_state() -> SharedAppState {
    Arc::new(test_state())
}

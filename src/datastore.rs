//! The datastore seam between the catalog and the vector database.
//!
//! The catalog module is written against the [DataStore] trait only. The
//! geoDB implementation lives in [crate::geodb]; the in-memory
//! implementation below serves demos and tests.

use async_trait::async_trait;
use geo::Intersects;
use geojson::Feature;

use crate::error::CatalogError;
use crate::models::Bbox;
use crate::vector_cube::{feature_bbox, VectorCube, VectorCubeMetadata};

/// Interface of the vector database behind the catalog.
#[async_trait]
pub trait DataStore: Send + Sync {
    /// Identifiers of all collections the store can serve.
    async fn collection_ids(&self) -> Result<Vec<String>, CatalogError>;

    /// Load one collection as a vector cube.
    ///
    /// # Arguments
    ///
    /// * `collection_id`: The collection to load
    /// * `with_items`: Whether to load the features of the requested page.
    ///   When false, only metadata and the feature count are loaded.
    /// * `bbox`: Only count and return features intersecting this bounding
    ///   box
    /// * `limit`: Maximum number of features to load
    /// * `offset`: Features are loaded starting at this offset
    async fn get_vector_cube(
        &self,
        collection_id: &str,
        with_items: bool,
        bbox: Option<Bbox>,
        limit: usize,
        offset: usize,
    ) -> Result<VectorCube, CatalogError>;
}

/// One collection held by a [MemoryStore].
#[derive(Clone, Debug, Default)]
pub struct MemoryCollection {
    /// Descriptive metadata
    pub metadata: VectorCubeMetadata,
    /// All features of the collection
    pub features: Vec<Feature>,
}

/// An in-memory [DataStore].
///
/// Paging and bounding-box filtering happen locally; a feature matches a
/// bounding box if its own bounding box intersects it.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    collections: Vec<(String, MemoryCollection)>,
}

impl MemoryStore {
    /// Create an empty MemoryStore.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a collection to the store.
    ///
    /// # Arguments
    ///
    /// * `collection_id`: Identifier of the collection
    /// * `collection`: Metadata and features
    pub fn add_collection(&mut self, collection_id: &str, collection: MemoryCollection) {
        self.collections
            .push((collection_id.to_string(), collection));
    }

    fn collection(&self, collection_id: &str) -> Result<&MemoryCollection, CatalogError> {
        self.collections
            .iter()
            .find(|(id, _)| id == collection_id)
            .map(|(_, collection)| collection)
            .ok_or_else(|| CatalogError::CollectionNotFound {
                collection_id: collection_id.to_string(),
            })
    }
}

/// Whether a feature's bounding box intersects the given bounding box.
///
/// Features without geometry never match.
fn matches_bbox(feature: &Feature, bbox: Bbox) -> Result<bool, CatalogError> {
    Ok(match feature_bbox(feature)? {
        Some(feature_bbox) => feature_bbox.to_rect().intersects(&bbox.to_rect()),
        None => false,
    })
}

#[async_trait]
impl DataStore for MemoryStore {
    async fn collection_ids(&self) -> Result<Vec<String>, CatalogError> {
        Ok(self.collections.iter().map(|(id, _)| id.clone()).collect())
    }

    async fn get_vector_cube(
        &self,
        collection_id: &str,
        with_items: bool,
        bbox: Option<Bbox>,
        limit: usize,
        offset: usize,
    ) -> Result<VectorCube, CatalogError> {
        let collection = self.collection(collection_id)?;
        let mut matching = Vec::with_capacity(collection.features.len());
        for feature in &collection.features {
            if let Some(bbox) = bbox {
                if !matches_bbox(feature, bbox)? {
                    continue;
                }
            }
            matching.push(feature);
        }
        let total_feature_count = matching.len() as u64;
        let features = if with_items {
            matching
                .into_iter()
                .skip(offset)
                .take(limit)
                .cloned()
                .collect()
        } else {
            Vec::new()
        };
        Ok(VectorCube {
            id: collection_id.to_string(),
            metadata: collection.metadata.clone(),
            total_feature_count,
            features,
        })
    }
}

//! The vector cube data model.
//!
//! A vector cube is the catalog's view of one geoDB collection: its
//! metadata, the total number of features matching a request, and the page
//! of features that was actually loaded. Representation follows
//! <https://r-spatial.org/r/2022/09/12/vdc.html>, with the geometry column
//! as the single spatial dimension.

use geo::BoundingRect;
use geojson::feature::Id;
use geojson::Feature;
use serde_json::{Map, Value};

use crate::error::CatalogError;
use crate::models::{Bbox, Extent};

/// Descriptive metadata of a vector cube, used to build collection
/// documents.
#[derive(Clone, Debug, Default)]
pub struct VectorCubeMetadata {
    /// Human readable title
    pub title: String,
    /// Human readable description
    pub description: Option<String>,
    /// License of the collection data
    pub license: Option<String>,
    /// Keywords describing the collection
    pub keywords: Vec<String>,
    /// Data providers
    pub providers: Vec<Value>,
    /// Version of the collection data
    pub version: Option<String>,
    /// Spatial and temporal extent
    pub extent: Extent,
    /// Summaries, e.g. the feature property names
    pub summaries: Map<String, Value>,
}

/// One geoDB collection as seen by the catalog.
#[derive(Clone, Debug)]
pub struct VectorCube {
    /// Collection identifier
    pub id: String,
    /// Descriptive metadata
    pub metadata: VectorCubeMetadata,
    /// Total number of features matching the request, regardless of paging
    pub total_feature_count: u64,
    /// The loaded page of features. Empty when the cube was fetched without
    /// items.
    pub features: Vec<Feature>,
}

/// Render a GeoJSON feature id as a string.
///
/// Feature ids are compared and exposed as strings throughout the API, no
/// matter whether the source encodes them as numbers or strings.
pub fn feature_id(feature: &Feature) -> Option<String> {
    match &feature.id {
        Some(Id::String(id)) => Some(id.clone()),
        Some(Id::Number(id)) => Some(id.to_string()),
        None => None,
    }
}

/// The bounding box of a feature.
///
/// An explicit `bbox` member wins; otherwise the box is computed from the
/// geometry. Features without geometry have no bounding box.
pub fn feature_bbox(feature: &Feature) -> Result<Option<Bbox>, CatalogError> {
    if let Some(bbox) = &feature.bbox {
        if let [minx, miny, maxx, maxy] = bbox[..] {
            return Ok(Some(Bbox::new(minx, miny, maxx, maxy)));
        }
    }
    let Some(geometry) = &feature.geometry else {
        return Ok(None);
    };
    let geometry = geo::Geometry::<f64>::try_from(geometry)?;
    Ok(geometry
        .bounding_rect()
        .map(|rect| Bbox::new(rect.min().x, rect.min().y, rect.max().x, rect.max().y)))
}

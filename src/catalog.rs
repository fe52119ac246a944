//! STAC response construction and pagination.
//!
//! Translates paged vector cubes into the collection, item and listing
//! documents of the catalog API, including the navigation links of paged
//! responses.

use chrono::Utc;
use serde_json::{json, Map, Value};

use crate::app_state::AppState;
use crate::config::{Config, STAC_EXTENSIONS};
use crate::error::CatalogError;
use crate::models::{Bbox, Collection, Collections, Item, ItemCollection, Link};
use crate::vector_cube::{feature_bbox, feature_id, VectorCube};

/// Default number of collections in a listing page.
pub const STAC_DEFAULT_COLLECTIONS_LIMIT: usize = 10;

/// Default number of features in an items page.
pub const STAC_DEFAULT_ITEMS_LIMIT: usize = 10;

/// Maximum number of features in an items page.
pub const STAC_MAX_ITEMS_LIMIT: usize = 10_000;

/// Build the collection listing document.
///
/// # Arguments
///
/// * `state`: Shared application state
/// * `base_url`: Public base URL of the server for this request
/// * `limit`: Maximum number of collections in the page
/// * `offset`: Collections are listed starting at this offset
pub async fn get_collections(
    state: &AppState,
    base_url: &str,
    limit: usize,
    offset: usize,
) -> Result<Collections, CatalogError> {
    let collection_ids = state.store.collection_ids().await?;
    let url = format!("{base_url}/collections");
    let links = get_collections_links(limit, offset, &url, collection_ids.len());
    let mut collections = Vec::new();
    for collection_id in collection_ids.iter().skip(offset).take(limit) {
        let vector_cube =
            get_vector_cube(state, collection_id, false, None, limit, offset).await?;
        collections.push(collection_document(
            &state.config,
            &vector_cube,
            base_url,
            false,
        ));
    }
    Ok(Collections { collections, links })
}

/// Navigation links for a collection listing page.
///
/// * `next` is present while another page follows.
/// * `prev` and `first` are present on every page but the first.
/// * `last` is present while the page does not reach the end of the listing.
///
/// Offsets saturate at zero.
fn get_collections_links(limit: usize, offset: usize, url: &str, collection_count: usize) -> Vec<Link> {
    let mut links = Vec::new();
    let next_offset = offset + limit;
    if next_offset < collection_count {
        links.push(Link::titled(
            "next",
            format!("{url}?limit={limit}&offset={next_offset}"),
            "next",
        ));
    }
    if offset > 0 {
        let prev_offset = offset.saturating_sub(limit);
        links.push(Link::titled(
            "prev",
            format!("{url}?limit={limit}&offset={prev_offset}"),
            "prev",
        ));
        links.push(Link::titled(
            "first",
            format!("{url}?limit={limit}&offset=0"),
            "first",
        ));
    }
    if limit + offset < collection_count {
        let last_offset = collection_count.saturating_sub(limit);
        links.push(Link::titled(
            "last",
            format!("{url}?limit={limit}&offset={last_offset}"),
            "last",
        ));
    }
    links
}

/// Build the detailed document of a single collection.
pub async fn get_collection(
    state: &AppState,
    base_url: &str,
    collection_id: &str,
) -> Result<Collection, CatalogError> {
    let vector_cube = get_vector_cube(state, collection_id, false, None, 0, 0).await?;
    Ok(collection_document(
        &state.config,
        &vector_cube,
        base_url,
        true,
    ))
}

/// Build the items page of a collection.
///
/// # Arguments
///
/// * `state`: Shared application state
/// * `base_url`: Public base URL of the server for this request
/// * `collection_id`: The collection to list features of
/// * `limit`: Maximum number of features in the page
/// * `offset`: Features are listed starting at this offset
/// * `bbox`: Only features intersecting the bounding box are selected
pub async fn get_collection_items(
    state: &AppState,
    base_url: &str,
    collection_id: &str,
    limit: usize,
    offset: usize,
    bbox: Option<Bbox>,
) -> Result<ItemCollection, CatalogError> {
    validate_limit(limit)?;
    let vector_cube = get_vector_cube(state, collection_id, true, bbox, limit, offset).await?;
    let features = vector_cube
        .features
        .iter()
        .map(|feature| item_document(&state.config, &vector_cube.id, feature, base_url))
        .collect::<Result<Vec<Item>, CatalogError>>()?;
    Ok(ItemCollection {
        kind: "FeatureCollection".to_string(),
        number_returned: features.len(),
        features,
        time_stamp: utc_now(),
        number_matched: vector_cube.total_feature_count,
    })
}

/// Build the document of a single feature.
pub async fn get_collection_item(
    state: &AppState,
    base_url: &str,
    collection_id: &str,
    feature_id_value: &str,
) -> Result<Item, CatalogError> {
    let vector_cube =
        get_vector_cube(state, collection_id, true, None, STAC_MAX_ITEMS_LIMIT, 0).await?;
    for feature in &vector_cube.features {
        if feature_id(feature).as_deref() == Some(feature_id_value) {
            return item_document(&state.config, &vector_cube.id, feature, base_url);
        }
    }
    Err(CatalogError::ItemNotFound {
        collection_id: collection_id.to_string(),
        feature_id: feature_id_value.to_string(),
    })
}

/// The search stub. Search across collections is not supported by the
/// backend yet.
pub fn search() -> Value {
    Value::Object(Map::new())
}

/// Load a vector cube, verifying the collection id first.
async fn get_vector_cube(
    state: &AppState,
    collection_id: &str,
    with_items: bool,
    bbox: Option<Bbox>,
    limit: usize,
    offset: usize,
) -> Result<VectorCube, CatalogError> {
    let collection_ids = state.store.collection_ids().await?;
    if !collection_ids.iter().any(|id| id == collection_id) {
        return Err(CatalogError::CollectionNotFound {
            collection_id: collection_id.to_string(),
        });
    }
    state
        .store
        .get_vector_cube(collection_id, with_items, bbox, limit, offset)
        .await
}

/// Translate a vector cube into a collection document.
///
/// `details` additionally reports the datacube dimensions.
fn collection_document(
    config: &Config,
    vector_cube: &VectorCube,
    base_url: &str,
    details: bool,
) -> Collection {
    let metadata = &vector_cube.metadata;
    let cube_dimensions = details.then(|| {
        json!({
            "vector": {
                "type": "geometry",
                "axes": ["x", "y"],
            }
        })
    });
    Collection {
        stac_version: config.stac_version.clone(),
        stac_extensions: STAC_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
        kind: "Collection".to_string(),
        id: vector_cube.id.clone(),
        title: metadata.title.clone(),
        description: metadata
            .description
            .clone()
            .unwrap_or_else(|| "No description available.".to_string()),
        license: metadata
            .license
            .clone()
            .unwrap_or_else(|| "proprietary".to_string()),
        keywords: metadata.keywords.clone(),
        providers: metadata.providers.clone(),
        version: metadata.version.clone(),
        extent: metadata.extent.clone(),
        summaries: metadata.summaries.clone(),
        cube_dimensions,
        links: vec![
            Link::new("self", format!("{base_url}/collections/{}", vector_cube.id)),
            Link::new("root", format!("{base_url}/collections")),
        ],
    }
}

/// Translate a feature of a vector cube into an item document.
fn item_document(
    config: &Config,
    collection_id: &str,
    feature: &geojson::Feature,
    base_url: &str,
) -> Result<Item, CatalogError> {
    let id = feature_id(feature).ok_or_else(|| CatalogError::FeatureWithoutId {
        collection_id: collection_id.to_string(),
    })?;
    let bbox = feature_bbox(feature)?
        .map(|bbox| bbox.0.iter().map(|value| format!("{value:.4}")).collect())
        .unwrap_or_default();
    Ok(Item {
        stac_version: config.stac_version.clone(),
        stac_extensions: STAC_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
        kind: "Feature".to_string(),
        bbox,
        geometry: feature.geometry.clone(),
        properties: feature.properties.clone().unwrap_or_default(),
        collection: collection_id.to_string(),
        links: vec![Link::new(
            "self",
            format!("{base_url}/collections/{collection_id}/items/{id}"),
        )],
        assets: Map::new(),
        id,
    })
}

/// Reject item limits outside `1..=STAC_MAX_ITEMS_LIMIT`.
fn validate_limit(limit: usize) -> Result<(), CatalogError> {
    if limit < 1 || limit > STAC_MAX_ITEMS_LIMIT {
        return Err(CatalogError::InvalidParameter {
            reason: format!("if specified, limit has to be between 1 and {STAC_MAX_ITEMS_LIMIT}"),
        });
    }
    Ok(())
}

/// The current UTC time with second precision, e.g. `2024-06-01T12:00:00Z`.
fn utc_now() -> String {
    Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

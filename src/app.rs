//! Route definitions and request handlers.
//!
//! The application is a plain [axum::Router] over the shared state, so any
//! hyper-compatible server can mount it; [crate::server] is the bundled
//! mount.

use crate::app_state::SharedAppState;
use crate::capabilities;
use crate::catalog;
use crate::error::CatalogError;
use crate::metrics;
use crate::models::{
    Collection, Collections, CollectionsQuery, Conformance, Item, ItemCollection, ItemsQuery,
    Root, WellKnown,
};
use crate::processes;
use crate::validated_query::ValidatedQuery;

use async_trait::async_trait;
use axum::{
    extract::{FromRequestParts, Path, State},
    http::header,
    http::request::Parts,
    routing::get,
    Json, Router,
};
use serde_json::Value;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

/// The public base URL of the server for the current request.
///
/// Derived from the request's Host header, falling back to the configured
/// server URL when the header is absent.
pub struct BaseUrl(pub String);

#[async_trait]
impl FromRequestParts<SharedAppState> for BaseUrl {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &SharedAppState,
    ) -> Result<Self, Self::Rejection> {
        let scheme = if state.args.https { "https" } else { "http" };
        let base_url = parts
            .headers
            .get(header::HOST)
            .and_then(|host| host.to_str().ok())
            .map(|host| format!("{scheme}://{host}"))
            .unwrap_or_else(|| state.config.server_url.clone());
        Ok(BaseUrl(base_url))
    }
}

/// Build the catalog API router.
///
/// # Arguments
///
/// * `state`: Shared application state
pub fn service(state: SharedAppState) -> Router {
    Router::new()
        .route("/", get(get_root))
        .route("/.well-known/openeo", get(get_well_known))
        .route("/conformance", get(get_conformance))
        .route("/processes", get(get_processes))
        .route("/collections", get(get_collections))
        .route("/collections/:collection_id", get(get_collection))
        .route("/collections/:collection_id/items", get(get_collection_items))
        .route(
            "/collections/:collection_id/items/:feature_id",
            get(get_collection_item),
        )
        .route("/search", get(get_search).post(post_search))
        .route("/metrics", get(metrics::metrics_handler))
        .layer(
            ServiceBuilder::new().layer(
                TraceLayer::new_for_http()
                    .on_request(metrics::request_counter)
                    .on_response(metrics::record_response_metrics),
            ),
        )
        .with_state(state)
}

/// Information about the API version and supported endpoints / features.
async fn get_root(State(state): State<SharedAppState>, BaseUrl(base_url): BaseUrl) -> Json<Root> {
    Json(capabilities::get_root(&state.config, &base_url))
}

/// Lists all implemented openEO versions supported by the service provider.
async fn get_well_known(State(state): State<SharedAppState>) -> Json<WellKnown> {
    Json(capabilities::get_well_known(&state.config))
}

/// Lists all conformance classes specified in OGC standards that the server
/// conforms to.
async fn get_conformance() -> Json<Conformance> {
    Json(capabilities::get_conformance())
}

/// Lists all predefined processes.
async fn get_processes() -> Json<Value> {
    Json(processes::get_processes())
}

/// Lists the available collections.
async fn get_collections(
    State(state): State<SharedAppState>,
    BaseUrl(base_url): BaseUrl,
    ValidatedQuery(query): ValidatedQuery<CollectionsQuery>,
) -> Result<Json<Collections>, CatalogError> {
    let limit = query.limit.unwrap_or(catalog::STAC_DEFAULT_COLLECTIONS_LIMIT);
    let offset = query.offset.unwrap_or(0);
    let collections = catalog::get_collections(&state, &base_url, limit, offset).await?;
    Ok(Json(collections))
}

/// Lists all information about a specific collection.
async fn get_collection(
    State(state): State<SharedAppState>,
    BaseUrl(base_url): BaseUrl,
    Path(collection_id): Path<String>,
) -> Result<Json<Collection>, CatalogError> {
    let collection = catalog::get_collection(&state, &base_url, &collection_id).await?;
    Ok(Json(collection))
}

/// Get features of the feature collection with id collection_id.
async fn get_collection_items(
    State(state): State<SharedAppState>,
    BaseUrl(base_url): BaseUrl,
    Path(collection_id): Path<String>,
    ValidatedQuery(query): ValidatedQuery<ItemsQuery>,
) -> Result<Json<ItemCollection>, CatalogError> {
    let limit = query.limit.unwrap_or(catalog::STAC_DEFAULT_ITEMS_LIMIT as u64) as usize;
    let offset = query.offset.unwrap_or(0) as usize;
    let items = catalog::get_collection_items(
        &state,
        &base_url,
        &collection_id,
        limit,
        offset,
        query.bbox,
    )
    .await?;
    Ok(Json(items))
}

/// Fetch a single feature.
async fn get_collection_item(
    State(state): State<SharedAppState>,
    BaseUrl(base_url): BaseUrl,
    Path((collection_id, feature_id)): Path<(String, String)>,
) -> Result<Json<Item>, CatalogError> {
    let item =
        catalog::get_collection_item(&state, &base_url, &collection_id, &feature_id).await?;
    Ok(Json(item))
}

/// Search across feature collections.
async fn get_search() -> Json<Value> {
    Json(catalog::search())
}

/// Search across feature collections.
async fn post_search() -> Json<Value> {
    Json(catalog::search())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils;

    use axum::{
        body::Body,
        http::{self, Request, StatusCode},
        response::Response,
    };
    use tower::ServiceExt; // for `oneshot` and `ready`

    async fn request(uri: &str) -> Response {
        service(test_utils::shared_test_state())
            .oneshot(
                Request::builder()
                    .method(http::Method::GET)
                    .uri(uri)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap()
    }

    async fn body_json(response: Response) -> Value {
        let bytes = hyper::body::to_bytes(response.into_body()).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn assert_hamburg(feature: &Value) {
        assert_eq!(feature["stac_version"], "1.0.0");
        assert_eq!(feature["type"], "Feature");
        assert_eq!(feature["id"], "0");
        assert_eq!(
            feature["bbox"],
            serde_json::json!(["9.0000", "52.0000", "11.0000", "54.0000"])
        );
        assert_eq!(feature["geometry"]["type"], "Polygon");
        assert_eq!(
            feature["properties"],
            serde_json::json!({"name": "hamburg", "population": 1700000})
        );
    }

    fn assert_paderborn(feature: &Value) {
        assert_eq!(feature["stac_version"], "1.0.0");
        assert_eq!(feature["type"], "Feature");
        assert_eq!(feature["id"], "1");
        assert_eq!(
            feature["bbox"],
            serde_json::json!(["8.7000", "51.3000", "8.8000", "51.8000"])
        );
        assert_eq!(
            feature["properties"],
            serde_json::json!({"name": "paderborn", "population": 150000})
        );
    }

    #[tokio::test]
    async fn root() {
        let response = request("/").await;
        assert_eq!(StatusCode::OK, response.status());
        let metainfo = body_json(response).await;
        assert_eq!(metainfo["type"], "catalog");
        assert_eq!(metainfo["description"], "Catalog of geoDB collections.");
        assert_eq!(metainfo["endpoints"][0]["path"], "/collections");
        assert_eq!(metainfo["endpoints"][0]["methods"][0], "GET");
        assert!(metainfo["links"].is_array());
    }

    #[tokio::test]
    async fn well_known() {
        let response = request("/.well-known/openeo").await;
        assert_eq!(StatusCode::OK, response.status());
        let well_known = body_json(response).await;
        assert_eq!(well_known["versions"][0]["url"], "http://localhost:5000");
        assert_eq!(well_known["versions"][0]["api_version"], "1.1.0");
    }

    #[tokio::test]
    async fn conformance() {
        let response = request("/conformance").await;
        assert_eq!(StatusCode::OK, response.status());
        let conformance = body_json(response).await;
        assert!(!conformance["conformsTo"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn processes() {
        let response = request("/processes").await;
        assert_eq!(StatusCode::OK, response.status());
        let processes = body_json(response).await;
        assert_eq!(processes["processes"][0]["id"], "load_collection");
    }

    #[tokio::test]
    async fn collections() {
        let response = request("/collections").await;
        assert_eq!(StatusCode::OK, response.status());
        let collections_data = body_json(response).await;
        assert!(collections_data["collections"].is_array());
        assert!(collections_data["links"].is_array());

        let first_collection = &collections_data["collections"][0];
        assert_eq!(first_collection["stac_version"], "1.0.0");
        assert_eq!(
            first_collection["stac_extensions"],
            serde_json::json!(
                ["https://stac-extensions.github.io/datacube/v2.2.0/schema.json"]
            )
        );
        assert_eq!(first_collection["type"], "Collection");
        assert_eq!(first_collection["id"], "collection_1");
        assert!(first_collection["description"].is_string());
        assert_eq!(first_collection["version"], "0.3.1");
        assert!(first_collection["license"].is_string());
        assert!(first_collection["extent"].is_object());
        assert_eq!(2, first_collection["links"].as_array().unwrap().len());
        // The listing carries summary documents only.
        assert!(first_collection.get("cube:dimensions").is_none());
    }

    #[tokio::test]
    async fn collections_paged() {
        let response = request("/collections?limit=1&offset=1").await;
        assert_eq!(StatusCode::OK, response.status());
        let collections_data = body_json(response).await;
        let collections = collections_data["collections"].as_array().unwrap();
        assert_eq!(1, collections.len());
        assert_eq!(collections[0]["id"], "empty_collection");
        let links = collections_data["links"].as_array().unwrap();
        let rels: Vec<&str> = links
            .iter()
            .map(|link| link["rel"].as_str().unwrap())
            .collect();
        assert_eq!(vec!["prev", "first"], rels);
    }

    #[tokio::test]
    async fn collection() {
        let response = request("/collections/collection_1").await;
        assert_eq!(StatusCode::OK, response.status());
        let collection_data = body_json(response).await;
        assert_eq!(collection_data["stac_version"], "1.0.0");
        assert_eq!(collection_data["type"], "Collection");
        assert_eq!(collection_data["id"], "collection_1");
        assert_eq!(collection_data["version"], "0.3.1");
        assert_eq!(
            collection_data["extent"]["spatial"],
            serde_json::json!({
                "bbox": [[8.0, 51.0, 12.0, 52.0]],
                "crs": "http://www.opengis.net/def/crs/OGC/1.3/CRS84",
            })
        );
        assert_eq!(
            collection_data["extent"]["temporal"],
            serde_json::json!({"interval": [[null, null]]})
        );
        assert_eq!(
            collection_data["cube:dimensions"],
            serde_json::json!({"vector": {"type": "geometry", "axes": ["x", "y"]}})
        );
        assert!(collection_data["summaries"].is_object());
    }

    #[tokio::test]
    async fn get_items() {
        let response = request("/collections/collection_1/items").await;
        assert_eq!(StatusCode::OK, response.status());
        let items_data = body_json(response).await;
        assert_eq!(items_data["type"], "FeatureCollection");
        assert!(items_data["timeStamp"].is_string());
        assert_eq!(items_data["numberMatched"], 2);
        assert_eq!(items_data["numberReturned"], 2);
        let features = items_data["features"].as_array().unwrap();
        assert_eq!(2, features.len());

        assert_hamburg(&features[0]);
        assert_paderborn(&features[1]);
    }

    #[tokio::test]
    async fn get_items_no_results() {
        let response = request("/collections/empty_collection/items").await;
        assert_eq!(StatusCode::OK, response.status());
        let items_data = body_json(response).await;
        assert_eq!(items_data["type"], "FeatureCollection");
        assert_eq!(items_data["numberMatched"], 0);
        assert!(items_data["features"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn get_item() {
        let response = request("/collections/collection_1/items/1").await;
        assert_eq!(StatusCode::OK, response.status());
        let item_data = body_json(response).await;
        assert_paderborn(&item_data);
        assert_eq!(item_data["collection"], "collection_1");
        assert_eq!(
            item_data["links"][0]["href"],
            "http://localhost:5000/collections/collection_1/items/1"
        );
    }

    #[tokio::test]
    async fn get_item_not_found() {
        let response = request("/collections/collection_1/items/42").await;
        assert_eq!(StatusCode::NOT_FOUND, response.status());
    }

    #[tokio::test]
    async fn get_items_filtered() {
        let response = request("/collections/collection_1/items?limit=1&offset=1").await;
        assert_eq!(StatusCode::OK, response.status());
        let items_data = body_json(response).await;
        assert_eq!(items_data["numberMatched"], 2);
        assert_eq!(items_data["numberReturned"], 1);
        let features = items_data["features"].as_array().unwrap();
        assert_eq!(1, features.len());
        assert_paderborn(&features[0]);
    }

    #[tokio::test]
    async fn get_items_invalid_filter() {
        for invalid_limit in ["-1", "0", "10001"] {
            let response =
                request(&format!("/collections/collection_1/items?limit={invalid_limit}")).await;
            assert_eq!(
                StatusCode::BAD_REQUEST,
                response.status(),
                "limit: {invalid_limit}"
            );
        }
    }

    #[tokio::test]
    async fn get_items_by_bbox() {
        let response =
            request("/collections/collection_1/items?bbox=9.01,52.01,10.01,53.01").await;
        assert_eq!(StatusCode::OK, response.status());
        let items_data = body_json(response).await;
        assert_eq!(items_data["type"], "FeatureCollection");
        assert_eq!(items_data["numberMatched"], 1);
        let features = items_data["features"].as_array().unwrap();
        assert_eq!(1, features.len());
        assert_hamburg(&features[0]);
    }

    #[tokio::test]
    async fn get_items_malformed_bbox() {
        let response = request("/collections/collection_1/items?bbox=not-a-bbox").await;
        assert_eq!(StatusCode::BAD_REQUEST, response.status());
    }

    #[tokio::test]
    async fn not_existing_collection() {
        let response = request("/collections/non-existent-collection").await;
        assert_eq!(StatusCode::NOT_FOUND, response.status());
    }

    #[tokio::test]
    async fn search() {
        let response = request("/search").await;
        assert_eq!(StatusCode::OK, response.status());
        let search_data = body_json(response).await;
        assert_eq!(serde_json::json!({}), search_data);
    }

    #[tokio::test]
    async fn search_post() {
        let response = service(test_utils::shared_test_state())
            .oneshot(
                Request::builder()
                    .method(http::Method::POST)
                    .uri("/search")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(StatusCode::OK, response.status());
    }

    #[tokio::test]
    async fn base_url_from_host_header() {
        let response = service(test_utils::shared_test_state())
            .oneshot(
                Request::builder()
                    .method(http::Method::GET)
                    .uri("/collections/collection_1")
                    .header(http::header::HOST, "catalog.example.com")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(StatusCode::OK, response.status());
        let collection_data = body_json(response).await;
        assert_eq!(
            collection_data["links"][0]["href"],
            "http://catalog.example.com/collections/collection_1"
        );
    }

    #[tokio::test]
    async fn metrics() {
        let response = request("/metrics").await;
        assert_eq!(StatusCode::OK, response.status());
    }
}

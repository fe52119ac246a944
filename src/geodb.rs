//! A simplified geoDB client that supports the read operations the catalog
//! needs. It attempts to hide the complexities of working with the geoDB
//! PostgREST interface: OAuth2 client-credentials authentication, the
//! GeoJSON-returning RPC functions, and PostgREST's exact-count headers.

use geojson::{Feature, FeatureCollection};
use reqwest::header::{HeaderValue, CONTENT_RANGE, RANGE};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tokio::sync::RwLock;

use crate::config::GeoDbSettings;
use crate::datastore::DataStore;
use crate::error::CatalogError;
use crate::models::{Bbox, Extent};
use crate::vector_cube::{VectorCube, VectorCubeMetadata};

use async_trait::async_trait;

/// Separator between database and collection name in collection ids.
const COLLECTION_ID_SEPARATOR: char = '~';

/// One entry of the collection listing returned by geoDB.
#[derive(Debug, Deserialize, PartialEq)]
pub struct CollectionKey {
    /// The database holding the collection
    pub database: Option<String>,
    /// The collection name
    pub collection: String,
}

/// Response of the OAuth2 token endpoint.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// A client for the geoDB PostgREST API.
pub struct GeoDbClient {
    http: reqwest::Client,
    settings: GeoDbSettings,
    // TODO: re-fetch the token when it expires; geoDB tokens are short-lived.
    token: RwLock<Option<String>>,
}

impl GeoDbClient {
    /// Create a new geoDB client.
    ///
    /// # Arguments
    ///
    /// * `settings`: Connection and credential settings
    pub fn new(settings: GeoDbSettings) -> Self {
        Self {
            http: reqwest::Client::new(),
            settings,
            token: RwLock::new(None),
        }
    }

    /// The bearer token for the geoDB API, fetched on first use.
    async fn token(&self) -> Result<String, CatalogError> {
        if let Some(token) = self.token.read().await.as_ref() {
            return Ok(token.clone());
        }
        let token = self.fetch_token().await?;
        *self.token.write().await = Some(token.clone());
        Ok(token)
    }

    /// Fetch a bearer token via the OAuth2 client-credentials flow.
    async fn fetch_token(&self) -> Result<String, CatalogError> {
        let url = self.settings.auth_domain.join("oauth/token")?;
        let response = self
            .http
            .post(url)
            .json(&json!({
                "client_id": self.settings.client_id,
                "client_secret": self.settings.client_secret,
                "audience": self.settings.auth_domain.as_str(),
                "grant_type": "client_credentials",
            }))
            .send()
            .await?;
        let response = check_status(response).await?;
        let token: TokenResponse = response.json().await?;
        Ok(token.access_token)
    }

    /// Call a GeoJSON-returning RPC function.
    async fn rpc(&self, function: &str, args: Value) -> Result<reqwest::Response, CatalogError> {
        let url = self.settings.postgrest_url.join(&format!("rpc/{function}"))?;
        let token = self.token().await?;
        let response = self
            .http
            .post(url)
            .bearer_auth(token)
            .json(&args)
            .send()
            .await?;
        check_status(response).await
    }

    /// List the collections the account can access.
    pub async fn get_my_collections(
        &self,
        database: Option<&str>,
    ) -> Result<Vec<CollectionKey>, CatalogError> {
        let response = self
            .rpc("geodb_get_my_collections", json!({ "database": database }))
            .await?;
        Ok(response.json().await?)
    }

    /// Count all rows of a collection.
    ///
    /// Uses PostgREST's exact-count headers; the count is parsed from the
    /// `Content-Range` response header.
    pub async fn count_collection_rows(
        &self,
        database: Option<&str>,
        collection: &str,
    ) -> Result<u64, CatalogError> {
        let table = qualified_table(database, collection);
        let mut url = self.settings.postgrest_url.join(&table)?;
        url.set_query(Some("select=id"));
        let token = self.token().await?;
        let response = self
            .http
            .get(url)
            .bearer_auth(token)
            .header(RANGE, HeaderValue::from_static("0-0"))
            .header("Range-Unit", HeaderValue::from_static("items"))
            .header("Prefer", HeaderValue::from_static("count=exact"))
            .send()
            .await?;
        let response = check_status(response).await?;
        parse_content_range(response.headers().get(CONTENT_RANGE))
    }

    /// Count the rows of a collection whose geometry intersects a bounding
    /// box.
    pub async fn count_collection_by_bbox(
        &self,
        database: Option<&str>,
        collection: &str,
        bbox: Bbox,
    ) -> Result<u64, CatalogError> {
        let [minx, miny, maxx, maxy] = bbox.0;
        let response = self
            .rpc(
                "geodb_count_by_bbox",
                json!({
                    "collection": qualified_table(database, collection),
                    "minx": minx,
                    "miny": miny,
                    "maxx": maxx,
                    "maxy": maxy,
                }),
            )
            .await?;
        Ok(response.json().await?)
    }

    /// Load a page of a collection's features.
    pub async fn get_collection(
        &self,
        database: Option<&str>,
        collection: &str,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Feature>, CatalogError> {
        let response = self
            .rpc(
                "geodb_get_collection",
                json!({
                    "collection": qualified_table(database, collection),
                    "limit": limit,
                    "offset": offset,
                }),
            )
            .await?;
        let features: FeatureCollection = response.json().await?;
        Ok(features.features)
    }

    /// Load a page of a collection's features intersecting a bounding box.
    pub async fn get_collection_by_bbox(
        &self,
        database: Option<&str>,
        collection: &str,
        bbox: Bbox,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Feature>, CatalogError> {
        let [minx, miny, maxx, maxy] = bbox.0;
        let response = self
            .rpc(
                "geodb_get_by_bbox",
                json!({
                    "collection": qualified_table(database, collection),
                    "minx": minx,
                    "miny": miny,
                    "maxx": maxx,
                    "maxy": maxy,
                    "limit": limit,
                    "offset": offset,
                }),
            )
            .await?;
        let features: FeatureCollection = response.json().await?;
        Ok(features.features)
    }

    /// The property (column) names of a collection.
    pub async fn get_properties(
        &self,
        database: Option<&str>,
        collection: &str,
    ) -> Result<Vec<String>, CatalogError> {
        #[derive(Deserialize)]
        struct Property {
            column_name: String,
        }
        let response = self
            .rpc(
                "geodb_get_properties",
                json!({ "collection": qualified_table(database, collection) }),
            )
            .await?;
        let properties: Vec<Property> = response.json().await?;
        Ok(properties
            .into_iter()
            .map(|property| property.column_name)
            .collect())
    }

    /// The bounding box covering all geometries of a collection.
    pub async fn get_collection_bbox(
        &self,
        database: Option<&str>,
        collection: &str,
    ) -> Result<Option<Bbox>, CatalogError> {
        let response = self
            .rpc(
                "geodb_get_collection_bbox",
                json!({ "collection": qualified_table(database, collection) }),
            )
            .await?;
        Ok(response.json().await?)
    }
}

/// The table name of a collection within a database.
fn qualified_table(database: Option<&str>, collection: &str) -> String {
    match database {
        Some(database) => format!("{database}_{collection}"),
        None => collection.to_string(),
    }
}

/// Reject non-success responses.
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, CatalogError> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status().as_u16();
    let message = response.text().await.unwrap_or_default();
    Err(CatalogError::GeoDbResponse { status, message })
}

/// Parse the total count out of a PostgREST `Content-Range` header, e.g.
/// `0-0/42`.
fn parse_content_range(header: Option<&HeaderValue>) -> Result<u64, CatalogError> {
    header
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.rsplit('/').next())
        .and_then(|count| count.parse().ok())
        .ok_or(CatalogError::GeoDbContentRangeMissing)
}

/// A [DataStore] backed by geoDB.
pub struct GeoDbStore {
    client: GeoDbClient,
    database: Option<String>,
}

impl GeoDbStore {
    /// Create a new GeoDbStore.
    pub fn new(settings: GeoDbSettings) -> Self {
        let database = settings.database.clone();
        Self {
            client: GeoDbClient::new(settings),
            database,
        }
    }

    /// Split a collection id into database and collection name.
    ///
    /// Collection ids have the form `database~collection`; ids without a
    /// separator fall back to the configured default database.
    fn split_collection_id<'a>(&'a self, collection_id: &'a str) -> (Option<&'a str>, &'a str) {
        match collection_id.split_once(COLLECTION_ID_SEPARATOR) {
            Some((database, collection)) => (Some(database), collection),
            None => (self.database.as_deref(), collection_id),
        }
    }
}

#[async_trait]
impl DataStore for GeoDbStore {
    async fn collection_ids(&self) -> Result<Vec<String>, CatalogError> {
        let keys = self
            .client
            .get_my_collections(self.database.as_deref())
            .await?;
        Ok(keys
            .into_iter()
            .filter(|key| !key.collection.is_empty())
            .map(|key| match key.database {
                Some(database) => {
                    format!("{database}{COLLECTION_ID_SEPARATOR}{}", key.collection)
                }
                None => key.collection,
            })
            .collect())
    }

    #[tracing::instrument(level = "debug", skip(self))]
    async fn get_vector_cube(
        &self,
        collection_id: &str,
        with_items: bool,
        bbox: Option<Bbox>,
        limit: usize,
        offset: usize,
    ) -> Result<VectorCube, CatalogError> {
        let (database, collection) = self.split_collection_id(collection_id);
        tracing::debug!("building vector cube for collection {collection_id}");
        let total_feature_count = match bbox {
            Some(bbox) => {
                self.client
                    .count_collection_by_bbox(database, collection, bbox)
                    .await?
            }
            None => {
                self.client
                    .count_collection_rows(database, collection)
                    .await?
            }
        };
        let properties = self.client.get_properties(database, collection).await?;
        let collection_bbox = self
            .client
            .get_collection_bbox(database, collection)
            .await?;
        let features = if with_items {
            match bbox {
                Some(bbox) => {
                    self.client
                        .get_collection_by_bbox(database, collection, bbox, limit, offset)
                        .await?
                }
                None => {
                    self.client
                        .get_collection(database, collection, limit, offset)
                        .await?
                }
            }
        } else {
            Vec::new()
        };
        let mut summaries = Map::new();
        summaries.insert(
            "properties".to_string(),
            Value::Array(
                properties
                    .into_iter()
                    .map(|name| json!({ "name": name }))
                    .collect(),
            ),
        );
        Ok(VectorCube {
            id: collection_id.to_string(),
            metadata: VectorCubeMetadata {
                title: collection.to_string(),
                extent: collection_bbox.map(Extent::of_bbox).unwrap_or_default(),
                summaries,
                ..Default::default()
            },
            total_feature_count,
            features,
        })
    }
}

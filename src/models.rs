//! Data types for the STAC and openEO payloads served by the catalog.

use std::fmt;
use std::str::FromStr;

use geo::Rect;
use geojson::Geometry;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use validator::Validate;

use crate::error::CatalogError;

/// CRS reported for spatial extents.
pub const CRS84: &str = "http://www.opengis.net/def/crs/OGC/1.3/CRS84";

/// A bounding box in `minx,miny,maxx,maxy` order, as used by the `bbox`
/// query parameter and by spatial extents.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
pub struct Bbox(pub [f64; 4]);

impl Bbox {
    /// Return a new Bbox.
    pub fn new(minx: f64, miny: f64, maxx: f64, maxy: f64) -> Self {
        Bbox([minx, miny, maxx, maxy])
    }

    /// The bounding box as an axis-aligned rectangle.
    pub fn to_rect(self) -> Rect<f64> {
        let [minx, miny, maxx, maxy] = self.0;
        Rect::new((minx, miny), (maxx, maxy))
    }
}

impl fmt::Display for Bbox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [minx, miny, maxx, maxy] = self.0;
        write!(f, "{},{},{},{}", minx, miny, maxx, maxy)
    }
}

impl FromStr for Bbox {
    type Err = CatalogError;

    /// Parse a comma-separated `minx,miny,maxx,maxy` string.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let invalid = || CatalogError::InvalidParameter {
            reason: format!("bbox must have the form minx,miny,maxx,maxy, got {:?}", value),
        };
        let coords = value
            .split(',')
            .map(|part| part.trim().parse::<f64>())
            .collect::<Result<Vec<f64>, _>>()
            .map_err(|_| invalid())?;
        let coords: [f64; 4] = coords.try_into().map_err(|_| invalid())?;
        Ok(Bbox(coords))
    }
}

/// Deserialise an optional `bbox` query parameter from its comma-separated
/// string form.
fn deserialize_bbox<'de, D>(deserializer: D) -> Result<Option<Bbox>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    value
        .map(|value| value.parse().map_err(serde::de::Error::custom))
        .transpose()
}

/// Query parameters accepted by the collection listing endpoint.
#[derive(Debug, Default, Deserialize, PartialEq, Validate)]
#[serde(deny_unknown_fields)]
pub struct CollectionsQuery {
    /// Maximum number of collections in the response document
    pub limit: Option<usize>,
    /// Collections are listed starting at offset
    pub offset: Option<usize>,
}

/// Query parameters accepted by the collection items endpoint.
#[derive(Debug, Default, Deserialize, PartialEq, Validate)]
#[serde(deny_unknown_fields)]
pub struct ItemsQuery {
    /// Maximum number of features in the response document
    #[validate(range(
        min = 1,
        max = 10000,
        message = "if specified, limit has to be between 1 and 10000"
    ))]
    pub limit: Option<u64>,
    /// Features are listed starting at offset
    pub offset: Option<u64>,
    /// Only features intersecting the bounding box are selected
    #[serde(default, deserialize_with = "deserialize_bbox")]
    pub bbox: Option<Bbox>,
}

/// A navigation or relation link.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Link {
    /// Relationship of the linked document to the current document
    pub rel: String,
    /// URL of the linked document
    pub href: String,
    /// Media type of the linked document
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
    /// Human readable title
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl Link {
    /// Return a new Link without media type and title.
    pub fn new(rel: &str, href: String) -> Self {
        Link {
            rel: rel.to_string(),
            href,
            media_type: None,
            title: None,
        }
    }

    /// Return a new Link with media type and title.
    pub fn full(rel: &str, href: String, media_type: &str, title: &str) -> Self {
        Link {
            rel: rel.to_string(),
            href,
            media_type: Some(media_type.to_string()),
            title: Some(title.to_string()),
        }
    }

    /// Return a new Link with a title only.
    pub fn titled(rel: &str, href: String, title: &str) -> Self {
        Link {
            rel: rel.to_string(),
            href,
            media_type: None,
            title: Some(title.to_string()),
        }
    }
}

/// Spatial extent of a collection.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct SpatialExtent {
    /// One or more bounding boxes covering the collection
    pub bbox: Vec<Bbox>,
    /// CRS of the bounding boxes
    pub crs: String,
}

/// Temporal extent of a collection.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct TemporalExtent {
    /// One or more closed-open intervals; `None` bounds are open
    pub interval: Vec<[Option<String>; 2]>,
}

/// Spatial and temporal extent of a collection.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Extent {
    /// Spatial extent
    pub spatial: SpatialExtent,
    /// Temporal extent
    pub temporal: TemporalExtent,
}

impl Extent {
    /// Return an Extent covering the given bounding box with an open
    /// temporal interval.
    pub fn of_bbox(bbox: Bbox) -> Self {
        Extent {
            spatial: SpatialExtent {
                bbox: vec![bbox],
                crs: CRS84.to_string(),
            },
            temporal: TemporalExtent {
                interval: vec![[None, None]],
            },
        }
    }
}

impl Default for Extent {
    /// An extent with no spatial coverage and an open temporal interval.
    fn default() -> Self {
        Extent {
            spatial: SpatialExtent {
                bbox: Vec::new(),
                crs: CRS84.to_string(),
            },
            temporal: TemporalExtent {
                interval: vec![[None, None]],
            },
        }
    }
}

/// A STAC collection document.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Collection {
    /// STAC version of the document
    pub stac_version: String,
    /// STAC extensions the document conforms to
    pub stac_extensions: Vec<String>,
    /// Always `"Collection"`
    #[serde(rename = "type")]
    pub kind: String,
    /// Collection identifier
    pub id: String,
    /// Human readable title
    pub title: String,
    /// Human readable description
    pub description: String,
    /// License of the collection data
    pub license: String,
    /// Keywords describing the collection
    pub keywords: Vec<String>,
    /// Data providers
    pub providers: Vec<Value>,
    /// Version of the collection data
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Spatial and temporal extent
    pub extent: Extent,
    /// Summaries of the collection, e.g. feature property names
    pub summaries: Map<String, Value>,
    /// Datacube dimensions, only present in detailed documents
    #[serde(rename = "cube:dimensions", skip_serializing_if = "Option::is_none")]
    pub cube_dimensions: Option<Value>,
    /// Relation links
    pub links: Vec<Link>,
}

/// The collection listing document.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Collections {
    /// One summary document per collection in the requested page
    pub collections: Vec<Collection>,
    /// Navigation links for the listing
    pub links: Vec<Link>,
}

/// A STAC item document, i.e. a GeoJSON feature with STAC metadata.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Item {
    /// STAC version of the document
    pub stac_version: String,
    /// STAC extensions the document conforms to
    pub stac_extensions: Vec<String>,
    /// Always `"Feature"`
    #[serde(rename = "type")]
    pub kind: String,
    /// Feature identifier, unique within the collection
    pub id: String,
    /// Feature bounding box, each coordinate formatted with four decimal
    /// places
    pub bbox: Vec<String>,
    /// Feature geometry
    pub geometry: Option<Geometry>,
    /// Feature properties
    pub properties: Map<String, Value>,
    /// Identifier of the collection the feature belongs to
    pub collection: String,
    /// Relation links
    pub links: Vec<Link>,
    /// Feature assets. geoDB features carry none, so this is usually absent.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub assets: Map<String, Value>,
}

/// The items page document: a GeoJSON feature collection with paging
/// metadata.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct ItemCollection {
    /// Always `"FeatureCollection"`
    #[serde(rename = "type")]
    pub kind: String,
    /// The features of the requested page
    pub features: Vec<Item>,
    /// UTC time the response was generated, second precision
    #[serde(rename = "timeStamp")]
    pub time_stamp: String,
    /// Total number of features matching the request
    #[serde(rename = "numberMatched")]
    pub number_matched: u64,
    /// Number of features in this page
    #[serde(rename = "numberReturned")]
    pub number_returned: usize,
}

/// An endpoint entry of the root capabilities document.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Endpoint {
    /// Route path
    pub path: String,
    /// HTTP methods served on the path
    pub methods: Vec<String>,
}

/// The root capabilities document.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Root {
    /// openEO API version implemented by the server
    pub api_version: String,
    /// Version of this server
    pub backend_version: String,
    /// STAC version of the catalog payloads
    pub stac_version: String,
    /// Always `"catalog"`
    #[serde(rename = "type")]
    pub kind: String,
    /// Server identifier
    pub id: String,
    /// Server title
    pub title: String,
    /// Server description
    pub description: String,
    /// Implemented endpoints
    pub endpoints: Vec<Endpoint>,
    /// Relation links
    pub links: Vec<Link>,
}

/// One version entry of the well-known document.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct WellKnownVersion {
    /// URL of the API instance
    pub url: String,
    /// openEO API version served there
    pub api_version: String,
}

/// The well-known openEO discovery document (RFC 5785).
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct WellKnown {
    /// All API versions offered by this service provider
    pub versions: Vec<WellKnownVersion>,
}

/// The conformance document listing implemented OGC conformance classes.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Conformance {
    /// Conformance class URIs
    #[serde(rename = "conformsTo")]
    pub conforms_to: Vec<String>,
}

//! The openEO capabilities documents.
//!
//! Implements the endpoints listed under
//! <https://openeo.org/documentation/1.0/developers/api/reference.html#tag/Capabilities>.

use crate::config::Config;
use crate::models::{Conformance, Endpoint, Link, Root, WellKnown, WellKnownVersion};

/// Build the root document: general information about the back-end,
/// including which endpoints of the openEO API are supported.
pub fn get_root(config: &Config, base_url: &str) -> Root {
    let get = || vec!["GET".to_string()];
    Root {
        api_version: config.api_version.clone(),
        backend_version: env!("CARGO_PKG_VERSION").to_string(),
        stac_version: config.stac_version.clone(),
        kind: "catalog".to_string(),
        id: config.server_id.clone(),
        title: config.server_title.clone(),
        description: config.server_description.clone(),
        endpoints: vec![
            Endpoint {
                path: "/collections".to_string(),
                methods: get(),
            },
            Endpoint {
                path: "/collections/{collection_id}".to_string(),
                methods: get(),
            },
            Endpoint {
                path: "/collections/{collection_id}/items".to_string(),
                methods: get(),
            },
            Endpoint {
                path: "/collections/{collection_id}/items/{feature_id}".to_string(),
                methods: get(),
            },
            Endpoint {
                path: "/conformance".to_string(),
                methods: get(),
            },
            Endpoint {
                path: "/processes".to_string(),
                methods: get(),
            },
        ],
        links: vec![
            Link::full(
                "self",
                format!("{base_url}/"),
                "application/json",
                "this document",
            ),
            Link::full(
                "service-desc",
                format!("{base_url}/api"),
                "application/vnd.oai.openapi+json;version=3.0",
                "the API definition",
            ),
            Link::full(
                "service-doc",
                format!("{base_url}/api.html"),
                "text/html",
                "the API documentation",
            ),
            Link::full(
                "conformance",
                format!("{base_url}/conformance"),
                "application/json",
                "OGC API conformance classes implemented by this server",
            ),
            Link::full(
                "data",
                format!("{base_url}/collections"),
                "application/json",
                "Information about the feature collections",
            ),
            Link::full(
                "search",
                format!("{base_url}/search"),
                "application/json",
                "Search across feature collections",
            ),
        ],
    }
}

/// Build the well-known document: all openEO versions supported by this
/// service provider. This document is served on the Well-Known URI
/// (RFC 5785) for openEO.
pub fn get_well_known(config: &Config) -> WellKnown {
    WellKnown {
        versions: vec![WellKnownVersion {
            url: config.server_url.clone(),
            api_version: config.api_version.clone(),
        }],
    }
}

/// Build the conformance document: the OGC conformance classes the server
/// implements.
pub fn get_conformance() -> Conformance {
    Conformance {
        conforms_to: vec![
            "http://www.opengis.net/spec/ogcapi-features-1/1.0/conf/core".to_string(),
            "http://www.opengis.net/spec/ogcapi-features-1/1.0/conf/oas30".to_string(),
            "http://www.opengis.net/spec/ogcapi-features-1/1.0/conf/html".to_string(),
            "http://www.opengis.net/spec/ogcapi-features-1/1.0/conf/geojson".to_string(),
        ],
    }
}

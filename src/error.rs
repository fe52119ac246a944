//! Error handling.

use axum::{
    extract::rejection::QueryRejection,
    http::header,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::error::Error;
use thiserror::Error;
use tracing::{event, Level};

/// Catalog server error type
///
/// This type encapsulates the various errors that may occur.
/// Each variant may result in a different API error response.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// A collection id that is not part of the catalog was requested
    #[error("unknown collection {collection_id:?}")]
    CollectionNotFound { collection_id: String },

    /// A feature id that is not part of the requested collection
    #[error("feature {feature_id:?} not found in collection {collection_id:?}")]
    ItemNotFound {
        collection_id: String,
        feature_id: String,
    },

    /// A query parameter holds a value outside its allowed range
    #[error("invalid parameter: {reason}")]
    InvalidParameter { reason: String },

    /// Error deserialising query parameters
    #[error("query parameters are not valid")]
    QueryRejection(#[from] QueryRejection),

    /// Error validating query parameters (single error)
    #[error("query parameters are not valid")]
    QueryValidationSingle(#[from] validator::ValidationError),

    /// Error validating query parameters (multiple errors)
    #[error("query parameters are not valid")]
    QueryValidation(#[from] validator::ValidationErrors),

    /// Error sending a request to the geoDB service
    #[error("error querying the geoDB service")]
    GeoDbRequest(#[from] reqwest::Error),

    /// The geoDB service answered with a non-success status
    #[error("geoDB service returned status {status}")]
    GeoDbResponse { status: u16, message: String },

    /// Missing Content-Range header in a geoDB count response
    #[error("geoDB response missing Content-Range header")]
    GeoDbContentRangeMissing,

    /// Error building a geoDB request URL
    #[error("failed to build geoDB request URL")]
    UrlParse(#[from] url::ParseError),

    /// A feature geometry could not be interpreted
    #[error("failed to interpret feature geometry")]
    Geometry(#[from] geojson::Error),

    /// A stored feature carries no id
    #[error("feature in collection {collection_id:?} has no id")]
    FeatureWithoutId { collection_id: String },

    /// The configuration is inconsistent
    #[error("configuration error: {reason}")]
    Config { reason: String },

    /// Error reading the configuration file
    #[error("failed to read configuration")]
    Io(#[from] std::io::Error),

    /// Error parsing the configuration file
    #[error("failed to parse configuration")]
    YamlParse(#[from] serde_yaml::Error),

    /// Error serialising a response payload
    #[error("failed to serialise response")]
    Serialization(#[from] serde_json::Error),
}

impl IntoResponse for CatalogError {
    /// Convert from a `CatalogError` into an [axum::response::Response].
    fn into_response(self) -> Response {
        ErrorResponse::from(self).into_response()
    }
}

/// Body of error response
///
/// Implements serde (de)serialise.
#[derive(Deserialize, Serialize)]
struct ErrorBody {
    /// Main error message
    message: String,

    /// Optional list of causes
    #[serde(skip_serializing_if = "Option::is_none")]
    caused_by: Option<Vec<String>>,
}

impl ErrorBody {
    /// Return a new ErrorBody
    ///
    /// # Arguments
    ///
    /// * `error`: The error that occurred
    fn new<E>(error: &E) -> Self
    where
        E: std::error::Error + Send + Sync,
    {
        let message = error.to_string();
        let mut caused_by = None;
        let mut current = error.source();
        while let Some(source) = current {
            let mut causes: Vec<String> = caused_by.unwrap_or_default();
            causes.push(source.to_string());
            caused_by = Some(causes);
            current = source.source();
        }
        // Remove duplicate entries.
        if let Some(caused_by) = caused_by.as_mut() {
            caused_by.dedup()
        }
        ErrorBody { message, caused_by }
    }
}

/// A response to send in error cases
///
/// Implements serde (de)serialise.
#[derive(Deserialize, Serialize)]
struct ErrorResponse {
    /// HTTP status of the response
    #[serde(skip)]
    status: StatusCode,

    /// Response body
    error: ErrorBody,
}

impl ErrorResponse {
    /// Return a new ErrorResponse
    ///
    /// # Arguments
    ///
    /// * `status`: HTTP status of the response
    /// * `error`: The error that occurred. This will be formatted into a suitable `ErrorBody`
    fn new<E>(status: StatusCode, error: &E) -> Self
    where
        E: std::error::Error + Send + Sync,
    {
        ErrorResponse {
            status,
            error: ErrorBody::new(error),
        }
    }

    /// Return a 400 bad request ErrorResponse
    fn bad_request<E>(error: &E) -> Self
    where
        E: std::error::Error + Send + Sync,
    {
        Self::new(StatusCode::BAD_REQUEST, error)
    }

    /// Return a 404 not found ErrorResponse
    fn not_found<E>(error: &E) -> Self
    where
        E: std::error::Error + Send + Sync,
    {
        Self::new(StatusCode::NOT_FOUND, error)
    }

    /// Return a 502 bad gateway ErrorResponse
    fn bad_gateway<E>(error: &E) -> Self
    where
        E: std::error::Error + Send + Sync,
    {
        Self::new(StatusCode::BAD_GATEWAY, error)
    }

    /// Return a 500 internal server error ErrorResponse
    fn internal_server_error<E>(error: &E) -> Self
    where
        E: std::error::Error + Send + Sync,
    {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, error)
    }
}

impl From<CatalogError> for ErrorResponse {
    /// Convert from a `CatalogError` into an `ErrorResponse`.
    fn from(error: CatalogError) -> Self {
        let response = match &error {
            // Bad request
            CatalogError::InvalidParameter { reason: _ }
            | CatalogError::QueryRejection(_)
            | CatalogError::QueryValidationSingle(_)
            | CatalogError::QueryValidation(_) => Self::bad_request(&error),

            // Not found
            CatalogError::CollectionNotFound { collection_id: _ }
            | CatalogError::ItemNotFound {
                collection_id: _,
                feature_id: _,
            } => Self::not_found(&error),

            // Bad gateway
            CatalogError::GeoDbRequest(_)
            | CatalogError::GeoDbResponse {
                status: _,
                message: _,
            }
            | CatalogError::GeoDbContentRangeMissing => Self::bad_gateway(&error),

            // Internal server error
            CatalogError::Geometry(_)
            | CatalogError::FeatureWithoutId { collection_id: _ }
            | CatalogError::Config { reason: _ }
            | CatalogError::Io(_)
            | CatalogError::YamlParse(_)
            | CatalogError::UrlParse(_)
            | CatalogError::Serialization(_) => Self::internal_server_error(&error),
        };

        // Log server errors.
        if response.status.is_server_error() {
            event!(Level::ERROR, "{}", error.to_string());
            let mut current = error.source();
            while let Some(source) = current {
                event!(Level::ERROR, "Caused by: {}", source.to_string());
                current = source.source();
            }
        }

        response
    }
}

impl IntoResponse for ErrorResponse {
    /// Convert from an `ErrorResponse` into an `axum::response::Response`.
    ///
    /// Renders the response as JSON.
    fn into_response(self) -> Response {
        let json_body = serde_json::to_string_pretty(&self);
        match json_body {
            Err(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to serialise error response: {}", err),
            )
                .into_response(),
            Ok(json_body) => (
                self.status,
                [(&header::CONTENT_TYPE, mime::APPLICATION_JSON.to_string())],
                json_body,
            )
                .into_response(),
        }
    }
}

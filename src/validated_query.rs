//! Axum extractor that deserialises and validates query parameters

use crate::error::CatalogError;

use async_trait::async_trait;
use axum::extract::{FromRequestParts, Query};
use axum::http::request::Parts;
use serde::de::DeserializeOwned;
use validator::Validate;

/// An axum extractor based on the Query extractor that also performs
/// validation using the validator crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedQuery<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for ValidatedQuery<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = CatalogError;

    /// Extract a `ValidatedQuery` from request parts.
    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state).await?;
        value.validate()?;
        Ok(ValidatedQuery(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{self, Request, StatusCode},
        response::Response,
        routing::get,
        Router,
    };
    use regex::Regex;
    use serde::Deserialize;
    use tower::ServiceExt; // for `oneshot` and `ready`

    #[derive(Deserialize, Validate)]
    struct TestParams {
        #[validate(range(min = 1, max = 3))]
        pub foo: Option<u32>,
        pub bar: Option<String>,
    }

    // Handler function that accepts a ValidatedQuery extractor.
    async fn test_handler(ValidatedQuery(params): ValidatedQuery<TestParams>) -> String {
        format!("foo: {:?} bar: {:?}", params.foo, params.bar)
    }

    // Build a router and make a oneshot request.
    async fn request(uri: &str) -> Response {
        Router::new()
            .route("/", get(test_handler))
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

    // Jump through the hoops to get the body as a string.
    async fn body_string(response: Response) -> String {
        String::from_utf8(
            hyper::body::to_bytes(response.into_body())
                .await
                .unwrap()
                .to_vec(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn ok() {
        let response = request("/?foo=2&bar=abc").await;

        assert_eq!(response.status(), StatusCode::OK);

        let body = body_string(response).await;
        assert_eq!(&body[..], "foo: Some(2) bar: Some(\"abc\")");
    }

    #[tokio::test]
    async fn ok_without_params() {
        let response = request("/").await;

        assert_eq!(response.status(), StatusCode::OK);

        let body = body_string(response).await;
        assert_eq!(&body[..], "foo: None bar: None");
    }

    #[tokio::test]
    async fn invalid_foo_type() {
        let response = request("/?foo=abc").await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_string(response).await;
        let re = Regex::new(r".*query parameters are not valid.*").unwrap();
        assert!(re.is_match(&body[..]), "body: {body}")
    }

    #[tokio::test]
    async fn invalid_foo_out_of_range() {
        let response = request("/?foo=4").await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_string(response).await;
        let re = Regex::new(r".*query parameters are not valid.*").unwrap();
        assert!(re.is_match(&body[..]), "body: {body}");
        let re = Regex::new(r".*foo: Validation error: range.*").unwrap();
        assert!(re.is_match(&body[..]), "body: {body}");
    }
}

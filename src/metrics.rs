//! Prometheus metrics for the catalog API.

use axum::{body::Body, http::Request, response::Response};
use lazy_static::lazy_static;
use prometheus::{self, Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry};
use tracing::Span;

lazy_static! {
    // Registry for holding metric state
    pub static ref REGISTRY: Registry = Registry::new();
    // Simple request counter
    pub static ref CATALOG_REQUESTS: IntCounterVec = IntCounterVec::new(
        Opts::new("catalog_requests", "The number of HTTP requests received"),
        &["http_method"]
    ).unwrap();
    // Request counter by status code
    pub static ref CATALOG_RESPONSES: IntCounterVec = IntCounterVec::new(
        Opts::new("catalog_responses", "The number of responses sent."),
        &["status_code"]
    ).unwrap();
    // Request histogram by response time
    pub static ref CATALOG_RESPONSE_TIME: HistogramVec = HistogramVec::new(
        HistogramOpts{
            common_opts: Opts::new("catalog_response_time", "The time taken to respond to each request"),
            buckets: prometheus::DEFAULT_BUCKETS.to_vec(),
        },
        &[],
    ).unwrap();
}

/// Register all metrics with the registry. Must be called once at startup.
pub fn register_metrics() {
    REGISTRY
        .register(Box::new(CATALOG_REQUESTS.clone()))
        .unwrap();
    REGISTRY
        .register(Box::new(CATALOG_RESPONSES.clone()))
        .unwrap();
    REGISTRY
        .register(Box::new(CATALOG_RESPONSE_TIME.clone()))
        .unwrap();
}

/// Render all registered metrics in the Prometheus text format.
pub async fn metrics_handler() -> String {
    let encoder = prometheus::TextEncoder::new();
    let mut buffer = Vec::new();

    encoder.encode(&REGISTRY.gather(), &mut buffer).unwrap();

    let output = String::from_utf8(buffer.clone()).unwrap();
    buffer.clear();

    output
}

/// Increments the request counter on all incoming requests, labelled by http method
pub fn request_counter(request: &Request<Body>, _span: &Span) {
    CATALOG_REQUESTS
        .with_label_values(&[&request.method().to_string().to_ascii_uppercase()])
        .inc();
}

/// Increment the response counter on all outgoing responses, labelled by status code
pub fn record_response_metrics<B>(
    response: &Response<B>,
    latency: std::time::Duration,
    _span: &Span,
) {
    CATALOG_RESPONSES
        .with_label_values(&[response.status().as_str()])
        .inc();

    CATALOG_RESPONSE_TIME
        .with_label_values(&[])
        .observe(latency.as_secs_f64());
}

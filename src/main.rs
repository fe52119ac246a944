//! This file defines the geodb-openeo binary entry point.

use std::process::exit;
use std::sync::Arc;

use geodb_openeo::app;
use geodb_openeo::app_state::AppState;
use geodb_openeo::cli;
use geodb_openeo::config;
use geodb_openeo::metrics;
use geodb_openeo::server;
use geodb_openeo::tracing;

/// Application entry point
#[tokio::main]
async fn main() {
    let args = cli::parse();
    tracing::init_tracing();
    metrics::register_metrics();
    let config = config::load_config(&args.config).unwrap_or_else(|error| {
        eprintln!("failed to load configuration from '{}': {}", args.config, error);
        exit(1)
    });
    let state = AppState::new(&args, config).unwrap_or_else(|error| {
        eprintln!("failed to initialise the datastore: {}", error);
        exit(1)
    });
    let service = app::service(Arc::new(state));
    server::serve(&args, service).await;
}

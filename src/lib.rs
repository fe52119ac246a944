//! This crate provides an openEO-compatible STAC catalog server for geoDB, a
//! PostgREST-backed vector database. It exposes geoDB collections and their
//! features (geospatial vector data) as STAC collections and items over HTTP,
//! including paged listings with navigation links and bounding-box filtering.
//!
//! The original Python implementation is part of the
//! [xcube geoDB](https://github.com/dcs4cop/xcube-geodb) ecosystem.
//!
//! The server is built on top of a number of open source components.
//!
//! * [Tokio](tokio), the most popular asynchronous Rust runtime.
//! * [Axum](axum) web framework, built by the Tokio team on top of various
//!   popular components, including the [hyper] HTTP library.
//! * [Serde](serde) performs (de)serialisation of JSON request and response
//!   data.
//! * [reqwest] is used to talk to the geoDB PostgREST API.
//! * [geojson] and [geo] provide the GeoJSON data model and geometry
//!   algorithms used for feature payloads and bounding boxes.

pub mod app;
pub mod app_state;
pub mod capabilities;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod datastore;
pub mod error;
pub mod geodb;
pub mod metrics;
pub mod models;
pub mod processes;
pub mod server;
#[cfg(test)]
pub mod test_utils;
pub mod tracing;
pub mod validated_query;
pub mod vector_cube;

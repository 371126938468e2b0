//! Drive and charge session summaries built from ordered vehicle telemetry.
//!
//! `domain` holds the snapshot and summary types and the truncation
//! primitive, `application` the aggregators and the service that feeds them,
//! `infrastructure` the InfluxDB, configuration and HTTP encoding adapters,
//! and `presentation` the axum handlers.
pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod presentation;

//! Bulk destinations
//!
//! This module provides a trait-based abstraction over the bulk write
//! endpoint, so the submitter never knows where batches land:
//!
//! - **Elasticsearch sink**: NDJSON `POST {url}/_bulk` over a blocking HTTP client
//! - **Dry-run sink**: accepts everything, for checking files against mappings
//!
//! # Example Configuration
//!
//! ```toml
//! [destination]
//! url = "http://localhost:9200"
//! timeout_secs = 120
//! username = "loader"
//! # password from BULKLOAD_PASSWORD env var
//! ```

mod dry_run;
mod factory;
mod http;
mod traits;

pub use dry_run::DryRunSink;
pub use factory::create_sink;
pub use http::{parse_bulk_response, render_bulk_body, ElasticsearchSink, PASSWORD_ENV};
pub use traits::{BulkResponse, BulkSink, ItemFailure, SinkError, SinkResult};

//! Sink factory for creating the bulk destination from configuration

use super::dry_run::DryRunSink;
use super::http::ElasticsearchSink;
use super::traits::{BulkSink, SinkResult};
use crate::config::DestinationConfig;
use tracing::info;

/// Create the bulk sink for a run
///
/// A dry run never opens a connection.
pub fn create_sink(config: &DestinationConfig, dry_run: bool) -> SinkResult<Box<dyn BulkSink>> {
    if dry_run {
        info!("Dry run: actions are built and batched but not sent");
        return Ok(Box::new(DryRunSink::new()));
    }

    info!("Creating bulk sink: url={}", config.url);
    Ok(Box::new(ElasticsearchSink::new(config)?))
}

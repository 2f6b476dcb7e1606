//! Sink that accepts everything without contacting a destination

use super::traits::{BulkResponse, BulkSink, SinkResult};
use crate::load::Action;
use tracing::debug;

/// Accepts every batch; used to check data files against their mappings
#[derive(Debug, Default)]
pub struct DryRunSink {
    requests: usize,
    actions: usize,
}

impl DryRunSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bulk requests seen so far
    pub fn requests(&self) -> usize {
        self.requests
    }

    /// Actions seen so far
    pub fn actions(&self) -> usize {
        self.actions
    }
}

impl BulkSink for DryRunSink {
    fn submit(&mut self, actions: &[Action]) -> SinkResult<BulkResponse> {
        self.requests += 1;
        self.actions += actions.len();
        debug!("Dry run: accepting {} actions", actions.len());
        Ok(BulkResponse::Success)
    }

    fn name(&self) -> &str {
        "dry-run"
    }
}

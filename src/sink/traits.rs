//! Bulk sink trait definitions
//!
//! Defines the destination side of the pipeline: one call sends one batch.

use crate::load::Action;
use std::fmt::Debug;

/// Errors that end a bulk request without a per-item answer
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    /// Connection, timeout, or other transport failure
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The bulk call itself was refused
    #[error("Bulk request rejected ({status}): {body}")]
    Status { status: u16, body: String },

    /// The response could not be understood
    #[error("Invalid bulk response: {0}")]
    InvalidResponse(String),

    /// Request body could not be serialized
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type for sink operations
pub type SinkResult<T> = Result<T, SinkError>;

/// One action the destination refused
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemFailure {
    /// Identity of the refused action
    pub id: String,
    /// Per-item status code
    pub status: u16,
    /// Error detail as reported by the destination
    pub reason: String,
}

/// Answer to a bulk request that reached the destination
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BulkResponse {
    /// Every action was accepted
    Success,
    /// Some actions were refused
    PartialFailure(Vec<ItemFailure>),
}

/// Destination for bulk write requests
///
/// Transport-level problems are returned as `Err`; item-level rejections
/// are returned as `Ok(BulkResponse::PartialFailure(..))`.
pub trait BulkSink: Debug {
    /// Send one batch as a single bulk request
    fn submit(&mut self, actions: &[Action]) -> SinkResult<BulkResponse>;

    /// Get the sink name (e.g., "elasticsearch", "dry-run")
    fn name(&self) -> &str;
}

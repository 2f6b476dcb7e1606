//! Core types shared by the load pipeline

use crate::sink::SinkError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Outcome of one batch once the submitter is done with it
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchOutcome {
    /// Actions accepted by the destination
    pub indexed: usize,
    /// Actions rejected and removed (pruned or dropped)
    pub rejected: usize,
    /// Bulk requests sent for this batch
    pub submissions: usize,
    /// A single remaining action was rejected and dropped
    pub dropped_single: bool,
}

/// Totals for one finished job
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobReport {
    /// Job name
    pub job: String,
    /// Target index
    pub index: String,
    /// Lines read from the data file (including skipped ones)
    pub lines_read: usize,
    /// Actions built from records
    pub actions: usize,
    /// Batches handed to the submitter
    pub batches: usize,
    /// Bulk requests sent
    pub submissions: usize,
    /// Actions accepted by the destination
    pub indexed: usize,
    /// Actions rejected by the destination
    pub rejected: usize,
    /// Batches that ended with a single dropped action
    pub single_drops: usize,
    /// Per-job log file, when one was written
    pub log_file: Option<PathBuf>,
    /// Processing time in seconds
    pub elapsed_seconds: f64,
}

impl JobReport {
    pub fn new(job: impl Into<String>, index: impl Into<String>) -> Self {
        Self {
            job: job.into(),
            index: index.into(),
            ..Default::default()
        }
    }

    /// Fold a batch outcome into the totals
    pub fn record_batch(&mut self, outcome: &BatchOutcome) {
        self.batches += 1;
        self.submissions += outcome.submissions;
        self.indexed += outcome.indexed;
        self.rejected += outcome.rejected;
        if outcome.dropped_single {
            self.single_drops += 1;
        }
    }

    /// Actions per second over the whole job
    pub fn rate(&self) -> f64 {
        if self.elapsed_seconds > 0.0 {
            self.actions as f64 / self.elapsed_seconds
        } else {
            0.0
        }
    }
}

/// Errors that abort a job
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid mapping {}: {reason}", path.display())]
    Mapping { path: PathBuf, reason: String },

    #[error("Line {line}: expected {expected} fields, found {found}")]
    SchemaMismatch {
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("Bulk request failed: {0}")]
    Sink(#[from] SinkError),

    #[error("Destination reported {reported} failures, none matching the {pending} pending actions")]
    UnmatchedFailures { pending: usize, reported: usize },
}

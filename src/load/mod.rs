//! Bulk loading of delimited text files
//!
//! Each job maps the columns of one data file onto the fields of a JSON
//! mapping, builds one `index` action per line, and sends the actions in
//! fixed-size batches. Actions a batch rejects are removed by identity and
//! the rest is sent again.
//!
//! # Example Usage
//!
//! ```no_run
//! use bulkload::config::{Config, JobSpec};
//! use bulkload::load::RunCoordinator;
//! use bulkload::sink::ElasticsearchSink;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut config = Config::default();
//! config.jobs.push(JobSpec::new("contracts", "contracts.txt", "map-contracts.json"));
//!
//! let mut sink = ElasticsearchSink::new(&config.destination)?;
//! let summary = RunCoordinator::new(&config, &mut sink).run_all(&config.jobs);
//! println!("Indexed {} documents", summary.total_indexed());
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! ```text
//! RunCoordinator ── per line ──▶ ActionBuilder ──▶ BatchAccumulator
//!        ▲                                              │ full batch
//!        │                                              ▼
//!        └──────── Pacer ◀── success ── BulkSubmitter ◀─┘
//!                                          │  ▲
//!                           partial failure│  │ pruned remainder
//!                                          └──┘
//! ```

pub mod action;
pub mod batch;
pub mod coordinator;
pub mod pacing;
pub mod schema;
pub mod submitter;
pub mod types;

// Re-export main types
pub use action::{is_date_field, Action, ActionBuilder, Batch};
pub use batch::BatchAccumulator;
pub use coordinator::{stream_records, JobFailure, JobState, RunCoordinator, RunSummary};
pub use pacing::Pacer;
pub use schema::Schema;
pub use submitter::{prune, BulkSubmitter};
pub use types::{BatchOutcome, JobReport, LoadError};

//! bulkload: stream delimited text files into a document store
//!
//! Loads large delimited files through a bulk write endpoint, featuring:
//! - Positional mapping of columns onto the keys of a JSON mapping file
//! - Fixed-size batches sent as single `_bulk` requests
//! - Recovery from partial batch rejection by pruning refused actions
//! - Optional pacing between requests for very large files
//! - One log file per job run

pub mod config;
pub mod load;
pub mod logging;
pub mod sink;

pub use config::Config;

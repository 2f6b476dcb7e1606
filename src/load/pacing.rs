//! Fixed pause between bulk requests
//!
//! Bulk endpoints can stall under sustained ingestion of millions of documents
//! even with a generous client timeout. Paced jobs sleep for a fixed delay
//! after every successful request.

use std::time::Duration;
use tracing::trace;

/// Sleeps after successful submissions when pacing is enabled
#[derive(Debug, Clone)]
pub struct Pacer {
    delay: Duration,
    enabled: bool,
    pauses: u64,
}

impl Pacer {
    pub fn new(delay: Duration, enabled: bool) -> Self {
        Self {
            delay,
            enabled,
            pauses: 0,
        }
    }

    /// A pacer that never sleeps
    pub fn disabled() -> Self {
        Self::new(Duration::ZERO, false)
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Number of pauses taken so far
    pub fn pauses(&self) -> u64 {
        self.pauses
    }

    /// Block the current thread for the configured delay, if enabled
    pub fn pace(&mut self) {
        if !self.enabled {
            return;
        }
        trace!("Pausing {:?} before next bulk request", self.delay);
        std::thread::sleep(self.delay);
        self.pauses += 1;
    }
}

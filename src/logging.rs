//! Per-job log files
//!
//! Every job run writes its own log file, named after the target index and
//! the start time, and optionally mirrors it to stderr. The subscriber is
//! scoped to the job instead of being installed globally.

use crate::config::{LogFormat, LoggingConfig};
use crate::load::LoadError;
use chrono::{DateTime, Local};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::Dispatch;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{fmt, Layer, Registry};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Logging scope of one job run
pub struct JobLog {
    path: PathBuf,
    dispatch: Dispatch,
}

impl JobLog {
    /// Create the log file for `index` under `log_dir` and build its subscriber
    pub fn create(
        config: &LoggingConfig,
        verbose: u8,
        log_dir: &Path,
        index: &str,
    ) -> Result<Self, LoadError> {
        std::fs::create_dir_all(log_dir).map_err(|source| LoadError::Open {
            path: log_dir.to_path_buf(),
            source,
        })?;

        let path = log_dir.join(log_file_name(index, Local::now()));
        let file = File::create(&path).map_err(|source| LoadError::Open {
            path: path.clone(),
            source,
        })?;

        let level = config.level.with_verbosity(verbose);
        let mut layers: Vec<BoxedLayer> = vec![file_layer(&config.format, file, level)];
        if config.console {
            layers.push(console_layer(&config.format, level));
        }

        let subscriber = Registry::default().with(layers);
        Ok(Self {
            path,
            dispatch: Dispatch::new(subscriber),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Run `f` with this job's subscriber as the default
    pub fn scope<T>(&self, f: impl FnOnce() -> T) -> T {
        tracing::dispatcher::with_default(&self.dispatch, f)
    }
}

/// `{index}.{YYYYmmddHHMMSS}.bulkload.log`
pub fn log_file_name(index: &str, started: DateTime<Local>) -> String {
    format!("{}.{}.bulkload.log", index, started.format("%Y%m%d%H%M%S"))
}

fn file_layer(format: &LogFormat, file: File, level: LevelFilter) -> BoxedLayer {
    let writer = Mutex::new(file);
    match format {
        LogFormat::Text => fmt::layer()
            .with_ansi(false)
            .with_target(false)
            .with_writer(writer)
            .with_filter(level)
            .boxed(),
        LogFormat::Json => fmt::layer()
            .json()
            .with_writer(writer)
            .with_filter(level)
            .boxed(),
    }
}

fn console_layer(format: &LogFormat, level: LevelFilter) -> BoxedLayer {
    match format {
        LogFormat::Text => fmt::layer()
            .with_target(false)
            .with_writer(std::io::stderr)
            .with_filter(level)
            .boxed(),
        LogFormat::Json => fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_filter(level)
            .boxed(),
    }
}

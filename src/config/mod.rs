//! Configuration for bulkload

mod loader;
mod logging;

pub use loader::{DestinationConfig, JobSpec, LoaderConfig, DEFAULT_DESTINATION_URL};
pub use logging::{LogFormat, LogLevel, LoggingConfig};

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use url::Url;

/// Main configuration for a bulkload run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Batching and parsing configuration
    #[serde(default)]
    pub loader: LoaderConfig,
    /// Bulk destination configuration
    #[serde(default)]
    pub destination: DestinationConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Jobs, run in order
    #[serde(default)]
    pub jobs: Vec<JobSpec>,
}

impl Config {
    /// Load configuration from a TOML file and validate it.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read config file '{}': {}", path.display(), e))?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse config file '{}': {}", path.display(), e))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate all configuration fields.
    ///
    /// Collects every problem so they are reported together.
    pub fn validate(&self) -> Result<()> {
        let mut errors: Vec<String> = Vec::new();

        // Loader validation
        if self.loader.batch_size == 0 {
            errors.push("batch_size must be positive".to_string());
        }
        if matches!(self.loader.delimiter, '\n' | '\r') {
            errors.push("delimiter must not be a line terminator".to_string());
        }
        if self.loader.date_field_marker.is_empty() {
            errors.push("date_field_marker must not be empty".to_string());
        }
        if self.loader.data_dir.as_os_str().is_empty() {
            errors.push("data_dir must not be empty".to_string());
        }
        if self.loader.log_dir.as_os_str().is_empty() {
            errors.push("log_dir must not be empty".to_string());
        }

        // Destination validation
        match Url::parse(&self.destination.url) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            Ok(url) => errors.push(format!(
                "destination url must use http or https, got '{}'",
                url.scheme()
            )),
            Err(e) => errors.push(format!(
                "destination url '{}' is invalid: {}",
                self.destination.url, e
            )),
        }
        if self.destination.timeout_secs == 0 {
            errors.push("timeout_secs must be positive".to_string());
        }
        if self.destination.password.is_some() && self.destination.username.is_none() {
            errors.push("password given without username".to_string());
        }

        // Job validation
        let mut seen = HashSet::new();
        for (i, job) in self.jobs.iter().enumerate() {
            if job.name.is_empty() {
                errors.push(format!("job #{} has an empty name", i + 1));
            } else if !seen.insert(job.name.as_str()) {
                errors.push(format!("job '{}' is defined more than once", job.name));
            }
            if job.data_file.as_os_str().is_empty() {
                errors.push(format!("job '{}' has an empty data_file", job.name));
            }
            if job.mapping_file.as_os_str().is_empty() {
                errors.push(format!("job '{}' has an empty mapping_file", job.name));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            anyhow::bail!(
                "Configuration validation failed:\n  - {}",
                errors.join("\n  - ")
            );
        }
    }

    /// Select jobs by name, keeping configuration order. An empty selection means all jobs.
    pub fn select_jobs(&self, names: &[String]) -> Result<Vec<JobSpec>> {
        if names.is_empty() {
            return Ok(self.jobs.clone());
        }

        if let Some(unknown) = names
            .iter()
            .find(|name| !self.jobs.iter().any(|job| &job.name == *name))
        {
            anyhow::bail!("Unknown job: {}", unknown);
        }

        Ok(self
            .jobs
            .iter()
            .filter(|job| names.contains(&job.name))
            .cloned()
            .collect())
    }
}

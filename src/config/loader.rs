//! Loader, destination, and job configuration

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default Elasticsearch endpoint
pub const DEFAULT_DESTINATION_URL: &str = "http://localhost:9200";

/// Batching and input parsing configuration shared by every job
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Prefix prepended to each job name to form the target index
    pub index_prefix: String,
    /// Document kind tag sent as `_type` (omitted when empty)
    pub doc_type: String,
    /// Maximum number of actions per bulk request
    pub batch_size: usize,
    /// Directory holding the data files
    pub data_dir: PathBuf,
    /// Directory holding the mapping files (None = relative to the working directory)
    pub mapping_dir: Option<PathBuf>,
    /// Directory receiving one log file per job run
    pub log_dir: PathBuf,
    /// Pause after each successful bulk request of a paced job (milliseconds)
    pub pacing_delay_ms: u64,
    /// Field delimiter
    pub delimiter: char,
    /// Fields whose name contains this marker (not at the start) store empty values as null
    pub date_field_marker: String,
    /// Skip the first line of every data file
    pub skip_header: bool,
    /// Keep running the remaining jobs after one aborts
    pub continue_on_error: bool,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            index_prefix: "test-".to_string(),
            doc_type: "default".to_string(),
            batch_size: 10_000,
            data_dir: PathBuf::from("data"),
            mapping_dir: None,
            log_dir: PathBuf::from("data/log"),
            pacing_delay_ms: 1000,
            delimiter: ',',
            date_field_marker: "_date".to_string(),
            skip_header: false,
            continue_on_error: false,
        }
    }
}

impl LoaderConfig {
    /// Target index for a job
    pub fn index_name(&self, job: &JobSpec) -> String {
        format!("{}{}", self.index_prefix, job.name)
    }

    /// Resolve the data file of a job against `data_dir`
    pub fn data_path(&self, job: &JobSpec) -> PathBuf {
        self.data_dir.join(&job.data_file)
    }

    /// Resolve the mapping file of a job against `mapping_dir`
    pub fn mapping_path(&self, job: &JobSpec) -> PathBuf {
        match &self.mapping_dir {
            Some(dir) => dir.join(&job.mapping_file),
            None => job.mapping_file.clone(),
        }
    }

    pub fn pacing_delay(&self) -> Duration {
        Duration::from_millis(self.pacing_delay_ms)
    }
}

/// Connection settings for the bulk destination
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DestinationConfig {
    /// Base URL of the cluster; `_bulk` is appended
    pub url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Basic auth user
    pub username: Option<String>,
    /// Basic auth password (falls back to BULKLOAD_PASSWORD)
    pub password: Option<String>,
}

impl Default for DestinationConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_DESTINATION_URL.to_string(),
            timeout_secs: 120,
            username: None,
            password: None,
        }
    }
}

/// One named ingestion job
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobSpec {
    /// Job name, appended to the index prefix
    pub name: String,
    /// Data file, relative to `data_dir`
    pub data_file: PathBuf,
    /// JSON mapping file whose key order defines the columns
    pub mapping_file: PathBuf,
    /// Pause after every successful bulk request
    #[serde(default)]
    pub pacing: bool,
}

impl JobSpec {
    pub fn new(
        name: impl Into<String>,
        data_file: impl AsRef<Path>,
        mapping_file: impl AsRef<Path>,
    ) -> Self {
        Self {
            name: name.into(),
            data_file: data_file.as_ref().to_path_buf(),
            mapping_file: mapping_file.as_ref().to_path_buf(),
            pacing: false,
        }
    }

    /// Enable pacing for this job
    pub fn with_pacing(mut self, pacing: bool) -> Self {
        self.pacing = pacing;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loader_defaults() {
        let loader = LoaderConfig::default();
        assert_eq!(loader.batch_size, 10_000);
        assert_eq!(loader.delimiter, ',');
        assert_eq!(loader.pacing_delay(), Duration::from_secs(1));
        assert!(!loader.skip_header);
        assert!(!loader.continue_on_error);
    }

    #[test]
    fn test_job_paths_resolve_against_dirs() {
        let mut loader = LoaderConfig::default();
        loader.data_dir = PathBuf::from("/srv/data");
        let job = JobSpec::new("contracts", "contracts.txt", "map-contracts.json");

        assert_eq!(loader.index_name(&job), "test-contracts");
        assert_eq!(loader.data_path(&job), PathBuf::from("/srv/data/contracts.txt"));
        assert_eq!(loader.mapping_path(&job), PathBuf::from("map-contracts.json"));

        loader.mapping_dir = Some(PathBuf::from("/srv/maps"));
        assert_eq!(
            loader.mapping_path(&job),
            PathBuf::from("/srv/maps/map-contracts.json")
        );
    }

    #[test]
    fn test_job_pacing_defaults_off() {
        let job: JobSpec = toml::from_str(
            r#"
            name = "taxes"
            data_file = "taxes.txt"
            mapping_file = "map-taxes.json"
            "#,
        )
        .unwrap();
        assert!(!job.pacing);
        assert!(job.clone().with_pacing(true).pacing);
    }
}

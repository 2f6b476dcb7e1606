//! Run coordinator that drives ingestion jobs end to end

use super::action::ActionBuilder;
use super::batch::BatchAccumulator;
use super::pacing::Pacer;
use super::schema::Schema;
use super::submitter::BulkSubmitter;
use super::types::{JobReport, LoadError};
use crate::config::{Config, JobSpec};
use crate::logging::JobLog;
use crate::sink::BulkSink;
use serde::Serialize;
use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Lifecycle of one job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum JobState {
    Init,
    Streaming,
    Flush,
    Done,
    Aborted,
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Init => "init",
            Self::Streaming => "streaming",
            Self::Flush => "flush",
            Self::Done => "done",
            Self::Aborted => "aborted",
        };
        f.write_str(name)
    }
}

/// A job that aborted
#[derive(Debug)]
pub struct JobFailure {
    pub job: String,
    /// State the job was in when it aborted
    pub state: JobState,
    pub error: LoadError,
}

/// Result of running a list of jobs
#[derive(Debug, Default)]
pub struct RunSummary {
    /// Jobs that reached `Done`
    pub completed: Vec<JobReport>,
    /// Jobs that aborted
    pub failed: Vec<JobFailure>,
    /// Jobs never started because an earlier job aborted
    pub skipped: Vec<String>,
}

impl RunSummary {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty() && self.skipped.is_empty()
    }

    /// Actions indexed across all completed jobs
    pub fn total_indexed(&self) -> usize {
        self.completed.iter().map(|r| r.indexed).sum()
    }
}

/// Drives jobs through schema loading, streaming, batching and submission
pub struct RunCoordinator<'a> {
    config: &'a Config,
    sink: &'a mut dyn BulkSink,
    continue_on_error: bool,
    job_logs: bool,
    verbose: u8,
}

impl<'a> RunCoordinator<'a> {
    pub fn new(config: &'a Config, sink: &'a mut dyn BulkSink) -> Self {
        Self {
            config,
            sink,
            continue_on_error: config.loader.continue_on_error,
            job_logs: true,
            verbose: 0,
        }
    }

    /// Keep running the remaining jobs after one aborts
    pub fn with_continue_on_error(mut self, continue_on_error: bool) -> Self {
        self.continue_on_error = continue_on_error;
        self
    }

    /// Write a log file per job (on by default)
    pub fn with_job_logs(mut self, job_logs: bool) -> Self {
        self.job_logs = job_logs;
        self
    }

    /// Extra verbosity from the command line
    pub fn with_verbosity(mut self, verbose: u8) -> Self {
        self.verbose = verbose;
        self
    }

    /// Run jobs in order.
    ///
    /// An aborted job stops the run unless `continue_on_error` is set; the
    /// jobs that were not started are reported as skipped.
    pub fn run_all(&mut self, jobs: &[JobSpec]) -> RunSummary {
        let mut summary = RunSummary::default();

        for (i, job) in jobs.iter().enumerate() {
            match self.run_job(job) {
                Ok(report) => summary.completed.push(report),
                Err(failure) => {
                    error!(
                        "Job '{}' aborted during {}: {}",
                        job.name, failure.state, failure.error
                    );
                    summary.failed.push(failure);
                    if !self.continue_on_error {
                        summary.skipped =
                            jobs[i + 1..].iter().map(|j| j.name.clone()).collect();
                        if !summary.skipped.is_empty() {
                            warn!("Skipping {} remaining jobs", summary.skipped.len());
                        }
                        break;
                    }
                }
            }
        }

        summary
    }

    /// Run one job, inside its own log scope when job logs are enabled
    pub fn run_job(&mut self, job: &JobSpec) -> Result<JobReport, JobFailure> {
        let index = self.config.loader.index_name(job);

        if !self.job_logs {
            return self.execute(job, &index);
        }

        let log = JobLog::create(
            &self.config.logging,
            self.verbose,
            &self.config.loader.log_dir,
            &index,
        )
        .map_err(|error| JobFailure {
            job: job.name.clone(),
            state: JobState::Init,
            error,
        })?;

        let result = log.scope(|| self.execute(job, &index));
        result.map(|mut report| {
            report.log_file = Some(log.path().to_path_buf());
            report
        })
    }

    fn execute(&mut self, job: &JobSpec, index: &str) -> Result<JobReport, JobFailure> {
        let started = Instant::now();
        let mut state = JobState::Init;

        match self.load(job, index, &mut state) {
            Ok(mut report) => {
                report.elapsed_seconds = started.elapsed().as_secs_f64();
                info!(
                    "Finished {}: {} indexed, {} rejected, {} requests in {:.1}s",
                    index,
                    report.indexed,
                    report.rejected,
                    report.submissions,
                    report.elapsed_seconds
                );
                Ok(report)
            }
            Err(error) => {
                debug!("Job {}: {} -> {}", job.name, state, JobState::Aborted);
                error!("Import of {} aborted: {}", index, error);
                Err(JobFailure {
                    job: job.name.clone(),
                    state,
                    error,
                })
            }
        }
    }

    fn load(
        &mut self,
        job: &JobSpec,
        index: &str,
        state: &mut JobState,
    ) -> Result<JobReport, LoadError> {
        let config: &'a Config = self.config;
        let loader = &config.loader;

        let data_path = loader.data_path(job);
        info!("Import index {} from {}", index, data_path.display());

        let schema = Schema::load(&loader.mapping_path(job))?;
        debug!("Schema for {}: {} fields", index, schema.len());

        let file = File::open(&data_path).map_err(|source| LoadError::Open {
            path: data_path.clone(),
            source,
        })?;

        let builder = ActionBuilder::new(
            schema,
            index,
            loader.doc_type.clone(),
            loader.delimiter,
            &loader.date_field_marker,
        );
        let pacer = Pacer::new(loader.pacing_delay(), job.pacing);
        if pacer.is_enabled() {
            info!("Pacing {} with {:?} between requests", index, loader.pacing_delay());
        }
        let mut submitter = BulkSubmitter::new(&mut *self.sink, pacer);

        let mut report = JobReport::new(&job.name, index);
        stream_records(
            BufReader::new(file),
            &builder,
            loader.batch_size,
            loader.skip_header,
            &mut submitter,
            &mut report,
            state,
        )?;
        Ok(report)
    }
}

/// Stream records from `reader` through building, batching and submission.
///
/// Blank lines are not records. `state` tracks the job lifecycle so callers
/// know where an error happened.
pub fn stream_records<R: BufRead>(
    reader: R,
    builder: &ActionBuilder,
    batch_size: usize,
    skip_header: bool,
    submitter: &mut BulkSubmitter<'_>,
    report: &mut JobReport,
    state: &mut JobState,
) -> Result<(), LoadError> {
    transition(state, JobState::Streaming);

    let mut accumulator = BatchAccumulator::new(batch_size);
    let mut next_id: u64 = 0;

    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        let line_number = i + 1;
        report.lines_read += 1;

        if skip_header && line_number == 1 {
            debug!("Skipping header: {}", line);
            continue;
        }
        if line.trim().is_empty() {
            continue;
        }

        let action = builder.build(&line, line_number, &mut next_id)?;
        report.actions += 1;

        if let Some(batch) = accumulator.push(action) {
            let outcome = submitter.submit(batch)?;
            report.record_batch(&outcome);
        }
    }

    transition(state, JobState::Flush);
    if let Some(batch) = accumulator.finish() {
        let outcome = submitter.submit(batch)?;
        report.record_batch(&outcome);
    }

    transition(state, JobState::Done);
    Ok(())
}

fn transition(state: &mut JobState, next: JobState) {
    debug!("Job state {} -> {}", state, next);
    *state = next;
}

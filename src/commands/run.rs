use anyhow::{Context, Result};
use bulkload::{config::Config, load::RunCoordinator, sink::create_sink};
use tracing::info;

pub fn run_jobs(
    config: Config,
    jobs: Vec<String>,
    keep_going: bool,
    dry_run: bool,
    verbose: u8,
) -> Result<()> {
    let jobs = config.select_jobs(&jobs)?;
    if jobs.is_empty() {
        anyhow::bail!("No jobs configured");
    }

    let mut sink =
        create_sink(&config.destination, dry_run).context("Failed to create bulk sink")?;
    info!("Running {} jobs against {}", jobs.len(), sink.name());

    let summary = RunCoordinator::new(&config, sink.as_mut())
        .with_continue_on_error(keep_going || config.loader.continue_on_error)
        .with_verbosity(verbose)
        .run_all(&jobs);

    println!("\nBulk Load Summary");
    println!("=================");
    for report in &summary.completed {
        println!(
            "{:<24} {:>10} indexed {:>8} rejected {:>6} requests {:>8.1}s ({:.0}/s)",
            report.index,
            report.indexed,
            report.rejected,
            report.submissions,
            report.elapsed_seconds,
            report.rate()
        );
        if let Some(log_file) = &report.log_file {
            println!("{:<24} log: {}", "", log_file.display());
        }
    }
    for failure in &summary.failed {
        println!("{:<24} ABORTED ({}): {}", failure.job, failure.state, failure.error);
    }
    for name in &summary.skipped {
        println!("{:<24} skipped", name);
    }
    println!("\nTotal indexed: {}", summary.total_indexed());

    if !summary.is_success() {
        anyhow::bail!(
            "{} of {} jobs aborted, {} skipped",
            summary.failed.len(),
            jobs.len(),
            summary.skipped.len()
        );
    }

    Ok(())
}

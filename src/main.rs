//! bulkload: stream delimited text files into a document store

mod commands;

use anyhow::Result;
use bulkload::config::Config;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "bulkload")]
#[command(about = "Stream delimited text files into a bulk write endpoint")]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "bulkload.toml")]
    config: PathBuf,

    /// Data directory
    #[arg(short, long)]
    data_dir: Option<PathBuf>,

    /// Log directory
    #[arg(short, long)]
    log_dir: Option<PathBuf>,

    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the configured jobs in order
    Run {
        /// Only run these jobs (repeatable)
        #[arg(short, long)]
        job: Vec<String>,

        /// Continue with the next job when one aborts
        #[arg(long)]
        keep_going: bool,

        /// Build and batch actions without contacting the destination
        #[arg(long)]
        dry_run: bool,
    },

    /// Check mapping and data files without loading anything
    Check {
        /// Only check these jobs (repeatable)
        #[arg(short, long)]
        job: Vec<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if !cli.config.exists() {
        anyhow::bail!("Config file not found: {}", cli.config.display());
    }
    let mut config = Config::load(&cli.config)?;

    // Setup logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.logging.level.with_verbosity(cli.verbose))
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    if let Some(data_dir) = cli.data_dir {
        config.loader.data_dir = data_dir;
    }
    if let Some(log_dir) = cli.log_dir {
        config.loader.log_dir = log_dir;
    }

    match cli.command {
        Commands::Run {
            job,
            keep_going,
            dry_run,
        } => commands::run_jobs(config, job, keep_going, dry_run, cli.verbose),
        Commands::Check { job } => commands::check_jobs(config, job),
    }
}

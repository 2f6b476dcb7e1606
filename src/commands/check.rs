use anyhow::Result;
use bulkload::{config::Config, load::Schema};

/// Validate mapping and data files of the selected jobs without sending anything
pub fn check_jobs(config: Config, jobs: Vec<String>) -> Result<()> {
    let jobs = config.select_jobs(&jobs)?;
    let mut problems = 0;

    println!("\nJob Check");
    println!("=========");
    for job in &jobs {
        let index = config.loader.index_name(job);
        let data_path = config.loader.data_path(job);

        match Schema::load(&config.loader.mapping_path(job)) {
            Ok(schema) => println!("{:<24} mapping ok ({} fields)", index, schema.len()),
            Err(e) => {
                problems += 1;
                println!("{:<24} mapping error: {}", index, e);
            }
        }

        if data_path.is_file() {
            println!("{:<24} data file {}", "", data_path.display());
        } else {
            problems += 1;
            println!("{:<24} data file missing: {}", "", data_path.display());
        }
    }

    if problems > 0 {
        anyhow::bail!("{} problems found", problems);
    }

    println!("\nAll {} jobs ready", jobs.len());
    Ok(())
}

mod check;
mod run;

pub use check::check_jobs;
pub use run::run_jobs;

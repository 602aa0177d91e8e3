use crate::error::CliError;
use serde::Serialize;
use std::time::Duration;
use tracing::info;

/// Run parameters echoed at startup.
pub struct StartParams<'a> {
    pub source: &'a str,
    pub progress_file: &'a str,
    pub url: &'a str,
    pub user: &'a str,
    pub password: &'a str,
    pub request_timeout: Duration,
    pub settle_delay: Duration,
    pub threads: usize,
}

/// Progress of a source file against its progress file.
#[derive(Debug, Serialize)]
pub struct ProgressReport {
    pub total: usize,
    pub completed: usize,
    pub remaining: usize,
}

/// Logs the version and every run parameter, one per line, with the password
/// masked. Paths are made absolute so the lines identify the files without
/// knowing the working directory.
pub fn log_start_message(params: &StartParams<'_>) -> Result<(), CliError> {
    info!("barrage version: {}", env!("CARGO_PKG_VERSION"));
    info!("parameters");
    info!("----------");
    let source = std::path::absolute(params.source)?;
    info!("source file:     {}", source.display());
    let progress_file = std::path::absolute(params.progress_file)?;
    info!("progress file:   {}", progress_file.display());
    info!("url:             {}", params.url);
    info!("user:            {}", params.user);
    info!("pass:            {}", mask_secret(params.password));
    info!("timeout:         {:?}", params.request_timeout);
    info!("request sleep:   {:?}", params.settle_delay);
    info!("request threads: {}", params.threads);
    Ok(())
}

pub fn print_progress_table(source: &str, report: &ProgressReport) {
    println!("Progress for '{source}':");
    println!("-----------------------------");
    println!("{:<12} {}", "Total", report.total);
    println!("{:<12} {}", "Completed", report.completed);
    println!("{:<12} {}", "Remaining", report.remaining);
}

/// Fixed-width mask so a log line never leaks the password or its length.
fn mask_secret(_secret: &str) -> &'static str {
    "********"
}

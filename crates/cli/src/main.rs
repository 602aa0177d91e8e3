use crate::error::CliError;
use clap::Parser;
use commands::Commands;
use connectors::rest::{RestConfig, RestEngine};
use engine_core::source;
use engine_runtime::execution::engine::{self, RunOptions};
use std::{
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};
use tracing::Level;

mod commands;
mod error;
mod output;

#[derive(Parser)]
#[command(name = "barrage", version = "0.1.0", about = "Parallel SQL batch execution tool")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    // Initialize logger
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            source,
            progress_file,
            url,
            user,
            password,
            threads,
            request_timeout_secs,
            sleep_ms,
            insecure,
        } => {
            let request_timeout = Duration::from_secs(request_timeout_secs);
            let settle_delay = Duration::from_millis(sleep_ms);

            output::log_start_message(&output::StartParams {
                source: &source,
                progress_file: &progress_file,
                url: &url,
                user: &user,
                password: &password,
                request_timeout,
                settle_delay,
                threads,
            })?;

            let pending =
                source::load_pending(Path::new(&source), Path::new(&progress_file)).await?;

            let rest = RestEngine::connect(RestConfig {
                base_url: url,
                user,
                password,
                timeout: request_timeout,
                accept_invalid_certs: insecure,
            })
            .await?;

            let result = engine::run(
                Arc::new(rest),
                RunOptions {
                    workers: threads,
                    settle_delay,
                    ledger_path: PathBuf::from(progress_file),
                },
                pending,
            )
            .await?;

            if !result.errors.is_empty() {
                return Err(CliError::StatementsFailed(result.errors.join(", ")));
            }
        }
        Commands::Progress {
            source,
            progress_file,
            json,
        } => {
            show_progress(&source, &progress_file, json).await?;
        }
    }

    Ok(())
}

async fn show_progress(
    source_file: &str,
    progress_file: &str,
    as_json: bool,
) -> Result<(), CliError> {
    let statements = source::read_statements(Path::new(source_file)).await?;
    let completed = source::read_ledger(Path::new(progress_file)).await?;

    let total = statements.len();
    let pending = source::filter_completed(statements, &completed);
    let report = output::ProgressReport {
        total,
        completed: total - pending.len(),
        remaining: pending.len(),
    };

    if as_json {
        let json = serde_json::to_string_pretty(&report).map_err(CliError::JsonSerialize)?;
        println!("{json}");
    } else {
        output::print_progress_table(source_file, &report);
    }

    Ok(())
}

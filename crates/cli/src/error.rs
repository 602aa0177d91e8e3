use connectors::error::ExecutorError;
use engine_core::error::SourceError;
use engine_runtime::error::RunError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Failed to resolve a file path: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parsing error: {0}")]
    Source(#[from] SourceError),

    #[error("Unable to configure engine: {0}")]
    Engine(#[from] ExecutorError),

    #[error("Process failure: {0}")]
    Run(#[from] RunError),

    /// One or more statements failed permanently; the run itself finished.
    #[error("Errors during processing: {0}")]
    StatementsFailed(String),

    #[error("Failed to serialize data to JSON: {0}")]
    JsonSerialize(serde_json::Error),
}

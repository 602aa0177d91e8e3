use engine_core::error::{LedgerError, PartitionError};
use thiserror::Error;

/// Top-level errors for the batch execution engine.
#[derive(Debug, Error)]
pub enum RunError {
    /// The worker count and work set cannot be combined into a valid run.
    #[error("{0}")]
    Partition(#[from] PartitionError),

    /// A completed statement could not be recorded. The run was aborted
    /// because resume state can no longer be trusted.
    #[error(
        "Unable to record completion of statement `{0}` in the progress file {1}: {2}; manually add the statement to the progress file and run the batch again"
    )]
    LedgerFatal(String, String, #[source] LedgerError),

    /// An error occurred while joining a task.
    /// This usually indicates that the task was cancelled or panicked.
    #[error("Task join error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
}

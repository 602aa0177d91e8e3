use crate::error::ExecutorError;
use async_trait::async_trait;

/// Capability to execute one SQL statement against a remote engine.
///
/// Implementations report only success or failure for the statement as a
/// whole; retry and progress policy belong to the caller.
#[async_trait]
pub trait SqlExecutor: Send + Sync {
    async fn execute(&self, statement: &str) -> Result<(), ExecutorError>;
}

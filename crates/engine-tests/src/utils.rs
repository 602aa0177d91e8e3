#![allow(dead_code)]

use async_trait::async_trait;
use connectors::{error::ExecutorError, executor::SqlExecutor};
use engine_runtime::execution::engine::RunOptions;
use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
    time::Duration,
};

/// Executor double that succeeds or fails according to a script and records
/// every statement it receives, in call order.
pub struct ScriptedExecutor {
    // statement -> number of times it still fails before succeeding
    failures: Mutex<HashMap<String, usize>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedExecutor {
    /// Every statement succeeds on the first attempt.
    pub fn reliable() -> Arc<Self> {
        Self::with_failures(&[])
    }

    /// Each `(statement, n)` entry fails the first `n` attempts for that
    /// statement and succeeds afterwards.
    pub fn with_failures(failures: &[(&str, usize)]) -> Arc<Self> {
        Arc::new(ScriptedExecutor {
            failures: Mutex::new(
                failures
                    .iter()
                    .map(|(statement, count)| (statement.to_string(), *count))
                    .collect(),
            ),
            calls: Mutex::new(Vec::new()),
        })
    }

    /// All statements received so far, in the order they arrived.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_for(&self, statement: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|call| call.as_str() == statement)
            .count()
    }

    /// Position of the first call for `statement`, or None if never called.
    pub fn first_call_index(&self, statement: &str) -> Option<usize> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .position(|call| call == statement)
    }
}

#[async_trait]
impl SqlExecutor for ScriptedExecutor {
    async fn execute(&self, statement: &str) -> Result<(), ExecutorError> {
        self.calls.lock().unwrap().push(statement.to_string());
        let mut failures = self.failures.lock().unwrap();
        if let Some(remaining) = failures.get_mut(statement)
            && *remaining > 0
        {
            *remaining -= 1;
            return Err(ExecutorError::JobFailed(
                "job-under-test".to_string(),
                "FAILED".to_string(),
                format!("scripted failure for {statement}"),
            ));
        }
        Ok(())
    }
}

/// Writes a statement file into `dir` and returns its path.
pub async fn write_source(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    tokio::fs::write(&path, contents).await.expect("write source file");
    path
}

/// Run options with a short settle delay so tests stay fast.
pub fn run_options(ledger_path: &Path, workers: usize) -> RunOptions {
    RunOptions {
        workers,
        settle_delay: Duration::from_millis(1),
        ledger_path: ledger_path.to_path_buf(),
    }
}

/// Raw progress-file records, one per completed statement.
pub async fn ledger_records(path: &Path) -> Vec<String> {
    engine_core::source::read_ledger(path)
        .await
        .expect("read progress file")
}

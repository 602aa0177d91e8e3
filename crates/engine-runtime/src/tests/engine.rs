#[cfg(test)]
mod tests {
    use crate::error::RunError;
    use crate::execution::engine::{self, RunOptions};
    use async_trait::async_trait;
    use connectors::{error::ExecutorError, executor::SqlExecutor};
    use engine_core::error::PartitionError;
    use std::{
        collections::HashMap,
        path::Path,
        sync::{Arc, Mutex},
        time::Duration,
    };
    use tempfile::tempdir;

    // Mock executor with scripted failures for testing
    struct FlakyExecutor {
        // statement -> number of times it still fails before succeeding
        failures: Mutex<HashMap<String, usize>>,
        calls: Mutex<Vec<String>>,
    }

    impl FlakyExecutor {
        fn new(failures: &[(&str, usize)]) -> Self {
            FlakyExecutor {
                failures: Mutex::new(
                    failures
                        .iter()
                        .map(|(statement, count)| (statement.to_string(), *count))
                        .collect(),
                ),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn reliable() -> Self {
            FlakyExecutor::new(&[])
        }

        fn calls_for(&self, statement: &str) -> usize {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .filter(|call| call.as_str() == statement)
                .count()
        }
    }

    #[async_trait]
    impl SqlExecutor for FlakyExecutor {
        async fn execute(&self, statement: &str) -> Result<(), ExecutorError> {
            self.calls.lock().unwrap().push(statement.to_string());
            let mut failures = self.failures.lock().unwrap();
            if let Some(remaining) = failures.get_mut(statement)
                && *remaining > 0
            {
                *remaining -= 1;
                return Err(ExecutorError::JobFailed(
                    "job-1".to_string(),
                    "FAILED".to_string(),
                    format!("scripted failure for {statement}"),
                ));
            }
            Ok(())
        }
    }

    fn options(ledger_path: &Path, workers: usize) -> RunOptions {
        RunOptions {
            workers,
            settle_delay: Duration::from_millis(1),
            ledger_path: ledger_path.to_path_buf(),
        }
    }

    fn statements(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_zero_workers_is_rejected() {
        let dir = tempdir().unwrap();
        let executor = Arc::new(FlakyExecutor::reliable());

        let err = engine::run(
            executor,
            options(&dir.path().join("done.txt"), 0),
            statements(&["A;"]),
        )
        .await
        .unwrap_err();

        assert!(matches!(
            err,
            RunError::Partition(PartitionError::ZeroWorkers)
        ));
    }

    #[tokio::test]
    async fn test_statement_failing_once_is_retried_and_recorded() {
        let dir = tempdir().unwrap();
        let ledger_path = dir.path().join("done.txt");
        let executor = Arc::new(FlakyExecutor::new(&[("B;", 1)]));

        let result = engine::run(
            executor.clone(),
            options(&ledger_path, 1),
            statements(&["A;", "B;"]),
        )
        .await
        .unwrap();

        assert_eq!(result.completed, 2);
        assert_eq!(result.failed, 0);
        assert!(result.errors.is_empty());

        // one initial attempt plus exactly one retry
        assert_eq!(executor.calls_for("A;"), 1);
        assert_eq!(executor.calls_for("B;"), 2);

        let contents = tokio::fs::read_to_string(&ledger_path).await.unwrap();
        assert_eq!(contents, "A;\nB;\n");
    }

    #[tokio::test]
    async fn test_statement_failing_twice_is_skipped_and_reported() {
        let dir = tempdir().unwrap();
        let ledger_path = dir.path().join("done.txt");
        let executor = Arc::new(FlakyExecutor::new(&[("B;", 2)]));

        let result = engine::run(
            executor.clone(),
            options(&ledger_path, 1),
            statements(&["A;", "B;", "C;"]),
        )
        .await
        .unwrap();

        assert_eq!(result.completed, 2);
        assert_eq!(result.failed, 1);
        assert_eq!(result.total, 3);
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].contains("B;"));

        // a second retry is never attempted
        assert_eq!(executor.calls_for("B;"), 2);

        let contents = tokio::fs::read_to_string(&ledger_path).await.unwrap();
        assert_eq!(contents, "A;\nC;\n");
    }

    #[tokio::test]
    async fn test_unwritable_progress_file_aborts_the_run() {
        let dir = tempdir().unwrap();
        let ledger_path = dir.path().join("missing-dir").join("done.txt");
        let executor = Arc::new(FlakyExecutor::reliable());

        let err = engine::run(
            executor,
            options(&ledger_path, 1),
            statements(&["A;", "B;"]),
        )
        .await
        .unwrap_err();

        match err {
            RunError::LedgerFatal(statement, path, _) => {
                assert_eq!(statement, "A;");
                assert!(path.contains("missing-dir"));
            }
            other => panic!("expected a fatal progress-file error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_fatal_abort_stops_remaining_statements() {
        let dir = tempdir().unwrap();
        let ledger_path = dir.path().join("missing-dir").join("done.txt");
        let executor = Arc::new(FlakyExecutor::reliable());

        let err = engine::run(
            executor.clone(),
            options(&ledger_path, 1),
            statements(&["A;", "B;", "C;"]),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, RunError::LedgerFatal(_, _, _)));
        // the worker stops at the first fatal record, so B; and C; never run
        assert_eq!(executor.calls_for("A;"), 1);
        assert_eq!(executor.calls_for("B;"), 0);
        assert_eq!(executor.calls_for("C;"), 0);
    }
}

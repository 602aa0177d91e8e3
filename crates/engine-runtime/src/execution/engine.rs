use crate::{error::RunError, execution::reporter};
use connectors::{error::ExecutorError, executor::SqlExecutor};
use engine_core::{ledger::ProgressLedger, metrics::RunCounters, partition};
use futures::future::join_all;
use std::{path::PathBuf, sync::Arc, time::Duration};
use tokio::{sync::Mutex, time::sleep};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use uuid::Uuid;

/// Settings for one batch run.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Number of parallel workers; each worker must receive at least one
    /// statement.
    pub workers: usize,
    /// Pause after each successful statement before recording it, to keep
    /// from overwhelming the server.
    pub settle_delay: Duration,
    /// Path of the progress file that records completed statements.
    pub ledger_path: PathBuf,
}

/// Final tally of a batch run. `errors` holds one entry per statement that
/// failed permanently, in the order the failures were recorded.
#[derive(Debug, Clone)]
pub struct RunResult {
    pub completed: u64,
    pub failed: u64,
    pub total: u64,
    pub errors: Vec<String>,
}

/// Executes the pending statements across a pool of workers and returns the
/// final tally. Statement failures are retried once and then recorded in the
/// result; a progress-file failure aborts the whole run.
pub async fn run(
    executor: Arc<dyn SqlExecutor>,
    options: RunOptions,
    statements: Vec<String>,
) -> Result<RunResult, RunError> {
    BatchRun::new(executor, options, statements)?.execute().await
}

struct BatchRun {
    executor: Arc<dyn SqlExecutor>,
    partitions: Vec<Vec<String>>,
    counters: RunCounters,
    ledger: Arc<ProgressLedger>,
    abort: CancellationToken,
    failures: Arc<Mutex<Vec<String>>>,
    fatal: Arc<Mutex<Option<RunError>>>,
    settle_delay: Duration,
    run_id: String,
}

impl BatchRun {
    fn new(
        executor: Arc<dyn SqlExecutor>,
        options: RunOptions,
        statements: Vec<String>,
    ) -> Result<Self, RunError> {
        let partitions = partition::divide(options.workers, statements)?;
        let total = partitions.iter().map(|p| p.len() as u64).sum();

        Ok(BatchRun {
            executor,
            partitions,
            counters: RunCounters::new(total),
            ledger: Arc::new(ProgressLedger::new(options.ledger_path)),
            abort: CancellationToken::new(),
            failures: Arc::new(Mutex::new(Vec::new())),
            fatal: Arc::new(Mutex::new(None)),
            settle_delay: options.settle_delay,
            run_id: Uuid::new_v4().to_string(),
        })
    }

    async fn execute(self) -> Result<RunResult, RunError> {
        let BatchRun {
            executor,
            partitions,
            counters,
            ledger,
            abort,
            failures,
            fatal,
            settle_delay,
            run_id,
        } = self;

        info!(
            run_id = %run_id,
            workers = partitions.len(),
            total = counters.total(),
            "Starting batch run"
        );

        let finished = CancellationToken::new();
        let reporter = tokio::spawn(reporter::report_progress(
            counters.clone(),
            finished.clone(),
        ));

        let mut workers = Vec::new();
        for (id, statements) in partitions.into_iter().enumerate() {
            let worker = Worker {
                id,
                executor: Arc::clone(&executor),
                ledger: Arc::clone(&ledger),
                counters: counters.clone(),
                failures: Arc::clone(&failures),
                fatal: Arc::clone(&fatal),
                abort: abort.clone(),
                settle_delay,
            };
            workers.push(tokio::spawn(worker.run(statements)));
        }
        let outcomes = join_all(workers).await;

        // The reporter is stopped and awaited before the final tally so the
        // tally is always the last progress line of the run.
        finished.cancel();
        reporter.await?;
        for outcome in outcomes {
            outcome?;
        }

        let snapshot = counters.snapshot();
        reporter::log_tally(&snapshot);

        if let Some(err) = fatal.lock().await.take() {
            return Err(err);
        }

        let errors: Vec<String> = failures.lock().await.drain(..).collect();
        Ok(RunResult {
            completed: snapshot.completed,
            failed: snapshot.failed,
            total: snapshot.total,
            errors,
        })
    }
}

struct Worker {
    id: usize,
    executor: Arc<dyn SqlExecutor>,
    ledger: Arc<ProgressLedger>,
    counters: RunCounters,
    failures: Arc<Mutex<Vec<String>>>,
    fatal: Arc<Mutex<Option<RunError>>>,
    abort: CancellationToken,
    settle_delay: Duration,
}

impl Worker {
    async fn run(self, statements: Vec<String>) {
        for statement in statements {
            if self.abort.is_cancelled() {
                warn!(worker = self.id, "Stopping before the next statement, run aborted");
                return;
            }
            if !self.process(&statement).await {
                return;
            }
        }
    }

    /// Runs one statement to a terminal state. Returns false when the worker
    /// must stop: the progress file failed, or an abort was observed right
    /// after recording.
    async fn process(&self, statement: &str) -> bool {
        if let Err(err) = self.execute_with_retry(statement).await {
            let message =
                format!("error executing '{statement}' with 1 retry due to error `{err}`");
            error!(worker = self.id, "{message}. Skipping statement");
            self.failures.lock().await.push(message);
            self.counters.increment_failed();
            return true;
        }

        sleep(self.settle_delay).await;

        if let Err(err) = self.ledger.mark_complete(statement).await {
            self.abort.cancel();
            error!(
                worker = self.id,
                statement,
                "Unable to record completion in {}: {err}; stopping all workers",
                self.ledger.path().display()
            );
            let mut fatal = self.fatal.lock().await;
            if fatal.is_none() {
                *fatal = Some(RunError::LedgerFatal(
                    statement.to_string(),
                    self.ledger.path().display().to_string(),
                    err,
                ));
            }
            return false;
        }
        self.counters.increment_completed();

        if self.abort.is_cancelled() {
            warn!(worker = self.id, "Emergency stop");
            return false;
        }
        true
    }

    /// A failed statement is retried exactly once, immediately. Transport
    /// level backoff belongs to the executor.
    async fn execute_with_retry(&self, statement: &str) -> Result<(), ExecutorError> {
        match self.executor.execute(statement).await {
            Ok(()) => Ok(()),
            Err(err) => {
                warn!(
                    worker = self.id,
                    statement,
                    "Execution failed, retrying once: {err}"
                );
                self.executor.execute(statement).await
            }
        }
    }
}

use crate::error::LedgerError;
use std::path::{Path, PathBuf};
use tokio::{fs::OpenOptions, io::AsyncWriteExt, sync::Mutex};

/// Append-only record of completed statements, shared by all workers.
///
/// The file is the durable resume state. Each completed statement is written
/// as its own newline-terminated record and flushed before the call returns,
/// and the whole open-write-flush sequence runs under a single gate so
/// concurrent workers can never interleave partial records.
pub struct ProgressLedger {
    path: PathBuf,
    gate: Mutex<()>,
}

impl ProgressLedger {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        ProgressLedger {
            path: path.into(),
            gate: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Durably records one completed statement. The file is opened in append
    /// mode and created on first use; existing records are never touched.
    pub async fn mark_complete(&self, statement: &str) -> Result<(), LedgerError> {
        let _guard = self.gate.lock().await;

        let mut file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(&self.path)
            .await?;
        file.write_all(format!("{statement}\n").as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::read_ledger;
    use std::sync::Arc;
    use tempfile::tempdir;

    #[tokio::test]
    async fn creates_the_file_on_first_record() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("done.txt");
        let ledger = ProgressLedger::new(&path);

        ledger.mark_complete("SELECT 1;").await.unwrap();

        let contents = tokio::fs::read_to_string(&path).await.unwrap();
        assert_eq!(contents, "SELECT 1;\n");
    }

    #[tokio::test]
    async fn appends_records_in_order() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("done.txt");
        let ledger = ProgressLedger::new(&path);

        ledger.mark_complete("A;").await.unwrap();
        ledger.mark_complete("B;").await.unwrap();
        ledger.mark_complete("C;").await.unwrap();

        let contents = tokio::fs::read_to_string(&path).await.unwrap();
        assert_eq!(contents, "A;\nB;\nC;\n");
    }

    #[tokio::test]
    async fn keeps_records_from_earlier_runs() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("done.txt");
        tokio::fs::write(&path, "A;\n").await.unwrap();

        let ledger = ProgressLedger::new(&path);
        ledger.mark_complete("B;").await.unwrap();

        let contents = tokio::fs::read_to_string(&path).await.unwrap();
        assert_eq!(contents, "A;\nB;\n");
    }

    #[tokio::test]
    async fn unwritable_path_surfaces_an_io_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing-dir").join("done.txt");
        let ledger = ProgressLedger::new(&path);

        let err = ledger.mark_complete("A;").await.unwrap_err();
        assert!(matches!(err, LedgerError::Io(_)));
    }

    #[tokio::test]
    async fn multi_line_statements_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("done.txt");
        let ledger = ProgressLedger::new(&path);

        let statement = "CREATE TABLE t (\n  id INT\n);";
        ledger.mark_complete(statement).await.unwrap();

        let completed = read_ledger(&path).await.unwrap();
        assert_eq!(completed, vec![statement]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_records_never_interleave() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("done.txt");
        let ledger = Arc::new(ProgressLedger::new(&path));

        let mut handles = Vec::new();
        for worker in 0..4 {
            let ledger = Arc::clone(&ledger);
            handles.push(tokio::spawn(async move {
                for i in 0..25 {
                    let statement = format!("INSERT INTO t VALUES ({worker}, {i});");
                    ledger.mark_complete(&statement).await.unwrap();
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let completed = read_ledger(&path).await.unwrap();
        assert_eq!(completed.len(), 100);
        for record in &completed {
            assert!(record.starts_with("INSERT INTO t VALUES ("));
            assert!(record.ends_with(");"));
        }
    }
}

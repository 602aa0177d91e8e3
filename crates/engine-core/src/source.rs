use crate::error::SourceError;
use std::path::Path;
use tokio::{
    fs::File,
    io::{AsyncBufReadExt, BufReader},
};
use tracing::warn;

/// Reads a statement file and splits it into individual SQL statements.
///
/// Statements are accumulated line by line until a line ends with `;`, so a
/// statement may span several physical lines and keeps its interior newlines.
/// Blank lines between statements are skipped. Trailing text without a
/// terminating `;` is dropped with a warning.
pub async fn read_statements(path: &Path) -> Result<Vec<String>, SourceError> {
    let file = File::open(path)
        .await
        .map_err(|err| SourceError::Read(path.display().to_string(), err))?;
    scan_statements(file, path).await
}

/// Reads the progress file as a list of completed statements.
///
/// The progress file is parsed with the same statement scanner as the source
/// file, so multi-line statements round-trip exactly. A missing file means no
/// statements have completed yet. A partial trailing record (a crash mid
/// append) has no terminating `;` and is dropped, so that statement runs
/// again on resume.
pub async fn read_ledger(path: &Path) -> Result<Vec<String>, SourceError> {
    match File::open(path).await {
        Ok(file) => scan_statements(file, path).await,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
        Err(err) => Err(SourceError::Read(path.display().to_string(), err)),
    }
}

async fn scan_statements(file: File, origin: &Path) -> Result<Vec<String>, SourceError> {
    let mut lines = BufReader::new(file).lines();
    let mut statements = Vec::new();
    let mut current = String::new();

    while let Some(line) = lines
        .next_line()
        .await
        .map_err(|err| SourceError::Read(origin.display().to_string(), err))?
    {
        if current.is_empty() && line.trim().is_empty() {
            continue;
        }
        current.push_str(&line);
        if line.ends_with(';') {
            statements.push(std::mem::take(&mut current));
        } else {
            current.push('\n');
        }
    }

    if !current.is_empty() {
        warn!(
            file = %origin.display(),
            "Dropping trailing text without a terminating ';'"
        );
    }

    Ok(statements)
}

/// Removes statements that already appear in the completed list, preserving
/// the original order. Matching is exact string equality.
pub fn filter_completed(statements: Vec<String>, completed: &[String]) -> Vec<String> {
    statements
        .into_iter()
        .filter(|statement| !completed.iter().any(|done| done == statement))
        .collect()
}

/// Loads the statements still to run: everything in the source file minus
/// what the progress file already records. A non-empty source that filters
/// down to nothing is reported as an error so the caller can tell a finished
/// batch apart from an empty one.
pub async fn load_pending(
    source_file: &Path,
    ledger_file: &Path,
) -> Result<Vec<String>, SourceError> {
    let statements = read_statements(source_file).await?;
    let completed = read_ledger(ledger_file).await?;

    let total = statements.len();
    let pending = filter_completed(statements, &completed);

    if total > 0 && pending.is_empty() {
        return Err(SourceError::AllStatementsComplete(
            source_file.display().to_string(),
            ledger_file.display().to_string(),
        ));
    }

    Ok(pending)
}

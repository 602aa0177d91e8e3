use crate::error::PartitionError;

/// Divides statements across workers round-robin by position: statement `i`
/// goes to worker `i % workers`. Every worker ends up with at least one
/// statement and per-worker loads differ by at most one.
pub fn divide(workers: usize, statements: Vec<String>) -> Result<Vec<Vec<String>>, PartitionError> {
    if workers == 0 {
        return Err(PartitionError::ZeroWorkers);
    }
    if statements.is_empty() {
        return Err(PartitionError::NoWork);
    }
    if workers > statements.len() {
        return Err(PartitionError::MoreWorkersThanWork(
            workers,
            statements.len(),
        ));
    }

    let mut partitions = vec![Vec::new(); workers];
    for (i, statement) in statements.into_iter().enumerate() {
        partitions[i % workers].push(statement);
    }
    Ok(partitions)
}

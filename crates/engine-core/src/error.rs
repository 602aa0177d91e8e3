use thiserror::Error;

#[derive(Error, Debug)]
pub enum SourceError {
    /// Reading the statement file or the progress file failed.
    #[error("Failed to read {0}: {1}")]
    Read(String, #[source] std::io::Error),

    #[error(
        "All statements in {0} have already been completed according to {1}; if this is undesirable, delete {1} and try again"
    )]
    AllStatementsComplete(String, String),
}

#[derive(Error, Debug)]
pub enum PartitionError {
    #[error("Invalid configuration: zero workers requested")]
    ZeroWorkers,

    #[error("Invalid configuration: no work to do")]
    NoWork,

    /// Every worker must receive at least one statement.
    #[error("Invalid configuration: more workers ({0}) than statements ({1})")]
    MoreWorkersThanWork(usize, usize),
}

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Failed to append to the progress file: {0}")]
    Io(#[from] std::io::Error),
}

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExecutorError {
    /// The request never produced a usable response.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered outside the 2xx range.
    #[error("Server returned status {0}: {1}")]
    Api(StatusCode, String),

    /// Login succeeded at the HTTP level but returned no usable token.
    #[error("Authentication failed for user {0}")]
    Auth(String),

    /// The job reached a terminal state other than COMPLETED.
    #[error("Job {0} ended in state {1}: {2}")]
    JobFailed(String, String, String),
}

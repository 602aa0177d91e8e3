use crate::{error::ExecutorError, executor::SqlExecutor};
use async_trait::async_trait;
use reqwest::{Client, Response, header};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info};

const JOB_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Connection settings for a Dremio-compatible REST endpoint.
#[derive(Clone)]
pub struct RestConfig {
    pub base_url: String,
    pub user: String,
    pub password: String,
    /// Applied to every request, including job status polls.
    pub timeout: Duration,
    pub accept_invalid_certs: bool,
}

/// Executes statements over the REST API: submit the SQL as a job, then poll
/// the job until it reaches a terminal state.
pub struct RestEngine {
    client: Client,
    base_url: String,
    authorization: String,
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    #[serde(rename = "userName")]
    user_name: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct LoginResponse {
    token: String,
}

#[derive(Serialize)]
struct SubmitRequest<'a> {
    sql: &'a str,
}

#[derive(Deserialize)]
struct SubmitResponse {
    id: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct JobStatus {
    job_state: String,
    #[serde(default)]
    error_message: Option<String>,
}

impl RestEngine {
    /// Builds the HTTP client and authenticates. The returned engine reuses
    /// the login token for every statement.
    pub async fn connect(config: RestConfig) -> Result<Self, ExecutorError> {
        let base_url = config.base_url.trim_end_matches('/').to_string();
        let client = Client::builder()
            .timeout(config.timeout)
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .build()?;

        let login = LoginRequest {
            user_name: &config.user,
            password: &config.password,
        };
        let response = client
            .post(format!("{base_url}/apiv2/login"))
            .json(&login)
            .send()
            .await?;
        let response = require_success(response).await?;
        let login: LoginResponse = response.json().await?;
        if login.token.is_empty() {
            return Err(ExecutorError::Auth(config.user));
        }

        info!(url = %base_url, user = %config.user, "Authenticated against REST API");

        Ok(RestEngine {
            client,
            base_url,
            authorization: format!("_dremio{}", login.token),
        })
    }

    async fn submit(&self, statement: &str) -> Result<String, ExecutorError> {
        let response = self
            .client
            .post(format!("{}/api/v3/sql", self.base_url))
            .header(header::AUTHORIZATION, self.authorization.as_str())
            .json(&SubmitRequest { sql: statement })
            .send()
            .await?;
        let response = require_success(response).await?;
        let submitted: SubmitResponse = response.json().await?;
        Ok(submitted.id)
    }

    async fn wait_for_completion(&self, job_id: &str) -> Result<(), ExecutorError> {
        loop {
            let response = self
                .client
                .get(format!("{}/api/v3/job/{}", self.base_url, job_id))
                .header(header::AUTHORIZATION, self.authorization.as_str())
                .send()
                .await?;
            let response = require_success(response).await?;
            let status: JobStatus = response.json().await?;

            if status.job_state == "COMPLETED" {
                return Ok(());
            }
            if is_terminal(&status.job_state) {
                return Err(ExecutorError::JobFailed(
                    job_id.to_string(),
                    status.job_state,
                    status
                        .error_message
                        .unwrap_or_else(|| "no error message".to_string()),
                ));
            }

            debug!(job_id, state = %status.job_state, "Job still running");
            sleep(JOB_POLL_INTERVAL).await;
        }
    }
}

#[async_trait]
impl SqlExecutor for RestEngine {
    async fn execute(&self, statement: &str) -> Result<(), ExecutorError> {
        let job_id = self.submit(statement).await?;
        debug!(job_id, "Statement submitted");
        self.wait_for_completion(&job_id).await
    }
}

async fn require_success(response: Response) -> Result<Response, ExecutorError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ExecutorError::Api(status, body))
}

fn is_terminal(state: &str) -> bool {
    matches!(state, "COMPLETED" | "FAILED" | "CANCELED")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn running_states_are_not_terminal() {
        for state in ["ENQUEUED", "PLANNING", "RUNNING", "STARTING"] {
            assert!(!is_terminal(state), "{state} should not be terminal");
        }
    }

    #[test]
    fn finished_states_are_terminal() {
        for state in ["COMPLETED", "FAILED", "CANCELED"] {
            assert!(is_terminal(state), "{state} should be terminal");
        }
    }

    #[test]
    fn login_request_uses_the_api_field_names() {
        let login = LoginRequest {
            user_name: "dremio",
            password: "dremio123",
        };
        let json = serde_json::to_value(&login).unwrap();
        assert_eq!(json["userName"], "dremio");
        assert_eq!(json["password"], "dremio123");
    }

    #[test]
    fn job_status_parses_with_and_without_an_error_message() {
        let running: JobStatus = serde_json::from_str(r#"{"jobState":"RUNNING"}"#).unwrap();
        assert_eq!(running.job_state, "RUNNING");
        assert!(running.error_message.is_none());

        let failed: JobStatus =
            serde_json::from_str(r#"{"jobState":"FAILED","errorMessage":"out of memory"}"#)
                .unwrap();
        assert_eq!(failed.job_state, "FAILED");
        assert_eq!(failed.error_message.as_deref(), Some("out of memory"));
    }
}

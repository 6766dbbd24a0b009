use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};
use reqwest::{Method, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};

use crate::error::SyncError;
use crate::task::{Task, TaskPayload};

/// REST resource collection holding the tasks. One call per method, no
/// retries.
#[async_trait]
pub trait TaskApi {
    async fn list(&self) -> Result<Vec<Task>, SyncError>;

    async fn get(&self, id: &str) -> Result<Task, SyncError>;

    async fn create(&self, payload: &TaskPayload) -> Result<Task, SyncError>;

    async fn update(&self, id: &str, payload: &TaskPayload) -> Result<Task, SyncError>;

    /// PUTs the whole record, `id` and `created_at` included, to its own URL.
    async fn put_task(&self, task: &Task) -> Result<Task, SyncError>;

    async fn delete(&self, id: &str) -> Result<(), SyncError>;
}

#[derive(Debug, Clone)]
pub struct HttpTaskApi {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

impl HttpTaskApi {
    pub fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let base_url = base_url.trim().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            anyhow::bail!("task API base URL is empty");
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed building HTTP client for task API")?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn task_url(&self, id: &str) -> String {
        format!(
            "{}/{}",
            self.base_url,
            utf8_percent_encode(id, NON_ALPHANUMERIC)
        )
    }

    async fn send(
        &self,
        method: Method,
        url: &str,
        body: Option<Vec<u8>>,
    ) -> Result<String, SyncError> {
        let mut request = self
            .client
            .request(method.clone(), url)
            .header(reqwest::header::ACCEPT, "application/json");

        if let Some(body) = body {
            request = request
                .header(reqwest::header::CONTENT_TYPE, "application/json")
                .body(body);
        }

        let response = request.send().await.inspect_err(|err| {
            warn!(%method, url, error = %err, "task API request failed");
        })?;

        let status = response.status();
        let body = response.text().await?;
        debug!(%method, url, %status, bytes = body.len(), "task API responded");

        if !status.is_success() {
            return Err(status_error(status, &body));
        }
        Ok(body)
    }
}

fn decode<T: DeserializeOwned>(body: &str) -> Result<T, SyncError> {
    Ok(serde_json::from_str(body)?)
}

fn status_error(status: StatusCode, body: &str) -> SyncError {
    let message = serde_json::from_str::<ErrorBody>(body)
        .map(|parsed| parsed.error)
        .ok()
        .filter(|msg| !msg.trim().is_empty())
        .or_else(|| {
            let trimmed = body.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        })
        .or_else(|| status.canonical_reason().map(str::to_string))
        .unwrap_or_else(|| "unknown error".to_string());

    SyncError::Status {
        status: status.as_u16(),
        message,
    }
}

#[async_trait]
impl TaskApi for HttpTaskApi {
    #[instrument(skip(self))]
    async fn list(&self) -> Result<Vec<Task>, SyncError> {
        let body = self.send(Method::GET, &self.base_url, None).await?;
        decode(&body)
    }

    #[instrument(skip(self))]
    async fn get(&self, id: &str) -> Result<Task, SyncError> {
        let body = self.send(Method::GET, &self.task_url(id), None).await?;
        decode(&body)
    }

    #[instrument(skip(self, payload), fields(title_len = payload.title.len()))]
    async fn create(&self, payload: &TaskPayload) -> Result<Task, SyncError> {
        let body = self
            .send(Method::POST, &self.base_url, Some(serde_json::to_vec(payload)?))
            .await?;
        decode(&body)
    }

    #[instrument(skip(self, payload), fields(completed = payload.completed))]
    async fn update(&self, id: &str, payload: &TaskPayload) -> Result<Task, SyncError> {
        let body = self
            .send(Method::PUT, &self.task_url(id), Some(serde_json::to_vec(payload)?))
            .await?;
        decode(&body)
    }

    #[instrument(skip(self, task), fields(id = %task.id, completed = task.completed))]
    async fn put_task(&self, task: &Task) -> Result<Task, SyncError> {
        let body = self
            .send(Method::PUT, &self.task_url(&task.id), Some(serde_json::to_vec(task)?))
            .await?;
        decode(&body)
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: &str) -> Result<(), SyncError> {
        self.send(Method::DELETE, &self.task_url(id), None).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_is_normalized_and_ids_are_escaped() {
        let api = HttpTaskApi::new(" http://localhost:8080/api/tasks/ ", Duration::from_secs(5))
            .expect("build client");
        assert_eq!(api.base_url(), "http://localhost:8080/api/tasks");
        assert_eq!(
            api.task_url("65a1f0c2"),
            "http://localhost:8080/api/tasks/65a1f0c2"
        );
        assert_eq!(
            api.task_url("a/b c"),
            "http://localhost:8080/api/tasks/a%2Fb%20c"
        );
    }

    #[test]
    fn empty_base_url_is_rejected() {
        assert!(HttpTaskApi::new("  ", Duration::from_secs(5)).is_err());
    }

    #[test]
    fn status_error_prefers_backend_error_field() {
        let err = status_error(StatusCode::NOT_FOUND, r#"{"error":"Task not found"}"#);
        match err {
            SyncError::Status { status, message } => {
                assert_eq!(status, 404);
                assert_eq!(message, "Task not found");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn status_error_falls_back_to_reason_phrase() {
        let err = status_error(StatusCode::INTERNAL_SERVER_ERROR, "");
        assert_eq!(
            err.to_string(),
            "server returned HTTP 500: Internal Server Error"
        );
    }
}

//! Todoist REST client — creates tasks on behalf of the todoist processor.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};

use crate::error::ProcessError;
use crate::todos::model::{NewTask, Task};

/// Default Todoist API base URL.
pub const DEFAULT_TODOIST_API_BASE: &str = "https://api.todoist.com";

/// Environment variable holding the Todoist API token.
pub const TODOIST_TOKEN_ENV: &str = "TODOIST_API_TOKEN";

/// Anything that can create a Todoist task.
///
/// Pure I/O: the processor decides what to send, the creator only sends it.
#[async_trait]
pub trait TaskCreator: Send + Sync {
    async fn create_task(&self, task: &NewTask) -> Result<Task, ProcessError>;
}

/// HTTP client for the Todoist API.
pub struct TodoistClient {
    api_token: SecretString,
    base_url: String,
    client: reqwest::Client,
}

impl TodoistClient {
    pub fn new(api_token: SecretString) -> Self {
        Self::with_base_url(api_token, DEFAULT_TODOIST_API_BASE)
    }

    pub fn with_base_url(api_token: SecretString, base_url: impl Into<String>) -> Self {
        Self {
            api_token,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}/api/v1/{path}", self.base_url)
    }
}

#[async_trait]
impl TaskCreator for TodoistClient {
    async fn create_task(&self, task: &NewTask) -> Result<Task, ProcessError> {
        let upstream = |reason: String| ProcessError::Upstream {
            service: "todoist".into(),
            reason,
        };

        let resp = self
            .client
            .post(self.api_url("tasks"))
            .bearer_auth(self.api_token.expose_secret())
            .json(task)
            .send()
            .await
            .map_err(|e| upstream(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(upstream(format!("create task returned {status}: {body}")));
        }

        resp.json::<Task>()
            .await
            .map_err(|e| upstream(format!("invalid task response: {e}")))
    }
}

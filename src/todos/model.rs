//! Todoist task model — request and response bodies.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A task to create in Todoist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewTask {
    pub content: String,
    pub project_id: String,
    /// 1 (normal) to 4 (urgent).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_datetime: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A task as echoed back by Todoist.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Task {
    pub id: String,
    pub content: String,
}

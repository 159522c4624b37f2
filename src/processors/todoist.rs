//! Todoist processor — turns matching entries into Todoist tasks.
//!
//! Entries without a canonical URL are rejected with
//! [`ProcessError::InvalidEntry`]; no task is created for them.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::info;

use crate::error::ProcessError;
use crate::pipeline::types::Entry;
use crate::processors::EntryProcessor;
use crate::todos::client::TaskCreator;
use crate::todos::model::NewTask;

/// Task fields fixed by the rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoistSettings {
    pub project_id: String,
    pub due_datetime: Option<DateTime<Utc>>,
    pub priority: Option<u8>,
}

/// Creates one Todoist task per matching entry.
pub struct TodoistProcessor {
    settings: TodoistSettings,
    tasks: Arc<dyn TaskCreator>,
}

impl TodoistProcessor {
    pub fn new(settings: TodoistSettings, tasks: Arc<dyn TaskCreator>) -> Self {
        Self { settings, tasks }
    }

    /// Build the task for `entry`.
    pub fn task_for(&self, entry: &Entry) -> Result<NewTask, ProcessError> {
        let url = entry
            .canonical_url
            .as_deref()
            .ok_or_else(|| ProcessError::InvalidEntry {
                processor: self.kind().to_string(),
                entry_id: entry.id.clone(),
                reason: "entry must have a canonical_url to become a Todoist task".into(),
            })?;
        let title = entry.title.as_deref().unwrap_or("Untitled");

        Ok(NewTask {
            content: format!("{title} - {url}"),
            project_id: self.settings.project_id.clone(),
            priority: self.settings.priority,
            due_datetime: self.settings.due_datetime,
            description: entry.summary.as_ref().map(|s| s.content.clone()),
        })
    }
}

#[async_trait]
impl EntryProcessor for TodoistProcessor {
    fn kind(&self) -> &'static str {
        "todoist"
    }

    async fn process_entry(&self, entry: &Entry) -> Result<(), ProcessError> {
        let task = self.task_for(entry)?;
        let created = self.tasks.create_task(&task).await?;
        info!(
            task_id = %created.id,
            project_id = %self.settings.project_id,
            "Added task to Todoist: {}",
            created.content
        );
        Ok(())
    }
}

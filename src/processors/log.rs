//! Log processor — records matching entries in the log.

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::error::ProcessError;
use crate::pipeline::types::Entry;
use crate::processors::EntryProcessor;

/// Severity for the log processor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    #[default]
    Info,
    Debug,
    Warning,
    Error,
}

/// Emits one log line per entry at a fixed level.
#[derive(Debug, Clone)]
pub struct LogProcessor {
    level: LogLevel,
}

impl LogProcessor {
    pub fn new(level: LogLevel) -> Self {
        Self { level }
    }
}

#[async_trait]
impl EntryProcessor for LogProcessor {
    fn kind(&self) -> &'static str {
        "log"
    }

    async fn process_entry(&self, entry: &Entry) -> Result<(), ProcessError> {
        let title = entry.title_label();
        let url = entry.url_label();
        match self.level {
            LogLevel::Info => info!(id = %entry.id, "Processing entry: {title} (URL: {url})"),
            LogLevel::Debug => debug!(id = %entry.id, "Processing entry: {title} (URL: {url})"),
            LogLevel::Warning => warn!(id = %entry.id, "Processing entry: {title} (URL: {url})"),
            LogLevel::Error => error!(id = %entry.id, "Processing entry: {title} (URL: {url})"),
        }
        Ok(())
    }
}

//! Entry processors — the actions a rule runs on matching entries.
//!
//! Each processor kind has one [`ProcessorConfig`] variant (its document
//! shape) and one entry in the [`ProcessorRegistry`] (its constructor).
//! Credentials are injected at construction time through
//! [`ProcessorContext`], so a missing token fails at startup rather than on
//! the first matching entry.

pub mod log;
pub mod todoist;

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use schemars::JsonSchema;
use secrecy::SecretString;
use serde::{Deserialize, Deserializer, Serialize};

use crate::config::Config;
use crate::error::{ConfigError, ProcessError};
use crate::pipeline::rules::Rule;
use crate::pipeline::types::Entry;
use crate::todos::client::{DEFAULT_TODOIST_API_BASE, TODOIST_TOKEN_ENV, TodoistClient};

pub use self::log::{LogLevel, LogProcessor};
pub use self::todoist::{TodoistProcessor, TodoistSettings};

/// An action executed for entries a rule matches.
#[async_trait]
pub trait EntryProcessor: Send + Sync {
    /// Kind tag, as used in the configuration document.
    fn kind(&self) -> &'static str;

    /// Act on a single entry.
    async fn process_entry(&self, entry: &Entry) -> Result<(), ProcessError>;
}

/// Document shape of a processor, tagged by `processor_name`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "processor_name", rename_all = "snake_case")]
pub enum ProcessorConfig {
    /// Log the entry.
    Log {
        #[serde(default)]
        level: LogLevel,
    },
    /// Create a Todoist task for the entry.
    Todoist {
        project_id: String,
        /// RFC 3339 timestamp. A time without an offset is read as UTC.
        #[serde(
            default,
            deserialize_with = "deserialize_due_datetime",
            skip_serializing_if = "Option::is_none"
        )]
        due_datetime: Option<DateTime<Utc>>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        #[schemars(range(min = 1, max = 4))]
        priority: Option<u8>,
    },
}

impl ProcessorConfig {
    /// Kind tag (the `processor_name` value).
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Log { .. } => "log",
            Self::Todoist { .. } => "todoist",
        }
    }
}

fn deserialize_due_datetime<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(raw) = Option::<String>::deserialize(deserializer)? else {
        return Ok(None);
    };
    parse_due_datetime(&raw).map(Some).ok_or_else(|| {
        <D::Error as serde::de::Error>::custom(format!(
            "invalid due_datetime {raw:?}: expected RFC 3339 or YYYY-MM-DDTHH:MM:SS"
        ))
    })
}

/// Parse an RFC 3339 timestamp, or a naive `YYYY-MM-DDTHH:MM:SS[.fff]` as UTC.
fn parse_due_datetime(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

// ── Construction context ────────────────────────────────────────────

/// External inputs processors need at construction time.
#[derive(Clone)]
pub struct ProcessorContext {
    /// Todoist API token, if configured.
    pub todoist_token: Option<SecretString>,
    /// Todoist API base URL.
    pub todoist_base_url: String,
}

impl ProcessorContext {
    /// Read credentials from the process environment.
    ///
    /// `TODOIST_API_TOKEN` supplies the token; `TODOIST_API_BASE` optionally
    /// overrides the API base URL.
    pub fn from_env() -> Self {
        let todoist_token = std::env::var(TODOIST_TOKEN_ENV)
            .ok()
            .filter(|t| !t.trim().is_empty())
            .map(SecretString::from);
        let todoist_base_url = std::env::var("TODOIST_API_BASE")
            .unwrap_or_else(|_| DEFAULT_TODOIST_API_BASE.to_string());
        Self {
            todoist_token,
            todoist_base_url,
        }
    }

    /// Context with no credentials.
    pub fn empty() -> Self {
        Self {
            todoist_token: None,
            todoist_base_url: DEFAULT_TODOIST_API_BASE.to_string(),
        }
    }
}

// ── Registry ────────────────────────────────────────────────────────

/// Constructor for one processor kind.
pub type ProcessorFactory =
    fn(&ProcessorConfig, &ProcessorContext) -> Result<Arc<dyn EntryProcessor>, ConfigError>;

/// Maps processor kind tags to their constructors.
pub struct ProcessorRegistry {
    factories: HashMap<&'static str, ProcessorFactory>,
}

impl ProcessorRegistry {
    /// Registry with the built-in processors.
    pub fn new() -> Self {
        let mut registry = Self {
            factories: HashMap::new(),
        };
        registry.register("log", build_log);
        registry.register("todoist", build_todoist);
        registry
    }

    /// Register (or replace) the constructor for `kind`.
    pub fn register(&mut self, kind: &'static str, factory: ProcessorFactory) {
        self.factories.insert(kind, factory);
        tracing::debug!("Registered processor: {}", kind);
    }

    /// Construct the processor described by `config`.
    pub fn build(
        &self,
        config: &ProcessorConfig,
        ctx: &ProcessorContext,
    ) -> Result<Arc<dyn EntryProcessor>, ConfigError> {
        let factory = self
            .factories
            .get(config.kind())
            .ok_or_else(|| ConfigError::UnknownProcessor(config.kind().to_string()))?;
        factory(config, ctx)
    }
}

impl Default for ProcessorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn build_log(
    config: &ProcessorConfig,
    _ctx: &ProcessorContext,
) -> Result<Arc<dyn EntryProcessor>, ConfigError> {
    let ProcessorConfig::Log { level } = config else {
        return Err(mismatched("log", config));
    };
    Ok(Arc::new(LogProcessor::new(*level)))
}

fn build_todoist(
    config: &ProcessorConfig,
    ctx: &ProcessorContext,
) -> Result<Arc<dyn EntryProcessor>, ConfigError> {
    let ProcessorConfig::Todoist {
        project_id,
        due_datetime,
        priority,
    } = config
    else {
        return Err(mismatched("todoist", config));
    };

    let token = ctx
        .todoist_token
        .clone()
        .ok_or_else(|| ConfigError::MissingCredential(TODOIST_TOKEN_ENV.to_string()))?;
    let client = TodoistClient::with_base_url(token, ctx.todoist_base_url.clone());

    let settings = TodoistSettings {
        project_id: project_id.clone(),
        due_datetime: *due_datetime,
        priority: *priority,
    };
    Ok(Arc::new(TodoistProcessor::new(settings, Arc::new(client))))
}

fn mismatched(expected: &'static str, config: &ProcessorConfig) -> ConfigError {
    ConfigError::ProcessorMismatch {
        expected,
        actual: config.kind(),
    }
}

/// Build runtime rules from a loaded configuration, in declared order.
///
/// Fails on the first processor that cannot be constructed.
pub fn build_rules(
    config: &Config,
    registry: &ProcessorRegistry,
    ctx: &ProcessorContext,
) -> Result<Vec<Rule>, ConfigError> {
    config
        .rules
        .iter()
        .map(|rule| {
            let processor = registry.build(&rule.processor, ctx)?;
            Ok(Rule::new(rule.name.clone(), rule.matcher.clone(), processor))
        })
        .collect()
}

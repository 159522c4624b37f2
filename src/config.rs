//! Rules configuration — the YAML document that drives a run.
//!
//! ```yaml
//! rules:
//!   - name: Tech to Todoist
//!     match:
//!       matcher_name: stream_id_in
//!       stream_ids: ["feed/https://example.com/rss"]
//!     processor:
//!       processor_name: todoist
//!       project_id: "2203306141"
//!       priority: 3
//! ```
//!
//! Loading happens in three stages so each failure reads clearly: YAML
//! syntax, then document shape (tags, required fields, types), then values
//! serde cannot check (non-empty lists, priority range).

use std::path::Path;

use schemars::JsonSchema;
use schemars::schema::RootSchema;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::pipeline::rules::Matcher;
use crate::processors::ProcessorConfig;

/// Valid Todoist priorities.
const PRIORITY_RANGE: std::ops::RangeInclusive<u8> = 1..=4;

/// Ordered list of rules. Every entry is checked against every rule.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub rules: Vec<RuleConfig>,
}

/// A named matcher/processor pair as written in the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct RuleConfig {
    /// Used for logging only; need not be unique.
    pub name: String,
    #[serde(rename = "match")]
    pub matcher: Matcher,
    pub processor: ProcessorConfig,
}

impl Config {
    /// Parse and validate a YAML document. `origin` is only used in errors.
    pub fn from_yaml_str(yaml: &str, origin: &Path) -> Result<Self, ConfigError> {
        let value: serde_yaml::Value =
            serde_yaml::from_str(yaml).map_err(|e| ConfigError::Syntax {
                path: origin.to_path_buf(),
                reason: e.to_string(),
            })?;

        let config: Config = serde_yaml::from_value(value).map_err(|e| ConfigError::Schema {
            path: origin.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate(origin)?;
        Ok(config)
    }

    /// Serialize to the YAML document form.
    pub fn to_yaml_string(&self) -> Result<String, ConfigError> {
        serde_yaml::to_string(self).map_err(|e| ConfigError::Serialize(e.to_string()))
    }

    /// Check the constraints the document shape alone cannot express.
    /// `origin` is only used in errors.
    pub fn validate(&self, origin: &Path) -> Result<(), ConfigError> {
        let invalid = |key: String, message: String| ConfigError::InvalidValue {
            path: origin.to_path_buf(),
            key,
            message,
        };

        for (i, rule) in self.rules.iter().enumerate() {
            if rule.name.trim().is_empty() {
                return Err(invalid(format!("rules[{i}].name"), "must not be empty".into()));
            }

            if let Matcher::StreamIdIn { stream_ids } = &rule.matcher {
                if stream_ids.is_empty() {
                    return Err(invalid(
                        format!("rules[{i}].match.stream_ids"),
                        "must contain at least one stream id".into(),
                    ));
                }
            }

            if let ProcessorConfig::Todoist {
                project_id,
                priority,
                ..
            } = &rule.processor
            {
                if project_id.trim().is_empty() {
                    return Err(invalid(
                        format!("rules[{i}].processor.project_id"),
                        "must not be empty".into(),
                    ));
                }
                if let Some(p) = priority.filter(|p| !PRIORITY_RANGE.contains(p)) {
                    return Err(invalid(
                        format!("rules[{i}].processor.priority"),
                        format!("must be between 1 and 4, got {p}"),
                    ));
                }
            }
        }
        Ok(())
    }

    /// JSON Schema of the document.
    pub fn schema() -> RootSchema {
        schemars::schema_for!(Config)
    }
}

/// Load and validate the rules document at `path`.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound {
            path: path.to_path_buf(),
        });
    }
    let yaml = std::fs::read_to_string(path)?;
    Config::from_yaml_str(&yaml, path)
}

/// Write `config` to `path` as YAML.
pub fn save_config(config: &Config, path: &Path) -> Result<(), ConfigError> {
    std::fs::write(path, config.to_yaml_string()?)?;
    Ok(())
}

//! Rule matching — which entries a rule applies to.
//!
//! A rule binds a name, one matcher and one processor. Matchers are pure
//! predicates over an [`Entry`]; processors live in [`crate::processors`].

use std::fmt;
use std::sync::Arc;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::ProcessError;
use crate::pipeline::types::Entry;
use crate::processors::EntryProcessor;

/// Selects the entries a rule applies to.
///
/// Tagged by `matcher_name` in the configuration document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "matcher_name", rename_all = "snake_case")]
pub enum Matcher {
    /// Matches every entry.
    All,
    /// Matches entries whose origin stream id is one of `stream_ids`.
    StreamIdIn {
        #[schemars(length(min = 1))]
        stream_ids: Vec<String>,
    },
}

impl Matcher {
    /// Check whether `entry` is selected by this matcher.
    ///
    /// Entries without an origin never match `stream_id_in`. Comparison is
    /// exact and case-sensitive.
    pub fn is_match(&self, entry: &Entry) -> bool {
        match self {
            Self::All => true,
            Self::StreamIdIn { stream_ids } => entry
                .stream_id()
                .is_some_and(|id| stream_ids.iter().any(|s| s == id)),
        }
    }
}

/// Runtime matcher seam used by the processing loop.
///
/// Built-in matchers never fail, but the loop treats an `Err` here as an
/// isolated per-rule failure.
pub trait EntryMatcher: Send + Sync {
    /// Matcher tag, for logging.
    fn name(&self) -> &str;

    fn evaluate(&self, entry: &Entry) -> Result<bool, ProcessError>;
}

impl EntryMatcher for Matcher {
    fn name(&self) -> &str {
        match self {
            Self::All => "all",
            Self::StreamIdIn { .. } => "stream_id_in",
        }
    }

    fn evaluate(&self, entry: &Entry) -> Result<bool, ProcessError> {
        Ok(self.is_match(entry))
    }
}

/// A named (matcher, processor) pair ready to run.
pub struct Rule {
    pub name: String,
    pub matcher: Box<dyn EntryMatcher>,
    pub processor: Arc<dyn EntryProcessor>,
}

impl Rule {
    pub fn new(
        name: impl Into<String>,
        matcher: impl EntryMatcher + 'static,
        processor: Arc<dyn EntryProcessor>,
    ) -> Self {
        Self {
            name: name.into(),
            matcher: Box::new(matcher),
            processor,
        }
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("name", &self.name)
            .field("matcher", &self.matcher.name())
            .field("processor", &self.processor.kind())
            .finish_non_exhaustive()
    }
}

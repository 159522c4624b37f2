//! Saved-entry processing pipeline.
//!
//! Every saved entry flows through:
//! 1. `channels::feedly::saved_entries()` — paginated fetch, one entry at a time
//! 2. `Rule::matcher` — pure predicate per rule
//! 3. `Rule::processor` — the rule's action (log, Todoist task)
//!
//! Rules are evaluated in declared order and an entry may trigger any number
//! of them. Nothing is persisted between runs.

pub mod processor;
pub mod rules;
pub mod run;
pub mod types;

pub use processor::{RuleOutcome, RunSummary, process_entries, process_entry};
pub use rules::{EntryMatcher, Matcher, Rule};
pub use run::run;
pub use types::{Entry, Origin, StreamContents, Summary};

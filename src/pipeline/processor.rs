//! Entry processor loop — applies every rule to every saved entry.
//!
//! **Core invariant: one failing rule never stops the run.**
//! Matcher and processor failures are logged with the rule name and the
//! entry's title/URL, then the loop moves on to the next rule.
//!
//! Flow, strictly sequential:
//! 1. Pull the next entry from the source (may trigger a page fetch)
//! 2. For each rule in declared order: evaluate the matcher
//! 3. On match, run the processor

use std::pin::pin;

use futures::{Stream, StreamExt};
use tracing::{debug, error, info};

use crate::error::FeedError;
use crate::pipeline::rules::Rule;
use crate::pipeline::types::Entry;

/// What happened when one rule was applied to one entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleOutcome {
    /// The matcher did not select the entry.
    Skipped,
    /// The processor ran successfully.
    Processed,
    /// The matcher itself failed.
    MatchFailed,
    /// The processor failed.
    ProcessFailed,
}

impl RuleOutcome {
    /// Short label for logging.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Skipped => "skipped",
            Self::Processed => "processed",
            Self::MatchFailed => "match_failed",
            Self::ProcessFailed => "process_failed",
        }
    }
}

/// Tally of a processing run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub entries: usize,
    pub processed: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl RunSummary {
    fn record(&mut self, outcome: RuleOutcome) {
        match outcome {
            RuleOutcome::Skipped => self.skipped += 1,
            RuleOutcome::Processed => self.processed += 1,
            RuleOutcome::MatchFailed | RuleOutcome::ProcessFailed => self.failed += 1,
        }
    }
}

/// Apply a single rule to a single entry, absorbing any failure.
pub async fn process_entry(entry: &Entry, rule: &Rule) -> RuleOutcome {
    let matched = match rule.matcher.evaluate(entry) {
        Ok(matched) => matched,
        Err(e) => {
            error!(
                rule = %rule.name,
                matcher = rule.matcher.name(),
                id = %entry.id,
                title = entry.title_label(),
                url = entry.url_label(),
                error = %e,
                "Error evaluating rule for entry"
            );
            return RuleOutcome::MatchFailed;
        }
    };

    if !matched {
        return RuleOutcome::Skipped;
    }

    info!(
        rule = %rule.name,
        matcher = rule.matcher.name(),
        title = entry.title_label(),
        url = entry.url_label(),
        "Entry matched rule"
    );

    match rule.processor.process_entry(entry).await {
        Ok(()) => RuleOutcome::Processed,
        Err(e) => {
            error!(
                rule = %rule.name,
                processor = rule.processor.kind(),
                id = %entry.id,
                title = entry.title_label(),
                url = entry.url_label(),
                error = %e,
                "Error processing entry"
            );
            RuleOutcome::ProcessFailed
        }
    }
}

/// Run every rule, in order, against every entry pulled from `entries`.
///
/// Entries are consumed one at a time; the next one is not requested until
/// all rules have run on the current one. Only a failure of the entry source
/// itself ends the run early.
pub async fn process_entries<S>(entries: S, rules: &[Rule]) -> Result<RunSummary, FeedError>
where
    S: Stream<Item = Result<Entry, FeedError>>,
{
    let mut entries = pin!(entries);
    let mut summary = RunSummary::default();

    while let Some(entry) = entries.next().await {
        let entry = entry?;
        summary.entries += 1;

        for rule in rules {
            let outcome = process_entry(&entry, rule).await;
            debug!(rule = %rule.name, id = %entry.id, outcome = outcome.label(), "Rule applied");
            summary.record(outcome);
        }
    }

    info!(
        entries = summary.entries,
        processed = summary.processed,
        skipped = summary.skipped,
        failed = summary.failed,
        "Processing complete"
    );
    Ok(summary)
}

//! Reconciliation of local records against the published snapshot
//!
//! For each local record we look for its published counterpart: the first
//! remote record of the same category whose name matches OR whose normalized
//! pattern matches. Either match is enough, so a record survives a rename or
//! a pattern rewrite as an edit rather than a duplicate.
//!
//! | Counterpart found | Equal | Outcome                              |
//! |-------------------|-------|--------------------------------------|
//! | no                | -     | kept, uploaded as a new record       |
//! | yes               | no    | kept, remote id copied (an edit)     |
//! | yes               | yes   | dropped, nothing to upload           |
//!
//! Only the first counterpart is consulted. Snapshots are expected to hold
//! unique names and patterns per category.

use serde::Serialize;

use super::category::Field;
use super::pattern;
use super::record::{Record, RecordSet};

/// What reconciliation decided for one local record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// No published counterpart
    Added,
    /// Counterpart found with different content
    Edited,
    /// Counterpart found with identical content
    Unchanged,
}

/// Counts of each outcome for one reconciliation pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileSummary {
    pub added: usize,
    pub edited: usize,
    pub unchanged: usize,
}

impl ReconcileSummary {
    fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Added => self.added += 1,
            Outcome::Edited => self.edited += 1,
            Outcome::Unchanged => self.unchanged += 1,
        }
    }

    /// Number of records that still need uploading
    pub fn pending(&self) -> usize {
        self.added + self.edited
    }
}

/// Returns the first remote record that `local` should be compared against
pub fn find_counterpart<'a>(local: &Record, remote: &'a RecordSet) -> Option<&'a Record> {
    remote.iter().find(|candidate| {
        candidate.category() == local.category()
            && (candidate.name() == local.name()
                || pattern::equals_patterns(
                    candidate.text(Field::Pattern),
                    local.text(Field::Pattern),
                ))
    })
}

/// Decides the outcome for one local record, stitching the remote id on edits
pub fn classify(local: &mut Record, remote: &RecordSet) -> Outcome {
    let Some(counterpart) = find_counterpart(local, remote) else {
        return Outcome::Added;
    };

    if *local == *counterpart {
        return Outcome::Unchanged;
    }

    match counterpart.remote_id() {
        Some(id) => {
            // The id shape always matches, and every category carries the field
            let _ = local.set(Field::RemoteId, id);
        }
        None => {
            local.clear(Field::RemoteId);
        }
    }
    Outcome::Edited
}

/// Filters `local` in place down to the records that need uploading
///
/// With an empty snapshot everything is new and `local` is left untouched.
pub fn reconcile(local: &mut RecordSet, remote: &RecordSet) -> ReconcileSummary {
    let mut summary = ReconcileSummary::default();

    if remote.is_empty() {
        summary.added = local.len();
        return summary;
    }

    local.retain_mut(|record| {
        let outcome = classify(record, remote);
        summary.record(outcome);
        outcome != Outcome::Unchanged
    });

    summary
}

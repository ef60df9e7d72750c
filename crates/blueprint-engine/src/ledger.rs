//! Progress ledger: per-subsection committed/flagged state.
//!
//! Records are created lazily on the first commit or bookmark action and
//! never store derived facts (editability, section completion) - those are
//! recomputed by the [`CompletionEngine`](crate::CompletionEngine).

use blueprint_catalog::SubsectionId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Wire-level progress state, as exchanged with the persistence layer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressState {
    /// Committed (counts toward section completion)
    pub completed: bool,
    /// Bookmarked for later
    pub flagged: bool,
}

/// One ledger record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressEntry {
    /// Committed (counts toward section completion)
    pub completed: bool,
    /// Bookmarked for later
    pub flagged: bool,
    /// Last local update
    pub updated_at: DateTime<Utc>,
}

impl ProgressEntry {
    /// The wire-level view of this record
    #[inline]
    #[must_use]
    pub fn state(&self) -> ProgressState {
        ProgressState {
            completed: self.completed,
            flagged: self.flagged,
        }
    }
}

/// All of a user's progress records for the current session
#[derive(Debug, Clone, Default)]
pub struct ProgressLedger {
    entries: HashMap<SubsectionId, ProgressEntry>,
}

impl ProgressLedger {
    /// Create empty ledger
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Populate from the remote snapshot fetched at session load
    #[must_use]
    pub fn from_remote(progress: HashMap<SubsectionId, ProgressState>) -> Self {
        let now = Utc::now();
        let entries = progress
            .into_iter()
            .map(|(id, state)| {
                (
                    id,
                    ProgressEntry {
                        completed: state.completed,
                        flagged: state.flagged,
                        updated_at: now,
                    },
                )
            })
            .collect();
        Self { entries }
    }

    /// Full record for a subsection
    #[inline]
    #[must_use]
    pub fn entry(&self, id: SubsectionId) -> Option<&ProgressEntry> {
        self.entries.get(&id)
    }

    /// Committed state, default false
    #[inline]
    #[must_use]
    pub fn is_completed(&self, id: SubsectionId) -> bool {
        self.entries.get(&id).is_some_and(|e| e.completed)
    }

    /// Flagged state, default false
    #[inline]
    #[must_use]
    pub fn is_flagged(&self, id: SubsectionId) -> bool {
        self.entries.get(&id).is_some_and(|e| e.flagged)
    }

    /// Set committed state, creating the record if needed
    ///
    /// Committing clears the flagged bit: a subsection is never both
    /// flagged and completed. Returns the resulting wire state.
    pub fn set_completed(&mut self, id: SubsectionId, completed: bool) -> ProgressState {
        let now = Utc::now();
        let entry = self.entries.entry(id).or_insert(ProgressEntry {
            completed: false,
            flagged: false,
            updated_at: now,
        });
        entry.completed = completed;
        if completed {
            entry.flagged = false;
        }
        entry.updated_at = now;
        entry.state()
    }

    /// Set flagged state, creating the record if needed
    ///
    /// Returns the resulting wire state.
    pub fn set_flagged(&mut self, id: SubsectionId, flagged: bool) -> ProgressState {
        let now = Utc::now();
        let entry = self.entries.entry(id).or_insert(ProgressEntry {
            completed: false,
            flagged: false,
            updated_at: now,
        });
        entry.flagged = flagged;
        entry.updated_at = now;
        entry.state()
    }

    /// Clear every flagged bit, returning the ids that actually changed
    pub fn clear_all_flags(&mut self) -> Vec<SubsectionId> {
        let now = Utc::now();
        let mut changed = Vec::new();
        for (id, entry) in &mut self.entries {
            if entry.flagged {
                entry.flagged = false;
                entry.updated_at = now;
                changed.push(*id);
            }
        }
        changed
    }

    /// Drop records for the given subsections
    pub fn remove_many(&mut self, ids: &[SubsectionId]) {
        for id in ids {
            self.entries.remove(id);
        }
    }

    /// Drop everything (restart)
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Iterate over all records
    pub fn iter(&self) -> impl Iterator<Item = (&SubsectionId, &ProgressEntry)> {
        self.entries.iter()
    }

    /// Number of records
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no records exist
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

//! In-memory response store: one free-text answer per subsection.
//!
//! The store is the session's local source of truth. Remote persistence is
//! debounced and best-effort, so the text here may briefly be newer than the
//! external record.

use blueprint_catalog::SubsectionId;
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// One stored answer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseEntry {
    /// Free-text answer
    pub content: String,
    /// Last local update
    pub updated_at: DateTime<Utc>,
    /// The subsection was already committed when this text changed;
    /// cleared by commit or uncommit
    pub pending_edit: bool,
}

/// All of a user's answers for the current session
#[derive(Debug, Clone, Default)]
pub struct ResponseStore {
    entries: HashMap<SubsectionId, ResponseEntry>,
}

impl ResponseStore {
    /// Create empty store
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Populate from the remote snapshot fetched at session load
    #[must_use]
    pub fn from_remote(responses: HashMap<SubsectionId, String>) -> Self {
        let now = Utc::now();
        let entries = responses
            .into_iter()
            .map(|(id, content)| {
                (
                    id,
                    ResponseEntry {
                        content,
                        updated_at: now,
                        pending_edit: false,
                    },
                )
            })
            .collect();
        Self { entries }
    }

    /// Store an answer, creating the entry on first write
    pub fn set(&mut self, id: SubsectionId, content: impl Into<String>) {
        let content = content.into();
        let now = Utc::now();
        self.entries
            .entry(id)
            .and_modify(|e| {
                e.content = content.clone();
                e.updated_at = now;
            })
            .or_insert(ResponseEntry {
                content,
                updated_at: now,
                pending_edit: false,
            });
    }

    /// Full entry for a subsection
    #[inline]
    #[must_use]
    pub fn entry(&self, id: SubsectionId) -> Option<&ResponseEntry> {
        self.entries.get(&id)
    }

    /// Answer text for a subsection
    #[inline]
    #[must_use]
    pub fn text(&self, id: SubsectionId) -> Option<&str> {
        self.entries.get(&id).map(|e| e.content.as_str())
    }

    /// Mark or clear the pending-edit flag
    pub fn set_pending_edit(&mut self, id: SubsectionId, pending: bool) {
        if let Some(entry) = self.entries.get_mut(&id) {
            entry.pending_edit = pending;
        }
    }

    /// True when a committed subsection's text changed without an uncommit
    #[inline]
    #[must_use]
    pub fn has_pending_edit(&self, id: SubsectionId) -> bool {
        self.entries.get(&id).is_some_and(|e| e.pending_edit)
    }

    /// Drop one answer
    pub fn remove(&mut self, id: SubsectionId) {
        self.entries.remove(&id);
    }

    /// Drop answers for the given subsections
    pub fn remove_many(&mut self, ids: &[SubsectionId]) {
        for id in ids {
            self.entries.remove(id);
        }
    }

    /// Drop everything (restart)
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of stored answers
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no answers are stored
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

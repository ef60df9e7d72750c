//! Session events emitted toward the surrounding application.

use blueprint_catalog::UserId;

/// Events the controller pushes to the host over its event channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// Every section just became complete for the first time this session.
    /// Fired at most once per session; re-armed when the host clears the
    /// session flag store at the next login.
    AllSectionsComplete {
        /// The celebrating user
        user_id: UserId,
    },
}

/// Outcome of a commit request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    /// Transitioned uncommitted -> committed
    Committed,
    /// Was already committed; nothing changed
    AlreadyCommitted,
    /// Precondition failed (not committable, no session, unknown id);
    /// silently rejected
    Rejected,
}

/// Outcome of a bookmark toggle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookmarkOutcome {
    /// Bookmark was added
    Added,
    /// Bookmark was removed
    Removed,
    /// Subsection is committed or there is no session; nothing changed
    Ignored,
}

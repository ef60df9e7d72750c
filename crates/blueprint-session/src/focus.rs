//! Focus mode: one prompt at a time over the flattened sequence.
//!
//! A [`FocusSession`] borrows the controller for its lifetime, starts at
//! index 0 (never resumed from a previous visit), and applies the
//! auto-commit-on-leave policy: leaving a subsection that is uncommitted but
//! committable commits it first, with a settle delay before the cursor moves.

use crate::controller::SessionController;
use crate::events::{BookmarkOutcome, CommitOutcome};
use blueprint_catalog::{Subsection, SubsectionId};

/// Cursor-driven walk over the flattened subsection sequence
pub struct FocusSession<'a> {
    controller: &'a mut SessionController,
    cursor: usize,
}

impl<'a> FocusSession<'a> {
    pub(crate) fn new(controller: &'a mut SessionController) -> Self {
        Self {
            controller,
            cursor: 0,
        }
    }

    /// Current cursor index into the flattened sequence
    #[inline]
    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Length of the flattened sequence
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.controller.catalog().subsection_count()
    }

    /// True when the catalog has no subsections
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The subsection under the cursor
    #[must_use]
    pub fn current(&self) -> Option<&Subsection> {
        self.controller.catalog().sequence().get(self.cursor)
    }

    /// True at the first subsection (or on an empty sequence)
    #[inline]
    #[must_use]
    pub fn at_start(&self) -> bool {
        self.cursor == 0
    }

    /// True at the last subsection (or on an empty sequence)
    #[inline]
    #[must_use]
    pub fn at_end(&self) -> bool {
        self.len() == 0 || self.cursor + 1 == self.len()
    }

    /// Shared view of the controller for read queries
    #[inline]
    #[must_use]
    pub fn controller(&self) -> &SessionController {
        self.controller
    }

    /// Edit the current subsection's answer (debounced persistence applies)
    pub fn set_response(&mut self, text: impl Into<String>) {
        if let Some(id) = self.current_id() {
            self.controller.set_response(id, text);
        }
    }

    /// Move forward one subsection, bounded at the end
    ///
    /// Applies auto-commit-on-leave first; at the last index the commit
    /// still runs even though the cursor cannot move.
    pub async fn next(&mut self) {
        self.leave_current().await;
        if self.cursor + 1 < self.len() {
            self.cursor += 1;
        }
    }

    /// Move back one subsection, bounded at the start
    ///
    /// Same auto-commit-on-leave policy as [`next`](Self::next).
    pub async fn previous(&mut self) {
        self.leave_current().await;
        self.cursor = self.cursor.saturating_sub(1);
    }

    /// Jump straight to a subsection (bookmark/timeline shortcuts)
    ///
    /// Does not auto-commit the subsection being left. Returns false and
    /// stays put when the id is unknown.
    pub fn jump_to(&mut self, id: SubsectionId) -> bool {
        match self.controller.catalog().flat_index(id) {
            Some(index) => {
                self.cursor = index;
                true
            }
            None => false,
        }
    }

    /// Leave focus mode, auto-committing the current subsection like
    /// [`next`](Self::next) would
    pub async fn exit(mut self) {
        self.leave_current().await;
    }

    /// Toggle the bookmark on the current subsection
    ///
    /// Adding a bookmark auto-advances; removing one does not. The advance
    /// is a plain cursor move - a bookmark means "skip for later", so the
    /// auto-commit-on-leave policy does not apply to it.
    pub async fn toggle_bookmark(&mut self) -> BookmarkOutcome {
        let Some(id) = self.current_id() else {
            return BookmarkOutcome::Ignored;
        };
        let outcome = self.controller.toggle_bookmark(id).await;
        if outcome == BookmarkOutcome::Added {
            self.advance_cursor();
        }
        outcome
    }

    /// Commit the current subsection
    ///
    /// Auto-advances only on an uncommitted -> committed transition.
    pub async fn commit_current(&mut self) -> CommitOutcome {
        let Some(id) = self.current_id() else {
            return CommitOutcome::Rejected;
        };
        let outcome = self.controller.commit(id).await;
        if outcome == CommitOutcome::Committed {
            self.advance_cursor();
        }
        outcome
    }

    /// Reopen the current subsection; never moves the cursor
    pub async fn uncommit_current(&mut self) {
        if let Some(id) = self.current_id() {
            self.controller.uncommit(id).await;
        }
    }

    fn current_id(&self) -> Option<SubsectionId> {
        self.current().map(|sub| sub.id)
    }

    fn advance_cursor(&mut self) {
        if self.cursor + 1 < self.len() {
            self.cursor += 1;
        }
    }

    /// Auto-commit-on-leave: commit the current subsection when it is
    /// uncommitted but committable, then wait out the settle delay so
    /// dependent state updates before navigation bounds are recomputed
    async fn leave_current(&mut self) {
        let Some(id) = self.current_id() else { return };
        let engine = self.controller.engine();
        if engine.is_committed(id) || !engine.is_committable(id) {
            return;
        }
        self.controller.commit(id).await;
        tokio::time::sleep(self.controller.config().settle_delay).await;
    }
}

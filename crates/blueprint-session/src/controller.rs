//! The session controller: all mutations of response and progress state.
//!
//! One controller per user session, driven from a single logical thread of
//! UI events. Writes toward the repositories are optimistic: on failure the
//! operation logs and keeps in-memory state as the current view's truth
//! (last write wins across concurrent sessions, no conflict resolution).

use crate::config::SessionConfig;
use crate::debounce::DebouncedWriter;
use crate::error::{SessionLoadError, StoreError};
use crate::events::{BookmarkOutcome, CommitOutcome, SessionEvent};
use crate::focus::FocusSession;
use crate::persistence::{
    celebration_key, ContentSource, ProgressRepository, ResponseRepository, SessionFlagStore,
};
use blueprint_catalog::{Catalog, SectionId, SubsectionId, UserId};
use blueprint_engine::{CompletionEngine, ProgressLedger, ProgressState, ResponseStore};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Controller over one user's responses and progress
pub struct SessionController {
    /// Authenticated user, if any; mutations without one are logged and
    /// ignored
    user: Option<UserId>,
    config: SessionConfig,
    catalog: Arc<Catalog>,
    responses: ResponseStore,
    ledger: ProgressLedger,
    response_repo: Arc<dyn ResponseRepository>,
    progress_repo: Arc<dyn ProgressRepository>,
    flags: Arc<dyn SessionFlagStore>,
    writer: DebouncedWriter,
    events: mpsc::UnboundedSender<SessionEvent>,
}

impl SessionController {
    /// Load a session: fetch content, build the catalog, and populate the
    /// stores from remote state
    ///
    /// Anonymous sessions (`user = None`) get a read-only view over empty
    /// stores.
    ///
    /// # Errors
    /// [`SessionLoadError`] when content cannot be fetched or does not form
    /// a valid catalog. Loading is the one path where persistence failures
    /// are not swallowed.
    pub async fn load(
        content: &dyn ContentSource,
        response_repo: Arc<dyn ResponseRepository>,
        progress_repo: Arc<dyn ProgressRepository>,
        flags: Arc<dyn SessionFlagStore>,
        user: Option<UserId>,
        config: SessionConfig,
    ) -> Result<(Self, mpsc::UnboundedReceiver<SessionEvent>), SessionLoadError> {
        let sections = content.list_sections().await?;
        let subsections = content.list_subsections().await?;
        let catalog = Catalog::new(sections, subsections)?;

        let (responses, ledger) = match user {
            Some(user) => {
                let responses = ResponseStore::from_remote(response_repo.fetch(user).await?);
                let ledger = ProgressLedger::from_remote(progress_repo.fetch(user).await?);
                (responses, ledger)
            }
            None => (ResponseStore::new(), ProgressLedger::new()),
        };

        tracing::info!(
            "session loaded: {} sections, {} subsections, {} responses, {} progress records",
            catalog.sections().len(),
            catalog.subsection_count(),
            responses.len(),
            ledger.len(),
        );

        Ok(Self::from_parts(
            catalog,
            responses,
            ledger,
            response_repo,
            progress_repo,
            flags,
            user,
            config,
        ))
    }

    /// Assemble a controller from already-fetched parts
    #[allow(clippy::too_many_arguments)]
    #[must_use]
    pub fn from_parts(
        catalog: Catalog,
        responses: ResponseStore,
        ledger: ProgressLedger,
        response_repo: Arc<dyn ResponseRepository>,
        progress_repo: Arc<dyn ProgressRepository>,
        flags: Arc<dyn SessionFlagStore>,
        user: Option<UserId>,
        config: SessionConfig,
    ) -> (Self, mpsc::UnboundedReceiver<SessionEvent>) {
        let (events, receiver) = mpsc::unbounded_channel();
        let writer = DebouncedWriter::new(config.debounce);
        (
            Self {
                user,
                config,
                catalog: Arc::new(catalog),
                responses,
                ledger,
                response_repo,
                progress_repo,
                flags,
                writer,
                events,
            },
            receiver,
        )
    }

    /// The session's user, if authenticated
    #[inline]
    #[must_use]
    pub fn user(&self) -> Option<UserId> {
        self.user
    }

    /// Session configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// The curriculum content
    #[inline]
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// A fresh pure query view over the current snapshots
    #[must_use]
    pub fn engine(&self) -> CompletionEngine<'_> {
        CompletionEngine::new(&self.catalog, &self.responses, &self.ledger)
            .with_min_commit_len(self.config.min_commit_len)
    }

    /// Current local answer text for a subsection
    #[inline]
    #[must_use]
    pub fn response_text(&self, id: SubsectionId) -> Option<&str> {
        self.responses.text(id)
    }

    /// True when a committed subsection's answer was edited without an
    /// uncommit
    #[inline]
    #[must_use]
    pub fn has_pending_edit(&self, id: SubsectionId) -> bool {
        self.responses.has_pending_edit(id)
    }

    /// Store answer text and schedule its debounced write
    ///
    /// Does not touch the progress ledger. Editing an already committed
    /// subsection keeps it committed but marks the answer as a pending edit
    /// until an explicit [`uncommit`](Self::uncommit) or re-commit.
    pub fn set_response(&mut self, id: SubsectionId, text: impl Into<String>) {
        let Some(user) = self.require_user("set_response") else {
            return;
        };
        if self.catalog.subsection(id).is_none() {
            tracing::warn!("set_response for unknown subsection {}", id);
            return;
        }

        let text = text.into();
        self.responses.set(id, text.clone());
        if self.ledger.is_completed(id) {
            self.responses.set_pending_edit(id, true);
        }
        self.writer
            .schedule(Arc::clone(&self.response_repo), user, id, text);
    }

    /// Force a pending debounced write out immediately
    ///
    /// No-op when nothing is pending for the subsection.
    pub async fn flush_pending(&self, id: SubsectionId) {
        let Some(user) = self.user else { return };
        if !self.writer.cancel(id) {
            return;
        }
        let Some(text) = self.responses.text(id) else {
            return;
        };
        if let Err(e) = self.response_repo.upsert(user, id, text).await {
            self.log_persistence_failure("response flush", e);
        }
    }

    /// Flip the bookmark on an uncommitted subsection
    ///
    /// Committed subsections are never flagged: the toggle is ignored, state
    /// untouched, no persistence call made.
    pub async fn toggle_bookmark(&mut self, id: SubsectionId) -> BookmarkOutcome {
        let Some(user) = self.require_user("toggle_bookmark") else {
            return BookmarkOutcome::Ignored;
        };
        if self.catalog.subsection(id).is_none() {
            tracing::warn!("toggle_bookmark for unknown subsection {}", id);
            return BookmarkOutcome::Ignored;
        }
        if self.ledger.is_completed(id) {
            return BookmarkOutcome::Ignored;
        }

        let flagged = !self.ledger.is_flagged(id);
        let state = self.ledger.set_flagged(id, flagged);
        self.persist_progress(user, id, state).await;

        if flagged {
            BookmarkOutcome::Added
        } else {
            BookmarkOutcome::Removed
        }
    }

    /// Remove every bookmark the user has set
    pub async fn clear_all_bookmarks(&mut self) {
        let Some(user) = self.require_user("clear_all_bookmarks") else {
            return;
        };
        for id in self.ledger.clear_all_flags() {
            let state = self
                .ledger
                .entry(id)
                .map(|e| e.state())
                .unwrap_or_default();
            self.persist_progress(user, id, state).await;
        }
    }

    /// Commit a subsection
    ///
    /// Requires committability (trimmed answer at or above the threshold);
    /// otherwise a silent no-op - the UI is expected to have disabled the
    /// affordance already. A successful commit clears the bookmark, persists,
    /// and fires the one-shot celebration if every section just became
    /// complete for the first time this session.
    pub async fn commit(&mut self, id: SubsectionId) -> CommitOutcome {
        let Some(user) = self.require_user("commit") else {
            return CommitOutcome::Rejected;
        };
        if self.catalog.subsection(id).is_none() {
            tracing::warn!("commit for unknown subsection {}", id);
            return CommitOutcome::Rejected;
        }
        if self.ledger.is_completed(id) {
            // Re-confirming settles a pending edit; nothing else changes.
            self.responses.set_pending_edit(id, false);
            return CommitOutcome::AlreadyCommitted;
        }
        if !self.engine().is_committable(id) {
            tracing::debug!("commit rejected for {}: answer below threshold", id);
            return CommitOutcome::Rejected;
        }

        let state = self.ledger.set_completed(id, true);
        self.responses.set_pending_edit(id, false);
        self.persist_progress(user, id, state).await;
        tracing::debug!("committed subsection {}", id);

        self.maybe_celebrate(user);
        CommitOutcome::Committed
    }

    /// Reopen a committed subsection
    ///
    /// Does not resurrect a cleared bookmark.
    pub async fn uncommit(&mut self, id: SubsectionId) {
        let Some(user) = self.require_user("uncommit") else {
            return;
        };
        if self.catalog.subsection(id).is_none() {
            tracing::warn!("uncommit for unknown subsection {}", id);
            return;
        }

        let state = self.ledger.set_completed(id, false);
        self.responses.set_pending_edit(id, false);
        self.persist_progress(user, id, state).await;
        tracing::debug!("uncommitted subsection {}", id);
    }

    /// Wipe a section's responses and progress so the user can redo it
    ///
    /// Later sections re-lock automatically because editability is derived,
    /// never stored.
    pub async fn clear_section(&mut self, section_id: SectionId) {
        let Some(user) = self.require_user("clear_section") else {
            return;
        };
        let ids: Vec<SubsectionId> = self
            .catalog
            .subsections(section_id)
            .iter()
            .map(|sub| sub.id)
            .collect();
        if ids.is_empty() {
            return;
        }

        for &id in &ids {
            self.writer.cancel(id);
        }
        self.responses.remove_many(&ids);
        self.ledger.remove_many(&ids);

        if let Err(e) = self.response_repo.delete(user, Some(&ids)).await {
            self.log_persistence_failure("section response delete", e);
        }
        if let Err(e) = self.progress_repo.delete(user, Some(&ids)).await {
            self.log_persistence_failure("section progress delete", e);
        }
        tracing::info!("cleared section {} ({} subsections)", section_id, ids.len());
    }

    /// Delete everything the user has written. Irreversible.
    pub async fn restart(&mut self) {
        let Some(user) = self.require_user("restart") else {
            return;
        };

        self.writer.cancel_all();
        self.responses.clear();
        self.ledger.clear();

        if let Err(e) = self.response_repo.delete(user, None).await {
            self.log_persistence_failure("restart response delete", e);
        }
        if let Err(e) = self.progress_repo.delete(user, None).await {
            self.log_persistence_failure("restart progress delete", e);
        }
        tracing::info!("restarted blueprint for user {}", user);
    }

    /// Enter focus mode at the start of the flattened sequence
    #[must_use]
    pub fn enter_focus(&mut self) -> FocusSession<'_> {
        FocusSession::new(self)
    }

    /// Fire the celebration if every section just became complete for the
    /// first time this session
    ///
    /// The flag store is session-scoped, so rapid commits crossing the 100%
    /// threshold more than once still celebrate only on the first crossing.
    fn maybe_celebrate(&self, user: UserId) {
        if !self.engine().all_sections_complete() {
            return;
        }
        let key = celebration_key(user);
        if self.flags.get(&key) {
            return;
        }
        self.flags.set(&key, true);
        tracing::info!("all sections complete for user {}", user);
        // The host may have dropped the receiver; celebration is best-effort.
        let _ = self
            .events
            .send(SessionEvent::AllSectionsComplete { user_id: user });
    }

    async fn persist_progress(&self, user: UserId, id: SubsectionId, state: ProgressState) {
        if let Err(e) = self.progress_repo.upsert(user, id, state).await {
            self.log_persistence_failure("progress upsert", e);
        }
    }

    fn require_user(&self, operation: &str) -> Option<UserId> {
        if self.user.is_none() {
            tracing::warn!("{} ignored: no active session", operation);
        }
        self.user
    }

    fn log_persistence_failure(&self, what: &str, e: StoreError) {
        tracing::warn!("{} failed, keeping local state: {}", what, e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blueprint_engine::ResponseStore;
    use blueprint_session::{
        BookmarkOutcome, CommitOutcome, SessionConfig, SessionController, SessionEvent,
    };
    use blueprint_test_utils::{
        linear_content, setup_session, FailingProgress, FailingResponses, InMemoryFlags,
        InMemoryProgress, InMemoryResponses,
    };
    use std::time::Duration;

    #[tokio::test(start_paused = true)]
    async fn commit_requires_committable_answer() {
        let mut h = setup_session(&[1], SessionConfig::new()).await;
        let id = h.sequence_ids()[0];

        // No answer at all.
        assert_eq!(h.session.commit(id).await, CommitOutcome::Rejected);

        h.session.set_response(id, "ok");
        assert_eq!(h.session.commit(id).await, CommitOutcome::Rejected);
        assert!(!h.session.engine().is_committed(id));

        h.session.set_response(id, "this is fine");
        assert_eq!(h.session.commit(id).await, CommitOutcome::Committed);
        assert!(h.session.engine().is_committed(id));
        assert_eq!(h.session.commit(id).await, CommitOutcome::AlreadyCommitted);
    }

    #[tokio::test(start_paused = true)]
    async fn commit_clears_bookmark() {
        let mut h = setup_session(&[2], SessionConfig::new()).await;
        let id = h.sequence_ids()[0];

        h.session.set_response(id, "a real answer here");
        assert_eq!(h.session.toggle_bookmark(id).await, BookmarkOutcome::Added);
        assert!(h.session.engine().is_flagged(id));

        h.session.commit(id).await;
        assert!(!h.session.engine().is_flagged(id));
        let stored = h.progress.get(h.user, id).unwrap();
        assert!(stored.completed);
        assert!(!stored.flagged);
    }

    #[tokio::test(start_paused = true)]
    async fn bookmark_toggle_ignored_when_committed() {
        let mut h = setup_session(&[1], SessionConfig::new()).await;
        let id = h.sequence_ids()[0];

        h.session.set_response(id, "a real answer here");
        h.session.commit(id).await;

        let before = h.progress.upsert_count();
        assert_eq!(
            h.session.toggle_bookmark(id).await,
            BookmarkOutcome::Ignored
        );
        assert!(!h.session.engine().is_flagged(id));
        // No persistence call was made.
        assert_eq!(h.progress.upsert_count(), before);
    }

    #[tokio::test(start_paused = true)]
    async fn clear_all_bookmarks_persists_each_change() {
        let mut h = setup_session(&[3], SessionConfig::new()).await;
        let ids = h.sequence_ids();

        h.session.toggle_bookmark(ids[0]).await;
        h.session.toggle_bookmark(ids[2]).await;
        h.session.clear_all_bookmarks().await;

        assert!(h.session.engine().flagged_subsections().is_empty());
        assert!(!h.progress.get(h.user, ids[0]).unwrap().flagged);
        assert!(!h.progress.get(h.user, ids[2]).unwrap().flagged);
    }

    #[tokio::test(start_paused = true)]
    async fn uncommit_does_not_resurrect_bookmark() {
        let mut h = setup_session(&[1], SessionConfig::new()).await;
        let id = h.sequence_ids()[0];

        h.session.set_response(id, "a real answer here");
        h.session.toggle_bookmark(id).await;
        h.session.commit(id).await;
        h.session.uncommit(id).await;

        assert!(!h.session.engine().is_committed(id));
        assert!(!h.session.engine().is_flagged(id));
    }

    #[tokio::test(start_paused = true)]
    async fn pending_edit_tracks_post_commit_typing() {
        let mut h = setup_session(&[1], SessionConfig::new()).await;
        let id = h.sequence_ids()[0];

        h.session.set_response(id, "a real answer here");
        assert!(!h.session.has_pending_edit(id));

        h.session.commit(id).await;
        h.session.set_response(id, "a revised answer here");
        assert!(h.session.has_pending_edit(id));
        // Still committed; the edit is pending until uncommit or re-commit.
        assert!(h.session.engine().is_committed(id));

        h.session.uncommit(id).await;
        assert!(!h.session.has_pending_edit(id));
    }

    #[tokio::test(start_paused = true)]
    async fn set_response_debounces_writes() {
        let mut h = setup_session(&[1], SessionConfig::new()).await;
        let id = h.sequence_ids()[0];

        h.session.set_response(id, "first draft");
        tokio::time::sleep(Duration::from_millis(100)).await;
        h.session.set_response(id, "second draft of this");
        tokio::time::sleep(Duration::from_millis(700)).await;

        // Only the newest text reached the repository.
        assert_eq!(
            h.responses.upsert_log(),
            vec![(id, "second draft of this".to_string())]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn flush_pending_writes_immediately() {
        let mut h = setup_session(&[1], SessionConfig::new()).await;
        let id = h.sequence_ids()[0];

        h.session.set_response(id, "typed just now");
        h.session.flush_pending(id).await;
        assert_eq!(h.responses.get(h.user, id).as_deref(), Some("typed just now"));

        // The debounce timer was cancelled; no second write follows.
        tokio::time::sleep(Duration::from_millis(700)).await;
        assert_eq!(h.responses.upsert_log().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn celebration_fires_once_per_session() {
        let mut h = setup_session(&[1, 1], SessionConfig::new()).await;
        let ids = h.sequence_ids();

        h.session.set_response(ids[0], "a real answer here");
        h.session.set_response(ids[1], "another real answer");
        h.session.commit(ids[0]).await;
        assert!(h.events.try_recv().is_err());

        h.session.commit(ids[1]).await;
        assert_eq!(
            h.events.try_recv().unwrap(),
            SessionEvent::AllSectionsComplete { user_id: h.user }
        );

        // Crossing the threshold again within the session stays silent.
        h.session.uncommit(ids[1]).await;
        h.session.commit(ids[1]).await;
        assert!(h.events.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn celebration_rearms_after_session_boundary() {
        let mut h = setup_session(&[1], SessionConfig::new()).await;
        let id = h.sequence_ids()[0];

        h.session.set_response(id, "a real answer here");
        h.session.commit(id).await;
        assert!(h.events.try_recv().is_ok());

        // New session: the host clears the flag store at login.
        h.flags.reset();
        h.session.uncommit(id).await;
        h.session.commit(id).await;
        assert!(h.events.try_recv().is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn mutations_without_session_are_ignored() {
        let (sections, subsections) = linear_content(&[1]);
        let catalog = Catalog::new(sections, subsections).unwrap();
        let id = catalog.sequence()[0].id;
        let progress = Arc::new(InMemoryProgress::new());

        let (mut session, _events) = SessionController::from_parts(
            catalog,
            ResponseStore::new(),
            blueprint_engine::ProgressLedger::new(),
            Arc::new(InMemoryResponses::new()),
            progress.clone(),
            Arc::new(InMemoryFlags::new()),
            None,
            SessionConfig::new(),
        );

        session.set_response(id, "a real answer here");
        assert!(session.response_text(id).is_none());

        assert_eq!(session.toggle_bookmark(id).await, BookmarkOutcome::Ignored);
        assert_eq!(session.commit(id).await, CommitOutcome::Rejected);
        session.restart().await;
        assert_eq!(progress.upsert_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn persistence_failure_keeps_local_state() {
        let (sections, subsections) = linear_content(&[1]);
        let catalog = Catalog::new(sections, subsections).unwrap();
        let id = catalog.sequence()[0].id;

        let (mut session, _events) = SessionController::from_parts(
            catalog,
            ResponseStore::new(),
            blueprint_engine::ProgressLedger::new(),
            Arc::new(FailingResponses),
            Arc::new(FailingProgress),
            Arc::new(InMemoryFlags::new()),
            Some(UserId::new()),
            SessionConfig::new(),
        );

        session.set_response(id, "a real answer here");
        assert_eq!(session.commit(id).await, CommitOutcome::Committed);
        // In-memory state is the source of truth for the current view.
        assert!(session.engine().is_committed(id));
        assert_eq!(session.response_text(id), Some("a real answer here"));
    }

    #[tokio::test(start_paused = true)]
    async fn restart_deletes_everything() {
        let mut h = setup_session(&[1, 1], SessionConfig::new()).await;
        let ids = h.sequence_ids();

        h.session.set_response(ids[0], "a real answer here");
        h.session.flush_pending(ids[0]).await;
        h.session.commit(ids[0]).await;

        h.session.restart().await;

        assert!(h.session.response_text(ids[0]).is_none());
        assert!(!h.session.engine().is_committed(ids[0]));
        assert_eq!(h.responses.count(h.user), 0);
        assert_eq!(h.progress.count(h.user), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn restart_cancels_pending_debounced_writes() {
        let mut h = setup_session(&[1], SessionConfig::new()).await;
        let id = h.sequence_ids()[0];

        h.session.set_response(id, "about to be discarded");
        h.session.restart().await;
        tokio::time::sleep(Duration::from_millis(700)).await;

        // The debounced write must not resurrect deleted state.
        assert_eq!(h.responses.count(h.user), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn unknown_subsection_is_rejected() {
        let mut h = setup_session(&[1], SessionConfig::new()).await;
        let stray = SubsectionId::new();

        h.session.set_response(stray, "a real answer here");
        assert!(h.session.response_text(stray).is_none());
        assert_eq!(h.session.commit(stray).await, CommitOutcome::Rejected);
        assert_eq!(
            h.session.toggle_bookmark(stray).await,
            BookmarkOutcome::Ignored
        );
    }
}

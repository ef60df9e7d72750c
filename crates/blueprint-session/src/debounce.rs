//! Cancellable debounce timers for response writes.
//!
//! One timer per subsection: a newer edit aborts and replaces the pending
//! timer, so only the newest text reaches the repository (last write wins
//! via timer replacement, never queueing).

use crate::persistence::ResponseRepository;
use blueprint_catalog::{SubsectionId, UserId};
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Keyed, abort-and-replace debounce timers
#[derive(Debug)]
pub(crate) struct DebouncedWriter {
    delay: Duration,
    /// Pending timers per subsection; the generation lets a finished task
    /// drop only its own entry, never a replacement's
    pending: Arc<DashMap<SubsectionId, (u64, JoinHandle<()>)>>,
    generation: AtomicU64,
}

impl DebouncedWriter {
    pub(crate) fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: Arc::new(DashMap::new()),
            generation: AtomicU64::new(0),
        }
    }

    /// Schedule an upsert after the quiet period, superseding any pending
    /// timer for the same subsection
    pub(crate) fn schedule(
        &self,
        repo: Arc<dyn ResponseRepository>,
        user: UserId,
        subsection: SubsectionId,
        content: String,
    ) {
        let generation = self.generation.fetch_add(1, Ordering::Relaxed);
        let delay = self.delay;
        let pending = Arc::clone(&self.pending);

        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Err(e) = repo.upsert(user, subsection, &content).await {
                tracing::warn!("debounced response write failed for {}: {}", subsection, e);
            }
            pending.remove_if(&subsection, |_, (gen, _)| *gen == generation);
        });

        if let Some((_, old)) = self.pending.insert(subsection, (generation, handle)) {
            old.abort();
        }
    }

    /// Cancel the pending timer for a subsection; true when one existed
    pub(crate) fn cancel(&self, subsection: SubsectionId) -> bool {
        match self.pending.remove(&subsection) {
            Some((_, (_, handle))) => {
                handle.abort();
                true
            }
            None => false,
        }
    }

    /// Cancel every pending timer
    pub(crate) fn cancel_all(&self) {
        self.pending.retain(|_, (_, handle)| {
            handle.abort();
            false
        });
    }

    /// Number of pending timers (tests)
    #[cfg(test)]
    pub(crate) fn pending_count(&self) -> usize {
        self.pending.len()
    }
}

//! The completion engine: pure queries over catalog + stores.
//!
//! Everything here is derived at read time. Editability and progress are
//! never persisted, which keeps the gate logic immune to stale stored state:
//! clearing a section re-locks everything after it with no extra writes.

use crate::ledger::ProgressLedger;
use crate::store::ResponseStore;
use blueprint_catalog::{Catalog, SectionId, Subsection, SubsectionId};

/// Minimum trimmed answer length for a subsection to be committable
pub const MIN_COMMIT_LEN: usize = 10;

/// Pure query layer over one session's snapshots
///
/// Borrows the catalog and both stores; recomputation is O(subsections) and
/// runs after every mutation. Catalogs are tens of sections and low hundreds
/// of subsections, so no memoization is carried.
#[derive(Debug, Clone, Copy)]
pub struct CompletionEngine<'a> {
    catalog: &'a Catalog,
    responses: &'a ResponseStore,
    ledger: &'a ProgressLedger,
    min_commit_len: usize,
}

impl<'a> CompletionEngine<'a> {
    /// Create an engine over the given snapshots
    #[inline]
    #[must_use]
    pub fn new(
        catalog: &'a Catalog,
        responses: &'a ResponseStore,
        ledger: &'a ProgressLedger,
    ) -> Self {
        Self {
            catalog,
            responses,
            ledger,
            min_commit_len: MIN_COMMIT_LEN,
        }
    }

    /// Override the committability threshold
    #[inline]
    #[must_use]
    pub fn with_min_commit_len(mut self, min_commit_len: usize) -> Self {
        self.min_commit_len = min_commit_len;
        self
    }

    /// A subsection is committable iff its trimmed answer has at least
    /// the threshold number of characters
    #[must_use]
    pub fn is_committable(&self, id: SubsectionId) -> bool {
        self.responses
            .text(id)
            .is_some_and(|text| text.trim().chars().count() >= self.min_commit_len)
    }

    /// Ledger lookup, default false
    #[inline]
    #[must_use]
    pub fn is_committed(&self, id: SubsectionId) -> bool {
        self.ledger.is_completed(id)
    }

    /// Ledger lookup, default false
    #[inline]
    #[must_use]
    pub fn is_flagged(&self, id: SubsectionId) -> bool {
        self.ledger.is_flagged(id)
    }

    /// A section is complete iff every one of its subsections is committed
    ///
    /// A section with zero subsections is vacuously complete.
    #[must_use]
    pub fn is_section_complete(&self, section_id: SectionId) -> bool {
        self.catalog
            .subsections(section_id)
            .iter()
            .all(|sub| self.ledger.is_completed(sub.id))
    }

    /// A section is editable iff it is the first section or the section
    /// immediately before it is complete
    #[must_use]
    pub fn is_section_editable(&self, section_id: SectionId) -> bool {
        match self.catalog.previous_section(section_id) {
            None => self.catalog.section_index(section_id).is_some(),
            Some(prev) => self.is_section_complete(prev.id),
        }
    }

    /// Committed fraction of a section, in `[0, 1]`
    ///
    /// A section with zero subsections reports `1.0` (vacuously complete),
    /// the same convention [`is_section_complete`](Self::is_section_complete)
    /// and the gate logic use.
    #[must_use]
    pub fn section_progress(&self, section_id: SectionId) -> f64 {
        let subs = self.catalog.subsections(section_id);
        if subs.is_empty() {
            return 1.0;
        }
        let committed = subs
            .iter()
            .filter(|sub| self.ledger.is_completed(sub.id))
            .count();
        committed as f64 / subs.len() as f64
    }

    /// True when every section is complete (empty sections cannot block)
    #[must_use]
    pub fn all_sections_complete(&self) -> bool {
        self.catalog
            .sections()
            .iter()
            .all(|section| self.is_section_complete(section.id))
    }

    /// Total committed subsections across the catalog
    #[must_use]
    pub fn committed_count(&self) -> usize {
        self.catalog
            .sequence()
            .iter()
            .filter(|sub| self.ledger.is_completed(sub.id))
            .count()
    }

    /// Committed fraction across the whole catalog, in `[0, 1]`
    ///
    /// An empty catalog reports `1.0`, matching the per-section convention.
    #[must_use]
    pub fn overall_progress(&self) -> f64 {
        let total = self.catalog.subsection_count();
        if total == 0 {
            return 1.0;
        }
        self.committed_count() as f64 / total as f64
    }

    /// Flagged subsections in flattened reading order
    #[must_use]
    pub fn flagged_subsections(&self) -> Vec<&'a Subsection> {
        self.catalog
            .sequence()
            .iter()
            .filter(|sub| self.ledger.is_flagged(sub.id))
            .collect()
    }
}

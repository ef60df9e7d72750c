//! The validated catalog: sections plus subsections in one fixed reading order.
//!
//! Construction is the only fallible operation. A [`Catalog`] that exists is
//! internally consistent: every subsection resolves to a section, orders are
//! unique where the data model requires it, and the global flattened
//! sequence is precomputed.

use crate::ids::{SectionId, SubsectionId};
use crate::section::Section;
use crate::subsection::Subsection;
use std::collections::{HashMap, HashSet};
use std::ops::Range;

/// Catalog construction errors
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// Two sections share an id
    #[error("duplicate section id: {0}")]
    DuplicateSectionId(SectionId),

    /// Two subsections share an id
    #[error("duplicate subsection id: {0}")]
    DuplicateSubsectionId(SubsectionId),

    /// Two sections share an order value
    #[error("duplicate section order: {0}")]
    DuplicateSectionOrder(u32),

    /// Two subsections of the same section share an order value
    #[error("duplicate subsection order {order} in section {section_id}")]
    DuplicateSubsectionOrder {
        /// The owning section
        section_id: SectionId,
        /// The colliding order value
        order: u32,
    },

    /// A subsection references a section that is not in the catalog
    #[error("subsection {subsection_id} references unknown section {section_id}")]
    OrphanSubsection {
        /// The orphaned subsection
        subsection_id: SubsectionId,
        /// The missing section
        section_id: SectionId,
    },
}

/// Immutable-per-session curriculum content
///
/// Navigation order = sections sorted by `order`, then each section's
/// subsections sorted by `order`. That single flattened sequence is what
/// focus mode walks and what all index lookups here refer to.
#[derive(Debug, Clone)]
pub struct Catalog {
    /// Sections sorted by order
    sections: Vec<Section>,
    /// Section id -> index into `sections`
    section_pos: HashMap<SectionId, usize>,
    /// All subsections in global flattened order
    sequence: Vec<Subsection>,
    /// Subsection id -> index into `sequence`
    flat_pos: HashMap<SubsectionId, usize>,
    /// Per-section range into `sequence`, parallel to `sections`
    section_ranges: Vec<Range<usize>>,
}

impl Catalog {
    /// Build a validated catalog from unsorted content
    ///
    /// Sections and subsections may arrive in any order; both are sorted by
    /// `order` on receipt.
    ///
    /// # Errors
    /// - [`CatalogError::DuplicateSectionId`] / [`CatalogError::DuplicateSubsectionId`]
    /// - [`CatalogError::DuplicateSectionOrder`] across sections
    /// - [`CatalogError::DuplicateSubsectionOrder`] within one section
    /// - [`CatalogError::OrphanSubsection`] for an unresolvable `section_id`
    pub fn new(
        mut sections: Vec<Section>,
        subsections: Vec<Subsection>,
    ) -> Result<Self, CatalogError> {
        sections.sort_by_key(|s| s.order);

        let mut section_pos = HashMap::with_capacity(sections.len());
        let mut seen_orders = HashSet::with_capacity(sections.len());
        for (idx, section) in sections.iter().enumerate() {
            if section_pos.insert(section.id, idx).is_some() {
                return Err(CatalogError::DuplicateSectionId(section.id));
            }
            if !seen_orders.insert(section.order) {
                return Err(CatalogError::DuplicateSectionOrder(section.order));
            }
        }

        // Bucket subsections per section, keeping the catalog's section order.
        let mut buckets: Vec<Vec<Subsection>> = vec![Vec::new(); sections.len()];
        for sub in subsections {
            let Some(&idx) = section_pos.get(&sub.section_id) else {
                return Err(CatalogError::OrphanSubsection {
                    subsection_id: sub.id,
                    section_id: sub.section_id,
                });
            };
            buckets[idx].push(sub);
        }

        let mut sequence = Vec::new();
        let mut section_ranges = Vec::with_capacity(sections.len());
        let mut flat_pos = HashMap::new();
        for (idx, mut bucket) in buckets.into_iter().enumerate() {
            bucket.sort_by_key(|s| s.order);

            let mut seen = HashSet::with_capacity(bucket.len());
            for sub in &bucket {
                if !seen.insert(sub.order) {
                    return Err(CatalogError::DuplicateSubsectionOrder {
                        section_id: sections[idx].id,
                        order: sub.order,
                    });
                }
            }

            let start = sequence.len();
            for sub in bucket {
                if flat_pos.insert(sub.id, sequence.len()).is_some() {
                    return Err(CatalogError::DuplicateSubsectionId(sub.id));
                }
                sequence.push(sub);
            }
            section_ranges.push(start..sequence.len());
        }

        Ok(Self {
            sections,
            section_pos,
            sequence,
            flat_pos,
            section_ranges,
        })
    }

    /// Sections in catalog order
    #[inline]
    #[must_use]
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// Look up a section by id
    #[inline]
    #[must_use]
    pub fn section(&self, id: SectionId) -> Option<&Section> {
        self.section_pos.get(&id).map(|&idx| &self.sections[idx])
    }

    /// Position of a section in catalog order
    #[inline]
    #[must_use]
    pub fn section_index(&self, id: SectionId) -> Option<usize> {
        self.section_pos.get(&id).copied()
    }

    /// The section immediately before the given one, if any
    #[must_use]
    pub fn previous_section(&self, id: SectionId) -> Option<&Section> {
        match self.section_index(id)? {
            0 => None,
            idx => Some(&self.sections[idx - 1]),
        }
    }

    /// A section's subsections in reading order
    #[must_use]
    pub fn subsections(&self, section_id: SectionId) -> &[Subsection] {
        match self.section_pos.get(&section_id) {
            Some(&idx) => &self.sequence[self.section_ranges[idx].clone()],
            None => &[],
        }
    }

    /// The full flattened sequence focus mode walks
    #[inline]
    #[must_use]
    pub fn sequence(&self) -> &[Subsection] {
        &self.sequence
    }

    /// Look up a subsection by id
    #[inline]
    #[must_use]
    pub fn subsection(&self, id: SubsectionId) -> Option<&Subsection> {
        self.flat_pos.get(&id).map(|&idx| &self.sequence[idx])
    }

    /// A subsection's index in the flattened sequence
    #[inline]
    #[must_use]
    pub fn flat_index(&self, id: SubsectionId) -> Option<usize> {
        self.flat_pos.get(&id).copied()
    }

    /// The section owning a subsection
    #[must_use]
    pub fn section_of(&self, id: SubsectionId) -> Option<&Section> {
        self.subsection(id)
            .and_then(|sub| self.section(sub.section_id))
    }

    /// Zero-based position of a subsection within its own section
    #[must_use]
    pub fn position_in_section(&self, id: SubsectionId) -> Option<usize> {
        let flat = self.flat_index(id)?;
        let section_idx = self.section_index(self.sequence[flat].section_id)?;
        Some(flat - self.section_ranges[section_idx].start)
    }

    /// Total number of subsections
    #[inline]
    #[must_use]
    pub fn subsection_count(&self) -> usize {
        self.sequence.len()
    }

    /// True when the catalog has no subsections at all
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }
}

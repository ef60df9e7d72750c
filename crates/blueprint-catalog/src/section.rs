//! Sections: the top-level chapters of the curriculum.

use crate::ids::SectionId;
use serde::{Deserialize, Serialize};

/// A top-level chapter of the curriculum
///
/// Sections are immutable during a session; content management lives outside
/// this core. `order` is unique across the catalog and defines the gate
/// sequence: a section opens only once the previous one is fully committed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    /// Section ID
    pub id: SectionId,
    /// Display title
    pub title: String,
    /// Prompt shown at the top of the section
    pub description: String,
    /// Optional secondary prompt
    pub subdescription: Option<String>,
    /// Position in the catalog (unique, total order)
    pub order: u32,
}

impl Section {
    /// Create new section at the given position
    #[inline]
    #[must_use]
    pub fn new(title: impl Into<String>, description: impl Into<String>, order: u32) -> Self {
        Self {
            id: SectionId::new(),
            title: title.into(),
            description: description.into(),
            subdescription: None,
            order,
        }
    }

    /// With secondary prompt
    #[inline]
    #[must_use]
    pub fn with_subdescription(mut self, subdescription: impl Into<String>) -> Self {
        self.subdescription = Some(subdescription.into());
        self
    }
}

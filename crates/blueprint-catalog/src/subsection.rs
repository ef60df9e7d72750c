//! Subsections: the individual written prompts inside a section.

use crate::ids::{SectionId, SubsectionId};
use serde::{Deserialize, Serialize};

/// How open to revision the answer to a prompt is expected to be
///
/// Shown to the user as guidance next to each prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Malleability {
    /// Expected to change freely over time
    Flexible,
    /// Changes slowly, with deliberation
    Stiff,
    /// Effectively fixed once written
    Static,
}

impl std::fmt::Display for Malleability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Malleability::Flexible => "flexible",
            Malleability::Stiff => "stiff",
            Malleability::Static => "static",
        };
        write!(f, "{label}")
    }
}

/// A single written prompt owned by exactly one [`Section`](crate::Section)
///
/// `order` is unique within the owning section. Sections sorted by order,
/// then subsections sorted by order within each section, define the one
/// global linear sequence that focus mode walks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subsection {
    /// Subsection ID
    pub id: SubsectionId,
    /// Owning section
    pub section_id: SectionId,
    /// Display title
    pub title: String,
    /// The prompt itself
    pub description: String,
    /// Secondary prompt text
    pub subdescription: String,
    /// Revision expectation for the answer
    pub malleability: Malleability,
    /// Explanation of the malleability rating
    pub malleability_details: String,
    /// Example answer shown to the user
    pub example: String,
    /// Position within the owning section (unique per section)
    pub order: u32,
}

impl Subsection {
    /// Create new subsection under a section
    #[inline]
    #[must_use]
    pub fn new(section_id: SectionId, title: impl Into<String>, order: u32) -> Self {
        Self {
            id: SubsectionId::new(),
            section_id,
            title: title.into(),
            description: String::new(),
            subdescription: String::new(),
            malleability: Malleability::Flexible,
            malleability_details: String::new(),
            example: String::new(),
            order,
        }
    }

    /// With prompt text
    #[inline]
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// With secondary prompt text
    #[inline]
    #[must_use]
    pub fn with_subdescription(mut self, subdescription: impl Into<String>) -> Self {
        self.subdescription = subdescription.into();
        self
    }

    /// With malleability rating and its explanation
    #[inline]
    #[must_use]
    pub fn with_malleability(
        mut self,
        malleability: Malleability,
        details: impl Into<String>,
    ) -> Self {
        self.malleability = malleability;
        self.malleability_details = details.into();
        self
    }

    /// With example answer
    #[inline]
    #[must_use]
    pub fn with_example(mut self, example: impl Into<String>) -> Self {
        self.example = example.into();
        self
    }
}

//! Blueprint Catalog - curriculum content model
//!
//! The ordered, immutable-per-session content the rest of the workspace
//! computes over:
//! - Identifier newtypes for sections, subsections, and users
//! - [`Section`] and [`Subsection`] content types
//! - [`Catalog`]: validated container exposing the one global reading order
//!
//! Content is authored elsewhere; this crate only models and validates it.

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod catalog;
pub mod ids;
pub mod section;
pub mod subsection;

// Re-exports for convenience
pub use catalog::{Catalog, CatalogError};
pub use ids::{SectionId, SubsectionId, UserId};
pub use section::Section;
pub use subsection::{Malleability, Subsection};

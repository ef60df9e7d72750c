//! Blueprint Engine - derived completion state
//!
//! The read side of the curriculum core:
//! - [`ResponseStore`]: the session's local copy of free-text answers
//! - [`ProgressLedger`]: per-subsection committed/flagged records
//! - [`CompletionEngine`]: pure queries (committability, section
//!   completion, gate editability, progress ratios)
//!
//! Nothing here performs I/O; the engine recomputes from snapshots after
//! every mutation instead of caching derived facts.

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod engine;
pub mod ledger;
pub mod store;

// Re-exports for convenience
pub use engine::{CompletionEngine, MIN_COMMIT_LEN};
pub use ledger::{ProgressEntry, ProgressLedger, ProgressState};
pub use store::{ResponseEntry, ResponseStore};

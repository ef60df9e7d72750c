//! Blueprint Session - the write side of the curriculum core
//!
//! One controller per user session:
//! - [`SessionController`]: commit/bookmark/clear/restart mutations under
//!   the gate invariants, with optimistic best-effort persistence
//! - [`FocusSession`]: linear focus-mode navigation with
//!   auto-commit-on-leave and the bookmark/commit auto-advance asymmetries
//! - Boundary traits the host wires to its storage ([`ContentSource`],
//!   [`ResponseRepository`], [`ProgressRepository`], [`SessionFlagStore`])
//!
//! # Example
//!
//! ```rust,ignore
//! use blueprint_session::{SessionConfig, SessionController};
//!
//! # async fn example(deps: Deps) -> Result<(), Box<dyn std::error::Error>> {
//! let (mut session, mut events) = SessionController::load(
//!     &deps.content,
//!     deps.responses,
//!     deps.progress,
//!     deps.flags,
//!     Some(deps.user),
//!     SessionConfig::new(),
//! )
//! .await?;
//!
//! let mut focus = session.enter_focus();
//! focus.set_response("What I believe, in my own words.");
//! focus.next().await; // auto-commits, then advances
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod config;
pub mod controller;
mod debounce;
pub mod error;
pub mod events;
pub mod focus;
pub mod persistence;

// Re-exports for convenience
pub use config::SessionConfig;
pub use controller::SessionController;
pub use error::{SessionLoadError, StoreError};
pub use events::{BookmarkOutcome, CommitOutcome, SessionEvent};
pub use focus::FocusSession;
pub use persistence::{
    celebration_key, ContentSource, ProgressRepository, ResponseRepository, SessionFlagStore,
};

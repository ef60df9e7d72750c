//! Error types for the session layer
//!
//! Persistence failures are deliberately narrow: the controller logs them
//! and keeps in-memory state as the source of truth for the current view
//! (optimistic writes, no rollback, no retry). Nothing here is fatal.

use blueprint_catalog::CatalogError;

/// Errors surfaced by the external persistence collaborators
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Backend could not be reached
    #[error("backend unavailable: {0}")]
    Unavailable(String),

    /// Backend refused the write
    #[error("write rejected: {0}")]
    Rejected(String),

    /// Any other backend failure
    #[error("backend failure: {0}")]
    Backend(String),
}

/// Errors while building a session from remote state
///
/// Loading is the one place persistence failures are not swallowed: without
/// content and the initial snapshots there is no session to run.
#[derive(Debug, thiserror::Error)]
pub enum SessionLoadError {
    /// Fetching content, responses, or progress failed
    #[error("session load failed: {0}")]
    Store(#[from] StoreError),

    /// The fetched content is not a valid catalog
    #[error("invalid catalog: {0}")]
    Catalog(#[from] CatalogError),
}

//! Boundary traits toward the surrounding application's storage.
//!
//! The core defines no wire format; the host wires these to whatever backend
//! it uses. All writes are unversioned - two concurrent sessions for the
//! same user race and the last write wins, by design.

use crate::error::StoreError;
use async_trait::async_trait;
use blueprint_catalog::{Section, Subsection, SubsectionId, UserId};
use blueprint_engine::ProgressState;
use std::collections::HashMap;

/// Read-only curriculum content supplier
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// All sections, in any order (the catalog sorts on receipt)
    async fn list_sections(&self) -> Result<Vec<Section>, StoreError>;

    /// All subsections, in any order
    async fn list_subsections(&self) -> Result<Vec<Subsection>, StoreError>;
}

/// Persistence for free-text answers
#[async_trait]
pub trait ResponseRepository: Send + Sync {
    /// All stored answers for a user
    async fn fetch(&self, user: UserId) -> Result<HashMap<SubsectionId, String>, StoreError>;

    /// Create-or-update one answer
    async fn upsert(
        &self,
        user: UserId,
        subsection: SubsectionId,
        content: &str,
    ) -> Result<(), StoreError>;

    /// Delete answers for the given subsections, or all of them when `None`
    async fn delete(
        &self,
        user: UserId,
        subsections: Option<&[SubsectionId]>,
    ) -> Result<(), StoreError>;
}

/// Persistence for committed/flagged progress records
#[async_trait]
pub trait ProgressRepository: Send + Sync {
    /// All stored progress records for a user
    async fn fetch(
        &self,
        user: UserId,
    ) -> Result<HashMap<SubsectionId, ProgressState>, StoreError>;

    /// Create-or-update one record
    async fn upsert(
        &self,
        user: UserId,
        subsection: SubsectionId,
        state: ProgressState,
    ) -> Result<(), StoreError>;

    /// Delete records for the given subsections, or all of them when `None`
    async fn delete(
        &self,
        user: UserId,
        subsections: Option<&[SubsectionId]>,
    ) -> Result<(), StoreError>;
}

/// Session-scoped boolean flags
///
/// Backs the one-shot celebration. The host clears this store at the session
/// boundary (logout/new login), not on page reload, so a restarted blueprint
/// can celebrate again next session.
pub trait SessionFlagStore: Send + Sync {
    /// Read a flag, default false
    fn get(&self, key: &str) -> bool;

    /// Write a flag
    fn set(&self, key: &str, value: bool);
}

/// Flag key guarding the one-shot celebration for a user
#[must_use]
pub fn celebration_key(user: UserId) -> String {
    format!("celebrated:{user}")
}

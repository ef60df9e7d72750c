//! Testing utilities for the blueprint workspace
//!
//! In-memory implementations of the session boundary traits, catalog
//! fixtures, and a fully wired session harness.

#![allow(missing_docs)]

use async_trait::async_trait;
use blueprint_catalog::{Section, Subsection, SubsectionId, UserId};
use blueprint_engine::ProgressState;
use blueprint_session::{
    ContentSource, ProgressRepository, ResponseRepository, SessionConfig, SessionController,
    SessionEvent, SessionFlagStore, StoreError,
};
use dashmap::DashMap;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedReceiver;

/// Catalog fixture: one section per entry in `shape`, each with that many
/// subsections, orders assigned linearly.
pub fn linear_content(shape: &[usize]) -> (Vec<Section>, Vec<Subsection>) {
    let mut sections = Vec::new();
    let mut subsections = Vec::new();
    for (i, &count) in shape.iter().enumerate() {
        let section = Section::new(format!("Section {i}"), format!("Prompt {i}"), i as u32);
        for j in 0..count {
            subsections.push(
                Subsection::new(section.id, format!("Subsection {i}.{j}"), j as u32)
                    .with_description(format!("Question {i}.{j}")),
            );
        }
        sections.push(section);
    }
    (sections, subsections)
}

/// Static content supplier
#[derive(Debug, Clone, Default)]
pub struct InMemoryContent {
    pub sections: Vec<Section>,
    pub subsections: Vec<Subsection>,
}

impl InMemoryContent {
    pub fn new(sections: Vec<Section>, subsections: Vec<Subsection>) -> Self {
        Self {
            sections,
            subsections,
        }
    }
}

#[async_trait]
impl ContentSource for InMemoryContent {
    async fn list_sections(&self) -> Result<Vec<Section>, StoreError> {
        Ok(self.sections.clone())
    }

    async fn list_subsections(&self) -> Result<Vec<Subsection>, StoreError> {
        Ok(self.subsections.clone())
    }
}

/// In-memory response repository recording every upsert
#[derive(Debug, Default)]
pub struct InMemoryResponses {
    records: DashMap<(UserId, SubsectionId), String>,
    upserts: Mutex<Vec<(SubsectionId, String)>>,
}

impl InMemoryResponses {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, user: UserId, id: SubsectionId) -> Option<String> {
        self.records.get(&(user, id)).map(|r| r.value().clone())
    }

    pub fn count(&self, user: UserId) -> usize {
        self.records.iter().filter(|r| r.key().0 == user).count()
    }

    /// Every upsert seen, in call order
    pub fn upsert_log(&self) -> Vec<(SubsectionId, String)> {
        self.upserts.lock().clone()
    }
}

#[async_trait]
impl ResponseRepository for InMemoryResponses {
    async fn fetch(&self, user: UserId) -> Result<HashMap<SubsectionId, String>, StoreError> {
        Ok(self
            .records
            .iter()
            .filter(|r| r.key().0 == user)
            .map(|r| (r.key().1, r.value().clone()))
            .collect())
    }

    async fn upsert(
        &self,
        user: UserId,
        subsection: SubsectionId,
        content: &str,
    ) -> Result<(), StoreError> {
        self.records
            .insert((user, subsection), content.to_string());
        self.upserts.lock().push((subsection, content.to_string()));
        Ok(())
    }

    async fn delete(
        &self,
        user: UserId,
        subsections: Option<&[SubsectionId]>,
    ) -> Result<(), StoreError> {
        match subsections {
            Some(ids) => {
                for &id in ids {
                    self.records.remove(&(user, id));
                }
            }
            None => self.records.retain(|key, _| key.0 != user),
        }
        Ok(())
    }
}

/// In-memory progress repository
#[derive(Debug, Default)]
pub struct InMemoryProgress {
    records: DashMap<(UserId, SubsectionId), ProgressState>,
    upsert_count: Mutex<usize>,
}

impl InMemoryProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, user: UserId, id: SubsectionId) -> Option<ProgressState> {
        self.records.get(&(user, id)).map(|r| *r)
    }

    pub fn count(&self, user: UserId) -> usize {
        self.records.iter().filter(|r| r.key().0 == user).count()
    }

    pub fn upsert_count(&self) -> usize {
        *self.upsert_count.lock()
    }
}

#[async_trait]
impl ProgressRepository for InMemoryProgress {
    async fn fetch(
        &self,
        user: UserId,
    ) -> Result<HashMap<SubsectionId, ProgressState>, StoreError> {
        Ok(self
            .records
            .iter()
            .filter(|r| r.key().0 == user)
            .map(|r| (r.key().1, *r.value()))
            .collect())
    }

    async fn upsert(
        &self,
        user: UserId,
        subsection: SubsectionId,
        state: ProgressState,
    ) -> Result<(), StoreError> {
        self.records.insert((user, subsection), state);
        *self.upsert_count.lock() += 1;
        Ok(())
    }

    async fn delete(
        &self,
        user: UserId,
        subsections: Option<&[SubsectionId]>,
    ) -> Result<(), StoreError> {
        match subsections {
            Some(ids) => {
                for &id in ids {
                    self.records.remove(&(user, id));
                }
            }
            None => self.records.retain(|key, _| key.0 != user),
        }
        Ok(())
    }
}

/// Session-scoped flag store; `reset` simulates a session boundary
#[derive(Debug, Default)]
pub struct InMemoryFlags {
    flags: DashMap<String, bool>,
}

impl InMemoryFlags {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear everything, as the host does at logout/new login
    pub fn reset(&self) {
        self.flags.clear();
    }
}

impl SessionFlagStore for InMemoryFlags {
    fn get(&self, key: &str) -> bool {
        self.flags.get(key).is_some_and(|v| *v)
    }

    fn set(&self, key: &str, value: bool) {
        self.flags.insert(key.to_string(), value);
    }
}

/// Response repository whose writes always fail (fetch succeeds empty)
#[derive(Debug, Default)]
pub struct FailingResponses;

#[async_trait]
impl ResponseRepository for FailingResponses {
    async fn fetch(&self, _user: UserId) -> Result<HashMap<SubsectionId, String>, StoreError> {
        Ok(HashMap::new())
    }

    async fn upsert(
        &self,
        _user: UserId,
        _subsection: SubsectionId,
        _content: &str,
    ) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("injected failure".to_string()))
    }

    async fn delete(
        &self,
        _user: UserId,
        _subsections: Option<&[SubsectionId]>,
    ) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("injected failure".to_string()))
    }
}

/// Progress repository whose writes always fail (fetch succeeds empty)
#[derive(Debug, Default)]
pub struct FailingProgress;

#[async_trait]
impl ProgressRepository for FailingProgress {
    async fn fetch(
        &self,
        _user: UserId,
    ) -> Result<HashMap<SubsectionId, ProgressState>, StoreError> {
        Ok(HashMap::new())
    }

    async fn upsert(
        &self,
        _user: UserId,
        _subsection: SubsectionId,
        _state: ProgressState,
    ) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("injected failure".to_string()))
    }

    async fn delete(
        &self,
        _user: UserId,
        _subsections: Option<&[SubsectionId]>,
    ) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("injected failure".to_string()))
    }
}

/// Everything a wired-up session test needs
pub struct SessionHarness {
    pub session: SessionController,
    pub events: UnboundedReceiver<SessionEvent>,
    pub user: UserId,
    pub content: InMemoryContent,
    pub responses: Arc<InMemoryResponses>,
    pub progress: Arc<InMemoryProgress>,
    pub flags: Arc<InMemoryFlags>,
}

impl SessionHarness {
    /// Subsection ids in flattened order
    pub fn sequence_ids(&self) -> Vec<SubsectionId> {
        self.session
            .catalog()
            .sequence()
            .iter()
            .map(|sub| sub.id)
            .collect()
    }
}

/// Load an authenticated session over a fresh in-memory backend
pub async fn setup_session(shape: &[usize], config: SessionConfig) -> SessionHarness {
    let (sections, subsections) = linear_content(shape);
    let content = InMemoryContent::new(sections, subsections);
    let responses = Arc::new(InMemoryResponses::new());
    let progress = Arc::new(InMemoryProgress::new());
    let flags = Arc::new(InMemoryFlags::new());
    let user = UserId::new();

    let (session, events) = SessionController::load(
        &content,
        responses.clone(),
        progress.clone(),
        flags.clone(),
        Some(user),
        config,
    )
    .await
    .expect("in-memory session load");

    SessionHarness {
        session,
        events,
        user,
        content,
        responses,
        progress,
        flags,
    }
}

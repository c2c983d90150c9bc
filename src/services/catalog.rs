use crate::db::{CatalogStore, StoreError};
use crate::domain::models::{
    CatalogSnapshot, Identity, NewPillar, NewQuestion, Pillar, PillarPatch, Question,
    QuestionPatch, Settings, SettingsPatch,
};
use crate::policy::{self, AccessError, Action, Resource};
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("pillar name must not be empty")]
    EmptyName,
    #[error("question text must not be empty")]
    EmptyText,
    #[error("points must be at least 1")]
    InvalidPoints,
    #[error("the neutral value cannot be a question's positive answer")]
    NeutralPositiveAnswer,
    #[error(transparent)]
    Access(#[from] AccessError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Catalog administration. Input invariants are checked here so both store
/// implementations receive only well-formed rows.
#[derive(Clone)]
pub struct CatalogService {
    store: Arc<dyn CatalogStore>,
}

impl CatalogService {
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self { store }
    }

    pub async fn snapshot(&self, identity: &Identity) -> Result<CatalogSnapshot, CatalogError> {
        policy::authorize(identity, Action::Read, Resource::Pillar)?;
        Ok(self.store.snapshot().await?)
    }

    pub async fn create_pillar(
        &self,
        identity: &Identity,
        new: NewPillar,
    ) -> Result<Pillar, CatalogError> {
        policy::authorize(identity, Action::Create, Resource::Pillar)?;
        if new.name.trim().is_empty() {
            return Err(CatalogError::EmptyName);
        }
        Ok(self.store.insert_pillar(new).await?)
    }

    pub async fn update_pillar(
        &self,
        identity: &Identity,
        id: Uuid,
        patch: PillarPatch,
    ) -> Result<Pillar, CatalogError> {
        policy::authorize(identity, Action::Update, Resource::Pillar)?;
        if matches!(&patch.name, Some(name) if name.trim().is_empty()) {
            return Err(CatalogError::EmptyName);
        }
        self.store
            .update_pillar(id, patch)
            .await?
            .ok_or(CatalogError::Access(AccessError::NotFoundOrForbidden))
    }

    pub async fn delete_pillar(&self, identity: &Identity, id: Uuid) -> Result<(), CatalogError> {
        policy::authorize(identity, Action::Delete, Resource::Pillar)?;
        if !self.store.delete_pillar(id).await? {
            return Err(CatalogError::Access(AccessError::NotFoundOrForbidden));
        }
        tracing::info!(pillar_id = %id, "Pillar deleted with its questions");
        Ok(())
    }

    pub async fn create_question(
        &self,
        identity: &Identity,
        new: NewQuestion,
    ) -> Result<Question, CatalogError> {
        policy::authorize(identity, Action::Create, Resource::Question)?;
        if new.text.trim().is_empty() {
            return Err(CatalogError::EmptyText);
        }
        if new.points < 1 {
            return Err(CatalogError::InvalidPoints);
        }
        if new.positive_answer.is_neutral() {
            return Err(CatalogError::NeutralPositiveAnswer);
        }
        Ok(self.store.insert_question(new).await?)
    }

    pub async fn update_question(
        &self,
        identity: &Identity,
        id: Uuid,
        patch: QuestionPatch,
    ) -> Result<Question, CatalogError> {
        policy::authorize(identity, Action::Update, Resource::Question)?;
        if matches!(&patch.text, Some(text) if text.trim().is_empty()) {
            return Err(CatalogError::EmptyText);
        }
        if matches!(patch.points, Some(points) if points < 1) {
            return Err(CatalogError::InvalidPoints);
        }
        if matches!(patch.positive_answer, Some(value) if value.is_neutral()) {
            return Err(CatalogError::NeutralPositiveAnswer);
        }
        self.store
            .update_question(id, patch)
            .await?
            .ok_or(CatalogError::Access(AccessError::NotFoundOrForbidden))
    }

    pub async fn delete_question(&self, identity: &Identity, id: Uuid) -> Result<(), CatalogError> {
        policy::authorize(identity, Action::Delete, Resource::Question)?;
        if !self.store.delete_question(id).await? {
            return Err(CatalogError::Access(AccessError::NotFoundOrForbidden));
        }
        Ok(())
    }

    pub async fn settings(&self, identity: &Identity) -> Result<Settings, CatalogError> {
        policy::authorize(identity, Action::Read, Resource::Settings)?;
        Ok(self.store.settings().await?)
    }

    pub async fn update_settings(
        &self,
        identity: &Identity,
        patch: SettingsPatch,
    ) -> Result<Settings, CatalogError> {
        policy::authorize(identity, Action::Update, Resource::Settings)?;
        Ok(self.store.update_settings(patch).await?)
    }
}

pub mod memory;
pub mod postgres;
pub mod seed;

use crate::domain::models::{
    CatalogSnapshot, DiagnosticResult, NewDiagnosticResult, NewPillar, NewQuestion, Pillar,
    PillarPatch, Question, QuestionPatch, Settings, SettingsPatch,
};
use async_trait::async_trait;
use uuid::Uuid;

/// Persistence failure. `Unavailable` carries the driver error and is safe
/// to retry: every write here is a single atomic statement.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(#[from] sqlx::Error),
    #[error("pillar {0} does not exist")]
    UnknownPillar(Uuid),
}

/// Catalog persistence. Reads used for scoring go through `snapshot`, which
/// returns one consistent point-in-time view. Every mutating call stamps
/// `updated_at` itself rather than relying on a database trigger.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn snapshot(&self) -> Result<CatalogSnapshot, StoreError>;

    async fn insert_pillar(&self, new: NewPillar) -> Result<Pillar, StoreError>;
    async fn update_pillar(&self, id: Uuid, patch: PillarPatch)
        -> Result<Option<Pillar>, StoreError>;
    /// Deletes the pillar and cascades over its questions.
    async fn delete_pillar(&self, id: Uuid) -> Result<bool, StoreError>;

    async fn insert_question(&self, new: NewQuestion) -> Result<Question, StoreError>;
    async fn update_question(
        &self,
        id: Uuid,
        patch: QuestionPatch,
    ) -> Result<Option<Question>, StoreError>;
    async fn delete_question(&self, id: Uuid) -> Result<bool, StoreError>;

    async fn settings(&self) -> Result<Settings, StoreError>;
    async fn update_settings(&self, patch: SettingsPatch) -> Result<Settings, StoreError>;
}

/// Result persistence. Results are write-once: there is deliberately no
/// update method on this trait.
#[async_trait]
pub trait ResultStore: Send + Sync {
    /// Atomically persists a new result, stamping `created_at`.
    async fn insert(&self, new: NewDiagnosticResult) -> Result<DiagnosticResult, StoreError>;
    async fn fetch(&self, id: Uuid) -> Result<Option<DiagnosticResult>, StoreError>;
    /// Newest-first; each call is a fresh consistent snapshot, not a live
    /// cursor.
    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<DiagnosticResult>, StoreError>;
    async fn delete(&self, id: Uuid) -> Result<bool, StoreError>;
}

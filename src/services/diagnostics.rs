use crate::db::{CatalogStore, ResultStore, StoreError};
use crate::domain::models::{DiagnosticResult, Identity, NewDiagnosticResult};
use crate::policy::{self, AccessError, Action, Resource};
use crate::scoring::engine::score_validated;
use crate::scoring::{validate_answers, NeutralPolicy, ValidationError};
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

/// Failure of a diagnostic operation. Validation and authorization errors
/// are deterministic and never worth retrying; store errors are.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Access(#[from] AccessError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Orchestrates submission scoring and owner-scoped retrieval. The policy
/// layer is consulted on every call; nothing about the caller is cached.
#[derive(Clone)]
pub struct DiagnosticService {
    catalog: Arc<dyn CatalogStore>,
    results: Arc<dyn ResultStore>,
    neutral_policy: NeutralPolicy,
}

impl DiagnosticService {
    pub fn new(
        catalog: Arc<dyn CatalogStore>,
        results: Arc<dyn ResultStore>,
        neutral_policy: NeutralPolicy,
    ) -> Self {
        Self {
            catalog,
            results,
            neutral_policy,
        }
    }

    /// Validate, score, and persist one submission. Rejections happen before
    /// anything is written; a failed submission leaves no trace.
    pub async fn submit(
        &self,
        identity: &Identity,
        company_data: serde_json::Value,
        answers: HashMap<Uuid, String>,
    ) -> Result<DiagnosticResult, ServiceError> {
        let user_id = policy::require_user(identity)?;
        policy::authorize(
            identity,
            Action::Create,
            Resource::DiagnosticResult { owner: user_id },
        )?;

        if company_data.is_null() {
            return Err(ValidationError::MissingCompanyData.into());
        }

        let snapshot = self.catalog.snapshot().await?;
        let validated = validate_answers(&snapshot, &answers)?;
        let scored = score_validated(&validated, &snapshot, self.neutral_policy);

        let result = self
            .results
            .insert(NewDiagnosticResult {
                user_id,
                company_data,
                answers: validated,
                scored,
            })
            .await?;

        tracing::info!(
            result_id = %result.id,
            total = result.total_score,
            max = result.max_possible_score,
            "Diagnostic scored and stored"
        );
        Ok(result)
    }

    pub async fn get(
        &self,
        identity: &Identity,
        result_id: Uuid,
    ) -> Result<DiagnosticResult, ServiceError> {
        policy::require_user(identity)?;

        let result = self
            .results
            .fetch(result_id)
            .await?
            .ok_or(AccessError::NotFoundOrForbidden)?;

        policy::authorize(
            identity,
            Action::Read,
            Resource::DiagnosticResult {
                owner: result.user_id,
            },
        )?;
        Ok(result)
    }

    pub async fn list(&self, identity: &Identity) -> Result<Vec<DiagnosticResult>, ServiceError> {
        let user_id = policy::require_user(identity)?;
        policy::authorize(
            identity,
            Action::Read,
            Resource::DiagnosticResult { owner: user_id },
        )?;
        Ok(self.results.list_for_user(user_id).await?)
    }

    pub async fn delete(&self, identity: &Identity, result_id: Uuid) -> Result<(), ServiceError> {
        policy::require_user(identity)?;

        let result = self
            .results
            .fetch(result_id)
            .await?
            .ok_or(AccessError::NotFoundOrForbidden)?;

        policy::authorize(
            identity,
            Action::Delete,
            Resource::DiagnosticResult {
                owner: result.user_id,
            },
        )?;

        // A concurrent delete of the same result is not an error; the
        // outcome is the same record being gone.
        if !self.results.delete(result_id).await? {
            return Err(AccessError::NotFoundOrForbidden.into());
        }
        tracing::info!(result_id = %result_id, "Diagnostic result deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory::MemoryStore;
    use crate::db::seed::seed_catalog;
    use crate::domain::models::Role;

    async fn service_with_catalog() -> DiagnosticService {
        let store = Arc::new(MemoryStore::new());
        seed_catalog(store.as_ref()).await.unwrap();
        DiagnosticService::new(store.clone(), store, NeutralPolicy::ExcludeFromMax)
    }

    fn user() -> Identity {
        Identity::User {
            id: Uuid::new_v4(),
            role: Role::Member,
        }
    }

    async fn complete_answers(service: &DiagnosticService) -> HashMap<Uuid, String> {
        let snapshot = service.catalog.snapshot().await.unwrap();
        snapshot
            .questions()
            .map(|q| (q.id, q.positive_answer.as_str().to_string()))
            .collect()
    }

    #[tokio::test]
    async fn submit_scores_and_persists() {
        let service = service_with_catalog().await;
        let caller = user();
        let answers = complete_answers(&service).await;

        let result = service
            .submit(&caller, serde_json::json!({"empresa": "Acme"}), answers)
            .await
            .unwrap();

        assert_eq!(result.user_id, caller.user_id().unwrap());
        assert_eq!(result.total_score, result.max_possible_score);
        assert_eq!(result.percentage_score, 100.0);

        let fetched = service.get(&caller, result.id).await.unwrap();
        assert_eq!(fetched.id, result.id);
    }

    #[tokio::test]
    async fn anonymous_submission_is_rejected_before_any_work() {
        let service = service_with_catalog().await;
        let answers = complete_answers(&service).await;

        let err = service
            .submit(
                &Identity::Anonymous,
                serde_json::json!({"empresa": "Acme"}),
                answers,
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Access(AccessError::NotAuthenticated)
        ));
    }

    #[tokio::test]
    async fn null_company_data_is_rejected() {
        let service = service_with_catalog().await;
        let answers = complete_answers(&service).await;

        let err = service
            .submit(&user(), serde_json::Value::Null, answers)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Validation(ValidationError::MissingCompanyData)
        ));
    }

    #[tokio::test]
    async fn incomplete_submission_persists_nothing() {
        let service = service_with_catalog().await;
        let caller = user();
        let mut answers = complete_answers(&service).await;
        let (&dropped, _) = answers.iter().next().unwrap();
        answers.remove(&dropped);

        let err = service
            .submit(&caller, serde_json::json!({"empresa": "Acme"}), answers)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Validation(ValidationError::MissingAnswer { question_id })
                if question_id == dropped
        ));
        assert!(service.list(&caller).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn owners_cannot_see_each_others_results() {
        let service = service_with_catalog().await;
        let alice = user();
        let bob = user();
        let answers = complete_answers(&service).await;

        let result = service
            .submit(&alice, serde_json::json!({"empresa": "Acme"}), answers)
            .await
            .unwrap();

        let err = service.get(&bob, result.id).await.unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Access(AccessError::NotFoundOrForbidden)
        ));

        let err = service.delete(&bob, result.id).await.unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Access(AccessError::NotFoundOrForbidden)
        ));

        // The same error shape as a genuinely absent id, so nothing leaks.
        let err = service.get(&bob, Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Access(AccessError::NotFoundOrForbidden)
        ));
    }

    #[tokio::test]
    async fn list_returns_only_own_results_newest_first() {
        let service = service_with_catalog().await;
        let alice = user();
        let bob = user();
        let answers = complete_answers(&service).await;

        let first = service
            .submit(&alice, serde_json::json!({"n": 1}), answers.clone())
            .await
            .unwrap();
        let second = service
            .submit(&alice, serde_json::json!({"n": 2}), answers.clone())
            .await
            .unwrap();
        service
            .submit(&bob, serde_json::json!({"n": 3}), answers)
            .await
            .unwrap();

        let listed = service.list(&alice).await.unwrap();
        assert_eq!(
            listed.iter().map(|r| r.id).collect::<Vec<_>>(),
            vec![second.id, first.id]
        );
    }

    #[tokio::test]
    async fn owner_delete_then_redelete_reports_not_found() {
        let service = service_with_catalog().await;
        let caller = user();
        let answers = complete_answers(&service).await;

        let result = service
            .submit(&caller, serde_json::json!({"empresa": "Acme"}), answers)
            .await
            .unwrap();

        service.delete(&caller, result.id).await.unwrap();
        let err = service.delete(&caller, result.id).await.unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Access(AccessError::NotFoundOrForbidden)
        ));
    }
}

pub mod catalog;
pub mod diagnostics;
pub mod session;
pub mod settings;

use crate::db::StoreError;
use crate::policy::AccessError;
use crate::scoring::ValidationError;
use crate::services::{CatalogError, ServiceError};
use crate::state::SharedState;
use axum::{http::StatusCode, routing::get, Json, Router};
use serde::Serialize;
use uuid::Uuid;

async fn health() -> &'static str {
    "OK"
}

pub fn routes(state: SharedState) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/diagnostics", diagnostics::router(state.clone()))
        .nest("/catalog", catalog::router(state.clone()))
        .nest("/settings", settings::router(state))
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question_id: Option<Uuid>,
}

pub(crate) type Rejection = (StatusCode, Json<ErrorBody>);

fn body(error: String, question_id: Option<Uuid>) -> Json<ErrorBody> {
    Json(ErrorBody { error, question_id })
}

fn reject_validation(err: ValidationError) -> Rejection {
    let question_id = match &err {
        ValidationError::MissingAnswer { question_id }
        | ValidationError::IllegalAnswer { question_id, .. } => Some(*question_id),
        ValidationError::MissingCompanyData => None,
    };
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        body(err.to_string(), question_id),
    )
}

fn reject_access(err: AccessError) -> Rejection {
    let status = match err {
        AccessError::NotAuthenticated => StatusCode::UNAUTHORIZED,
        AccessError::NotFoundOrForbidden => StatusCode::NOT_FOUND,
    };
    (status, body(err.to_string(), None))
}

fn reject_store(err: StoreError) -> Rejection {
    match err {
        StoreError::Unavailable(_) => {
            tracing::error!("Persistence failure: {}", err);
            // Retry-safe for the caller: nothing was partially written.
            (StatusCode::SERVICE_UNAVAILABLE, body(err.to_string(), None))
        }
        StoreError::UnknownPillar(_) => {
            (StatusCode::UNPROCESSABLE_ENTITY, body(err.to_string(), None))
        }
    }
}

pub(crate) fn reject_service(err: ServiceError) -> Rejection {
    match err {
        ServiceError::Validation(err) => reject_validation(err),
        ServiceError::Access(err) => reject_access(err),
        ServiceError::Store(err) => reject_store(err),
    }
}

pub(crate) fn reject_catalog(err: CatalogError) -> Rejection {
    match err {
        CatalogError::Access(err) => reject_access(err),
        CatalogError::Store(err) => reject_store(err),
        CatalogError::EmptyName
        | CatalogError::EmptyText
        | CatalogError::InvalidPoints
        | CatalogError::NeutralPositiveAnswer => {
            (StatusCode::UNPROCESSABLE_ENTITY, body(err.to_string(), None))
        }
    }
}

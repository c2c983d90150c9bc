use crate::domain::models::DiagnosticResult;
use crate::state::SharedState;
use crate::web::session::UserSession;
use crate::web::{reject_service, Rejection};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use std::collections::HashMap;
use uuid::Uuid;

pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/", get(list).post(submit))
        .route("/:id", get(get_one).delete(delete_one))
        .with_state(state)
}

#[derive(Deserialize)]
struct SubmitPayload {
    company_data: serde_json::Value,
    answers: HashMap<Uuid, String>,
}

async fn submit(
    UserSession(identity): UserSession,
    State(state): State<SharedState>,
    Json(payload): Json<SubmitPayload>,
) -> Result<(StatusCode, Json<DiagnosticResult>), Rejection> {
    let result = state
        .diagnostics
        .submit(&identity, payload.company_data, payload.answers)
        .await
        .map_err(reject_service)?;
    Ok((StatusCode::CREATED, Json(result)))
}

async fn list(
    UserSession(identity): UserSession,
    State(state): State<SharedState>,
) -> Result<Json<Vec<DiagnosticResult>>, Rejection> {
    let results = state
        .diagnostics
        .list(&identity)
        .await
        .map_err(reject_service)?;
    Ok(Json(results))
}

async fn get_one(
    UserSession(identity): UserSession,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<DiagnosticResult>, Rejection> {
    let result = state
        .diagnostics
        .get(&identity, id)
        .await
        .map_err(reject_service)?;
    Ok(Json(result))
}

async fn delete_one(
    UserSession(identity): UserSession,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, Rejection> {
    state
        .diagnostics
        .delete(&identity, id)
        .await
        .map_err(reject_service)?;
    Ok(StatusCode::NO_CONTENT)
}

use crate::domain::models::{
    CatalogSnapshot, NewPillar, NewQuestion, Pillar, PillarPatch, Question, QuestionPatch,
};
use crate::state::SharedState;
use crate::web::session::UserSession;
use crate::web::{reject_catalog, Rejection};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use uuid::Uuid;

pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/", get(snapshot))
        .route("/pillars", post(create_pillar))
        .route("/pillars/:id", put(update_pillar).delete(delete_pillar))
        .route("/questions", post(create_question))
        .route("/questions/:id", put(update_question).delete(delete_question))
        .with_state(state)
}

async fn snapshot(
    UserSession(identity): UserSession,
    State(state): State<SharedState>,
) -> Result<Json<CatalogSnapshot>, Rejection> {
    let snapshot = state
        .catalog
        .snapshot(&identity)
        .await
        .map_err(reject_catalog)?;
    Ok(Json(snapshot))
}

async fn create_pillar(
    UserSession(identity): UserSession,
    State(state): State<SharedState>,
    Json(payload): Json<NewPillar>,
) -> Result<(StatusCode, Json<Pillar>), Rejection> {
    let pillar = state
        .catalog
        .create_pillar(&identity, payload)
        .await
        .map_err(reject_catalog)?;
    Ok((StatusCode::CREATED, Json(pillar)))
}

async fn update_pillar(
    UserSession(identity): UserSession,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<PillarPatch>,
) -> Result<Json<Pillar>, Rejection> {
    let pillar = state
        .catalog
        .update_pillar(&identity, id, payload)
        .await
        .map_err(reject_catalog)?;
    Ok(Json(pillar))
}

async fn delete_pillar(
    UserSession(identity): UserSession,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, Rejection> {
    state
        .catalog
        .delete_pillar(&identity, id)
        .await
        .map_err(reject_catalog)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn create_question(
    UserSession(identity): UserSession,
    State(state): State<SharedState>,
    Json(payload): Json<NewQuestion>,
) -> Result<(StatusCode, Json<Question>), Rejection> {
    let question = state
        .catalog
        .create_question(&identity, payload)
        .await
        .map_err(reject_catalog)?;
    Ok((StatusCode::CREATED, Json(question)))
}

async fn update_question(
    UserSession(identity): UserSession,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<QuestionPatch>,
) -> Result<Json<Question>, Rejection> {
    let question = state
        .catalog
        .update_question(&identity, id, payload)
        .await
        .map_err(reject_catalog)?;
    Ok(Json(question))
}

async fn delete_question(
    UserSession(identity): UserSession,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, Rejection> {
    state
        .catalog
        .delete_question(&identity, id)
        .await
        .map_err(reject_catalog)?;
    Ok(StatusCode::NO_CONTENT)
}

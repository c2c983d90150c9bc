use crate::domain::models::{Identity, Settings, SettingsPatch};
use crate::state::SharedState;
use crate::web::session::UserSession;
use crate::web::{reject_catalog, Rejection};
use axum::{
    extract::State,
    routing::get,
    Json, Router,
};

pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/", get(read).put(update))
        .with_state(state)
}

// Branding is public so unauthenticated pages can render it.
async fn read(
    session: Option<UserSession>,
    State(state): State<SharedState>,
) -> Result<Json<Settings>, Rejection> {
    let identity = session
        .map(|UserSession(identity)| identity)
        .unwrap_or(Identity::Anonymous);
    let settings = state
        .catalog
        .settings(&identity)
        .await
        .map_err(reject_catalog)?;
    Ok(Json(settings))
}

async fn update(
    UserSession(identity): UserSession,
    State(state): State<SharedState>,
    Json(payload): Json<SettingsPatch>,
) -> Result<Json<Settings>, Rejection> {
    let settings = state
        .catalog
        .update_settings(&identity, payload)
        .await
        .map_err(reject_catalog)?;
    Ok(Json(settings))
}

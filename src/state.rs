use crate::services::{CatalogService, DiagnosticService};
use std::sync::Arc;

pub struct AppState {
    pub diagnostics: DiagnosticService,
    pub catalog: CatalogService,
    pub session_key: Vec<u8>,
}

pub type SharedState = Arc<AppState>;

//! Class configuration endpoints
//!
//! GET returns the in-memory document; PUT validates, persists the whole
//! document, then replaces the in-memory copy. There is no per-field
//! merge.

use crate::{ApiError, ApiResult, AppState};
use axum::{
    extract::State,
    routing::{get, put},
    Json, Router,
};
use sesa_common::config::ClassConfig;

pub fn config_routes() -> Router<AppState> {
    Router::new()
        .route("/config", get(get_config))
        .route("/config", put(put_config))
}

async fn get_config(State(state): State<AppState>) -> Json<ClassConfig> {
    let config = state.class_config.read().await;
    Json(config.clone())
}

async fn put_config(
    State(state): State<AppState>,
    Json(new_config): Json<ClassConfig>,
) -> ApiResult<Json<ClassConfig>> {
    if new_config.university.trim().is_empty() {
        return Err(ApiError::BadRequest("大学名を入力してください".to_string()));
    }
    if new_config.classes.iter().any(|c| c.trim().is_empty()) {
        return Err(ApiError::BadRequest(
            "クラス名に空文字は使えません".to_string(),
        ));
    }
    if new_config.tasks.iter().any(|t| t.trim().is_empty()) {
        return Err(ApiError::BadRequest(
            "課題名に空文字は使えません".to_string(),
        ));
    }

    new_config.save(&state.class_config_path)?;

    let mut config = state.class_config.write().await;
    *config = new_config.clone();

    tracing::info!(
        classes = new_config.classes.len(),
        tasks = new_config.tasks.len(),
        "Class config replaced"
    );

    Ok(Json(new_config))
}

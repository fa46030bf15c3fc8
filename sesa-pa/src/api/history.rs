//! History, statistics and export endpoints

use crate::db::history;
use crate::export::history_to_csv;
use crate::models::HistoryRecord;
use crate::{ApiResult, AppState};
use axum::{
    extract::{Path, State},
    http::header,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use chrono::Utc;

pub fn history_routes() -> Router<AppState> {
    Router::new()
        .route("/history", get(list_history))
        .route("/history/student/:student_id", get(student_history))
        .route("/stats/classes", get(class_statistics))
        .route("/export/csv", get(export_csv))
}

async fn list_history(State(state): State<AppState>) -> ApiResult<Json<Vec<HistoryRecord>>> {
    let records = history::list_all(&state.db).await?;
    Ok(Json(records))
}

async fn student_history(
    State(state): State<AppState>,
    Path(student_id): Path<String>,
) -> ApiResult<Json<Vec<HistoryRecord>>> {
    let records = history::list_by_student(&state.db, &student_id).await?;
    Ok(Json(records))
}

async fn class_statistics(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<history::ClassStats>>> {
    let stats = history::class_stats(&state.db).await?;
    Ok(Json(stats))
}

async fn export_csv(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let records = history::list_all(&state.db).await?;
    let csv = history_to_csv(&records);

    let filename = format!("sesa_history_{}.csv", Utc::now().format("%Y%m%d_%H%M%S"));

    Ok((
        [
            (
                header::CONTENT_TYPE,
                "text/csv; charset=utf-8".to_string(),
            ),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        csv,
    ))
}

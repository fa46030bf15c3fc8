//! Database layer for sesa-pa
//!
//! SQLite via sqlx. The schema is created on pool initialization; the
//! single `assessments` table holds the append-only history.

pub mod history;

use sesa_common::Result;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use std::path::Path;

/// Initialize the database pool and ensure the schema exists
pub async fn init_database_pool(db_path: &Path) -> Result<SqlitePool> {
    if let Some(parent) = db_path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&db_url)
        .await?;

    create_schema(&pool).await?;

    tracing::info!(path = %db_path.display(), "Database initialized");
    Ok(pool)
}

async fn create_schema(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS assessments (
            id TEXT PRIMARY KEY,
            recorded_at TEXT NOT NULL,
            student_id TEXT NOT NULL,
            student_name TEXT NOT NULL DEFAULT '',
            class_group TEXT NOT NULL DEFAULT '',
            task_type TEXT NOT NULL,
            task_name TEXT NOT NULL DEFAULT '',
            target_text TEXT NOT NULL DEFAULT '',
            transcription TEXT NOT NULL DEFAULT '',
            accuracy REAL NOT NULL,
            fluency REAL NOT NULL,
            prosody REAL NOT NULL,
            completeness REAL NOT NULL,
            total_score REAL NOT NULL,
            band TEXT NOT NULL,
            cefr TEXT NOT NULL,
            toefl TEXT NOT NULL,
            ielts TEXT NOT NULL,
            mispronounced_words TEXT NOT NULL DEFAULT '',
            phoneme_errors TEXT NOT NULL DEFAULT '',
            feedback TEXT NOT NULL DEFAULT '',
            processing_seconds REAL NOT NULL DEFAULT 0
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_assessments_recorded_at ON assessments(recorded_at)",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_assessments_student_id ON assessments(student_id)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

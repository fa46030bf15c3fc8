//! History store operations
//!
//! Append-only with a retention ceiling: inserting a record that would
//! push the table past the ceiling first evicts the oldest rows, inside
//! the same transaction, so the invariant holds under concurrent writers.

use crate::models::HistoryRecord;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sesa_common::Result;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

/// Default maximum number of retained records
pub const DEFAULT_RETENTION_CEILING: i64 = 1000;

/// Append a record, evicting the oldest rows if the ceiling would be
/// exceeded
pub async fn append_record(
    pool: &SqlitePool,
    record: &HistoryRecord,
    retention_ceiling: i64,
) -> Result<()> {
    let mut tx = pool.begin().await?;

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM assessments")
        .fetch_one(&mut *tx)
        .await?;

    // Evict before insert so the table never exceeds the ceiling
    let overflow = count + 1 - retention_ceiling;
    if overflow > 0 {
        sqlx::query(
            r#"
            DELETE FROM assessments WHERE id IN (
                SELECT id FROM assessments
                ORDER BY recorded_at ASC, id ASC
                LIMIT ?
            )
            "#,
        )
        .bind(overflow)
        .execute(&mut *tx)
        .await?;

        tracing::info!(evicted = overflow, "History retention ceiling reached");
    }

    sqlx::query(
        r#"
        INSERT INTO assessments (
            id, recorded_at, student_id, student_name, class_group,
            task_type, task_name, target_text, transcription,
            accuracy, fluency, prosody, completeness, total_score,
            band, cefr, toefl, ielts,
            mispronounced_words, phoneme_errors, feedback, processing_seconds
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&record.id)
    .bind(record.recorded_at.to_rfc3339())
    .bind(&record.student_id)
    .bind(&record.student_name)
    .bind(&record.class_group)
    .bind(&record.task_type)
    .bind(&record.task_name)
    .bind(&record.target_text)
    .bind(&record.transcription)
    .bind(record.accuracy)
    .bind(record.fluency)
    .bind(record.prosody)
    .bind(record.completeness)
    .bind(record.total_score)
    .bind(&record.band)
    .bind(&record.cefr)
    .bind(&record.toefl)
    .bind(&record.ielts)
    .bind(&record.mispronounced_words)
    .bind(&record.phoneme_errors)
    .bind(&record.feedback)
    .bind(record.processing_seconds)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(())
}

/// All records, most recent first
pub async fn list_all(pool: &SqlitePool) -> Result<Vec<HistoryRecord>> {
    let rows = sqlx::query("SELECT * FROM assessments ORDER BY recorded_at DESC, id DESC")
        .fetch_all(pool)
        .await?;

    rows.iter().map(row_to_record).collect()
}

/// One student's records, most recent first
pub async fn list_by_student(pool: &SqlitePool, student_id: &str) -> Result<Vec<HistoryRecord>> {
    let rows = sqlx::query(
        "SELECT * FROM assessments WHERE student_id = ? ORDER BY recorded_at DESC, id DESC",
    )
    .bind(student_id)
    .fetch_all(pool)
    .await?;

    rows.iter().map(row_to_record).collect()
}

/// Current number of retained records
pub async fn count(pool: &SqlitePool) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM assessments")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

/// Per-class aggregate over retained records
#[derive(Debug, Clone, Serialize)]
pub struct ClassStats {
    pub class_group: String,
    pub student_count: i64,
    pub assessment_count: i64,
    pub average_total: f64,
    pub min_total: f64,
    pub max_total: f64,
}

/// Aggregate statistics per class group
///
/// Records with no class selected are excluded.
pub async fn class_stats(pool: &SqlitePool) -> Result<Vec<ClassStats>> {
    let rows = sqlx::query(
        r#"
        SELECT class_group,
               COUNT(DISTINCT student_id) AS student_count,
               COUNT(*) AS assessment_count,
               AVG(total_score) AS average_total,
               MIN(total_score) AS min_total,
               MAX(total_score) AS max_total
        FROM assessments
        WHERE class_group != ''
        GROUP BY class_group
        ORDER BY class_group
        "#,
    )
    .fetch_all(pool)
    .await?;

    let mut stats = Vec::with_capacity(rows.len());
    for row in &rows {
        stats.push(ClassStats {
            class_group: row.try_get("class_group")?,
            student_count: row.try_get("student_count")?,
            assessment_count: row.try_get("assessment_count")?,
            average_total: row.try_get("average_total")?,
            min_total: row.try_get("min_total")?,
            max_total: row.try_get("max_total")?,
        });
    }
    Ok(stats)
}

fn row_to_record(row: &SqliteRow) -> Result<HistoryRecord> {
    let recorded_at: DateTime<Utc> = row.try_get("recorded_at")?;

    Ok(HistoryRecord {
        id: row.try_get("id")?,
        recorded_at,
        student_id: row.try_get("student_id")?,
        student_name: row.try_get("student_name")?,
        class_group: row.try_get("class_group")?,
        task_type: row.try_get("task_type")?,
        task_name: row.try_get("task_name")?,
        target_text: row.try_get("target_text")?,
        transcription: row.try_get("transcription")?,
        accuracy: row.try_get("accuracy")?,
        fluency: row.try_get("fluency")?,
        prosody: row.try_get("prosody")?,
        completeness: row.try_get("completeness")?,
        total_score: row.try_get("total_score")?,
        band: row.try_get("band")?,
        cefr: row.try_get("cefr")?,
        toefl: row.try_get("toefl")?,
        ielts: row.try_get("ielts")?,
        mispronounced_words: row.try_get("mispronounced_words")?,
        phoneme_errors: row.try_get("phoneme_errors")?,
        feedback: row.try_get("feedback")?,
        processing_seconds: row.try_get("processing_seconds")?,
    })
}

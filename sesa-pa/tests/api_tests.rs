//! HTTP API tests
//!
//! Routes exercised in-process with `tower::ServiceExt::oneshot`; no
//! network, real SQLite in a temp dir, fake external collaborators.

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use sesa_common::{Error, Result};
use sesa_pa::db::{self, history};
use sesa_pa::models::{AssessmentResult, HistoryRecord, SubScores};
use sesa_pa::services::{
    AssessmentRunner, AudioAcquirer, AudioSource, FeedbackGenerator, FeedbackInput, Recognizer,
};
use sesa_pa::{build_router, AppState};
use sesa_common::config::ClassConfig;
use sqlx::SqlitePool;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

struct StubAcquirer {
    dir: PathBuf,
}

#[async_trait]
impl AudioAcquirer for StubAcquirer {
    async fn acquire(&self, _source: AudioSource) -> Result<PathBuf> {
        let path = self.dir.join("audio.wav");
        tokio::fs::write(&path, b"RIFF").await?;
        Ok(path)
    }
}

struct StubRecognizer;

#[async_trait]
impl Recognizer for StubRecognizer {
    async fn transcribe(&self, _audio: &Path, _language: &str) -> Result<String> {
        Ok("Hello world.".to_string())
    }

    async fn assess(
        &self,
        _audio: &Path,
        _language: &str,
        _reference_text: &str,
    ) -> Result<AssessmentResult> {
        Ok(AssessmentResult {
            transcription: "Hello world.".to_string(),
            scores: SubScores {
                accuracy: 90.0,
                fluency: 80.0,
                prosody: 70.0,
                completeness: 60.0,
            },
            words: Vec::new(),
        })
    }
}

struct StubFeedback;

#[async_trait]
impl FeedbackGenerator for StubFeedback {
    async fn generate(&self, _input: &FeedbackInput) -> Result<String> {
        Ok("よくできました。".to_string())
    }
}

struct TestApp {
    _dir: TempDir,
    pool: SqlitePool,
    router: axum::Router,
}

async fn test_app() -> TestApp {
    let dir = TempDir::new().unwrap();
    let pool = db::init_database_pool(&dir.path().join("sesa.db"))
        .await
        .unwrap();

    let runner = Arc::new(AssessmentRunner::new(
        pool.clone(),
        Arc::new(StubAcquirer {
            dir: dir.path().to_path_buf(),
        }),
        Arc::new(StubRecognizer),
        Arc::new(StubFeedback),
        1000,
    ));

    let state = AppState::new(
        pool.clone(),
        runner,
        ClassConfig::default(),
        dir.path().join("class_config.toml"),
    );

    TestApp {
        router: build_router(state),
        pool,
        _dir: dir,
    }
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn health_reports_module_identity() {
    let app = test_app().await;

    let response = app
        .router
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["module"], "sesa-pa");
}

#[tokio::test]
async fn history_starts_empty() {
    let app = test_app().await;

    let response = app
        .router
        .oneshot(Request::get("/history").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn assess_requires_a_single_source() {
    let app = test_app().await;

    let body = serde_json::json!({
        "student_id": "02251234",
        "task_type": "音読課題",
        "target_text": "Hello"
        // no upload / youtube_url / gdrive_url
    });

    let response = app
        .router
        .oneshot(
            Request::post("/assess")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn assess_requires_student_id() {
    let app = test_app().await;

    let body = serde_json::json!({
        "student_id": "",
        "youtube_url": "https://example.com/v"
    });

    let response = app
        .router
        .oneshot(
            Request::post("/assess")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn assess_end_to_end_with_stubs() {
    let app = test_app().await;

    let body = serde_json::json!({
        "student_id": "02251234",
        "student_name": "山田太郎",
        "class_group": "英語I",
        "task_type": "音読課題",
        "task_name": "Unit 1",
        "target_text": "Hello world.",
        "youtube_url": "https://example.com/v"
    });

    let response = app
        .router
        .oneshot(
            Request::post("/assess")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["total_score"], 81.5);
    assert_eq!(json["band"], "B");
    assert_eq!(json["feedback"], "よくできました。");

    let stored = history::list_all(&app.pool).await.unwrap();
    assert_eq!(stored.len(), 1);
}

#[tokio::test]
async fn student_history_route_filters() {
    let app = test_app().await;
    seed_record(&app.pool, "seed0001", "02251111").await;
    seed_record(&app.pool, "seed0002", "02252222").await;

    let response = app
        .router
        .oneshot(
            Request::get("/history/student/02251111")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let records = json.as_array().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["id"], "seed0001");
}

#[tokio::test]
async fn config_round_trip_persists_to_disk() {
    let app = test_app().await;

    let response = app
        .router
        .clone()
        .oneshot(Request::get("/config").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["university"], "北海道大学");

    let update = serde_json::json!({
        "university": "テスト大学",
        "department": "テスト学部",
        "classes": ["クラスA"],
        "tasks": ["課題1"]
    });
    let response = app
        .router
        .clone()
        .oneshot(
            Request::put("/config")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(update.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .router
        .oneshot(Request::get("/config").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let json = body_json(response).await;
    assert_eq!(json["university"], "テスト大学");
    assert_eq!(json["classes"], serde_json::json!(["クラスA"]));
}

#[tokio::test]
async fn config_rejects_blank_entries() {
    let app = test_app().await;

    let update = serde_json::json!({
        "university": "テスト大学",
        "department": "テスト学部",
        "classes": ["クラスA", "  "],
        "tasks": ["課題1"]
    });
    let response = app
        .router
        .oneshot(
            Request::put("/config")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(update.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn csv_export_sets_attachment_headers() {
    let app = test_app().await;
    seed_record(&app.pool, "seed0001", "02251111").await;

    let response = app
        .router
        .oneshot(Request::get("/export/csv").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(content_type.starts_with("text/csv"));
    let disposition = response
        .headers()
        .get(header::CONTENT_DISPOSITION)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(disposition.contains("attachment"));
    assert!(disposition.contains("sesa_history_"));

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(text.starts_with('\u{FEFF}'));
    assert!(text.contains("seed0001"));
}

#[tokio::test]
async fn class_stats_route_aggregates() {
    let app = test_app().await;
    seed_record(&app.pool, "seed0001", "02251111").await;
    seed_record(&app.pool, "seed0002", "02252222").await;

    let response = app
        .router
        .oneshot(Request::get("/stats/classes").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let stats = json.as_array().unwrap();
    assert_eq!(stats.len(), 1);
    assert_eq!(stats[0]["class_group"], "英語I");
    assert_eq!(stats[0]["student_count"], 2);
}

async fn seed_record(pool: &SqlitePool, id: &str, student_id: &str) {
    let record = HistoryRecord {
        id: id.to_string(),
        recorded_at: chrono::Utc::now(),
        student_id: student_id.to_string(),
        student_name: "テスト学生".to_string(),
        class_group: "英語I".to_string(),
        task_type: "reading".to_string(),
        task_name: "Unit 1".to_string(),
        target_text: "Hello".to_string(),
        transcription: "Hello".to_string(),
        accuracy: 90.0,
        fluency: 80.0,
        prosody: 70.0,
        completeness: 60.0,
        total_score: 81.5,
        band: "B".to_string(),
        cefr: "B2".to_string(),
        toefl: "22/30".to_string(),
        ielts: "7.0".to_string(),
        mispronounced_words: "特になし".to_string(),
        phoneme_errors: "特になし".to_string(),
        feedback: "よくできました".to_string(),
        processing_seconds: 2.0,
    };
    history::append_record(pool, &record, 1000).await.unwrap();
}

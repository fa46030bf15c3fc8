//! sesa-pa - Pronunciation Assessment Service
//!
//! HTTP service that scores English recordings for Japanese university
//! classes: Azure Speech pronunciation assessment, weighted composite
//! scoring with proficiency-scale mappings, OpenAI narrative feedback,
//! and an append-only assessment history with CSV export.

use anyhow::Result;
use sesa_common::config::{default_class_config_path, default_service_toml_path, ClassConfig, Credentials};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use sesa_pa::services::{
    AssessmentRunner, AudioConverter, AzureSpeechClient, GoogleDriveFetcher, LocalAudioAcquirer,
    OpenAiFeedbackClient, YouTubeFetcher,
};
use sesa_pa::AppState;

const BIND_ADDR: &str = "127.0.0.1:5731";

#[tokio::main]
async fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting sesa-pa (Pronunciation Assessment) service");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    // Credentials are fatal at startup: without Azure Speech nothing works
    let credentials = Credentials::resolve(&default_service_toml_path())
        .map_err(|e| anyhow::anyhow!("Credential resolution failed: {}", e))?;

    let db_path = database_path();
    info!("Database: {}", db_path.display());
    let db_pool = sesa_pa::db::init_database_pool(&db_path).await?;

    let class_config_path = default_class_config_path();
    let class_config = ClassConfig::load(&class_config_path)
        .map_err(|e| anyhow::anyhow!("Class config load failed: {}", e))?;
    info!(
        classes = class_config.classes.len(),
        tasks = class_config.tasks.len(),
        "Class config loaded"
    );

    let work_dir = std::env::temp_dir().join("sesa-pa");

    let recognizer = Arc::new(AzureSpeechClient::new(
        credentials.azure_region,
        credentials.azure_key,
    )?);
    let feedback = Arc::new(OpenAiFeedbackClient::new(credentials.openai_api_key)?);
    let acquirer = Arc::new(LocalAudioAcquirer::new(
        AudioConverter::new(tool_path("SESA_FFMPEG_PATH", "ffmpeg"), work_dir.clone()),
        Arc::new(YouTubeFetcher::new(
            tool_path("SESA_YTDLP_PATH", "yt-dlp"),
            work_dir.clone(),
        )),
        Arc::new(GoogleDriveFetcher::new(work_dir)?),
    ));

    let runner = Arc::new(AssessmentRunner::new(
        db_pool.clone(),
        acquirer,
        recognizer,
        feedback,
        sesa_pa::db::history::DEFAULT_RETENTION_CEILING,
    ));

    let state = AppState::new(db_pool, runner, class_config, class_config_path);
    let app = sesa_pa::build_router(state);

    let listener = tokio::net::TcpListener::bind(BIND_ADDR).await?;
    info!("Listening on http://{}", BIND_ADDR);
    info!("Health check: http://{}/health", BIND_ADDR);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Database location: `SESA_DB_PATH` override, else the platform data dir
fn database_path() -> PathBuf {
    if let Ok(path) = std::env::var("SESA_DB_PATH") {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
    }
    dirs::data_local_dir()
        .map(|d| d.join("sesa").join("sesa.db"))
        .unwrap_or_else(|| PathBuf::from("sesa.db"))
}

/// External tool location: ENV override, else rely on PATH lookup
fn tool_path(env_name: &str, default: &str) -> String {
    match std::env::var(env_name) {
        Ok(path) if !path.trim().is_empty() => path,
        _ => default.to_string(),
    }
}

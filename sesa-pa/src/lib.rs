//! sesa-pa library interface
//!
//! Exposes public APIs for integration testing

pub mod api;
pub mod db;
pub mod error;
pub mod export;
pub mod models;
pub mod scoring;
pub mod services;

pub use crate::error::{ApiError, ApiResult};

use axum::Router;
use chrono::{DateTime, Utc};
use sesa_common::config::ClassConfig;
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::services::AssessmentRunner;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Assessment pipeline orchestrator
    pub runner: Arc<AssessmentRunner>,
    /// Class configuration document (read at startup, replaced on edits)
    pub class_config: Arc<RwLock<ClassConfig>>,
    /// Where the class configuration document is persisted
    pub class_config_path: PathBuf,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(
        db: SqlitePool,
        runner: Arc<AssessmentRunner>,
        class_config: ClassConfig,
        class_config_path: PathBuf,
    ) -> Self {
        Self {
            db,
            runner,
            class_config: Arc::new(RwLock::new(class_config)),
            class_config_path,
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::assessment_routes())
        .merge(api::history_routes())
        .merge(api::config_routes())
        .merge(api::health_routes())
        .with_state(state)
}

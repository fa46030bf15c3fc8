//! Cloud-drive share-link fetcher
//!
//! Resolves a Google Drive share URL to the direct-download endpoint and
//! streams the file into the work directory. A share link whose target is
//! not public serves an HTML confirmation page instead of the file; that
//! is reported as an acquisition error, not saved as audio.

use crate::services::AudioFetcher;
use async_trait::async_trait;
use sesa_common::{Error, Result};
use std::path::PathBuf;
use uuid::Uuid;

const DOWNLOAD_URL: &str = "https://drive.google.com/uc?export=download";

pub struct GoogleDriveFetcher {
    http: reqwest::Client,
    work_dir: PathBuf,
}

impl GoogleDriveFetcher {
    pub fn new(work_dir: PathBuf) -> Result<Self> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| Error::Internal(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { http, work_dir })
    }

    /// Extract the file id from either share-URL form:
    /// `.../file/d/<id>/...` or `...?id=<id>`
    fn extract_file_id(url: &str) -> Option<String> {
        if let Some(rest) = url.split("/file/d/").nth(1) {
            let id: String = rest
                .chars()
                .take_while(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
                .collect();
            if !id.is_empty() {
                return Some(id);
            }
        }

        for param in url.split(['?', '&']).skip(1) {
            if let Some(id) = param.strip_prefix("id=") {
                if !id.is_empty() {
                    return Some(id.to_string());
                }
            }
        }

        None
    }
}

#[async_trait]
impl AudioFetcher for GoogleDriveFetcher {
    async fn fetch(&self, url: &str) -> Result<PathBuf> {
        let file_id = Self::extract_file_id(url).ok_or_else(|| {
            Error::InvalidInput(format!("Google DriveのファイルIDを抽出できません: {}", url))
        })?;

        tokio::fs::create_dir_all(&self.work_dir).await?;

        tracing::info!(file_id = %file_id, "Fetching audio from shared drive");

        let response = self
            .http
            .get(format!("{}&id={}", DOWNLOAD_URL, file_id))
            .send()
            .await
            .map_err(|e| Error::Acquisition(format!("共有ファイルの取得に失敗: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::Acquisition(format!(
                "共有ファイルの取得に失敗: HTTP {}",
                response.status().as_u16()
            )));
        }

        // HTML means a permission/confirmation page, not the file itself
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();
        if content_type.contains("text/html") {
            return Err(Error::Acquisition(
                "共有設定が「リンクを知っている全員」になっているか確認してください".to_string(),
            ));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::Acquisition(format!("共有ファイルの読み込みに失敗: {}", e)))?;

        if bytes.is_empty() {
            return Err(Error::Acquisition("共有ファイルが空です".to_string()));
        }

        let path = self.work_dir.join(format!("{}.bin", Uuid::new_v4()));
        tokio::fs::write(&path, &bytes).await?;
        Ok(path)
    }
}

//! Video-host audio fetcher (yt-dlp)
//!
//! Downloads the audio track of a video URL into the work directory as an
//! mp3. yt-dlp picks the output extension itself, so after the run we scan
//! for the file carrying our uuid stem.

use crate::services::AudioFetcher;
use async_trait::async_trait;
use sesa_common::{Error, Result};
use std::path::PathBuf;
use std::process::Command;
use uuid::Uuid;

pub struct YouTubeFetcher {
    ytdlp_path: String,
    work_dir: PathBuf,
}

impl YouTubeFetcher {
    pub fn new(ytdlp_path: String, work_dir: PathBuf) -> Self {
        Self {
            ytdlp_path,
            work_dir,
        }
    }
}

#[async_trait]
impl AudioFetcher for YouTubeFetcher {
    async fn fetch(&self, url: &str) -> Result<PathBuf> {
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(Error::InvalidInput(format!("URLが不正です: {}", url)));
        }

        tokio::fs::create_dir_all(&self.work_dir).await?;

        let stem = Uuid::new_v4().to_string();
        let template = self.work_dir.join(format!("{}.%(ext)s", stem));
        let ytdlp = self.ytdlp_path.clone();
        let url_owned = url.to_string();

        tracing::info!(url = %url, "Fetching audio via yt-dlp");

        let result = tokio::task::spawn_blocking(move || {
            Command::new(&ytdlp)
                .arg("-x")
                .arg("--audio-format")
                .arg("mp3")
                .arg("--audio-quality")
                .arg("128K")
                .arg("-o")
                .arg(&template)
                .arg("--no-playlist")
                .arg(&url_owned)
                .output()
        })
        .await
        .map_err(|e| Error::Internal(format!("yt-dlp task join error: {}", e)))?;

        let command_output =
            result.map_err(|e| Error::Acquisition(format!("yt-dlp の起動に失敗: {}", e)))?;

        if !command_output.status.success() {
            let stderr = String::from_utf8_lossy(&command_output.stderr);
            return Err(Error::Acquisition(format!(
                "動画の音声取得に失敗しました: {}",
                stderr.chars().take(500).collect::<String>()
            )));
        }

        // yt-dlp decided the final extension; find the file by stem
        let mut entries = tokio::fs::read_dir(&self.work_dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path
                .file_stem()
                .and_then(|s| s.to_str())
                .map(|s| s == stem)
                .unwrap_or(false)
            {
                return Ok(path);
            }
        }

        Err(Error::Acquisition(
            "yt-dlp は成功しましたが出力ファイルが見つかりません".to_string(),
        ))
    }
}

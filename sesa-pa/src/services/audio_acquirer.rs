//! Audio acquisition front-end
//!
//! One entry point for the three source kinds: direct upload, video-host
//! URL, cloud-drive share link. Fetched or uploaded bytes land in the work
//! directory, then everything funnels through the ffmpeg converter so the
//! recognizer always sees the same waveform format.

use crate::services::{AudioConverter, AudioFetcher, AudioSource};
use async_trait::async_trait;
use sesa_common::{Error, Result};
use std::path::PathBuf;
use std::sync::Arc;
use uuid::Uuid;

pub struct LocalAudioAcquirer {
    converter: AudioConverter,
    youtube: Arc<dyn AudioFetcher>,
    gdrive: Arc<dyn AudioFetcher>,
}

impl LocalAudioAcquirer {
    pub fn new(
        converter: AudioConverter,
        youtube: Arc<dyn AudioFetcher>,
        gdrive: Arc<dyn AudioFetcher>,
    ) -> Self {
        Self {
            converter,
            youtube,
            gdrive,
        }
    }

    async fn write_upload(&self, filename: &str, data: &[u8]) -> Result<PathBuf> {
        if data.is_empty() {
            return Err(Error::InvalidInput(
                "アップロードされた音声ファイルが空です".to_string(),
            ));
        }

        tokio::fs::create_dir_all(self.converter.work_dir()).await?;

        // Keep the original extension so ffmpeg can sniff the container
        let extension = std::path::Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("bin");
        let path = self
            .converter
            .work_dir()
            .join(format!("{}.{}", Uuid::new_v4(), extension));

        tokio::fs::write(&path, data).await?;
        Ok(path)
    }
}

#[async_trait]
impl crate::services::AudioAcquirer for LocalAudioAcquirer {
    async fn acquire(&self, source: AudioSource) -> Result<PathBuf> {
        let raw = match source {
            AudioSource::Upload { filename, data } => {
                tracing::info!(filename = %filename, bytes = data.len(), "Acquiring uploaded audio");
                self.write_upload(&filename, &data).await?
            }
            AudioSource::YouTube { url } => self.youtube.fetch(&url).await?,
            AudioSource::GoogleDrive { url } => self.gdrive.fetch(&url).await?,
        };

        let wav = self.converter.to_recognizer_wav(&raw).await?;

        // The pre-conversion file is scratch; removal failure is harmless
        if raw != wav {
            let _ = tokio::fs::remove_file(&raw).await;
        }

        Ok(wav)
    }
}

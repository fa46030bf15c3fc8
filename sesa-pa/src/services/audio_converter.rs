//! Waveform normalization via ffmpeg
//!
//! The recognizer's REST endpoint expects single-channel 16kHz 16-bit PCM
//! WAV. Every acquired file, whatever its container, passes through one
//! ffmpeg invocation into a temp-named WAV in the work directory.

use sesa_common::{Error, Result};
use std::path::{Path, PathBuf};
use std::process::Command;
use uuid::Uuid;

/// Target sample rate for the recognizer
const TARGET_SAMPLE_RATE: &str = "16000";

/// Converts arbitrary audio/video files to recognizer-ready WAV
pub struct AudioConverter {
    ffmpeg_path: String,
    work_dir: PathBuf,
}

impl AudioConverter {
    pub fn new(ffmpeg_path: String, work_dir: PathBuf) -> Self {
        Self {
            ffmpeg_path,
            work_dir,
        }
    }

    /// Convert `input` to a mono 16kHz s16 WAV; returns the output path
    ///
    /// ffmpeg runs on the blocking pool. The output name is a fresh uuid
    /// so concurrent conversions never collide.
    pub async fn to_recognizer_wav(&self, input: &Path) -> Result<PathBuf> {
        tokio::fs::create_dir_all(&self.work_dir).await?;

        let output = self.work_dir.join(format!("{}.wav", Uuid::new_v4()));
        let ffmpeg = self.ffmpeg_path.clone();
        let input = input.to_path_buf();
        let output_for_task = output.clone();

        let result = tokio::task::spawn_blocking(move || {
            Command::new(&ffmpeg)
                .arg("-y")
                .arg("-i")
                .arg(&input)
                .arg("-ac")
                .arg("1")
                .arg("-ar")
                .arg(TARGET_SAMPLE_RATE)
                .arg("-sample_fmt")
                .arg("s16")
                .arg(&output_for_task)
                .output()
        })
        .await
        .map_err(|e| Error::Internal(format!("ffmpeg task join error: {}", e)))?;

        let command_output =
            result.map_err(|e| Error::Acquisition(format!("ffmpeg の起動に失敗: {}", e)))?;

        if !command_output.status.success() {
            let stderr = String::from_utf8_lossy(&command_output.stderr);
            return Err(Error::Acquisition(format!(
                "音声の変換に失敗しました (ffmpeg exit {}): {}",
                command_output.status.code().unwrap_or(-1),
                stderr.chars().take(500).collect::<String>()
            )));
        }

        if !output.exists() {
            return Err(Error::Acquisition(
                "ffmpeg は成功しましたが出力ファイルがありません".to_string(),
            ));
        }

        tracing::debug!(output = %output.display(), "Audio normalized to 16kHz mono WAV");
        Ok(output)
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }
}

//! Capability interfaces for external collaborators
//!
//! The orchestrator depends on these traits rather than concrete clients
//! so tests can substitute deterministic fakes for the cloud services.

use crate::models::{AssessmentResult, SubScores, TaskType};
use async_trait::async_trait;
use sesa_common::Result;
use std::path::{Path, PathBuf};

/// Where the learner's recording comes from; exactly one per assessment
#[derive(Debug, Clone)]
pub enum AudioSource {
    /// Direct file upload
    Upload { filename: String, data: Vec<u8> },
    /// Video-sharing host URL, fetched via yt-dlp
    YouTube { url: String },
    /// Cloud-drive share link
    GoogleDrive { url: String },
}

/// Turns an audio source into a local normalized waveform file
/// (single-channel, 16kHz, 16-bit WAV)
#[async_trait]
pub trait AudioAcquirer: Send + Sync {
    async fn acquire(&self, source: AudioSource) -> Result<PathBuf>;
}

/// Fetches a remote resource into a local encoded-audio file
#[async_trait]
pub trait AudioFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<PathBuf>;
}

/// Pronunciation-assessment recognizer collaborator
#[async_trait]
pub trait Recognizer: Send + Sync {
    /// Plain recognition: transcribe without a reference text
    async fn transcribe(&self, audio: &Path, language: &str) -> Result<String>;

    /// Reference-scored recognition: sub-scores plus the per-word /
    /// per-phoneme accuracy breakdown
    async fn assess(
        &self,
        audio: &Path,
        language: &str,
        reference_text: &str,
    ) -> Result<AssessmentResult>;
}

/// Everything the feedback generator needs to write a coaching comment
#[derive(Debug, Clone)]
pub struct FeedbackInput {
    pub transcription: String,
    pub target_text: String,
    pub scores: SubScores,
    pub mispronounced_words: String,
    pub phoneme_errors: String,
    pub task_type: TaskType,
}

/// Narrative feedback collaborator
///
/// Failures here are non-fatal to the pipeline; the orchestrator stores a
/// placeholder instead.
#[async_trait]
pub trait FeedbackGenerator: Send + Sync {
    async fn generate(&self, input: &FeedbackInput) -> Result<String>;
}

//! Azure Speech pronunciation-assessment client
//!
//! Calls the short-audio REST endpoint with a pronunciation-assessment
//! parameter header. The detailed response carries the four sub-scores and
//! a per-word / per-phoneme accuracy breakdown which we reduce to the
//! internal `AssessmentResult` shape.
//!
//! Every response field is optional on the wire; absent fields default
//! rather than failing deserialization so a sparse payload degrades to
//! empty summaries instead of an error.

use crate::models::{AssessmentResult, ErrorKind, PhonemeEntry, SubScores, WordEntry};
use crate::services::Recognizer;
use async_trait::async_trait;
use base64::Engine;
use serde::Deserialize;
use serde_json::json;
use sesa_common::{Error, Result};
use std::path::Path;

const USER_AGENT: &str = "SESA/0.1.0 (spoken-english scoring assistant)";

/// Content type for the normalized waveform we always send
const WAV_CONTENT_TYPE: &str = "audio/wav; codecs=audio/pcm; samplerate=16000";

/// Recognizer verdict for silence / unintelligible audio
const STATUS_SUCCESS: &str = "Success";

/// Azure Speech REST client
pub struct AzureSpeechClient {
    http: reqwest::Client,
    region: String,
    key: String,
}

impl AzureSpeechClient {
    pub fn new(region: String, key: String) -> Result<Self> {
        if region.trim().is_empty() || key.trim().is_empty() {
            return Err(Error::Config(
                "AZURE_SPEECH_REGION / AZURE_SPEECH_KEY が未設定".to_string(),
            ));
        }

        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| Error::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { http, region, key })
    }

    fn endpoint(&self, language: &str) -> String {
        format!(
            "https://{}.stt.speech.microsoft.com/speech/recognition/conversation/cognitiveservices/v1?language={}&format=detailed",
            self.region, language
        )
    }

    /// One recognition round trip; `pronunciation_config` switches between
    /// plain transcription and reference-scored assessment
    async fn recognize_once(
        &self,
        audio: &Path,
        language: &str,
        pronunciation_config: Option<String>,
    ) -> Result<SpeechResponse> {
        let wav_bytes = tokio::fs::read(audio)
            .await
            .map_err(|e| Error::Acquisition(format!("音声ファイルを読み込めません: {}", e)))?;

        let mut request = self
            .http
            .post(self.endpoint(language))
            .header("Ocp-Apim-Subscription-Key", &self.key)
            .header("Content-Type", WAV_CONTENT_TYPE)
            .header("Accept", "application/json")
            .body(wav_bytes);

        if let Some(config) = pronunciation_config {
            request = request.header("Pronunciation-Assessment", config);
        }

        let response = request
            .send()
            .await
            .map_err(|e| Error::Recognition(format!("Azure Speech へのリクエストに失敗: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Recognition(format!(
                "Azure Speech API error {}: {}",
                status.as_u16(),
                body
            )));
        }

        let parsed: SpeechResponse = response
            .json()
            .await
            .map_err(|e| Error::Recognition(format!("Azure Speech 応答の解析に失敗: {}", e)))?;

        // No-speech is a failure, not an empty success
        if parsed.recognition_status != STATUS_SUCCESS {
            return Err(Error::Recognition("音声を認識できませんでした".to_string()));
        }

        Ok(parsed)
    }

    /// Pronunciation-Assessment header value: base64-encoded JSON config
    fn pronunciation_config(reference_text: &str) -> String {
        let config = json!({
            "ReferenceText": reference_text,
            "GradingSystem": "HundredMark",
            "Granularity": "Phoneme",
            "EnableMiscue": true,
            "EnableProsodyAssessment": true,
        });
        base64::engine::general_purpose::STANDARD.encode(config.to_string())
    }
}

#[async_trait]
impl Recognizer for AzureSpeechClient {
    async fn transcribe(&self, audio: &Path, language: &str) -> Result<String> {
        let response = self.recognize_once(audio, language, None).await?;
        let text = response.display_text.unwrap_or_default();

        tracing::info!(chars = text.chars().count(), "Plain transcription completed");
        Ok(text)
    }

    async fn assess(
        &self,
        audio: &Path,
        language: &str,
        reference_text: &str,
    ) -> Result<AssessmentResult> {
        let config = Self::pronunciation_config(reference_text);
        let response = self.recognize_once(audio, language, Some(config)).await?;
        let result = response.into_assessment_result();

        tracing::info!(
            accuracy = result.scores.accuracy,
            fluency = result.scores.fluency,
            prosody = result.scores.prosody,
            completeness = result.scores.completeness,
            words = result.words.len(),
            "Pronunciation assessment completed"
        );

        Ok(result)
    }
}

// ============================================================================
// Wire types (Azure Speech detailed-format response, simplified)
// ============================================================================

#[derive(Debug, Deserialize)]
struct SpeechResponse {
    #[serde(rename = "RecognitionStatus", default)]
    recognition_status: String,
    #[serde(rename = "DisplayText", default)]
    display_text: Option<String>,
    #[serde(rename = "NBest", default)]
    n_best: Vec<NBestEntry>,
}

#[derive(Debug, Deserialize)]
struct NBestEntry {
    #[serde(rename = "Display", default)]
    display: Option<String>,
    #[serde(rename = "PronunciationAssessment", default)]
    pronunciation: Option<PronunciationScores>,
    #[serde(rename = "Words", default)]
    words: Vec<WireWord>,
}

#[derive(Debug, Deserialize)]
struct PronunciationScores {
    #[serde(rename = "AccuracyScore", default)]
    accuracy_score: Option<f64>,
    #[serde(rename = "FluencyScore", default)]
    fluency_score: Option<f64>,
    #[serde(rename = "ProsodyScore", default)]
    prosody_score: Option<f64>,
    #[serde(rename = "CompletenessScore", default)]
    completeness_score: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct WireWord {
    #[serde(rename = "Word", default)]
    word: String,
    #[serde(rename = "PronunciationAssessment", default)]
    pronunciation: Option<WireWordScores>,
    #[serde(rename = "Phonemes", default)]
    phonemes: Vec<WirePhoneme>,
}

#[derive(Debug, Deserialize)]
struct WireWordScores {
    #[serde(rename = "AccuracyScore", default)]
    accuracy_score: Option<f64>,
    #[serde(rename = "ErrorType", default)]
    error_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WirePhoneme {
    #[serde(rename = "Phoneme", default)]
    phoneme: String,
    #[serde(rename = "PronunciationAssessment", default)]
    pronunciation: Option<WirePhonemeScores>,
}

#[derive(Debug, Deserialize)]
struct WirePhonemeScores {
    #[serde(rename = "AccuracyScore", default)]
    accuracy_score: Option<f64>,
}

impl SpeechResponse {
    /// Reduce the wire shape to the internal result type
    ///
    /// Missing accuracies default to 100 and missing error types to None,
    /// so an entry without assessment data is never flagged downstream.
    fn into_assessment_result(self) -> AssessmentResult {
        let best = self.n_best.into_iter().next();
        let transcription = best
            .as_ref()
            .and_then(|b| b.display.clone())
            .or(self.display_text)
            .unwrap_or_default();

        let scores = best
            .as_ref()
            .and_then(|b| b.pronunciation.as_ref())
            .map(|p| SubScores {
                accuracy: round1(p.accuracy_score.unwrap_or(0.0)),
                fluency: round1(p.fluency_score.unwrap_or(0.0)),
                prosody: round1(p.prosody_score.unwrap_or(0.0)),
                completeness: round1(p.completeness_score.unwrap_or(0.0)),
            })
            .unwrap_or(SubScores {
                accuracy: 0.0,
                fluency: 0.0,
                prosody: 0.0,
                completeness: 0.0,
            });

        let words = best
            .map(|b| b.words)
            .unwrap_or_default()
            .into_iter()
            .map(|w| {
                let (accuracy, error_kind) = match &w.pronunciation {
                    Some(p) => (
                        p.accuracy_score.unwrap_or(100.0),
                        ErrorKind::from_str(p.error_type.as_deref().unwrap_or("None")),
                    ),
                    None => (100.0, ErrorKind::None),
                };

                let phonemes = w
                    .phonemes
                    .into_iter()
                    .map(|ph| PhonemeEntry {
                        phoneme: ph.phoneme,
                        accuracy: ph
                            .pronunciation
                            .and_then(|p| p.accuracy_score)
                            .unwrap_or(100.0),
                    })
                    .collect();

                WordEntry {
                    word: w.word,
                    accuracy,
                    error_kind,
                    phonemes,
                }
            })
            .collect();

        AssessmentResult {
            transcription,
            scores,
            words,
        }
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

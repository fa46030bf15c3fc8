//! Assessment data model
//!
//! `AssessmentResult` is what the external recognizer produces;
//! `HistoryRecord` is what the history store persists after scoring and
//! feedback generation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Task type tag controlling the composite-score weight vector
///
/// Anything that is not a reading task scores with the speech weights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskType {
    Reading,
    Speech,
}

impl TaskType {
    /// Map the UI task label to a task type (音読課題 = reading aloud)
    pub fn from_label(label: &str) -> Self {
        if label == "音読課題" {
            TaskType::Reading
        } else {
            TaskType::Speech
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskType::Reading => "reading",
            TaskType::Speech => "speech",
        }
    }
}

/// Word-level error classification from the recognizer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Word matched the reference
    None,
    /// Reference word was not spoken
    Omission,
    /// Extra word not in the reference
    Insertion,
    /// Word spoken with incorrect pronunciation
    Mispronunciation,
    /// Any other classification the recognizer may emit
    Other(String),
}

impl ErrorKind {
    pub fn from_str(s: &str) -> Self {
        match s {
            "None" => ErrorKind::None,
            "Omission" => ErrorKind::Omission,
            "Insertion" => ErrorKind::Insertion,
            "Mispronunciation" => ErrorKind::Mispronunciation,
            other => ErrorKind::Other(other.to_string()),
        }
    }

    /// Localized label shown in the word summary; empty for kinds the
    /// summary has no label for
    pub fn label(&self) -> &str {
        match self {
            ErrorKind::Omission => "省略",
            ErrorKind::Insertion => "挿入",
            ErrorKind::Mispronunciation => "誤発音",
            ErrorKind::None | ErrorKind::Other(_) => "",
        }
    }
}

/// Per-phoneme accuracy entry, nested under a word
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhonemeEntry {
    pub phoneme: String,
    /// Accuracy score in [0,100]
    pub accuracy: f64,
}

/// Per-word accuracy entry from the recognizer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WordEntry {
    pub word: String,
    /// Accuracy score in [0,100]
    pub accuracy: f64,
    pub error_kind: ErrorKind,
    pub phonemes: Vec<PhonemeEntry>,
}

/// The four recognizer sub-scores, each in [0,100]
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SubScores {
    pub accuracy: f64,
    pub fluency: f64,
    pub prosody: f64,
    pub completeness: f64,
}

/// Structured result of a reference-scored recognition pass
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssessmentResult {
    pub transcription: String,
    pub scores: SubScores,
    pub words: Vec<WordEntry>,
}

/// Persisted assessment record
///
/// Immutable once written; the history store only ever appends and evicts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryRecord {
    /// Short record id (8-char uuid prefix)
    pub id: String,
    pub recorded_at: DateTime<Utc>,
    pub student_id: String,
    pub student_name: String,
    pub class_group: String,
    pub task_type: String,
    pub task_name: String,
    pub target_text: String,
    pub transcription: String,
    pub accuracy: f64,
    pub fluency: f64,
    pub prosody: f64,
    pub completeness: f64,
    pub total_score: f64,
    pub band: String,
    pub cefr: String,
    pub toefl: String,
    pub ielts: String,
    pub mispronounced_words: String,
    pub phoneme_errors: String,
    pub feedback: String,
    pub processing_seconds: f64,
}

//! Scoring and normalization pipeline
//!
//! Deterministic policy layer between the recognizer output and the
//! persisted record: weighted composite score, proficiency-scale mappings,
//! and human-readable error summaries. Everything here is pure - same
//! inputs, same outputs, no external calls.

pub mod scales;
pub mod summary;
pub mod weighting;

pub use scales::{band_for, cefr_for, ielts_equivalent, toefl_equivalent, Band, CefrLevel};
pub use summary::{summarize_errors, ErrorSummary, NO_ISSUES};
pub use weighting::composite_score;

use crate::models::{AssessmentResult, TaskType};
use serde::{Deserialize, Serialize};

/// Round to the nearest integer, ties to the even neighbor
///
/// Banker's rounding, so quarter-point IELTS values and one-decimal
/// composite ties reproduce the established reports exactly.
pub(crate) fn round_half_to_even(value: f64) -> f64 {
    let floor = value.floor();
    let frac = value - floor;
    if (frac - 0.5).abs() < f64::EPSILON {
        if (floor as i64) % 2 == 0 {
            floor
        } else {
            floor + 1.0
        }
    } else {
        value.round()
    }
}

/// Derived scoring output, immutable once computed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredAssessment {
    /// Weighted composite in [0,100], one decimal place
    pub composite: f64,
    /// Coarse four-level quality tier
    pub band: Band,
    /// CEFR level estimate
    pub cefr: CefrLevel,
    /// TOEFL Speaking equivalent, rendered "n/30"
    pub toefl: String,
    /// IELTS Speaking equivalent, half-point value rendered "n.n"
    pub ielts: String,
    /// Flagged-word summary (joined list or sentinel)
    pub mispronounced_words: String,
    /// Flagged-phoneme summary, capped at 5 entries
    pub phoneme_errors: String,
}

/// Run the full scoring pipeline over a recognition result
///
/// Cannot fail: every mapper is total and the summarizer degrades to
/// sentinels on empty or malformed input.
pub fn score_assessment(result: &AssessmentResult, task_type: TaskType) -> ScoredAssessment {
    let composite = composite_score(&result.scores, task_type);
    let summary = summarize_errors(&result.words);

    ScoredAssessment {
        composite,
        band: band_for(composite),
        cefr: cefr_for(composite),
        toefl: toefl_equivalent(composite),
        ielts: ielts_equivalent(composite),
        mispronounced_words: summary.mispronounced_words,
        phoneme_errors: summary.phoneme_errors,
    }
}

//! Assessment orchestrator
//!
//! Drives one recording through the full pipeline:
//! acquire → recognize → score → feedback → persist → report,
//! advancing the session state machine at each stage.
//!
//! Error policy: acquisition and recognition failures abort the session
//! (FAILED, nothing persisted). Feedback failures degrade to a placeholder
//! comment and the record is still persisted. Scoring is pure arithmetic
//! and cannot fail.

use crate::db;
use crate::models::{
    AssessmentSession, AssessmentState, HistoryRecord, TaskType,
};
use crate::scoring::score_assessment;
use crate::services::{AudioAcquirer, AudioSource, FeedbackGenerator, FeedbackInput, Recognizer};
use chrono::Utc;
use sqlx::SqlitePool;
use sesa_common::Result;
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

/// Recognition language for all assessments
const LANGUAGE: &str = "en-US";

/// Stored target text is clipped to this many characters
const MAX_TARGET_TEXT_CHARS: usize = 500;

/// Stored transcription is clipped to this many characters
const MAX_TRANSCRIPTION_CHARS: usize = 1000;

/// Class-group placeholder the selection UI sends when nothing was picked
const UNSELECTED_CLASS: &str = "-- 選択 --";

/// Everything the caller knows about the recording being assessed
#[derive(Debug, Clone)]
pub struct AssessmentRequest {
    pub student_id: String,
    pub student_name: String,
    pub class_group: String,
    pub task_type: TaskType,
    pub task_name: String,
    /// Reference text for reading tasks; empty for free speech
    pub target_text: String,
}

pub struct AssessmentRunner {
    db: SqlitePool,
    acquirer: Arc<dyn AudioAcquirer>,
    recognizer: Arc<dyn Recognizer>,
    feedback: Arc<dyn FeedbackGenerator>,
    retention_ceiling: i64,
}

impl AssessmentRunner {
    pub fn new(
        db: SqlitePool,
        acquirer: Arc<dyn AudioAcquirer>,
        recognizer: Arc<dyn Recognizer>,
        feedback: Arc<dyn FeedbackGenerator>,
        retention_ceiling: i64,
    ) -> Self {
        Self {
            db,
            acquirer,
            recognizer,
            feedback,
            retention_ceiling,
        }
    }

    /// Run one assessment end to end; returns the persisted record
    pub async fn run(
        &self,
        request: AssessmentRequest,
        source: AudioSource,
    ) -> Result<HistoryRecord> {
        let started = Instant::now();
        let mut session = AssessmentSession::new(request.student_id.clone());

        tracing::info!(
            session_id = %session.session_id,
            student_id = %request.student_id,
            task_type = request.task_type.as_str(),
            "Assessment started"
        );

        let record = match self.run_inner(&request, source, &mut session, started).await {
            Ok(record) => record,
            Err(e) => {
                session.fail(e.to_string());
                tracing::warn!(
                    session_id = %session.session_id,
                    error = %e,
                    "Assessment failed"
                );
                return Err(e);
            }
        };

        session.transition_to(AssessmentState::Reported);
        tracing::info!(
            session_id = %session.session_id,
            record_id = %record.id,
            total_score = record.total_score,
            "Assessment completed"
        );

        Ok(record)
    }

    async fn run_inner(
        &self,
        request: &AssessmentRequest,
        source: AudioSource,
        session: &mut AssessmentSession,
        started: Instant,
    ) -> Result<HistoryRecord> {
        // Acquire a local normalized waveform
        let audio = self.acquirer.acquire(source).await?;
        session.transition_to(AssessmentState::AudioAcquired);

        let result = self
            .assess_and_persist(request, &audio, session, started)
            .await;

        // Scratch waveform, removed on success and failure alike
        let _ = tokio::fs::remove_file(&audio).await;

        result
    }

    async fn assess_and_persist(
        &self,
        request: &AssessmentRequest,
        audio: &std::path::Path,
        session: &mut AssessmentSession,
        started: Instant,
    ) -> Result<HistoryRecord> {
        // Reading tasks score against the given text; free speech scores
        // against its own transcription, which costs a second pass
        let reference = request.target_text.trim();

        let result = if !reference.is_empty() {
            self.recognizer.assess(audio, LANGUAGE, reference).await?
        } else {
            let transcription = self.recognizer.transcribe(audio, LANGUAGE).await?;
            self.recognizer
                .assess(audio, LANGUAGE, &transcription)
                .await?
        };
        session.transition_to(AssessmentState::Recognized);

        let scored = score_assessment(&result, request.task_type);
        session.transition_to(AssessmentState::Scored);

        // Feedback is best-effort; a failure becomes a placeholder comment.
        // Free speech has no target text, so the prompt references the
        // transcription instead.
        let feedback_target = if reference.is_empty() {
            result.transcription.clone()
        } else {
            request.target_text.clone()
        };
        let feedback_input = FeedbackInput {
            transcription: result.transcription.clone(),
            target_text: feedback_target,
            scores: result.scores,
            mispronounced_words: scored.mispronounced_words.clone(),
            phoneme_errors: scored.phoneme_errors.clone(),
            task_type: request.task_type,
        };
        let feedback = match self.feedback.generate(&feedback_input).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(
                    session_id = %session.session_id,
                    error = %e,
                    "Feedback generation failed, storing placeholder"
                );
                format!("（フィードバック生成エラー: {}）", e)
            }
        };
        session.transition_to(AssessmentState::FeedbackRequested);

        let record = build_record(
            request,
            &result.transcription,
            result.scores,
            &scored,
            feedback,
            started,
        );
        db::history::append_record(&self.db, &record, self.retention_ceiling).await?;
        session.transition_to(AssessmentState::Persisted);

        Ok(record)
    }
}

fn build_record(
    request: &AssessmentRequest,
    transcription: &str,
    scores: crate::models::SubScores,
    scored: &crate::scoring::ScoredAssessment,
    feedback: String,
    started: Instant,
) -> HistoryRecord {
    let class_group = if request.class_group == UNSELECTED_CLASS {
        String::new()
    } else {
        request.class_group.clone()
    };

    HistoryRecord {
        id: Uuid::new_v4().to_string().chars().take(8).collect(),
        recorded_at: Utc::now(),
        student_id: request.student_id.clone(),
        student_name: request.student_name.clone(),
        class_group,
        task_type: request.task_type.as_str().to_string(),
        task_name: request.task_name.clone(),
        target_text: clip(&request.target_text, MAX_TARGET_TEXT_CHARS),
        transcription: clip(transcription, MAX_TRANSCRIPTION_CHARS),
        accuracy: scores.accuracy,
        fluency: scores.fluency,
        prosody: scores.prosody,
        completeness: scores.completeness,
        total_score: scored.composite,
        band: scored.band.letter().to_string(),
        cefr: scored.cefr.as_str().to_string(),
        toefl: scored.toefl.clone(),
        ielts: scored.ielts.clone(),
        mispronounced_words: scored.mispronounced_words.clone(),
        phoneme_errors: scored.phoneme_errors.clone(),
        feedback,
        processing_seconds: started.elapsed().as_secs_f64(),
    }
}

/// Character-boundary clip (not bytes)
fn clip(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clip_respects_multibyte_boundaries() {
        let text = "あ".repeat(600);
        let clipped = clip(&text, 500);
        assert_eq!(clipped.chars().count(), 500);
    }

    #[test]
    fn clip_leaves_short_text_alone() {
        assert_eq!(clip("hello", 500), "hello");
    }
}

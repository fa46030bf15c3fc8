//! Assessment workflow state machine
//!
//! An assessment progresses through:
//! IDLE → AUDIO_ACQUIRED → RECOGNIZED → SCORED → FEEDBACK_REQUESTED →
//! PERSISTED → REPORTED
//!
//! FAILED is terminal and reachable from any state. Feedback-generation
//! failures do NOT reach FAILED; the orchestrator degrades them to a
//! placeholder and continues to PERSISTED.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Assessment workflow state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssessmentState {
    /// Nothing acquired yet
    Idle,
    /// Local normalized waveform available
    AudioAcquired,
    /// Recognizer returned a structured result
    Recognized,
    /// Composite score, scale mappings and summaries computed
    Scored,
    /// Narrative feedback requested (or degraded to a placeholder)
    FeedbackRequested,
    /// Record written to the history store
    Persisted,
    /// Record handed to the presentation layer
    Reported,
    /// Terminal failure
    Failed,
}

/// State transition event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateTransition {
    pub session_id: Uuid,
    pub old_state: AssessmentState,
    pub new_state: AssessmentState,
    pub transitioned_at: DateTime<Utc>,
}

/// Assessment session (in-memory state)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssessmentSession {
    /// Unique session identifier
    pub session_id: Uuid,

    /// Current workflow state
    pub state: AssessmentState,

    /// Student whose recording is being assessed
    pub student_id: String,

    /// Failure message, set when the session reaches FAILED
    pub failure: Option<String>,

    /// Session start time
    pub started_at: DateTime<Utc>,

    /// Session end time (if REPORTED or FAILED)
    pub ended_at: Option<DateTime<Utc>>,
}

impl AssessmentSession {
    /// Create new assessment session in the IDLE state
    pub fn new(student_id: String) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            state: AssessmentState::Idle,
            student_id,
            failure: None,
            started_at: Utc::now(),
            ended_at: None,
        }
    }

    /// Transition to new state
    pub fn transition_to(&mut self, new_state: AssessmentState) -> StateTransition {
        let transition = StateTransition {
            session_id: self.session_id,
            old_state: self.state,
            new_state,
            transitioned_at: Utc::now(),
        };
        self.state = new_state;

        // Set end time for terminal states
        match new_state {
            AssessmentState::Reported | AssessmentState::Failed => {
                self.ended_at = Some(Utc::now());
            }
            _ => {}
        }

        transition
    }

    /// Transition to FAILED with a human-readable message
    pub fn fail(&mut self, message: String) -> StateTransition {
        self.failure = Some(message);
        self.transition_to(AssessmentState::Failed)
    }

    /// Check if session is terminal (finished)
    pub fn is_terminal(&self) -> bool {
        matches!(
            self.state,
            AssessmentState::Reported | AssessmentState::Failed
        )
    }
}

//! Data models for sesa-pa

pub mod assessment;
pub mod session;

pub use assessment::{
    AssessmentResult, ErrorKind, HistoryRecord, PhonemeEntry, SubScores, TaskType, WordEntry,
};
pub use session::{AssessmentSession, AssessmentState, StateTransition};

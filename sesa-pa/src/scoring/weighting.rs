//! Task-weighted composite score
//!
//! Reading tasks weight pronunciation accuracy heavily; speech tasks spread
//! the weight across fluency and prosody.

use crate::models::{SubScores, TaskType};

/// Combine the four sub-scores into one composite using task-dependent
/// weights, rounded to one decimal place with ties to even
///
/// Inputs are assumed well-formed (each in [0,100]); out-of-range values
/// are not rejected here. Pure and deterministic.
pub fn composite_score(scores: &SubScores, task_type: TaskType) -> f64 {
    let (w_acc, w_flu, w_pro, w_com) = match task_type {
        TaskType::Reading => (0.50, 0.25, 0.15, 0.10),
        TaskType::Speech => (0.30, 0.30, 0.20, 0.20),
    };

    let total = scores.accuracy * w_acc
        + scores.fluency * w_flu
        + scores.prosody * w_pro
        + scores.completeness * w_com;

    round_one_decimal(total)
}

fn round_one_decimal(value: f64) -> f64 {
    crate::scoring::round_half_to_even(value * 10.0) / 10.0
}

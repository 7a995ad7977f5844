use chrono::{DateTime, Local};

use crate::math::Difficulty;

/// Immutable parameters one session is started with.
#[derive(Debug, Clone, Copy)]
pub struct SessionConfig {
    pub difficulty: Difficulty,
    /// Prior best for this difficulty, read-only; drives the one-time
    /// record-broken event.
    pub high_score: u32,
    pub seed: Option<u64>,
}

/// What a finished session reports back to the caller.
#[derive(Debug, Clone)]
pub struct SessionSummary {
    pub difficulty: Difficulty,
    pub score: u32,
    pub best_combo: u32,
    pub record_broken: bool,
    pub duration_secs: f64,
    pub avg_response_ms: Option<f64>,
    pub response_std_dev_ms: Option<f64>,
    pub finished_at: DateTime<Local>,
}

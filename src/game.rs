use chrono::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::time::SystemTime;

use crate::app_dirs::AppDirs;
use crate::math::{generate, Difficulty, Equation};
use crate::session::{SessionConfig, SessionSummary};
use crate::stats::{time_diff_ms, AnswerStat, StatsDb};
use crate::util::{mean, std_dev};

/// Time fraction above which an answer counts as fast.
pub const FAST_ANSWER_FRACTION: f64 = 0.6;
/// Fast answers earn a slice of the base time back.
const FAST_TIME_BONUS_FRACTION: f64 = 0.15;
/// Slow answers still earn a flat breather.
const FLAT_TIME_BONUS_MS: f64 = 300.0;
/// Every full streak of this length adds one bonus point per answer.
const COMBO_BONUS_STRIDE: u32 = 5;

/// Result of submitting an answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerOutcome {
    /// Answer matched; the session continues with a fresh equation.
    Continued { gained: u32, record_broken: bool },
    /// Answer missed; the session is over.
    Ended { final_score: u32 },
    /// Submitted after the session already ended; state untouched.
    Ignored,
}

/// One play session: countdown, score, streak, and the active equation.
///
/// Owned by a single controller; `on_tick` and `submit_answer` are expected
/// to be serialized onto one thread (the event loop does this naturally).
#[derive(Debug)]
pub struct Game {
    pub difficulty: Difficulty,
    pub score: u32,
    pub combo: u32,
    pub best_combo: u32,
    pub time_remaining_ms: f64,
    pub base_time_ms: f64,
    pub equation: Equation,
    pub high_score: u32,
    pub started_at: SystemTime,
    pub stats_db: Option<StatsDb>,
    record_announced: bool,
    over: bool,
    equation_shown_at: SystemTime,
    response_times_ms: Vec<f64>,
    rng: StdRng,
}

impl Game {
    /// Fresh session with entropy-seeded randomness and best-effort
    /// analytics recording.
    pub fn new(difficulty: Difficulty, high_score: u32) -> Self {
        let mut game = Self::with_rng(difficulty, high_score, StdRng::from_entropy());
        game.stats_db = StatsDb::new().ok();
        game
    }

    pub fn from_config(config: &SessionConfig) -> Self {
        match config.seed {
            Some(seed) => {
                Self::with_rng(config.difficulty, config.high_score, StdRng::seed_from_u64(seed))
            }
            None => Self::new(config.difficulty, config.high_score),
        }
    }

    /// Session with an explicit random source and no analytics side
    /// channel; the constructor used by tests and seeded runs.
    pub fn with_rng(difficulty: Difficulty, high_score: u32, mut rng: StdRng) -> Self {
        let base_time_ms = difficulty.base_time_ms();
        let equation = generate(0, difficulty, &mut rng);
        let now = SystemTime::now();

        Self {
            difficulty,
            score: 0,
            combo: 0,
            best_combo: 0,
            time_remaining_ms: base_time_ms,
            base_time_ms,
            equation,
            high_score,
            started_at: now,
            stats_db: None,
            record_announced: false,
            over: false,
            equation_shown_at: now,
            response_times_ms: Vec::new(),
            rng,
        }
    }

    pub fn is_over(&self) -> bool {
        self.over
    }

    /// Fraction of the countdown still available, for gauges.
    pub fn time_fraction(&self) -> f64 {
        (self.time_remaining_ms / self.base_time_ms).clamp(0.0, 1.0)
    }

    /// Current score multiplier shown to the player.
    pub fn multiplier(&self) -> u32 {
        1 + self.combo / COMBO_BONUS_STRIDE
    }

    /// Whether the session has already beaten the stored best.
    pub fn is_new_best(&self) -> bool {
        self.high_score > 0 && self.score > self.high_score
    }

    /// Advances the countdown by `elapsed_ms`. Returns whether the session
    /// is over afterwards. Reaching zero ends the session; further calls
    /// are no-ops.
    pub fn on_tick(&mut self, elapsed_ms: f64) -> bool {
        if self.over {
            return true;
        }

        self.time_remaining_ms -= elapsed_ms;
        if self.time_remaining_ms <= 0.0 {
            self.time_remaining_ms = 0.0;
            self.combo = 0;
            self.over = true;
        }
        self.over
    }

    /// Evaluates the player's call on the active equation.
    pub fn submit_answer(&mut self, says_correct: bool) -> AnswerOutcome {
        if self.over {
            return AnswerOutcome::Ignored;
        }

        let now = SystemTime::now();
        let response_ms = time_diff_ms(self.equation_shown_at, now);
        let was_correct = says_correct == self.equation.is_correct;
        self.record_answer(was_correct, response_ms);
        self.response_times_ms.push(response_ms as f64);

        if !was_correct {
            self.combo = 0;
            self.over = true;
            return AnswerOutcome::Ended {
                final_score: self.score,
            };
        }

        self.combo += 1;
        self.best_combo = self.best_combo.max(self.combo);
        let gained = 1 + self.combo / COMBO_BONUS_STRIDE;
        self.score += gained;

        let mut record_broken = false;
        if self.high_score > 0 && self.score > self.high_score && !self.record_announced {
            self.record_announced = true;
            record_broken = true;
        }

        // Next equation scales with the updated score
        self.equation = generate(self.score, self.difficulty, &mut self.rng);
        self.equation_shown_at = now;

        let bonus = if self.time_remaining_ms > FAST_ANSWER_FRACTION * self.base_time_ms {
            FAST_TIME_BONUS_FRACTION * self.base_time_ms
        } else {
            FLAT_TIME_BONUS_MS
        };
        self.time_remaining_ms = (self.time_remaining_ms + bonus).min(self.base_time_ms);

        AnswerOutcome::Continued {
            gained,
            record_broken,
        }
    }

    fn record_answer(&self, was_correct: bool, response_ms: u64) {
        if let Some(ref stats_db) = self.stats_db {
            let stat = AnswerStat {
                operator: self.equation.operator,
                difficulty: self.difficulty,
                was_correct,
                response_ms,
                timestamp: Local::now(),
            };
            let _ = stats_db.record_answer(&stat);
        }
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            difficulty: self.difficulty,
            score: self.score,
            best_combo: self.best_combo,
            record_broken: self.record_announced,
            duration_secs: self
                .started_at
                .elapsed()
                .map(|d| d.as_secs_f64())
                .unwrap_or(0.0),
            avg_response_ms: mean(&self.response_times_ms),
            response_std_dev_ms: std_dev(&self.response_times_ms),
            finished_at: Local::now(),
        }
    }

    /// Appends one CSV line for the finished session to the app log.
    pub fn save_result(&self) -> io::Result<()> {
        let Some(log_path) = AppDirs::log_path() else {
            return Ok(());
        };

        if let Some(parent) = log_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let needs_header = !log_path.exists();

        let mut log_file = OpenOptions::new()
            .write(true)
            .append(true)
            .create(true)
            .open(log_path)?;

        if needs_header {
            writeln!(log_file, "date,difficulty,score,best_combo,elapsed_secs")?;
        }

        writeln!(
            log_file,
            "{},{},{},{},{:.2}",
            Local::now().format("%c"),
            self.difficulty,
            self.score,
            self.best_combo,
            self.started_at
                .elapsed()
                .map(|d| d.as_secs_f64())
                .unwrap_or(0.0),
        )?;

        Ok(())
    }
}

use rand::seq::SliceRandom;
use rand::Rng;
use std::fmt;

use super::difficulty::{level_for, Difficulty};

/// Probability that the displayed result is the true one.
const CORRECT_PROBABILITY: f64 = 0.6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Add,
    Sub,
    Mul,
}

impl Operator {
    pub fn apply(self, a: u32, b: u32) -> i64 {
        let (a, b) = (a as i64, b as i64);
        match self {
            Operator::Add => a + b,
            Operator::Sub => a - b,
            Operator::Mul => a * b,
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            Operator::Add => "+",
            Operator::Sub => "-",
            Operator::Mul => "*",
        };
        write!(f, "{symbol}")
    }
}

/// One round's problem statement. The displayed result either matches the
/// true result (`is_correct`) or carries a bounded deviation from it.
/// Immutable once produced; a correct answer replaces it with a fresh one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Equation {
    pub operand_a: u32,
    pub operand_b: u32,
    pub operator: Operator,
    pub text: String,
    pub true_result: i64,
    pub displayed_result: i64,
    pub is_correct: bool,
}

/// Produces the next equation for the given cumulative score and difficulty.
/// Pure up to the injected random source; all ranges are clamped internally,
/// so it never fails.
pub fn generate(score: u32, difficulty: Difficulty, rng: &mut impl Rng) -> Equation {
    let operator = *active_operators(difficulty, score)
        .choose(rng)
        .unwrap_or(&Operator::Add);
    let (a, b) = draw_operands(operator, difficulty, score, rng);
    let true_result = operator.apply(a, b);

    let is_correct = rng.gen_bool(CORRECT_PROBABILITY);
    let displayed_result = if is_correct {
        true_result
    } else {
        falsify(true_result, difficulty.deviation_range(), rng)
    };

    Equation {
        operand_a: a,
        operand_b: b,
        operator,
        text: format!("{a} {operator} {b} ="),
        true_result,
        displayed_result,
        is_correct,
    }
}

/// Operators live at the given score. EASY gains subtraction past 10 points
/// and never unlocks multiplication; MEDIUM unlocks it past 10 points.
fn active_operators(difficulty: Difficulty, score: u32) -> &'static [Operator] {
    use Operator::*;
    match difficulty {
        Difficulty::Easy => {
            if score > 10 {
                &[Add, Sub]
            } else {
                &[Add]
            }
        }
        Difficulty::Medium => {
            if score > 10 {
                &[Add, Sub, Mul]
            } else {
                &[Add, Sub]
            }
        }
        Difficulty::Hard => &[Add, Sub, Mul],
    }
}

fn draw_operands(
    operator: Operator,
    difficulty: Difficulty,
    score: u32,
    rng: &mut impl Rng,
) -> (u32, u32) {
    match operator {
        // Products stay legible: factors come from small difficulty-specific
        // ranges regardless of the add/sub operand bound.
        Operator::Mul => {
            let a_max = match difficulty {
                Difficulty::Easy => 6,
                Difficulty::Medium => 10,
                Difficulty::Hard => 13,
            };
            let b_max = match difficulty {
                Difficulty::Hard => (level_for(score) + 5).max(2),
                _ => 7,
            };
            (rng.gen_range(2..=a_max), rng.gen_range(2..=b_max))
        }
        _ => {
            let max = difficulty.max_operand(score).max(1);
            let a = rng.gen_range(1..=max);
            let b = rng.gen_range(1..=max);
            // Subtraction stays non-negative
            if operator == Operator::Sub && a < b {
                (b, a)
            } else {
                (a, b)
            }
        }
    }
}

/// Perturbs a true result into a plausible wrong answer: signed offset with
/// magnitude in `[1, deviation_range]`, reflected above zero, and nudged off
/// the true value if the adjustment collides with it.
fn falsify(true_result: i64, deviation_range: i64, rng: &mut impl Rng) -> i64 {
    let magnitude = rng.gen_range(1..=deviation_range);
    let offset = if rng.gen_bool(0.5) {
        magnitude
    } else {
        -magnitude
    };

    let mut shown = true_result + offset;
    if shown < 0 {
        shown = shown.abs() + 1;
    }
    if shown == true_result {
        shown += 1;
    }
    shown
}

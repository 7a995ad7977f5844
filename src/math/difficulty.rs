use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Session difficulty. Picked in the menu (or via `--difficulty`) and fixed
/// for the lifetime of one session.
#[derive(
    Debug,
    Copy,
    Clone,
    PartialEq,
    Eq,
    Hash,
    ValueEnum,
    strum_macros::Display,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    /// Starting (and maximum) countdown for one session, in milliseconds.
    pub fn base_time_ms(self) -> f64 {
        match self {
            Difficulty::Easy => 8_000.0,
            Difficulty::Medium => 4_000.0,
            Difficulty::Hard => 2_500.0,
        }
    }

    /// Upper bound for addition/subtraction operands at the given score.
    pub fn max_operand(self, score: u32) -> u32 {
        match self {
            // Very gentle scaling, keeping numbers low for longer
            Difficulty::Easy => 8 + score / 2,
            Difficulty::Medium => 20 + level_for(score) * 3,
            Difficulty::Hard => 40 + level_for(score) * 6,
        }
    }

    /// How far a falsified result may stray from the true one.
    pub fn deviation_range(self) -> i64 {
        match self {
            Difficulty::Hard => 5,
            _ => 3,
        }
    }
}

/// Progression level derived from cumulative score; bumps every 5 points.
pub fn level_for(score: u32) -> u32 {
    score / 5 + 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_time_shrinks_with_difficulty() {
        assert!(Difficulty::Easy.base_time_ms() > Difficulty::Medium.base_time_ms());
        assert!(Difficulty::Medium.base_time_ms() > Difficulty::Hard.base_time_ms());
    }

    #[test]
    fn level_bumps_every_five_points() {
        assert_eq!(level_for(0), 1);
        assert_eq!(level_for(4), 1);
        assert_eq!(level_for(5), 2);
        assert_eq!(level_for(23), 5);
    }

    #[test]
    fn max_operand_grows_with_score() {
        for difficulty in Difficulty::ALL {
            assert!(difficulty.max_operand(50) > difficulty.max_operand(0));
        }
        assert_eq!(Difficulty::Easy.max_operand(0), 8);
        assert_eq!(Difficulty::Medium.max_operand(0), 23);
        assert_eq!(Difficulty::Hard.max_operand(0), 46);
    }

    #[test]
    fn hard_lies_stray_further() {
        assert_eq!(Difficulty::Hard.deviation_range(), 5);
        assert_eq!(Difficulty::Easy.deviation_range(), 3);
        assert_eq!(Difficulty::Medium.deviation_range(), 3);
    }

    #[test]
    fn display_matches_stored_form() {
        assert_eq!(Difficulty::Easy.to_string(), "EASY");
        assert_eq!(Difficulty::Medium.to_string(), "MEDIUM");
        assert_eq!(Difficulty::Hard.to_string(), "HARD");
    }
}

use chrono::{DateTime, Local};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::app_dirs::AppDirs;
use crate::math::Difficulty;
use crate::session::SessionSummary;

/// Only the most recent results are kept per profile.
pub const HISTORY_LIMIT: usize = 10;

/// Avatar palette; one entry is picked at random when a profile is created.
pub const AVATAR_COLORS: [&str; 6] = ["rose", "blue", "emerald", "amber", "purple", "indigo"];

/// One finished session in a profile's history.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GameRecord {
    pub score: u32,
    pub difficulty: Difficulty,
    pub timestamp: DateTime<Local>,
}

/// Best score per difficulty. Only ever raised.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct HighScores {
    pub easy: u32,
    pub medium: u32,
    pub hard: u32,
}

impl HighScores {
    pub fn get(&self, difficulty: Difficulty) -> u32 {
        match difficulty {
            Difficulty::Easy => self.easy,
            Difficulty::Medium => self.medium,
            Difficulty::Hard => self.hard,
        }
    }

    pub fn raise(&mut self, difficulty: Difficulty, score: u32) {
        let slot = match difficulty {
            Difficulty::Easy => &mut self.easy,
            Difficulty::Medium => &mut self.medium,
            Difficulty::Hard => &mut self.hard,
        };
        *slot = (*slot).max(score);
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserProfile {
    pub id: String,
    pub name: String,
    pub avatar_color: String,
    pub high_scores: HighScores,
    pub history: Vec<GameRecord>,
    pub total_solved: u32,
}

impl UserProfile {
    pub fn new(name: &str, rng: &mut impl Rng) -> Self {
        Self {
            id: Local::now().timestamp_millis().to_string(),
            name: name.trim().to_string(),
            avatar_color: AVATAR_COLORS.choose(rng).unwrap_or(&"blue").to_string(),
            high_scores: HighScores::default(),
            history: Vec::new(),
            total_solved: 0,
        }
    }

    /// Folds a finished session into the profile: bounded history, raised
    /// high score, accumulated total.
    pub fn record_session(&mut self, summary: &SessionSummary) {
        self.history.push(GameRecord {
            score: summary.score,
            difficulty: summary.difficulty,
            timestamp: summary.finished_at,
        });
        if self.history.len() > HISTORY_LIMIT {
            let excess = self.history.len() - HISTORY_LIMIT;
            self.history.drain(..excess);
        }

        self.high_scores.raise(summary.difficulty, summary.score);
        self.total_solved += summary.score;
    }
}

/// The on-disk document: every local player plus who was last signed in.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ProfileBook {
    pub profiles: Vec<UserProfile>,
    pub active_id: Option<String>,
}

impl ProfileBook {
    pub fn active(&self) -> Option<&UserProfile> {
        let id = self.active_id.as_deref()?;
        self.profiles.iter().find(|p| p.id == id)
    }

    pub fn active_mut(&mut self) -> Option<&mut UserProfile> {
        let id = self.active_id.clone()?;
        self.profiles.iter_mut().find(|p| p.id == id)
    }

    pub fn select(&mut self, id: &str) {
        if self.profiles.iter().any(|p| p.id == id) {
            self.active_id = Some(id.to_string());
        }
    }

    pub fn sign_out(&mut self) {
        self.active_id = None;
    }

    /// Selects the named profile, creating it first if it does not exist.
    pub fn sign_in(&mut self, name: &str, rng: &mut impl Rng) -> &UserProfile {
        let trimmed = name.trim();
        let idx = match self.profiles.iter().position(|p| p.name == trimmed) {
            Some(idx) => idx,
            None => {
                self.profiles.push(UserProfile::new(trimmed, rng));
                self.profiles.len() - 1
            }
        };
        self.active_id = Some(self.profiles[idx].id.clone());
        &self.profiles[idx]
    }
}

pub trait ProfileStore {
    fn load(&self) -> ProfileBook;
    fn save(&self, book: &ProfileBook) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileProfileStore {
    path: PathBuf,
}

impl FileProfileStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path =
            AppDirs::profiles_path().unwrap_or_else(|| PathBuf::from("mathflash_profiles.json"));
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }
}

impl Default for FileProfileStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ProfileStore for FileProfileStore {
    fn load(&self) -> ProfileBook {
        if let Ok(bytes) = fs::read(&self.path) {
            if let Ok(book) = serde_json::from_slice::<ProfileBook>(&bytes) {
                return book;
            }
        }
        ProfileBook::default()
    }

    fn save(&self, book: &ProfileBook) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(book).unwrap_or_default();
        fs::write(&self.path, data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use tempfile::tempdir;

    fn summary(score: u32, difficulty: Difficulty) -> SessionSummary {
        SessionSummary {
            difficulty,
            score,
            best_combo: 3,
            record_broken: false,
            duration_secs: 30.0,
            avg_response_ms: Some(800.0),
            response_std_dev_ms: Some(120.0),
            finished_at: Local::now(),
        }
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(0)
    }

    #[test]
    fn new_profile_uses_palette_color() {
        let profile = UserProfile::new("ada", &mut rng());
        assert_eq!(profile.name, "ada");
        assert!(AVATAR_COLORS.contains(&profile.avatar_color.as_str()));
        assert_eq!(profile.total_solved, 0);
        assert!(profile.history.is_empty());
    }

    #[test]
    fn record_session_updates_everything() {
        let mut profile = UserProfile::new("ada", &mut rng());
        profile.record_session(&summary(12, Difficulty::Medium));

        assert_eq!(profile.history.len(), 1);
        assert_eq!(profile.high_scores.medium, 12);
        assert_eq!(profile.high_scores.easy, 0);
        assert_eq!(profile.total_solved, 12);
    }

    #[test]
    fn high_scores_only_ever_rise() {
        let mut profile = UserProfile::new("ada", &mut rng());
        profile.record_session(&summary(12, Difficulty::Hard));
        profile.record_session(&summary(5, Difficulty::Hard));

        assert_eq!(profile.high_scores.hard, 12);
        assert_eq!(profile.total_solved, 17);
    }

    #[test]
    fn history_is_bounded() {
        let mut profile = UserProfile::new("ada", &mut rng());
        for score in 0..15 {
            profile.record_session(&summary(score, Difficulty::Easy));
        }

        assert_eq!(profile.history.len(), HISTORY_LIMIT);
        // Oldest entries fall off the front
        assert_eq!(profile.history[0].score, 5);
        assert_eq!(profile.history.last().unwrap().score, 14);
    }

    #[test]
    fn sign_in_creates_then_reuses() {
        let mut book = ProfileBook::default();
        let id = book.sign_in("grace", &mut rng()).id.clone();
        assert_eq!(book.profiles.len(), 1);

        let again = book.sign_in("grace", &mut rng()).id.clone();
        assert_eq!(book.profiles.len(), 1);
        assert_eq!(id, again);
        assert_eq!(book.active().unwrap().name, "grace");
    }

    #[test]
    fn select_ignores_unknown_ids() {
        let mut book = ProfileBook::default();
        book.sign_in("grace", &mut rng());
        let active = book.active_id.clone();

        book.select("no-such-id");
        assert_eq!(book.active_id, active);
    }

    #[test]
    fn roundtrip_empty_book() {
        let dir = tempdir().unwrap();
        let store = FileProfileStore::with_path(dir.path().join("profiles.json"));
        let book = ProfileBook::default();
        store.save(&book).unwrap();
        assert_eq!(store.load(), book);
    }

    #[test]
    fn save_and_load_populated_book() {
        let dir = tempdir().unwrap();
        let store = FileProfileStore::with_path(dir.path().join("profiles.json"));

        let mut book = ProfileBook::default();
        book.sign_in("ada", &mut rng());
        book.active_mut()
            .unwrap()
            .record_session(&summary(21, Difficulty::Hard));
        store.save(&book).unwrap();

        let loaded = store.load();
        assert_eq!(loaded, book);
        assert_eq!(loaded.active().unwrap().high_scores.hard, 21);
    }

    #[test]
    fn missing_file_loads_default() {
        let dir = tempdir().unwrap();
        let store = FileProfileStore::with_path(dir.path().join("absent.json"));
        assert_eq!(store.load(), ProfileBook::default());
    }
}

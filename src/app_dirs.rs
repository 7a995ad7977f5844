use directories::ProjectDirs;
use std::path::PathBuf;

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    /// Mutable state (answer analytics database) under XDG state dir.
    pub fn db_path() -> Option<PathBuf> {
        if let Ok(home) = std::env::var("HOME") {
            let state_dir = PathBuf::from(home)
                .join(".local")
                .join("state")
                .join("mathflash");
            Some(state_dir.join("answers.db"))
        } else {
            ProjectDirs::from("", "", "mathflash")
                .map(|proj_dirs| proj_dirs.data_local_dir().join("answers.db"))
        }
    }

    /// Profile document location.
    pub fn profiles_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "mathflash")
            .map(|proj_dirs| proj_dirs.config_dir().join("profiles.json"))
    }

    /// Per-session CSV log location.
    pub fn log_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "mathflash")
            .map(|proj_dirs| proj_dirs.config_dir().join("log.csv"))
    }
}

//! Configuration - data locations and the admin capability flag

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::content::{ContentStore, MediaLibrary};
use crate::error::{StoreError, StoreResult};
use crate::workout_log::WorkoutLog;

pub const ADMIN_MODE_VAR: &str = "ADMIN_MODE";
pub const DATA_DIR_VAR: &str = "HOURGLASS_DATA_DIR";

const VIDEOS_JSON: &str = "videos.json";
const WORKOUT_LOG_CSV: &str = "workout_log.csv";
const DB_FILE: &str = "data.db";
const UPLOAD_ROOT: &str = "uploaded_content";
const USER_DATA_DIR: &str = "user_data";
const VIDEOS_DIR: &str = "videos";

/// Whether content-management affordances are available.
///
/// Fixed when the process starts; there is no way to toggle it later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AdminMode(bool);

impl AdminMode {
    pub const ENABLED: AdminMode = AdminMode(true);
    pub const DISABLED: AdminMode = AdminMode(false);

    /// Only a case-insensitive "true" enables admin mode
    pub fn from_flag(value: &str) -> Self {
        AdminMode(value.trim().eq_ignore_ascii_case("true"))
    }

    pub fn is_enabled(self) -> bool {
        self.0
    }

    /// Gate for admin-only operations
    pub fn require(self) -> StoreResult<()> {
        if self.0 { Ok(()) } else { Err(StoreError::AdminRequired) }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub admin: AdminMode,
    pub data_dir: PathBuf,
}

impl Config {
    pub fn new(data_dir: impl Into<PathBuf>, admin: AdminMode) -> Self {
        Self { admin, data_dir: data_dir.into() }
    }

    /// Read `ADMIN_MODE` and `HOURGLASS_DATA_DIR` from the environment
    pub fn from_env() -> Self {
        let admin = env::var(ADMIN_MODE_VAR)
            .map(|v| AdminMode::from_flag(&v))
            .unwrap_or_default();
        let data_dir = env::var_os(DATA_DIR_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));
        Self { admin, data_dir }
    }

    pub fn videos_json(&self) -> PathBuf {
        self.data_dir.join(VIDEOS_JSON)
    }

    pub fn workout_log_csv(&self) -> PathBuf {
        self.data_dir.join(WORKOUT_LOG_CSV)
    }

    pub fn database(&self) -> PathBuf {
        self.data_dir.join(DB_FILE)
    }

    pub fn upload_root(&self) -> PathBuf {
        self.data_dir.join(UPLOAD_ROOT)
    }

    pub fn main_media_dir(&self) -> PathBuf {
        self.upload_root().join("main_media")
    }

    pub fn exercise_videos_dir(&self) -> PathBuf {
        self.upload_root().join("exercise_videos")
    }

    pub fn progress_photos_dir(&self) -> PathBuf {
        self.upload_root().join("progress_photos")
    }

    pub fn user_data_dir(&self) -> PathBuf {
        self.data_dir.join(USER_DATA_DIR)
    }

    pub fn videos_dir(&self) -> PathBuf {
        self.data_dir.join(VIDEOS_DIR)
    }

    /// Create every data directory; existing ones are left alone
    pub fn ensure_dirs(&self) -> StoreResult<()> {
        let dirs = [
            self.upload_root(),
            self.main_media_dir(),
            self.exercise_videos_dir(),
            self.progress_photos_dir(),
            self.user_data_dir(),
            self.videos_dir(),
        ];
        for dir in &dirs {
            create_dir(dir)?;
        }
        info!("Data directory ready at {}", self.data_dir.display());
        Ok(())
    }

    pub fn content_store(&self) -> ContentStore {
        ContentStore::new(self.videos_json())
    }

    pub fn workout_log(&self) -> WorkoutLog {
        WorkoutLog::new(self.workout_log_csv())
    }

    pub fn media_library(&self) -> MediaLibrary {
        MediaLibrary::new(self.videos_dir(), self.main_media_dir())
    }
}

fn create_dir(dir: &Path) -> StoreResult<()> {
    fs::create_dir_all(dir).map_err(|e| StoreError::io(dir, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_admin_flag_parsing() {
        assert!(AdminMode::from_flag("true").is_enabled());
        assert!(AdminMode::from_flag("TRUE").is_enabled());
        assert!(AdminMode::from_flag(" True ").is_enabled());
        assert!(!AdminMode::from_flag("1").is_enabled());
        assert!(!AdminMode::from_flag("yes").is_enabled());
        assert!(!AdminMode::from_flag("").is_enabled());
        assert!(!AdminMode::default().is_enabled());
    }

    #[test]
    fn test_admin_require() {
        assert!(AdminMode::ENABLED.require().is_ok());
        assert!(matches!(AdminMode::DISABLED.require(), Err(StoreError::AdminRequired)));
    }

    #[test]
    fn test_paths_under_data_dir() {
        let config = Config::new("/srv/hourglass", AdminMode::DISABLED);
        assert_eq!(config.videos_json(), PathBuf::from("/srv/hourglass/videos.json"));
        assert_eq!(config.workout_log_csv(), PathBuf::from("/srv/hourglass/workout_log.csv"));
        assert_eq!(
            config.exercise_videos_dir(),
            PathBuf::from("/srv/hourglass/uploaded_content/exercise_videos")
        );
    }

    #[test]
    fn test_ensure_dirs_idempotent() {
        let dir = TempDir::new().unwrap();
        let config = Config::new(dir.path(), AdminMode::DISABLED);
        config.ensure_dirs().unwrap();
        config.ensure_dirs().unwrap();
        assert!(config.videos_dir().is_dir());
        assert!(config.progress_photos_dir().is_dir());
        assert!(config.user_data_dir().is_dir());
    }
}

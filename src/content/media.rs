//! Uploaded media files (exercise videos, site clips, coach photo)

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use chrono::{Local, NaiveDateTime};
use regex::Regex;
use tracing::info;

use super::ContentKey;
use crate::error::{StoreError, StoreResult};

pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov", "m4v"];
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

/// Advertised upload limit in megabytes
pub const MAX_UPLOAD_MB: usize = 50;

const COACH_PHOTO_STEM: &str = "coach_photo";

static UNSAFE_FILENAME_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-zA-Z0-9._-]").expect("valid filename pattern"));

/// Lowercased extension of `name` if it is in `allowed`
fn allowed_extension(name: &str, allowed: &[&str]) -> StoreResult<String> {
    let ext = Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    if allowed.contains(&ext.as_str()) {
        Ok(ext)
    } else {
        Err(StoreError::UnsupportedMedia(name.to_string()))
    }
}

pub fn sanitize_file_name(name: &str) -> String {
    UNSAFE_FILENAME_CHARS.replace_all(name, "").into_owned()
}

/// Writes uploads into fixed directories
#[derive(Debug, Clone)]
pub struct MediaLibrary {
    videos_dir: PathBuf,
    main_media_dir: PathBuf,
    max_bytes: usize,
}

impl MediaLibrary {
    pub fn new(videos_dir: impl Into<PathBuf>, main_media_dir: impl Into<PathBuf>) -> Self {
        Self {
            videos_dir: videos_dir.into(),
            main_media_dir: main_media_dir.into(),
            max_bytes: MAX_UPLOAD_MB * 1024 * 1024,
        }
    }

    pub fn with_max_bytes(mut self, max_bytes: usize) -> Self {
        self.max_bytes = max_bytes;
        self
    }

    fn check_size(&self, size: usize) -> StoreResult<()> {
        if size > self.max_bytes {
            return Err(StoreError::MediaTooLarge { size, limit: self.max_bytes });
        }
        Ok(())
    }

    /// File name for an upload made at `at`
    pub fn upload_file_name(key: &ContentKey, original_name: &str, ext: &str, at: NaiveDateTime) -> String {
        let stamp = at.format("%Y%m%d_%H%M%S");
        match key {
            ContentKey::GettingStarted => {
                format!("{}_{}_{}", key.file_prefix(), stamp, sanitize_file_name(original_name))
            }
            _ => format!("{}_{}.{}", key.file_prefix(), stamp, ext),
        }
    }

    /// Store an uploaded video for `key`, returning the written path
    pub fn store_upload(&self, key: &ContentKey, original_name: &str, bytes: &[u8]) -> StoreResult<PathBuf> {
        let ext = allowed_extension(original_name, VIDEO_EXTENSIONS)?;
        self.check_size(bytes.len())?;

        fs::create_dir_all(&self.videos_dir).map_err(|e| StoreError::io(&self.videos_dir, e))?;
        let name = Self::upload_file_name(key, original_name, &ext, Local::now().naive_local());
        let path = self.videos_dir.join(name);
        fs::write(&path, bytes).map_err(|e| StoreError::io(&path, e))?;

        info!("Uploaded {} bytes for {} to {}", bytes.len(), key, path.display());
        Ok(path)
    }

    /// Replace the homepage coach photo
    pub fn save_coach_photo(&self, original_name: &str, bytes: &[u8]) -> StoreResult<PathBuf> {
        let ext = allowed_extension(original_name, IMAGE_EXTENSIONS)?;
        self.check_size(bytes.len())?;

        fs::create_dir_all(&self.main_media_dir).map_err(|e| StoreError::io(&self.main_media_dir, e))?;
        // One photo at a time, whatever its extension
        for old in IMAGE_EXTENSIONS {
            let old = self.coach_photo_path(old);
            match fs::remove_file(&old) {
                Ok(()) => {}
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => return Err(StoreError::io(&old, e)),
            }
        }
        let path = self.coach_photo_path(&ext);
        fs::write(&path, bytes).map_err(|e| StoreError::io(&path, e))?;

        info!("Coach photo saved to {}", path.display());
        Ok(path)
    }

    fn coach_photo_path(&self, ext: &str) -> PathBuf {
        self.main_media_dir.join(format!("{COACH_PHOTO_STEM}.{ext}"))
    }

    /// Current coach photo, if one was uploaded
    pub fn coach_photo(&self) -> Option<PathBuf> {
        IMAGE_EXTENSIONS
            .iter()
            .map(|ext| self.coach_photo_path(ext))
            .find(|p| p.exists())
    }
}

//! Content module - keyed references to exercise videos and site clips
//!
//! The mapping is persisted as one pretty-printed JSON document and is
//! read-modify-written as a whole on every change. Two sessions editing
//! at once race; the last save wins.

pub mod media;

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{error, info, warn};

use crate::error::{StoreError, StoreResult};
use crate::ident;

pub use media::MediaLibrary;

/// Reserved key for the homepage welcome clip
pub const INTRO_KEY: &str = "__intro__";
/// Reserved key for the onboarding clip
pub const GETTING_STARTED_KEY: &str = "__getting_started__";

/// Flat key -> reference mapping as stored on disk
pub type ContentMap = BTreeMap<String, String>;

/// Slot a content reference is attached to
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ContentKey {
    Intro,
    GettingStarted,
    Exercise(String),
}

impl ContentKey {
    /// Key for an exercise display name
    pub fn for_exercise(name: &str) -> StoreResult<Self> {
        ident::try_exercise_id(name)
            .map(ContentKey::Exercise)
            .ok_or_else(|| StoreError::Unidentifiable(name.to_string()))
    }

    /// Interpret a raw stored key
    pub fn parse(raw: &str) -> Self {
        match raw {
            INTRO_KEY => ContentKey::Intro,
            GETTING_STARTED_KEY => ContentKey::GettingStarted,
            other => ContentKey::Exercise(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ContentKey::Intro => INTRO_KEY,
            ContentKey::GettingStarted => GETTING_STARTED_KEY,
            ContentKey::Exercise(id) => id,
        }
    }

    pub fn is_sentinel(&self) -> bool {
        !matches!(self, ContentKey::Exercise(_))
    }

    /// File-name prefix for uploaded media
    pub fn file_prefix(&self) -> &str {
        match self {
            ContentKey::Intro => "intro",
            ContentKey::GettingStarted => "getting_started",
            ContentKey::Exercise(id) => id,
        }
    }
}

impl fmt::Display for ContentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a stored reference is played back
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Network locator, streamed as is
    Remote(String),
    /// Local file that exists, with its bytes
    Local { path: PathBuf, bytes: Vec<u8> },
    /// Local path that no longer exists
    Missing(PathBuf),
    /// Nothing assigned to the key
    Unassigned,
}

impl Resolution {
    pub fn is_remote(&self) -> bool {
        matches!(self, Resolution::Remote(_))
    }

    /// One-line status for display
    pub fn describe(&self) -> String {
        match self {
            Resolution::Remote(url) => format!("stream: {url}"),
            Resolution::Local { path, bytes } => {
                format!("local: {} ({} bytes)", path.display(), bytes.len())
            }
            Resolution::Missing(_) => "Video file not found. Contact admin to update.".to_string(),
            Resolution::Unassigned => "No video available yet.".to_string(),
        }
    }
}

/// Whether a reference is a network locator
pub fn is_remote_reference(reference: &str) -> bool {
    reference.starts_with("http://") || reference.starts_with("https://")
}

/// Classify a stored reference and, for local paths, read the file
pub fn resolve_reference(reference: &str) -> Resolution {
    if reference.is_empty() {
        return Resolution::Unassigned;
    }
    if is_remote_reference(reference) {
        return Resolution::Remote(reference.to_string());
    }

    let path = PathBuf::from(reference);
    if !path.exists() {
        info!("Content file missing: {}", path.display());
        return Resolution::Missing(path);
    }
    match fs::read(&path) {
        Ok(bytes) => Resolution::Local { path, bytes },
        Err(e) => {
            warn!("Failed to read content file {}: {}", path.display(), e);
            Resolution::Missing(path)
        }
    }
}

/// JSON-document backed content reference store
#[derive(Debug, Clone)]
pub struct ContentStore {
    path: PathBuf,
}

impl ContentStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the mapping, or an empty one if the document is absent or unreadable
    pub fn load(&self) -> ContentMap {
        match self.try_load() {
            Ok(map) => map,
            Err(e) => {
                warn!("Error loading content references: {}", e);
                ContentMap::new()
            }
        }
    }

    /// Read the mapping, surfacing malformed documents as errors
    pub fn try_load(&self) -> StoreResult<ContentMap> {
        if !self.path.exists() {
            return Ok(ContentMap::new());
        }
        let text = fs::read_to_string(&self.path).map_err(|e| StoreError::io(&self.path, e))?;
        serde_json::from_str(&text).map_err(|source| StoreError::Json {
            path: self.path.clone(),
            source,
        })
    }

    /// Persist the full mapping with two-space indentation
    pub fn save(&self, map: &ContentMap) -> StoreResult<()> {
        let text = serde_json::to_string_pretty(map).map_err(|source| StoreError::Json {
            path: self.path.clone(),
            source,
        })?;
        fs::write(&self.path, text).map_err(|e| {
            error!("Error saving content references to {}: {}", self.path.display(), e);
            StoreError::io(&self.path, e)
        })
    }

    pub fn get(&self, key: &ContentKey) -> Option<String> {
        self.load().remove(key.as_str())
    }

    /// Upsert `reference` under `key`
    pub fn set(&self, key: &ContentKey, reference: &str) -> StoreResult<()> {
        let mut map = self.load();
        map.insert(key.to_string(), reference.to_string());
        self.save(&map)?;
        info!("Content reference saved for {}", key);
        Ok(())
    }

    /// Drop `key` if present; returns whether anything was removed
    pub fn remove(&self, key: &ContentKey) -> StoreResult<bool> {
        let mut map = self.load();
        if map.remove(key.as_str()).is_none() {
            return Ok(false);
        }
        self.save(&map)?;
        info!("Content reference removed for {}", key);
        Ok(true)
    }

    /// Resolve the reference stored under `key`
    pub fn resolve(&self, key: &ContentKey) -> Resolution {
        match self.get(key) {
            Some(reference) => resolve_reference(&reference),
            None => Resolution::Unassigned,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> ContentStore {
        ContentStore::new(dir.path().join("videos.json"))
    }

    #[test]
    fn test_load_absent_is_empty() {
        let dir = TempDir::new().unwrap();
        assert!(store_in(&dir).load().is_empty());
    }

    #[test]
    fn test_load_corrupt_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        fs::write(store.path(), "{ not json").unwrap();
        assert!(store.load().is_empty());
        assert!(matches!(store.try_load(), Err(StoreError::Json { .. })));
    }

    #[test]
    fn test_round_trip_with_sentinels() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let mut map = ContentMap::new();
        map.insert(INTRO_KEY.to_string(), "https://example.com/intro.mp4".to_string());
        map.insert(GETTING_STARTED_KEY.to_string(), "videos/gs.mov".to_string());
        map.insert("hip_thrust".to_string(), "videos/hip_thrust_20240101_120000.mp4".to_string());

        store.save(&map).unwrap();
        assert_eq!(store.load(), map);
    }

    #[test]
    fn test_document_is_two_space_indented() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.set(&ContentKey::Exercise("plank".into()), "a.mp4").unwrap();
        let text = fs::read_to_string(store.path()).unwrap();
        assert_eq!(text, "{\n  \"plank\": \"a.mp4\"\n}");
    }

    #[test]
    fn test_set_overwrites() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let key = ContentKey::Exercise("kickbacks".into());
        store.set(&key, "https://a.example/1.mp4").unwrap();
        store.set(&key, "https://a.example/2.mp4").unwrap();
        assert_eq!(store.get(&key).as_deref(), Some("https://a.example/2.mp4"));
        assert_eq!(store.load().len(), 1);
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.set(&ContentKey::Intro, "https://a.example/i.mp4").unwrap();
        let before = store.load();

        let removed = store.remove(&ContentKey::Exercise("nope".into())).unwrap();
        assert!(!removed);
        assert_eq!(store.load(), before);
    }

    #[test]
    fn test_remove_present() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.set(&ContentKey::Intro, "https://a.example/i.mp4").unwrap();
        assert!(store.remove(&ContentKey::Intro).unwrap());
        assert_eq!(store.resolve(&ContentKey::Intro), Resolution::Unassigned);
    }

    #[test]
    fn test_save_into_missing_directory_fails() {
        let dir = TempDir::new().unwrap();
        let store = ContentStore::new(dir.path().join("no/such/dir/videos.json"));
        let result = store.save(&ContentMap::new());
        assert!(matches!(result, Err(StoreError::Io { .. })));
    }

    #[test]
    fn test_resolve_remote() {
        assert!(resolve_reference("https://example.com/v.mp4").is_remote());
        assert!(resolve_reference("http://example.com/v.mp4").is_remote());
    }

    #[test]
    fn test_resolve_local_existing_and_missing() {
        let dir = TempDir::new().unwrap();
        let clip = dir.path().join("clip.mp4");
        fs::write(&clip, b"\x00\x01clip").unwrap();

        match resolve_reference(clip.to_str().unwrap()) {
            Resolution::Local { path, bytes } => {
                assert_eq!(path, clip);
                assert_eq!(bytes, b"\x00\x01clip");
            }
            other => panic!("expected local, got {other:?}"),
        }

        let gone = dir.path().join("gone.mp4");
        assert_eq!(
            resolve_reference(gone.to_str().unwrap()),
            Resolution::Missing(gone)
        );
    }

    #[test]
    fn test_resolve_scheme_lookalike_is_local() {
        // Not a network locator, so it is existence-checked
        assert!(matches!(
            resolve_reference("httpsfoo/bar.mp4"),
            Resolution::Missing(_)
        ));
    }

    #[test]
    fn test_content_key_parse_and_exercise() {
        assert_eq!(ContentKey::parse("__intro__"), ContentKey::Intro);
        assert_eq!(ContentKey::parse("__getting_started__"), ContentKey::GettingStarted);
        assert_eq!(
            ContentKey::parse("hip_thrust"),
            ContentKey::Exercise("hip_thrust".into())
        );
        assert_eq!(
            ContentKey::for_exercise("Hip Thrust").unwrap(),
            ContentKey::Exercise("hip_thrust".into())
        );
        assert!(matches!(
            ContentKey::for_exercise("!!!"),
            Err(StoreError::Unidentifiable(_))
        ));
        assert!(ContentKey::Intro.is_sentinel());
        assert!(!ContentKey::Exercise("x".into()).is_sentinel());
    }
}

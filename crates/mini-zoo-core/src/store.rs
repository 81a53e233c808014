//! Progress persistence
//!
//! Supports different backends based on environment:
//! - Local: one JSON file per key under the user's data directory
//! - Test: in-memory map with a failure switch

use crate::catalog::Catalog;
use crate::progress::GameProgress;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use thiserror::Error;
use tracing::{debug, warn};

/// Storage key of the progress record
pub const PROGRESS_KEY: &str = "miniZooPuzzlesProgress";

/// Directory name under the platform data directory
pub const APP_DIR: &str = "mini-zoo";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] io::Error),
    #[error("progress payload is not valid: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("storage backend is unavailable")]
    Unavailable,
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Environment configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    /// File-based storage
    Local,
    /// In-memory storage
    Test,
}

impl Environment {
    /// Detect environment from the MINI_ZOO_ENV variable
    pub fn detect() -> Self {
        Self::from_value(std::env::var("MINI_ZOO_ENV").ok().as_deref())
    }

    fn from_value(value: Option<&str>) -> Self {
        match value {
            Some("test") | Some("testing") => Environment::Test,
            _ => Environment::Local,
        }
    }
}

/// Plain string key-value storage
pub trait KeyValueBackend: Send + Sync {
    /// `Ok(None)` when the key was never written
    fn get(&self, key: &str) -> StoreResult<Option<String>>;

    fn set(&self, key: &str, value: &str) -> StoreResult<()>;

    fn backend_name(&self) -> &'static str;
}

// ==================== Local File Backend ====================

/// Stores each key as `<dir>/<key>.json`
#[derive(Debug, Clone)]
pub struct FileBackend {
    dir: PathBuf,
}

impl FileBackend {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// `<data_local_dir>/mini-zoo`, or `./mini-zoo` when the platform has none
    pub fn default_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl Default for FileBackend {
    fn default() -> Self {
        Self::new(Self::default_dir())
    }
}

impl KeyValueBackend for FileBackend {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        fs::create_dir_all(&self.dir)?;
        fs::write(self.path_for(key), value)?;
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "file"
    }
}

// ==================== Memory Backend for Testing ====================

/// In-memory storage that can be switched off to inject failures
#[derive(Debug)]
pub struct MemoryBackend {
    data: Mutex<HashMap<String, String>>,
    available: Mutex<bool>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self {
            data: Mutex::new(HashMap::new()),
            available: Mutex::new(true),
        }
    }

    /// Pre-seed a raw value
    pub fn with_entry(self, key: &str, value: &str) -> Self {
        self.data
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
        self
    }

    /// When unavailable every read and write fails
    pub fn set_available(&self, available: bool) {
        *self.available.lock().unwrap_or_else(PoisonError::into_inner) = available;
    }

    /// Raw stored value, bypassing availability
    pub fn raw(&self, key: &str) -> Option<String> {
        self.data
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn check_available(&self) -> StoreResult<()> {
        if *self.available.lock().unwrap_or_else(PoisonError::into_inner) {
            Ok(())
        } else {
            Err(StoreError::Unavailable)
        }
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyValueBackend for MemoryBackend {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        self.check_available()?;
        Ok(self.raw(key))
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        self.check_available()?;
        self.data
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

impl<B: KeyValueBackend + ?Sized> KeyValueBackend for std::sync::Arc<B> {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        (**self).set(key, value)
    }

    fn backend_name(&self) -> &'static str {
        (**self).backend_name()
    }
}

// ==================== Progress Store ====================

/// Loads and saves [`GameProgress`] under [`PROGRESS_KEY`]
pub struct ProgressStore {
    backend: Box<dyn KeyValueBackend>,
}

impl std::fmt::Debug for ProgressStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressStore")
            .field("backend", &self.backend.backend_name())
            .finish()
    }
}

impl ProgressStore {
    pub fn new(backend: impl KeyValueBackend + 'static) -> Self {
        Self {
            backend: Box::new(backend),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(MemoryBackend::new())
    }

    /// Pick a backend for the detected environment
    pub fn for_environment(env: Environment, dir: Option<PathBuf>) -> Self {
        match env {
            Environment::Test => Self::in_memory(),
            Environment::Local => Self::new(dir.map(FileBackend::new).unwrap_or_default()),
        }
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.backend_name()
    }

    /// Read the stored progress, surfacing every failure
    pub fn try_load(&self) -> StoreResult<Option<GameProgress>> {
        let Some(raw) = self.backend.get(PROGRESS_KEY)? else {
            return Ok(None);
        };
        Ok(Some(serde_json::from_str(&raw)?))
    }

    /// Read the stored progress, falling back to a fresh start on any failure
    pub fn load(&self, catalog: &Catalog) -> GameProgress {
        let mut progress = match self.try_load() {
            Ok(Some(progress)) => progress,
            Ok(None) => {
                debug!(backend = self.backend_name(), "no stored progress");
                GameProgress::for_catalog(catalog)
            }
            Err(e) => {
                warn!(backend = self.backend_name(), error = %e, "discarding stored progress");
                GameProgress::for_catalog(catalog)
            }
        };
        progress.normalize(catalog);
        progress
    }

    /// Write progress; failures are logged and swallowed
    pub fn save(&self, progress: &GameProgress) -> bool {
        let result = serde_json::to_string(progress)
            .map_err(StoreError::from)
            .and_then(|json| self.backend.set(PROGRESS_KEY, &json));

        match result {
            Ok(()) => {
                debug!(backend = self.backend_name(), "progress saved");
                true
            }
            Err(e) => {
                warn!(backend = self.backend_name(), error = %e, "could not save progress");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_environment_detection() {
        assert_eq!(Environment::from_value(Some("test")), Environment::Test);
        assert_eq!(Environment::from_value(Some("testing")), Environment::Test);
        assert_eq!(Environment::from_value(Some("prod")), Environment::Local);
        assert_eq!(Environment::from_value(None), Environment::Local);
    }

    #[test]
    fn test_missing_payload_gives_initial_progress() {
        let store = ProgressStore::in_memory();
        let progress = store.load(&Catalog::standard());
        assert_eq!(progress, GameProgress::initial("farm-1"));
    }

    #[test]
    fn test_unparseable_payload_gives_initial_progress() {
        let store = ProgressStore::new(MemoryBackend::new().with_entry(PROGRESS_KEY, "{not json"));
        assert!(matches!(store.try_load(), Err(StoreError::Serialize(_))));
        assert_eq!(store.load(&Catalog::standard()), GameProgress::initial("farm-1"));
    }

    #[test]
    fn test_stored_screen_is_ignored() {
        let payload = r#"{"unlockedLevels":["farm-1","farm-2"],"unlockedAnimals":["Cow"],"screen":"puzzle","settings":{"music":true,"effects":false}}"#;
        let store = ProgressStore::new(MemoryBackend::new().with_entry(PROGRESS_KEY, payload));
        let progress = store.load(&Catalog::standard());
        assert!(progress.is_level_unlocked("farm-2"));
        assert!(!progress.settings().effects);
    }

    #[test]
    fn test_save_round_trips_through_backend() {
        let backend = Arc::new(MemoryBackend::new());
        let store = ProgressStore::new(Arc::clone(&backend));
        let mut progress = GameProgress::initial("farm-1");
        progress.unlock_animal("Cow");

        assert!(store.save(&progress));
        let raw = backend.raw(PROGRESS_KEY).unwrap();
        assert!(raw.contains("\"unlockedAnimals\":[\"Cow\"]"));
        assert_eq!(store.load(&Catalog::standard()), progress);
    }

    #[test]
    fn test_write_failure_is_swallowed() {
        let backend = Arc::new(MemoryBackend::new());
        backend.set_available(false);
        let store = ProgressStore::new(Arc::clone(&backend));

        assert!(!store.save(&GameProgress::initial("farm-1")));
        assert!(backend.raw(PROGRESS_KEY).is_none());
        // Reads fail too, and fall back
        assert_eq!(store.load(&Catalog::standard()), GameProgress::initial("farm-1"));
    }

    #[test]
    fn test_file_backend() {
        let dir = std::env::temp_dir().join(format!("mini-zoo-store-{}", std::process::id()));
        let backend = FileBackend::new(&dir);

        assert!(backend.get("absent").unwrap().is_none());
        backend.set("k", "{\"a\":1}").unwrap();
        assert_eq!(backend.get("k").unwrap().as_deref(), Some("{\"a\":1}"));
        assert!(dir.join("k.json").exists());

        let _ = fs::remove_dir_all(&dir);
    }
}

//! Durable storage of the visitor's language choice.
//!
//! `PreferenceStore` never fails: when no storage is available (or the
//! storage errors) the selection simply lives for the session only.

use crate::error::StorageError;
use crate::i18n::LanguageCode;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

/// Storage key used by the site for the selected language.
pub const DEFAULT_STORAGE_KEY: &str = "selectedLanguage";

/// A string key/value store that outlives the page (browser local storage,
/// a file on disk, ...).
pub trait Storage: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// Process-local storage. Survives store re-creation, not process restarts.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Storage backed by a JSON object file.
///
/// The file is read on every `get` and rewritten on every `set`; the whole
/// object is small (a handful of preference keys).
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<Map<String, Value>, StorageError> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => return Err(e.into()),
        };
        if raw.trim().is_empty() {
            return Ok(Map::new());
        }
        Ok(serde_json::from_str(&raw)?)
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let entries = self.read_all()?;
        Ok(entries.get(key).and_then(Value::as_str).map(str::to_string))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut entries = self.read_all()?;
        entries.insert(key.to_string(), Value::String(value.to_string()));

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(&entries)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }
}

/// Reads and writes the persisted language preference.
#[derive(Clone)]
pub struct PreferenceStore {
    storage: Option<Arc<dyn Storage>>,
    key: String,
}

impl PreferenceStore {
    pub fn new(storage: Arc<dyn Storage>, key: impl Into<String>) -> Self {
        Self {
            storage: Some(storage),
            key: key.into(),
        }
    }

    /// No durable storage in this execution context.
    pub fn unavailable() -> Self {
        Self {
            storage: None,
            key: DEFAULT_STORAGE_KEY.to_string(),
        }
    }

    pub fn is_available(&self) -> bool {
        self.storage.is_some()
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// The persisted language, if storage exists and holds a known code.
    pub fn load(&self) -> Option<LanguageCode> {
        let storage = self.storage.as_ref()?;
        match storage.get(&self.key) {
            Ok(Some(raw)) => match raw.parse() {
                Ok(code) => Some(code),
                Err(_) => {
                    debug!("Ignoring persisted language '{}'", raw);
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                warn!("Failed to read language preference: {}", e);
                None
            }
        }
    }

    /// Persist `code`. Errors are logged and otherwise ignored.
    pub fn save(&self, code: LanguageCode) {
        let Some(storage) = self.storage.as_ref() else {
            debug!("No storage available, language '{}' kept for this session", code);
            return;
        };
        if let Err(e) = storage.set(&self.key, code.as_str()) {
            warn!("Failed to persist language preference: {}", e);
        }
    }
}

impl std::fmt::Debug for PreferenceStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreferenceStore")
            .field("available", &self.storage.is_some())
            .field("key", &self.key)
            .finish()
    }
}

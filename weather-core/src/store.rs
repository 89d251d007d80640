//! Persistence of the last searched city.
//!
//! A single key, a single writer. [`JsonPreferenceStore`] keeps it in a small
//! JSON file that survives restarts; [`MemoryPreferenceStore`] keeps it in
//! process memory.

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use std::{
    fmt::Debug,
    fs,
    path::{Path, PathBuf},
    sync::Mutex,
};

/// Logical key of the stored city.
pub const LAST_CITY_KEY: &str = "last_searched_city";

pub trait PreferenceStore: Send + Sync + Debug {
    /// Most recently stored city, `None` on a fresh store.
    fn get(&self) -> Result<Option<String>>;

    /// Overwrite the stored city.
    fn put(&self, city: &str) -> Result<()>;
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Preferences {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    last_searched_city: Option<String>,
}

/// JSON file store with atomic writes (write-to-temp + rename).
///
/// File format:
/// ```json
/// { "last_searched_city": "Paris" }
/// ```
#[derive(Debug)]
pub struct JsonPreferenceStore {
    file_path: PathBuf,
    // Serializes writers within this process.
    write_lock: Mutex<()>,
}

impl JsonPreferenceStore {
    pub fn new(file_path: PathBuf) -> Self {
        tracing::debug!(path = ?file_path, "using JSON preference store");
        Self { file_path, write_lock: Mutex::new(()) }
    }

    /// Store under the platform data directory.
    pub fn open_default() -> Result<Self> {
        Ok(Self::new(crate::Config::preferences_file_path()?))
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }

    fn load(&self) -> Result<Preferences> {
        if !self.file_path.exists() {
            return Ok(Preferences::default());
        }

        let contents = fs::read_to_string(&self.file_path).with_context(|| {
            format!("Failed to read preferences file: {}", self.file_path.display())
        })?;

        if contents.trim().is_empty() {
            return Ok(Preferences::default());
        }

        serde_json::from_str(&contents).with_context(|| {
            format!("Failed to parse preferences file: {}", self.file_path.display())
        })
    }

    fn save(&self, prefs: &Preferences) -> Result<()> {
        if let Some(parent) = self.file_path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create preferences directory: {}", parent.display())
            })?;
        }

        let json =
            serde_json::to_string_pretty(prefs).context("Failed to serialize preferences")?;

        let tmp = self.file_path.with_extension("json.tmp");
        fs::write(&tmp, json)
            .with_context(|| format!("Failed to write temp file: {}", tmp.display()))?;
        fs::rename(&tmp, &self.file_path).with_context(|| {
            format!("Failed to replace preferences file: {}", self.file_path.display())
        })?;

        Ok(())
    }
}

impl PreferenceStore for JsonPreferenceStore {
    fn get(&self) -> Result<Option<String>> {
        Ok(self.load()?.last_searched_city)
    }

    fn put(&self, city: &str) -> Result<()> {
        let _guard = self.write_lock.lock().map_err(|_| anyhow!("preference store lock poisoned"))?;

        // A corrupt file is replaced rather than blocking every future write.
        let mut prefs = self.load().unwrap_or_else(|err| {
            tracing::warn!(error = %err, "discarding unreadable preferences file");
            Preferences::default()
        });
        prefs.last_searched_city = Some(city.to_string());
        self.save(&prefs)?;

        tracing::debug!(key = LAST_CITY_KEY, city, "stored last searched city");
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemoryPreferenceStore {
    value: Mutex<Option<String>>,
}

impl MemoryPreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_city(city: impl Into<String>) -> Self {
        Self { value: Mutex::new(Some(city.into())) }
    }
}

impl PreferenceStore for MemoryPreferenceStore {
    fn get(&self) -> Result<Option<String>> {
        let value = self.value.lock().map_err(|_| anyhow!("preference store lock poisoned"))?;
        Ok(value.clone())
    }

    fn put(&self, city: &str) -> Result<()> {
        let mut value = self.value.lock().map_err(|_| anyhow!("preference store lock poisoned"))?;
        *value = Some(city.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_store_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonPreferenceStore::new(dir.path().join("prefs.json"));
        assert_eq!(store.get().unwrap(), None);
    }

    #[test]
    fn put_overwrites_and_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data").join("prefs.json");

        let store = JsonPreferenceStore::new(path.clone());
        store.put("London").unwrap();
        store.put("Paris").unwrap();
        drop(store);

        let reopened = JsonPreferenceStore::new(path.clone());
        assert_eq!(reopened.get().unwrap().as_deref(), Some("Paris"));

        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"last_searched_city\""));
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn corrupt_file_fails_get_but_put_recovers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");
        fs::write(&path, "{not json").unwrap();

        let store = JsonPreferenceStore::new(path);
        assert!(store.get().is_err());

        store.put("Oslo").unwrap();
        assert_eq!(store.get().unwrap().as_deref(), Some("Oslo"));
    }

    #[test]
    fn memory_store_roundtrip() {
        let store = MemoryPreferenceStore::new();
        assert_eq!(store.get().unwrap(), None);
        store.put("Rome").unwrap();
        assert_eq!(store.get().unwrap().as_deref(), Some("Rome"));

        let seeded = MemoryPreferenceStore::with_city("Paris");
        assert_eq!(seeded.get().unwrap().as_deref(), Some("Paris"));
    }
}

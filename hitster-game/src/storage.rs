//! Snapshot persistence
//!
//! Snapshots are opaque JSON strings keyed by playlist id. No expiry.

use hitster_common::config::TomlConfig;
use hitster_common::{Error, Result};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::debug;

/// Key-value store for game snapshots
pub trait SnapshotStore: Send + Sync {
    fn load(&self, playlist_id: &str) -> Result<Option<String>>;
    fn save(&self, playlist_id: &str, json: &str) -> Result<()>;
}

/// In-process store, lost on exit
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SnapshotStore for MemoryStore {
    fn load(&self, playlist_id: &str) -> Result<Option<String>> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| Error::Internal("snapshot store lock poisoned".to_string()))?;
        Ok(entries.get(playlist_id).cloned())
    }

    fn save(&self, playlist_id: &str, json: &str) -> Result<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| Error::Internal("snapshot store lock poisoned".to_string()))?;
        entries.insert(playlist_id.to_string(), json.to_string());
        Ok(())
    }
}

/// One `<playlist id>.json` file per playlist under a directory
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    /// Open (and create if needed) the snapshot directory
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// Store under `<data_dir>/games`
    pub fn from_config(config: &TomlConfig) -> Result<Self> {
        Self::new(config.data_dir().join("games"))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, playlist_id: &str) -> Result<PathBuf> {
        if playlist_id.is_empty() {
            return Err(Error::InvalidInput("empty playlist id".to_string()));
        }
        Ok(self.dir.join(format!("{}.json", file_stem(playlist_id))))
    }
}

/// Escape a playlist id into a file name
///
/// ASCII letters, digits and `-` pass through; every other byte (`_`
/// included) becomes `_xx` in lowercase hex, so distinct ids never share
/// a file.
fn file_stem(playlist_id: &str) -> String {
    let mut stem = String::with_capacity(playlist_id.len());
    for byte in playlist_id.bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'-' {
            stem.push(char::from(byte));
        } else {
            stem.push_str(&format!("_{:02x}", byte));
        }
    }
    stem
}

impl SnapshotStore for JsonFileStore {
    fn load(&self, playlist_id: &str) -> Result<Option<String>> {
        let path = self.path_for(playlist_id)?;
        match fs::read_to_string(&path) {
            Ok(json) => Ok(Some(json)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Write to a temp file, then rename over the old snapshot
    fn save(&self, playlist_id: &str, json: &str) -> Result<()> {
        let path = self.path_for(playlist_id)?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &path)?;
        debug!(path = %path.display(), bytes = json.len(), "Snapshot saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_memory_store() {
        let store = MemoryStore::new();
        assert!(store.load("p1").unwrap().is_none());
        store.save("p1", "{}").unwrap();
        store.save("p1", "[]").unwrap();
        assert_eq!(store.load("p1").unwrap().as_deref(), Some("[]"));
        assert!(store.load("p2").unwrap().is_none());
    }

    #[test]
    fn test_file_store_round_trip() {
        let temp = TempDir::new().unwrap();
        let store = JsonFileStore::new(temp.path().join("games")).unwrap();

        assert!(store.load("37i9dQZF1DXcBWIGoYBM5M").unwrap().is_none());
        store.save("37i9dQZF1DXcBWIGoYBM5M", r#"{"a":1}"#).unwrap();
        assert_eq!(
            store.load("37i9dQZF1DXcBWIGoYBM5M").unwrap().as_deref(),
            Some(r#"{"a":1}"#)
        );
        assert!(temp.path().join("games/37i9dQZF1DXcBWIGoYBM5M.json").exists());
        assert!(!temp.path().join("games/37i9dQZF1DXcBWIGoYBM5M.json.tmp").exists());
    }

    #[test]
    fn test_file_names_escaped() {
        let temp = TempDir::new().unwrap();
        let store = JsonFileStore::new(temp.path()).unwrap();
        store.save("../escape", "{}").unwrap();
        assert!(temp.path().join("_2e_2e_2fescape.json").exists());
        assert!(store.load("").is_err());
    }

    #[test]
    fn test_similar_ids_stored_apart() {
        let temp = TempDir::new().unwrap();
        let store = JsonFileStore::new(temp.path()).unwrap();

        store.save("a/b", r#"{"slash":true}"#).unwrap();
        store.save("a_b", r#"{"underscore":true}"#).unwrap();
        store.save("a.b", r#"{"dot":true}"#).unwrap();

        assert_eq!(store.load("a/b").unwrap().as_deref(), Some(r#"{"slash":true}"#));
        assert_eq!(store.load("a_b").unwrap().as_deref(), Some(r#"{"underscore":true}"#));
        assert_eq!(store.load("a.b").unwrap().as_deref(), Some(r#"{"dot":true}"#));
        assert_eq!(fs::read_dir(temp.path()).unwrap().count(), 3);
    }

    #[test]
    fn test_file_stem() {
        assert_eq!(file_stem("37i9dQZF1DX-abc"), "37i9dQZF1DX-abc");
        assert_eq!(file_stem("a_b"), "a_5fb");
        assert_eq!(file_stem("a/b"), "a_2fb");
        assert_eq!(file_stem("é"), "_c3_a9");
    }

    #[test]
    fn test_from_config_uses_data_dir() {
        let temp = TempDir::new().unwrap();
        let config = TomlConfig {
            data_dir: Some(temp.path().to_path_buf()),
            ..Default::default()
        };
        let store = JsonFileStore::from_config(&config).unwrap();
        assert_eq!(store.dir(), temp.path().join("games"));
    }
}

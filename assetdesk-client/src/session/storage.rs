//! Durable key-value storage for session fields
//!
//! The session survives restarts by writing its four fields into a small
//! string map. [`FileStore`] keeps that map as a JSON file; [`MemoryStore`]
//! keeps it in memory for tests and throwaway sessions.

use assetdesk_core::{storage_error, AssetDeskError, AssetDeskResult};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};
use tracing::{debug, info};

/// String key-value storage the session store persists into
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> AssetDeskResult<Option<String>>;

    fn set(&self, key: &str, value: &str) -> AssetDeskResult<()>;

    fn remove(&self, key: &str) -> AssetDeskResult<()>;
}

/// In-memory storage
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> AssetDeskResult<Option<String>> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> AssetDeskResult<()> {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> AssetDeskResult<()> {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.remove(key);
        Ok(())
    }
}

/// JSON-file storage, written through on every change
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: RwLock<BTreeMap<String, String>>,
}

impl FileStore {
    /// Open the store at `path`, creating parent directories as needed
    ///
    /// A missing file is an empty store; an unreadable or malformed one is an error.
    pub fn open<P: AsRef<Path>>(path: P) -> AssetDeskResult<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    storage_error!(
                        format!("Failed to create {}", parent.display()),
                        "file_store",
                        e
                    )
                })?;
            }
        }

        let entries = if path.exists() {
            let json_data = std::fs::read_to_string(&path).map_err(|e| {
                storage_error!(format!("Failed to read {}", path.display()), "file_store", e)
            })?;
            if json_data.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_json::from_str(&json_data).map_err(|e| AssetDeskError::Storage {
                    message: format!("Session file {} is not valid JSON: {}", path.display(), e),
                    source: Some(Box::new(e)),
                    context: assetdesk_core::ErrorContext::new("file_store")
                        .with_operation("open")
                        .with_metadata("path", &path.display().to_string())
                        .with_suggestion("Delete the session file and log in again"),
                })?
            }
        } else {
            BTreeMap::new()
        };

        info!("Session storage opened at: {}", path.display());

        Ok(Self {
            path,
            entries: RwLock::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self, entries: &BTreeMap<String, String>) -> AssetDeskResult<()> {
        let json_data = serde_json::to_string_pretty(entries)?;

        // Replaced atomically; readers never see a partial file
        let tmp_path = self.path.with_extension("json.tmp");
        std::fs::write(&tmp_path, json_data).map_err(|e| {
            storage_error!(
                format!("Failed to write {}", tmp_path.display()),
                "file_store",
                e
            )
        })?;
        std::fs::rename(&tmp_path, &self.path).map_err(|e| {
            storage_error!(
                format!("Failed to replace {}", self.path.display()),
                "file_store",
                e
            )
        })?;

        debug!("Flushed {} entries to {}", entries.len(), self.path.display());
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> AssetDeskResult<Option<String>> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> AssetDeskResult<()> {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.to_string(), value.to_string());
        self.flush(&entries)
    }

    fn remove(&self, key: &str) -> AssetDeskResult<()> {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        if entries.remove(key).is_some() {
            self.flush(&entries)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store() {
        let store = MemoryStore::new();
        assert!(store.is_empty());

        store.set("k", "v").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v"));

        store.remove("k").unwrap();
        store.remove("k").unwrap();
        assert_eq!(store.get("k").unwrap(), None);
        assert!(store.is_empty());
    }

    #[test]
    fn test_file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("session.json");

        {
            let store = FileStore::open(&path).unwrap();
            store.set("it_mgmt_user_id", "7").unwrap();
            store.set("it_mgmt_user_role", "Admin").unwrap();
            store.remove("it_mgmt_user_role").unwrap();
        }

        let reopened = FileStore::open(&path).unwrap();
        assert_eq!(
            reopened.get("it_mgmt_user_id").unwrap().as_deref(),
            Some("7")
        );
        assert_eq!(reopened.get("it_mgmt_user_role").unwrap(), None);
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn test_file_store_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "{not json").unwrap();

        let error = FileStore::open(&path).unwrap_err();
        assert!(matches!(error, AssetDeskError::Storage { .. }));
    }

    #[test]
    fn test_file_store_treats_empty_file_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "").unwrap();

        let store = FileStore::open(&path).unwrap();
        assert_eq!(store.get("anything").unwrap(), None);
    }
}

//! JSON-file-backed session store

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;

use crate::domain::session::SessionStore;
use crate::domain::DomainError;

type Entries = BTreeMap<String, Value>;

/// Session store persisted as one JSON object in a file.
///
/// Survives restarts of the CLI. A missing file reads as an empty session.
#[derive(Debug)]
pub struct FileSessionStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_entries(&self) -> Result<Entries, DomainError> {
        let text = match tokio::fs::read_to_string(&self.path).await {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Entries::new()),
            Err(e) => {
                return Err(DomainError::storage(format!(
                    "Failed to read session file {}: {}",
                    self.path.display(),
                    e
                )))
            }
        };

        if text.trim().is_empty() {
            return Ok(Entries::new());
        }

        serde_json::from_str(&text).map_err(|e| {
            DomainError::storage(format!(
                "Corrupt session file {}: {}",
                self.path.display(),
                e
            ))
        })
    }

    async fn write_entries(&self, entries: &Entries) -> Result<(), DomainError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                DomainError::storage(format!(
                    "Failed to create session directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let text = serde_json::to_string_pretty(entries)
            .map_err(|e| DomainError::internal(format!("Failed to encode session: {}", e)))?;

        tokio::fs::write(&self.path, text).await.map_err(|e| {
            DomainError::storage(format!(
                "Failed to write session file {}: {}",
                self.path.display(),
                e
            ))
        })
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, DomainError> {
        let _guard = self.lock.lock().await;
        Ok(self.read_entries().await?.remove(key))
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), DomainError> {
        let _guard = self.lock.lock().await;
        let mut entries = self.read_entries().await?;
        entries.insert(key.to_string(), value);
        self.write_entries(&entries).await
    }

    async fn remove(&self, key: &str) -> Result<(), DomainError> {
        let _guard = self.lock.lock().await;
        let mut entries = self.read_entries().await?;

        if entries.remove(key).is_some() {
            self.write_entries(&entries).await?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(dir.path().join("session.json"));

        assert!(store.get("currentUser").await.unwrap().is_none());
        store.remove("currentUser").await.unwrap();
        assert!(!store.path().exists());
    }

    #[tokio::test]
    async fn test_set_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("session.json");

        FileSessionStore::new(&path)
            .set("currentUser", json!({"username": "desk1"}))
            .await
            .unwrap();

        let reopened = FileSessionStore::new(&path);
        assert_eq!(
            reopened.get("currentUser").await.unwrap(),
            Some(json!({"username": "desk1"}))
        );
    }

    #[tokio::test]
    async fn test_remove_keeps_other_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(dir.path().join("session.json"));

        store.set("currentUser", json!("a")).await.unwrap();
        store.set("theme", json!("dark")).await.unwrap();
        store.remove("currentUser").await.unwrap();

        assert!(store.get("currentUser").await.unwrap().is_none());
        assert_eq!(store.get("theme").await.unwrap(), Some(json!("dark")));
    }

    #[tokio::test]
    async fn test_corrupt_file_is_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        tokio::fs::write(&path, "{not json").await.unwrap();

        let store = FileSessionStore::new(&path);
        assert!(matches!(
            store.get("currentUser").await,
            Err(DomainError::Storage { .. })
        ));
    }
}

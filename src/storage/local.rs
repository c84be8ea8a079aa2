//! Local filesystem storage implementation.
//!
//! Keeps every collection in a single JSON file. Useful for development and
//! for running the watcher without cloud credentials.
//!
//! ## File Layout
//!
//! ```text
//! {
//!   "updated_at": "2026-01-12T08:00:00Z",
//!   "collections": {
//!     "internships": { "<id>": { ...document... } }
//!   }
//! }
//! ```

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::error::{AppError, Result};
use crate::storage::DocumentStore;

/// Contents of the store file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct StoreFile {
    updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    collections: BTreeMap<String, BTreeMap<String, Value>>,
}

/// Local filesystem storage backend.
pub struct LocalStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl LocalStore {
    /// Create a LocalStore backed by the file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the store file, treating a missing file as empty.
    async fn read(&self) -> Result<StoreFile> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(StoreFile::default()),
            Err(e) => Err(AppError::Io(e)),
        }
    }

    /// Write the store file atomically (write to temp, then rename).
    async fn write(&self, file: &StoreFile) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let bytes = serde_json::to_vec_pretty(file)?;
        let tmp = self.path.with_extension("tmp");
        let mut handle = tokio::fs::File::create(&tmp).await?;
        handle.write_all(&bytes).await?;
        handle.flush().await?;
        drop(handle);

        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for LocalStore {
    async fn stream_all_ids(&self, collection: &str) -> Result<HashSet<String>> {
        let file = self.read().await?;
        Ok(file
            .collections
            .get(collection)
            .map(|docs| docs.keys().cloned().collect())
            .unwrap_or_default())
    }

    async fn commit(&self, collection: &str, writes: &[(String, Value)]) -> Result<usize> {
        let _guard = self.write_lock.lock().await;

        let mut file = self.read().await?;
        let docs = file.collections.entry(collection.to_string()).or_default();
        for (id, doc) in writes {
            docs.insert(id.clone(), doc.clone());
        }
        file.updated_at = Some(Utc::now());

        self.write(&file).await?;
        log::debug!(
            "Committed {} documents to {} ({})",
            writes.len(),
            collection,
            self.path.display()
        );
        Ok(writes.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_missing_file_is_empty() {
        let dir = tempdir().unwrap();
        let store = LocalStore::new(dir.path().join("nothing.json"));
        assert!(store.stream_all_ids("internships").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_commit_then_read_ids() {
        let dir = tempdir().unwrap();
        let store = LocalStore::new(dir.path().join("nested/store.json"));

        let writes = vec![
            ("a1".to_string(), json!({"job_title": "Intern"})),
            ("a2".to_string(), json!({"job_title": "QA Intern"})),
        ];
        assert_eq!(store.commit("internships", &writes).await.unwrap(), 2);
        assert_eq!(
            store
                .commit("internships", &[("a3".to_string(), json!({}))])
                .await
                .unwrap(),
            1
        );

        let ids = store.stream_all_ids("internships").await.unwrap();
        assert_eq!(ids.len(), 3);
        assert!(ids.contains("a1") && ids.contains("a3"));
        assert!(store.stream_all_ids("other").await.unwrap().is_empty());
        assert!(!dir.path().join("nested/store.tmp").exists());
    }

    #[tokio::test]
    async fn test_commit_replaces_same_id() {
        let dir = tempdir().unwrap();
        let store = LocalStore::new(dir.path().join("store.json"));

        store
            .commit("internships", &[("a1".to_string(), json!({"v": 1}))])
            .await
            .unwrap();
        store
            .commit("internships", &[("a1".to_string(), json!({"v": 2}))])
            .await
            .unwrap();

        let raw = tokio::fs::read(store.path()).await.unwrap();
        let file: StoreFile = serde_json::from_slice(&raw).unwrap();
        assert_eq!(file.collections["internships"]["a1"]["v"], 2);
        assert!(file.updated_at.is_some());
    }

    #[tokio::test]
    async fn test_corrupt_file_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.json");
        tokio::fs::write(&path, b"not json").await.unwrap();

        let store = LocalStore::new(&path);
        assert!(matches!(
            store.stream_all_ids("internships").await,
            Err(AppError::Json(_))
        ));
    }
}

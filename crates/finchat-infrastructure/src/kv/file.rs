//! File-backed key-value store.
//!
//! All entries live in one JSON object on disk, shared by every process that
//! opens the same path. A mutation takes an exclusive lock on a sibling
//! `.lock` file, re-reads the document, changes the one key and rewrites the
//! file through a temporary sibling and an atomic rename. Concurrent writers
//! therefore never drop each other's keys, and a crash leaves either the old
//! or the new document, never a torn one.

use async_trait::async_trait;
use finchat_core::error::{FinchatError, Result};
use finchat_core::storage::KeyValueStore;
use fs2::FileExt;
use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io::Write as IoWrite;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;

type Document = BTreeMap<String, String>;

#[derive(Clone)]
pub struct FileKeyValueStore {
    path: PathBuf,
    /// Serializes this process's writers before they contend for the file lock.
    write_lock: Arc<Mutex<()>>,
}

impl FileKeyValueStore {
    /// Opens the store at `path` and checks that the existing document is
    /// readable.
    ///
    /// A missing or empty file opens as an empty store. A file that is not a
    /// JSON object of strings is reported as `StorageCorrupt`.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let store = Self {
            path: path.into(),
            write_lock: Arc::new(Mutex::new(())),
        };

        let entries = store.blocking(read_document).await?;
        tracing::debug!(
            "Opened key-value store at {} ({} entries)",
            store.path.display(),
            entries.len()
        );

        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Runs `f` against the store path on the blocking pool.
    async fn blocking<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&Path) -> Result<T> + Send + 'static,
    {
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || f(&path))
            .await
            .map_err(|e| FinchatError::internal(format!("Failed to join task: {}", e)))?
    }

    /// Applies `change` to the latest on-disk document under the file lock.
    async fn update<F>(&self, change: F) -> Result<()>
    where
        F: FnOnce(&mut Document) -> bool + Send + 'static,
    {
        let _guard = self.write_lock.lock().await;
        self.blocking(move |path| {
            let _lock = FileLock::acquire(path)?;
            let mut entries = read_document(path)?;
            if !change(&mut entries) {
                return Ok(());
            }
            let contents = serde_json::to_string_pretty(&entries)?;
            write_atomic(path, contents.as_bytes())?;
            Ok(())
        })
        .await
    }
}

#[async_trait]
impl KeyValueStore for FileKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let key = key.to_string();
        self.blocking(move |path| Ok(read_document(path)?.remove(&key)))
            .await
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let (key, value) = (key.to_string(), value.to_string());
        self.update(move |entries| {
            entries.insert(key, value);
            true
        })
        .await
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let key = key.to_string();
        self.update(move |entries| entries.remove(&key).is_some())
            .await
    }
}

/// Reads the whole document. Writers replace the file by rename, so a reader
/// sees either the old or the new document without taking the lock.
fn read_document(path: &Path) -> Result<Document> {
    match fs::read_to_string(path) {
        Ok(content) if content.trim().is_empty() => Ok(Document::new()),
        Ok(content) => serde_json::from_str(&content).map_err(|e| {
            FinchatError::storage_corrupt(path.display().to_string(), e.to_string())
        }),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Document::new()),
        Err(e) => Err(e.into()),
    }
}

/// Exclusive advisory lock on `<path>.lock`, released when dropped. The lock
/// file is never deleted.
struct FileLock {
    file: File,
}

impl FileLock {
    fn acquire(path: &Path) -> std::io::Result<Self> {
        let lock_path = path.with_extension("lock");
        if let Some(parent) = lock_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)?;
        FileExt::lock_exclusive(&file)?;
        Ok(Self { file })
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}

/// Writes `contents` to `path` via a temporary file and rename.
fn write_atomic(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }

    let file_name = path.file_name().ok_or_else(|| {
        std::io::Error::new(std::io::ErrorKind::InvalidInput, "Path has no file name")
    })?;
    let tmp_path = path.with_file_name(format!(".{}.tmp", file_name.to_string_lossy()));

    let mut tmp_file = File::create(&tmp_path)?;
    tmp_file.write_all(contents)?;
    tmp_file.sync_all()?;
    drop(tmp_file);

    fs::rename(&tmp_path, path)
}

//! File backends.
//!
//! Submissions are stored as JSON Lines: one record per line, appended with
//! `O_APPEND`. A line left unterminated by an interrupted append was never
//! acknowledged, so the next append truncates it before writing. The catalog
//! is a pretty-printed JSON array replaced atomically (write temp file,
//! rename).

use std::io::SeekFrom;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use canvass_core::{Catalog, SubmissionRecord};
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt};
use tokio::sync::Mutex;

use crate::error::StorageError;
use crate::traits::{CatalogStore, SubmissionStore};

/// Append-only JSON Lines submission store.
#[derive(Debug)]
pub struct JsonLinesStore {
    path: PathBuf,
    /// Serializes appends and keeps readers from seeing a half-written line.
    lock: Mutex<()>,
}

impl JsonLinesStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonLinesStore {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl SubmissionStore for JsonLinesStore {
    async fn append(&self, record: SubmissionRecord) -> Result<(), StorageError> {
        let mut line = serde_json::to_string(&record)?;
        line.push('\n');

        let _guard = self.lock.lock().await;
        ensure_parent(&self.path).await?;
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| StorageError::io(&self.path, e))?;
        drop_torn_tail(&mut file, &self.path)
            .await
            .map_err(|e| StorageError::io(&self.path, e))?;
        file.write_all(line.as_bytes())
            .await
            .map_err(|e| StorageError::io(&self.path, e))?;
        file.sync_data()
            .await
            .map_err(|e| StorageError::io(&self.path, e))?;

        tracing::debug!(
            submission_id = record.submission_id(),
            group_id = record.group_id(),
            path = %self.path.display(),
            "appended submission"
        );
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<SubmissionRecord>, StorageError> {
        let _guard = self.lock.lock().await;
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StorageError::io(&self.path, e)),
        };

        let mut records = Vec::new();
        for (index, line) in contents.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let record = serde_json::from_str(line).map_err(|e| {
                tracing::warn!(path = %self.path.display(), line = index + 1, "corrupt submission line");
                StorageError::Corrupt {
                    path: self.path.clone(),
                    line: index + 1,
                    message: e.to_string(),
                }
            })?;
            records.push(record);
        }
        Ok(records)
    }
}

/// Truncate `file` back to its last newline if it does not end with one.
async fn drop_torn_tail(file: &mut File, path: &Path) -> std::io::Result<()> {
    let len = file.metadata().await?.len();
    if len == 0 {
        return Ok(());
    }
    file.seek(SeekFrom::End(-1)).await?;
    let mut last = [0u8; 1];
    file.read_exact(&mut last).await?;
    if last[0] == b'\n' {
        return Ok(());
    }

    let bytes = tokio::fs::read(path).await?;
    let keep = bytes
        .iter()
        .rposition(|b| *b == b'\n')
        .map_or(0, |i| i + 1) as u64;
    tracing::warn!(
        path = %path.display(),
        dropped_bytes = len - keep,
        "discarding unterminated submission line"
    );
    file.set_len(keep).await
}

/// Catalog stored as a JSON array of question definitions.
#[derive(Debug, Clone)]
pub struct JsonCatalogFile {
    path: PathBuf,
}

impl JsonCatalogFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonCatalogFile { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl CatalogStore for JsonCatalogFile {
    async fn load(&self) -> Result<Option<Catalog>, StorageError> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StorageError::io(&self.path, e)),
        };
        let catalog = serde_json::from_str(&contents).map_err(|e| StorageError::Corrupt {
            path: self.path.clone(),
            line: e.line(),
            message: e.to_string(),
        })?;
        Ok(Some(catalog))
    }

    async fn save(&self, catalog: &Catalog) -> Result<(), StorageError> {
        let json = serde_json::to_string_pretty(catalog)?;
        ensure_parent(&self.path).await?;

        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json)
            .await
            .map_err(|e| StorageError::io(&tmp, e))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| StorageError::io(&self.path, e))?;
        tracing::debug!(path = %self.path.display(), questions = catalog.len(), "saved catalog");
        Ok(())
    }
}

async fn ensure_parent(path: &Path) -> Result<(), StorageError> {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => tokio::fs::create_dir_all(dir)
            .await
            .map_err(|e| StorageError::io(dir, e)),
        _ => Ok(()),
    }
}

use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use async_trait::async_trait;
use tempfile::NamedTempFile;
use tracing::{debug, info};
use uuid::Uuid;

use super::{decode, encode, ResultStore};
use crate::errors::AppError;
use crate::models::scoring::ScoredTitle;

/// File name of the latest result, read directly by the static front end.
pub const LATEST_FILE: &str = "results.json";

/// Keeps each result in `<dir>/<id>.json` and mirrors the latest to
/// `<dir>/results.json`. Writes go through a temp file and a rename, so
/// readers never see a partial file. Per-submission files older than the TTL
/// are removed on every `put`; `results.json` is never removed.
pub struct FileResultStore {
    dir: PathBuf,
    ttl: Duration,
}

impl FileResultStore {
    pub fn new(dir: impl Into<PathBuf>, ttl_secs: u64) -> Self {
        Self {
            dir: dir.into(),
            ttl: Duration::from_secs(ttl_secs),
        }
    }

    fn result_path(&self, id: Uuid) -> PathBuf {
        self.dir.join(format!("{id}.json"))
    }

    async fn read(&self, path: PathBuf) -> Result<Option<Vec<ScoredTitle>>, AppError> {
        match tokio::fs::read(&path).await {
            Ok(bytes) => decode(&bytes).map(Some),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::ResultStore(format!(
                "failed to read {}: {e}",
                path.display()
            ))),
        }
    }
}

#[async_trait]
impl ResultStore for FileResultStore {
    async fn put(&self, id: Uuid, results: &[ScoredTitle]) -> Result<(), AppError> {
        let bytes = encode(results)?;
        let dir = self.dir.clone();
        let ttl = self.ttl;
        let result_path = self.result_path(id);

        tokio::task::spawn_blocking(move || -> std::io::Result<()> {
            std::fs::create_dir_all(&dir)?;
            sweep_expired(&dir, ttl, SystemTime::now())?;
            write_atomic(&dir, &result_path, &bytes)?;
            write_atomic(&dir, &dir.join(LATEST_FILE), &bytes)
        })
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("result writer panicked: {e}")))?
        .map_err(|e| AppError::ResultStore(format!("failed to write result {id}: {e}")))?;

        info!("Stored {} scored titles for submission {id}", results.len());
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Vec<ScoredTitle>>, AppError> {
        self.read(self.result_path(id)).await
    }

    async fn latest(&self) -> Result<Option<Vec<ScoredTitle>>, AppError> {
        self.read(self.dir.join(LATEST_FILE)).await
    }
}

/// Removes `<uuid>.json` files last modified more than `ttl` before `now`.
/// Anything not named after a submission id is left alone.
fn sweep_expired(dir: &Path, ttl: Duration, now: SystemTime) -> std::io::Result<usize> {
    let mut removed = 0;
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        let is_result = path.extension().is_some_and(|ext| ext == "json")
            && path
                .file_stem()
                .and_then(|stem| stem.to_str())
                .is_some_and(|stem| Uuid::parse_str(stem).is_ok());
        if !is_result {
            continue;
        }

        let modified = entry.metadata()?.modified()?;
        let age = now.duration_since(modified).unwrap_or(Duration::ZERO);
        if age > ttl {
            match std::fs::remove_file(&path) {
                Ok(()) => removed += 1,
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => return Err(e),
            }
        }
    }
    if removed > 0 {
        debug!("Removed {removed} expired results from {}", dir.display());
    }
    Ok(removed)
}

fn write_atomic(dir: &Path, target: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(target).map_err(|e| e.error)?;
    Ok(())
}

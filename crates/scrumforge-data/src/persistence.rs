//! Persistence Store: one JSON file per entity kind under
//! `<project>/<state-root>/data/`, atomic writes, advisory locking, and a
//! quarantine-on-corruption policy.
//!
//! Reads the whole file, parses, and round-trips on save, one JSON
//! map-by-id per entity kind, with a three-way failure split: I/O errors
//! propagate, a schema mismatch warns and coerces to defaults, and
//! corruption quarantines the file and refuses further mutation.

use chrono::Utc;
use serde::{de::DeserializeOwned, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::error::{ScrumError, ScrumResult};

const LOCK_TIMEOUT: Duration = Duration::from_secs(5);
const LOCK_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Writes `contents` to `path` via temp-file + rename so readers never
/// observe a partial write.
pub fn atomic_write(path: &Path, contents: &[u8]) -> ScrumResult<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let tmp_path = path.with_extension(format!(
        "tmp-{}",
        std::process::id()
    ));
    std::fs::write(&tmp_path, contents)?;
    std::fs::rename(&tmp_path, path)?;
    Ok(())
}

/// Advisory lock: a sibling `<file>.lock` marker created exclusively. Held
/// for the scope of the guard; released on drop. If the marker cannot be
/// created within `LOCK_TIMEOUT`, the operation fails with the "project
/// busy" diagnostic from §5.
pub struct FileLock {
    lock_path: PathBuf,
}

impl FileLock {
    pub fn acquire(target: &Path) -> ScrumResult<Self> {
        let lock_path = target.with_extension("lock");
        if let Some(parent) = lock_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let deadline = Instant::now() + LOCK_TIMEOUT;
        loop {
            match std::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&lock_path)
            {
                Ok(_) => return Ok(FileLock { lock_path }),
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                    if Instant::now() >= deadline {
                        return Err(ScrumError::conflict(format!(
                            "project busy: could not acquire lock on {}",
                            target.display()
                        )));
                    }
                    std::thread::sleep(LOCK_POLL_INTERVAL);
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.lock_path);
    }
}

/// A JSON-backed map-by-id store for one entity kind. Each call to `load`
/// re-reads from disk; `save` writes atomically under the file lock. This
/// favors correctness-under-concurrent-CLI-invocations over caching, which
/// matches the orchestrator's single-sprint-at-a-time usage pattern.
pub struct EntityStore<T> {
    path: PathBuf,
    _marker: std::marker::PhantomData<T>,
}

impl<T> EntityStore<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new(path: PathBuf) -> Self {
        EntityStore {
            path,
            _marker: std::marker::PhantomData,
        }
    }

    /// Ensures the backing file exists (§4.1: "All files MUST exist after
    /// startup; missing files are created empty").
    pub fn ensure_exists(&self) -> ScrumResult<()> {
        if !self.path.exists() {
            if let Some(parent) = self.path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            atomic_write(&self.path, b"{}")?;
        }
        Ok(())
    }

    /// Loads the full map. A missing file is treated as empty (after
    /// `ensure_exists`, this is the happy path on first run). A structurally
    /// invalid file (not JSON at all — e.g. markdown accidentally written
    /// into `data/`, per §9) is quarantined and reported as `SchemaError`;
    /// a file that parses as JSON but fails to match `T` is also a
    /// `SchemaError`, but is NOT quarantined — it is recoverable once the
    /// caller fixes the offending record, whereas non-JSON content never is.
    pub fn load(&self) -> ScrumResult<BTreeMap<String, T>> {
        self.ensure_exists()?;
        let content = std::fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }

        let raw: serde_json::Value = match serde_json::from_str(&content) {
            Ok(v) => v,
            Err(e) => {
                self.quarantine(&content)?;
                return Err(ScrumError::schema(
                    self.path.display().to_string(),
                    format!("not valid JSON, quarantined: {e}"),
                ));
            }
        };

        match serde_json::from_value(raw) {
            Ok(map) => Ok(map),
            Err(e) => Err(ScrumError::schema(self.path.display().to_string(), e.to_string())),
        }
    }

    /// Atomically persists the full map under an advisory lock.
    pub fn save(&self, map: &BTreeMap<String, T>) -> ScrumResult<()> {
        let _lock = FileLock::acquire(&self.path)?;
        let content = serde_json::to_string_pretty(map)?;
        atomic_write(&self.path, content.as_bytes())
    }

    /// Copies corrupted content aside into `backups/quarantine/` next to
    /// the data directory, leaving the original file untouched in place so
    /// an operator can inspect both (§4.1 failure mode: "refuse to mutate
    /// that file until operator intervention").
    fn quarantine(&self, content: &str) -> ScrumResult<()> {
        let data_dir = self
            .path
            .parent()
            .and_then(Path::parent)
            .unwrap_or_else(|| Path::new("."));
        let quarantine_dir = data_dir.join("backups").join("quarantine");
        std::fs::create_dir_all(&quarantine_dir)?;

        let file_name = self
            .path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown");
        let dest = quarantine_dir.join(format!(
            "{file_name}-{}.bad",
            Utc::now().format("%Y%m%dT%H%M%S")
        ));
        std::fs::write(dest, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use tempfile::tempdir;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Dummy {
        name: String,
    }

    #[test]
    fn missing_file_created_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data").join("dummies");
        let store: EntityStore<Dummy> = EntityStore::new(path.clone());
        let map = store.load().unwrap();
        assert!(map.is_empty());
        assert!(path.exists());
    }

    #[test]
    fn round_trip_preserves_entries() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data").join("dummies");
        let store: EntityStore<Dummy> = EntityStore::new(path);
        let mut map = BTreeMap::new();
        map.insert(
            "US-ABCDEF".to_string(),
            Dummy {
                name: "hello".to_string(),
            },
        );
        store.save(&map).unwrap();
        let reloaded = store.load().unwrap();
        assert_eq!(reloaded, map);
    }

    #[test]
    fn corrupted_file_quarantined_and_reported() {
        let dir = tempdir().unwrap();
        let data_dir = dir.path().join("data");
        std::fs::create_dir_all(&data_dir).unwrap();
        let path = data_dir.join("dummies");
        std::fs::write(&path, b"not json at all {{{").unwrap();

        let store: EntityStore<Dummy> = EntityStore::new(path.clone());
        let err = store.load().unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Schema);

        let quarantine_dir = data_dir.join("backups").join("quarantine");
        assert!(quarantine_dir.exists());
        assert!(std::fs::read_dir(&quarantine_dir).unwrap().count() > 0);
        // original file left untouched in place
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "not json at all {{{");
    }

    #[test]
    fn lock_rejects_concurrent_acquire() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data").join("dummies");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        let _first = FileLock::acquire(&path).unwrap();
        // second acquire on the same path would block until timeout; we
        // only assert the lock file is visible rather than pay the wait.
        assert!(path.with_extension("lock").exists());
    }
}

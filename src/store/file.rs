//! JSON file store
//!
//! The whole store is one JSON snapshot, rewritten atomically on commit.
//! Transactions hold an exclusive `flock` on a sidecar `.lock` file from load
//! to save, so separate processes sharing the file serialize.

use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::{BsdError, Result};
use crate::fs::{read_json, write_json};
use crate::schemas::{Bordereau, BordereauId};

use super::{lock_poisoned, BordereauStore, StagedWork, UnitOfWork};

/// Serialized content of a store file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreSnapshot {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    #[serde(default)]
    pub bordereaux: Vec<Bordereau>,
}

fn default_schema_version() -> u32 {
    1
}

impl Default for StoreSnapshot {
    fn default() -> Self {
        StoreSnapshot {
            schema_version: default_schema_version(),
            bordereaux: Vec::new(),
        }
    }
}

/// Store backed by a single JSON file
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonFileStore {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".lock");
        self.path.with_file_name(name)
    }

    fn load(&self) -> Result<BTreeMap<BordereauId, Bordereau>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let snapshot: StoreSnapshot = read_json(&self.path)?;
        Ok(snapshot
            .bordereaux
            .into_iter()
            .map(|doc| (doc.id.clone(), doc))
            .collect())
    }

    fn save(&self, docs: BTreeMap<BordereauId, Bordereau>) -> Result<()> {
        let snapshot = StoreSnapshot {
            bordereaux: docs.into_values().collect(),
            ..Default::default()
        };
        write_json(&self.path, &snapshot)
    }
}

/// Exclusive advisory lock, released when dropped
struct FileLock {
    _file: File,
}

impl FileLock {
    fn acquire(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .open(path)?;
        flock_exclusive(&file)?;
        Ok(FileLock { _file: file })
    }
}

/// Block until an exclusive flock is held on `file`.
fn flock_exclusive(file: &File) -> io::Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::io::AsRawFd;
        let fd = file.as_raw_fd();
        loop {
            // SAFETY: flock is a standard POSIX call. fd is a valid file
            // descriptor owned by `file` for the duration of the call.
            #[allow(unsafe_code)]
            let result = unsafe { libc::flock(fd, libc::LOCK_EX) };
            if result == 0 {
                return Ok(());
            }
            let err = io::Error::last_os_error();
            if err.kind() != io::ErrorKind::Interrupted {
                return Err(err);
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = file;
        Ok(())
    }
}

impl BordereauStore for JsonFileStore {
    fn transaction<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut dyn UnitOfWork) -> Result<T>,
    {
        let _guard = self.lock.lock().map_err(lock_poisoned)?;
        let _file_lock = FileLock::acquire(&self.lock_path())?;
        let mut docs = self.load()?;
        let mut work = StagedWork::new(&docs);
        let value = f(&mut work)?;
        let staged = work.into_staged();
        if !staged.is_empty() {
            debug!(path = %self.path.display(), count = staged.len(), "committing staged documents");
            docs.extend(staged);
            self.save(docs).map_err(|e| {
                BsdError::TransactionFailed(format!(
                    "could not commit to {}: {}",
                    self.path.display(),
                    e
                ))
            })?;
        }
        Ok(value)
    }

    fn list(&self) -> Result<Vec<Bordereau>> {
        let _guard = self.lock.lock().map_err(lock_poisoned)?;
        Ok(self
            .load()?
            .into_values()
            .filter(|doc| !doc.is_deleted)
            .collect())
    }
}

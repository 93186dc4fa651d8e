//! Per-photo favourite flags, keyed by photo ID.

use std::{
    collections::HashMap,
    fs, io,
    path::{Path, PathBuf},
    sync::{Mutex, PoisonError, RwLock},
};

use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum Error {
    #[error("{0}")]
    Io(#[from] io::Error),

    #[error("Malformed favourites file: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = core::result::Result<T, Error>;

pub trait FavouriteStore: Send + Sync {
    fn get(&self, key: &str) -> bool;

    fn set(&self, key: &str, favourite: bool) -> Result<()>;
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    flags: RwLock<HashMap<String, bool>>,
}

impl FavouriteStore for MemoryStore {
    fn get(&self, key: &str) -> bool {
        let flags = self.flags.read().unwrap_or_else(PoisonError::into_inner);

        flags.get(key).copied().unwrap_or(false)
    }

    fn set(&self, key: &str, favourite: bool) -> Result<()> {
        let mut flags = self.flags.write().unwrap_or_else(PoisonError::into_inner);
        flags.insert(key.to_string(), favourite);

        Ok(())
    }
}

/// Flags persisted as a JSON object, rewritten on every change.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    flags: Mutex<HashMap<String, bool>>,
}

impl FileStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let flags = match fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content)?,
            Err(err) if err.kind() == io::ErrorKind::NotFound => HashMap::new(),
            Err(err) => return Err(err.into()),
        };
        debug!(path = %path.display(), count = flags.len(), "opened favourites");

        Ok(Self {
            path,
            flags: Mutex::new(flags),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn favourites(&self) -> Vec<String> {
        let flags = self.flags.lock().unwrap_or_else(PoisonError::into_inner);

        let mut ids: Vec<_> = flags
            .iter()
            .filter(|(_, favourite)| **favourite)
            .map(|(id, _)| id.clone())
            .collect();
        ids.sort();

        ids
    }
}

impl FavouriteStore for FileStore {
    fn get(&self, key: &str) -> bool {
        let flags = self.flags.lock().unwrap_or_else(PoisonError::into_inner);

        flags.get(key).copied().unwrap_or(false)
    }

    fn set(&self, key: &str, favourite: bool) -> Result<()> {
        let mut flags = self.flags.lock().unwrap_or_else(PoisonError::into_inner);

        let mut updated = flags.clone();
        updated.insert(key.to_string(), favourite);

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(&updated)?;
        fs::write(&self.path, content)?;

        *flags = updated;

        Ok(())
    }
}

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use casegrid_types::Sheet;

use super::{StoreError, TabularStore};

/// In-memory store keyed by path, used by tests and dry runs.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    sheets: Mutex<HashMap<PathBuf, Sheet>>,
    read_only: Mutex<HashSet<PathBuf>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a sheet without going through [`TabularStore::save`].
    pub fn insert(&self, path: impl Into<PathBuf>, sheet: Sheet) {
        self.sheets.lock().expect("store lock poisoned").insert(path.into(), sheet);
    }

    /// Current content stored at `path`.
    pub fn get(&self, path: &Path) -> Option<Sheet> {
        self.sheets.lock().expect("store lock poisoned").get(path).cloned()
    }

    /// Make saves to `path` fail with [`StoreError::ReadOnly`].
    pub fn set_read_only(&self, path: impl Into<PathBuf>, read_only: bool) {
        let mut guarded = self.read_only.lock().expect("store lock poisoned");
        let path = path.into();
        if read_only {
            guarded.insert(path);
        } else {
            guarded.remove(&path);
        }
    }
}

impl TabularStore for InMemoryStore {
    fn load(&self, path: &Path) -> Result<Sheet, StoreError> {
        self.get(path).ok_or_else(|| StoreError::NotFound { path: path.to_path_buf() })
    }

    fn save(&self, path: &Path, sheet: &Sheet) -> Result<(), StoreError> {
        if self.read_only.lock().expect("store lock poisoned").contains(path) {
            return Err(StoreError::ReadOnly { path: path.to_path_buf() });
        }
        self.insert(path, sheet.clone());
        Ok(())
    }
}

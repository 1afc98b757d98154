//! Fold store backends.
//!
//! A [`FoldStore`] materializes the four arrays of a fold once and serves
//! them to any number of readers for the lifetime of the search. The
//! in-memory backend shares a single copy via `Arc`; the on-disk backend
//! trades sharing for durability and hands each reader its own copy.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use cf_types::{Matrix, StorageError};

/// Opaque reference to one materialized fold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FoldHandle {
    id: Uuid,
    pub fold_index: usize,
}

/// The four arrays of one fold: train X/y and test X/y.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoldData {
    pub x_train: Matrix,
    pub y_train: Vec<f64>,
    pub x_test: Matrix,
    pub y_test: Vec<f64>,
}

/// Write-once, read-many storage for materialized folds.
pub trait FoldStore: Send + Sync {
    fn put(&self, fold_index: usize, data: FoldData) -> Result<FoldHandle, StorageError>;

    /// Read-only view of a previously stored fold. Fails with
    /// [`StorageError::UnknownHandle`] for handles this store never issued.
    fn get(&self, handle: FoldHandle) -> Result<Arc<FoldData>, StorageError>;
}

/// Counters for fold store traffic
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreStats {
    pub puts: u64,
    pub gets: u64,
    pub misses: u64,
}

/// In-memory fold store backed by a concurrent map.
///
/// `get` hands out `Arc` views of a single materialization, so concurrent
/// workers read the same arrays without copying them.
#[derive(Debug, Default)]
pub struct MemoryFoldStore {
    entries: DashMap<Uuid, Arc<FoldData>>,
    stats: RwLock<StoreStats>,
}

impl MemoryFoldStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> StoreStats {
        self.stats.read().clone()
    }
}

impl FoldStore for MemoryFoldStore {
    fn put(&self, fold_index: usize, data: FoldData) -> Result<FoldHandle, StorageError> {
        let handle = FoldHandle {
            id: Uuid::new_v4(),
            fold_index,
        };
        self.entries.insert(handle.id, Arc::new(data));
        self.stats.write().puts += 1;
        Ok(handle)
    }

    fn get(&self, handle: FoldHandle) -> Result<Arc<FoldData>, StorageError> {
        {
            let mut stats = self.stats.write();
            stats.gets += 1;
        }

        match self.entries.get(&handle.id) {
            Some(entry) => Ok(Arc::clone(entry.value())),
            None => {
                self.stats.write().misses += 1;
                Err(StorageError::UnknownHandle(handle.id))
            }
        }
    }
}

/// On-disk fold store writing one JSON file per fold.
///
/// Fallback backend for execution environments without shared memory: each
/// `get` deserializes a private copy, at a performance cost but no
/// correctness cost.
#[derive(Debug)]
pub struct DiskFoldStore {
    root: PathBuf,
}

impl DiskFoldStore {
    pub fn new<P: AsRef<Path>>(root: P) -> Result<Self, StorageError> {
        let root = root.as_ref().to_path_buf();
        std::fs::create_dir_all(&root).map_err(|e| StorageError::WriteFailed {
            fold_index: 0,
            message: format!("cannot create store root {}: {}", root.display(), e),
        })?;
        Ok(Self { root })
    }

    fn fold_path(&self, handle: FoldHandle) -> PathBuf {
        self.root
            .join(format!("fold-{}-{}.json", handle.fold_index, handle.id))
    }
}

impl FoldStore for DiskFoldStore {
    fn put(&self, fold_index: usize, data: FoldData) -> Result<FoldHandle, StorageError> {
        let handle = FoldHandle {
            id: Uuid::new_v4(),
            fold_index,
        };

        let payload = serde_json::to_vec(&data).map_err(|e| StorageError::WriteFailed {
            fold_index,
            message: format!("serialization failed: {e}"),
        })?;

        std::fs::write(self.fold_path(handle), payload).map_err(|e| {
            StorageError::WriteFailed {
                fold_index,
                message: e.to_string(),
            }
        })?;

        Ok(handle)
    }

    fn get(&self, handle: FoldHandle) -> Result<Arc<FoldData>, StorageError> {
        let path = self.fold_path(handle);
        let payload = match std::fs::read(&path) {
            Ok(payload) => payload,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StorageError::UnknownHandle(handle.id));
            }
            Err(e) => {
                return Err(StorageError::ReadFailed {
                    message: format!("{}: {}", path.display(), e),
                });
            }
        };

        let data: FoldData = serde_json::from_slice(&payload).map_err(|e| {
            StorageError::ReadFailed {
                message: format!("{}: {}", path.display(), e),
            }
        })?;

        Ok(Arc::new(data))
    }
}

use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::CacheError;
use crate::Snapshot;

pub type SnapshotStoreRef = Arc<dyn SnapshotStore>;

/// Raw storage for the persisted entry snapshot
#[mockall::automock]
pub trait SnapshotStore: Send + Sync {
  /// `None` when nothing has been persisted yet
  fn read(&self) -> anyhow::Result<Option<Vec<u8>>>;

  fn write(&self, bytes: &[u8]) -> anyhow::Result<()>;
}

/// Stores the snapshot in a single JSON file
#[derive(Clone, Debug)]
pub struct FsSnapshotStore {
  path: PathBuf,
}

impl FsSnapshotStore {
  pub fn new(path: impl Into<PathBuf>) -> Self {
    Self { path: path.into() }
  }

  pub fn path(&self) -> &Path {
    &self.path
  }
}

impl SnapshotStore for FsSnapshotStore {
  fn read(&self) -> anyhow::Result<Option<Vec<u8>>> {
    match fs::read(&self.path) {
      Ok(bytes) => Ok(Some(bytes)),
      Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(None),
      Err(error) => Err(error.into()),
    }
  }

  fn write(&self, bytes: &[u8]) -> anyhow::Result<()> {
    if let Some(parent) = self.path.parent() {
      fs::create_dir_all(parent)?;
    }
    fs::write(&self.path, bytes)?;
    Ok(())
  }
}

#[derive(Debug, Default)]
pub struct MemorySnapshotStore {
  bytes: Mutex<Option<Vec<u8>>>,
}

impl MemorySnapshotStore {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_bytes(bytes: impl Into<Vec<u8>>) -> Self {
    Self {
      bytes: Mutex::new(Some(bytes.into())),
    }
  }
}

impl SnapshotStore for MemorySnapshotStore {
  fn read(&self) -> anyhow::Result<Option<Vec<u8>>> {
    Ok(self.bytes.lock().clone())
  }

  fn write(&self, bytes: &[u8]) -> anyhow::Result<()> {
    *self.bytes.lock() = Some(bytes.to_vec());
    Ok(())
  }
}

/// Encodes a snapshot as `[["key", bits], ...]`
pub fn encode_snapshot(snapshot: &Snapshot) -> Result<Vec<u8>, CacheError> {
  Ok(serde_json::to_vec(snapshot)?)
}

pub fn decode_snapshot(bytes: &[u8]) -> Result<Snapshot, CacheError> {
  Ok(serde_json::from_slice(bytes)?)
}

/// Reads a snapshot from `store`, `None` when the store is empty
pub fn read_snapshot(store: &dyn SnapshotStore) -> Result<Option<Snapshot>, CacheError> {
  store
    .read()?
    .map(|bytes| decode_snapshot(&bytes))
    .transpose()
}

pub fn write_snapshot(store: &dyn SnapshotStore, snapshot: &Snapshot) -> Result<(), CacheError> {
  store.write(&encode_snapshot(snapshot)?)?;
  Ok(())
}

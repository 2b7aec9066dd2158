// /storage.rs
use crate::error::StoreError;
use enum_dispatch::enum_dispatch;
use serde::{Serialize, de::DeserializeOwned};
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

/// Keys under which the repositories keep their blobs.
pub mod storage_keys {
    pub const CHARACTERS: &str = "characters";
    pub const DEFINITIONS: &str = "definitions";
}

/// String key-value storage, the local equivalent of browser storage.
#[enum_dispatch]
pub trait KeyValueStore {
    /// Load the value under `key`, `None` if nothing is stored.
    fn load(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Store `value` under `key`, replacing any previous value.
    fn save(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Remove `key`. Removing a missing key succeeds.
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

// One `<key>.json` file per key inside `dir`.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        FileStore { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn load(&self, key: &str) -> Result<Option<String>, StoreError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, key: &str, value: &str) -> Result<(), StoreError> {
        fs::create_dir_all(&self.dir)?;
        // Write beside the target and rename so a crash never leaves half a blob.
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-memory store. Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: Arc<RwLock<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<T>(_: T) -> StoreError {
    StoreError::Unavailable("memory store lock poisoned".to_string())
}

impl KeyValueStore for MemoryStore {
    fn load(&self, key: &str) -> Result<Option<String>, StoreError> {
        let values = self.values.read().map_err(poisoned)?;
        Ok(values.get(key).cloned())
    }

    fn save(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut values = self.values.write().map_err(poisoned)?;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let mut values = self.values.write().map_err(poisoned)?;
        values.remove(key);
        Ok(())
    }
}

#[enum_dispatch(KeyValueStore)]
#[derive(Debug, Clone)]
pub enum AnyStore {
    FileStore,
    MemoryStore,
}

/// Opens file storage in `dir`, or falls back to memory when no usable
/// directory is available. Records kept in memory are lost on exit.
pub fn open_default(dir: Option<&Path>) -> AnyStore {
    match dir {
        Some(dir) => match fs::create_dir_all(dir) {
            Ok(()) => {
                log::info!("Using file storage in {}", dir.display());
                FileStore::new(dir).into()
            }
            Err(e) => {
                log::warn!(
                    "Storage directory {} unavailable ({e}), keeping records in memory",
                    dir.display()
                );
                MemoryStore::new().into()
            }
        },
        None => {
            log::warn!("No storage directory available, keeping records in memory");
            MemoryStore::new().into()
        }
    }
}

/// Reads and parses the blob under `key`. A missing or blank value yields
/// `T::default()`; unparsable text yields [`StoreError::Corrupt`].
pub fn read_blob<T, S>(store: &S, key: &str) -> Result<T, StoreError>
where
    T: DeserializeOwned + Default,
    S: KeyValueStore + ?Sized,
{
    match store.load(key)? {
        Some(data) if !data.trim().is_empty() => {
            serde_json::from_str(&data).map_err(|source| StoreError::Corrupt {
                key: key.to_string(),
                source,
            })
        }
        _ => Ok(T::default()),
    }
}

pub fn write_blob<T, S>(store: &S, key: &str, value: &T) -> Result<(), StoreError>
where
    T: Serialize + ?Sized,
    S: KeyValueStore + ?Sized,
{
    let serialized = serde_json::to_string_pretty(value)?;
    store.save(key, &serialized)
}

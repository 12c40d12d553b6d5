use crate::errors::StoreError;
use crate::models::SessionLog;
use std::collections::BTreeMap;
use std::future::Future;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, error, info, warn};

pub const DEFAULT_STORAGE_KEY: &str = "fisioTrackLogs";

pub const MOCK_PATIENT_ID: &str = "user-joshua-gongora";
pub const MOCK_PHYSIO_ID: &str = "user-hugo-estrella";

/// Durable string key-value storage, the shape of browser local storage.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> impl Future<Output = Option<String>> + Send;

    fn set(&mut self, key: &str, value: String) -> impl Future<Output = Result<(), StoreError>> + Send;
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raw(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }
}

impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    async fn set(&mut self, key: &str, value: String) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }
}

/// Key-value store mirrored to a single JSON object on disk.
///
/// Every `set` rewrites the whole file, so the file is always a complete
/// snapshot of the map.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl FileStore {
    pub async fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = load_entries(&path).await;
        debug!(path = %path.display(), keys = entries.len(), "opened file store");
        Self { path, entries }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    /// The in-memory map only changes once the file write has succeeded.
    async fn set(&mut self, key: &str, value: String) -> Result<(), StoreError> {
        let mut next = self.entries.clone();
        next.insert(key.to_string(), value);
        let payload = serde_json::to_vec_pretty(&next)?;
        if let Err(err) = fs::write(&self.path, payload).await {
            error!("failed to write store file {}: {err}", self.path.display());
            return Err(err.into());
        }
        self.entries = next;
        Ok(())
    }
}

async fn load_entries(path: &Path) -> BTreeMap<String, String> {
    match fs::read(path).await {
        Ok(bytes) => match serde_json::from_slice(&bytes) {
            Ok(entries) => entries,
            Err(err) => {
                error!("failed to parse store file: {err}");
                BTreeMap::new()
            }
        },
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
        Err(err) => {
            error!("failed to read store file: {err}");
            BTreeMap::new()
        }
    }
}

/// Maps an optional identity to the storage key holding its logs.
///
/// Aliased identities read and write another identity's key. The default
/// table routes the mock physio to the mock patient's logs; a real
/// deployment would look the patient up per request instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageKeys {
    base: String,
    aliases: BTreeMap<String, String>,
}

impl StorageKeys {
    pub fn new(base: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            aliases: BTreeMap::new(),
        }
    }

    /// Keeps the alias table but stores under a different base key.
    pub fn with_base(mut self, base: impl Into<String>) -> Self {
        self.base = base.into();
        self
    }

    pub fn with_alias(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.aliases.insert(from.into(), to.into());
        self
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn resolve(&self, owner: Option<&str>) -> String {
        match owner {
            None => self.base.clone(),
            Some(id) => {
                let id = self.aliases.get(id).map(String::as_str).unwrap_or(id);
                format!("{}_{}", self.base, id)
            }
        }
    }
}

impl Default for StorageKeys {
    fn default() -> Self {
        Self::new(DEFAULT_STORAGE_KEY).with_alias(MOCK_PHYSIO_ID, MOCK_PATIENT_ID)
    }
}

/// Persistence adapter for the session-log collection.
///
/// Each resolved key holds the full collection as one JSON array. Writes
/// replace the whole array.
#[derive(Debug)]
pub struct LogStore<S> {
    kv: S,
    keys: StorageKeys,
}

impl<S: KeyValueStore> LogStore<S> {
    pub fn new(kv: S, keys: StorageKeys) -> Self {
        Self { kv, keys }
    }

    pub fn kv(&self) -> &S {
        &self.kv
    }

    /// Absent or unreadable values load as an empty collection.
    pub async fn load(&self, owner: Option<&str>) -> Vec<SessionLog> {
        let key = self.keys.resolve(owner);
        let Some(raw) = self.kv.get(&key).await else {
            return Vec::new();
        };
        match serde_json::from_str(&raw) {
            Ok(logs) => logs,
            Err(err) => {
                warn!(%key, "discarding unreadable logs: {err}");
                Vec::new()
            }
        }
    }

    pub async fn save(&mut self, logs: &[SessionLog], owner: Option<&str>) -> Result<(), StoreError> {
        let key = self.keys.resolve(owner);
        let payload = serde_json::to_string(logs)?;
        self.kv.set(&key, payload).await?;
        debug!(%key, count = logs.len(), "saved logs");
        Ok(())
    }

    /// Loads, applies `mutate`, and writes back as one operation.
    ///
    /// Nothing is written when `mutate` fails.
    pub async fn update<F>(&mut self, owner: Option<&str>, mutate: F) -> Result<Vec<SessionLog>, StoreError>
    where
        F: FnOnce(&mut Vec<SessionLog>) -> Result<(), StoreError>,
    {
        let mut logs = self.load(owner).await;
        mutate(&mut logs)?;
        self.save(&logs, owner).await?;
        Ok(logs)
    }

    /// Appends `log`, rejecting an id that is already in the collection.
    pub async fn append(&mut self, log: SessionLog, owner: Option<&str>) -> Result<Vec<SessionLog>, StoreError> {
        let id = log.id.clone();
        let logs = self
            .update(owner, |logs| {
                if logs.iter().any(|existing| existing.id == log.id) {
                    return Err(StoreError::DuplicateId(log.id));
                }
                logs.push(log);
                Ok(())
            })
            .await?;
        info!(%id, total = logs.len(), "appended session log");
        Ok(logs)
    }

    pub async fn remove(&mut self, log_id: &str, owner: Option<&str>) -> Result<Vec<SessionLog>, StoreError> {
        let logs = self
            .update(owner, |logs| {
                logs.retain(|log| log.id != log_id);
                Ok(())
            })
            .await?;
        info!(id = log_id, total = logs.len(), "removed session log");
        Ok(logs)
    }
}

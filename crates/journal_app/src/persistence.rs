use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use journal_engine::{AtomicFileWriter, KeyValueStore, StoreError};
use journal_logging::{journal_debug, journal_info};
use serde::{Deserialize, Serialize};

const STORE_FILENAME: &str = ".journal_store.ron";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct PersistedStore {
    entries: BTreeMap<String, String>,
}

/// Key-value store kept as a single RON file in the data directory.
///
/// Every mutation rewrites the whole file through [`AtomicFileWriter`], so a
/// crash mid-write leaves the previous contents in place.
#[derive(Debug)]
pub struct RonFileStore {
    writer: AtomicFileWriter,
    entries: Mutex<BTreeMap<String, String>>,
}

impl RonFileStore {
    /// Opens the store in `data_dir`. A missing file is an empty store.
    pub fn open(data_dir: &Path) -> Result<Self, StoreError> {
        let path = data_dir.join(STORE_FILENAME);
        let entries = match fs::read_to_string(&path) {
            Ok(content) => {
                let state: PersistedStore = ron::from_str(&content)
                    .map_err(|err| StoreError::Format(format!("{:?}: {}", path, err)))?;
                journal_info!("Loaded {} stored entries from {:?}", state.entries.len(), path);
                state.entries
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                journal_debug!("No store at {:?}; starting empty", path);
                BTreeMap::new()
            }
            Err(err) => return Err(StoreError::Io(err)),
        };

        Ok(Self {
            writer: AtomicFileWriter::new(PathBuf::from(data_dir)),
            entries: Mutex::new(entries),
        })
    }

    pub fn path(&self) -> PathBuf {
        self.writer.dir().join(STORE_FILENAME)
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<String, String>> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn flush(&self, entries: &BTreeMap<String, String>) -> Result<(), StoreError> {
        let state = PersistedStore {
            entries: entries.clone(),
        };
        let pretty = ron::ser::PrettyConfig::new();
        let content = ron::ser::to_string_pretty(&state, pretty)
            .map_err(|err| StoreError::Format(err.to_string()))?;
        self.writer.write(STORE_FILENAME, &content)?;
        Ok(())
    }
}

impl KeyValueStore for RonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self.lock();
        if entries.get(key).map(String::as_str) == Some(value) {
            return Ok(());
        }
        entries.insert(key.to_string(), value.to_string());
        self.flush(&entries)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let mut entries = self.lock();
        if entries.remove(key).is_none() {
            return Ok(());
        }
        self.flush(&entries)
    }
}

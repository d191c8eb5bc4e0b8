use thiserror::Error;

use crate::PersistError;

/// Key under which the in-progress journal entry is kept.
pub const DRAFT_KEY: &str = "journal-text";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("persist error: {0}")]
    Persist(#[from] PersistError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("store format error: {0}")]
    Format(String),
}

/// Local key-value persistence for drafts.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

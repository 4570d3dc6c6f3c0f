mod local;

pub use local::LocalStore;

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid key: {0:?}")]
    InvalidKey(String),

    #[error("store error: {0}")]
    Internal(String),
}

/// Where an object ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    /// Key the object can be read back with. May differ from the requested key.
    pub key: String,
    /// Backend location; for the local store this is the file path.
    pub location: String,
}

/// A flat store of uploaded files keyed by base name.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Write a new object under `key`, or under `stem-N.ext` if `key` is
    /// taken. Existing objects are never replaced.
    async fn put_new(&self, key: &str, data: Bytes) -> Result<StoredObject, StoreError>;

    /// Read an object. Returns `StoreError::NotFound` if absent.
    async fn get(&self, key: &str) -> Result<Bytes, StoreError>;

    /// Delete an object. No-op if absent.
    async fn delete(&self, key: &str) -> Result<(), StoreError>;
}

/// Reject anything that is not a plain file name.
pub fn validate_key(key: &str) -> Result<(), StoreError> {
    let bad = key.is_empty()
        || key == "."
        || key == ".."
        || key.contains(['/', '\\', '\0']);
    if bad {
        Err(StoreError::InvalidKey(key.to_string()))
    } else {
        Ok(())
    }
}

/// Candidate keys for `put_new`: `key` itself for `attempt == 0`, then
/// `stem-1.ext`, `stem-2.ext`, ...
pub fn numbered_key(key: &str, attempt: u32) -> String {
    if attempt == 0 {
        return key.to_string();
    }
    match key.rfind('.') {
        Some(dot) if dot > 0 => format!("{}-{attempt}{}", &key[..dot], &key[dot..]),
        _ => format!("{key}-{attempt}"),
    }
}

// -- Configuration --

/// Configuration for the upload store.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Directory uploads are written into. Created on first write.
    pub upload_dir: PathBuf,
}

/// Create an `ObjectStore` from configuration.
pub fn create_store(config: &StoreConfig) -> Arc<dyn ObjectStore> {
    Arc::new(LocalStore::new(config))
}

use std::path::PathBuf;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::io::AsyncWriteExt;

use crate::{numbered_key, validate_key, ObjectStore, StoreConfig, StoreError, StoredObject};

/// Upper bound on `stem-N.ext` attempts before giving up.
const MAX_NAME_ATTEMPTS: u32 = 1000;

pub struct LocalStore {
    base_dir: PathBuf,
}

impl LocalStore {
    pub fn new(config: &StoreConfig) -> Self {
        Self {
            base_dir: config.upload_dir.clone(),
        }
    }

    fn resolve(&self, key: &str) -> Result<PathBuf, StoreError> {
        validate_key(key)?;
        Ok(self.base_dir.join(key))
    }
}

#[async_trait]
impl ObjectStore for LocalStore {
    async fn put_new(&self, key: &str, data: Bytes) -> Result<StoredObject, StoreError> {
        validate_key(key)?;
        tokio::fs::create_dir_all(&self.base_dir)
            .await
            .map_err(|e| StoreError::Internal(format!("mkdir {}: {e}", self.base_dir.display())))?;

        for attempt in 0..MAX_NAME_ATTEMPTS {
            let candidate = numbered_key(key, attempt);
            let path = self.base_dir.join(&candidate);
            let mut file = match tokio::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                Ok(f) => f,
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => continue,
                Err(e) => {
                    return Err(StoreError::Internal(format!(
                        "create {}: {e}",
                        path.display()
                    )))
                }
            };

            let written = match file.write_all(&data).await {
                Ok(()) => file.flush().await,
                Err(e) => Err(e),
            };
            if let Err(e) = written {
                let _ = tokio::fs::remove_file(&path).await;
                return Err(StoreError::Internal(format!(
                    "write {}: {e}",
                    path.display()
                )));
            }

            if attempt > 0 {
                tracing::debug!(requested = key, stored = %candidate, "upload name taken, stored under new name");
            }
            return Ok(StoredObject {
                key: candidate,
                location: path.to_string_lossy().into_owned(),
            });
        }

        Err(StoreError::Internal(format!(
            "no free name for {key} after {MAX_NAME_ATTEMPTS} attempts"
        )))
    }

    async fn get(&self, key: &str) -> Result<Bytes, StoreError> {
        let path = self.resolve(key)?;
        match tokio::fs::read(&path).await {
            Ok(data) => Ok(Bytes::from(data)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StoreError::NotFound(key.to_string()))
            }
            Err(e) => Err(StoreError::Internal(format!(
                "read {}: {e}",
                path.display()
            ))),
        }
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        let path = self.resolve(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::Internal(format!(
                "delete {}: {e}",
                path.display()
            ))),
        }
    }
}

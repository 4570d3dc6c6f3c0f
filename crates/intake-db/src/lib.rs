mod sqlite;

use std::path::PathBuf;

use async_trait::async_trait;
use thiserror::Error;

use intake_core::{NewSubmission, Submission};

pub use sqlite::SqliteDatabase;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("database error: {0}")]
    Internal(String),
}

/// Where the database lives.
#[derive(Debug, Clone, Default)]
pub struct DbConfig {
    /// Path of the SQLite file. Defaults to `<data dir>/intake.db`.
    pub sqlite_path: Option<PathBuf>,
}

/// Persistence for submissions.
///
/// Rows are never updated or deleted; `list_submissions` returns them in
/// insertion order.
#[async_trait]
pub trait Database: Send + Sync {
    async fn insert_submission(&self, input: &NewSubmission) -> Result<Submission, DbError>;
    async fn get_submission(&self, id: i64) -> Result<Submission, DbError>;
    async fn list_submissions(&self) -> Result<Vec<Submission>, DbError>;
}

/// Base directory for the database and, by default, the uploads.
pub fn data_dir() -> PathBuf {
    let base = if let Ok(xdg) = std::env::var("XDG_DATA_HOME") {
        PathBuf::from(xdg)
    } else if let Some(home) = std::env::var_os("HOME") {
        PathBuf::from(home).join(".local/share")
    } else {
        PathBuf::from(".")
    };
    base.join("plate-intake")
}

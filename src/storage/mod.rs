pub mod sqlite;

pub use self::sqlite::SqliteRecordStore;

use crate::types::{NewRecord, Record, RecordUpdate};

/// Errors raised by a record store
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Record not found: {0}")]
    NotFound(i64),

    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Persistent table of question/answer records
pub trait RecordStore: Send + Sync {
    /// Persist a new record and return it with its assigned id
    fn insert(&self, record: &NewRecord) -> StoreResult<Record>;

    fn get(&self, id: i64) -> StoreResult<Record>;

    /// Records whose question contains `substring`, case-insensitive, in id order
    fn search(&self, substring: &str) -> StoreResult<Vec<Record>>;

    /// Every record, in id order
    fn all(&self) -> StoreResult<Vec<Record>>;

    /// Overwrite the supplied fields and return the updated record
    fn update(&self, id: i64, update: &RecordUpdate) -> StoreResult<Record>;

    fn delete(&self, id: i64) -> StoreResult<()>;
}

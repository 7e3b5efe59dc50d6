pub mod jsonl;
pub mod memory;
pub mod record;

pub use jsonl::JsonlStore;
pub use memory::MemoryStore;
pub use record::{CookieStand, NewCookieStand};

use thiserror::Error;

/// Errors raised by record stores
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("No cookie stand with id {0}")]
    NotFound(u64),

    #[error("{0}")]
    Validation(String),

    #[error("No cookie stand ids left to assign")]
    IdsExhausted,

    #[error("Storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Corrupt storage entry: {0}")]
    Json(#[from] serde_json::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Keyed storage of cookie stands.
///
/// Ids are assigned by the store, start at 1 and are never reused.
/// `list` returns records in insertion order.
pub trait RecordStore: Send + Sync {
    fn create(&mut self, new: NewCookieStand) -> StoreResult<CookieStand>;

    fn get(&self, id: u64) -> StoreResult<CookieStand>;

    fn list(&self) -> Vec<CookieStand>;

    /// Replace every field except the id
    fn update(&mut self, id: u64, new: NewCookieStand) -> StoreResult<CookieStand>;

    fn delete(&mut self, id: u64) -> StoreResult<()>;

    fn count(&self) -> usize;
}

#![forbid(unsafe_code)]

pub mod content;
pub mod repository;
pub mod sqlite;

pub use content::{ContentStore, ContentStoreError};
pub use repository::{
    AttemptRecord, InMemoryRepository, ProgressRepository, ProgressSnapshot, Storage, StorageError,
};

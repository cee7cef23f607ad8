//! Storage abstraction and implementations for Ultimate Tracker.
//!
//! This crate provides a trait-based document store with a JSON-file
//! reference implementation and an optional SQLite backend.

#![warn(missing_docs)]

pub mod trait_;
pub mod json_storage;
pub mod locks;

#[cfg(feature = "sqlite")]
pub mod sqlite_storage;

pub use trait_::{Storage, StorageError, Result};
pub use json_storage::JsonStorage;
pub use locks::{KeyedGuard, KeyedLocks};

#[cfg(feature = "sqlite")]
pub use sqlite_storage::SqliteStorage;

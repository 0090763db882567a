#![forbid(unsafe_code)]

pub mod keys;
pub mod kv;
pub mod sqlite;

pub use kv::{InMemoryKeyValueStore, KeyValueStore, Storage, StorageError};

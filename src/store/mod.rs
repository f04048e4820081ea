//! Persistent blob store
//!
//! A single SQLite file holding one row per key. The store never looks inside
//! payloads; pair it with [`crate::codec`] to give them structure.

mod blob;
mod blob_store;
mod config;

pub use blob::Blob;
pub use blob_store::BlobStore;
pub use config::{JournalMode, StoreConfig, SyncMode};

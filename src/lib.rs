//! # packrat
//!
//! A small persistent object store: a fixed-layout binary codec plus a
//! durable key-value table of blobs.
//!
//! ## Core Concepts
//!
//! - **Encoder / Decoder**: pack typed values into bytes and read them back
//!   in the same order. Little-endian, no self-description.
//! - **BlobStore**: a SQLite-backed table mapping string keys to payloads,
//!   safe to share between threads; every operation runs alone.
//! - **Encode / Decode**: traits for types that know their own field order.
//!
//! ## Example
//!
//! ```no_run
//! use packrat::{BlobStore, Decoder, Encoder};
//!
//! # fn main() -> packrat::Result<()> {
//! let store = BlobStore::open("objects.db")?;
//!
//! let mut enc = Encoder::new();
//! enc.write_i32(3);
//! enc.write_string("triangle");
//! store.set("shape", &enc.finish())?;
//!
//! if let Some(bytes) = store.get("shape")? {
//!     let mut dec = Decoder::new(bytes);
//!     let sides = dec.read_i32()?;
//!     let name = dec.read_string()?;
//!     assert_eq!((sides, name.as_str()), (3, "triangle"));
//! }
//! # Ok(())
//! # }
//! ```

pub mod codec;
pub mod store;

mod error;

pub use codec::{decode_from_bytes, encode_to_bytes, Decode, Decoder, Encode, Encoder};
pub use error::{Error, Result};
pub use store::{Blob, BlobStore, JournalMode, StoreConfig, SyncMode};

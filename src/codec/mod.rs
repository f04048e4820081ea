//! Fixed-layout binary codec
//!
//! An [`Encoder`] appends typed values to a buffer; a [`Decoder`] reads them
//! back in the same order. Wire layout:
//!
//! ```text
//! i32 / u32 / f32     4 bytes, little-endian
//! i64 / f64           8 bytes, little-endian
//! u8 / bool           1 byte (bool: 1 = true, 0 = false)
//! string              i32 length N, then N bytes of UTF-8
//! raw bytes           the bytes themselves, no length
//! ```
//!
//! **The format is not self-describing.** There is no magic number, version
//! tag or type marker. The byte layout is exactly the sequence of write
//! calls, and the only way to decode a buffer is to issue the same reads,
//! with the same types, in the same order. Reading out of order does not
//! produce a schema error: it produces wrong values, or a
//! [`BufferUnderrun`](crate::Error::BufferUnderrun) if the buffer runs out.
//!
//! The [`Encode`] and [`Decode`] traits let a type own its field order in
//! one place.

mod decoder;
mod encoder;
mod record;

pub use decoder::Decoder;
pub use encoder::Encoder;
pub use record::{decode_from_bytes, encode_to_bytes, Decode, Encode};

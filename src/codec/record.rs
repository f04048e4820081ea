//! Encode/Decode traits for values that pack themselves into a buffer

use super::{Decoder, Encoder};
use crate::{Error, Result};
use bytes::Bytes;

/// A value that can append itself to an [`Encoder`]
pub trait Encode {
    fn encode(&self, enc: &mut Encoder);
}

/// A value that can read itself back from a [`Decoder`].
///
/// Implementations must read exactly what the matching [`Encode`] wrote,
/// in the same order.
pub trait Decode: Sized {
    fn decode(dec: &mut Decoder) -> Result<Self>;
}

/// Encode a single value into a fresh buffer
pub fn encode_to_bytes<T: Encode + ?Sized>(value: &T) -> Bytes {
    let mut enc = Encoder::new();
    value.encode(&mut enc);
    enc.finish()
}

/// Decode a single value, requiring the whole buffer to be consumed
pub fn decode_from_bytes<T: Decode>(buf: impl Into<Bytes>) -> Result<T> {
    let mut dec = Decoder::new(buf);
    let value = T::decode(&mut dec)?;
    if !dec.is_at_end() {
        return Err(Error::TrailingBytes(dec.remaining()));
    }
    Ok(value)
}

macro_rules! impl_primitive {
    ($($ty:ty => $write:ident, $read:ident;)*) => {
        $(
            impl Encode for $ty {
                fn encode(&self, enc: &mut Encoder) {
                    enc.$write(*self);
                }
            }

            impl Decode for $ty {
                fn decode(dec: &mut Decoder) -> Result<Self> {
                    dec.$read()
                }
            }
        )*
    };
}

impl_primitive! {
    i32 => write_i32, read_i32;
    u32 => write_u32, read_u32;
    i64 => write_i64, read_i64;
    u8 => write_u8, read_u8;
    f32 => write_f32, read_f32;
    f64 => write_f64, read_f64;
    bool => write_bool, read_bool;
}

impl Encode for str {
    fn encode(&self, enc: &mut Encoder) {
        enc.write_string(self);
    }
}

impl Encode for String {
    fn encode(&self, enc: &mut Encoder) {
        enc.write_string(self);
    }
}

impl Decode for String {
    fn decode(dec: &mut Decoder) -> Result<Self> {
        dec.read_string()
    }
}

// Sequences: i32 element count, then each element.
impl<T: Encode> Encode for Vec<T> {
    fn encode(&self, enc: &mut Encoder) {
        let count = i32::try_from(self.len()).unwrap_or_else(|_| {
            panic!("sequence of {} items does not fit an i32 count", self.len())
        });
        enc.write_i32(count);
        for item in self {
            item.encode(enc);
        }
    }
}

impl<T: Decode> Decode for Vec<T> {
    fn decode(dec: &mut Decoder) -> Result<Self> {
        let count = dec.read_i32()?;
        let count = usize::try_from(count).map_err(|_| Error::InvalidLength(count))?;
        // Every element takes at least one byte, which bounds the allocation.
        let mut items = Vec::with_capacity(count.min(dec.remaining()));
        for _ in 0..count {
            items.push(T::decode(dec)?);
        }
        Ok(items)
    }
}

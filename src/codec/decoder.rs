//! Sequential binary reader

use crate::{Error, Result};
use bytes::Bytes;

/// Reads typed values back out of a buffer, front to back.
///
/// The decoder owns its buffer and keeps a byte offset into it. Every read
/// checks the remaining length before touching the data, so a short buffer
/// yields [`Error::BufferUnderrun`] rather than a truncated value. After any
/// error the decoder should be dropped; the decode it was serving is over.
#[derive(Clone, Debug)]
pub struct Decoder {
    buf: Bytes,
    pos: usize,
}

impl Decoder {
    /// Create a decoder over `buf`, positioned at its start
    pub fn new(buf: impl Into<Bytes>) -> Self {
        Decoder {
            buf: buf.into(),
            pos: 0,
        }
    }

    /// Create a decoder over a copy of `buf`
    pub fn from_slice(buf: &[u8]) -> Self {
        Self::new(Bytes::copy_from_slice(buf))
    }

    /// Consume exactly `n` bytes, or fail without moving the cursor
    fn take(&mut self, n: usize) -> Result<&[u8]> {
        let remaining = self.remaining();
        if n > remaining {
            return Err(Error::BufferUnderrun {
                needed: n,
                remaining,
            });
        }
        let start = self.pos;
        self.pos += n;
        Ok(&self.buf[start..self.pos])
    }

    fn take_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    /// Read a signed 32-bit integer
    pub fn read_i32(&mut self) -> Result<i32> {
        Ok(i32::from_le_bytes(self.take_array()?))
    }

    /// Read an unsigned 32-bit integer
    pub fn read_u32(&mut self) -> Result<u32> {
        Ok(u32::from_le_bytes(self.take_array()?))
    }

    /// Read a signed 64-bit integer
    pub fn read_i64(&mut self) -> Result<i64> {
        Ok(i64::from_le_bytes(self.take_array()?))
    }

    /// Read a single byte
    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    /// Read a 32-bit float
    pub fn read_f32(&mut self) -> Result<f32> {
        Ok(f32::from_le_bytes(self.take_array()?))
    }

    /// Read a 64-bit float
    pub fn read_f64(&mut self) -> Result<f64> {
        Ok(f64::from_le_bytes(self.take_array()?))
    }

    /// Read a boolean; any non-zero byte is `true`
    pub fn read_bool(&mut self) -> Result<bool> {
        Ok(self.read_u8()? != 0)
    }

    /// Read `n` raw bytes.
    ///
    /// Raw spans carry no length of their own, so the caller supplies it.
    /// The returned value shares the decoder's buffer.
    pub fn read_bytes(&mut self, n: usize) -> Result<Bytes> {
        let remaining = self.remaining();
        if n > remaining {
            return Err(Error::BufferUnderrun {
                needed: n,
                remaining,
            });
        }
        let out = self.buf.slice(self.pos..self.pos + n);
        self.pos += n;
        Ok(out)
    }

    /// Read a length-prefixed UTF-8 string
    pub fn read_string(&mut self) -> Result<String> {
        let len = self.read_i32()?;
        let len = usize::try_from(len).map_err(|_| Error::InvalidLength(len))?;
        let content = self.take(len)?.to_vec();
        Ok(String::from_utf8(content)?)
    }

    /// Advance the cursor by `n` bytes without reading them
    pub fn skip_bytes(&mut self, n: usize) -> Result<()> {
        self.take(n).map(|_| ())
    }

    /// Move the cursor to the end of the buffer
    pub fn skip_to_end(&mut self) {
        self.pos = self.buf.len();
    }

    /// Move the cursor back to the start of the buffer
    pub fn reset_position(&mut self) {
        self.pos = 0;
    }

    /// Current cursor offset
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bytes left after the cursor
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// Total buffer length
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Check if the buffer is empty
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Check if every byte has been consumed
    pub fn is_at_end(&self) -> bool {
        self.pos == self.buf.len()
    }
}

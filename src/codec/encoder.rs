//! Sequential binary writer

use bytes::Bytes;

/// Builds a byte buffer by appending typed values in call order.
///
/// All fixed-width values are written little-endian. Writes never fail;
/// the only panic is a string too long for its `i32` length prefix.
#[derive(Clone, Debug, Default)]
pub struct Encoder {
    buf: Vec<u8>,
}

impl Encoder {
    /// Create an empty encoder
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an encoder with room for `capacity` bytes
    pub fn with_capacity(capacity: usize) -> Self {
        Encoder {
            buf: Vec::with_capacity(capacity),
        }
    }

    /// Append a signed 32-bit integer (4 bytes)
    pub fn write_i32(&mut self, value: i32) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    /// Append an unsigned 32-bit integer (4 bytes)
    pub fn write_u32(&mut self, value: u32) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    /// Append a signed 64-bit integer (8 bytes)
    pub fn write_i64(&mut self, value: i64) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    /// Append a single byte
    pub fn write_u8(&mut self, value: u8) {
        self.buf.push(value);
    }

    /// Append a 32-bit float (4 bytes, IEEE-754 bit pattern)
    pub fn write_f32(&mut self, value: f32) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    /// Append a 64-bit float (8 bytes, IEEE-754 bit pattern)
    pub fn write_f64(&mut self, value: f64) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    /// Append a boolean as one byte: 1 or 0
    pub fn write_bool(&mut self, value: bool) {
        self.buf.push(u8::from(value));
    }

    /// Append raw bytes with no length prefix.
    ///
    /// The reader has to know how many bytes to take back out.
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Append a UTF-8 string: `i32` length prefix, then the content bytes.
    ///
    /// The empty string is written as a zero prefix and no content.
    ///
    /// # Panics
    ///
    /// Panics if the string is longer than `i32::MAX` bytes.
    pub fn write_string(&mut self, value: &str) {
        let len = i32::try_from(value.len()).unwrap_or_else(|_| {
            panic!(
                "string of {} bytes does not fit an i32 length prefix",
                value.len()
            )
        });
        self.write_i32(len);
        self.buf.extend_from_slice(value.as_bytes());
    }

    /// Number of bytes written so far
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Check if nothing has been written
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// View the bytes written so far
    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    /// Export the buffer as an immutable value
    pub fn finish(self) -> Bytes {
        Bytes::from(self.buf)
    }

    /// Export the buffer as a plain vector
    pub fn into_vec(self) -> Vec<u8> {
        self.buf
    }
}

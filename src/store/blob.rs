//! Blob record - the unit of storage

/// A named binary payload, one row of the store
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Blob {
    /// Key, unique within a store
    pub name: String,
    /// Opaque payload
    pub bytes: Vec<u8>,
}

impl Blob {
    /// Create a new blob
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Blob {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    /// A blob can only be stored with a non-empty name and payload
    pub fn is_valid(&self) -> bool {
        !self.name.is_empty() && !self.bytes.is_empty()
    }

    /// Get the size of the payload
    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

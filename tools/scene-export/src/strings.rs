//! Append-only string table (`str0` payload)

use scene_common::NameRef;

use crate::error::ExportError;

/// Concatenated UTF-8 strings addressed by byte range.
///
/// Every write appends, even if the same text was written before; equal
/// names never share bytes.
#[derive(Debug, Default)]
pub struct StringTable {
    bytes: Vec<u8>,
}

impl StringTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `text` and return the range it occupies
    pub fn write(&mut self, text: &str) -> Result<NameRef, ExportError> {
        let begin =
            u32::try_from(self.bytes.len()).map_err(|_| ExportError::StringTableOverflow)?;
        let end = u32::try_from(self.bytes.len() + text.len())
            .map_err(|_| ExportError::StringTableOverflow)?;
        self.bytes.extend_from_slice(text.as_bytes());
        Ok(NameRef::new(begin, end))
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

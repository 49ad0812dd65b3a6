//! Append-only script buffer.

use std::fmt;

use super::entry::MetadataEntry;

/// Append-only byte sequence holding generated DDL text.
///
/// Offsets handed out by [`write_object`](Self::write_object) stay valid for
/// the life of the buffer because nothing is ever removed or rewritten.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScriptBuffer {
    bytes: Vec<u8>,
}

impl ScriptBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `text`, returning the number of bytes written.
    pub fn write_str(&mut self, text: &str) -> u64 {
        self.bytes.extend_from_slice(text.as_bytes());
        text.len() as u64
    }

    /// Append one object's text and return the span it occupies.
    pub fn write_object(
        &mut self,
        schema: &str,
        name: &str,
        object_type: &str,
        text: &str,
    ) -> MetadataEntry {
        let start = self.bytes.len() as u64;
        let written = self.write_str(text);
        MetadataEntry::new(schema, name, object_type, start, start + written)
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Bytes in `[start, end)`, clamped to the current length.
    pub fn range(&self, start: u64, end: u64) -> &[u8] {
        let len = self.bytes.len() as u64;
        let end = end.min(len);
        let start = start.min(end);
        &self.bytes[start as usize..end as usize]
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

impl fmt::Write for ScriptBuffer {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        ScriptBuffer::write_str(self, s);
        Ok(())
    }
}

impl AsRef<[u8]> for ScriptBuffer {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

impl From<&str> for ScriptBuffer {
    fn from(text: &str) -> Self {
        Self {
            bytes: text.as_bytes().to_vec(),
        }
    }
}

//! Recorded object spans and the table of contents that holds them.

use serde::{Deserialize, Serialize};

use super::buffer::ScriptBuffer;
use super::slicer::{slice_buffer, SlicedScript};
use crate::sql::ident::make_fqn;

/// Half-open byte span `[start_byte, end_byte)` of one object's text inside
/// a script buffer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MetadataEntry {
    pub schema: String,
    pub name: String,
    pub object_type: String,
    pub start_byte: u64,
    pub end_byte: u64,
}

impl MetadataEntry {
    pub fn new(
        schema: impl Into<String>,
        name: impl Into<String>,
        object_type: impl Into<String>,
        start_byte: u64,
        end_byte: u64,
    ) -> Self {
        Self {
            schema: schema.into(),
            name: name.into(),
            object_type: object_type.into(),
            start_byte,
            end_byte,
        }
    }

    /// Recorded span length; zero for an inverted span.
    pub fn len(&self) -> u64 {
        self.end_byte.saturating_sub(self.start_byte)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn fqn(&self) -> String {
        make_fqn(&self.schema, &self.name)
    }
}

/// Entries for one script buffer, in emission order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Toc {
    entries: Vec<MetadataEntry>,
}

impl Toc {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write `text` into `buffer` and record its span.
    pub fn record(
        &mut self,
        buffer: &mut ScriptBuffer,
        schema: &str,
        name: &str,
        object_type: &str,
        text: &str,
    ) -> &MetadataEntry {
        let entry = buffer.write_object(schema, name, object_type, text);
        self.push(entry)
    }

    /// Append an entry recorded elsewhere.
    pub fn push(&mut self, entry: MetadataEntry) -> &MetadataEntry {
        if let Some(last) = self.entries.last() {
            if entry.start_byte < last.start_byte {
                tracing::warn!(
                    object = %entry.fqn(),
                    start_byte = entry.start_byte,
                    previous_start = last.start_byte,
                    "toc entry starts before the previous entry"
                );
            }
        }
        self.entries.push(entry);
        &self.entries[self.entries.len() - 1]
    }

    pub fn entries(&self) -> &[MetadataEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Split `buffer` back into the recorded object texts.
    pub fn slice<B: AsRef<[u8]> + ?Sized>(&self, buffer: &B) -> SlicedScript {
        slice_buffer(&self.entries, buffer)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

impl From<Vec<MetadataEntry>> for Toc {
    fn from(entries: Vec<MetadataEntry>) -> Self {
        Self { entries }
    }
}

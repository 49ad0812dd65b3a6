//! Splitting a script buffer back into per-object texts.
//!
//! The emitter writes every object into one buffer and records a span per
//! object. Restore-time filtering and output re-display need the texts
//! again, possibly against a buffer captured before every recorded object
//! was flushed, so spans are clamped rather than trusted.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

use super::entry::MetadataEntry;

static WHITESPACE_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// A span that did not fit the buffer it was sliced against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MalformedSpan {
    /// `end_byte` lay past the buffer; the text was truncated.
    EndBeyondBuffer {
        index: usize,
        fqn: String,
        end_byte: u64,
        buffer_len: u64,
    },
    /// `start_byte` lay at or past the end of a buffer; the text is empty.
    StartBeyondBuffer {
        index: usize,
        fqn: String,
        start_byte: u64,
        buffer_len: u64,
    },
    /// `end_byte` preceded `start_byte`; the text is empty.
    Inverted {
        index: usize,
        fqn: String,
        start_byte: u64,
        end_byte: u64,
    },
}

impl MalformedSpan {
    /// Position of the offending entry in the entry list.
    pub fn index(&self) -> usize {
        match self {
            MalformedSpan::EndBeyondBuffer { index, .. }
            | MalformedSpan::StartBeyondBuffer { index, .. }
            | MalformedSpan::Inverted { index, .. } => *index,
        }
    }
}

/// Output of [`slice_buffer`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SlicedScript {
    /// One text per entry, in entry order.
    pub texts: Vec<String>,
    /// Buffer content after the last entry's clamped end.
    pub remainder: String,
    pub warnings: Vec<MalformedSpan>,
}

/// Slice `buffer` into the texts recorded by `entries`.
///
/// Never fails: an `end_byte` past the buffer is clamped, and a span
/// starting at or past the end of the buffer yields an empty text.
/// Bytes that do not form valid UTF-8 are replaced with U+FFFD.
pub fn slice_buffer<B: AsRef<[u8]> + ?Sized>(entries: &[MetadataEntry], buffer: &B) -> SlicedScript {
    let bytes = buffer.as_ref();
    let buffer_len = bytes.len() as u64;
    let mut sliced = SlicedScript::default();
    let mut last_end = 0u64;

    for (index, entry) in entries.iter().enumerate() {
        let start = entry.start_byte.min(buffer_len);
        let end = entry.end_byte.min(buffer_len);

        if entry.end_byte < entry.start_byte {
            sliced.warnings.push(MalformedSpan::Inverted {
                index,
                fqn: entry.fqn(),
                start_byte: entry.start_byte,
                end_byte: entry.end_byte,
            });
        } else if entry.start_byte >= buffer_len && !entry.is_empty() {
            sliced.warnings.push(MalformedSpan::StartBeyondBuffer {
                index,
                fqn: entry.fqn(),
                start_byte: entry.start_byte,
                buffer_len,
            });
        } else if entry.end_byte > buffer_len {
            sliced.warnings.push(MalformedSpan::EndBeyondBuffer {
                index,
                fqn: entry.fqn(),
                end_byte: entry.end_byte,
                buffer_len,
            });
        }

        let text = if start < end {
            decode(&bytes[start as usize..end as usize])
        } else {
            String::new()
        };
        sliced.texts.push(text);
        last_end = end.max(start);
    }

    sliced.remainder = decode(&bytes[last_end as usize..]);

    for warning in &sliced.warnings {
        tracing::warn!(?warning, "script span does not fit buffer");
    }
    sliced
}

fn decode(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

/// Compare sliced texts with expected texts, ignoring leading and trailing
/// whitespace and treating any whitespace run as a single space.
pub fn texts_match_ignoring_whitespace<A, E>(actual: &[A], expected: &[E]) -> bool
where
    A: AsRef<str>,
    E: AsRef<str>,
{
    actual.len() == expected.len()
        && actual
            .iter()
            .zip(expected)
            .all(|(a, e)| normalize_whitespace(a.as_ref()) == normalize_whitespace(e.as_ref()))
}

fn normalize_whitespace(text: &str) -> Cow<'_, str> {
    WHITESPACE_RUN.replace_all(text.trim(), " ")
}

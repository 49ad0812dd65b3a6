//! Script buffers and their table of contents.
//!
//! ```text
//!   emitter ──write_object──► ScriptBuffer   [ obj A | obj B | obj C | tail ]
//!      │                          ▲             ^       ^       ^
//!      └──────push──────► Toc ────┘ spans:  [0,a)   [a,b)   [b,c)
//!                                  │
//!                                  ▼ slice_buffer
//!                        texts [A, B, C], remainder "tail", warnings
//! ```

mod buffer;
mod entry;
mod slicer;

pub use buffer::ScriptBuffer;
pub use entry::{MetadataEntry, Toc};
pub use slicer::{slice_buffer, texts_match_ignoring_whitespace, MalformedSpan, SlicedScript};

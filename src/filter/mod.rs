//! Object selection.
//!
//! Users pick objects with schema and relation include/exclude lists. Names
//! are fully-qualified strings in the quoting convention of
//! [`crate::sql::ident`]. Before selection runs, relation filters are closed
//! over partition hierarchies by [`PartitionExpander`].

mod expander;
mod filter_set;

pub use expander::{ExpandError, ExpandResult, ExpansionReport, PartitionExpander};
pub use filter_set::{FilterKind, FilterSet, RelationFilter, SchemaFilter};

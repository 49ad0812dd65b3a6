//! SQL text conventions.
//!
//! - [`ident`] - Identifier quoting, parsing, and fully-qualified names

pub mod ident;

pub use ident::{
    canonical_fqn, column_fqn, make_fqn, parse_ident, quote_ident, IdentError, IdentResult,
    QualifiedName,
};

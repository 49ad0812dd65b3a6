//! SQL identifier quoting and parsing.
//!
//! Names cross several boundaries in a backup run: user filters, catalog
//! dependency rows and generated DDL. All of them use the same convention,
//! the one PostgreSQL's `quote_ident` implements:
//!
//! - an identifier made only of lowercase ASCII letters, digits and
//!   underscores, not starting with a digit, is emitted bare;
//! - anything else is wrapped in double quotes with embedded `"` doubled.
//!
//! Parsing goes the other way and applies identifier folding: unquoted
//! identifiers fold to lowercase, quoted identifiers are taken verbatim.
//! [`canonical_fqn`] combines both to give a single comparison key per
//! SQL identity, so `public.Foo` and `public.foo` compare equal while
//! `public."Foo"` does not.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Errors produced when parsing identifier literals.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdentError {
    #[error("empty identifier in '{0}'")]
    Empty(String),

    #[error("unterminated quoted identifier in '{0}'")]
    Unterminated(String),

    #[error("unexpected character {found:?} at byte {position} in '{input}'")]
    UnexpectedChar {
        input: String,
        position: usize,
        found: char,
    },

    #[error("expected a schema-qualified name, found '{0}'")]
    NotQualified(String),
}

pub type IdentResult<T> = Result<T, IdentError>;

fn is_bare_ident(ident: &str) -> bool {
    let mut bytes = ident.bytes();
    match bytes.next() {
        Some(first) if first.is_ascii_lowercase() || first == b'_' => {}
        _ => return false,
    }
    bytes.all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'_')
}

/// Quote an identifier if it would not survive unquoted.
///
/// Tabs, newlines and other control characters are legal inside a quoted
/// identifier and are passed through as-is.
pub fn quote_ident(ident: &str) -> String {
    if is_bare_ident(ident) {
        ident.to_string()
    } else {
        format!("\"{}\"", ident.replace('"', "\"\""))
    }
}

/// Build the fully-qualified name `schema.name`, quoting each part.
pub fn make_fqn(schema: &str, name: &str) -> String {
    format!("{}.{}", quote_ident(schema), quote_ident(name))
}

/// Build `schema.table.column`, quoting each part.
pub fn column_fqn(schema: &str, table: &str, column: &str) -> String {
    format!("{}.{}", make_fqn(schema, table), quote_ident(column))
}

/// Split a dotted identifier chain into its parts, unquoting and folding.
fn parse_parts(input: &str) -> IdentResult<Vec<String>> {
    let mut parts = Vec::new();
    let mut chars = input.char_indices().peekable();

    loop {
        let mut part = String::new();

        if let Some(&(_, '"')) = chars.peek() {
            chars.next();
            let mut closed = false;
            while let Some((_, ch)) = chars.next() {
                if ch == '"' {
                    if let Some(&(_, '"')) = chars.peek() {
                        chars.next();
                        part.push('"');
                    } else {
                        closed = true;
                        break;
                    }
                } else {
                    part.push(ch);
                }
            }
            if !closed {
                return Err(IdentError::Unterminated(input.to_string()));
            }
            // Only a separator or the end may follow a closing quote.
            match chars.peek() {
                None | Some(&(_, '.')) => {}
                Some(&(position, found)) => {
                    return Err(IdentError::UnexpectedChar {
                        input: input.to_string(),
                        position,
                        found,
                    })
                }
            }
        } else {
            while let Some(&(position, ch)) = chars.peek() {
                match ch {
                    '.' => break,
                    '"' => {
                        return Err(IdentError::UnexpectedChar {
                            input: input.to_string(),
                            position,
                            found: ch,
                        })
                    }
                    _ => {
                        part.push(ch.to_ascii_lowercase());
                        chars.next();
                    }
                }
            }
            if part.is_empty() {
                return Err(IdentError::Empty(input.to_string()));
            }
        }

        parts.push(part);

        match chars.next() {
            None => return Ok(parts),
            Some((_, '.')) => continue,
            Some((position, found)) => {
                return Err(IdentError::UnexpectedChar {
                    input: input.to_string(),
                    position,
                    found,
                })
            }
        }
    }
}

/// Parse a single identifier literal, quoted or bare.
///
/// `parse_ident(&quote_ident(s)) == s` holds for every `s`. A zero-length
/// identifier is only expressible quoted (`""`).
pub fn parse_ident(input: &str) -> IdentResult<String> {
    let mut parts = parse_parts(input)?;
    if parts.len() != 1 {
        return Err(IdentError::UnexpectedChar {
            input: input.to_string(),
            position: input.find('.').unwrap_or(0),
            found: '.',
        });
    }
    Ok(parts.remove(0))
}

/// Canonical comparison key for a fully-qualified name.
///
/// Names that do not parse as `schema.name` are returned unchanged, so the
/// key is always defined and malformed names only ever match themselves.
pub fn canonical_fqn(fqn: &str) -> String {
    match QualifiedName::parse(fqn) {
        Ok(name) => name.fqn(),
        Err(_) => fqn.to_string(),
    }
}

/// A schema-qualified object name holding the true (unquoted) identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct QualifiedName {
    pub schema: String,
    pub name: String,
}

impl QualifiedName {
    pub fn new(schema: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            name: name.into(),
        }
    }

    /// Parse `schema.name`, where either part may be quoted.
    pub fn parse(input: &str) -> IdentResult<Self> {
        let parts = parse_parts(input)?;
        match <[String; 2]>::try_from(parts) {
            Ok([schema, name]) => Ok(Self { schema, name }),
            Err(_) => Err(IdentError::NotQualified(input.to_string())),
        }
    }

    /// The quoted `schema.name` form.
    pub fn fqn(&self) -> String {
        make_fqn(&self.schema, &self.name)
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.fqn())
    }
}

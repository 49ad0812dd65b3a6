//! Sequence ownership.
//!
//! A sequence created for a `serial` column, or attached with `OWNED BY`,
//! belongs to one table column. The owner map lets DDL emission attach
//! each sequence to its column once both exist.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::provider::{CatalogResult, CatalogSource};
use crate::sql::ident::{column_fqn, make_fqn};

/// One ownership row. The sequence and its owning table share a schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceOwner {
    pub schema: String,
    pub sequence: String,
    pub table: String,
    pub column: String,
}

impl SequenceOwner {
    pub fn new(
        schema: impl Into<String>,
        sequence: impl Into<String>,
        table: impl Into<String>,
        column: impl Into<String>,
    ) -> Self {
        Self {
            schema: schema.into(),
            sequence: sequence.into(),
            table: table.into(),
            column: column.into(),
        }
    }

    pub fn sequence_fqn(&self) -> String {
        make_fqn(&self.schema, &self.sequence)
    }

    /// `schema.table.column`, each part quoted.
    pub fn column_fqn(&self) -> String {
        column_fqn(&self.schema, &self.table, &self.column)
    }
}

/// Map every owned sequence's FQN to its owning column.
///
/// A sequence reported more than once keeps its last owner.
pub fn sequence_column_owners<S: CatalogSource + ?Sized>(
    source: &S,
) -> CatalogResult<BTreeMap<String, String>> {
    let owners: BTreeMap<String, String> = source
        .sequence_owners()?
        .iter()
        .map(|owner| (owner.sequence_fqn(), owner.column_fqn()))
        .collect();
    tracing::debug!(sequences = owners.len(), "resolved sequence owners");
    Ok(owners)
}

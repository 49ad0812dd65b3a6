//! CatalogSource trait definition.
//!
//! The CatalogSource trait abstracts over where catalog rows come from. A
//! live implementation issues catalog queries over a database connection;
//! [`CatalogSnapshot`](super::CatalogSnapshot) answers from an in-memory
//! copy. The core never issues SQL itself.

use super::sequence::SequenceOwner;
use super::types::{DependencyEdge, ObjectClass, PartitionRole};
use crate::filter::SchemaFilter;

/// Errors reported by a catalog source.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("object not found in catalog: {0}")]
    NotFound(String),

    #[error("catalog query failed for {object}: {reason}")]
    QueryFailed { object: String, reason: String },

    #[error("failed to read catalog snapshot: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid catalog snapshot: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for catalog operations.
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Source of catalog rows for one extraction run.
///
/// All names are fully-qualified, quoted per
/// [`quote_ident`](crate::sql::ident::quote_ident). Implementations own
/// connection handling, retries and timeouts; callers running several
/// expansions at once should give each its own source.
pub trait CatalogSource {
    /// Dependency rows for every object of `class` in the allowed schemas,
    /// ordered by source object.
    fn dependency_edges(
        &self,
        class: ObjectClass,
        schemas: &SchemaFilter,
    ) -> CatalogResult<Vec<DependencyEdge>>;

    /// Resolve a table's place in a partition hierarchy.
    ///
    /// Returns [`CatalogError::NotFound`] if the name does not resolve.
    fn partition_role(&self, fqn: &str) -> CatalogResult<PartitionRole>;

    /// Every bottom-level leaf under `parent`, in catalog order.
    fn leaf_partitions(&self, parent: &str) -> CatalogResult<Vec<String>>;

    /// The external object standing in for `leaf` after a storage exchange.
    fn external_override(&self, leaf: &str) -> CatalogResult<Option<String>>;

    /// Ownership rows for every sequence owned by a table column.
    fn sequence_owners(&self) -> CatalogResult<Vec<SequenceOwner>>;
}

impl<S: CatalogSource + ?Sized> CatalogSource for &S {
    fn dependency_edges(
        &self,
        class: ObjectClass,
        schemas: &SchemaFilter,
    ) -> CatalogResult<Vec<DependencyEdge>> {
        (**self).dependency_edges(class, schemas)
    }

    fn partition_role(&self, fqn: &str) -> CatalogResult<PartitionRole> {
        (**self).partition_role(fqn)
    }

    fn leaf_partitions(&self, parent: &str) -> CatalogResult<Vec<String>> {
        (**self).leaf_partitions(parent)
    }

    fn external_override(&self, leaf: &str) -> CatalogResult<Option<String>> {
        (**self).external_override(leaf)
    }

    fn sequence_owners(&self) -> CatalogResult<Vec<SequenceOwner>> {
        (**self).sequence_owners()
    }
}

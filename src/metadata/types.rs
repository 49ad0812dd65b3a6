//! Catalog object types.
//!
//! These mirror the rows the catalog returns for tables, sequences, views
//! and the dependency edges between them.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::sql::ident::make_fqn;

/// Opaque object handle assigned by the catalog.
///
/// Stable within one extraction snapshot, not across snapshots.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ObjectOid(pub u32);

impl fmt::Display for ObjectOid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for ObjectOid {
    fn from(oid: u32) -> Self {
        ObjectOid(oid)
    }
}

/// Class of a catalog object, and of the dependency query issued for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectClass {
    /// Ordinary table.
    Relation,
    View,
    /// Sequences carry no dependency rows of their own; their ownership is
    /// reported separately.
    Sequence,
}

/// Common accessors for objects read from the catalog.
pub trait CatalogObject {
    fn oid(&self) -> ObjectOid;
    fn schema(&self) -> &str;
    fn name(&self) -> &str;

    /// Fully-qualified names of the objects this one depends upon.
    fn depends_upon(&self) -> &[String];

    fn fqn(&self) -> String {
        make_fqn(self.schema(), self.name())
    }
}

/// A table (or sequence) relation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relation {
    pub schema_oid: ObjectOid,
    pub oid: ObjectOid,
    pub schema: String,
    pub name: String,
    /// Every referenced object, in catalog order.
    #[serde(default)]
    pub depends_upon: Vec<String>,
    /// Parent tables; always a subset of `depends_upon`.
    #[serde(default)]
    pub inherits: Vec<String>,
}

impl Relation {
    pub fn new(
        schema_oid: u32,
        oid: u32,
        schema: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            schema_oid: ObjectOid(schema_oid),
            oid: ObjectOid(oid),
            schema: schema.into(),
            name: name.into(),
            depends_upon: Vec::new(),
            inherits: Vec::new(),
        }
    }
}

impl CatalogObject for Relation {
    fn oid(&self) -> ObjectOid {
        self.oid
    }

    fn schema(&self) -> &str {
        &self.schema
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn depends_upon(&self) -> &[String] {
        &self.depends_upon
    }
}

/// A view. Views only carry view-to-view dependencies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct View {
    pub oid: ObjectOid,
    pub schema: String,
    pub name: String,
    #[serde(default)]
    pub definition: String,
    #[serde(default)]
    pub depends_upon: Vec<String>,
}

impl View {
    pub fn new(
        oid: u32,
        schema: impl Into<String>,
        name: impl Into<String>,
        definition: impl Into<String>,
    ) -> Self {
        Self {
            oid: ObjectOid(oid),
            schema: schema.into(),
            name: name.into(),
            definition: definition.into(),
            depends_upon: Vec::new(),
        }
    }
}

impl CatalogObject for View {
    fn oid(&self) -> ObjectOid {
        self.oid
    }

    fn schema(&self) -> &str {
        &self.schema
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn depends_upon(&self) -> &[String] {
        &self.depends_upon
    }
}

/// One raw dependency row as returned by the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyEdge {
    pub source_oid: ObjectOid,
    /// Fully-qualified name of the referenced object.
    pub referenced_object: String,
    /// Table-to-table (inheritance) edge.
    #[serde(default)]
    pub is_table_edge: bool,
}

impl DependencyEdge {
    pub fn new(
        source_oid: u32,
        referenced_object: impl Into<String>,
        is_table_edge: bool,
    ) -> Self {
        Self {
            source_oid: ObjectOid(source_oid),
            referenced_object: referenced_object.into(),
            is_table_edge,
        }
    }
}

/// Where a table sits in a partition hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum PartitionRole {
    /// Not part of any partition hierarchy.
    NotPartitioned,
    /// Top-level partitioned table.
    Root,
    /// Mid-level partition: has a parent and children of its own.
    Intermediate { parent: String },
    /// Physical leaf partition.
    Leaf { parent: String },
}

impl PartitionRole {
    /// Fully-qualified name of the immediate parent, if any.
    pub fn parent(&self) -> Option<&str> {
        match self {
            PartitionRole::Intermediate { parent } | PartitionRole::Leaf { parent } => {
                Some(parent)
            }
            PartitionRole::NotPartitioned | PartitionRole::Root => None,
        }
    }

    pub fn has_children(&self) -> bool {
        matches!(self, PartitionRole::Root | PartitionRole::Intermediate { .. })
    }
}

//! In-memory catalog source.
//!
//! A `CatalogSnapshot` holds the rows a live catalog would return: the
//! objects themselves, per-class dependency rows, the partition hierarchy,
//! external-table exchanges and sequence ownership. It can be captured once
//! as JSON and replayed for offline filter expansion and dependency
//! ordering.
//!
//! ```json
//! {
//!   "objects": [
//!     { "oid": 16384, "schema": "public", "name": "rank", "class": "relation" }
//!   ],
//!   "partitions": [
//!     { "parent": "public.rank", "child": "public.rank_1_prt_boys" }
//!   ],
//!   "exchanges": [
//!     { "leaf": "public.rank_1_prt_boys", "external": "public.rank_ext" }
//!   ]
//! }
//! ```
//!
//! Name lookups go through an index keyed by [`canonical_fqn`], built on
//! the first lookup and dropped by every builder method.

use std::collections::{HashMap, HashSet, VecDeque};
use std::fs;
use std::path::Path;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use super::provider::{CatalogError, CatalogResult, CatalogSource};
use super::sequence::SequenceOwner;
use super::types::{DependencyEdge, ObjectClass, ObjectOid, PartitionRole, Relation, View};
use crate::filter::SchemaFilter;
use crate::sql::ident::{canonical_fqn, make_fqn, QualifiedName};

/// One catalog object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotObject {
    pub oid: ObjectOid,
    #[serde(default)]
    pub schema_oid: ObjectOid,
    pub schema: String,
    pub name: String,
    pub class: ObjectClass,
    #[serde(default)]
    pub definition: String,
}

impl SnapshotObject {
    fn key(&self) -> String {
        make_fqn(&self.schema, &self.name)
    }
}

/// A direct parent/child link in a partition hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionLink {
    pub parent: String,
    pub child: String,
}

/// A leaf whose storage was exchanged with an external table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalExchange {
    pub leaf: String,
    pub external: String,
}

/// Canonical-key lookup tables over a snapshot's rows.
#[derive(Debug, Clone, Default)]
struct SnapshotIndex {
    known: HashSet<String>,
    /// Child key to the parent as stored. The first link wins.
    parent_of: HashMap<String, String>,
    /// Parent key to `(child key, child as stored)`, in link order.
    children: HashMap<String, Vec<(String, String)>>,
    /// Leaf key to the external name as stored. The first exchange wins.
    exchanges: HashMap<String, String>,
}

impl SnapshotIndex {
    fn build(snapshot: &CatalogSnapshot) -> Self {
        let mut index = Self::default();

        for object in &snapshot.objects {
            index.known.insert(object.key());
        }

        for link in &snapshot.partitions {
            let parent = canonical_fqn(&link.parent);
            let child = canonical_fqn(&link.child);
            index.known.insert(parent.clone());
            index.known.insert(child.clone());
            index
                .parent_of
                .entry(child.clone())
                .or_insert_with(|| link.parent.clone());
            index
                .children
                .entry(parent)
                .or_default()
                .push((child, link.child.clone()));
        }

        for exchange in &snapshot.exchanges {
            index.known.insert(canonical_fqn(&exchange.external));
            index
                .exchanges
                .entry(canonical_fqn(&exchange.leaf))
                .or_insert_with(|| exchange.external.clone());
        }

        index
    }
}

/// Serializable catalog contents implementing [`CatalogSource`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogSnapshot {
    objects: Vec<SnapshotObject>,
    relation_dependencies: Vec<DependencyEdge>,
    view_dependencies: Vec<DependencyEdge>,
    partitions: Vec<PartitionLink>,
    exchanges: Vec<ExternalExchange>,
    sequence_owners: Vec<SequenceOwner>,
    #[serde(skip)]
    index: OnceLock<SnapshotIndex>,
}

impl PartialEq for CatalogSnapshot {
    fn eq(&self, other: &Self) -> bool {
        self.objects == other.objects
            && self.relation_dependencies == other.relation_dependencies
            && self.view_dependencies == other.view_dependencies
            && self.partitions == other.partitions
            && self.exchanges == other.exchanges
            && self.sequence_owners == other.sequence_owners
    }
}

impl Eq for CatalogSnapshot {}

impl CatalogSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a snapshot from JSON text.
    pub fn from_json(json: &str) -> CatalogResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a snapshot from a JSON file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> CatalogResult<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn to_json(&self) -> CatalogResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn objects(&self) -> &[SnapshotObject] {
        &self.objects
    }

    // -------------------------------------------------------------------------
    // Builders
    // -------------------------------------------------------------------------

    fn with_object(
        mut self,
        oid: u32,
        schema: impl Into<String>,
        name: impl Into<String>,
        class: ObjectClass,
        definition: String,
    ) -> Self {
        self.objects.push(SnapshotObject {
            oid: ObjectOid(oid),
            schema_oid: ObjectOid::default(),
            schema: schema.into(),
            name: name.into(),
            class,
            definition,
        });
        self.index = OnceLock::new();
        self
    }

    pub fn with_relation(
        self,
        oid: u32,
        schema: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        self.with_object(oid, schema, name, ObjectClass::Relation, String::new())
    }

    pub fn with_view(
        self,
        oid: u32,
        schema: impl Into<String>,
        name: impl Into<String>,
        definition: impl Into<String>,
    ) -> Self {
        self.with_object(oid, schema, name, ObjectClass::View, definition.into())
    }

    pub fn with_sequence(
        self,
        oid: u32,
        schema: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        self.with_object(oid, schema, name, ObjectClass::Sequence, String::new())
    }

    /// Record `child` as a direct partition of `parent` (both FQNs).
    pub fn with_partition(mut self, parent: impl Into<String>, child: impl Into<String>) -> Self {
        self.partitions.push(PartitionLink {
            parent: parent.into(),
            child: child.into(),
        });
        self.index = OnceLock::new();
        self
    }

    /// Record that `leaf`'s storage now lives in `external`.
    pub fn with_exchange(mut self, leaf: impl Into<String>, external: impl Into<String>) -> Self {
        self.exchanges.push(ExternalExchange {
            leaf: leaf.into(),
            external: external.into(),
        });
        self.index = OnceLock::new();
        self
    }

    pub fn with_relation_dependency(
        mut self,
        source: u32,
        referenced: impl Into<String>,
        is_table_edge: bool,
    ) -> Self {
        self.relation_dependencies
            .push(DependencyEdge::new(source, referenced, is_table_edge));
        self
    }

    pub fn with_view_dependency(
        mut self,
        source: u32,
        referenced: impl Into<String>,
    ) -> Self {
        self.view_dependencies
            .push(DependencyEdge::new(source, referenced, false));
        self
    }

    /// Record that sequence `schema.sequence` is owned by `schema.table.column`.
    pub fn with_sequence_owner(
        mut self,
        schema: impl Into<String>,
        sequence: impl Into<String>,
        table: impl Into<String>,
        column: impl Into<String>,
    ) -> Self {
        self.sequence_owners
            .push(SequenceOwner::new(schema, sequence, table, column));
        self
    }

    // -------------------------------------------------------------------------
    // Object listing
    // -------------------------------------------------------------------------

    fn relations_of(&self, class: ObjectClass, schemas: &SchemaFilter) -> Vec<Relation> {
        let mut relations: Vec<Relation> = self
            .objects
            .iter()
            .filter(|o| o.class == class && schemas.allows(&o.schema))
            .map(|o| Relation::new(o.schema_oid.0, o.oid.0, o.schema.clone(), o.name.clone()))
            .collect();
        relations.sort_by(|a, b| (&a.schema, &a.name).cmp(&(&b.schema, &b.name)));
        relations
    }

    /// Tables in the allowed schemas, ordered by schema then name.
    pub fn relations(&self, schemas: &SchemaFilter) -> Vec<Relation> {
        self.relations_of(ObjectClass::Relation, schemas)
    }

    /// Sequences in the allowed schemas, ordered by schema then name.
    pub fn sequences(&self, schemas: &SchemaFilter) -> Vec<Relation> {
        self.relations_of(ObjectClass::Sequence, schemas)
    }

    /// Views in the allowed schemas, in snapshot order.
    pub fn views(&self, schemas: &SchemaFilter) -> Vec<View> {
        self.objects
            .iter()
            .filter(|o| o.class == ObjectClass::View && schemas.allows(&o.schema))
            .map(|o| View::new(o.oid.0, o.schema.clone(), o.name.clone(), o.definition.clone()))
            .collect()
    }

    // -------------------------------------------------------------------------
    // Lookups
    // -------------------------------------------------------------------------

    fn index(&self) -> &SnapshotIndex {
        self.index.get_or_init(|| SnapshotIndex::build(self))
    }

    /// Canonical key for `fqn`, or `NotFound` if nothing in the snapshot
    /// carries that identity.
    fn resolve(&self, fqn: &str) -> CatalogResult<String> {
        let key = canonical_fqn(fqn);
        if self.index().known.contains(&key) {
            Ok(key)
        } else {
            Err(CatalogError::NotFound(fqn.to_string()))
        }
    }
}

/// Whether the object `fqn` names lives in an allowed schema. Names that do
/// not parse carry no schema and are kept.
fn referenced_schema_allowed(fqn: &str, schemas: &SchemaFilter) -> bool {
    QualifiedName::parse(fqn).map_or(true, |name| schemas.allows(&name.schema))
}

impl CatalogSource for CatalogSnapshot {
    fn dependency_edges(
        &self,
        class: ObjectClass,
        schemas: &SchemaFilter,
    ) -> CatalogResult<Vec<DependencyEdge>> {
        let edges = match class {
            ObjectClass::Relation => &self.relation_dependencies,
            ObjectClass::View => &self.view_dependencies,
            ObjectClass::Sequence => return Ok(Vec::new()),
        };
        // The schema filter applies to the referenced object. Table-to-table
        // inheritance rows are returned for every schema. Rows from unknown
        // sources pass through; the graph builder reports them.
        Ok(edges
            .iter()
            .filter(|e| {
                (class == ObjectClass::Relation && e.is_table_edge)
                    || referenced_schema_allowed(&e.referenced_object, schemas)
            })
            .cloned()
            .collect())
    }

    fn partition_role(&self, fqn: &str) -> CatalogResult<PartitionRole> {
        let key = self.resolve(fqn)?;
        let index = self.index();

        let parent = index.parent_of.get(&key).cloned();
        let has_children = index.children.contains_key(&key);

        Ok(match (parent, has_children) {
            (Some(parent), true) => PartitionRole::Intermediate { parent },
            (Some(parent), false) => PartitionRole::Leaf { parent },
            (None, true) => PartitionRole::Root,
            (None, false) => PartitionRole::NotPartitioned,
        })
    }

    fn leaf_partitions(&self, parent: &str) -> CatalogResult<Vec<String>> {
        let root = self.resolve(parent)?;
        let index = self.index();

        let mut leaves = Vec::new();
        let mut visited = HashSet::new();
        let mut queue = VecDeque::from([root]);

        while let Some(current) = queue.pop_front() {
            if !visited.insert(current.clone()) {
                continue;
            }
            for (key, child) in index.children.get(&current).into_iter().flatten() {
                if index.children.contains_key(key) {
                    queue.push_back(key.clone());
                } else {
                    leaves.push(child.clone());
                }
            }
        }

        Ok(leaves)
    }

    fn external_override(&self, leaf: &str) -> CatalogResult<Option<String>> {
        let key = self.resolve(leaf)?;
        Ok(self.index().exchanges.get(&key).cloned())
    }

    fn sequence_owners(&self) -> CatalogResult<Vec<SequenceOwner>> {
        Ok(self.sequence_owners.clone())
    }
}

//! Dependency map construction.
//!
//! Catalog dependency rows arrive flat, one per (object, referenced object)
//! pair. [`DependencyMap::build`] folds them into per-object adjacency lists
//! in a single pass; the owner of the object list then merges the map into
//! its objects with [`DependencyMap::apply`].

use std::collections::btree_map;
use std::collections::BTreeMap;

use crate::filter::SchemaFilter;
use crate::metadata::{
    CatalogResult, CatalogSource, DependencyEdge, ObjectClass, ObjectOid, Relation, View,
};

// =============================================================================
// Types
// =============================================================================

/// Adjacency lists for one object, in catalog row order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectDependencies {
    /// Every referenced object.
    pub depends_upon: Vec<String>,
    /// Table-to-table edges only. Always a subset of `depends_upon`.
    pub inherits: Vec<String>,
}

/// A dependency row whose source is not among the known objects.
///
/// The edge is kept in the map regardless; integrity is the catalog's
/// responsibility.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyIntegrityGap {
    pub source_oid: ObjectOid,
    pub referenced_object: String,
}

/// Immutable mapping from object handle to its dependencies.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyMap {
    entries: BTreeMap<ObjectOid, ObjectDependencies>,
    gaps: Vec<DependencyIntegrityGap>,
}

// =============================================================================
// Construction
// =============================================================================

impl DependencyMap {
    /// Fold `edges` into per-object lists.
    ///
    /// Every oid in `known_oids` gets an entry, empty if it has no edges.
    /// Edges from oids outside `known_oids` are retained and reported as
    /// gaps.
    pub fn build<I>(edges: &[DependencyEdge], known_oids: I) -> Self
    where
        I: IntoIterator<Item = ObjectOid>,
    {
        let mut entries: BTreeMap<ObjectOid, ObjectDependencies> = known_oids
            .into_iter()
            .map(|oid| (oid, ObjectDependencies::default()))
            .collect();
        let mut gaps = Vec::new();

        for edge in edges {
            let entry = match entries.entry(edge.source_oid) {
                btree_map::Entry::Occupied(slot) => slot.into_mut(),
                btree_map::Entry::Vacant(slot) => {
                    gaps.push(DependencyIntegrityGap {
                        source_oid: edge.source_oid,
                        referenced_object: edge.referenced_object.clone(),
                    });
                    slot.insert(ObjectDependencies::default())
                }
            };
            // Later rows for an already-gapped oid land in the occupied arm.
            entry.depends_upon.push(edge.referenced_object.clone());
            if edge.is_table_edge {
                entry.inherits.push(edge.referenced_object.clone());
            }
        }

        for gap in &gaps {
            tracing::warn!(
                source_oid = %gap.source_oid,
                referenced = %gap.referenced_object,
                "dependency row references an unknown object"
            );
        }

        Self { entries, gaps }
    }

    // =========================================================================
    // Lookups
    // =========================================================================

    pub fn get(&self, oid: ObjectOid) -> Option<&ObjectDependencies> {
        self.entries.get(&oid)
    }

    /// All dependencies of `oid`; empty for an unknown oid.
    pub fn dependencies_of(&self, oid: ObjectOid) -> &[String] {
        self.entries
            .get(&oid)
            .map(|deps| deps.depends_upon.as_slice())
            .unwrap_or_default()
    }

    /// Inheritance parents of `oid`; empty for an unknown oid.
    pub fn inherits_of(&self, oid: ObjectOid) -> &[String] {
        self.entries
            .get(&oid)
            .map(|deps| deps.inherits.as_slice())
            .unwrap_or_default()
    }

    /// Source oids seen in edges but absent from the known objects, one per
    /// oid.
    pub fn gaps(&self) -> &[DependencyIntegrityGap] {
        &self.gaps
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in oid order.
    pub fn iter(&self) -> impl Iterator<Item = (ObjectOid, &ObjectDependencies)> {
        self.entries.iter().map(|(oid, deps)| (*oid, deps))
    }

    /// Merge the map into `objects` in one pass.
    pub fn apply<T: Dependent>(&self, objects: &mut [T]) {
        for object in objects.iter_mut() {
            if let Some(deps) = self.entries.get(&object.dependency_oid()) {
                object.set_dependencies(deps);
            }
        }
    }
}

/// An object that can receive its dependency lists.
pub trait Dependent {
    fn dependency_oid(&self) -> ObjectOid;
    fn set_dependencies(&mut self, deps: &ObjectDependencies);
}

impl Dependent for Relation {
    fn dependency_oid(&self) -> ObjectOid {
        self.oid
    }

    fn set_dependencies(&mut self, deps: &ObjectDependencies) {
        self.depends_upon = deps.depends_upon.clone();
        self.inherits = deps.inherits.clone();
    }
}

impl Dependent for View {
    fn dependency_oid(&self) -> ObjectOid {
        self.oid
    }

    fn set_dependencies(&mut self, deps: &ObjectDependencies) {
        self.depends_upon = deps.depends_upon.clone();
    }
}

// =============================================================================
// Catalog entry points
// =============================================================================

/// Query relation dependencies, then fill `relations` in place.
pub fn construct_relation_dependencies<S: CatalogSource + ?Sized>(
    source: &S,
    schemas: &SchemaFilter,
    relations: &mut [Relation],
) -> CatalogResult<DependencyMap> {
    construct(source, ObjectClass::Relation, schemas, relations)
}

/// Query view-to-view dependencies, then fill `views` in place.
pub fn construct_view_dependencies<S: CatalogSource + ?Sized>(
    source: &S,
    schemas: &SchemaFilter,
    views: &mut [View],
) -> CatalogResult<DependencyMap> {
    construct(source, ObjectClass::View, schemas, views)
}

fn construct<S, T>(
    source: &S,
    class: ObjectClass,
    schemas: &SchemaFilter,
    objects: &mut [T],
) -> CatalogResult<DependencyMap>
where
    S: CatalogSource + ?Sized,
    T: Dependent,
{
    let edges = source.dependency_edges(class, schemas)?;
    let map = DependencyMap::build(&edges, objects.iter().map(Dependent::dependency_oid));
    map.apply(objects);

    tracing::info!(
        class = ?class,
        objects = objects.len(),
        edges = edges.len(),
        gaps = map.gaps().len(),
        "constructed dependency map"
    );
    Ok(map)
}

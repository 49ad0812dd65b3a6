//! Object dependency graph.
//!
//! ```text
//!   CatalogSource::dependency_edges(class)
//!                 │  flat rows, ordered by source object
//!                 ▼
//!        DependencyMap::build ──► gaps (unknown source oids)
//!                 │  oid -> { depends_upon, inherits }
//!                 ▼
//!        DependencyMap::apply(&mut objects)
//!                 │
//!                 ▼
//!        sort_by_dependencies(&objects) -> emission order
//! ```

mod builder;
mod ordering;

pub use builder::{
    construct_relation_dependencies, construct_view_dependencies, Dependent,
    DependencyIntegrityGap, DependencyMap, ObjectDependencies,
};
pub use ordering::{sort_by_dependencies, GraphError, GraphResult};

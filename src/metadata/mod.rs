//! Catalog metadata module.
//!
//! This module defines the objects read from a database catalog and the
//! [`CatalogSource`] abstraction the rest of the crate queries them through.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                        CatalogSource                            │
//! │  - dependency_edges(class, schemas)   -> Vec<DependencyEdge>    │
//! │  - partition_role(fqn)                -> PartitionRole          │
//! │  - leaf_partitions(parent)            -> Vec<String>            │
//! │  - external_override(leaf)            -> Option<String>         │
//! │  - sequence_owners()                  -> Vec<SequenceOwner>     │
//! └─────────────────────────────────────────────────────────────────┘
//!            │                                   │
//!            ▼                                   ▼
//!   live catalog connection             CatalogSnapshot (JSON)
//!   (provided by the caller)
//! ```
//!
//! # Example
//!
//! ```
//! use relmeta::metadata::{CatalogSnapshot, CatalogSource, PartitionRole};
//!
//! let catalog = CatalogSnapshot::new()
//!     .with_relation(16384, "public", "rank")
//!     .with_partition("public.rank", "public.rank_1_prt_boys");
//!
//! assert_eq!(catalog.partition_role("public.rank").unwrap(), PartitionRole::Root);
//! ```

mod provider;
mod sequence;
mod snapshot;
mod types;

pub use provider::{CatalogError, CatalogResult, CatalogSource};
pub use sequence::{sequence_column_owners, SequenceOwner};
pub use snapshot::{CatalogSnapshot, ExternalExchange, PartitionLink, SnapshotObject};
pub use types::*;

//! # relmeta
//!
//! Catalog metadata core for database backup and restore.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                 CatalogSource (metadata)                 │
//! │   live catalog connection  |  CatalogSnapshot (JSON)     │
//! └─────────────────────────────────────────────────────────┘
//!            │                                  │
//!            ▼ [graph]                          ▼ [filter]
//! ┌──────────────────────────┐   ┌──────────────────────────┐
//! │  DependencyMap           │   │  PartitionExpander       │
//! │  oid -> depends/inherits │   │  FilterSet fixed point   │
//! │  sort_by_dependencies    │   │  RelationFilter          │
//! └──────────────────────────┘   └──────────────────────────┘
//!            │                                  │
//!            └───────────────┬──────────────────┘
//!                            ▼  (external DDL emitter)
//! ┌─────────────────────────────────────────────────────────┐
//! │            ScriptBuffer + Toc spans (toc)                │
//! │            slice_buffer -> per-object texts              │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! Every name crossing a module boundary is a fully-qualified name rendered
//! by [`sql::ident`].

pub mod config;
pub mod filter;
pub mod graph;
pub mod metadata;
pub mod sql;
pub mod toc;

pub use config::{Settings, SettingsError};
pub use filter::{FilterKind, FilterSet, PartitionExpander, RelationFilter, SchemaFilter};
pub use graph::{sort_by_dependencies, DependencyMap};
pub use metadata::{CatalogError, CatalogSnapshot, CatalogSource};
pub use sql::ident::{make_fqn, quote_ident};
pub use toc::{slice_buffer, MetadataEntry, ScriptBuffer, Toc};

//! Partition-aware filter expansion.
//!
//! A partitioned table's leaves are addressable tables in their own right,
//! so a user filter can name a leaf without its parent or a parent without
//! the leaves holding its data. The expander closes the filter over the
//! partition hierarchy:
//!
//! - a selected leaf pulls in its parent, so the parent's definition is
//!   emitted alongside the leaf's data;
//! - a parent pulls in every leaf whose storage was exchanged with an
//!   external table, under the external object's name;
//! - in leaf-partition-data mode, a parent also pulls in every other leaf,
//!   unless the filter already names one of its leaves. Naming particular
//!   leaves keeps the selection narrow.
//!
//! Expansion runs off an explicit worklist until no new names appear, so
//! hierarchies of any depth converge.

use std::collections::{HashSet, VecDeque};

use super::filter_set::{FilterKind, FilterSet};
use crate::metadata::{CatalogError, CatalogSource};
use crate::sql::ident::canonical_fqn;

/// Errors raised while expanding a filter.
#[derive(Debug, thiserror::Error)]
pub enum ExpandError {
    #[error("could not resolve '{name}' against the catalog: {source}")]
    CatalogResolution {
        name: String,
        #[source]
        source: CatalogError,
    },
}

/// Result type for filter expansion.
pub type ExpandResult<T> = Result<T, ExpandError>;

/// What an expansion changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpansionReport {
    /// Names appended to the filter, in the order they were appended.
    pub added: Vec<String>,
    /// Number of names resolved against the catalog.
    pub resolved: usize,
}

impl ExpansionReport {
    pub fn is_unchanged(&self) -> bool {
        self.added.is_empty()
    }
}

/// Expands a [`FilterSet`] over partition hierarchies.
///
/// # Example
///
/// ```
/// use relmeta::filter::{FilterSet, PartitionExpander};
/// use relmeta::metadata::CatalogSnapshot;
///
/// let catalog = CatalogSnapshot::new()
///     .with_partition("public.rank", "public.rank_1_prt_boys")
///     .with_partition("public.rank", "public.rank_1_prt_girls");
///
/// let mut include = FilterSet::include(["public.rank_1_prt_boys"]);
/// PartitionExpander::new(&catalog).expand(&mut include).unwrap();
///
/// assert_eq!(include.names(), &["public.rank_1_prt_boys", "public.rank"]);
/// ```
pub struct PartitionExpander<'a, S: CatalogSource + ?Sized> {
    catalog: &'a S,
    leaf_partition_data: bool,
}

impl<'a, S: CatalogSource + ?Sized> PartitionExpander<'a, S> {
    pub fn new(catalog: &'a S) -> Self {
        Self {
            catalog,
            leaf_partition_data: false,
        }
    }

    /// Select every leaf of a selected parent, not only exchanged ones.
    pub fn leaf_partition_data(mut self, enabled: bool) -> Self {
        self.leaf_partition_data = enabled;
        self
    }

    /// Expand `filter` in place until it reaches a fixed point.
    ///
    /// On a resolution failure the error names the offending entry. Names
    /// appended before the failure stay in the filter; nothing related to
    /// the failing name is appended.
    pub fn expand(&self, filter: &mut FilterSet) -> ExpandResult<ExpansionReport> {
        let mut report = ExpansionReport::default();
        let mut pending: VecDeque<String> = filter.iter().cloned().collect();
        let mut visited: HashSet<String> = HashSet::new();

        while let Some(name) = pending.pop_front() {
            if !visited.insert(canonical_fqn(&name)) {
                continue;
            }

            let related = self.related_names(&name, filter)?;
            report.resolved += 1;

            for related_name in related {
                if filter.insert(related_name.clone()) {
                    tracing::debug!(from = %name, added = %related_name, "expanded partition filter");
                    report.added.push(related_name.clone());
                    pending.push_back(related_name);
                }
            }
        }

        tracing::info!(
            kind = ?filter.kind(),
            resolved = report.resolved,
            added = report.added.len(),
            "partition filter expansion complete"
        );
        Ok(report)
    }

    /// Names that must accompany `name` in `filter`. Nothing is inserted
    /// here, so a failure leaves the filter untouched.
    fn related_names(&self, name: &str, filter: &FilterSet) -> ExpandResult<Vec<String>> {
        let role = self.catalog.partition_role(name).map_err(|source| {
            ExpandError::CatalogResolution {
                name: name.to_string(),
                source,
            }
        })?;

        let mut related = Vec::new();

        // Excluding a leaf must not exclude its siblings' parent.
        if filter.kind() == FilterKind::Include {
            if let Some(parent) = role.parent() {
                related.push(parent.to_string());
            }
        }

        if role.has_children() {
            related.extend(self.leaf_names(name, filter)?);
        }

        Ok(related)
    }

    /// Addressable leaves of `parent`: exchanged leaves always, the rest
    /// only in leaf-partition-data mode when `filter` names none of them.
    fn leaf_names(&self, parent: &str, filter: &FilterSet) -> ExpandResult<Vec<String>> {
        let resolution = |name: &str, source| ExpandError::CatalogResolution {
            name: name.to_string(),
            source,
        };

        let leaves = self
            .catalog
            .leaf_partitions(parent)
            .map_err(|e| resolution(parent, e))?;

        let mut resolved = Vec::with_capacity(leaves.len());
        for leaf in leaves {
            let external = self
                .catalog
                .external_override(&leaf)
                .map_err(|e| resolution(&leaf, e))?;
            resolved.push((leaf, external));
        }

        let narrowed = resolved.iter().any(|(leaf, external)| {
            filter.contains(leaf) || external.as_deref().is_some_and(|x| filter.contains(x))
        });
        let every_leaf = self.leaf_partition_data && !narrowed;

        Ok(resolved
            .into_iter()
            .filter_map(|(leaf, external)| match external {
                Some(external) => Some(external),
                None if every_leaf => Some(leaf),
                None => None,
            })
            .collect())
    }
}

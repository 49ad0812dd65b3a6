use proptest::prelude::*;
use relmeta::filter::{ExpandError, FilterSet, PartitionExpander, SchemaFilter};
use relmeta::metadata::{
    CatalogError, CatalogResult, CatalogSnapshot, CatalogSource, DependencyEdge, ObjectClass,
    PartitionRole, SequenceOwner,
};

/// List-partitioned table with `girls`, `boys` and a default `other` leaf.
fn gender_partitioned(snapshot: CatalogSnapshot, parent: &str) -> CatalogSnapshot {
    ["girls", "boys", "other"].iter().fold(snapshot, |s, leaf| {
        s.with_partition(parent, format!("{parent}_1_prt_{leaf}"))
    })
}

fn sorted(filter: &FilterSet) -> Vec<String> {
    let mut names = filter.names().to_vec();
    names.sort();
    names
}

// ============================================================================
// Leaf -> parent
// ============================================================================

#[test]
fn test_adds_parent_for_leaf_with_special_chars() {
    // The catalog holds the names unquoted, so both the rows and the filter
    // entry fold to the lowercase identity `public.cappart`.
    let catalog = gender_partitioned(CatalogSnapshot::new(), "public.CAPpart");
    let mut include = FilterSet::include(["public.CAPpart_1_prt_girls"]);

    PartitionExpander::new(&catalog).expand(&mut include).unwrap();

    assert_eq!(
        include.names(),
        &["public.CAPpart_1_prt_girls", "public.CAPpart"]
    );
}

#[test]
fn test_adds_parent_for_quoted_mixed_case_leaf() {
    let catalog = ["girls", "boys", "other"].iter().fold(CatalogSnapshot::new(), |s, leaf| {
        s.with_partition("public.\"CAPpart\"", format!("public.\"CAPpart_1_prt_{leaf}\""))
    });
    let mut include = FilterSet::include(["public.\"CAPpart_1_prt_girls\""]);

    PartitionExpander::new(&catalog).expand(&mut include).unwrap();

    assert_eq!(
        include.names(),
        &["public.\"CAPpart_1_prt_girls\"", "public.\"CAPpart\""]
    );

    // Unquoted, the same spelling names a different (lowercase) table.
    let mut folded = FilterSet::include(["public.CAPpart_1_prt_girls"]);
    let err = PartitionExpander::new(&catalog)
        .expand(&mut folded)
        .unwrap_err();
    let ExpandError::CatalogResolution { source, .. } = err;
    assert!(matches!(source, CatalogError::NotFound(_)));
}

#[test]
fn test_adds_parent_for_leaf_with_embedded_quote() {
    let catalog = gender_partitioned(CatalogSnapshot::new(), "public.\"hasquote\"");
    let leaf = "public.\"hasquote\"_1_prt_girls";
    let mut include = FilterSet::include([leaf]);

    PartitionExpander::new(&catalog).expand(&mut include).unwrap();

    assert_eq!(include.len(), 2);
    assert_eq!(include.names()[0], leaf);
    assert_eq!(include.names()[1], "public.\"hasquote\"");
}

// ============================================================================
// Parent -> leaves
// ============================================================================

#[test]
fn test_leaf_partition_data_adds_every_leaf_of_selected_parent() {
    let catalog = gender_partitioned(
        CatalogSnapshot::new()
            .with_relation(100, "public", "rank")
            .with_relation(200, "public", "test_table"),
        "public.rank",
    );
    let mut include = FilterSet::include(["public.rank"]);

    PartitionExpander::new(&catalog)
        .leaf_partition_data(true)
        .expand(&mut include)
        .unwrap();

    assert_eq!(
        sorted(&include),
        vec![
            "public.rank",
            "public.rank_1_prt_boys",
            "public.rank_1_prt_girls",
            "public.rank_1_prt_other",
        ]
    );
}

#[test]
fn test_leaf_partition_data_adds_parent_and_external_leaf_for_selected_leaf() {
    // The exchanged table takes over the partition's name.
    let catalog = gender_partitioned(CatalogSnapshot::new(), "public.partition_table")
        .with_exchange(
            "public.partition_table_1_prt_girls",
            "public.partition_table_1_prt_girls",
        );
    let mut include = FilterSet::include(["public.partition_table_1_prt_boys"]);

    PartitionExpander::new(&catalog)
        .leaf_partition_data(true)
        .expand(&mut include)
        .unwrap();

    assert_eq!(
        sorted(&include),
        vec![
            "public.partition_table",
            "public.partition_table_1_prt_boys",
            "public.partition_table_1_prt_girls",
        ]
    );
}

#[test]
fn test_external_leaves_added_for_selected_parents() {
    let mut catalog = CatalogSnapshot::new();
    for (table, exchanged) in [
        ("public.partition_table1", "boys"),
        ("public.partition_table2", "girls"),
        ("public.partition_table3", "girls"),
    ] {
        let leaf = format!("{table}_1_prt_{exchanged}");
        catalog = gender_partitioned(catalog, table).with_exchange(leaf.clone(), leaf);
    }
    let mut include = FilterSet::include([
        "public.partition_table1",
        "public.partition_table2_1_prt_other",
    ]);

    PartitionExpander::new(&catalog).expand(&mut include).unwrap();

    assert_eq!(
        sorted(&include),
        vec![
            "public.partition_table1",
            "public.partition_table1_1_prt_boys",
            "public.partition_table2",
            "public.partition_table2_1_prt_girls",
            "public.partition_table2_1_prt_other",
        ]
    );
}

#[test]
fn test_external_override_name_is_substituted() {
    let catalog = gender_partitioned(CatalogSnapshot::new(), "public.sales")
        .with_exchange("public.sales_1_prt_boys", "ext.sales_boys_archive");
    let mut include = FilterSet::include(["public.sales"]);

    let report = PartitionExpander::new(&catalog)
        .leaf_partition_data(true)
        .expand(&mut include)
        .unwrap();

    assert_eq!(
        report.added,
        vec![
            "public.sales_1_prt_girls",
            "ext.sales_boys_archive",
            "public.sales_1_prt_other",
        ]
    );
}

// ============================================================================
// Identity and exclusion
// ============================================================================

#[test]
fn test_differently_spelled_parent_is_not_duplicated() {
    let catalog = gender_partitioned(CatalogSnapshot::new(), "public.rank");
    let mut include = FilterSet::include(["PUBLIC.RANK", "public.rank_1_prt_boys"]);

    let report = PartitionExpander::new(&catalog).expand(&mut include).unwrap();

    assert!(report.is_unchanged());
    assert_eq!(include.names(), &["PUBLIC.RANK", "public.rank_1_prt_boys"]);
}

#[test]
fn test_exclude_set_never_gains_a_parent() {
    let catalog = gender_partitioned(CatalogSnapshot::new(), "public.rank");
    let mut exclude = FilterSet::exclude(["public.rank_1_prt_other"]);

    PartitionExpander::new(&catalog)
        .leaf_partition_data(true)
        .expand(&mut exclude)
        .unwrap();

    assert_eq!(exclude.names(), &["public.rank_1_prt_other"]);
}

// ============================================================================
// Failures
// ============================================================================

#[test]
fn test_unknown_name_fails_without_adding_its_relatives() {
    let catalog = gender_partitioned(CatalogSnapshot::new(), "public.rank");
    let mut include = FilterSet::include(["public.dropped_table", "public.rank_1_prt_boys"]);

    let err = PartitionExpander::new(&catalog)
        .expand(&mut include)
        .unwrap_err();

    let ExpandError::CatalogResolution { name, source } = err;
    assert_eq!(name, "public.dropped_table");
    assert!(matches!(source, CatalogError::NotFound(_)));
    assert_eq!(
        include.names(),
        &["public.dropped_table", "public.rank_1_prt_boys"]
    );
}

/// Catalog whose external-table lookup fails for one leaf.
struct FailingOverride {
    inner: CatalogSnapshot,
    failing_leaf: &'static str,
}

impl CatalogSource for FailingOverride {
    fn dependency_edges(
        &self,
        class: ObjectClass,
        schemas: &SchemaFilter,
    ) -> CatalogResult<Vec<DependencyEdge>> {
        self.inner.dependency_edges(class, schemas)
    }

    fn partition_role(&self, fqn: &str) -> CatalogResult<PartitionRole> {
        self.inner.partition_role(fqn)
    }

    fn leaf_partitions(&self, parent: &str) -> CatalogResult<Vec<String>> {
        self.inner.leaf_partitions(parent)
    }

    fn external_override(&self, leaf: &str) -> CatalogResult<Option<String>> {
        if leaf == self.failing_leaf {
            return Err(CatalogError::QueryFailed {
                object: leaf.to_string(),
                reason: "connection reset".to_string(),
            });
        }
        self.inner.external_override(leaf)
    }

    fn sequence_owners(&self) -> CatalogResult<Vec<SequenceOwner>> {
        self.inner.sequence_owners()
    }
}

#[test]
fn test_failure_during_leaf_enumeration_adds_no_leaves() {
    let catalog = FailingOverride {
        inner: gender_partitioned(
            CatalogSnapshot::new()
                .with_relation(1, "public", "plain")
                .with_relation(100, "public", "rank"),
            "public.rank",
        ),
        failing_leaf: "public.rank_1_prt_boys",
    };
    let mut include = FilterSet::include(["public.plain", "public.rank"]);

    let err = PartitionExpander::new(&catalog)
        .leaf_partition_data(true)
        .expand(&mut include)
        .unwrap_err();

    // girls resolved before boys failed; it must not have been appended.
    let ExpandError::CatalogResolution { name, source } = err;
    assert_eq!(name, "public.rank_1_prt_boys");
    assert!(matches!(source, CatalogError::QueryFailed { .. }));
    assert_eq!(include.names(), &["public.plain", "public.rank"]);
}

// ============================================================================
// Properties
// ============================================================================

fn two_level_catalog() -> CatalogSnapshot {
    let catalog = gender_partitioned(CatalogSnapshot::new(), "public.rank")
        .with_exchange("public.rank_1_prt_girls", "public.rank_ext");
    gender_partitioned(catalog, "public.sales_1_prt_2023")
        .with_partition("public.sales", "public.sales_1_prt_2023")
        .with_relation(1, "public", "plain")
}

const NAMES: &[&str] = &[
    "public.rank",
    "public.rank_1_prt_girls",
    "public.rank_1_prt_boys",
    "public.rank_1_prt_other",
    "public.rank_ext",
    "public.sales",
    "public.sales_1_prt_2023",
    "public.sales_1_prt_2023_1_prt_boys",
    "public.sales_1_prt_2023_1_prt_other",
    "public.plain",
];

proptest! {
    #[test]
    fn expansion_reaches_a_fixed_point(
        picks in prop::collection::vec(0..NAMES.len(), 0..5),
        leaf_data in any::<bool>(),
        include in any::<bool>(),
    ) {
        let catalog = two_level_catalog();
        let names = picks.iter().map(|i| NAMES[*i]);
        let mut filter = if include {
            FilterSet::include(names)
        } else {
            FilterSet::exclude(names)
        };
        let expander = PartitionExpander::new(&catalog).leaf_partition_data(leaf_data);

        expander.expand(&mut filter).unwrap();
        let once = filter.clone();
        let report = expander.expand(&mut filter).unwrap();

        prop_assert!(report.is_unchanged());
        prop_assert_eq!(filter, once);
    }
}

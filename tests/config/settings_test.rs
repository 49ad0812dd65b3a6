use std::fs;
use std::path::PathBuf;

use relmeta::config::{Settings, SettingsError};
use relmeta::filter::PartitionExpander;
use relmeta::metadata::CatalogSnapshot;

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("relmeta-{name}-{}", std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn test_settings_drive_a_full_expansion() {
    let dir = scratch_dir("expansion");

    let snapshot = CatalogSnapshot::new()
        .with_relation(100, "public", "rank")
        .with_partition("public.rank", "public.rank_1_prt_girls")
        .with_partition("public.rank", "public.rank_1_prt_boys");
    let snapshot_path = dir.join("catalog.json");
    fs::write(&snapshot_path, snapshot.to_json().unwrap()).unwrap();

    std::env::set_var("RELMETA_TEST_SNAPSHOT_DIR", &dir);
    let config_path = dir.join("relmeta.toml");
    fs::write(
        &config_path,
        r#"
[filter]
include_relations = ["public.rank_1_prt_girls"]

[catalog]
snapshot = "${RELMETA_TEST_SNAPSHOT_DIR}/catalog.json"
"#,
    )
    .unwrap();

    let settings = Settings::from_file(&config_path).unwrap();
    let catalog = settings.open_snapshot().unwrap();
    assert_eq!(catalog, snapshot);

    let mut filter = settings.relation_filter();
    PartitionExpander::new(&catalog)
        .leaf_partition_data(settings.filter.leaf_partition_data)
        .expand(&mut filter.include)
        .unwrap();

    assert_eq!(
        filter.include.names(),
        &["public.rank_1_prt_girls", "public.rank"]
    );
    assert!(filter.selects("public", "rank"));
    assert!(!filter.selects("public", "rank_1_prt_boys"));

    std::env::remove_var("RELMETA_TEST_SNAPSHOT_DIR");
    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_missing_snapshot_file_is_reported() {
    let settings = Settings::from_toml(
        r#"
[catalog]
snapshot = "/nonexistent/relmeta/catalog.json"
"#,
    )
    .unwrap();

    assert!(matches!(
        settings.open_snapshot(),
        Err(SettingsError::Catalog(_))
    ));
}

#[test]
fn test_invalid_toml_is_a_parse_error() {
    let err = Settings::from_toml("[filter\ninclude_relations = 3").unwrap_err();
    assert!(matches!(err, SettingsError::ParseError(_)));
}

use std::path::Path;

use bbdir_ingest::{
    Biomaterials, CodeField, IngestError, clean_records, load_finder, parse_finder, read_sheets,
    read_workbook, write_delta, write_finder, write_id_csv, write_workbook,
};
use bbdir_model::{DirectoryStore, Entity, EntityKind};
use bbdir_normalize::{CodeKind, Normalizer};

fn fixture() -> &'static Path {
    Path::new(concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/finder.json"))
}

#[test]
fn only_biobank_records_are_decoded() {
    let records = load_finder(fixture(), "biobank").expect("load finder");
    assert_eq!(records.len(), 1);
    let record = &records[0];
    assert_eq!(record.org_key(), "44001");
    assert_eq!(record.primary_url(), "https://example.org/nmbank");
    assert_eq!(record.address.host_institution, "Fondazione Example");
    assert_eq!(record.donor_count().expect("donors"), 15);
    assert_eq!(
        record.bb_core.extra.get("year of establishment").and_then(|v| v.as_str()),
        Some("1994")
    );
}

#[test]
fn missing_key_fails_the_run() {
    let text = r#"{"allData": [{"OrganizationID": 1, "type": "biobank", "name": "x"}]}"#;
    let err = parse_finder(text, Path::new("bad.json"), "biobank").expect_err("missing keys");
    assert!(
        matches!(err, IngestError::Record { ref organization, .. } if organization == "1"),
        "{err}"
    );
}

#[test]
fn biomaterials_combine_fixed_and_free_text() {
    let records = load_finder(fixture(), "biobank").expect("load finder");
    let names = records[0]
        .biomaterial_names(&Normalizer::default())
        .expect("biomaterials");
    assert_eq!(names, vec!["DNA", "Tissues", "Feathers", "Plasma", "Serum"]);
}

#[test]
fn clean_pass_rewrites_codes_and_survives_reload() {
    let dir = tempfile::tempdir().expect("tempdir");
    let records = load_finder(fixture(), "biobank").expect("load finder");
    let normalizer = Normalizer::default();
    let cleaned = clean_records(&records, &normalizer).expect("clean");

    let disease = &cleaned[0].diseases[0];
    assert_eq!(
        disease.orphacode,
        CodeField::Tokens(vec!["ORPHA:70".into(), "ORPHA:98896".into()])
    );
    assert_eq!(
        disease.icd10,
        CodeField::Tokens(vec!["urn:miriam:icd:G71.3".into()])
    );
    assert_eq!(
        cleaned[0].bb_core.biomaterial_available,
        Biomaterials::List(vec!["DNA".into(), "Tissues".into(), "Feathers".into()])
    );

    let out = dir.path().join("clean.json");
    write_finder(&out, &cleaned).expect("write cleaned");
    let reloaded = load_finder(&out, "biobank").expect("reload");
    assert_eq!(reloaded, cleaned);
    assert_eq!(
        reloaded[0].diseases[0].orphacode.tokens(CodeKind::Orphacode, &normalizer),
        vec!["ORPHA:70", "ORPHA:98896"]
    );
}

#[test]
fn workbook_round_trip_and_delta() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut store = DirectoryStore::new();
    store
        .insert(EntityKind::Network, Entity::new("net:1").with("name", "Net"))
        .expect("insert network");
    let full = dir.path().join("out/directory.json");
    write_workbook(&full, &store).expect("write workbook");

    let mut reloaded = read_workbook(&full).expect("read workbook");
    assert_eq!(reloaded.len(EntityKind::Network), 1);
    assert!(!reloaded.has_changes());

    reloaded
        .insert(EntityKind::Country, Entity::new("MT").with("name", "Malta"))
        .expect("insert country");
    let delta = dir.path().join("out/delta.json");
    write_delta(&delta, &reloaded).expect("write delta");
    let sheets = read_sheets(&delta).expect("read delta");
    assert_eq!(sheets.len(), 1);
    assert_eq!(sheets[EntityKind::Country.sheet_name()].len(), 1);
    assert!(!dir.path().join("out/delta.json.partial").exists());
}

#[test]
fn duplicate_workbook_ids_are_rejected() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("dup.json");
    std::fs::write(
        &path,
        r#"{"eu_bbmri_eric_networks": [{"id": "n1"}, {"id": "n1"}]}"#,
    )
    .expect("write workbook");
    assert!(matches!(
        read_workbook(&path),
        Err(IngestError::Workbook { .. })
    ));
}

#[test]
fn id_csv_is_semicolon_delimited() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("missing.csv");
    write_id_csv(&path, ["ORPHA:1", "ORPHA:2"]).expect("write csv");
    let text = std::fs::read_to_string(&path).expect("read csv");
    assert_eq!(text, "id\nORPHA:1\nORPHA:2\n");
}

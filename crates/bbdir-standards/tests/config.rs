use std::io::Write;
use std::path::Path;

use bbdir_normalize::MaterialType;
use bbdir_standards::{
    CONFIG_FILE, StandardsConfig, StandardsError, SupplementalTable, config_in, standards_root,
};

const MINIMAL: &str = r#"
[identity]
authority = "bbmri-eric"
scope = "EXT"
network = "bbmri-eric:networkID:EU_BBMRI-ERIC:networks:RD-Biobanks"

[countries]
"Italy" = "IT"

[country_overrides]
"1001" = "MT"

[biobanks.42]
biobank = "bbmri-eric:ID:IT_42"

[materials]
"whole blood" = "WHOLE_BLOOD"

[normalizer.gene]
deny = ["n/a"]
"#;

#[test]
fn minimal_settings_fill_defaults() {
    let config = StandardsConfig::from_toml_str(MINIMAL, Path::new("minimal.toml"))
        .expect("parse settings");
    assert_eq!(config.identity.scope, "EXT");
    assert_eq!(config.identity.also_known_prefix, "rdconnect");
    assert_eq!(config.identity.record_type, "biobank");
    assert_eq!(config.catalogue.excluded_namespace, "ncit");
    assert!(config.biobanks["42"].collection.is_none());
    assert!(config.normalizer.gene.is_denied("n/a"));
    assert_eq!(
        config.material_types().lookup("Whole Blood"),
        Some(MaterialType::WholeBlood)
    );
}

#[test]
fn empty_authority_is_rejected() {
    let text = MINIMAL.replace(r#"authority = "bbmri-eric""#, r#"authority = " ""#);
    let err = StandardsConfig::from_toml_str(&text, Path::new("bad.toml"))
        .expect_err("empty authority");
    assert!(matches!(err, StandardsError::InvalidConfig { .. }), "{err}");
}

#[test]
fn blank_catalogue_settings_are_rejected() {
    for setting in ["excluded_namespace", "orphanet_prefix"] {
        let text = format!("{MINIMAL}\n[catalogue]\n{setting} = \"\"\n");
        let err = StandardsConfig::from_toml_str(&text, Path::new("bad.toml"))
            .expect_err("blank catalogue setting");
        assert!(matches!(err, StandardsError::InvalidConfig { .. }), "{err}");
        assert!(err.to_string().contains(setting), "{err}");
    }
}

#[test]
fn unknown_material_type_is_a_toml_error() {
    let text = MINIMAL.replace("WHOLE_BLOOD", "FEATHERS");
    let err = StandardsConfig::from_toml_str(&text, Path::new("bad.toml"))
        .expect_err("unknown material");
    assert!(matches!(err, StandardsError::Toml { .. }), "{err}");
}

#[test]
fn settings_file_replaces_builtin() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("settings.toml");
    std::fs::write(&path, MINIMAL).expect("write settings");

    let loaded = StandardsConfig::resolve(Some(&path)).expect("load settings");
    assert_eq!(loaded.countries.len(), 1);

    let builtin = StandardsConfig::resolve(None).expect("builtin settings");
    assert_eq!(builtin.identity.scope, "RD");
    assert!(builtin.countries.len() > loaded.countries.len());
}

#[test]
fn supplemental_table_reads_semicolon_rows() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("missing_diseases.csv");
    let mut file = std::fs::File::create(&path).expect("create csv");
    write!(
        file,
        "\u{feff}id;label;ontology\nORPHA:99;Rare thing;orphanet\n;no id;x\nORPHA:99;dup;x\nORPHA:7;;orphanet\n"
    )
    .expect("write csv");
    drop(file);

    let table = SupplementalTable::load(&path).expect("load table");
    assert_eq!(table.len(), 2);
    assert_eq!(table.source(), Some(path.as_path()));
    let row = table.get("ORPHA:99").expect("row");
    assert_eq!(row.text("label"), "Rare thing");
    assert!(table.get("ORPHA:7").expect("row").get("label").is_some_and(|v| v.is_empty()));
    assert_eq!(table.ids().collect::<Vec<_>>(), vec!["ORPHA:7", "ORPHA:99"]);
}

#[test]
fn supplemental_table_requires_id_column() {
    let err = SupplementalTable::from_reader("code;label\nX;Y\n".as_bytes(), Path::new("x.csv"))
        .expect_err("missing id column");
    assert!(
        matches!(err, StandardsError::MissingColumn { ref column, .. } if column == "id"),
        "{err}"
    );
}

#[test]
fn missing_supplemental_file_is_empty() {
    let dir = tempfile::tempdir().expect("tempdir");
    let table = SupplementalTable::load_optional(&dir.path().join("absent.csv"))
        .expect("optional table");
    assert!(table.is_empty());
}

#[test]
fn standards_directory_settings_are_optional() {
    let dir = tempfile::tempdir().expect("tempdir");
    assert_eq!(config_in(dir.path()), None);

    std::fs::write(dir.path().join(CONFIG_FILE), "").expect("write settings");
    assert_eq!(config_in(dir.path()), Some(dir.path().join(CONFIG_FILE)));
}

#[test]
fn shipped_standards_directory_matches_builtin() {
    let root = standards_root();
    let path = config_in(&root).expect("shipped settings file");
    let shipped = StandardsConfig::load(&path).expect("load shipped settings");
    let builtin = StandardsConfig::builtin().expect("builtin settings");
    assert_eq!(shipped.identity, builtin.identity);
    assert_eq!(shipped.countries, builtin.countries);
}

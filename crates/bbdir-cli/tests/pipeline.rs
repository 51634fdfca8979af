//! End-to-end runs of the command pipelines on temporary files.

use std::fs;
use std::path::{Path, PathBuf};

use bbdir_cli::pipeline::{
    ImportOptions, Standards, SyncOptions, normalize_values, run_clean, run_import, run_sync,
};
use bbdir_model::EntityKind;
use bbdir_normalize::CodeKind;
use bbdir_reconcile::ReferenceKind;
use insta::assert_snapshot;
use serde_json::{Value as JsonValue, json};
use tempfile::TempDir;

const RD_NETWORK: &str = "bbmri-eric:networkID:EU_BBMRI-ERIC:networks:RD-Biobanks";
const BIOBANK_ID: &str = "bbmri-eric:ID:RD_44001";
const COLLECTION_ID: &str = "bbmri-eric:ID:RD_44001:collection:MainCollection";

struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new() -> Self {
        let ws = Self {
            dir: tempfile::tempdir().expect("tempdir"),
        };
        fs::create_dir_all(ws.path("standards")).expect("standards dir");
        ws
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn write_json(&self, name: &str, value: &JsonValue) -> PathBuf {
        let path = self.path(name);
        fs::write(&path, serde_json::to_string_pretty(value).expect("encode")).expect("write");
        path
    }

    fn standards(&self) -> Standards {
        Standards::load(None, Some(&self.path("standards"))).expect("standards")
    }

    fn import_options(&self, country: &str) -> ImportOptions {
        ImportOptions {
            finder: self.write_json("finder.json", &finder_export(country)),
            workbook: self.write_json("directory.json", &workbook()),
            output: Some(self.path("out/directory.json")),
            delta: Some(self.path("out/delta.json")),
            catalogue: None,
            report_dir: None,
            dry_run: false,
        }
    }
}

fn finder_export(country: &str) -> JsonValue {
    json!({
        "allData": [
            {
                "OrganizationID": 44001,
                "type": "biobank",
                "name": "Neuromuscular Bank",
                "url": ["https://example.org/nmbank"],
                "address": {"country": country, "name of host institution": "Fondazione Example"},
                "main contact": {"first name": "Ada", "last name": "Rossi", "email": "ada@example.org"},
                "bb_core": {
                    "acronym": "NMB",
                    "Description": "Muscle biopsies",
                    "Biomaterial_Available": "[\"DNA\", \"Feathers\"]",
                    "Additional_Biomaterial_available": "Serum"
                },
                "diseases": [
                    {"orphacode": "ORPHA98896,  ORPHA 70", "icd10": "", "omim": "", "gene": "DMD", "number": "12"}
                ]
            },
            {"OrganizationID": 9, "type": "registry", "name": "Not a biobank"}
        ]
    })
}

fn workbook() -> JsonValue {
    json!({
        "eu_bbmri_eric_countries": [{"id": "IT", "name": "Italy"}],
        "eu_bbmri_eric_networks": [{"id": RD_NETWORK, "name": "RD-Biobanks"}],
        "eu_bbmri_eric_disease_types": []
    })
}

fn sheet<'a>(workbook: &'a JsonValue, kind: EntityKind) -> &'a [JsonValue] {
    workbook[kind.sheet_name()]
        .as_array()
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

fn row<'a>(workbook: &'a JsonValue, kind: EntityKind, id: &str) -> Option<&'a JsonValue> {
    sheet(workbook, kind).iter().find(|row| row["id"] == id)
}

fn read_json(path: &Path) -> JsonValue {
    serde_json::from_str(&fs::read_to_string(path).expect("read")).expect("decode")
}

#[test]
fn import_writes_workbook_delta_and_reports() {
    let ws = Workspace::new();
    fs::write(
        ws.path("standards/missing_diseases.csv"),
        "id;label\nORPHA:98896;Duchenne muscular dystrophy\n",
    )
    .expect("supplemental");
    let mut options = ws.import_options("Italy");
    options.catalogue = Some(ws.write_json(
        "catalogue.json",
        &json!([
            {"BiobankID": 44001, "Disease": [{"ID": "urn:miriam:orphanet:558"}, {"ID": "ncit:C3262"}]},
            {"BiobankID": 1, "Disease": [{"ID": "urn:miriam:orphanet:1"}]}
        ]),
    ));

    let result = run_import(&ws.standards(), &options).expect("import");

    assert_eq!(result.summary.records, 1);
    for kind in [
        EntityKind::Person,
        EntityKind::AlsoKnownIn,
        EntityKind::Biobank,
        EntityKind::Collection,
    ] {
        assert_eq!(result.summary.created(kind), 1, "{kind:?}");
    }

    let output = read_json(&ws.path("out/directory.json"));
    let collection = row(&output, EntityKind::Collection, COLLECTION_ID).expect("collection");
    assert_eq!(
        collection["diagnosis_available"],
        "ORPHA:558,ORPHA:70,ORPHA:98896"
    );
    assert_eq!(collection["materials"], "DNA,SERUM");
    assert!(row(&output, EntityKind::Biobank, BIOBANK_ID).is_some());
    assert!(row(&output, EntityKind::DiseaseType, "ORPHA:98896").is_some());
    assert!(row(&output, EntityKind::Country, "IT").is_some());

    let delta = read_json(&ws.path("out/delta.json"));
    assert!(row(&delta, EntityKind::Biobank, BIOBANK_ID).is_some());
    assert!(sheet(&delta, EntityKind::Country).is_empty());

    assert_eq!(
        result.missing_reports,
        vec![(ReferenceKind::Disease, ws.path("out/missing_diseases.report.csv"))]
    );
    let report = fs::read_to_string(ws.path("out/missing_diseases.report.csv")).expect("report");
    assert_snapshot!(report.trim_end(), @r"
    id
    ORPHA:558
    ORPHA:70
    ");
}

#[test]
fn reports_in_the_standards_directory_keep_curated_tables() {
    let ws = Workspace::new();
    let curated = "id;label\nORPHA:98896;Duchenne muscular dystrophy\n";
    fs::write(ws.path("standards/missing_diseases.csv"), curated).expect("supplemental");
    let options = ImportOptions {
        output: Some(ws.path("standards/directory.json")),
        delta: None,
        ..ws.import_options("Italy")
    };

    let result = run_import(&ws.standards(), &options).expect("import");

    assert_eq!(
        fs::read_to_string(ws.path("standards/missing_diseases.csv")).expect("curated"),
        curated
    );
    assert_eq!(
        result.missing_reports,
        vec![(
            ReferenceKind::Disease,
            ws.path("standards/missing_diseases.report.csv")
        )]
    );
    let report =
        fs::read_to_string(ws.path("standards/missing_diseases.report.csv")).expect("report");
    assert_eq!(report.trim_end(), "id\nORPHA:70");
}

#[test]
fn reimporting_the_same_export_changes_nothing() {
    let ws = Workspace::new();
    let standards = ws.standards();
    let first = ws.import_options("Italy");
    run_import(&standards, &first).expect("first import");

    let second = ImportOptions {
        workbook: ws.path("out/directory.json"),
        output: Some(ws.path("out/second.json")),
        delta: Some(ws.path("out/second-delta.json")),
        ..first
    };
    let result = run_import(&standards, &second).expect("second import");

    assert!(result.summary.entities.values().all(|c| c.created == 0 && c.updated == 0));
    assert_eq!(
        read_json(&ws.path("out/directory.json")),
        read_json(&ws.path("out/second.json"))
    );
    let delta = read_json(&ws.path("out/second-delta.json"));
    assert!(delta.as_object().is_some_and(|sheets| sheets.is_empty()));
}

#[test]
fn dry_run_writes_nothing() {
    let ws = Workspace::new();
    let options = ImportOptions {
        dry_run: true,
        ..ws.import_options("Italy")
    };

    let result = run_import(&ws.standards(), &options).expect("import");

    assert_eq!(result.output, None);
    assert!(result.missing_reports.is_empty());
    assert!(!ws.path("out").exists());
    assert_eq!(read_json(&options.workbook), workbook());
}

#[test]
fn unknown_country_aborts_without_output() {
    let ws = Workspace::new();
    let options = ws.import_options("Atlantis");

    let err = run_import(&ws.standards(), &options).expect_err("unknown country");

    let message = format!("{err:#}");
    assert!(message.contains("merge finder records"), "{message}");
    assert!(message.contains("Atlantis"), "{message}");
    assert!(!ws.path("out/directory.json").exists());
}

#[test]
fn missing_finder_file_names_the_path() {
    let ws = Workspace::new();
    let options = ImportOptions {
        finder: ws.path("absent.json"),
        ..ws.import_options("Italy")
    };

    let err = run_import(&ws.standards(), &options).expect_err("missing finder");
    assert!(format!("{err:#}").contains("absent.json"));
}

#[test]
fn sync_reloads_destination_into_output() {
    let ws = Workspace::new();
    let metadata = json!({
        "eu_bbmri_eric_persons": {"attributes": [{"name": "id", "fieldType": "STRING"}]},
        "eu_bbmri_eric_also_known_in": {"attributes": [{"name": "id", "fieldType": "STRING"}]},
        "eu_bbmri_eric_networks": {"attributes": [{"name": "id", "fieldType": "STRING"}]},
        "eu_bbmri_eric_biobanks": {"attributes": [
            {"name": "id", "fieldType": "STRING"},
            {"name": "contact", "fieldType": "XREF", "refEntity": {"idAttribute": "id"}}
        ]},
        "eu_bbmri_eric_collections": {"attributes": [{"name": "id", "fieldType": "STRING"}]}
    });
    let source = ws.write_json(
        "source.json",
        &json!({
            "metadata": metadata,
            "data": {
                "eu_bbmri_eric_persons": [{"id": "p1"}],
                "eu_bbmri_eric_biobanks": [{"id": "bb1", "contact": {"id": "p1"}}]
            }
        }),
    );
    let destination = ws.write_json(
        "dest.json",
        &json!({
            "metadata": metadata,
            "data": {"eu_bbmri_eric_persons": [{"id": "stale"}]}
        }),
    );
    let options = SyncOptions {
        source,
        destination: destination.clone(),
        output: Some(ws.path("synced.json")),
    };

    let result = run_sync(&options).expect("sync");

    assert!(!result.has_failures());
    let persons = result.report.entity(EntityKind::Person).expect("persons");
    assert_eq!((persons.deleted, persons.added), (1, 1));
    let synced = read_json(&ws.path("synced.json"));
    assert_eq!(synced["data"]["eu_bbmri_eric_biobanks"][0]["contact"], "p1");
    assert_eq!(read_json(&destination)["data"]["eu_bbmri_eric_persons"][0]["id"], "stale");
}

#[test]
fn clean_rewrites_code_fields() {
    let ws = Workspace::new();
    let input = ws.write_json("finder.json", &finder_export("Italy"));
    let output = ws.path("clean/finder.json");

    let result = run_clean(&ws.standards(), &input, &output).expect("clean");

    assert_eq!(result.records, 1);
    let cleaned = read_json(&output);
    let record = &cleaned["allData"][0];
    assert_eq!(record["diseases"][0]["orphacode"], json!(["ORPHA:70", "ORPHA:98896"]));
    assert_eq!(record["bb_core"]["Biomaterial_Available"], json!(["DNA", "Feathers"]));
}

#[test]
fn normalize_reports_tokens_per_value() {
    let ws = Workspace::new();
    let values = vec!["G71,3".to_string(), "E71.310-11-12".to_string(), "sdf".to_string()];

    let normalized = normalize_values(&ws.standards(), CodeKind::Icd10, &values);

    let rendered: Vec<String> = normalized
        .iter()
        .map(|v| format!("{} -> [{}]", v.raw, v.tokens.join(", ")))
        .collect();
    assert_snapshot!(rendered.join("\n"), @r"
    G71,3 -> [urn:miriam:icd:G71.3]
    E71.310-11-12 -> [urn:miriam:icd10cm:E71.310, urn:miriam:icd10cm:E71.311, urn:miriam:icd10cm:E71.312]
    sdf -> []
    ");
}

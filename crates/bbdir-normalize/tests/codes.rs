use bbdir_normalize::{CodeKind, KindRules, Normalizer, NormalizerRules};
use proptest::prelude::*;

fn kind_rules(deny: &[&str], corrections: &[(&str, &[&str])]) -> KindRules {
    KindRules {
        deny: deny.iter().map(|v| (*v).to_string()).collect(),
        corrections: corrections
            .iter()
            .map(|(raw, tokens)| {
                (
                    (*raw).to_string(),
                    tokens.iter().map(|t| (*t).to_string()).collect(),
                )
            })
            .collect(),
    }
}

fn normalizer() -> Normalizer {
    Normalizer::new(NormalizerRules {
        orphacode: kind_rules(
            &["sdfsdfs", "ORPHA", "-", "*"],
            &[
                ("Beta thalassaemia", &["ORPHA:848"]),
                ("FGFR2", &["ORPHA:87"]),
            ],
        ),
        icd10: kind_rules(
            &["sdf"],
            &[
                ("G30-G32", &["urn:miriam:icd:G30-G32"]),
                (
                    "E71.310-11-12",
                    &[
                        "urn:miriam:icd10cm:E71.310",
                        "urn:miriam:icd10cm:E71.311",
                        "urn:miriam:icd10cm:E71.312",
                    ],
                ),
                (
                    "G12.0G12.1G12.1",
                    &["urn:miriam:icd:G12.0", "urn:miriam:icd:G12.1"],
                ),
            ],
        ),
        omim: KindRules::default(),
        gene: kind_rules(&["dfsdf"], &[]),
        material: KindRules::default(),
    })
}

#[test]
fn orphacode_list_with_double_spaces() {
    assert_eq!(
        normalizer().normalize(CodeKind::Orphacode, "ORPHA123,  ORPHA456"),
        vec!["ORPHA:123", "ORPHA:456"]
    );
}

#[test]
fn orphacode_variants() {
    let n = normalizer();
    assert_eq!(n.normalize(CodeKind::Orphacode, "ORPHA 558"), vec!["ORPHA:558"]);
    assert_eq!(n.normalize(CodeKind::Orphacode, "98896; 636"), vec!["ORPHA:636", "ORPHA:98896"]);
    assert_eq!(n.normalize(CodeKind::Orphacode, "UKORPHA:35"), vec!["ORPHA:35"]);
    assert_eq!(n.normalize(CodeKind::Orphacode, "Beta thalassaemia"), vec!["ORPHA:848"]);
    assert_eq!(n.normalize(CodeKind::Orphacode, "FGFR2, 99"), vec!["ORPHA:87", "ORPHA:99"]);
}

#[test]
fn orphacode_placeholders_are_empty() {
    let n = normalizer();
    for raw in ["sdfsdfs", "ORPHA", "-", "*", "", "   ", ",;,"] {
        assert!(n.normalize(CodeKind::Orphacode, raw).is_empty(), "{raw:?}");
    }
}

#[test]
fn icd10_comma_as_decimal_point() {
    assert_eq!(
        normalizer().normalize(CodeKind::Icd10, "G71,3"),
        vec!["urn:miriam:icd:G71.3"]
    );
}

#[test]
fn icd10_explicit_range_correction() {
    assert_eq!(
        normalizer().normalize(CodeKind::Icd10, "E71.310-11-12"),
        vec![
            "urn:miriam:icd10cm:E71.310",
            "urn:miriam:icd10cm:E71.311",
            "urn:miriam:icd10cm:E71.312",
        ]
    );
}

#[test]
fn icd10_repairs_and_namespaces() {
    let n = normalizer();
    assert_eq!(n.normalize(CodeKind::Icd10, "G.71.3"), vec!["urn:miriam:icd:G71.3"]);
    assert_eq!(n.normalize(CodeKind::Icd10, "Q.99.8*"), vec!["urn:miriam:icd:Q99.8"]);
    assert_eq!(
        n.normalize(CodeKind::Icd10, "G12.0 G12.1 G12.1"),
        vec!["urn:miriam:icd:G12.0", "urn:miriam:icd:G12.1"]
    );
    assert_eq!(
        n.normalize(CodeKind::Icd10, "E10; E75.240"),
        vec!["urn:miriam:icd10cm:E75.240", "urn:miriam:icd:E10"]
    );
    assert_eq!(n.normalize(CodeKind::Icd10, "G30-G32"), vec!["urn:miriam:icd:G30-G32"]);
    assert!(n.normalize(CodeKind::Icd10, "sdf").is_empty());
}

#[test]
fn omim_lines_and_lists() {
    assert_eq!(
        normalizer().normalize(CodeKind::Omim, "310200\n 300376, OMIM:253300"),
        vec!["OMIM:253300", "OMIM:300376", "OMIM:310200"]
    );
}

#[test]
fn genes_pass_through() {
    let n = normalizer();
    assert_eq!(n.normalize(CodeKind::Gene, " DMD , SMN1"), vec!["DMD", "SMN1"]);
    assert!(n.normalize(CodeKind::Gene, "dfsdf").is_empty());
}

#[test]
fn materials_are_split_and_trimmed_only() {
    assert_eq!(
        normalizer().normalize(CodeKind::Material, "Serum - Plasma; DNA,  "),
        vec!["DNA", "Plasma", "Serum"]
    );
}

proptest! {
    #[test]
    fn output_never_contains_empty_tokens(raw in ".{0,40}", kind in 0usize..5) {
        let kind = CodeKind::ALL[kind];
        let tokens = normalizer().normalize(kind, &raw);
        prop_assert!(tokens.iter().all(|t| !t.trim().is_empty()));
    }

    #[test]
    fn normalization_is_deterministic(raw in "[A-Z0-9.,; ]{0,30}", kind in 0usize..5) {
        let kind = CodeKind::ALL[kind];
        let n = normalizer();
        prop_assert_eq!(n.normalize(kind, &raw), n.normalize(kind, &raw));
    }
}

//! Canonical identifiers for free-text disease and gene codes.
//!
//! | kind | canonical form |
//! |---|---|
//! | Orphanet | `ORPHA:<code>` |
//! | ICD-10 (≤ 5 chars) | `urn:miriam:icd:<code>` |
//! | ICD-10-CM (> 5 chars) | `urn:miriam:icd10cm:<code>` |
//! | OMIM | `OMIM:<code>` |
//! | gene symbol | unchanged |
//! | biomaterial | trimmed text |
//!
//! ICD-10-CM codes are told apart from base ICD-10 codes only by their
//! length after cleanup.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::CodeKind;
use crate::rules::{KindRules, NormalizerRules};
use crate::tokenizer::{LIST_SEPARATORS, split_segments};

pub const ORPHA_PREFIX: &str = "ORPHA:";
pub const ICD_PREFIX: &str = "urn:miriam:icd:";
pub const ICD10CM_PREFIX: &str = "urn:miriam:icd10cm:";
pub const OMIM_PREFIX: &str = "OMIM:";

/// Longest code still treated as base ICD-10.
pub const ICD10_MAX_LEN: usize = 5;

const MATERIAL_SEPARATORS: &[&str] = &[",", ";", " - "];

/// Two stray letters glued in front of an Orphanet code (`UKORPHA123`).
static ORPHA_LEADING_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^[a-z]{2}\s*(orpha.*)$").expect("Invalid Orphanet prefix regex")
});

static ORPHA_CODE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^orpha(?:net)?[\s:_]*(.*)$").expect("Invalid Orphanet code regex")
});

/// Comma used as decimal point in an ICD code (`G71,3`).
static ICD_DECIMAL_COMMA: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b([A-Za-z]\d{2}),(\d)\b").expect("Invalid ICD decimal comma regex")
});

/// Stray point after the chapter letter (`G.71.3`).
static ICD_EXTRA_POINT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z])\.(\d{2}\.\d+)$").expect("Invalid ICD dotted code regex")
});

static OMIM_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^omim[\s:_]*(.*)$").expect("Invalid OMIM code regex"));

/// Normalizes raw code fields using injected deny-lists and corrections.
#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    rules: NormalizerRules,
}

impl Normalizer {
    pub fn new(rules: NormalizerRules) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &NormalizerRules {
        &self.rules
    }

    /// Turn a raw field into canonical tokens.
    ///
    /// The result is sorted and free of empty or repeated tokens.
    pub fn normalize(&self, kind: CodeKind, raw: &str) -> Vec<String> {
        let rules = self.rules.for_kind(kind);
        let cleaned = pre_clean(kind, raw);

        let mut tokens = BTreeSet::new();
        if let Some(patched) = apply_rules(rules, &cleaned) {
            tokens.extend(patched);
            return tokens.into_iter().collect();
        }

        let repaired = match kind {
            CodeKind::Icd10 => ICD_DECIMAL_COMMA
                .replace_all(&cleaned, "$1.$2")
                .into_owned(),
            _ => cleaned,
        };
        let separators = match kind {
            CodeKind::Material => MATERIAL_SEPARATORS,
            _ => LIST_SEPARATORS,
        };

        for segment in split_segments(&repaired, separators) {
            if let Some(patched) = apply_rules(rules, &segment) {
                tokens.extend(patched);
                continue;
            }
            if let Some(token) = canonical_token(kind, &segment) {
                tokens.insert(token);
            }
        }
        tokens.into_iter().collect()
    }
}

/// Deny-list and correction lookup. `Some` short-circuits generic parsing.
fn apply_rules(rules: &KindRules, value: &str) -> Option<Vec<String>> {
    let value = value.trim();
    if value.is_empty() || rules.is_denied(value) {
        return Some(Vec::new());
    }
    rules.correction(value).map(|tokens| {
        tokens
            .iter()
            .map(|token| token.trim().to_string())
            .filter(|token| !token.is_empty())
            .collect()
    })
}

fn pre_clean(kind: CodeKind, raw: &str) -> String {
    match kind {
        // Double spaces separate codes in some records.
        CodeKind::Orphacode => raw.trim().replace("  ", ",").replace("ORPHA ", "ORPHA"),
        CodeKind::Icd10 => raw.chars().filter(|ch| *ch != '*' && *ch != ' ').collect(),
        CodeKind::Omim => raw.replace(['\n', '\r'], ",").trim().to_string(),
        CodeKind::Gene | CodeKind::Material => raw.trim().to_string(),
    }
}

fn canonical_token(kind: CodeKind, segment: &str) -> Option<String> {
    let segment = segment.trim();
    if segment.is_empty() {
        return None;
    }
    match kind {
        CodeKind::Orphacode => orphacode_token(segment),
        CodeKind::Icd10 => icd10_token(segment),
        CodeKind::Omim => omim_token(segment),
        CodeKind::Gene | CodeKind::Material => Some(segment.to_string()),
    }
}

fn orphacode_token(segment: &str) -> Option<String> {
    let segment = ORPHA_LEADING_PREFIX.replace(segment, "$1");
    let code = match ORPHA_CODE.captures(&segment) {
        Some(caps) => caps.get(1).map_or("", |m| m.as_str()).trim().to_string(),
        None => segment.trim().to_string(),
    };
    if code.is_empty() {
        return None;
    }
    Some(format!("{ORPHA_PREFIX}{code}"))
}

fn icd10_token(segment: &str) -> Option<String> {
    let code = ICD_EXTRA_POINT.replace(segment, "$1$2");
    if code.is_empty() {
        return None;
    }
    if code.chars().count() > ICD10_MAX_LEN {
        Some(format!("{ICD10CM_PREFIX}{code}"))
    } else {
        Some(format!("{ICD_PREFIX}{code}"))
    }
}

fn omim_token(segment: &str) -> Option<String> {
    let code = match OMIM_CODE.captures(segment) {
        Some(caps) => caps.get(1).map_or("", |m| m.as_str()).trim().to_string(),
        None => segment.to_string(),
    };
    if code.is_empty() {
        return None;
    }
    Some(format!("{OMIM_PREFIX}{code}"))
}

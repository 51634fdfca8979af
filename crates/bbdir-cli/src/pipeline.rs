//! Command pipelines.
//!
//! Each `run_*` function performs one command end to end and returns what it
//! did; printing is left to the binary.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use bbdir_ingest::{
    JsonSampleCatalogue, NoCatalogue, SampleCatalogue, clean_records, load_finder, read_workbook,
    write_delta, write_finder, write_id_csv, write_workbook,
};
use bbdir_normalize::{CodeKind, Normalizer};
use bbdir_reconcile::{IdentityResolver, Importer, MergeEngine, ReferenceGapTracker, ReferenceKind};
use bbdir_standards::{
    MISSING_COUNTRIES_FILE, MISSING_COUNTRIES_REPORT, MISSING_DISEASES_FILE,
    MISSING_DISEASES_REPORT, MISSING_NETWORKS_FILE, MISSING_NETWORKS_REPORT, StandardsConfig,
    SupplementalTable, config_in, standards_root,
};
use bbdir_sync::{JsonEntityStore, sync};
use tracing::{debug, info, info_span, warn};

use crate::logging::redact_value;
use crate::types::{CleanResult, ImportResult, NormalizedValue, SyncResult};

/// Settings plus the directory their supplemental tables live in.
#[derive(Debug, Clone)]
pub struct Standards {
    pub config: StandardsConfig,
    pub root: PathBuf,
}

impl Standards {
    /// Resolve settings: an explicit file, then the standards directory's
    /// own file, then the built-in settings.
    pub fn load(config: Option<&Path>, standards_dir: Option<&Path>) -> Result<Self> {
        let root = standards_dir.map_or_else(standards_root, Path::to_path_buf);
        let path = config.map(Path::to_path_buf).or_else(|| config_in(&root));
        let config = StandardsConfig::resolve(path.as_deref()).with_context(|| match &path {
            Some(path) => format!("load settings {}", path.display()),
            None => "load built-in settings".to_string(),
        })?;
        Ok(Self { config, root })
    }

    pub fn normalizer(&self) -> Normalizer {
        Normalizer::new(self.config.normalizer.clone())
    }

    fn gap_tracker(&self) -> Result<ReferenceGapTracker> {
        let mut tracker = ReferenceGapTracker::new();
        for kind in ReferenceKind::ALL {
            let path = self.root.join(supplemental_file(kind));
            let table = SupplementalTable::load_optional(&path)
                .with_context(|| format!("load supplemental {kind} table"))?;
            if !table.is_empty() {
                info!(kind = %kind, rows = table.len(), path = %path.display(), "loaded supplemental table");
            }
            tracker = tracker.with_supplemental(kind, table);
        }
        Ok(tracker)
    }
}

/// Curated supplemental table read from the standards directory.
pub fn supplemental_file(kind: ReferenceKind) -> &'static str {
    match kind {
        ReferenceKind::Disease => MISSING_DISEASES_FILE,
        ReferenceKind::Country => MISSING_COUNTRIES_FILE,
        ReferenceKind::Network => MISSING_NETWORKS_FILE,
    }
}

/// Missing-reference report written after an import.
pub fn report_file(kind: ReferenceKind) -> &'static str {
    match kind {
        ReferenceKind::Disease => MISSING_DISEASES_REPORT,
        ReferenceKind::Country => MISSING_COUNTRIES_REPORT,
        ReferenceKind::Network => MISSING_NETWORKS_REPORT,
    }
}

#[derive(Debug, Clone, Default)]
pub struct ImportOptions {
    pub finder: PathBuf,
    pub workbook: PathBuf,
    /// Defaults to the input workbook.
    pub output: Option<PathBuf>,
    pub delta: Option<PathBuf>,
    pub catalogue: Option<PathBuf>,
    /// Defaults to the output's directory.
    pub report_dir: Option<PathBuf>,
    pub dry_run: bool,
}

pub fn run_import(standards: &Standards, options: &ImportOptions) -> Result<ImportResult> {
    let span = info_span!("import", finder = %options.finder.display());
    let _guard = span.enter();
    let config = &standards.config;

    let mut store = read_workbook(&options.workbook)
        .with_context(|| format!("read workbook {}", options.workbook.display()))?;
    let records = load_finder(&options.finder, &config.identity.record_type)
        .with_context(|| format!("read finder export {}", options.finder.display()))?;
    info!(records = records.len(), "loaded finder records");
    for record in &records {
        debug!(
            org_id = %record.organization_id,
            email = redact_value(&record.main_contact.email),
            "finder record"
        );
    }

    let catalogue: Box<dyn SampleCatalogue> = match &options.catalogue {
        Some(path) => Box::new(
            JsonSampleCatalogue::load(path)
                .with_context(|| format!("read sample catalogue {}", path.display()))?,
        ),
        None => Box::new(NoCatalogue),
    };
    let resolver = IdentityResolver::from_config(config);
    let normalizer = standards.normalizer();
    let materials = config.material_types();
    let engine = MergeEngine::new(
        &resolver,
        &normalizer,
        &materials,
        catalogue.as_ref(),
        &config.catalogue,
    );

    let mut importer = Importer::new(engine, standards.gap_tracker()?);
    let summary = importer
        .run(&mut store, &records)
        .context("merge finder records")?;
    let gaps = importer.into_gaps();
    if summary.catalogue_degraded > 0 {
        warn!(
            records = summary.catalogue_degraded,
            "sample catalogue lookups failed; local codes only"
        );
    }

    if options.dry_run {
        info!("dry run, nothing written");
        return Ok(ImportResult {
            summary,
            output: None,
            delta: None,
            missing_reports: Vec::new(),
        });
    }

    let output = options
        .output
        .clone()
        .unwrap_or_else(|| options.workbook.clone());
    write_workbook(&output, &store)
        .with_context(|| format!("write workbook {}", output.display()))?;
    if let Some(delta) = &options.delta {
        write_delta(delta, &store)
            .with_context(|| format!("write delta workbook {}", delta.display()))?;
    }

    let report_dir = options
        .report_dir
        .clone()
        .unwrap_or_else(|| parent_dir(&output));
    let mut missing_reports = Vec::new();
    for kind in ReferenceKind::ALL {
        let codes: Vec<&str> = gaps.missing(kind).collect();
        if codes.is_empty() {
            continue;
        }
        let path = report_dir.join(report_file(kind));
        write_id_csv(&path, &codes)
            .with_context(|| format!("write missing {kind} report {}", path.display()))?;
        info!(kind = %kind, codes = codes.len(), path = %path.display(), "wrote missing references");
        missing_reports.push((kind, path));
    }

    Ok(ImportResult {
        summary,
        output: Some(output),
        delta: options.delta.clone(),
        missing_reports,
    })
}

#[derive(Debug, Clone, Default)]
pub struct SyncOptions {
    pub source: PathBuf,
    pub destination: PathBuf,
    /// Defaults to saving the destination in place.
    pub output: Option<PathBuf>,
}

pub fn run_sync(options: &SyncOptions) -> Result<SyncResult> {
    let span = info_span!("sync", source = %options.source.display());
    let _guard = span.enter();

    let source = JsonEntityStore::open(&options.source)
        .with_context(|| format!("open source store {}", options.source.display()))?;
    let mut dest = JsonEntityStore::open(&options.destination)
        .with_context(|| format!("open destination store {}", options.destination.display()))?;

    let report = sync(&source, &mut dest).context("sync directories")?;

    let destination = options
        .output
        .clone()
        .unwrap_or_else(|| options.destination.clone());
    dest.save_as(&destination)
        .with_context(|| format!("save destination store {}", destination.display()))?;
    Ok(SyncResult {
        report,
        destination,
    })
}

pub fn run_clean(standards: &Standards, input: &Path, output: &Path) -> Result<CleanResult> {
    let records = load_finder(input, &standards.config.identity.record_type)
        .with_context(|| format!("read finder export {}", input.display()))?;
    let cleaned = clean_records(&records, &standards.normalizer()).context("clean finder records")?;
    write_finder(output, &cleaned)
        .with_context(|| format!("write cleaned export {}", output.display()))?;
    info!(records = cleaned.len(), output = %output.display(), "wrote cleaned export");
    Ok(CleanResult {
        records: cleaned.len(),
        output: output.to_path_buf(),
    })
}

pub fn normalize_values(standards: &Standards, kind: CodeKind, values: &[String]) -> Vec<NormalizedValue> {
    let normalizer = standards.normalizer();
    values
        .iter()
        .map(|raw| NormalizedValue {
            raw: raw.clone(),
            tokens: normalizer.normalize(kind, raw),
        })
        .collect()
}

fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

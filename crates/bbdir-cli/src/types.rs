use std::path::PathBuf;

use bbdir_reconcile::{ImportSummary, ReferenceKind};
use bbdir_sync::SyncReport;

#[derive(Debug)]
pub struct ImportResult {
    pub summary: ImportSummary,
    /// Merged workbook; `None` on a dry run.
    pub output: Option<PathBuf>,
    pub delta: Option<PathBuf>,
    pub missing_reports: Vec<(ReferenceKind, PathBuf)>,
}

impl ImportResult {
    pub fn has_missing(&self) -> bool {
        !self.summary.gaps.missing.is_empty()
    }
}

#[derive(Debug)]
pub struct SyncResult {
    pub report: SyncReport,
    pub destination: PathBuf,
}

impl SyncResult {
    pub fn has_failures(&self) -> bool {
        self.report.failed_batches() > 0
    }
}

#[derive(Debug)]
pub struct CleanResult {
    pub records: usize,
    pub output: PathBuf,
}

#[derive(Debug)]
pub struct NormalizedValue {
    pub raw: String,
    pub tokens: Vec<String>,
}

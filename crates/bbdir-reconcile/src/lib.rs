#![deny(unsafe_code)]

pub mod error;
pub mod gaps;
pub mod importer;
pub mod merge;
pub mod resolver;

pub use error::{ReconcileError, Result};
pub use gaps::{GapOutcome, GapReport, ReferenceGapTracker, ReferenceKind};
pub use importer::{EntityCounts, ImportSummary, Importer};
pub use merge::{
    BIOBANK_ACCUMULATING, COLLECTION_ACCUMULATING, MergeEngine, RecordOutcome, ResolvedRecord,
    order_of_magnitude,
};
pub use resolver::IdentityResolver;

//! CLI argument definitions.

use std::path::PathBuf;

use bbdir_normalize::CodeKind;
use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "bbdir",
    version,
    about = "Reconcile RD-Connect Finder biobanks into a BBMRI-ERIC directory",
    long_about = "Reconcile RD-Connect Finder biobanks into a BBMRI-ERIC directory.\n\n\
                  Imports Finder exports into a directory workbook, reports vocabulary \
                  gaps for curation and replaces one directory's content with another's."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Allow contact names and emails in log output.
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,

    /// Reconciliation settings file (default: built-in RD-Connect settings).
    #[arg(long = "config", value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Directory holding settings and supplemental vocabulary tables.
    #[arg(long = "standards-dir", value_name = "DIR", global = true)]
    pub standards_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Merge Finder biobanks into a directory workbook.
    Import(ImportArgs),

    /// Replace a destination directory's content with a source's.
    Sync(SyncArgs),

    /// Rewrite a Finder export with normalized code lists.
    Clean(CleanArgs),

    /// Print the canonical tokens of raw code values.
    Normalize(NormalizeArgs),
}

#[derive(Args)]
pub struct ImportArgs {
    /// Finder export (`{"allData": [...]}`).
    #[arg(value_name = "FINDER_JSON")]
    pub finder: PathBuf,

    /// Directory workbook to merge into.
    #[arg(value_name = "WORKBOOK_JSON")]
    pub workbook: PathBuf,

    /// Merged workbook output (default: overwrite the input workbook).
    #[arg(short = 'o', long = "output", value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Also write a workbook holding only created and updated rows.
    #[arg(long = "delta", value_name = "PATH")]
    pub delta: Option<PathBuf>,

    /// Sample catalogue dump consulted for additional diseases.
    #[arg(long = "catalogue", value_name = "PATH")]
    pub catalogue: Option<PathBuf>,

    /// Directory for missing-reference CSVs (default: next to the output).
    #[arg(long = "report-dir", value_name = "DIR")]
    pub report_dir: Option<PathBuf>,

    /// Merge and report without writing any file.
    #[arg(long = "dry-run")]
    pub dry_run: bool,
}

#[derive(Args)]
pub struct SyncArgs {
    /// Source directory store.
    #[arg(value_name = "SOURCE_JSON")]
    pub source: PathBuf,

    /// Destination directory store; emptied and reloaded.
    #[arg(value_name = "DEST_JSON")]
    pub destination: PathBuf,

    /// Save the reloaded destination here instead of in place.
    #[arg(short = 'o', long = "output", value_name = "PATH")]
    pub output: Option<PathBuf>,
}

#[derive(Args)]
pub struct CleanArgs {
    /// Raw Finder export.
    #[arg(value_name = "FINDER_JSON")]
    pub input: PathBuf,

    /// Cleaned export output.
    #[arg(short = 'o', long = "output", value_name = "PATH")]
    pub output: PathBuf,
}

#[derive(Args)]
pub struct NormalizeArgs {
    /// Code kind.
    #[arg(value_name = "KIND")]
    pub kind: CodeKind,

    /// Raw values, one field each.
    #[arg(value_name = "VALUE", required = true)]
    pub values: Vec<String>,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

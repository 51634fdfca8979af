use anyhow::Result;
use bbdir_cli::pipeline::{
    ImportOptions, Standards, SyncOptions, normalize_values, run_clean, run_import, run_sync,
};
use bbdir_cli::types::{CleanResult, ImportResult, NormalizedValue, SyncResult};

use crate::cli::{CleanArgs, Cli, ImportArgs, NormalizeArgs, SyncArgs};

fn standards(cli: &Cli) -> Result<Standards> {
    Standards::load(cli.config.as_deref(), cli.standards_dir.as_deref())
}

pub fn import(cli: &Cli, args: &ImportArgs) -> Result<ImportResult> {
    let standards = standards(cli)?;
    let options = ImportOptions {
        finder: args.finder.clone(),
        workbook: args.workbook.clone(),
        output: args.output.clone(),
        delta: args.delta.clone(),
        catalogue: args.catalogue.clone(),
        report_dir: args.report_dir.clone(),
        dry_run: args.dry_run,
    };
    run_import(&standards, &options)
}

pub fn sync(args: &SyncArgs) -> Result<SyncResult> {
    run_sync(&SyncOptions {
        source: args.source.clone(),
        destination: args.destination.clone(),
        output: args.output.clone(),
    })
}

pub fn clean(cli: &Cli, args: &CleanArgs) -> Result<CleanResult> {
    let standards = standards(cli)?;
    run_clean(&standards, &args.input, &args.output)
}

pub fn normalize(cli: &Cli, args: &NormalizeArgs) -> Result<Vec<NormalizedValue>> {
    let standards = standards(cli)?;
    Ok(normalize_values(&standards, args.kind, &args.values))
}

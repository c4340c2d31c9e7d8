use std::path::{Path, PathBuf};

use clap::Args;
use oasgo_core::{Generated, generate_operations};
use tracing::debug;

use super::{
    CliError, Status, UnitArgs, load_document, run_command, sync_text, sync_unit, unit_options,
};

/// Component types are referenced unqualified, so both units share a package.
pub const DEFAULT_PACKAGE: &str = super::types::DEFAULT_PACKAGE;

#[derive(Args, Debug, Clone)]
pub struct OperationsArgs {
    #[command(flatten)]
    pub unit: UnitArgs,
    #[arg(
        long,
        short = 'p',
        default_value = DEFAULT_PACKAGE,
        help = "Go package name of the operations unit"
    )]
    pub package: String,
    #[arg(
        long,
        value_name = "FILE",
        help = "Also write the operation manifest (name, method, path, params, returns) as JSON"
    )]
    pub manifest: Option<PathBuf>,
}

/// `oasgo operations`.
pub fn run(args: OperationsArgs) -> i32 {
    run_command(|| run_inner(&args))
}

fn run_inner(args: &OperationsArgs) -> Result<Status, CliError> {
    let unit = &args.unit;
    let doc = load_document(&unit.input)?;
    let options = unit_options(&args.package, unit.run.formatter.unwrap_or_default())?;
    debug!(input = %unit.input.display(), output = %unit.output.display(), "Generating operations unit.");

    let generated = generate_operations(&doc, &options)?;
    let status = sync_unit(&generated, &unit.output, unit.run.check)?;
    match &args.manifest {
        Some(path) => Ok(status.and(sync_manifest(&generated, path, unit.run.check)?)),
        None => Ok(status),
    }
}

pub(crate) fn sync_manifest(
    generated: &Generated,
    path: &Path,
    check: bool,
) -> Result<Status, CliError> {
    let mut json = serde_json::to_string_pretty(&generated.manifest())?;
    json.push('\n');
    sync_text(path, &json, check)
}

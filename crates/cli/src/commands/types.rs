use clap::Args;
use oasgo_core::generate_types;
use tracing::debug;

use super::{CliError, Status, UnitArgs, load_document, run_command, sync_unit, unit_options};

/// Package clause used when neither the flag nor the config names one.
pub const DEFAULT_PACKAGE: &str = "models";

#[derive(Args, Debug, Clone)]
pub struct TypesArgs {
    #[command(flatten)]
    pub unit: UnitArgs,
    #[arg(
        long,
        short = 'p',
        default_value = DEFAULT_PACKAGE,
        help = "Go package name of the types unit"
    )]
    pub package: String,
}

/// `oasgo types`.
pub fn run(args: TypesArgs) -> i32 {
    run_command(|| run_inner(&args))
}

fn run_inner(args: &TypesArgs) -> Result<Status, CliError> {
    let unit = &args.unit;
    let doc = load_document(&unit.input)?;
    let options = unit_options(&args.package, unit.run.formatter.unwrap_or_default())?;
    debug!(input = %unit.input.display(), output = %unit.output.display(), "Generating types unit.");

    let generated = generate_types(&doc, &options)?;
    sync_unit(&generated, &unit.output, unit.run.check)
}

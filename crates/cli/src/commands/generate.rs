use std::path::PathBuf;

use clap::Args;
use oasgo_core::{generate_operations, generate_types};
use tracing::{debug, info};

use super::operations::sync_manifest;
use super::{CliError, RunArgs, Status, load_document, run_command, sync_unit, unit_options};
use crate::config::{Config, DEFAULT_CONFIG_FILE};

#[derive(Args, Debug, Clone)]
pub struct GenerateArgs {
    #[arg(
        long,
        short = 'c',
        value_name = "FILE",
        default_value = DEFAULT_CONFIG_FILE,
        help = "Config file listing the input document and the units to generate"
    )]
    pub config: PathBuf,
    #[command(flatten)]
    pub run: RunArgs,
}

/// `oasgo generate`.
pub fn run(args: GenerateArgs) -> i32 {
    run_command(|| run_inner(&args))
}

fn run_inner(args: &GenerateArgs) -> Result<Status, CliError> {
    let config = Config::load(&args.config)?;
    let formatter = args.run.formatter.unwrap_or(config.formatter);
    let check = args.run.check;
    let doc = load_document(&config.input)?;
    debug!(config = %args.config.display(), formatter = %formatter, "Running configured units.");

    let mut status = Status::Clean;
    if let Some(types) = &config.types {
        let package = types
            .package
            .as_deref()
            .unwrap_or(super::types::DEFAULT_PACKAGE);
        let generated = generate_types(&doc, &unit_options(package, formatter)?)?;
        status = status.and(sync_unit(&generated, &types.output, check)?);
    }
    if let Some(operations) = &config.operations {
        let package = operations
            .package
            .as_deref()
            .or_else(|| config.types.as_ref().and_then(|t| t.package.as_deref()))
            .unwrap_or(super::operations::DEFAULT_PACKAGE);
        let generated = generate_operations(&doc, &unit_options(package, formatter)?)?;
        status = status.and(sync_unit(&generated, &operations.output, check)?);
        if let Some(manifest) = &operations.manifest {
            status = status.and(sync_manifest(&generated, manifest, check)?);
        }
    }

    info!(config = %args.config.display(), drift = status == Status::Drift, "Generation finished.");
    Ok(status)
}

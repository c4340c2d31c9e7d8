//! Command-line front end of the oasgo compiler.

use clap::{CommandFactory, Parser, Subcommand};

mod commands;
mod config;
mod logging;

pub use commands::{CliError, DRIFT_EXIT_CODE, Status};
pub use config::{Config, ConfigError};
pub use logging::init_tracing;

#[derive(Parser, Debug)]
#[command(
    name = "oasgo",
    version,
    about = "Compile an OpenAPI document into Go types and client methods"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate the types unit: one declaration per component schema
    Types(commands::types::TypesArgs),
    /// Generate the operations unit: one client method per path operation
    Operations(commands::operations::OperationsArgs),
    /// Generate every unit listed in an oasgo.toml config
    Generate(commands::generate::GenerateArgs),
}

/// Parse `args` (program name first) and run the selected command.
pub fn run_cli(args: Vec<String>) -> i32 {
    match Cli::try_parse_from(args) {
        Ok(cli) => match cli.command {
            Some(Commands::Types(args)) => commands::types::run(args),
            Some(Commands::Operations(args)) => commands::operations::run(args),
            Some(Commands::Generate(args)) => commands::generate::run(args),
            None => {
                let mut cmd = Cli::command();
                let _ = cmd.print_help();
                println!();
                0
            }
        },
        Err(e) => {
            let code = e.exit_code();
            let _ = e.print();
            code
        }
    }
}

/// Process entry point: install logging, then run with the process arguments.
pub fn main_entry() -> i32 {
    init_tracing();
    run_cli(std::env::args().collect())
}

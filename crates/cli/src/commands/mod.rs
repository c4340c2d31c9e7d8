//! Subcommands and the plumbing they share.

pub mod generate;
pub mod operations;
pub mod types;

use std::fs;
use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};

use clap::Args;
use oasgo_core::{Document, FormatterKind, GenError, Generated, RunReport, UnitOptions, write_unit};
use similar::{ChangeTag, TextDiff};
use thiserror::Error;
use tracing::debug;

use crate::config::ConfigError;

/// Exit code of a `--check` run that found stale output.
pub const DRIFT_EXIT_CODE: i32 = 1;

/// Anything that stops a command before it finishes.
#[derive(Debug, Error)]
pub enum CliError {
    /// Loading the document or generating a unit failed.
    #[error(transparent)]
    Gen(#[from] GenError),

    /// The config file could not be used.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Package name is not a lower-case Go identifier.
    #[error("invalid Go package name '{0}'")]
    Package(String),

    /// Manifest could not be encoded as JSON.
    #[error("failed to serialize manifest: {0}")]
    Manifest(#[from] serde_json::Error),
}

impl CliError {
    /// Process exit code: 3 for I/O failures, 2 for everything else.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Gen(err) => err.exit_code(),
            Self::Config(ConfigError::Read { .. }) => 3,
            Self::Config(_) | Self::Package(_) | Self::Manifest(_) => 2,
        }
    }
}

/// How a completed command left the output files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Every output matches what was generated.
    Clean,
    /// `--check` found a file that differs from what would be generated.
    Drift,
}

impl Status {
    fn and(self, other: Self) -> Self {
        if self == Self::Drift || other == Self::Drift {
            Self::Drift
        } else {
            Self::Clean
        }
    }
}

/// Flags shared by every command.
#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    #[arg(
        long,
        help = "Do not write; print a diff and exit 1 when an output would change"
    )]
    /// Compare instead of writing.
    pub check: bool,
    #[arg(
        long,
        value_name = "KIND",
        help = "Formatter for generated units: auto, gofmt or builtin [default: auto]"
    )]
    /// Formatter override; the config or `auto` applies when absent.
    pub formatter: Option<FormatterKind>,
}

/// Input and output of a single-unit command.
#[derive(Args, Debug, Clone)]
pub struct UnitArgs {
    #[arg(
        long,
        short = 'i',
        value_name = "SPEC",
        help = "OpenAPI document (.json, .yaml or .yml)"
    )]
    /// OpenAPI document to read.
    pub input: PathBuf,
    #[arg(long, short = 'o', value_name = "FILE", help = "Go file to generate")]
    /// Destination of the generated unit.
    pub output: PathBuf,
    /// Shared flags.
    #[command(flatten)]
    pub run: RunArgs,
}

/// Run a command body, print its error and map the result to an exit code.
pub fn run_command<F>(f: F) -> i32
where
    F: FnOnce() -> Result<Status, CliError>,
{
    match f() {
        Ok(Status::Clean) => 0,
        Ok(Status::Drift) => DRIFT_EXIT_CODE,
        Err(err) => {
            eprintln!("Error: {err}");
            err.exit_code()
        }
    }
}

pub(crate) fn load_document(path: &Path) -> Result<Document, CliError> {
    let doc = Document::from_path(path)?;
    debug!(
        path = %path.display(),
        paths = doc.paths.len(),
        schemas = doc.schemas().count(),
        "Loaded API document."
    );
    Ok(doc)
}

pub(crate) fn unit_options(
    package: &str,
    formatter: FormatterKind,
) -> Result<UnitOptions, CliError> {
    if !is_package_name(package) {
        return Err(CliError::Package(package.to_string()));
    }
    Ok(UnitOptions {
        package: package.to_string(),
        formatter,
    })
}

/// Lower-case Go identifier, the conventional shape of a package clause.
fn is_package_name(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_lowercase() || c == '_')
        && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

/// Write a generated unit, or compare it with the file on disk under `--check`.
pub(crate) fn sync_unit(
    generated: &Generated,
    output: &Path,
    check: bool,
) -> Result<Status, CliError> {
    report_skipped(&generated.report);
    if check {
        return check_file(output, &generated.source);
    }
    if write_unit(generated, output)? {
        println!("Wrote {} unit to {}", generated.kind, output.display());
    } else {
        println!("{} is up to date", output.display());
    }
    Ok(Status::Clean)
}

/// Same as [`sync_unit`] for auxiliary text outputs such as the manifest.
pub(crate) fn sync_text(path: &Path, content: &str, check: bool) -> Result<Status, CliError> {
    if check {
        return check_file(path, content);
    }
    let io_err = |source: io::Error| GenError::Io {
        path: path.to_path_buf(),
        source,
    };
    if fs::read_to_string(path).is_ok_and(|existing| existing == content) {
        println!("{} is up to date", path.display());
        return Ok(Status::Clean);
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_err)?;
    }
    fs::write(path, content).map_err(io_err)?;
    println!("Wrote {}", path.display());
    Ok(Status::Clean)
}

fn check_file(path: &Path, content: &str) -> Result<Status, CliError> {
    let existing = match fs::read_to_string(path) {
        Ok(existing) => existing,
        Err(err) if err.kind() == io::ErrorKind::NotFound => String::new(),
        Err(source) => {
            return Err(GenError::Io {
                path: path.to_path_buf(),
                source,
            }
            .into());
        }
    };
    if existing == content {
        println!("{} is up to date", path.display());
        return Ok(Status::Clean);
    }
    let label = path.display().to_string();
    print!(
        "{}",
        render_diff(&label, &existing, content, io::stdout().is_terminal())
    );
    Ok(Status::Drift)
}

/// Unified diff of `current` against `new`, three lines of context per hunk.
pub(crate) fn render_diff(label: &str, current: &str, new: &str, color: bool) -> String {
    let paint = |code: &'static str| if color { code } else { "" };
    let (bold, red, green, reset) = (
        paint("\x1b[1m"),
        paint("\x1b[31m"),
        paint("\x1b[32m"),
        paint("\x1b[0m"),
    );

    let diff = TextDiff::from_lines(current, new);
    let mut output = String::new();
    output.push_str(&format!("{bold}--- {label} (current){reset}\n"));
    output.push_str(&format!("{bold}+++ {label} (new){reset}\n"));

    for (idx, group) in diff.grouped_ops(3).iter().enumerate() {
        if idx > 0 {
            output.push_str("...\n");
        }
        for op in group {
            for change in diff.iter_changes(op) {
                let (sign, color) = match change.tag() {
                    ChangeTag::Delete => ("-", red),
                    ChangeTag::Insert => ("+", green),
                    ChangeTag::Equal => (" ", ""),
                };
                output.push_str(color);
                output.push_str(sign);
                output.push_str(change.value());
                if change.missing_newline() {
                    output.push('\n');
                }
                if !color.is_empty() {
                    output.push_str(reset);
                }
            }
        }
    }
    output
}

fn report_skipped(report: &RunReport) {
    for skipped in &report.skipped {
        eprintln!(
            "Skipped {} ({} {}): {}",
            skipped.name, skipped.method, skipped.path, skipped.reason
        );
    }
}

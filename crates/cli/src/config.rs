//! `oasgo.toml`: one input document, one entry per generated unit.
//!
//! ```toml
//! input = "openapi.yaml"
//! formatter = "auto"
//!
//! [types]
//! output = "api/models.go"
//! package = "api"
//!
//! [operations]
//! output = "api/operations.go"
//! manifest = "api/operations.json"
//! ```
//!
//! Relative paths are resolved against the directory holding the file. The
//! operations unit takes the types package unless it names its own.

use std::fs;
use std::path::{Path, PathBuf};

use oasgo_core::FormatterKind;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

/// Config looked up by `oasgo generate` when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "oasgo.toml";

/// Why a config file could not be loaded.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config {path}: {source}")]
    Read {
        /// Config file.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid TOML or does not match the expected tables.
    #[error("invalid config {path}: {source}")]
    Parse {
        /// Config file.
        path: PathBuf,
        /// Decoder error with its location.
        #[source]
        source: toml::de::Error,
    },

    /// Neither `[types]` nor `[operations]` is present.
    #[error("config {path} names no unit; add a [types] or [operations] table")]
    NoUnits {
        /// Config file.
        path: PathBuf,
    },
}

/// Parsed `oasgo.toml` with paths already resolved.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// OpenAPI document shared by every unit.
    pub input: PathBuf,
    /// Formatter used unless `--formatter` overrides it.
    #[serde(default)]
    pub formatter: FormatterKind,
    /// Types unit, if generated.
    pub types: Option<TypesConfig>,
    /// Operations unit, if generated.
    pub operations: Option<OperationsConfig>,
}

/// `[types]` table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TypesConfig {
    /// Go file to write.
    pub output: PathBuf,
    /// Package clause; `models` when absent.
    pub package: Option<String>,
}

/// `[operations]` table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OperationsConfig {
    /// Go file to write.
    pub output: PathBuf,
    /// Package clause; the types package when absent.
    pub package: Option<String>,
    /// Where to write the JSON operation manifest, if anywhere.
    pub manifest: Option<PathBuf>,
}

impl Config {
    /// Read and parse `path`, resolving relative paths against its directory.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::parse(&text, path)?;
        let base = path.parent().unwrap_or_else(|| Path::new(""));
        debug!(path = %path.display(), base = %base.display(), "Loaded config.");
        Ok(config.relative_to(base))
    }

    fn parse(text: &str, path: &Path) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        if config.types.is_none() && config.operations.is_none() {
            return Err(ConfigError::NoUnits {
                path: path.to_path_buf(),
            });
        }
        Ok(config)
    }

    fn relative_to(mut self, base: &Path) -> Self {
        self.input = base.join(&self.input);
        if let Some(types) = &mut self.types {
            types.output = base.join(&types.output);
        }
        if let Some(operations) = &mut self.operations {
            operations.output = base.join(&operations.output);
            operations.manifest = operations.manifest.take().map(|m| base.join(m));
        }
        self
    }
}

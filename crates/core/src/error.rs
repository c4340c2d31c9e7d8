//! Error and report types for a generation run.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

use crate::spec::HttpMethod;

/// A schema shape the generator was never designed to handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsupportedShape {
    /// Name (or name path) of the offending schema.
    pub name: String,
    /// What about the shape is unsupported.
    pub message: String,
}

impl fmt::Display for UnsupportedShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.message)
    }
}

/// Errors raised while generating a unit.
#[derive(Debug, Error)]
pub enum GenError {
    /// The input is neither valid JSON nor valid YAML for the document model.
    #[error("failed to parse API document: {message}")]
    Parse {
        /// Parser diagnostic.
        message: String,
    },

    /// Reading the input or writing a unit failed.
    #[error("cannot access {path}: {source}")]
    Io {
        /// File that could not be read or written.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Input that cannot be classified or named. Aborts the run.
    #[error("malformed schema '{name}': {message}")]
    Malformed {
        /// Schema or operation the problem was found in.
        name: String,
        /// What is wrong with it.
        message: String,
    },

    /// One unsupported shape, collected by the emitter.
    #[error("unsupported schema shape {0}")]
    Unsupported(UnsupportedShape),

    /// Every unsupported shape of a run, reported together.
    #[error("{} unsupported schema shape(s):\n{}", .0.len(), list_shapes(.0))]
    UnsupportedShapes(Vec<UnsupportedShape>),

    /// The formatter rejected the generated text.
    #[error("failed to format {unit} unit: {message}")]
    Format {
        /// Which unit was being formatted.
        unit: String,
        /// Formatter diagnostic.
        message: String,
        /// The unformatted text, kept for diagnostics only.
        buffer: String,
    },

    /// The requested formatter cannot run on this machine.
    #[error("formatter '{name}' is not available: {message}")]
    FormatterUnavailable {
        /// Formatter name as given on the command line.
        name: String,
        /// Why it is unavailable.
        message: String,
    },
}

impl GenError {
    /// A [`GenError::Malformed`] for `name`.
    pub fn malformed(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Malformed {
            name: name.into(),
            message: message.into(),
        }
    }

    /// A [`GenError::Unsupported`] for `name`.
    pub fn unsupported(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Unsupported(UnsupportedShape {
            name: name.into(),
            message: message.into(),
        })
    }

    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Io { .. } => 3,
            _ => 2,
        }
    }
}

fn list_shapes(shapes: &[UnsupportedShape]) -> String {
    shapes
        .iter()
        .map(|shape| format!("  - {shape}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// An operation left out of the operations unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedOperation {
    /// Go method name the operation would have had.
    pub name: String,
    /// HTTP verb.
    pub method: HttpMethod,
    /// Path template.
    pub path: String,
    /// Why it was left out.
    pub reason: String,
}

/// Soft conditions collected during a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    /// Operations without a JSON 200 response.
    pub skipped: Vec<SkippedOperation>,
}

impl RunReport {
    /// Whether the run finished without soft conditions.
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_shapes_lists_every_shape() {
        let err = GenError::UnsupportedShapes(vec![
            UnsupportedShape {
                name: "Pet".into(),
                message: "oneOf union".into(),
            },
            UnsupportedShape {
                name: "Labels".into(),
                message: "additionalProperties value has no type".into(),
            },
        ]);
        let text = err.to_string();
        assert!(text.starts_with("2 unsupported schema shape(s)"));
        assert!(text.contains("  - Pet: oneOf union"));
        assert!(text.contains("  - Labels: additionalProperties value has no type"));
    }

    #[test]
    fn test_exit_codes() {
        let io = GenError::Io {
            path: PathBuf::from("spec.json"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        };
        assert_eq!(io.exit_code(), 3);
        assert_eq!(GenError::malformed("X", "bad").exit_code(), 2);
    }
}

//! Source formatting of generated units.
//!
//! A unit is formatted before anything is written. `gofmt` is used when it
//! is installed; otherwise a builtin pass checks that delimiters, strings and
//! comments are balanced and normalizes whitespace.

use std::fmt;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::str::FromStr;

use serde::Deserialize;
use tracing::debug;

use crate::error::GenError;

/// Formats one unit of Go source.
pub trait Formatter {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Formatted text, or a message describing why the text is not valid.
    fn format(&self, source: &str) -> Result<String, String>;
}

/// Which formatter a run uses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatterKind {
    /// `gofmt` when found on `PATH`, else builtin.
    #[default]
    Auto,
    /// `gofmt`; fails the run when it is not installed.
    Gofmt,
    /// The builtin balance check and whitespace pass.
    Builtin,
}

impl FromStr for FormatterKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "gofmt" => Ok(Self::Gofmt),
            "builtin" => Ok(Self::Builtin),
            other => Err(format!(
                "unknown formatter '{other}' (expected auto, gofmt or builtin)"
            )),
        }
    }
}

impl fmt::Display for FormatterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Auto => "auto",
            Self::Gofmt => "gofmt",
            Self::Builtin => "builtin",
        })
    }
}

impl FormatterKind {
    /// Instantiate the formatter this kind names.
    pub fn resolve(self) -> Result<Box<dyn Formatter>, GenError> {
        match self {
            Self::Builtin => Ok(Box::new(Builtin)),
            Self::Gofmt => Ok(Box::new(Gofmt::locate()?)),
            Self::Auto => match Gofmt::locate() {
                Ok(gofmt) => Ok(Box::new(gofmt)),
                Err(err) => {
                    debug!("{err}; using the builtin formatter.");
                    Ok(Box::new(Builtin))
                }
            },
        }
    }
}

/// The `gofmt` binary.
#[derive(Debug, Clone)]
pub struct Gofmt {
    binary: PathBuf,
}

impl Gofmt {
    /// Find `gofmt` on `PATH`.
    pub fn locate() -> Result<Self, GenError> {
        which::which("gofmt")
            .map(|binary| Self { binary })
            .map_err(|err| GenError::FormatterUnavailable {
                name: "gofmt".to_string(),
                message: err.to_string(),
            })
    }
}

impl Formatter for Gofmt {
    fn name(&self) -> &'static str {
        "gofmt"
    }

    fn format(&self, source: &str) -> Result<String, String> {
        let mut child = Command::new(&self.binary)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|err| format!("failed to run {}: {err}", self.binary.display()))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(source.as_bytes())
                .map_err(|err| format!("failed to write to gofmt: {err}"))?;
        }
        let output = child
            .wait_with_output()
            .map_err(|err| format!("failed to wait for gofmt: {err}"))?;

        if !output.status.success() {
            return Err(String::from_utf8_lossy(&output.stderr).trim().to_string());
        }
        String::from_utf8(output.stdout).map_err(|err| format!("gofmt output is not UTF-8: {err}"))
    }
}

/// Balance check plus whitespace normalization.
#[derive(Debug, Clone, Copy, Default)]
pub struct Builtin;

impl Formatter for Builtin {
    fn name(&self) -> &'static str {
        "builtin"
    }

    fn format(&self, source: &str) -> Result<String, String> {
        check_balance(source)?;
        Ok(normalize_whitespace(source))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lexical {
    Code,
    LineComment,
    BlockComment,
    Interpreted,
    Raw,
    Rune,
}

fn check_balance(source: &str) -> Result<(), String> {
    let mut stack: Vec<(char, usize)> = Vec::new();
    let mut state = Lexical::Code;
    let mut line = 1;
    let mut chars = source.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '\n' {
            line += 1;
        }
        state = match (state, c) {
            (Lexical::Code, '/') if chars.peek() == Some(&'/') => {
                chars.next();
                Lexical::LineComment
            }
            (Lexical::Code, '/') if chars.peek() == Some(&'*') => {
                chars.next();
                Lexical::BlockComment
            }
            (Lexical::Code, '"') => Lexical::Interpreted,
            (Lexical::Code, '`') => Lexical::Raw,
            (Lexical::Code, '\'') => Lexical::Rune,
            (Lexical::Code, '(' | '[' | '{') => {
                stack.push((c, line));
                Lexical::Code
            }
            (Lexical::Code, ')' | ']' | '}') => {
                let expected = match c {
                    ')' => '(',
                    ']' => '[',
                    _ => '{',
                };
                match stack.pop() {
                    Some((open, _)) if open == expected => Lexical::Code,
                    Some((open, opened)) => {
                        return Err(format!(
                            "'{c}' on line {line} closes '{open}' from line {opened}"
                        ));
                    }
                    None => return Err(format!("unmatched '{c}' on line {line}")),
                }
            }
            (Lexical::LineComment, '\n') => Lexical::Code,
            (Lexical::BlockComment, '*') if chars.peek() == Some(&'/') => {
                chars.next();
                Lexical::Code
            }
            (Lexical::Interpreted | Lexical::Rune, '\\') => {
                chars.next();
                state
            }
            (Lexical::Interpreted | Lexical::Rune, '\n') => {
                return Err(format!("unterminated literal on line {}", line - 1));
            }
            (Lexical::Interpreted, '"') | (Lexical::Raw, '`') | (Lexical::Rune, '\'') => {
                Lexical::Code
            }
            (state, _) => state,
        };
    }

    match (state, stack.last()) {
        (Lexical::Code | Lexical::LineComment, None) => Ok(()),
        (Lexical::Code | Lexical::LineComment, Some((open, opened))) => {
            Err(format!("'{open}' from line {opened} is never closed"))
        }
        (state, _) => Err(format!("input ends inside {state:?}")),
    }
}

/// Trim trailing whitespace, collapse blank-line runs, end with one newline.
fn normalize_whitespace(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut blank_run = 0;
    for line in source.lines() {
        let line = line.trim_end();
        if line.is_empty() {
            blank_run += 1;
            if blank_run > 1 || out.is_empty() {
                continue;
            }
        } else {
            blank_run = 0;
        }
        out.push_str(line);
        out.push('\n');
    }
    while out.ends_with("\n\n") {
        out.pop();
    }
    out
}

//! External programs: Inkscape, pdflatex and pandoc.
//!
//! The [`ToolRunner`] trait is the seam between the build and the host: it
//! locates programs on `PATH` and runs an [`Invocation`] to completion,
//! returning its captured output. The production implementation is
//! [`SystemRunner`]; tests substitute a recording mock.
//!
//! The argument lists themselves are built by pure functions in
//! [`commands`], so they can be checked without running anything.
//!
//! Invocations have no timeout. A tool that hangs stalls the build, which is
//! acceptable for a supervised local build.

pub mod commands;
mod system;

pub use system::{SystemRunner, find_executable};

use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ToolError {
    #[error("Could not start '{program}': {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },
    #[error("Could not find executable '{0}'")]
    NotFound(String),
}

/// A program and its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    /// Working directory; inherited from the build process when `None`.
    pub cwd: Option<PathBuf>,
}

impl Invocation {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn path_arg(self, path: &Path) -> Self {
        self.arg(path.to_string_lossy())
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Result of a completed invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolOutput {
    /// `None` when the process was killed by a signal.
    pub exit_code: Option<i32>,
    /// Captured stdout followed by stderr.
    pub combined: String,
}

impl ToolOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// Diagnostic for a failed run: exit status plus whatever the tool said.
    pub fn diagnostic(&self) -> String {
        let status = match self.exit_code {
            Some(code) => format!("exit status {code}"),
            None => "terminated by signal".to_string(),
        };
        let text = self.combined.trim();
        if text.is_empty() {
            status
        } else {
            format!("{status}\n{text}")
        }
    }
}

/// Runs external programs.
pub trait ToolRunner {
    /// Resolve `program` to an executable, searching `PATH` for bare names.
    fn locate(&self, program: &str) -> Option<PathBuf>;

    /// Run to completion and capture the combined output.
    ///
    /// `Err` only when the process could not be started; a non-zero exit is
    /// reported through [`ToolOutput::exit_code`].
    fn run(&self, invocation: &Invocation) -> Result<ToolOutput, ToolError>;

    /// Fail with [`ToolError::NotFound`] unless `program` can be located.
    fn require(&self, program: &str) -> Result<PathBuf, ToolError> {
        let path = self
            .locate(program)
            .ok_or_else(|| ToolError::NotFound(program.to_string()))?;
        tracing::info!("Found '{}' -> '{}'", program, path.display());
        Ok(path)
    }
}

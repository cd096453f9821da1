//! Per-item outcomes and the aggregated build report.
//!
//! Per-item problems (one image fails to decode, one drawing fails to
//! rasterize, one chapter fails to convert) never stop a build. They are
//! recorded here, logged, and turned into a non-zero exit status at the end.

use std::fmt;
use std::path::Path;

/// A recoverable failure with the captured diagnostic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    /// What was being built (a path or a step name).
    pub item: String,
    /// Tool output or error message.
    pub diagnostic: String,
}

impl Failure {
    pub fn new(item: impl Into<String>, diagnostic: impl Into<String>) -> Self {
        Self {
            item: item.into(),
            diagnostic: diagnostic.into(),
        }
    }

    pub fn for_path(path: &Path, diagnostic: impl Into<String>) -> Self {
        Self::new(path.display().to_string(), diagnostic)
    }
}

/// What happened to a single item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Destination already newer than its source; nothing done.
    UpToDate,
    Built,
    Failed(Failure),
}

/// Counters and failures for a whole build.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildReport {
    pub built: u32,
    pub up_to_date: u32,
    /// Items skipped because their source was missing.
    pub skipped: u32,
    pub failures: Vec<Failure>,
}

impl BuildReport {
    pub fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::UpToDate => self.up_to_date += 1,
            Outcome::Built => self.built += 1,
            Outcome::Failed(failure) => {
                tracing::warn!("{}: {}", failure.item, failure.diagnostic);
                self.failures.push(failure);
            }
        }
    }

    pub fn skip(&mut self) {
        self.skipped += 1;
    }

    /// Fold another report into this one.
    pub fn absorb(&mut self, other: BuildReport) {
        self.built += other.built;
        self.up_to_date += other.up_to_date;
        self.skipped += other.skipped;
        self.failures.extend(other.failures);
    }

    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn total(&self) -> u32 {
        self.built + self.up_to_date + self.skipped + self.failures.len() as u32
    }
}

impl fmt::Display for BuildReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} built, {} up to date", self.built, self.up_to_date)?;
        if self.skipped > 0 {
            write!(f, ", {} skipped", self.skipped)?;
        }
        if !self.failures.is_empty() {
            write!(f, ", {} failed", self.failures.len())?;
        }
        write!(f, " ({} total)", self.total())
    }
}

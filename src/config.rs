//! Build configuration.
//!
//! Two layers make up the configuration a build runs with:
//!
//! - [`BuildMode`] and the force flag come from the command line.
//! - [`BookConfig`] comes from an optional `book.toml` in the project root.
//!
//! Both are bundled into a [`BuildSettings`] value that is created once at
//! startup and passed by reference to every component. Nothing reads global
//! state.
//!
//! ## Config File
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [tools]
//! rasterizer = "inkscape"   # SVG → PNG/PDF
//! typesetter = "pdflatex"   # book.tex → book.pdf
//! converter = "pandoc"      # chapter .tex → .md
//!
//! [resolution]
//! draft_dpi = 100           # rasterization DPI in debug mode
//! print_dpi = 300           # rasterization DPI in release and print modes
//! preview_width = 100       # bitmap width (px) in debug mode
//!
//! [markdown]
//! chapters = ["forewords", "introduction", "..."]
//! ```
//!
//! The file is sparse: user values are merged over the stock defaults, so a
//! `book.toml` only needs the keys it changes. Unknown keys are rejected to
//! catch typos early.

use crate::layout::ProjectLayout;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

/// Name of the optional config file in the project root.
pub const CONFIG_FILENAME: &str = "book.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
    #[error("Mode must be either 'debug', 'release', 'print', or 'markdown' (got '{0}')")]
    InvalidMode(String),
}

/// What kind of build to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BuildMode {
    /// Low resolution assets, single typesetting pass.
    Debug,
    /// Full resolution assets, draft pass + full pass.
    #[default]
    Release,
    /// Release assets plus the `\forprint` switch for the printer's PDF.
    Print,
    /// Chapter sources to Markdown; no PDF.
    Markdown,
}

impl BuildMode {
    pub fn as_str(self) -> &'static str {
        match self {
            BuildMode::Debug => "debug",
            BuildMode::Release => "release",
            BuildMode::Print => "print",
            BuildMode::Markdown => "markdown",
        }
    }

    /// Directory under `out/` holding this mode's assets.
    ///
    /// Print shares the release assets: the two only differ in the macro
    /// passed to the typesetter.
    pub fn asset_dir_name(self) -> &'static str {
        match self {
            BuildMode::Print => BuildMode::Release.as_str(),
            other => other.as_str(),
        }
    }

    /// Rasterization DPI for drawings and covers.
    pub fn dpi(self, resolution: &ResolutionConfig) -> u32 {
        match self {
            BuildMode::Debug => resolution.draft_dpi,
            _ => resolution.print_dpi,
        }
    }

    /// Whether bitmaps are downscaled (debug) or copied untouched.
    pub fn downscales_bitmaps(self) -> bool {
        self == BuildMode::Debug
    }

    /// Whether a `-draftmode` typesetting pass precedes the full pass.
    pub fn runs_draft_pass(self) -> bool {
        self != BuildMode::Debug
    }

    /// Extra macro definitions injected into the typesetting expression.
    pub fn typeset_options(self) -> &'static str {
        match self {
            BuildMode::Print => r"\def\forprint{}",
            _ => "",
        }
    }
}

impl FromStr for BuildMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "debug" => Ok(BuildMode::Debug),
            "release" => Ok(BuildMode::Release),
            "print" => Ok(BuildMode::Print),
            "markdown" => Ok(BuildMode::Markdown),
            other => Err(ConfigError::InvalidMode(other.to_string())),
        }
    }
}

impl fmt::Display for BuildMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Project configuration loaded from `book.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BookConfig {
    /// External programs.
    pub tools: ToolsConfig,
    /// Output resolution settings.
    pub resolution: ResolutionConfig,
    /// Markdown export settings.
    pub markdown: MarkdownConfig,
}

impl BookConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let tools = [
            ("tools.rasterizer", &self.tools.rasterizer),
            ("tools.typesetter", &self.tools.typesetter),
            ("tools.converter", &self.tools.converter),
        ];
        for (key, value) in tools {
            if value.trim().is_empty() {
                return Err(ConfigError::Validation(format!("{key} must not be empty")));
            }
        }
        if self.resolution.draft_dpi == 0 || self.resolution.print_dpi == 0 {
            return Err(ConfigError::Validation(
                "resolution DPI values must be non-zero".into(),
            ));
        }
        if self.resolution.preview_width == 0 {
            return Err(ConfigError::Validation(
                "resolution.preview_width must be non-zero".into(),
            ));
        }
        if self.markdown.chapters.iter().any(|c| c.trim().is_empty()) {
            return Err(ConfigError::Validation(
                "markdown.chapters must not contain empty names".into(),
            ));
        }
        Ok(())
    }
}

/// Names (or paths) of the external programs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToolsConfig {
    pub rasterizer: String,
    pub typesetter: String,
    pub converter: String,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            rasterizer: "inkscape".to_string(),
            typesetter: "pdflatex".to_string(),
            converter: "pandoc".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResolutionConfig {
    /// Rasterization DPI in debug mode.
    pub draft_dpi: u32,
    /// Rasterization DPI in release and print modes.
    pub print_dpi: u32,
    /// Width in pixels of debug-mode bitmaps. Height keeps the aspect ratio.
    pub preview_width: u32,
}

impl Default for ResolutionConfig {
    fn default() -> Self {
        Self {
            draft_dpi: 100,
            print_dpi: 300,
            preview_width: 100,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MarkdownConfig {
    /// Chapter basenames under `src/`, converted in this order.
    pub chapters: Vec<String>,
}

impl Default for MarkdownConfig {
    fn default() -> Self {
        let chapters = [
            "forewords",
            "aknowledgments",
            "bug_reports",
            "cheat_sheet",
            "introduction",
            "hardware",
            "programing",
            "gfx",
            "prog_z80",
            "prog_68000",
            "people",
            "epilogue",
            "appendix",
            "bib",
        ];
        Self {
            chapters: chapters.iter().map(|c| c.to_string()).collect(),
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(BookConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// Tables merge key-by-key; any other overlay value replaces the base value.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Read `book.toml` from `root` as a raw TOML value, `Ok(None)` if absent.
pub fn load_raw_config(root: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = root.join(CONFIG_FILENAME);
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Load config from `book.toml` in the given directory.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result.
pub fn load_config(root: &Path) -> Result<BookConfig, ConfigError> {
    let merged = match load_raw_config(root)? {
        Some(overlay) => merge_toml(stock_defaults_value(), overlay),
        None => stock_defaults_value(),
    };
    let config: BookConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Everything a build needs, resolved once at startup.
#[derive(Debug, Clone)]
pub struct BuildSettings {
    pub mode: BuildMode,
    /// Rebuild every artifact regardless of timestamps.
    pub force: bool,
    pub project: ProjectLayout,
    pub config: BookConfig,
}

impl BuildSettings {
    /// Resolve settings from the raw CLI mode string, the force flag and the
    /// project root. The mode is validated before anything is read from disk.
    pub fn resolve(mode: &str, force: bool, project_root: &Path) -> Result<Self, ConfigError> {
        let mode: BuildMode = mode.parse()?;
        let config = load_config(project_root)?;
        Ok(Self {
            mode,
            force,
            project: ProjectLayout::new(project_root),
            config,
        })
    }

    /// Rasterization DPI for the current mode.
    pub fn dpi(&self) -> u32 {
        self.mode.dpi(&self.config.resolution)
    }
}

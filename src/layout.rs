//! Fixed project layout.
//!
//! ```text
//! <project>/
//! ├── book.toml                   # optional
//! ├── src/
//! │   ├── book.tex                # typesetting entry point
//! │   ├── <chapter>.tex           # markdown mode inputs
//! │   └── cover/pdf/
//! │       ├── cover_front.svg
//! │       └── cover_back.svg
//! ├── illu/
//! │   ├── img/**                  # bitmaps (PNG, JPEG)
//! │   └── d/**                    # vector drawings (SVG)
//! └── out/
//!     ├── book.pdf                # typesetter output, renamed after the build
//!     ├── <project>_<mode>.pdf
//!     ├── debug/illu/...          # per-mode assets
//!     ├── release/illu/...
//!     └── markdown/<chapter>.md
//! ```
//!
//! Paths handed to the typesetter are relative to the project root because
//! pdflatex runs there and resolves `\input` and `\includegraphics` from it.

use crate::config::BuildMode;
use std::path::{Path, PathBuf};

pub const OUTPUT_DIR: &str = "out";
pub const IMAGE_TREE: &str = "illu/img";
pub const DRAWING_TREE: &str = "illu/d";
pub const BOOK_ENTRY: &str = "src/book.tex";
const SOURCE_DIR: &str = "src";
const COVER_DIR: &str = "src/cover/pdf";
const MARKDOWN_DIR: &str = "markdown";

/// Which side of the cover.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoverSide {
    Front,
    Back,
}

impl CoverSide {
    pub const ALL: [CoverSide; 2] = [CoverSide::Front, CoverSide::Back];

    fn stem(self) -> &'static str {
        match self {
            CoverSide::Front => "cover_front",
            CoverSide::Back => "cover_back",
        }
    }
}

/// Resolves every input and output path from the project root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectLayout {
    root: PathBuf,
}

impl ProjectLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Last component of the project root, used to name the final PDF.
    ///
    /// Falls back to `book` when the root has no usable name (e.g. `/`).
    pub fn project_name(&self) -> String {
        let canonical = self.root.canonicalize().unwrap_or_else(|_| self.root.clone());
        canonical
            .file_name()
            .and_then(|n| n.to_str())
            .filter(|n| !n.is_empty())
            .unwrap_or("book")
            .to_string()
    }

    pub fn output_dir(&self) -> PathBuf {
        self.root.join(OUTPUT_DIR)
    }

    /// `out/<asset dir>` relative to the root, as passed to the typesetter.
    pub fn relative_asset_root(&self, mode: BuildMode) -> String {
        format!("{}/{}", OUTPUT_DIR, mode.asset_dir_name())
    }

    pub fn asset_root(&self, mode: BuildMode) -> PathBuf {
        self.output_dir().join(mode.asset_dir_name())
    }

    pub fn image_tree(&self) -> PathBuf {
        self.root.join(IMAGE_TREE)
    }

    pub fn drawing_tree(&self) -> PathBuf {
        self.root.join(DRAWING_TREE)
    }

    pub fn image_output(&self, mode: BuildMode) -> PathBuf {
        self.asset_root(mode).join(IMAGE_TREE)
    }

    pub fn drawing_output(&self, mode: BuildMode) -> PathBuf {
        self.asset_root(mode).join(DRAWING_TREE)
    }

    pub fn cover_source(&self, side: CoverSide) -> PathBuf {
        self.root
            .join(COVER_DIR)
            .join(format!("{}.svg", side.stem()))
    }

    pub fn cover_output(&self, mode: BuildMode, side: CoverSide) -> PathBuf {
        self.asset_root(mode)
            .join("illu")
            .join(format!("{}.pdf", side.stem()))
    }

    /// PDF produced by the typesetter before renaming.
    pub fn typeset_output(&self) -> PathBuf {
        self.output_dir().join("book.pdf")
    }

    /// Final PDF name: `out/<project>_<mode>.pdf`.
    pub fn final_pdf(&self, mode: BuildMode) -> PathBuf {
        self.output_dir()
            .join(format!("{}_{}.pdf", self.project_name(), mode))
    }

    pub fn chapter_source(&self, chapter: &str) -> PathBuf {
        self.root.join(SOURCE_DIR).join(format!("{chapter}.tex"))
    }

    pub fn markdown_dir(&self) -> PathBuf {
        self.output_dir().join(MARKDOWN_DIR)
    }

    pub fn chapter_markdown(&self, chapter: &str) -> PathBuf {
        self.markdown_dir().join(format!("{chapter}.md"))
    }
}

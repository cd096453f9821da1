//! # Book Build
//!
//! Build orchestrator for a LaTeX book with illustrations. The book's
//! directory layout is the input: covers and drawings are SVG, bitmaps are
//! PNG or JPEG, and chapters are `.tex` files under `src/`.
//!
//! # Build Modes
//!
//! ```text
//! debug      low-res assets (100 DPI, 100 px bitmaps), single pdflatex pass
//! release    full-res assets (300 DPI, original bitmaps), draft + full pass
//! print      release assets plus \def\forprint{} for the print edition
//! markdown   each chapter → macro rewrite → pandoc → out/markdown/*.md
//! ```
//!
//! The PDF modes drive three external programs (Inkscape, pdflatex and
//! pandoc) through a [`tools::ToolRunner`]. Everything the build touches is
//! derived from the project root by [`layout::ProjectLayout`].
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`driver`] | Top-level build for each mode; returns a [`report::BuildReport`] |
//! | [`assets`] | Mirrors `illu/img` and `illu/d` into the per-mode output tree |
//! | [`staleness`] | Timestamp comparison deciding whether an artifact is rebuilt |
//! | [`rewrite`] | Rewrites the book's image macros to `\includegraphics` for pandoc |
//! | [`imaging`] | Bitmap copy and nearest-neighbour PNG previews |
//! | [`tools`] | External program seam, `PATH` lookup and argument lists |
//! | [`config`] | Build mode, `book.toml` loading, validation and merging |
//! | [`layout`] | Fixed input and output paths |
//! | [`report`] | Per-item outcomes and the aggregated report |
//! | [`output`] | CLI summary formatting |
//!
//! # Failure Model
//!
//! Two tiers. A missing tool, an unreadable config or an output root that
//! cannot be created stops the build with a [`driver::BuildError`]. A single
//! asset, chapter or typesetting pass that fails is recorded as a
//! [`report::Failure`] and the build continues; the binary exits with status
//! 1 when any were recorded.
//!
//! # Incremental Builds
//!
//! Each artifact is rebuilt only when its source is newer (see
//! [`staleness::is_stale`]) unless the build is forced. Typesetting always
//! runs.

pub mod assets;
pub mod config;
pub mod driver;
pub mod imaging;
pub mod layout;
pub mod output;
pub mod report;
pub mod rewrite;
pub mod staleness;
pub mod tools;

#[cfg(test)]
pub(crate) mod test_helpers;

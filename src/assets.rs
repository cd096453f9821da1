//! Asset pipeline: mirror an illustration tree into the output tree.
//!
//! ```text
//! illu/img/                      out/<mode>/illu/img/
//! ├── cat.png          ──────►   ├── cat.png        (copied or previewed)
//! └── hw/                        └── hw/
//!     └── board.jpg    ──────►       └── board.jpg
//!
//! illu/d/                        out/<mode>/illu/d/
//! ├── robot.svg        ──────►   ├── robot.png      (rasterized)
//! └── empty/                     └── empty/
//! ```
//!
//! [`mirror_tree`] walks the source tree in file-name order. Every directory
//! is recreated under the output root before any of its children, even when
//! it holds nothing convertible. Every file is handed to an [`AssetAction`]
//! together with its mirrored destination.
//!
//! The two actions:
//!
//! - [`BitmapAction`] copies bitmaps untouched for release builds and writes
//!   narrow nearest-neighbour PNG previews for debug builds.
//! - [`DrawingAction`] runs the rasterizer on SVG drawings, writing a PNG
//!   next to where the SVG would land. Any other file is a failure.
//!
//! Both skip destinations that are newer than their source (see
//! [`staleness`](crate::staleness)). A failing file is recorded in the
//! [`BuildReport`] and the walk goes on.

use crate::config::BuildSettings;
use crate::imaging::{copy_bitmap, rescale_to_png};
use crate::report::{BuildReport, Failure, Outcome};
use crate::staleness::is_stale;
use crate::tools::{ToolRunner, commands};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Per-file conversion applied during a tree walk.
pub trait AssetAction {
    /// Convert `src` into (a file derived from) `dst`.
    fn apply(&self, src: &Path, dst: &Path) -> Outcome;
}

/// Walk `source_root` and mirror it into `output_root`, applying `action`
/// to every file.
///
/// A missing source tree is not an error: the book may have no drawings.
/// Only failing to create `output_root` itself is fatal.
pub fn mirror_tree(
    source_root: &Path,
    output_root: &Path,
    action: &impl AssetAction,
) -> io::Result<BuildReport> {
    let mut report = BuildReport::default();
    fs::create_dir_all(output_root)?;

    if !source_root.is_dir() {
        warn!("Asset tree {} not found, skipping", source_root.display());
        return Ok(report);
    }

    let mut entries = WalkDir::new(source_root)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter();

    while let Some(entry) = entries.next() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                let item = err.path().unwrap_or(source_root).to_path_buf();
                report.record(Outcome::Failed(Failure::for_path(&item, err.to_string())));
                continue;
            }
        };
        let Ok(relative) = entry.path().strip_prefix(source_root) else {
            continue;
        };
        let mirrored = output_root.join(relative);

        if entry.file_type().is_dir() {
            debug!("Mirror: {}", mirrored.display());
            if let Err(err) = fs::create_dir_all(&mirrored) {
                report.record(Outcome::Failed(Failure::for_path(&mirrored, err.to_string())));
                entries.skip_current_dir();
            }
            continue;
        }

        report.record(action.apply(entry.path(), &mirrored));
    }

    Ok(report)
}

/// Copies or previews bitmaps from `illu/img`.
#[derive(Debug, Clone)]
pub struct BitmapAction {
    force: bool,
    /// Preview width for debug builds; `None` copies at full resolution.
    preview_width: Option<u32>,
}

impl BitmapAction {
    pub fn new(force: bool, preview_width: Option<u32>) -> Self {
        Self {
            force,
            preview_width,
        }
    }

    pub fn for_settings(settings: &BuildSettings) -> Self {
        let preview_width = settings
            .mode
            .downscales_bitmaps()
            .then_some(settings.config.resolution.preview_width);
        Self::new(settings.force, preview_width)
    }
}

impl AssetAction for BitmapAction {
    fn apply(&self, src: &Path, dst: &Path) -> Outcome {
        if !is_stale(src, dst, self.force) {
            return Outcome::UpToDate;
        }
        let result = match self.preview_width {
            None => {
                info!("Copy: {} -> {}", src.display(), dst.display());
                copy_bitmap(src, dst).map(|_| ())
            }
            Some(width) => {
                info!("Scale: {} -> {}", src.display(), dst.display());
                rescale_to_png(src, dst, width).map(|_| ())
            }
        };
        match result {
            Ok(()) => Outcome::Built,
            Err(err) => Outcome::Failed(Failure::for_path(src, err.to_string())),
        }
    }
}

/// Rasterizes SVG drawings from `illu/d` to PNG.
pub struct DrawingAction<'a, R: ToolRunner> {
    runner: &'a R,
    rasterizer: String,
    dpi: u32,
    force: bool,
}

impl<'a, R: ToolRunner> DrawingAction<'a, R> {
    pub fn new(runner: &'a R, rasterizer: impl Into<String>, dpi: u32, force: bool) -> Self {
        Self {
            runner,
            rasterizer: rasterizer.into(),
            dpi,
            force,
        }
    }

    pub fn for_settings(runner: &'a R, settings: &BuildSettings) -> Self {
        Self::new(
            runner,
            settings.config.tools.rasterizer.clone(),
            settings.dpi(),
            settings.force,
        )
    }
}

/// `robot.svg` → `robot.png`; `None` for anything that is not an SVG.
pub fn raster_destination(dst: &Path) -> Option<PathBuf> {
    dst.extension()
        .filter(|ext| ext.eq_ignore_ascii_case("svg"))
        .map(|_| dst.with_extension("png"))
}

impl<R: ToolRunner> AssetAction for DrawingAction<'_, R> {
    fn apply(&self, src: &Path, dst: &Path) -> Outcome {
        let Some(dst) = raster_destination(dst) else {
            return Outcome::Failed(Failure::for_path(src, "not an SVG drawing"));
        };
        if !is_stale(src, &dst, self.force) {
            return Outcome::UpToDate;
        }
        let invocation = commands::rasterize_drawing(&self.rasterizer, src, &dst, self.dpi);
        info!("{}", invocation);
        match self.runner.run(&invocation) {
            Ok(output) if output.success() => Outcome::Built,
            Ok(output) => Outcome::Failed(Failure::for_path(src, output.diagnostic())),
            Err(err) => Outcome::Failed(Failure::for_path(src, err.to_string())),
        }
    }
}

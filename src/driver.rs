//! Top-level build: one pass over a [`BuildMode`], no retries.
//!
//! ```text
//! debug / release / print                     markdown
//! ───────────────────────                     ────────
//! 1. require rasterizer on PATH               1. require converter on PATH
//! 2. covers  src/cover/pdf/*.svg → PDF        2. per chapter:
//! 3. mirror  illu/img → out/<mode>/illu/img      read → rewrite macros →
//! 4. mirror  illu/d   → out/<mode>/illu/d        temp .tex → pandoc → .md
//! 5. pdflatex -draftmode   (not in debug)
//! 6. pdflatex
//! 7. rename out/book.pdf → out/<project>_<mode>.pdf
//! ```
//!
//! Missing tools and I/O errors on the output roots are fatal and come back
//! as [`BuildError`]. Everything else is recorded per item in the returned
//! [`BuildReport`]; the caller turns failures into the exit status.

use crate::assets::{BitmapAction, DrawingAction, mirror_tree};
use crate::config::{BuildMode, BuildSettings, ConfigError};
use crate::layout::CoverSide;
use crate::report::{BuildReport, Failure, Outcome};
use crate::rewrite::rewrite;
use crate::staleness::is_stale;
use crate::tools::{Invocation, ToolError, ToolRunner, commands};
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum BuildError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Tool(#[from] ToolError),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Run the build described by `settings`.
pub fn run(settings: &BuildSettings, runner: &impl ToolRunner) -> Result<BuildReport, BuildError> {
    info!("Building in {} mode...", settings.mode);
    match settings.mode {
        BuildMode::Markdown => generate_markdown(settings, runner),
        _ => build_book(settings, runner),
    }
}

/// Covers, asset trees, typesetting and rename.
pub fn build_book(
    settings: &BuildSettings,
    runner: &impl ToolRunner,
) -> Result<BuildReport, BuildError> {
    let mode = settings.mode;
    let layout = &settings.project;
    runner.require(&settings.config.tools.rasterizer)?;
    fs::create_dir_all(layout.asset_root(mode))?;

    let mut report = BuildReport::default();

    for side in CoverSide::ALL {
        let src = layout.cover_source(side);
        if !src.exists() {
            info!("Skipping {} (file not found)", src.display());
            report.skip();
            continue;
        }
        report.record(make_cover(settings, runner, side)?);
    }

    report.absorb(mirror_tree(
        &layout.image_tree(),
        &layout.image_output(mode),
        &BitmapAction::for_settings(settings),
    )?);
    report.absorb(mirror_tree(
        &layout.drawing_tree(),
        &layout.drawing_output(mode),
        &DrawingAction::for_settings(runner, settings),
    )?);

    report.record(typeset(settings, runner));
    Ok(report)
}

/// Export one cover side to PDF with outlined text.
fn make_cover(
    settings: &BuildSettings,
    runner: &impl ToolRunner,
    side: CoverSide,
) -> Result<Outcome, BuildError> {
    let layout = &settings.project;
    let src = layout.cover_source(side);
    let dst = layout.cover_output(settings.mode, side);
    if !is_stale(&src, &dst, settings.force) {
        return Ok(Outcome::UpToDate);
    }
    if let Some(parent) = dst.parent() {
        fs::create_dir_all(parent)?;
    }
    let invocation = commands::render_cover(
        &settings.config.tools.rasterizer,
        &src,
        &dst,
        settings.dpi(),
    );
    Ok(match run_step(runner, &invocation, &src.display().to_string()) {
        Ok(()) => Outcome::Built,
        Err(failure) => Outcome::Failed(failure),
    })
}

/// Draft pass (unless debug), full pass, then rename the PDF.
///
/// The full pass only runs when the draft pass succeeded; a failed pass
/// leaves `out/book.pdf` where it is.
fn typeset(settings: &BuildSettings, runner: &impl ToolRunner) -> Outcome {
    let mode = settings.mode;
    let layout = &settings.project;
    let typesetter = &settings.config.tools.typesetter;
    let expression =
        commands::typeset_expression(&layout.relative_asset_root(mode), mode.typeset_options());

    if mode.runs_draft_pass() {
        let draft = commands::typeset(typesetter, layout.root(), &expression, true);
        if let Err(failure) = run_step(runner, &draft, "typesetting (draft pass)") {
            return Outcome::Failed(failure);
        }
    }

    let full = commands::typeset(typesetter, layout.root(), &expression, false);
    if let Err(failure) = run_step(runner, &full, "typesetting") {
        return Outcome::Failed(failure);
    }

    let produced = layout.typeset_output();
    let target = layout.final_pdf(mode);
    match fs::rename(&produced, &target) {
        Ok(()) => {
            info!("Wrote {}", target.display());
            Outcome::Built
        }
        Err(err) => Outcome::Failed(Failure::for_path(
            &produced,
            format!("cannot rename to {}: {err}", target.display()),
        )),
    }
}

/// Log and run one invocation, mapping a failed run to a [`Failure`].
fn run_step(runner: &impl ToolRunner, invocation: &Invocation, item: &str) -> Result<(), Failure> {
    info!("{}", invocation);
    match runner.run(invocation) {
        Ok(output) if output.success() => Ok(()),
        Ok(output) => Err(Failure::new(item, output.diagnostic())),
        Err(err) => Err(Failure::new(item, err.to_string())),
    }
}

// =============================================================================
// Markdown export
// =============================================================================

/// Convert every configured chapter to Markdown.
///
/// Missing chapters are skipped; a chapter that fails to read, write or
/// convert is recorded and the batch moves on.
pub fn generate_markdown(
    settings: &BuildSettings,
    runner: &impl ToolRunner,
) -> Result<BuildReport, BuildError> {
    info!("Generating markdown files for each chapter...");
    let layout = &settings.project;
    let converter = &settings.config.tools.converter;
    runner.require(converter)?;

    let out_dir = layout.markdown_dir();
    fs::create_dir_all(&out_dir)?;

    let mut report = BuildReport::default();
    for chapter in &settings.config.markdown.chapters {
        let src = layout.chapter_source(chapter);
        if !src.exists() {
            info!("Skipping {} (file not found)", src.display());
            report.skip();
            continue;
        }
        let dst = layout.chapter_markdown(chapter);
        info!("Converting {} -> {}", src.display(), dst.display());
        report.record(convert_chapter(runner, converter, chapter, &src, &dst, &out_dir));
    }
    Ok(report)
}

fn convert_chapter(
    runner: &impl ToolRunner,
    converter: &str,
    chapter: &str,
    src: &Path,
    dst: &Path,
    scratch_dir: &Path,
) -> Outcome {
    let failed = |diagnostic: String| Outcome::Failed(Failure::new(chapter, diagnostic));

    let content = match fs::read(src).map(String::from_utf8) {
        Ok(Ok(text)) => text,
        Ok(Err(err)) => {
            return failed(format!(
                "{} is not valid UTF-8 (byte {})",
                src.display(),
                err.utf8_error().valid_up_to()
            ));
        }
        Err(err) => return failed(format!("cannot read {}: {err}", src.display())),
    };
    let processed = rewrite(&content);

    // Removed when dropped, whether or not the conversion succeeds.
    let mut scratch = match tempfile::Builder::new()
        .prefix(&format!("{chapter}."))
        .suffix(".tmp.tex")
        .tempfile_in(scratch_dir)
    {
        Ok(file) => file,
        Err(err) => return failed(format!("cannot create temp file: {err}")),
    };
    if let Err(err) = scratch
        .write_all(processed.as_bytes())
        .and_then(|()| scratch.flush())
    {
        return failed(format!("cannot write temp file: {err}"));
    }

    let invocation = commands::convert_chapter(converter, scratch.path(), dst);
    let outcome = match run_step(runner, &invocation, chapter) {
        Ok(()) => Outcome::Built,
        Err(failure) => {
            if dst.exists() {
                info!("Partial output may have been saved to {}", dst.display());
            }
            Outcome::Failed(failure)
        }
    };

    if let Err(err) = scratch.close() {
        warn!("Could not remove temp file for {chapter}: {err}");
    }
    outcome
}

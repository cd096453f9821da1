use book_build::config::{BuildMode, BuildSettings};
use book_build::driver::{self, BuildError};
use book_build::output;
use book_build::tools::SystemRunner;
use clap::Parser;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "book-build")]
#[command(about = "Build the book: illustrations, covers, PDF or Markdown")]
#[command(long_about = "\
Build the book: illustrations, covers, PDF or Markdown

Modes:

  debug      low-resolution assets, single pdflatex pass
  release    full-resolution assets, draft pass + full pass (default)
  print      release assets, typeset with \\def\\forprint{}
  markdown   convert each chapter to out/markdown/<chapter>.md with pandoc

Project layout:

  book.toml                   # optional: tools, resolutions, chapter list
  src/book.tex                # typesetting entry point
  src/<chapter>.tex           # markdown mode inputs
  src/cover/pdf/cover_*.svg   # covers, exported to PDF with outlined text
  illu/img/**                 # bitmaps, copied (or shrunk in debug mode)
  illu/d/**                   # SVG drawings, rasterized to PNG

Artifacts are rebuilt only when their source is newer. Pass any second
argument (or --force) to rebuild everything.

Exit status: 0 success, 1 some items failed, 2 fatal error.")]
#[command(version)]
struct Cli {
    /// Build mode: debug, release, print or markdown
    #[arg(default_value = "release")]
    mode: String,

    /// Any value forces a full rebuild
    #[arg(allow_hyphen_values = true)]
    force: Option<String>,

    /// Rebuild every artifact regardless of timestamps
    #[arg(short = 'f', long = "force")]
    force_flag: bool,

    /// Project root
    #[arg(long, default_value = ".")]
    project_dir: PathBuf,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    /// A second positional of any value, or `--force`.
    fn forced(&self) -> bool {
        self.force_flag || self.force.is_some()
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "book_build=debug"
    } else {
        "book_build=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    match build(&cli.mode, cli.forced(), &cli.project_dir) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(err) => {
            eprintln!("Error: {err}");
            ExitCode::from(2)
        }
    }
}

/// Run one build and print its summary. `Ok(false)` when any item failed.
fn build(mode: &str, force: bool, project_dir: &Path) -> Result<bool, BuildError> {
    let settings = BuildSettings::resolve(mode, force, project_dir)?;
    let report = driver::run(&settings, &SystemRunner)?;

    let layout = &settings.project;
    match settings.mode {
        BuildMode::Markdown => output::print_markdown_summary(&report, &layout.markdown_dir()),
        mode => output::print_build_summary(mode, &report, &layout.final_pdf(mode)),
    }
    Ok(report.is_success())
}

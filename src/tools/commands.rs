//! Argument lists for the three external tools.
//!
//! These functions describe *what* to run; a [`ToolRunner`](super::ToolRunner)
//! decides *how*. All of them are pure.

use super::Invocation;
use crate::layout::{BOOK_ENTRY, OUTPUT_DIR};
use std::path::Path;

/// Inkscape: rasterize a drawing to PNG at `dpi`.
pub fn rasterize_drawing(rasterizer: &str, src: &Path, dst: &Path, dpi: u32) -> Invocation {
    Invocation::new(rasterizer)
        .arg(format!("--export-filename={}", dst.display()))
        .arg(format!("--export-dpi={dpi}"))
        .path_arg(src)
}

/// Inkscape: export a cover to PDF with all text converted to outlines, so
/// the printer needs none of the cover fonts.
pub fn render_cover(rasterizer: &str, src: &Path, dst: &Path, dpi: u32) -> Invocation {
    Invocation::new(rasterizer)
        .arg(format!("--export-filename={}", dst.display()))
        .arg(format!("--export-dpi={dpi}"))
        .arg("--export-type=pdf")
        .arg("--export-text-to-path")
        .path_arg(src)
}

/// The LaTeX expression fed to the typesetter.
///
/// `\base` points the book at the mode's asset tree; `options` carries extra
/// definitions such as `\def\forprint{}`.
pub fn typeset_expression(asset_root: &str, options: &str) -> String {
    let mut parts = vec![format!(r"\def\base{{{asset_root}}}")];
    if !options.is_empty() {
        parts.push(options.to_string());
    }
    parts.push(format!(r"\input{{{BOOK_ENTRY}}}"));
    parts.join(" ")
}

/// pdflatex pass, run from the project root.
///
/// A draft pass (`-draftmode`) writes no PDF; it only produces the auxiliary
/// files the full pass needs for the table of contents and cross references.
pub fn typeset(
    typesetter: &str,
    project_root: &Path,
    expression: &str,
    draft: bool,
) -> Invocation {
    let mut invocation = Invocation::new(typesetter);
    if draft {
        invocation = invocation.arg("-draftmode");
    }
    invocation
        .arg("-output-directory")
        .arg(OUTPUT_DIR)
        .arg(expression)
        .current_dir(project_root)
}

/// pandoc: LaTeX chapter → Markdown, keeping the source line breaks.
pub fn convert_chapter(converter: &str, input: &Path, output: &Path) -> Invocation {
    Invocation::new(converter)
        .arg("-f")
        .arg("latex")
        .arg("-t")
        .arg("markdown")
        .arg("--wrap=preserve")
        .arg("-o")
        .path_arg(output)
        .path_arg(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drawing_arguments() {
        let inv = rasterize_drawing(
            "inkscape",
            Path::new("/b/illu/d/robot.svg"),
            Path::new("/b/out/debug/illu/d/robot.png"),
            100,
        );
        assert_eq!(
            inv.args,
            vec![
                "--export-filename=/b/out/debug/illu/d/robot.png",
                "--export-dpi=100",
                "/b/illu/d/robot.svg",
            ]
        );
        assert_eq!(inv.cwd, None);
    }

    #[test]
    fn cover_arguments_outline_text() {
        let inv = render_cover(
            "inkscape",
            Path::new("/b/src/cover/pdf/cover_front.svg"),
            Path::new("/b/out/release/illu/cover_front.pdf"),
            300,
        );
        assert_eq!(
            inv.to_string(),
            "inkscape --export-filename=/b/out/release/illu/cover_front.pdf \
             --export-dpi=300 --export-type=pdf --export-text-to-path \
             /b/src/cover/pdf/cover_front.svg"
        );
    }

    #[test]
    fn expression_without_options() {
        assert_eq!(
            typeset_expression("out/debug", ""),
            r"\def\base{out/debug} \input{src/book.tex}"
        );
    }

    #[test]
    fn expression_with_print_option() {
        assert_eq!(
            typeset_expression("out/release", r"\def\forprint{}"),
            r"\def\base{out/release} \def\forprint{} \input{src/book.tex}"
        );
    }

    #[test]
    fn draft_and_full_passes() {
        let expr = typeset_expression("out/release", "");
        let draft = typeset("pdflatex", Path::new("/b"), &expr, true);
        let full = typeset("pdflatex", Path::new("/b"), &expr, false);

        assert_eq!(
            draft.args,
            vec!["-draftmode", "-output-directory", "out", expr.as_str()]
        );
        assert_eq!(full.args, vec!["-output-directory", "out", expr.as_str()]);
        assert_eq!(full.cwd.as_deref(), Some(Path::new("/b")));
    }

    #[test]
    fn pandoc_arguments() {
        let inv = convert_chapter(
            "pandoc",
            Path::new("/b/out/markdown/gfx.tex"),
            Path::new("/b/out/markdown/gfx.md"),
        );
        assert_eq!(
            inv.to_string(),
            "pandoc -f latex -t markdown --wrap=preserve -o /b/out/markdown/gfx.md /b/out/markdown/gfx.tex"
        );
    }
}

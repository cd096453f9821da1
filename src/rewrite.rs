//! Book macros → plain LaTeX, for the Markdown export.
//!
//! The book sources wrap `\includegraphics` in a handful of project macros
//! that pandoc knows nothing about. Before conversion every occurrence is
//! rewritten to a standard directive pointing at the asset tree:
//!
//! ```text
//! \img{cat.png}           → \includegraphics{illu/img/cat.png}
//! \draw{robot}            → \includegraphics{illu/d/robot.png}
//! \sbimg{0.5}{cat.png}    → \includegraphics[width=0.5\textwidth]{illu/img/cat.png}
//! \sdraw{0.3}{robot.png}  → \includegraphics[width=0.3\textwidth]{illu/d/robot.png}
//! ```
//!
//! Drawings are rasterized to PNG, so the drawing macros add `.png` when the
//! argument does not already end with it. Bitmap macros keep the filename
//! as written.
//!
//! # Malformed input
//!
//! [`rewrite`] never fails. When an occurrence has unbalanced braces (or a
//! scaled macro is missing its second argument) rewriting stops for that
//! macro family: the broken occurrence and everything after it keep their
//! original text for that family. Other families are still processed. A typo
//! in one chapter must not cost the whole export.
//!
//! # Literal substitutions
//!
//! After macro rewriting, a few fixed fragments are replaced by the Unicode
//! character they typeset (`$\times$` → `×`). None of the fragments overlaps
//! a macro token or the generated directives.

use std::ops::Range;

/// Extension appended to drawing filenames.
const DRAWING_EXTENSION: &str = ".png";
const DRAWING_PREFIX: &str = "illu/d/";
const IMAGE_PREFIX: &str = "illu/img/";

/// Literal fragments and their replacement, applied in order.
const LITERALS: &[(&str, &str)] = &[
    (r"\begin{CJK}{UTF8}{min}→\end{CJK}", "→"),
    (r"$\times$", "×"),
    (r"$\mu$", "μ"),
];

/// Number of brace-delimited arguments a macro takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// `\img{file}`
    File,
    /// `\sbimg{scale}{file}`
    ScaleAndFile,
}

/// One recognized macro and how it maps to `\includegraphics`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MacroFamily {
    /// Opening token, backslash through the first `{`.
    pub token: &'static str,
    pub arity: Arity,
    /// Directory prefix prepended to the filename.
    pub prefix: &'static str,
    /// Append [`DRAWING_EXTENSION`] when missing.
    pub force_extension: bool,
}

impl MacroFamily {
    const fn drawing(token: &'static str, arity: Arity) -> Self {
        Self {
            token,
            arity,
            prefix: DRAWING_PREFIX,
            force_extension: true,
        }
    }

    const fn image(token: &'static str, arity: Arity) -> Self {
        Self {
            token,
            arity,
            prefix: IMAGE_PREFIX,
            force_extension: false,
        }
    }
}

/// Families in processing order.
pub static FAMILIES: &[MacroFamily] = &[
    MacroFamily::drawing(r"\draw{", Arity::File),
    MacroFamily::drawing(r"\nbdraw{", Arity::File),
    MacroFamily::image(r"\img{", Arity::File),
    MacroFamily::image(r"\nbimg{", Arity::File),
    MacroFamily::image(r"\sbimg{", Arity::ScaleAndFile),
    MacroFamily::drawing(r"\sbdraw{", Arity::ScaleAndFile),
    MacroFamily::image(r"\simg{", Arity::ScaleAndFile),
    MacroFamily::drawing(r"\sdraw{", Arity::ScaleAndFile),
];

/// A parsed macro invocation inside a source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MacroOccurrence<'a> {
    pub family: &'static MacroFamily,
    /// Scale factor for [`Arity::ScaleAndFile`] macros, kept verbatim.
    pub scale: Option<&'a str>,
    pub file: &'a str,
    /// Byte range from the backslash through the last closing brace.
    pub span: Range<usize>,
}

impl MacroOccurrence<'_> {
    /// The `\includegraphics` directive replacing this occurrence.
    pub fn directive(&self) -> String {
        let mut path = format!("{}{}", self.family.prefix, self.file);
        if self.family.force_extension && !self.file.ends_with(DRAWING_EXTENSION) {
            path.push_str(DRAWING_EXTENSION);
        }
        match self.scale {
            Some(scale) => format!(r"\includegraphics[width={scale}\textwidth]{{{path}}}"),
            None => format!(r"\includegraphics{{{path}}}"),
        }
    }
}

/// Rewrite every recognized macro, then apply the literal substitutions.
pub fn rewrite(text: &str) -> String {
    let mut content = text.to_string();
    for family in FAMILIES {
        content = rewrite_family(content, family);
    }
    substitute_literals(&content)
}

/// Replace the fixed literal fragments by their Unicode character.
pub fn substitute_literals(text: &str) -> String {
    LITERALS
        .iter()
        .fold(text.to_string(), |acc, (from, to)| acc.replace(from, to))
}

/// Rewrite all occurrences of one family, stopping at the first malformed one.
fn rewrite_family(mut content: String, family: &'static MacroFamily) -> String {
    let mut cursor = 0;
    while let Some(found) = content[cursor..].find(family.token) {
        let start = cursor + found;
        let Some((span, directive)) =
            parse_occurrence(&content, start, family).map(|occ| (occ.span.clone(), occ.directive()))
        else {
            tracing::debug!(
                "Unterminated {} at byte {}, leaving the rest untouched",
                family.token,
                start
            );
            break;
        };
        content.replace_range(span, &directive);
        // Resume at the directive itself so macros nested in an argument
        // are picked up too.
        cursor = start;
    }
    content
}

/// Parse the occurrence of `family` whose token starts at `start`.
///
/// Returns `None` when the argument braces never balance or the second
/// argument of a scaled macro does not follow immediately.
pub fn parse_occurrence<'a>(
    text: &'a str,
    start: usize,
    family: &'static MacroFamily,
) -> Option<MacroOccurrence<'a>> {
    let (first, after_first) = parse_group(text, start + family.token.len())?;
    let (scale, file, end) = match family.arity {
        Arity::File => (None, first, after_first),
        Arity::ScaleAndFile => {
            if text.as_bytes().get(after_first) != Some(&b'{') {
                return None;
            }
            let (file, end) = parse_group(text, after_first + 1)?;
            (Some(first), file, end)
        }
    };
    Some(MacroOccurrence {
        family,
        scale,
        file,
        span: start..end,
    })
}

/// Read a brace group whose opening `{` has already been consumed.
///
/// `body_start` is the index just after the opening brace. Returns the group
/// content and the index just after its closing brace. Nested groups are
/// part of the content.
fn parse_group(text: &str, body_start: usize) -> Option<(&str, usize)> {
    let mut depth = 1usize;
    for (offset, byte) in text.as_bytes().get(body_start..)?.iter().enumerate() {
        match byte {
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    let close = body_start + offset;
                    return Some((&text[body_start..close], close + 1));
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_macro() {
        assert_eq!(rewrite(r"\img{cat.png}"), r"\includegraphics{illu/img/cat.png}");
    }

    #[test]
    fn drawing_macro_appends_extension() {
        assert_eq!(rewrite(r"\draw{robot}"), r"\includegraphics{illu/d/robot.png}");
    }

    #[test]
    fn drawing_macro_keeps_existing_extension() {
        assert_eq!(
            rewrite(r"\draw{robot.png}"),
            r"\includegraphics{illu/d/robot.png}"
        );
    }

    #[test]
    fn image_macro_never_adds_extension() {
        assert_eq!(rewrite(r"\nbimg{photo}"), r"\includegraphics{illu/img/photo}");
    }

    #[test]
    fn scaled_image() {
        assert_eq!(
            rewrite(r"\sbimg{0.5}{cat.png}"),
            r"\includegraphics[width=0.5\textwidth]{illu/img/cat.png}"
        );
        assert_eq!(
            rewrite(r"\simg{.8}{cat.jpg}"),
            r"\includegraphics[width=.8\textwidth]{illu/img/cat.jpg}"
        );
    }

    #[test]
    fn scaled_drawing_appends_extension() {
        assert_eq!(
            rewrite(r"\sbdraw{0.7}{pipeline}"),
            r"\includegraphics[width=0.7\textwidth]{illu/d/pipeline.png}"
        );
        assert_eq!(
            rewrite(r"\sdraw{1}{pipeline.png}"),
            r"\includegraphics[width=1\textwidth]{illu/d/pipeline.png}"
        );
    }

    #[test]
    fn all_families_in_one_text() {
        let input = "A \\draw{a}\nB \\nbdraw{b}\nC \\img{c.png}\nD \\nbimg{d.jpg}\n\
                     E \\sbimg{0.1}{e.png}\nF \\sbdraw{0.2}{f}\nG \\simg{0.3}{g.png}\nH \\sdraw{0.4}{h}\n";
        let expected = "A \\includegraphics{illu/d/a.png}\n\
                        B \\includegraphics{illu/d/b.png}\n\
                        C \\includegraphics{illu/img/c.png}\n\
                        D \\includegraphics{illu/img/d.jpg}\n\
                        E \\includegraphics[width=0.1\\textwidth]{illu/img/e.png}\n\
                        F \\includegraphics[width=0.2\\textwidth]{illu/d/f.png}\n\
                        G \\includegraphics[width=0.3\\textwidth]{illu/img/g.png}\n\
                        H \\includegraphics[width=0.4\\textwidth]{illu/d/h.png}\n";
        assert_eq!(rewrite(input), expected);
    }

    #[test]
    fn surrounding_text_is_preserved() {
        let input = "Voici le CPU: \\img{cpu.png} puis \\draw{bus} — fin.";
        assert_eq!(
            rewrite(input),
            "Voici le CPU: \\includegraphics{illu/img/cpu.png} puis \\includegraphics{illu/d/bus.png} — fin."
        );
    }

    #[test]
    fn empty_arguments_are_accepted() {
        assert_eq!(rewrite(r"\img{}"), r"\includegraphics{illu/img/}");
        assert_eq!(rewrite(r"\draw{}"), r"\includegraphics{illu/d/.png}");
        assert_eq!(
            rewrite(r"\sbimg{}{}"),
            r"\includegraphics[width=\textwidth]{illu/img/}"
        );
    }

    #[test]
    fn nested_braces_stay_in_argument() {
        assert_eq!(
            rewrite(r"\img{a{b}c.png}"),
            r"\includegraphics{illu/img/a{b}c.png}"
        );
    }

    #[test]
    fn nested_macro_in_argument_is_rewritten() {
        assert_eq!(
            rewrite(r"\draw{\draw{x}}"),
            r"\includegraphics{illu/d/\includegraphics{illu/d/x.png}.png}"
        );
    }

    #[test]
    fn unterminated_macro_is_left_alone() {
        let input = r"Intro \img{unterminated and more text";
        assert_eq!(rewrite(input), input);
    }

    #[test]
    fn malformed_stops_family_after_earlier_rewrites() {
        let input = r"\img{a.png} then \img{broken then \img{c.png";
        assert_eq!(
            rewrite(input),
            r"\includegraphics{illu/img/a.png} then \img{broken then \img{c.png"
        );
    }

    #[test]
    fn malformed_family_does_not_block_other_families() {
        let input = r"\img{broken \draw{ok}";
        // \draw runs first; \img never balances and keeps its text.
        assert_eq!(rewrite(input), r"\img{broken \includegraphics{illu/d/ok.png}");
    }

    #[test]
    fn scaled_macro_without_second_argument_is_malformed() {
        let input = r"\sbimg{0.5} cat.png and \sbimg{0.2}{dog.png}";
        assert_eq!(rewrite(input), input);
    }

    #[test]
    fn scaled_macro_with_unterminated_second_argument() {
        let input = r"\sdraw{0.5}{robot";
        assert_eq!(rewrite(input), input);
    }

    #[test]
    fn rewritten_text_is_stable() {
        let once = rewrite(r"\img{cat.png} \sbdraw{0.5}{robot} $\times$");
        assert_eq!(rewrite(&once), once);
    }

    #[test]
    fn text_without_macros_is_unchanged() {
        let input = "\\section{Hardware}\n\\includegraphics{illu/img/cat.png}\n";
        assert_eq!(rewrite(input), input);
    }

    #[test]
    fn literal_substitutions() {
        assert_eq!(rewrite(r"320$\times$200"), "320×200");
        assert_eq!(rewrite(r"1 $\mu$s"), "1 μs");
        assert_eq!(rewrite(r"A \begin{CJK}{UTF8}{min}→\end{CJK} B"), "A → B");
    }

    #[test]
    fn literals_apply_alongside_macros() {
        assert_eq!(
            rewrite(r"\sbimg{0.5}{a.png} 2$\times$"),
            r"\includegraphics[width=0.5\textwidth]{illu/img/a.png} 2×"
        );
    }

    #[test]
    fn parse_occurrence_reports_span() {
        let text = r"xx \sbimg{0.5}{cat.png} yy";
        let family = &FAMILIES[4];
        let occ = parse_occurrence(text, 3, family).unwrap();
        assert_eq!(occ.scale, Some("0.5"));
        assert_eq!(occ.file, "cat.png");
        assert_eq!(&text[occ.span.clone()], r"\sbimg{0.5}{cat.png}");
    }

    #[test]
    fn parse_group_handles_utf8() {
        let text = "{é{ü}}rest";
        assert_eq!(parse_group(text, 1), Some(("é{ü}", text.len() - 4)));
    }

    #[test]
    fn tokens_do_not_contain_each_other() {
        for a in FAMILIES {
            for b in FAMILIES {
                if a.token != b.token {
                    assert!(!a.token.contains(b.token), "{} contains {}", a.token, b.token);
                }
            }
        }
    }
}

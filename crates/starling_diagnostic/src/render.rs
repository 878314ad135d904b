use std::io;

use termcolor::{ColorSpec, NoColor, WriteColor};
use unicode_width::UnicodeWidthStr;

use crate::sources::{Cached, Source, Sources};
use crate::span::Span;
use crate::{Config, Diagnostic, DiagnosticKind, SnippetKind};

const TAB: &str = "    ";

impl<S: Sources> Diagnostic<S> {
    pub fn write_to_stream(
        &self,
        sources: &S,
        config: &Config,
        stream: &mut impl WriteColor,
    ) -> io::Result<()> {
        Renderer {
            diagnostic: self,
            sources,
            config,
            stream,
            gutter_width: 1,
        }
        .render()
    }

    /// Render without colour codes.
    pub fn to_plain_string(&self, sources: &S, config: &Config) -> String {
        let mut stream = NoColor::new(vec![]);

        // Writing into a `Vec` can't fail.
        let _ = self.write_to_stream(sources, config, &mut stream);

        String::from_utf8_lossy(&stream.into_inner()).into_owned()
    }
}

struct Renderer<'a, 'stream, W: WriteColor, S: Sources> {
    diagnostic: &'a Diagnostic<S>,
    sources: &'a S,
    config: &'a Config,

    stream: &'stream mut W,
    gutter_width: usize,
}

impl<'a, W: WriteColor, S: Sources> Renderer<'a, '_, W, S> {
    fn render(mut self) -> io::Result<()> {
        self.header()?;

        for (source, snippets) in self.snippets_by_source() {
            for (group, mut lines) in overlapping_groups(snippets, |s| s.lines) {
                lines.start = lines.start.saturating_sub(self.config.context_lines);
                lines.end = (lines.end + self.config.context_lines).min(source.num_lines());

                self.group(source, &group, lines)?;
            }
        }

        self.notes()
    }

    fn header(&mut self) -> io::Result<()> {
        self.stream.set_color(self.primary_color())?;

        write!(self.stream, "{}", self.diagnostic.kind.label())?;
        if let Some(id) = &self.diagnostic.id {
            write!(self.stream, "[{id}]")?;
        }

        self.stream.reset()?;

        match &self.diagnostic.message {
            Some(message) => writeln!(self.stream, ": {message}"),
            None => writeln!(self.stream),
        }
    }

    fn group(
        &mut self,
        source: &Cached<S::Source>,
        snippets: &[SnippetData],
        lines: Span,
    ) -> io::Result<()> {
        let Some(first) = snippets.first() else {
            return Ok(());
        };

        let (multiline, inline): (Vec<_>, Vec<_>) =
            snippets.iter().partition(|s| s.lines.len() > 1);

        self.gutter_width = num_digits(lines.end);

        let (line_num, col_num) = source.byte_to_line_col(first.bytes.start).unwrap_or((1, 1));

        self.stream.set_color(&self.config.subtle)?;
        write!(
            self.stream,
            "{:width$}{} {}:{line_num}:{col_num}",
            "",
            self.config.location_arrow,
            source.name_str(),
            width = self.gutter_width,
        )?;
        if let Some(path) = source.path() {
            write!(self.stream, " ({})", path.display())?;
        }
        writeln!(self.stream)?;
        self.stream.reset()?;

        let text = source.source_str();

        for line in lines {
            self.gutter(Some(line + 1))?;
            self.multiline_markers(&multiline, line, true)?;

            let line_str = source.line_str(line).unwrap_or_default().replace('\t', TAB);
            writeln!(self.stream, "{line_str}")?;

            let Some(line_span) = source.line_span(line) else {
                continue;
            };

            for snippet in inline.iter().filter(|s| s.lines.start == line) {
                self.gutter(None)?;
                self.multiline_markers(&multiline, line, false)?;

                let start = snippet.bytes.start;
                let end = snippet.bytes.end.min(line_span.end).max(start);

                let offset = str_width(&text[line_span.start..start]);
                let width = str_width(&text[start..end]).max(1);

                self.stream.set_color(self.snippet_color(snippet.kind))?;
                write!(
                    self.stream,
                    "{:offset$}{}",
                    "",
                    self.underline(snippet.kind).repeat(width)
                )?;
                if !snippet.label.is_empty() {
                    write!(self.stream, " {}", snippet.label)?;
                }
                writeln!(self.stream)?;
                self.stream.reset()?;
            }
        }

        self.multiline_labels(&multiline)
    }

    fn gutter(&mut self, line: Option<usize>) -> io::Result<()> {
        self.stream.set_color(&self.config.subtle)?;

        match line {
            Some(line) => write!(self.stream, "{line:>width$}", width = self.gutter_width)?,
            None => write!(self.stream, "{:width$}", "", width = self.gutter_width)?,
        }
        write!(self.stream, " {} ", self.config.gutter)?;

        self.stream.reset()
    }

    fn multiline_markers(
        &mut self,
        multiline: &[&SnippetData],
        line: usize,
        source_line: bool,
    ) -> io::Result<()> {
        for snippet in multiline {
            let glyph = if line < snippet.lines.start {
                self.config.multiline_empty
            } else if source_line && line == snippet.lines.start {
                self.config.multiline_top
            } else if source_line && line + 1 == snippet.lines.end {
                self.config.multiline_bottom
            } else {
                self.config.multiline_main
            };

            self.stream.set_color(self.snippet_color(snippet.kind))?;
            write!(self.stream, "{glyph} ")?;
        }

        self.stream.reset()
    }

    fn multiline_labels(&mut self, multiline: &[&SnippetData]) -> io::Result<()> {
        for (i, snippet) in multiline.iter().enumerate().rev() {
            self.gutter(None)?;

            for outer in &multiline[..i] {
                self.stream.set_color(self.snippet_color(outer.kind))?;
                write!(self.stream, "{} ", self.config.multiline_main)?;
            }

            self.stream.set_color(self.snippet_color(snippet.kind))?;
            writeln!(
                self.stream,
                "{} {}",
                self.config.multiline_label, snippet.label
            )?;
            self.stream.reset()?;
        }

        Ok(())
    }

    fn notes(&mut self) -> io::Result<()> {
        for note in &self.diagnostic.notes {
            write!(self.stream, "{:width$} ", "", width = self.gutter_width)?;

            self.stream.set_color(&self.config.note_color)?;
            write!(self.stream, "= note:")?;
            self.stream.reset()?;

            writeln!(self.stream, " {note}")?;
        }

        Ok(())
    }

    /// Resolve snippets against their sources, grouped by source in order of
    /// first appearance. Snippets pointing at unknown sources are dropped.
    fn snippets_by_source(&self) -> Vec<(&'a Cached<S::Source>, Vec<SnippetData<'a>>)> {
        let diagnostic = self.diagnostic;
        let sources = self.sources;

        let mut by_source: Vec<(S::SourceId, &'a Cached<S::Source>, Vec<SnippetData<'a>>)> =
            vec![];

        for snippet in &diagnostic.snippets {
            let Some(source) = sources.get_source(snippet.source_id) else {
                log::warn!("dropping snippet {:?}: unknown source", snippet.label);
                continue;
            };

            let bytes = source.clamp(snippet.span);
            let last_byte = if bytes.is_empty() {
                bytes.start
            } else {
                bytes.end - 1
            };

            let start_line = source.byte_to_line_index(bytes.start).unwrap_or(0);
            let end_line = source
                .byte_to_line_index(last_byte)
                .unwrap_or(start_line)
                .max(start_line)
                + 1;

            let data = SnippetData {
                label: &snippet.label,
                kind: snippet.kind,
                bytes,
                lines: Span::new(start_line, end_line),
            };

            match by_source
                .iter_mut()
                .find(|(id, ..)| *id == snippet.source_id)
            {
                Some((_, _, snippets)) => snippets.push(data),
                None => by_source.push((snippet.source_id, source, vec![data])),
            }
        }

        by_source
            .into_iter()
            .map(|(_, source, snippets)| (source, snippets))
            .collect()
    }

    fn primary_color(&self) -> &'a ColorSpec {
        match self.diagnostic.kind {
            DiagnosticKind::Warning => &self.config.warning_color,
            DiagnosticKind::Error => &self.config.error_color,
        }
    }

    fn snippet_color(&self, kind: SnippetKind) -> &'a ColorSpec {
        match kind {
            SnippetKind::Primary => self.primary_color(),
            SnippetKind::Secondary => &self.config.secondary_color,
        }
    }

    fn underline(&self, kind: SnippetKind) -> &'static str {
        match kind {
            SnippetKind::Primary => self.config.underline_primary,
            SnippetKind::Secondary => self.config.underline_secondary,
        }
    }
}

#[derive(Debug, Clone)]
struct SnippetData<'a> {
    label: &'a str,
    kind: SnippetKind,

    bytes: Span,
    lines: Span,
}

/// Sort items by the start of their range and merge items whose ranges
/// touch or overlap into groups, returning each group with its covering range.
fn overlapping_groups<T>(mut items: Vec<T>, range: impl Fn(&T) -> Span) -> Vec<(Vec<T>, Span)> {
    items.sort_by_key(|item| range(item).start);

    let mut groups: Vec<(Vec<T>, Span)> = vec![];

    for item in items {
        let item_range = range(&item);

        match groups.last_mut() {
            Some((group, group_range)) if item_range.start <= group_range.end => {
                *group_range = group_range.to(item_range);
                group.push(item);
            }
            _ => groups.push((vec![item], item_range)),
        }
    }

    groups
}

fn num_digits(n: usize) -> usize {
    n.max(1).ilog10() as usize + 1
}

fn str_width(s: &str) -> usize {
    let tabs = s.chars().filter(|&ch| ch == '\t').count();
    s.width() + tabs * TAB.len()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::overlapping_groups;
    use crate::sources::Cached;
    use crate::span::Span;
    use crate::{Config, Diagnostic, Snippet};

    type Sources = Vec<Cached<(String, String)>>;

    fn sources(text: &str) -> Sources {
        vec![Cached::new(("main.st".to_owned(), text.to_owned()))]
    }

    #[test]
    fn groups() {
        let groups = overlapping_groups(
            vec![
                Span::new(6, 8),
                Span::new(0, 2),
                Span::new(1, 4),
                Span::new(4, 5),
                Span::new(12, 13),
            ],
            |&r| r,
        );

        assert_eq!(
            groups,
            vec![
                (
                    vec![Span::new(0, 2), Span::new(1, 4), Span::new(4, 5)],
                    Span::new(0, 5)
                ),
                (vec![Span::new(6, 8)], Span::new(6, 8)),
                (vec![Span::new(12, 13)], Span::new(12, 13)),
            ]
        );
    }

    #[test]
    fn inline_snippet() {
        let sources = sources("fun main() {\n    let x = ;\n}\n");

        let diagnostic: Diagnostic<Sources> = Diagnostic::error()
            .with_message("expected expression, found `;`")
            .with_id("E0001")
            .with_snippet(Snippet::primary("expected expression", 0, 25..26))
            .with_note("statements end with `;`");

        assert_eq!(
            diagnostic.to_plain_string(&sources, &Config::default()),
            "error[E0001]: expected expression, found `;`\n \
             ╭─▶ main.st:2:13\n\
             1 │ fun main() {\n\
             2 │     let x = ;\n  \
             │             ^ expected expression\n\
             3 │ }\n  \
             = note: statements end with `;`\n"
        );
    }

    #[test]
    fn multiline_snippet() {
        let sources = sources("fun main() {\n    x\n}");

        let diagnostic: Diagnostic<Sources> = Diagnostic::warning()
            .with_snippet(Snippet::secondary("body", 0, 11..20))
            .with_snippet(Snippet::primary("here", 0, 17..18));

        let out = diagnostic.to_plain_string(&sources, &Config::default());

        assert!(out.starts_with("warning\n"));
        assert!(out.contains("1 │ ╭ fun main() {\n"));
        assert!(out.contains("3 │ ├ }\n"));
        assert!(out.contains("│ ╰ body\n"));
        assert!(out.contains("│ │     ^ here\n"));
    }

    #[test]
    fn unknown_source_is_skipped() {
        let sources = sources("x");

        let diagnostic: Diagnostic<Sources> = Diagnostic::error()
            .with_message("oops")
            .with_snippet(Snippet::primary("", 3, 0..1));

        assert_eq!(
            diagnostic.to_plain_string(&sources, &Config::default()),
            "error: oops\n"
        );
    }
}

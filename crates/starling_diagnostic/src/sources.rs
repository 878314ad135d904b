use std::path::{Path, PathBuf};

use crate::span::Span;

/// A collection of sources that diagnostics can point into.
pub trait Sources {
    type SourceId: Copy + Eq + std::hash::Hash;
    type Source: Source;

    fn get_source(&self, id: Self::SourceId) -> Option<&Cached<Self::Source>>;
}

pub trait Source {
    fn name_str(&self) -> &str;
    fn path(&self) -> Option<&Path>;

    fn source_str(&self) -> &str;
}

impl<S: Source> Sources for Vec<Cached<S>> {
    type SourceId = usize;
    type Source = S;

    fn get_source(&self, id: Self::SourceId) -> Option<&Cached<Self::Source>> {
        self.get(id)
    }
}

/// `(name, text)`
impl Source for (String, String) {
    fn name_str(&self) -> &str {
        &self.0
    }

    fn path(&self) -> Option<&Path> {
        None
    }

    fn source_str(&self) -> &str {
        &self.1
    }
}

/// `(name, path, text)`
impl Source for (String, PathBuf, String) {
    fn name_str(&self) -> &str {
        &self.0
    }

    fn path(&self) -> Option<&Path> {
        Some(&self.1)
    }

    fn source_str(&self) -> &str {
        &self.2
    }
}

/// A source together with the byte offsets of its line breaks, so that byte
/// positions can be turned into line and column numbers.
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
#[derive(Debug, Clone)]
pub struct Cached<S: Source> {
    source: S,
    line_breaks: Vec<usize>,
}

impl<S: Source> Cached<S> {
    pub fn new(source: S) -> Self {
        let line_breaks = source
            .source_str()
            .match_indices('\n')
            .map(|(i, _)| i)
            .collect();

        Self {
            source,
            line_breaks,
        }
    }

    pub fn as_source(&self) -> &S {
        &self.source
    }

    pub fn into_source(self) -> S {
        self.source
    }

    /// 1-based line and column (in bytes) of `byte`.
    pub fn byte_to_line_col(&self, byte: usize) -> Option<(usize, usize)> {
        let line = self.byte_to_line_index(byte)?;
        let col = byte - self.line_to_byte(line)?;

        Some((line + 1, col + 1))
    }

    /// 0-based line containing `byte`. A newline belongs to the line it ends.
    pub fn byte_to_line_index(&self, byte: usize) -> Option<usize> {
        if byte > self.source_str().len() {
            return None;
        }

        Some(self.line_breaks.partition_point(|&br| br < byte))
    }

    pub fn line_to_byte(&self, line: usize) -> Option<usize> {
        match line {
            0 => Some(0),
            _ => self.line_breaks.get(line - 1).map(|&br| br + 1),
        }
    }

    /// Span of a line, excluding its line terminator.
    pub fn line_span(&self, line: usize) -> Option<Span> {
        let start = self.line_to_byte(line)?;
        let end = self
            .line_breaks
            .get(line)
            .copied()
            .unwrap_or(self.source_str().len());

        let text = &self.source_str()[start..end];
        let trimmed = text.strip_suffix('\r').unwrap_or(text);

        Some(Span::new(start, start + trimmed.len()))
    }

    pub fn line_str(&self, line: usize) -> Option<&str> {
        let span = self.line_span(line)?;
        Some(&self.source_str()[span.as_range()])
    }

    pub fn num_lines(&self) -> usize {
        self.line_breaks.len() + 1
    }

    /// Clamp a span into the source and onto character boundaries.
    pub fn clamp(&self, span: Span) -> Span {
        let text = self.source_str();

        let floor = |mut i: usize| {
            i = i.min(text.len());
            while !text.is_char_boundary(i) {
                i -= 1;
            }
            i
        };

        let end = floor(span.end);
        Span::new(floor(span.start).min(end), end)
    }
}

impl<S: Source> Source for Cached<S> {
    fn name_str(&self) -> &str {
        self.source.name_str()
    }

    fn path(&self) -> Option<&Path> {
        self.source.path()
    }

    fn source_str(&self) -> &str {
        self.source.source_str()
    }
}

#[cfg(test)]
mod tests {
    use super::Cached;
    use crate::span::Span;

    fn cached(s: &str) -> Cached<(String, String)> {
        Cached::new(("test".to_owned(), s.to_owned()))
    }

    #[test]
    fn line_indices() {
        let cases: &[(&str, &[Option<usize>])] = &[
            ("", &[Some(0), None]),
            ("\n", &[Some(0), Some(1), None]),
            ("ab\n", &[Some(0), Some(0), Some(0), Some(1), None]),
            ("\nab", &[Some(0), Some(1), Some(1), Some(1), None]),
        ];

        for &(src, expected) in cases {
            let cached = cached(src);
            for (byte, &line) in expected.iter().enumerate() {
                assert_eq!(cached.byte_to_line_index(byte), line, "{src:?} @ {byte}");
            }
        }
    }

    #[test]
    fn line_col() {
        let cached = cached("fun main() {\n\tlet x = 1;\n}");

        assert_eq!(cached.byte_to_line_col(0), Some((1, 1)));
        assert_eq!(cached.byte_to_line_col(4), Some((1, 5)));
        assert_eq!(cached.byte_to_line_col(12), Some((1, 13)));
        assert_eq!(cached.byte_to_line_col(13), Some((2, 1)));
        assert_eq!(cached.byte_to_line_col(18), Some((2, 6)));
        assert_eq!(cached.byte_to_line_col(25), Some((3, 1)));
        assert_eq!(cached.byte_to_line_col(26), Some((3, 2)));
        assert_eq!(cached.byte_to_line_col(27), None);
    }

    #[test]
    fn lines() {
        let cached = cached("one\r\ntwo\n\nthree");

        assert_eq!(cached.num_lines(), 4);
        assert_eq!(cached.line_str(0), Some("one"));
        assert_eq!(cached.line_str(1), Some("two"));
        assert_eq!(cached.line_str(2), Some(""));
        assert_eq!(cached.line_str(3), Some("three"));
        assert_eq!(cached.line_str(4), None);

        assert_eq!(cached.line_to_byte(1), Some(5));
        assert_eq!(cached.line_span(1), Some(Span::new(5, 8)));
    }

    #[test]
    fn clamping() {
        let cached = cached("aé");

        assert_eq!(cached.clamp(Span::new(0, 10)), Span::new(0, 3));
        assert_eq!(cached.clamp(Span::new(2, 3)), Span::new(1, 3));
        assert_eq!(cached.clamp(Span::new(5, 9)), Span::new(3, 3));
    }
}

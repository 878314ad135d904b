//! Diagnostics: a severity, a message, labelled snippets of source code and
//! trailing notes, plus a terminal renderer for them.

mod render;
pub mod sources;
pub mod span;

use derive_where::derive_where;
pub use termcolor;
use termcolor::{Color, ColorSpec};

use self::sources::Sources;
use self::span::{AsSpan, Span};

#[derive_where(Debug, Clone; S::SourceId)]
pub struct Diagnostic<S: Sources> {
    pub kind: DiagnosticKind,

    pub message: Option<String>,
    pub id: Option<String>,

    pub snippets: Vec<Snippet<S>>,
    pub notes: Vec<String>,
}

impl<S: Sources> Diagnostic<S> {
    pub fn new(kind: DiagnosticKind) -> Self {
        Self {
            kind,
            message: None,
            id: None,
            snippets: vec![],
            notes: vec![],
        }
    }

    pub fn warning() -> Self {
        Self::new(DiagnosticKind::Warning)
    }

    pub fn error() -> Self {
        Self::new(DiagnosticKind::Error)
    }

    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    #[must_use]
    pub fn with_snippet(mut self, snippet: Snippet<S>) -> Self {
        self.snippets.push(snippet);
        self
    }

    #[must_use]
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }
}

#[cfg(feature = "serialize")]
impl<Srcs: Sources> serde::Serialize for Diagnostic<Srcs>
where
    Srcs::SourceId: serde::Serialize,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeStruct;

        let mut s = serializer.serialize_struct("Diagnostic", 5)?;

        s.serialize_field("kind", &self.kind)?;
        s.serialize_field("message", &self.message)?;
        s.serialize_field("id", &self.id)?;
        s.serialize_field("snippets", &self.snippets)?;
        s.serialize_field("notes", &self.notes)?;

        s.end()
    }
}

#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DiagnosticKind {
    Warning,
    Error,
}

impl DiagnosticKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

#[derive_where(Debug, Clone; S::SourceId)]
pub struct Snippet<S: Sources> {
    pub label: String,
    pub kind: SnippetKind,

    pub source_id: S::SourceId,
    pub span: Span,
}

impl<S: Sources> Snippet<S> {
    pub fn new(
        kind: SnippetKind,
        label: impl Into<String>,
        source_id: S::SourceId,
        span: impl AsSpan,
    ) -> Self {
        Self {
            label: label.into(),
            kind,

            source_id,
            span: span.as_span(),
        }
    }

    pub fn primary(label: impl Into<String>, source_id: S::SourceId, span: impl AsSpan) -> Self {
        Self::new(SnippetKind::Primary, label, source_id, span)
    }

    pub fn secondary(label: impl Into<String>, source_id: S::SourceId, span: impl AsSpan) -> Self {
        Self::new(SnippetKind::Secondary, label, source_id, span)
    }
}

#[cfg(feature = "serialize")]
impl<Srcs: Sources> serde::Serialize for Snippet<Srcs>
where
    Srcs::SourceId: serde::Serialize,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeStruct;

        let mut s = serializer.serialize_struct("Snippet", 4)?;

        s.serialize_field("label", &self.label)?;
        s.serialize_field("kind", &self.kind)?;
        s.serialize_field("source_id", &self.source_id)?;
        s.serialize_field("span", &self.span)?;

        s.end()
    }
}

#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SnippetKind {
    Primary,
    Secondary,
}

/// Rendering options.
#[derive(Debug, Clone)]
pub struct Config {
    /// Lines of context shown around each group of snippets.
    pub context_lines: usize,

    pub error_color: ColorSpec,
    pub warning_color: ColorSpec,
    pub secondary_color: ColorSpec,
    pub note_color: ColorSpec,
    pub subtle: ColorSpec,

    pub gutter: &'static str,
    pub location_arrow: &'static str,

    pub multiline_top: &'static str,
    pub multiline_main: &'static str,
    pub multiline_bottom: &'static str,
    pub multiline_label: &'static str,
    pub multiline_empty: &'static str,

    pub underline_primary: &'static str,
    pub underline_secondary: &'static str,
}

impl Default for Config {
    fn default() -> Self {
        let mut error_color = ColorSpec::new();
        error_color.set_fg(Some(Color::Red)).set_bold(true);

        let mut warning_color = ColorSpec::new();
        warning_color.set_fg(Some(Color::Yellow)).set_bold(true);

        let mut secondary_color = ColorSpec::new();
        secondary_color.set_fg(Some(Color::Blue)).set_bold(true);

        let mut note_color = ColorSpec::new();
        note_color.set_bold(true);

        let mut subtle = ColorSpec::new();
        subtle.set_dimmed(true);

        Self {
            context_lines: 1,

            error_color,
            warning_color,
            secondary_color,
            note_color,
            subtle,

            gutter: "│",
            location_arrow: "╭─▶",

            multiline_top: "╭",
            multiline_main: "│",
            multiline_bottom: "├",
            multiline_label: "╰",
            multiline_empty: " ",

            underline_primary: "^",
            underline_secondary: "-",
        }
    }
}

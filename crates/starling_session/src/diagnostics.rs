use starling_diagnostic::termcolor::{ColorChoice, StandardStream};
pub use starling_diagnostic::*;

use crate::sourcemap::SourceMap;

pub mod prelude {
    pub use starling_diagnostic::span::Span;
    pub use starling_diagnostic::{DiagnosticKind, Snippet, SnippetKind};

    pub use super::{Diagnostic, IntoDiagnostic};
    pub use crate::sourcemap::SourceId;
}

pub type Diagnostic = starling_diagnostic::Diagnostic<SourceMap>;

/// Somewhere to send diagnostics once they have been built.
pub trait DiagnosticEmitter {
    fn emit_diagnostic(&mut self, diagnostic: Diagnostic, sources: &SourceMap);
}

impl DiagnosticEmitter for Vec<Diagnostic> {
    fn emit_diagnostic(&mut self, diagnostic: Diagnostic, _sources: &SourceMap) {
        self.push(diagnostic);
    }
}

/// Renders diagnostics to stderr.
#[derive(Debug)]
pub struct PrettyDiagnosticEmitter {
    pub stream: StandardStream,
    pub config: Config,
}

impl PrettyDiagnosticEmitter {
    pub fn new(color: ColorChoice) -> Self {
        Self {
            stream: StandardStream::stderr(color),
            config: Config::default(),
        }
    }
}

impl Default for PrettyDiagnosticEmitter {
    fn default() -> Self {
        Self::new(ColorChoice::Auto)
    }
}

impl DiagnosticEmitter for PrettyDiagnosticEmitter {
    fn emit_diagnostic(&mut self, diagnostic: Diagnostic, sources: &SourceMap) {
        if let Err(err) = diagnostic.write_to_stream(sources, &self.config, &mut self.stream) {
            log::error!("failed to write diagnostic: {err}");
        }
    }
}

/// Conversion of an error value into a [`Diagnostic`].
///
/// `Context` is whatever the conversion needs to describe the error, such as
/// an interner to resolve identifiers.
pub trait IntoDiagnostic<Context: ?Sized> {
    fn into_diagnostic(self, cx: &Context) -> Diagnostic;
}

impl IntoDiagnostic<()> for Diagnostic {
    fn into_diagnostic(self, _cx: &()) -> Diagnostic {
        self
    }
}

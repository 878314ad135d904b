pub mod diagnostics;
pub mod sourcemap;

use diagnostics::{DiagnosticEmitter, DiagnosticKind, IntoDiagnostic};
use sourcemap::SourceMap;

/// Returned when at least one error-level diagnostic was reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorsEmitted;

/// Sources and diagnostic output shared by everything processed in one run.
pub struct Session<D: DiagnosticEmitter> {
    pub sources: SourceMap,
    pub diagnostics: D,

    error_count: usize,
    warning_count: usize,
}

impl<D: DiagnosticEmitter> Session<D> {
    pub fn new(diagnostics: D) -> Self {
        Self {
            sources: SourceMap::default(),
            diagnostics,

            error_count: 0,
            warning_count: 0,
        }
    }

    pub fn report<Context: ?Sized>(
        &mut self,
        diagnostic: impl IntoDiagnostic<Context>,
        cx: &Context,
    ) -> Result<(), ErrorsEmitted> {
        let diagnostic = diagnostic.into_diagnostic(cx);
        let kind = diagnostic.kind;

        self.emit(diagnostic);

        match kind {
            DiagnosticKind::Warning => Ok(()),
            DiagnosticKind::Error => Err(ErrorsEmitted),
        }
    }

    pub fn report_all<Context: ?Sized, I>(
        &mut self,
        diagnostics: I,
        cx: &Context,
    ) -> Result<(), ErrorsEmitted>
    where
        I: IntoIterator,
        I::Item: IntoDiagnostic<Context>,
    {
        let mut had_error = false;

        for diagnostic in diagnostics {
            had_error |= self.report(diagnostic, cx).is_err();
        }

        if had_error {
            Err(ErrorsEmitted)
        } else {
            Ok(())
        }
    }

    pub fn error_count(&self) -> usize {
        self.error_count
    }

    pub fn warning_count(&self) -> usize {
        self.warning_count
    }

    fn emit(&mut self, diagnostic: diagnostics::Diagnostic) {
        match diagnostic.kind {
            DiagnosticKind::Warning => self.warning_count += 1,
            DiagnosticKind::Error => self.error_count += 1,
        }

        self.diagnostics.emit_diagnostic(diagnostic, &self.sources);
    }
}

use std::fmt;

use starling_session::diagnostics::prelude::*;

use crate::lexer::LexerError;
use crate::parser::ParseError;
use crate::Node;

/// Any error found while turning source text into an AST.
#[derive(Node!)]
pub enum SyntaxError {
    Lexer(LexerError),
    Parser(ParseError),
}

impl SyntaxError {
    pub fn span(&self) -> Span {
        match self {
            SyntaxError::Lexer(error) => error.span,
            SyntaxError::Parser(error) => error.span,
        }
    }
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyntaxError::Lexer(error) => write!(f, "{}", error.kind),
            SyntaxError::Parser(error) => write!(f, "{}", error.kind),
        }
    }
}

impl IntoDiagnostic<SourceId> for SyntaxError {
    fn into_diagnostic(self, source_id: &SourceId) -> Diagnostic {
        match self {
            SyntaxError::Lexer(error) => error.into_diagnostic(source_id),
            SyntaxError::Parser(error) => error.into_diagnostic(source_id),
        }
    }
}

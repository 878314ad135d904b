#[cfg(test)]
mod tests;

mod literal;
mod number;

use std::str::Chars;

use starling_interner::Interner;
use starling_session::diagnostics::prelude::*;
use starling_utils::peek::Peek;
use unicode_xid::UnicodeXID;

use crate::token::*;
use crate::{Node, NodeCopy};

#[derive(Node!)]
pub struct LexerError {
    pub kind: LexerErrorKind,
    pub span: Span,
}

#[derive(NodeCopy!, thiserror::Error)]
pub enum LexerErrorKind {
    #[error("unexpected character {0:?}")]
    UnexpectedChar(char),

    #[error("invalid digit {digit:?} in a base {base} literal")]
    InvalidDigit { digit: char, base: u32 },

    #[error("missing digits after the base prefix")]
    MissingDigits,

    #[error("missing digits in exponent")]
    MissingExponentDigits,

    #[error("digit separator `_` must be placed between two digits")]
    InvalidDigitSeparator,

    #[error("only decimal literals can have a fraction or an exponent")]
    NonDecimalFloat,

    #[error("unknown escape sequence `\\{0}`")]
    UnknownEscape(char),

    #[error("escape sequence needs exactly {expected} hex digits")]
    TooFewHexDigits { expected: u8 },

    #[error("octal escape sequence needs exactly 3 digits")]
    TooFewOctalDigits,

    #[error("escape sequence value is out of range")]
    EscapeOutOfRange,

    #[error("escape sequence encodes a surrogate code point")]
    SurrogateEscape,

    #[error("empty character literal")]
    EmptyCharLiteral,

    #[error("character literal contains more than one character")]
    MultipleCharsInLiteral,

    #[error("unterminated character literal")]
    UnterminatedChar,

    #[error("unterminated string literal")]
    UnterminatedString,

    #[error("unterminated block comment")]
    UnterminatedBlockComment,

    #[error("unterminated wrapped identifier")]
    UnterminatedWrappedIdentifier,

    #[error("wrapped identifier is empty")]
    EmptyWrappedIdentifier,
}

impl LexerErrorKind {
    fn label(self) -> &'static str {
        match self {
            Self::UnexpectedChar(_) => "not valid here",
            Self::UnterminatedChar | Self::UnterminatedString => "literal starts here",
            Self::UnterminatedBlockComment => "comment starts here",
            Self::UnterminatedWrappedIdentifier => "identifier starts here",
            Self::EmptyWrappedIdentifier => "expected a name between the backticks",
            Self::InvalidDigit { .. }
            | Self::MissingDigits
            | Self::MissingExponentDigits
            | Self::InvalidDigitSeparator
            | Self::NonDecimalFloat => "invalid number",
            _ => "invalid literal",
        }
    }
}

impl IntoDiagnostic<SourceId> for LexerError {
    fn into_diagnostic(self, source_id: &SourceId) -> Diagnostic {
        let span = match self.kind {
            // Only point at the opening delimiter.
            LexerErrorKind::UnterminatedBlockComment => {
                Span::new(self.span.start, self.span.start + 2)
            }
            LexerErrorKind::UnterminatedChar
            | LexerErrorKind::UnterminatedString
            | LexerErrorKind::UnterminatedWrappedIdentifier => {
                Span::new(self.span.start, self.span.start + 1)
            }
            _ => self.span,
        };

        Diagnostic::error()
            .with_message(self.kind.to_string())
            .with_snippet(Snippet::primary(self.kind.label(), *source_id, span))
    }
}

pub type LexerResult<T> = Result<T, LexerErrorKind>;

/// Turns source text into tokens on demand.
///
/// Errors are collected as the lexer goes and handed back by
/// [`Lexer::finish`]. Every malformed token is also returned as a
/// [`TokenKind::Error`] so the parser can stand a placeholder in for it.
pub struct Lexer<'a> {
    interner: &'a Interner,
    errors: Vec<LexerError>,

    all: &'a str,
    chars: Chars<'a>,

    token_start: usize,
    reached_eof: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str, interner: &'a Interner) -> Self {
        Self {
            interner,
            errors: vec![],

            all: source,
            chars: source.chars(),

            token_start: 0,
            reached_eof: false,
        }
    }

    pub fn source(&self) -> &'a str {
        self.all
    }

    pub fn finish(self) -> Vec<LexerError> {
        self.errors
    }

    /// Lex the next token. Once the end of the source has been reached this
    /// keeps returning [`TokenKind::Eof`].
    pub fn next_token(&mut self) -> Token {
        let kind = self.lex_kind();

        Token {
            kind,
            span: Span::new(self.token_start, self.byte_pos()),
        }
    }

    fn lex_kind(&mut self) -> TokenKind {
        loop {
            macro_rules! try_lex {
                ($e:expr) => {{
                    match $e {
                        Ok(kind) => kind,
                        Err(err) => self.report_error(err),
                    }
                }};
            }

            self.token_start = self.byte_pos();

            let Some(ch) = self.chars.next() else {
                return TokenKind::Eof;
            };

            let kind = match ch {
                ' ' | '\t' | '\n' | '\r' | '\x0b' | '\x0c' => continue,

                '/' if self.chars.eat('/') => match self.line_comment() {
                    Some(kind) => kind,
                    None => continue,
                },
                '/' if self.chars.eat('*') => {
                    self.block_comment();
                    continue;
                }

                '(' => TokenKind::LParen,
                ')' => TokenKind::RParen,
                '[' => TokenKind::LBracket,
                ']' => TokenKind::RBracket,
                '{' => TokenKind::LBrace,
                '}' => TokenKind::RBrace,

                '.' if self.chars.peek().is_some_and(|ch| ch.is_ascii_digit()) => {
                    try_lex!(self.lex_number('.'))
                }
                '.' if self.chars.eat('.') => TokenKind::DotDot,
                '.' => TokenKind::Dot,
                ',' => TokenKind::Comma,
                ';' => TokenKind::Semicolon,
                ':' => TokenKind::Colon,
                '@' => TokenKind::At,
                '?' => TokenKind::Question,
                '#' => TokenKind::Hash,

                '+' if self.chars.eat('+') => TokenKind::PlusPlus,
                '+' if self.chars.eat('=') => TokenKind::PlusEq,
                '+' => TokenKind::Plus,

                '-' if self.chars.eat('-') => TokenKind::MinusMinus,
                '-' if self.chars.eat('=') => TokenKind::MinusEq,
                '-' if self.chars.eat('>') => TokenKind::Arrow,
                '-' => TokenKind::Minus,

                '*' if self.chars.eat('*') => TokenKind::StarStar,
                '*' if self.chars.eat('=') => TokenKind::StarEq,
                '*' => TokenKind::Star,

                '/' if self.chars.eat('=') => TokenKind::SlashEq,
                '/' => TokenKind::Slash,

                '%' if self.chars.eat('=') => TokenKind::PercentEq,
                '%' => TokenKind::Percent,

                '=' if self.chars.eat('=') => TokenKind::EqEq,
                '=' => TokenKind::Eq,

                '!' if self.chars.eat('=') => TokenKind::BangEq,
                '!' => TokenKind::Bang,

                '<' if self.chars.eat('<') => {
                    if self.chars.eat('=') {
                        TokenKind::LtLtEq
                    } else {
                        TokenKind::LtLt
                    }
                }
                '<' if self.chars.eat('=') => TokenKind::LtEq,
                '<' => TokenKind::Lt,

                '>' if self.chars.eat('>') => {
                    if self.chars.eat('=') {
                        TokenKind::GtGtEq
                    } else {
                        TokenKind::GtGt
                    }
                }
                '>' if self.chars.eat('=') => TokenKind::GtEq,
                '>' => TokenKind::Gt,

                '&' if self.chars.eat('&') => TokenKind::AmpAmp,
                '&' if self.chars.eat('=') => TokenKind::AmpEq,
                '&' => TokenKind::Amp,

                '|' if self.chars.eat('|') => TokenKind::PipePipe,
                '|' if self.chars.eat('=') => TokenKind::PipeEq,
                '|' => TokenKind::Pipe,

                '^' if self.chars.eat('=') => TokenKind::CaretEq,
                '^' => TokenKind::Caret,
                '~' => TokenKind::Tilde,

                '`' => try_lex!(self.lex_wrapped_ident()),
                '\'' => try_lex!(self.lex_char()),
                '"' => try_lex!(self.lex_string()),

                ch @ '0'..='9' => try_lex!(self.lex_number(ch)),

                '_' if !self.chars.peek().is_some_and(is_ident_continue) => TokenKind::Underscore,
                ch if is_ident_start(ch) => self.lex_word(),

                ch => self.report_error(LexerErrorKind::UnexpectedChar(ch)),
            };

            return kind;
        }
    }

    /// Called after `//`. Returns a token for doc comments.
    fn line_comment(&mut self) -> Option<TokenKind> {
        let kind = match (self.chars.peek(), self.chars.peek_nth(1)) {
            (Some('/'), Some('/')) => None,
            (Some('/'), _) => Some(TokenKind::DocComment { module: false }),
            (Some('!'), _) => Some(TokenKind::DocComment { module: true }),
            _ => None,
        };

        self.chars.eat_while(|&ch| ch != '\n');

        kind
    }

    /// Called after `/*`. Block comments nest.
    fn block_comment(&mut self) {
        let mut depth = 1_usize;

        while depth > 0 {
            match self.chars.next() {
                Some('/') if self.chars.eat('*') => depth += 1,
                Some('*') if self.chars.eat('/') => depth -= 1,
                Some(_) => {}
                None => {
                    self.report_error(LexerErrorKind::UnterminatedBlockComment);
                    return;
                }
            }
        }
    }

    fn lex_word(&mut self) -> TokenKind {
        self.chars.eat_while(|&ch| is_ident_continue(ch));

        let s = &self.all[self.token_start..self.byte_pos()];

        match s {
            "true" => TokenKind::Bool(true),
            "false" => TokenKind::Bool(false),
            _ => match Keyword::lookup(s) {
                Some(kw) => TokenKind::Keyword(kw),
                None => TokenKind::Identifier(self.interner.intern(s)),
            },
        }
    }

    /// Called after a backtick. The text up to the closing backtick is taken
    /// as is, so keywords can be used as names.
    fn lex_wrapped_ident(&mut self) -> LexerResult<TokenKind> {
        self.chars.eat_while(|&ch| ch != '`' && ch != '\n');

        let name = &self.all[self.token_start + 1..self.byte_pos()];

        if !self.chars.eat('`') {
            return Err(LexerErrorKind::UnterminatedWrappedIdentifier);
        }
        if name.is_empty() {
            return Err(LexerErrorKind::EmptyWrappedIdentifier);
        }

        Ok(TokenKind::Identifier(self.interner.intern(name)))
    }

    fn byte_pos(&self) -> usize {
        self.all.len() - self.chars.as_str().len()
    }

    fn report_error(&mut self, kind: LexerErrorKind) -> TokenKind {
        let span = Span::new(self.token_start, self.byte_pos());
        log::debug!("lexer error at {}..{}: {kind}", span.start, span.end);

        self.errors.push(LexerError { kind, span });
        TokenKind::Error(kind)
    }
}

/// Yields tokens up to and including a single [`TokenKind::Eof`].
impl Iterator for Lexer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Self::Item> {
        if self.reached_eof {
            return None;
        }

        let token = self.next_token();
        self.reached_eof = token.kind == TokenKind::Eof;

        Some(token)
    }
}

fn is_ident_start(ch: char) -> bool {
    ch == '_' || ch.is_xid_start()
}

fn is_ident_continue(ch: char) -> bool {
    ch.is_xid_continue()
}

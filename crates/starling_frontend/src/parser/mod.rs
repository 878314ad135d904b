
mod expr;
mod item;
mod pattern;
mod stmt;
mod ty;

use std::mem;

use starling_interner::{Interner, Istr};
use starling_session::diagnostics::prelude::*;

use crate::ast::*;
use crate::cursor::TokenStream;
use crate::error::SyntaxError;
use crate::token::{Keyword, Token, TokenKind};
use crate::Node;

#[derive(Debug, Clone, Copy)]
pub struct ParserConfig {
    /// Parsing stops after this many errors.
    pub max_errors: usize,
    /// Maximum depth of nested expressions, patterns, types and blocks.
    pub max_nesting: usize,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            max_errors: 100,
            max_nesting: 128,
        }
    }
}

#[derive(Node!)]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub span: Span,
}

impl ParseError {
    pub fn new(kind: ParseErrorKind, span: Span) -> Self {
        Self { kind, span }
    }
}

#[derive(Node!, thiserror::Error)]
pub enum ParseErrorKind {
    #[error("expected {expected}, found {found}")]
    Expected { expected: String, found: TokenKind },

    #[error("comparison operators cannot be chained")]
    ChainedComparison,

    #[error("refutable pattern in {context}")]
    RefutablePattern { context: &'static str },

    #[error("`..` patterns are not allowed here")]
    RestPatternNotAllowed,

    #[error("`..` can only be used once per pattern")]
    MultipleRestPatterns,

    #[error("unnecessary visibility qualifier on {context}")]
    UnnecessaryVisibility { context: &'static str },

    #[error("integer literal is too large")]
    IntegerTooLarge,

    #[error("empty generic list")]
    EmptyGenericList,

    #[error("empty `where` clause")]
    EmptyWhereClause,

    #[error("`break` outside of a loop")]
    BreakOutsideLoop,

    #[error("`continue` outside of a loop")]
    ContinueOutsideLoop,

    #[error("too many errors, giving up after {limit}")]
    TooManyErrors { limit: usize },

    #[error("too deeply nested, the limit is {limit}")]
    NestingTooDeep { limit: usize },
}

impl ParseErrorKind {
    fn label(&self) -> String {
        match self {
            Self::Expected { found, .. } => format!("unexpected {found}"),
            Self::ChainedComparison => "chained comparison".to_owned(),
            Self::RefutablePattern { .. } => "pattern might not match".to_owned(),
            Self::UnnecessaryVisibility { .. } => "remove this `pub`".to_owned(),
            Self::IntegerTooLarge => "does not fit in 64 bits".to_owned(),
            _ => String::new(),
        }
    }

    fn note(&self) -> Option<&'static str> {
        match self {
            Self::ChainedComparison => Some("use `&&` or parentheses to combine comparisons"),
            Self::RefutablePattern { .. } => {
                Some("use `match` to handle values that might not match")
            }
            Self::UnnecessaryVisibility { context: "import" } => {
                Some("imports are private to the module they appear in")
            }
            Self::UnnecessaryVisibility { .. } => Some("interface methods are always public"),
            _ => None,
        }
    }
}

impl IntoDiagnostic<SourceId> for ParseError {
    fn into_diagnostic(self, source_id: &SourceId) -> Diagnostic {
        let diagnostic = Diagnostic::error()
            .with_message(self.kind.to_string())
            .with_snippet(Snippet::primary(self.kind.label(), *source_id, self.span));

        match self.kind.note() {
            Some(note) => diagnostic.with_note(note),
            None => diagnostic,
        }
    }
}

pub type ParseResult<T> = Result<T, ParseError>;

pub struct Parser<'a> {
    tokens: TokenStream<'a>,
    config: ParserConfig,
    errors: Vec<ParseError>,

    /// Number of loops around the current position, reset by function and
    /// lambda bodies.
    loop_depth: usize,
    depth: usize,

    self_name: Istr,
    aborted: bool,

    /// Where the last unclosed list gave up. Anything the enclosing rule
    /// expected at this token is a follow-on error.
    cut_off: Option<Span>,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: TokenStream<'a>, interner: &'a Interner, config: ParserConfig) -> Self {
        Self {
            tokens,
            config,
            errors: vec![],

            loop_depth: 0,
            depth: 0,

            self_name: interner.intern("self"),
            aborted: false,

            cut_off: None,
        }
    }

    pub fn parse(mut self) -> (Module, Vec<SyntaxError>) {
        let module = self.parse_module();
        (module, self.finish())
    }

    /// Parse a single construct that must span the whole input.
    pub fn parse_single<T>(
        mut self,
        parse: impl FnOnce(&mut Self) -> ParseResult<T>,
        placeholder: impl FnOnce(Span) -> T,
    ) -> (T, Vec<SyntaxError>) {
        let (result, span) = self.parse_spanned(parse);

        let node = match result {
            Ok(node) => {
                if !self.at_end() {
                    let error = self.error_expected("end of input");
                    self.report(error);
                }
                node
            }
            Err(error) => {
                self.report(error);
                placeholder(span)
            }
        };

        (node, self.finish())
    }

    /// Lexer and parser errors, ordered by position.
    pub fn finish(self) -> Vec<SyntaxError> {
        let mut errors: Vec<SyntaxError> = self
            .tokens
            .finish()
            .into_iter()
            .map(SyntaxError::Lexer)
            .chain(self.errors.into_iter().map(SyntaxError::Parser))
            .collect();

        errors.sort_by_key(|error| error.span().start);
        errors
    }

    // ---- token access ----

    /// The next token, skipping doc comments that aren't attached to anything.
    fn peek(&mut self) -> Token {
        if self.aborted {
            return self.eof_token();
        }

        loop {
            let token = self.tokens.peek();
            if !matches!(token.kind, TokenKind::DocComment { .. }) {
                return token;
            }

            log::trace!("skipping stray doc comment at {:?}", token.span);
            self.tokens.advance();
        }
    }

    fn peek_raw(&mut self) -> Token {
        if self.aborted {
            self.eof_token()
        } else {
            self.tokens.peek()
        }
    }

    /// Lookahead past the next token, without skipping doc comments.
    fn peek_nth(&mut self, n: usize) -> TokenKind {
        if self.aborted {
            TokenKind::Eof
        } else {
            self.tokens.peek_nth(n).kind
        }
    }

    fn advance(&mut self) -> Token {
        let token = self.peek();
        if token.kind != TokenKind::Eof {
            self.tokens.advance();
        }
        token
    }

    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.peek().kind == kind {
            self.advance();
            true
        } else {
            false
        }
    }

    fn eat_keyword(&mut self, kw: Keyword) -> bool {
        self.eat(TokenKind::Keyword(kw))
    }

    fn at(&mut self, kind: TokenKind) -> bool {
        self.peek().kind == kind
    }

    fn at_keyword(&mut self, kw: Keyword) -> bool {
        self.peek().kind.is_keyword(kw)
    }

    fn at_end(&mut self) -> bool {
        self.at(TokenKind::Eof)
    }

    fn eof_token(&self) -> Token {
        Token {
            kind: TokenKind::Eof,
            span: self.tokens.eof_span(),
        }
    }

    fn prev_span(&self) -> Span {
        self.tokens.prev_span()
    }

    /// Span from `start` to the end of the last consumed token.
    fn span_from(&self, start: Span) -> Span {
        let end = self.prev_span().end.max(start.start);
        Span::new(start.start, end)
    }

    // ---- shared helpers ----

    fn expect(&mut self, kind: TokenKind) -> ParseResult<Token> {
        let token = self.peek();
        if token.kind == kind {
            self.advance();
            Ok(token)
        } else {
            Err(self.error_expected(kind.to_string()))
        }
    }

    fn expect_or_recover(&mut self, kind: TokenKind) {
        if let Err(error) = self.expect(kind) {
            self.report(error);
        }
    }

    fn parse_ident(&mut self) -> ParseResult<Ident> {
        match self.peek() {
            Token {
                kind: TokenKind::Identifier(name),
                span,
            } => {
                self.advance();
                Ok(Ident { name, span })
            }
            _ => Err(self.error_expected("an identifier")),
        }
    }

    fn parse_path(&mut self) -> ParseResult<Path> {
        let first = self.parse_ident()?;
        let mut segments = vec![first];

        while self.at(TokenKind::Dot) && matches!(self.peek_nth(1), TokenKind::Identifier(_)) {
            self.advance();
            segments.push(self.parse_ident()?);
        }

        Ok(Path {
            segments,
            span: self.span_from(first.span),
        })
    }

    /// Text of the doc comments at the current position, one line each.
    fn docstring(&mut self, module: bool) -> Option<String> {
        let mut lines = vec![];

        while let Token {
            kind: TokenKind::DocComment { module: m },
            span,
        } = self.peek_raw()
        {
            if m != module {
                break;
            }

            let text = &self.tokens.source()[span.as_range()];
            let text = text[3..].trim_end_matches('\r');
            lines.push(text.strip_prefix(' ').unwrap_or(text).to_owned());

            self.tokens.advance();
        }

        (!lines.is_empty()).then(|| lines.join("\n"))
    }

    /// Parse a comma-separated list up to and including `close`. Returns
    /// whether there was a trailing comma.
    ///
    /// Recovery never runs past the start of the next item, so an unclosed
    /// list costs at most the item it is in.
    fn parse_list<T>(
        &mut self,
        close: TokenKind,
        mut parse: impl FnMut(&mut Self) -> ParseResult<T>,
    ) -> (Vec<T>, bool) {
        let mut items = vec![];
        let mut trailing = false;

        while !self.at(close) && !self.at_end() {
            match parse(self) {
                Ok(item) => items.push(item),
                Err(error) => {
                    self.report(error);
                    if !self.seek_in_item(|kind| kind == TokenKind::Comma || kind == close) {
                        self.cut_off = Some(self.peek_raw().span);
                        return (items, false);
                    }
                }
            }

            trailing = self.eat(TokenKind::Comma);
            if !trailing {
                break;
            }
        }

        if let Err(error) = self.expect(close) {
            self.report(error);

            if self.seek_in_item(|kind| kind == close) {
                self.advance();
            } else {
                self.cut_off = Some(self.peek_raw().span);
            }
        }

        (items, trailing)
    }

    fn parse_or_recover<T>(
        &mut self,
        parse: impl FnOnce(&mut Self) -> ParseResult<T>,
        recover: impl FnOnce(&mut Self, Span) -> T,
    ) -> T {
        let (result, span) = self.parse_spanned(parse);
        match result {
            Ok(node) => node,
            Err(error) => {
                self.report(error);
                recover(self, span)
            }
        }
    }

    fn parse_spanned<T>(&mut self, f: impl FnOnce(&mut Self) -> T) -> (T, Span) {
        let start = self.peek().span;
        let node = f(self);
        (node, self.span_from(start))
    }

    fn nested<T>(&mut self, f: impl FnOnce(&mut Self) -> ParseResult<T>) -> ParseResult<T> {
        if self.depth >= self.config.max_nesting {
            let limit = self.config.max_nesting;
            let error = ParseError::new(ParseErrorKind::NestingTooDeep { limit }, self.peek().span);
            self.abort(error.clone());
            return Err(error);
        }

        self.depth += 1;
        let result = f(self);
        self.depth -= 1;

        result
    }

    fn in_loop<T>(&mut self, f: impl FnOnce(&mut Self) -> T) -> T {
        self.loop_depth += 1;
        let result = f(self);
        self.loop_depth -= 1;
        result
    }

    fn outside_loop<T>(&mut self, f: impl FnOnce(&mut Self) -> T) -> T {
        let loop_depth = mem::replace(&mut self.loop_depth, 0);
        let result = f(self);
        self.loop_depth = loop_depth;
        result
    }

    // ---- recovery ----

    fn seek_and_consume(&mut self, kind: TokenKind) {
        if self.seek(|k| k == kind) {
            self.advance();
        }
    }

    /// Skip tokens until `stop` accepts one outside of any delimiters opened
    /// along the way. Gives up before an unmatched closing delimiter or at
    /// the end of input.
    fn seek(&mut self, stop: impl FnMut(TokenKind) -> bool) -> bool {
        self.seek_until(stop, false)
    }

    /// Like [`Parser::seek`], but also gives up at the start of another item.
    fn seek_in_item(&mut self, stop: impl FnMut(TokenKind) -> bool) -> bool {
        self.seek_until(stop, true)
    }

    fn seek_until(&mut self, mut stop: impl FnMut(TokenKind) -> bool, items: bool) -> bool {
        let mut open = vec![];

        loop {
            let kind = self.peek_raw().kind;

            if open.is_empty() {
                if stop(kind) {
                    return true;
                }
                if items && self.at_item_start_raw() {
                    return false;
                }
            }

            match kind {
                TokenKind::Eof => return false,

                TokenKind::LParen | TokenKind::LBracket | TokenKind::LBrace => open.push(kind),

                TokenKind::RParen | TokenKind::RBracket | TokenKind::RBrace => {
                    if open.pop().is_none() {
                        return false;
                    }
                }

                _ => {}
            }

            self.tokens.advance();
        }
    }

    /// Whether the next raw token can only begin a new item. `fun` followed
    /// by `(` is a function type and `pub` may be a field's visibility, so
    /// those need another token of context.
    fn at_item_start_raw(&mut self) -> bool {
        match self.peek_raw().kind {
            TokenKind::DocComment { module: false } => true,
            TokenKind::Keyword(Keyword::Fun) => {
                matches!(self.peek_nth(1), TokenKind::Identifier(_))
            }
            TokenKind::Keyword(Keyword::Pub) => {
                matches!(self.peek_nth(1), TokenKind::Keyword(next) if next.starts_item())
            }
            TokenKind::Keyword(kw) => kw.starts_item(),
            _ => false,
        }
    }

    // ---- errors ----

    fn error_expected(&mut self, expected: impl Into<String>) -> ParseError {
        let token = self.peek();
        ParseError::new(
            ParseErrorKind::Expected {
                expected: expected.into(),
                found: token.kind,
            },
            token.span,
        )
    }

    fn report(&mut self, error: ParseError) {
        if self.aborted {
            return;
        }

        if let ParseErrorKind::Expected { found, .. } = error.kind {
            // The lexer has already reported these.
            if let TokenKind::Error(_) = found {
                return;
            }

            if self.cut_off == Some(error.span) {
                log::trace!("follow-on error at {:?}: {}", error.span, error.kind);
                return;
            }
        }

        if self.errors.len() >= self.config.max_errors {
            let limit = self.config.max_errors;
            self.abort(ParseError::new(ParseErrorKind::TooManyErrors { limit }, error.span));
            return;
        }

        log::debug!("parse error at {:?}: {}", error.span, error.kind);
        self.errors.push(error);
    }

    /// Report a final error and stop consuming input. From here on the parser
    /// sees end of file, so every rule unwinds with what it has.
    fn abort(&mut self, error: ParseError) {
        if self.aborted {
            return;
        }

        log::debug!("aborting parse: {}", error.kind);
        self.errors.push(error);
        self.aborted = true;
    }
}

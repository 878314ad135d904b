use std::collections::VecDeque;

use starling_diagnostic::span::Span;

use crate::lexer::{Lexer, LexerError};
use crate::token::{Token, TokenKind};

/// Lookahead over a [`Lexer`]. Tokens are lexed lazily as far ahead as they
/// are peeked.
pub struct TokenStream<'a> {
    lexer: Lexer<'a>,
    lookahead: VecDeque<Token>,

    prev_span: Span,
    consumed: usize,
}

impl<'a> TokenStream<'a> {
    pub fn new(lexer: Lexer<'a>) -> Self {
        Self {
            lexer,
            lookahead: VecDeque::new(),

            prev_span: Span::empty(0),
            consumed: 0,
        }
    }

    pub fn source(&self) -> &'a str {
        self.lexer.source()
    }

    pub fn peek(&mut self) -> Token {
        self.peek_nth(0)
    }

    pub fn peek_nth(&mut self, n: usize) -> Token {
        while self.lookahead.len() <= n {
            let token = self.lexer.next_token();
            self.lookahead.push_back(token);
        }

        self.lookahead[n]
    }

    pub fn peek_kind(&mut self) -> TokenKind {
        self.peek().kind
    }

    pub fn peek_span(&mut self) -> Span {
        self.peek().span
    }

    /// Consume and return the next token. At the end this keeps returning
    /// [`TokenKind::Eof`].
    pub fn advance(&mut self) -> Token {
        let token = self
            .lookahead
            .pop_front()
            .unwrap_or_else(|| self.lexer.next_token());

        if token.kind != TokenKind::Eof {
            self.prev_span = token.span;
            self.consumed += 1;
        }

        token
    }

    pub fn eat(&mut self, kind: TokenKind) -> bool {
        if self.peek_kind() == kind {
            self.advance();
            true
        } else {
            false
        }
    }

    pub fn at_end(&mut self) -> bool {
        self.peek_kind() == TokenKind::Eof
    }

    /// Span of the last consumed token.
    pub fn prev_span(&self) -> Span {
        self.prev_span
    }

    pub fn eof_span(&self) -> Span {
        Span::empty(self.source().len())
    }

    /// Number of tokens consumed so far, used to check that recovery makes
    /// progress.
    pub fn consumed(&self) -> usize {
        self.consumed
    }

    pub fn finish(self) -> Vec<LexerError> {
        self.lexer.finish()
    }
}

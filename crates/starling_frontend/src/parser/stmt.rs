use super::expr::Restrictions;
use super::{ParseError, ParseErrorKind, ParseResult, Parser};
use crate::ast::*;
use crate::token::*;

impl Parser<'_> {
    /// Always produces a statement. On error, skips past the next `;` or up
    /// to the enclosing `}`.
    pub(crate) fn parse_stmt(&mut self) -> Stmt {
        let (result, span) = self.parse_spanned(Self::parse_stmt_kind);

        match result {
            Ok(kind) => Stmt::new(kind, span),
            Err(error) => {
                self.report(error);
                self.seek_and_consume(TokenKind::Semicolon);

                log::trace!("recovered statement at {:?}", self.prev_span());
                Stmt::new(StmtKind::ParseError, self.span_from(span))
            }
        }
    }

    fn parse_stmt_kind(&mut self) -> ParseResult<StmtKind> {
        let token = self.peek();

        match token.kind {
            TokenKind::Semicolon => {
                self.advance();
                Ok(StmtKind::Empty)
            }

            TokenKind::Keyword(Keyword::Let) => self.parse_let(),

            TokenKind::Keyword(Keyword::Return) => {
                self.advance();

                let value = if self.at(TokenKind::Semicolon) || self.at_block_end() {
                    None
                } else {
                    Some(self.parse_expr()?)
                };

                self.end_stmt();
                Ok(StmtKind::Return(value))
            }

            TokenKind::Keyword(Keyword::Break) => {
                self.advance();
                if self.loop_depth == 0 {
                    self.report(ParseError::new(ParseErrorKind::BreakOutsideLoop, token.span));
                }

                self.end_stmt();
                Ok(StmtKind::Break)
            }

            TokenKind::Keyword(Keyword::Continue) => {
                self.advance();
                if self.loop_depth == 0 {
                    self.report(ParseError::new(ParseErrorKind::ContinueOutsideLoop, token.span));
                }

                self.end_stmt();
                Ok(StmtKind::Continue)
            }

            TokenKind::Keyword(Keyword::Defer) => {
                self.advance();

                let expr = self.parse_expr_with(Restrictions::STMT)?;
                if !self.eat(TokenKind::Semicolon) && !expr.kind.is_block_like() {
                    let error = self.error_expected(TokenKind::Semicolon.to_string());
                    self.report(error);
                }

                Ok(StmtKind::Defer(expr))
            }

            _ => {
                let expr = self.parse_expr_with(Restrictions::STMT)?;
                let has_semicolon = self.eat(TokenKind::Semicolon);

                // Without a `;` this is either the block's tail expression or
                // a mistake.
                if !has_semicolon && !expr.kind.is_block_like() && !self.at_block_end() {
                    let error = self.error_expected(TokenKind::Semicolon.to_string());
                    self.report(error);
                }

                Ok(StmtKind::Expr {
                    expr,
                    has_semicolon,
                })
            }
        }
    }

    fn parse_let(&mut self) -> ParseResult<StmtKind> {
        self.expect(TokenKind::Keyword(Keyword::Let))?;

        let pattern = self.parse_pattern()?;
        if pattern.is_refutable() {
            self.report(ParseError::new(
                ParseErrorKind::RefutablePattern {
                    context: "`let` binding",
                },
                pattern.span,
            ));
        }

        let ty = if self.eat(TokenKind::Colon) {
            Some(self.parse_type()?)
        } else {
            None
        };

        self.expect(TokenKind::Eq)?;
        let value = self.parse_expr()?;
        self.expect_or_recover(TokenKind::Semicolon);

        Ok(StmtKind::Let { pattern, ty, value })
    }

    /// `;`, which may be left out before the end of a block.
    fn end_stmt(&mut self) {
        if !self.eat(TokenKind::Semicolon) && !self.at_block_end() {
            let error = self.error_expected(TokenKind::Semicolon.to_string());
            self.report(error);
        }
    }

    fn at_block_end(&mut self) -> bool {
        self.at(TokenKind::RBrace) || self.at_end()
    }
}

use super::{ParseError, ParseErrorKind, ParseResult, Parser};
use crate::ast::*;
use crate::token::*;

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Prec {
    Lowest,

    Assign,

    Or,
    And,

    Comparison,

    BitOr,
    BitXor,
    BitAnd,
    Shift,

    Term,
    Factor,
    Power,

    Cast,
    Unary,
}

#[derive(Clone, Copy)]
enum Infix {
    Binary(BinOp),
    Assign(Option<BinOp>),
    Cast,
}

impl Infix {
    fn prec(self) -> Prec {
        match self {
            Infix::Assign(_) => Prec::Assign,
            Infix::Cast => Prec::Cast,
            Infix::Binary(op) => match op {
                BinOp::Or => Prec::Or,
                BinOp::And => Prec::And,

                BinOp::Eq | BinOp::NotEq | BinOp::Lt | BinOp::LtEq | BinOp::Gt | BinOp::GtEq => {
                    Prec::Comparison
                }

                BinOp::BitOr => Prec::BitOr,
                BinOp::BitXor => Prec::BitXor,
                BinOp::BitAnd => Prec::BitAnd,
                BinOp::Shl | BinOp::Shr => Prec::Shift,

                BinOp::Add | BinOp::Sub => Prec::Term,
                BinOp::Mul | BinOp::Div | BinOp::Mod => Prec::Factor,
                BinOp::Pow => Prec::Power,
            },
        }
    }

    fn is_right_assoc(self) -> bool {
        matches!(self, Infix::Assign(_) | Infix::Binary(BinOp::Pow))
    }

    fn binds_tighter_than(self, in_prec: Prec) -> bool {
        let prec = self.prec();
        prec > in_prec || self.is_right_assoc() && prec == in_prec
    }
}

/// Context that changes how an expression is parsed.
#[derive(Debug, Clone, Copy, Default)]
pub struct Restrictions {
    /// Don't treat `Path {` as a struct literal, as in `if x == y { ... }`.
    pub no_struct: bool,
    /// The expression starts a statement, so a block-like expression ends it.
    pub stmt_start: bool,
}

impl Restrictions {
    pub const NO_STRUCT: Self = Self {
        no_struct: true,
        stmt_start: false,
    };

    pub const STMT: Self = Self {
        no_struct: false,
        stmt_start: true,
    };

    fn operand(self) -> Self {
        Self {
            stmt_start: false,
            ..self
        }
    }
}

impl Parser<'_> {
    pub(crate) fn parse_expr(&mut self) -> ParseResult<Expr> {
        self.parse_expr_with(Restrictions::default())
    }

    pub(super) fn parse_expr_with(&mut self, r: Restrictions) -> ParseResult<Expr> {
        self.parse_prec(Prec::Lowest, r)
    }

    fn parse_prec(&mut self, prec: Prec, r: Restrictions) -> ParseResult<Expr> {
        self.nested(|parser| {
            let mut expr = parser.parse_unary(r)?;

            if r.stmt_start && expr.kind.is_block_like() {
                return Ok(expr);
            }

            while let Some(infix) = parser.peek_infix() {
                if !infix.binds_tighter_than(prec) {
                    break;
                }

                let op_token = parser.advance();

                expr = match infix {
                    Infix::Cast => {
                        let ty = parser.parse_type()?;
                        let span = expr.span.to(ty.span);
                        Expr::new(
                            ExprKind::Cast {
                                expr: Box::new(expr),
                                ty,
                            },
                            span,
                        )
                    }

                    Infix::Binary(op) => {
                        if op.is_comparison() && is_comparison(&expr) {
                            parser.report(ParseError::new(
                                ParseErrorKind::ChainedComparison,
                                expr.span.to(op_token.span),
                            ));
                        }

                        let rhs = parser.parse_prec(infix.prec(), r.operand())?;
                        let span = expr.span.to(rhs.span);
                        Expr::new(
                            ExprKind::Binary {
                                op,
                                lhs: Box::new(expr),
                                rhs: Box::new(rhs),
                            },
                            span,
                        )
                    }

                    Infix::Assign(op) => {
                        let rhs = parser.parse_prec(infix.prec(), r.operand())?;
                        let span = expr.span.to(rhs.span);
                        Expr::new(
                            ExprKind::Assign {
                                op,
                                lhs: Box::new(expr),
                                rhs: Box::new(rhs),
                            },
                            span,
                        )
                    }
                };
            }

            Ok(expr)
        })
    }

    fn peek_infix(&mut self) -> Option<Infix> {
        let infix = match self.peek().kind {
            TokenKind::Eq => Infix::Assign(None),
            TokenKind::PlusEq => Infix::Assign(Some(BinOp::Add)),
            TokenKind::MinusEq => Infix::Assign(Some(BinOp::Sub)),
            TokenKind::StarEq => Infix::Assign(Some(BinOp::Mul)),
            TokenKind::SlashEq => Infix::Assign(Some(BinOp::Div)),
            TokenKind::PercentEq => Infix::Assign(Some(BinOp::Mod)),
            TokenKind::AmpEq => Infix::Assign(Some(BinOp::BitAnd)),
            TokenKind::PipeEq => Infix::Assign(Some(BinOp::BitOr)),
            TokenKind::CaretEq => Infix::Assign(Some(BinOp::BitXor)),
            TokenKind::LtLtEq => Infix::Assign(Some(BinOp::Shl)),
            TokenKind::GtGtEq => Infix::Assign(Some(BinOp::Shr)),

            TokenKind::PipePipe => Infix::Binary(BinOp::Or),
            TokenKind::AmpAmp => Infix::Binary(BinOp::And),

            TokenKind::EqEq => Infix::Binary(BinOp::Eq),
            TokenKind::BangEq => Infix::Binary(BinOp::NotEq),
            TokenKind::Lt => Infix::Binary(BinOp::Lt),
            TokenKind::LtEq => Infix::Binary(BinOp::LtEq),
            TokenKind::Gt => Infix::Binary(BinOp::Gt),
            TokenKind::GtEq => Infix::Binary(BinOp::GtEq),

            TokenKind::Pipe => Infix::Binary(BinOp::BitOr),
            TokenKind::Caret => Infix::Binary(BinOp::BitXor),
            TokenKind::Amp => Infix::Binary(BinOp::BitAnd),
            TokenKind::LtLt => Infix::Binary(BinOp::Shl),
            TokenKind::GtGt => Infix::Binary(BinOp::Shr),

            TokenKind::Plus => Infix::Binary(BinOp::Add),
            TokenKind::Minus => Infix::Binary(BinOp::Sub),
            TokenKind::Star => Infix::Binary(BinOp::Mul),
            TokenKind::Slash => Infix::Binary(BinOp::Div),
            TokenKind::Percent => Infix::Binary(BinOp::Mod),
            TokenKind::StarStar => Infix::Binary(BinOp::Pow),

            TokenKind::Keyword(Keyword::As) => Infix::Cast,

            _ => return None,
        };

        Some(infix)
    }

    fn parse_unary(&mut self, r: Restrictions) -> ParseResult<Expr> {
        let op = match self.peek().kind {
            TokenKind::Minus => PrefixOp::Neg,
            TokenKind::Bang => PrefixOp::Not,
            TokenKind::Tilde => PrefixOp::BitNot,
            TokenKind::PlusPlus => PrefixOp::PreIncrement,
            TokenKind::MinusMinus => PrefixOp::PreDecrement,
            _ => return self.parse_postfix(r),
        };

        let op_token = self.advance();
        let expr = self.parse_prec(Prec::Unary, r.operand())?;

        let span = op_token.span.to(expr.span);
        Ok(Expr::new(
            ExprKind::Prefix {
                op,
                expr: Box::new(expr),
            },
            span,
        ))
    }

    fn parse_postfix(&mut self, r: Restrictions) -> ParseResult<Expr> {
        let mut expr = self.parse_primary(r)?;

        if r.stmt_start && expr.kind.is_block_like() {
            return Ok(expr);
        }

        loop {
            let start = expr.span;

            let kind = match self.peek().kind {
                TokenKind::LParen => {
                    self.advance();
                    let (args, _) = self.parse_list(TokenKind::RParen, Self::parse_expr);
                    ExprKind::Call {
                        callee: Box::new(expr),
                        args,
                    }
                }

                TokenKind::LBracket => {
                    self.advance();
                    let index = self.parse_expr()?;
                    self.expect(TokenKind::RBracket)?;
                    ExprKind::Index {
                        expr: Box::new(expr),
                        index: Box::new(index),
                    }
                }

                TokenKind::Dot => {
                    self.advance();
                    let field = match self.parse_ident() {
                        Ok(field) => field,
                        Err(_) => return Err(self.error_expected("a field name")),
                    };
                    ExprKind::Field {
                        expr: Box::new(expr),
                        field,
                    }
                }

                TokenKind::PlusPlus | TokenKind::MinusMinus | TokenKind::Question => {
                    let op = match self.advance().kind {
                        TokenKind::PlusPlus => PostfixOp::PostIncrement,
                        TokenKind::MinusMinus => PostfixOp::PostDecrement,
                        _ => PostfixOp::Try,
                    };
                    ExprKind::Postfix {
                        op,
                        expr: Box::new(expr),
                    }
                }

                TokenKind::LBrace if !r.no_struct && self.at_struct_body() => {
                    let Some(path) = expr_as_path(&expr) else {
                        break;
                    };

                    self.advance();
                    let (fields, _) = self.parse_list(TokenKind::RBrace, Self::parse_field_init);
                    ExprKind::Struct { path, fields }
                }

                _ => break,
            };

            expr = Expr::new(kind, self.span_from(start));
        }

        Ok(expr)
    }

    /// Called at `{`: `{}`, `{ a: ...`, `{ a, ...` or `{ a }`.
    fn at_struct_body(&mut self) -> bool {
        match self.peek_nth(1) {
            TokenKind::RBrace => true,
            TokenKind::Identifier(_) => matches!(
                self.peek_nth(2),
                TokenKind::Colon | TokenKind::Comma | TokenKind::RBrace
            ),
            _ => false,
        }
    }

    fn parse_field_init(&mut self) -> ParseResult<FieldInit> {
        let name = self.parse_ident()?;

        let value = if self.eat(TokenKind::Colon) {
            Some(self.parse_expr()?)
        } else {
            None
        };

        Ok(FieldInit {
            name,
            value,
            span: self.span_from(name.span),
        })
    }

    fn parse_primary(&mut self, r: Restrictions) -> ParseResult<Expr> {
        let token = self.peek();

        if let Some(lit) = self.parse_literal() {
            return Ok(Expr::new(ExprKind::Literal(lit), token.span));
        }

        match token.kind {
            TokenKind::Integer(None) => {
                self.advance();
                self.report(ParseError::new(ParseErrorKind::IntegerTooLarge, token.span));
                Ok(Expr::new(ExprKind::ParseError, token.span))
            }

            TokenKind::Error(_) => {
                self.advance();
                Ok(Expr::new(ExprKind::ParseError, token.span))
            }

            TokenKind::Identifier(name) => {
                self.advance();
                Ok(Expr::new(ExprKind::Identifier(name), token.span))
            }

            TokenKind::Underscore => {
                self.advance();
                Ok(Expr::new(ExprKind::Underscore, token.span))
            }

            TokenKind::LParen => {
                self.advance();
                let (mut exprs, trailing) = self.parse_list(TokenKind::RParen, Self::parse_expr);

                let kind = if exprs.len() == 1 && !trailing {
                    ExprKind::Parenthesized(Box::new(exprs.remove(0)))
                } else {
                    ExprKind::Tuple(exprs)
                };

                Ok(Expr::new(kind, self.span_from(token.span)))
            }

            TokenKind::LBracket => {
                self.advance();
                let (exprs, _) = self.parse_list(TokenKind::RBracket, Self::parse_expr);
                Ok(Expr::new(ExprKind::List(exprs), self.span_from(token.span)))
            }

            TokenKind::LBrace => {
                let block = self.parse_block()?;
                let span = block.span;
                Ok(Expr::new(ExprKind::Block(block), span))
            }

            TokenKind::Pipe | TokenKind::PipePipe => self.parse_lambda(r),

            TokenKind::Keyword(Keyword::If) => self.parse_if(),
            TokenKind::Keyword(Keyword::Match) => self.parse_match(),

            TokenKind::Keyword(Keyword::While) => {
                self.advance();
                let cond = self.parse_expr_with(Restrictions::NO_STRUCT)?;
                let body = self.in_loop(Self::parse_block)?;
                Ok(Expr::new(
                    ExprKind::While {
                        cond: Box::new(cond),
                        body,
                    },
                    self.span_from(token.span),
                ))
            }

            TokenKind::Keyword(Keyword::Loop) => {
                self.advance();
                let body = self.in_loop(Self::parse_block)?;
                Ok(Expr::new(ExprKind::Loop(body), self.span_from(token.span)))
            }

            TokenKind::Keyword(Keyword::For) => {
                self.advance();
                let pattern = self.parse_pattern()?;
                self.expect(TokenKind::Keyword(Keyword::In))?;
                let iterable = self.parse_expr_with(Restrictions::NO_STRUCT)?;
                let body = self.in_loop(Self::parse_block)?;
                Ok(Expr::new(
                    ExprKind::For {
                        pattern,
                        iterable: Box::new(iterable),
                        body,
                    },
                    self.span_from(token.span),
                ))
            }

            _ => Err(self.error_expected("an expression")),
        }
    }

    /// Consume a literal token. Integers that don't fit are left for the
    /// caller to report.
    pub(super) fn parse_literal(&mut self) -> Option<Literal> {
        let lit = match self.peek().kind {
            TokenKind::Integer(Some(n)) => Literal::Integer(n),
            TokenKind::Float(f) => Literal::Float(f),
            TokenKind::Char(c) => Literal::Char(c),
            TokenKind::String(s) => Literal::String(s),
            TokenKind::Bool(b) => Literal::Bool(b),
            _ => return None,
        };

        self.advance();
        Some(lit)
    }

    pub(super) fn parse_block(&mut self) -> ParseResult<Block> {
        self.nested(|parser| {
            let open = parser.expect(TokenKind::LBrace)?;

            let mut stmts = vec![];
            while !parser.at(TokenKind::RBrace) && !parser.at_end() {
                let consumed = parser.tokens.consumed();

                stmts.push(parser.parse_stmt());

                // always skip at least one token
                if parser.tokens.consumed() == consumed {
                    parser.advance();
                }
            }

            parser.expect_or_recover(TokenKind::RBrace);

            Ok(Block {
                stmts,
                span: parser.span_from(open.span),
            })
        })
    }

    fn parse_if(&mut self) -> ParseResult<Expr> {
        let if_token = self.expect(TokenKind::Keyword(Keyword::If))?;

        let cond = self.parse_expr_with(Restrictions::NO_STRUCT)?;
        let then = self.parse_block()?;

        let else_ = if self.eat_keyword(Keyword::Else) {
            let else_expr = if self.at_keyword(Keyword::If) {
                self.parse_if()?
            } else {
                let block = self.parse_block()?;
                let span = block.span;
                Expr::new(ExprKind::Block(block), span)
            };
            Some(Box::new(else_expr))
        } else {
            None
        };

        Ok(Expr::new(
            ExprKind::If {
                cond: Box::new(cond),
                then,
                else_,
            },
            self.span_from(if_token.span),
        ))
    }

    fn parse_match(&mut self) -> ParseResult<Expr> {
        let match_token = self.expect(TokenKind::Keyword(Keyword::Match))?;

        let scrutinee = self.parse_expr_with(Restrictions::NO_STRUCT)?;
        self.expect(TokenKind::LBrace)?;

        let mut arms = vec![];
        while !self.at(TokenKind::RBrace) && !self.at_end() {
            let consumed = self.tokens.consumed();

            let arm = self.parse_or_recover(
                |parser| parser.parse_match_arm().map(Some),
                |parser, _| {
                    parser.seek(|kind| kind == TokenKind::Comma);
                    None
                },
            );

            let needs_comma = match &arm {
                Some(arm) => !arm.body.kind.is_block_like(),
                None => true,
            };

            if let Some(arm) = arm {
                arms.push(arm);
            }

            if !self.eat(TokenKind::Comma) {
                if needs_comma && !self.at(TokenKind::RBrace) {
                    let error = self.error_expected("`,` or `}`");
                    self.report(error);
                }

                if self.tokens.consumed() == consumed {
                    self.advance();
                }
            }
        }

        self.expect_or_recover(TokenKind::RBrace);

        Ok(Expr::new(
            ExprKind::Match {
                scrutinee: Box::new(scrutinee),
                arms,
            },
            self.span_from(match_token.span),
        ))
    }

    fn parse_match_arm(&mut self) -> ParseResult<MatchArm> {
        let pattern = self.parse_pattern()?;
        self.expect(TokenKind::Arrow)?;
        let body = self.parse_expr()?;

        let span = pattern.span.to(body.span);
        Ok(MatchArm {
            pattern,
            body,
            span,
        })
    }

    fn parse_lambda(&mut self, r: Restrictions) -> ParseResult<Expr> {
        let start = self.peek().span;

        let params = if self.eat(TokenKind::PipePipe) {
            vec![]
        } else {
            self.expect(TokenKind::Pipe)?;
            let (params, _) = self.parse_list(TokenKind::Pipe, Self::parse_lambda_param);
            params
        };

        let return_type = if self.eat(TokenKind::Colon) {
            Some(self.parse_type()?)
        } else {
            None
        };

        let body = self.outside_loop(|parser| parser.parse_prec(Prec::Lowest, r.operand()))?;

        Ok(Expr::new(
            ExprKind::Lambda {
                params,
                return_type,
                body: Box::new(body),
            },
            self.span_from(start),
        ))
    }

    fn parse_lambda_param(&mut self) -> ParseResult<LambdaParam> {
        let pattern = self.parse_pattern_no_or()?;

        let ty = if self.eat(TokenKind::Colon) {
            Some(self.parse_type()?)
        } else {
            None
        };

        Ok(LambdaParam {
            span: self.span_from(pattern.span),
            pattern,
            ty,
        })
    }
}

fn is_comparison(expr: &Expr) -> bool {
    matches!(&expr.kind, ExprKind::Binary { op, .. } if op.is_comparison())
}

/// `a` or `a.b.c`, as the head of a struct literal.
fn expr_as_path(expr: &Expr) -> Option<Path> {
    match &expr.kind {
        ExprKind::Identifier(name) => Some(Path::single(Ident {
            name: *name,
            span: expr.span,
        })),

        ExprKind::Field { expr: inner, field } => {
            let mut path = expr_as_path(inner)?;
            path.segments.push(*field);
            path.span = expr.span;
            Some(path)
        }

        _ => None,
    }
}

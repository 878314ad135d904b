use starling_diagnostic::span::Span;

use super::{ParseError, ParseErrorKind, ParseResult, Parser};
use crate::ast::*;
use crate::token::*;

#[derive(Clone, Copy)]
struct PatternFlags {
    /// `..` is only allowed as an element of a tuple, tuple-like or list
    /// pattern.
    allow_rest: bool,
    allow_or: bool,
}

impl PatternFlags {
    const TOP: Self = Self {
        allow_rest: false,
        allow_or: true,
    };

    const NO_OR: Self = Self {
        allow_rest: false,
        allow_or: false,
    };

    const ELEMENT: Self = Self {
        allow_rest: true,
        allow_or: true,
    };
}

enum StructPatternItem {
    Field(FieldPattern),
    Rest(Span),
}

impl Parser<'_> {
    pub(crate) fn parse_pattern(&mut self) -> ParseResult<Pattern> {
        self.parse_pattern_with(PatternFlags::TOP)
    }

    /// A pattern that doesn't swallow a following `|`, as in lambda
    /// parameters and function parameters.
    pub(super) fn parse_pattern_no_or(&mut self) -> ParseResult<Pattern> {
        self.parse_pattern_with(PatternFlags::NO_OR)
    }

    fn parse_pattern_with(&mut self, flags: PatternFlags) -> ParseResult<Pattern> {
        self.nested(|parser| {
            let first = parser.parse_single_pattern(flags)?;

            if !flags.allow_or || !parser.at(TokenKind::Pipe) {
                return Ok(first);
            }

            let start = first.span;
            let mut alternatives = vec![first];
            while parser.eat(TokenKind::Pipe) {
                alternatives.push(parser.parse_single_pattern(PatternFlags::NO_OR)?);
            }

            Ok(Pattern::new(
                PatternKind::Or(alternatives),
                parser.span_from(start),
            ))
        })
    }

    fn parse_single_pattern(&mut self, flags: PatternFlags) -> ParseResult<Pattern> {
        let token = self.peek();

        if let Some(lit) = self.parse_literal() {
            return Ok(Pattern::new(
                PatternKind::Literal {
                    lit,
                    negative: false,
                },
                token.span,
            ));
        }

        match token.kind {
            TokenKind::Integer(None) => {
                self.advance();
                self.report(ParseError::new(ParseErrorKind::IntegerTooLarge, token.span));
                Ok(Pattern::new(PatternKind::ParseError, token.span))
            }

            TokenKind::Minus => {
                self.advance();

                let number = self.peek();
                let lit = match number.kind {
                    TokenKind::Integer(Some(n)) => Literal::Integer(n),
                    TokenKind::Float(f) => Literal::Float(f),
                    TokenKind::Integer(None) => {
                        self.advance();
                        self.report(ParseError::new(ParseErrorKind::IntegerTooLarge, number.span));
                        return Ok(Pattern::new(
                            PatternKind::ParseError,
                            self.span_from(token.span),
                        ));
                    }
                    _ => return Err(self.error_expected("a number")),
                };

                self.advance();
                Ok(Pattern::new(
                    PatternKind::Literal {
                        lit,
                        negative: true,
                    },
                    self.span_from(token.span),
                ))
            }

            TokenKind::Underscore => {
                self.advance();
                Ok(Pattern::new(PatternKind::Wildcard, token.span))
            }

            TokenKind::DotDot => {
                self.advance();

                if flags.allow_rest {
                    Ok(Pattern::new(PatternKind::Rest, token.span))
                } else {
                    self.report(ParseError::new(
                        ParseErrorKind::RestPatternNotAllowed,
                        token.span,
                    ));
                    Ok(Pattern::new(PatternKind::ParseError, token.span))
                }
            }

            TokenKind::Identifier(_) => self.parse_path_pattern(flags),

            TokenKind::LParen => {
                self.advance();
                let (mut elems, trailing) = self.parse_element_patterns(TokenKind::RParen);

                let kind = if elems.len() == 1 && !trailing && !elems[0].is_rest() {
                    PatternKind::Grouped(Box::new(elems.remove(0)))
                } else {
                    PatternKind::Tuple(elems)
                };

                Ok(Pattern::new(kind, self.span_from(token.span)))
            }

            TokenKind::LBracket => {
                self.advance();
                let (elems, _) = self.parse_element_patterns(TokenKind::RBracket);
                Ok(Pattern::new(
                    PatternKind::List(elems),
                    self.span_from(token.span),
                ))
            }

            TokenKind::Error(_) => {
                self.advance();
                Ok(Pattern::new(PatternKind::ParseError, token.span))
            }

            _ => Err(self.error_expected("a pattern")),
        }
    }

    fn parse_path_pattern(&mut self, flags: PatternFlags) -> ParseResult<Pattern> {
        let path = self.parse_path()?;
        let start = path.span;

        let kind = match (self.peek().kind, path.as_single()) {
            (TokenKind::LBrace, _) => {
                self.advance();
                return self.parse_struct_pattern(path);
            }

            (TokenKind::LParen, _) => {
                self.advance();
                let (elems, _) = self.parse_element_patterns(TokenKind::RParen);
                PatternKind::TupleLike { path, elems }
            }

            (TokenKind::At, Some(name)) => {
                self.advance();
                let sub = self.parse_single_pattern(PatternFlags {
                    allow_or: false,
                    ..flags
                })?;
                PatternKind::Identifier {
                    name,
                    sub: Some(Box::new(sub)),
                }
            }

            (_, Some(name)) => PatternKind::Identifier { name, sub: None },

            (_, None) => PatternKind::Path(path),
        };

        Ok(Pattern::new(kind, self.span_from(start)))
    }

    /// Called after the `{`.
    fn parse_struct_pattern(&mut self, path: Path) -> ParseResult<Pattern> {
        let (items, _) = self.parse_list(TokenKind::RBrace, |parser| {
            let token = parser.peek();
            if token.kind == TokenKind::DotDot {
                parser.advance();
                return Ok(StructPatternItem::Rest(token.span));
            }

            let name = parser.parse_ident()?;
            let pattern = if parser.eat(TokenKind::Colon) {
                Some(parser.parse_pattern()?)
            } else {
                None
            };

            Ok(StructPatternItem::Field(FieldPattern {
                name,
                pattern,
                span: parser.span_from(name.span),
            }))
        });

        let mut fields = vec![];
        let mut has_rest = false;

        for item in items {
            match item {
                StructPatternItem::Field(field) => fields.push(field),
                StructPatternItem::Rest(span) if has_rest => {
                    self.report(ParseError::new(ParseErrorKind::MultipleRestPatterns, span));
                }
                StructPatternItem::Rest(_) => has_rest = true,
            }
        }

        let span = self.span_from(path.span);
        Ok(Pattern::new(
            PatternKind::Struct {
                path,
                fields,
                has_rest,
            },
            span,
        ))
    }

    fn parse_element_patterns(&mut self, close: TokenKind) -> (Vec<Pattern>, bool) {
        let (elems, trailing) =
            self.parse_list(close, |parser| parser.parse_pattern_with(PatternFlags::ELEMENT));

        for rest in elems.iter().filter(|p| p.is_rest()).skip(1) {
            self.report(ParseError::new(ParseErrorKind::MultipleRestPatterns, rest.span));
        }

        (elems, trailing)
    }
}

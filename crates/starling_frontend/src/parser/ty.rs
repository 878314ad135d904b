use super::{ParseError, ParseErrorKind, ParseResult, Parser};
use crate::ast::*;
use crate::token::*;

impl Parser<'_> {
    pub(crate) fn parse_type(&mut self) -> ParseResult<Type> {
        self.nested(|parser| {
            let token = parser.peek();

            match token.kind {
                TokenKind::Identifier(_) => parser.parse_type_path(),

                TokenKind::LParen => {
                    parser.advance();
                    let (mut types, trailing) =
                        parser.parse_list(TokenKind::RParen, Self::parse_type);
                    let span = parser.span_from(token.span);

                    if types.len() == 1 && !trailing {
                        // just grouping
                        Ok(Type::new(types.remove(0).kind, span))
                    } else {
                        Ok(Type::new(TypeKind::Tuple(types), span))
                    }
                }

                TokenKind::Keyword(Keyword::Fun) => {
                    parser.advance();
                    parser.expect(TokenKind::LParen)?;
                    let (params, _) = parser.parse_list(TokenKind::RParen, Self::parse_type);

                    let ret = if parser.eat(TokenKind::Colon) {
                        Some(Box::new(parser.parse_type()?))
                    } else {
                        None
                    };

                    Ok(Type::new(
                        TypeKind::Function { params, ret },
                        parser.span_from(token.span),
                    ))
                }

                TokenKind::Keyword(Keyword::Dyn) => {
                    parser.advance();
                    let bounds = parser.parse_bounds()?;
                    Ok(Type::new(TypeKind::Dyn(bounds), parser.span_from(token.span)))
                }

                TokenKind::Underscore => {
                    parser.advance();
                    Ok(Type::new(TypeKind::Infer, token.span))
                }

                TokenKind::Error(_) => {
                    parser.advance();
                    Ok(Type::new(TypeKind::ParseError, token.span))
                }

                _ => Err(parser.error_expected("a type")),
            }
        })
    }

    /// `Path` or `Path[Args]`.
    fn parse_type_path(&mut self) -> ParseResult<Type> {
        let path = self.parse_path()?;

        let args = if self.at(TokenKind::LBracket) {
            let open = self.advance();
            let (args, _) = self.parse_list(TokenKind::RBracket, Self::parse_type);

            if args.is_empty() {
                self.report(ParseError::new(
                    ParseErrorKind::EmptyGenericList,
                    self.span_from(open.span),
                ));
            }

            args
        } else {
            vec![]
        };

        let span = self.span_from(path.span);
        Ok(Type::new(TypeKind::Path { path, args }, span))
    }

    /// `A + B[T] + ...`
    pub(super) fn parse_bounds(&mut self) -> ParseResult<Vec<Type>> {
        let mut bounds = vec![self.parse_type_path()?];
        while self.eat(TokenKind::Plus) {
            bounds.push(self.parse_type_path()?);
        }
        Ok(bounds)
    }

    /// `implements A, B`, or nothing.
    pub(super) fn parse_implements(&mut self) -> ParseResult<Vec<Type>> {
        let mut types = vec![];

        if self.eat_keyword(Keyword::Implements) {
            types.push(self.parse_type_path()?);
            while self.eat(TokenKind::Comma) {
                types.push(self.parse_type_path()?);
            }
        }

        Ok(types)
    }

    /// `[T: Bound = Default, ...]`, or nothing.
    pub(super) fn parse_generics(&mut self) -> Vec<GenericParam> {
        if !self.at(TokenKind::LBracket) {
            return vec![];
        }

        let open = self.advance();
        let (params, _) = self.parse_list(TokenKind::RBracket, Self::parse_generic_param);

        if params.is_empty() {
            self.report(ParseError::new(
                ParseErrorKind::EmptyGenericList,
                self.span_from(open.span),
            ));
        }

        params
    }

    fn parse_generic_param(&mut self) -> ParseResult<GenericParam> {
        let name = self.parse_ident()?;

        let bounds = if self.eat(TokenKind::Colon) {
            self.parse_bounds()?
        } else {
            vec![]
        };

        let default = if self.eat(TokenKind::Eq) {
            Some(self.parse_type()?)
        } else {
            None
        };

        Ok(GenericParam {
            name,
            bounds,
            default,
            span: self.span_from(name.span),
        })
    }

    /// `where T: A + B, U: C`, or nothing.
    pub(super) fn parse_where_clause(&mut self) -> ParseResult<Vec<WherePredicate>> {
        if !self.at_keyword(Keyword::Where) {
            return Ok(vec![]);
        }

        let where_span = self.advance().span;
        let mut predicates = vec![];

        while !matches!(
            self.peek().kind,
            TokenKind::LBrace | TokenKind::Semicolon | TokenKind::Eof
        ) {
            let ty = self.parse_type()?;
            self.expect(TokenKind::Colon)?;
            let bounds = self.parse_bounds()?;

            predicates.push(WherePredicate {
                span: self.span_from(ty.span),
                ty,
                bounds,
            });

            if !self.eat(TokenKind::Comma) {
                break;
            }
        }

        if predicates.is_empty() {
            self.report(ParseError::new(ParseErrorKind::EmptyWhereClause, where_span));
        }

        Ok(predicates)
    }
}

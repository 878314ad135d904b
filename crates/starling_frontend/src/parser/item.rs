use starling_diagnostic::span::Span;

use super::{ParseError, ParseErrorKind, ParseResult, Parser};
use crate::ast::*;
use crate::token::*;

/// What kind of body a member list belongs to.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Body {
    Struct,
    Enum,
    /// Only methods, as after a tuple struct.
    Methods,
    Interface,
}

enum Member {
    Field(Field),
    Variant(Variant),
    Method(Method),
}

#[derive(Default)]
struct Members {
    fields: Vec<Field>,
    variants: Vec<Variant>,
    methods: Vec<Method>,
}

impl Parser<'_> {
    pub(crate) fn parse_module(&mut self) -> Module {
        let docstring = self.docstring(true);

        let mut items = vec![];
        loop {
            let item_docstring = self.docstring(false);
            if self.at_end() {
                break;
            }

            let consumed = self.tokens.consumed();

            items.push(self.parse_item(item_docstring));

            // always skip at least one token
            if self.tokens.consumed() == consumed {
                self.advance();
            }
        }

        Module {
            docstring,
            items,
            span: Span::new(0, self.tokens.source().len()),
        }
    }

    /// Always produces an item. On error, skips to the start of the next one.
    pub(crate) fn parse_item(&mut self, docstring: Option<String>) -> Item {
        let (result, span) = self.parse_spanned(|parser| {
            let visibility = parser.parse_visibility();
            let kind = parser.parse_item_kind(visibility)?;
            Ok((visibility, kind))
        });

        match result {
            Ok((visibility, kind)) => Item {
                kind,
                visibility,
                docstring,
                span,
            },

            Err(error) => {
                self.report(error);
                self.seek(|kind| match kind {
                    TokenKind::Keyword(kw) => kw.starts_item(),
                    TokenKind::DocComment { .. } => true,
                    _ => false,
                });

                log::trace!("recovered item at {:?}", self.prev_span());

                Item {
                    kind: ItemKind::ParseError,
                    visibility: Visibility::Private,
                    docstring,
                    span: self.span_from(span),
                }
            }
        }
    }

    pub(crate) fn parse_documented_item(&mut self) -> Item {
        let docstring = self.docstring(false);
        self.parse_item(docstring)
    }

    fn parse_visibility(&mut self) -> Visibility {
        let token = self.peek();
        if self.eat_keyword(Keyword::Pub) {
            Visibility::Public(token.span)
        } else {
            Visibility::Private
        }
    }

    fn parse_item_kind(&mut self, visibility: Visibility) -> ParseResult<ItemKind> {
        match self.peek().kind {
            TokenKind::Keyword(Keyword::Import) => {
                self.advance();

                if let Visibility::Public(span) = visibility {
                    self.report(ParseError::new(
                        ParseErrorKind::UnnecessaryVisibility { context: "import" },
                        span,
                    ));
                }

                let path = self.parse_path()?;
                let alias = if self.eat_keyword(Keyword::As) {
                    Some(self.parse_ident()?)
                } else {
                    None
                };

                self.expect_or_recover(TokenKind::Semicolon);

                Ok(ItemKind::Import { path, alias })
            }

            TokenKind::Keyword(Keyword::Fun) => self.parse_function().map(ItemKind::Function),
            TokenKind::Keyword(Keyword::Struct) => self.parse_struct().map(ItemKind::Struct),
            TokenKind::Keyword(Keyword::Enum) => self.parse_enum().map(ItemKind::Enum),
            TokenKind::Keyword(Keyword::Interface) => {
                self.parse_interface().map(ItemKind::Interface)
            }

            TokenKind::Keyword(Keyword::Type) => {
                self.advance();

                let name = self.parse_ident()?;
                let generics = self.parse_generics();
                self.expect(TokenKind::Eq)?;
                let ty = self.parse_type()?;
                self.expect_or_recover(TokenKind::Semicolon);

                Ok(ItemKind::TypeAlias(TypeAlias { name, generics, ty }))
            }

            _ => Err(self.error_expected("an item")),
        }
    }

    fn parse_function(&mut self) -> ParseResult<Function> {
        self.expect(TokenKind::Keyword(Keyword::Fun))?;

        let name = self.parse_ident()?;
        let generics = self.parse_generics();

        self.expect(TokenKind::LParen)?;
        let (params, _) = self.parse_list(TokenKind::RParen, Self::parse_param);

        let return_type = if self.eat(TokenKind::Colon) {
            Some(self.parse_type()?)
        } else {
            None
        };

        let where_clause = self.parse_where_clause()?;

        let body = if self.eat(TokenKind::Semicolon) {
            None
        } else {
            Some(self.outside_loop(Self::parse_block)?)
        };

        Ok(Function {
            signature: Signature {
                name,
                generics,
                params,
                return_type,
                where_clause,
            },
            body,
        })
    }

    fn parse_param(&mut self) -> ParseResult<Param> {
        let token = self.peek();

        if token.kind == TokenKind::Identifier(self.self_name) {
            self.advance();

            let ty = if self.eat(TokenKind::Colon) {
                Some(self.parse_type()?)
            } else {
                None
            };

            return Ok(Param {
                kind: ParamKind::SelfParam { ty },
                span: self.span_from(token.span),
            });
        }

        let pattern = self.parse_pattern_no_or()?;
        if pattern.is_refutable() {
            self.report(ParseError::new(
                ParseErrorKind::RefutablePattern {
                    context: "function parameter",
                },
                pattern.span,
            ));
        }

        self.expect(TokenKind::Colon)?;
        let ty = self.parse_type()?;

        Ok(Param {
            kind: ParamKind::Regular { pattern, ty },
            span: self.span_from(token.span),
        })
    }

    fn parse_struct(&mut self) -> ParseResult<Struct> {
        self.expect(TokenKind::Keyword(Keyword::Struct))?;

        let name = self.parse_ident()?;
        let generics = self.parse_generics();

        let (kind, implements, where_clause, methods) = if self.eat(TokenKind::LParen) {
            let (fields, _) = self.parse_list(TokenKind::RParen, Self::parse_tuple_field);

            let implements = self.parse_implements()?;
            let where_clause = self.parse_where_clause()?;

            let methods = if self.eat(TokenKind::Semicolon) {
                vec![]
            } else {
                self.expect(TokenKind::LBrace)?;
                self.parse_members(Body::Methods).methods
            };

            (StructKind::Tuple(fields), implements, where_clause, methods)
        } else {
            let implements = self.parse_implements()?;
            let where_clause = self.parse_where_clause()?;

            if self.eat(TokenKind::Semicolon) {
                (StructKind::Unit, implements, where_clause, vec![])
            } else {
                self.expect(TokenKind::LBrace)?;
                let members = self.parse_members(Body::Struct);
                (
                    StructKind::Record(members.fields),
                    implements,
                    where_clause,
                    members.methods,
                )
            }
        };

        Ok(Struct {
            name,
            generics,
            kind,
            implements,
            where_clause,
            methods,
        })
    }

    fn parse_enum(&mut self) -> ParseResult<Enum> {
        self.expect(TokenKind::Keyword(Keyword::Enum))?;

        let name = self.parse_ident()?;
        let generics = self.parse_generics();
        let implements = self.parse_implements()?;
        let where_clause = self.parse_where_clause()?;

        self.expect(TokenKind::LBrace)?;
        let members = self.parse_members(Body::Enum);

        Ok(Enum {
            name,
            generics,
            implements,
            where_clause,
            variants: members.variants,
            methods: members.methods,
        })
    }

    fn parse_interface(&mut self) -> ParseResult<Interface> {
        self.expect(TokenKind::Keyword(Keyword::Interface))?;

        let name = self.parse_ident()?;
        let generics = self.parse_generics();

        let supertraits = if self.eat(TokenKind::Colon) {
            self.parse_bounds()?
        } else {
            vec![]
        };

        let where_clause = self.parse_where_clause()?;

        self.expect(TokenKind::LBrace)?;
        let members = self.parse_members(Body::Interface);

        Ok(Interface {
            name,
            generics,
            supertraits,
            where_clause,
            methods: members.methods,
        })
    }

    /// Called after the `{`. Consumes the closing `}`.
    fn parse_members(&mut self, body: Body) -> Members {
        let mut members = Members::default();

        loop {
            let docstring = self.docstring(false);
            if self.at(TokenKind::RBrace) || self.at_end() {
                break;
            }

            let consumed = self.tokens.consumed();

            match self.parse_member(body, docstring) {
                Ok(Member::Field(field)) => members.fields.push(field),
                Ok(Member::Variant(variant)) => members.variants.push(variant),
                Ok(Member::Method(method)) => members.methods.push(method),

                Err(error) => {
                    self.report(error);
                    if self.seek(|kind| {
                        matches!(
                            kind,
                            TokenKind::Comma
                                | TokenKind::DocComment { .. }
                                | TokenKind::Keyword(Keyword::Fun | Keyword::Pub)
                        )
                    }) {
                        self.eat(TokenKind::Comma);
                    }
                }
            }

            if self.tokens.consumed() == consumed {
                self.advance();
            }
        }

        self.expect_or_recover(TokenKind::RBrace);

        members
    }

    fn parse_member(&mut self, body: Body, docstring: Option<String>) -> ParseResult<Member> {
        let start = self.peek().span;
        let visibility = self.parse_visibility();

        if self.at_keyword(Keyword::Fun) {
            if let (Body::Interface, Visibility::Public(span)) = (body, visibility) {
                self.report(ParseError::new(
                    ParseErrorKind::UnnecessaryVisibility {
                        context: "interface method",
                    },
                    span,
                ));
            }

            let function = self.parse_function()?;
            return Ok(Member::Method(Method {
                visibility,
                docstring,
                function,
                span: self.span_from(start),
            }));
        }

        let member = match (body, visibility) {
            (Body::Struct, _) => {
                Member::Field(self.parse_field_rest(start, visibility, docstring)?)
            }

            (Body::Enum, Visibility::Private) => {
                let name = self.parse_ident()?;

                let kind = match self.peek().kind {
                    TokenKind::LParen => {
                        self.advance();
                        let (fields, _) =
                            self.parse_list(TokenKind::RParen, Self::parse_tuple_field);
                        StructKind::Tuple(fields)
                    }
                    TokenKind::LBrace => {
                        self.advance();
                        let (fields, _) = self.parse_list(TokenKind::RBrace, Self::parse_field);
                        StructKind::Record(fields)
                    }
                    _ => StructKind::Unit,
                };

                Member::Variant(Variant {
                    docstring,
                    name,
                    kind,
                    span: self.span_from(start),
                })
            }

            _ => return Err(self.error_expected(TokenKind::Keyword(Keyword::Fun).to_string())),
        };

        // The last field or variant before the methods may leave out the `,`.
        let separated = matches!(self.peek_raw().kind, TokenKind::DocComment { .. })
            || self.eat(TokenKind::Comma)
            || self.at(TokenKind::RBrace)
            || self.at_keyword(Keyword::Fun)
            || self.at_keyword(Keyword::Pub);

        if !separated {
            let error = self.error_expected("`,` or `}`");
            self.report(error);
        }

        Ok(member)
    }

    fn parse_field(&mut self) -> ParseResult<Field> {
        let docstring = self.docstring(false);
        let start = self.peek().span;
        let visibility = self.parse_visibility();
        self.parse_field_rest(start, visibility, docstring)
    }

    /// `name: Type`, after any visibility.
    fn parse_field_rest(
        &mut self,
        start: Span,
        visibility: Visibility,
        docstring: Option<String>,
    ) -> ParseResult<Field> {
        let name = self.parse_ident()?;
        self.expect(TokenKind::Colon)?;
        let ty = self.parse_type()?;

        Ok(Field {
            visibility,
            docstring,
            name,
            ty,
            span: self.span_from(start),
        })
    }

    fn parse_tuple_field(&mut self) -> ParseResult<TupleField> {
        let start = self.peek().span;
        let visibility = self.parse_visibility();
        let ty = self.parse_type()?;

        Ok(TupleField {
            visibility,
            ty,
            span: self.span_from(start),
        })
    }
}

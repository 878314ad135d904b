#[macro_use]
extern crate macro_rules_attribute;

mod error;
mod lexer;
mod parser;

pub mod ast;
pub mod cursor;
pub mod matching;
pub mod token;
pub mod visit;

pub use error::SyntaxError;
pub use lexer::{Lexer, LexerError, LexerErrorKind, LexerResult};
pub use parser::{ParseError, ParseErrorKind, ParseResult, Parser, ParserConfig};

use ast::*;
use cursor::TokenStream;
use starling_interner::Interner;
use token::Token;

derive_alias! {
    #[derive(Node!)] = #[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)];
    #[derive(NodeCopy!)] = #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)];
}

/// All tokens up to and including the end of file.
pub fn lex(source: &str, interner: &Interner) -> (Vec<Token>, Vec<LexerError>) {
    let mut lexer = Lexer::new(source, interner);
    let tokens = lexer.by_ref().collect();
    (tokens, lexer.finish())
}

pub fn parse(source: &str, interner: &Interner) -> (Module, Vec<SyntaxError>) {
    parse_with_config(source, interner, ParserConfig::default())
}

pub fn parse_with_config(
    source: &str,
    interner: &Interner,
    config: ParserConfig,
) -> (Module, Vec<SyntaxError>) {
    parser(source, interner, config).parse()
}

pub fn parse_expr(source: &str, interner: &Interner) -> (Expr, Vec<SyntaxError>) {
    parser(source, interner, ParserConfig::default()).parse_single(Parser::parse_expr, |span| {
        Expr::new(ExprKind::ParseError, span)
    })
}

pub fn parse_stmt(source: &str, interner: &Interner) -> (Stmt, Vec<SyntaxError>) {
    parser(source, interner, ParserConfig::default()).parse_single(
        |parser| Ok(parser.parse_stmt()),
        |span| Stmt::new(StmtKind::ParseError, span),
    )
}

pub fn parse_type(source: &str, interner: &Interner) -> (Type, Vec<SyntaxError>) {
    parser(source, interner, ParserConfig::default()).parse_single(Parser::parse_type, |span| {
        Type::new(TypeKind::ParseError, span)
    })
}

pub fn parse_pattern(source: &str, interner: &Interner) -> (Pattern, Vec<SyntaxError>) {
    parser(source, interner, ParserConfig::default()).parse_single(Parser::parse_pattern, |span| {
        Pattern::new(PatternKind::ParseError, span)
    })
}

pub fn parse_item(source: &str, interner: &Interner) -> (Item, Vec<SyntaxError>) {
    parser(source, interner, ParserConfig::default()).parse_single(
        |parser| Ok(parser.parse_documented_item()),
        |span| Item {
            kind: ItemKind::ParseError,
            visibility: Visibility::Private,
            docstring: None,
            span,
        },
    )
}

fn parser<'a>(source: &'a str, interner: &'a Interner, config: ParserConfig) -> Parser<'a> {
    let tokens = TokenStream::new(Lexer::new(source, interner));
    Parser::new(tokens, interner, config)
}

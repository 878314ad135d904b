use pretty_assertions::assert_eq;
use starling_diagnostic::span::Span;
use starling_interner::Interner;
use starling_utils::assert_yaml_snapshot_with_source;

use super::{Lexer, LexerError, LexerErrorKind};
use crate::token::{FloatValue, Keyword, Token, TokenKind};

fn lex(source: &str, interner: &Interner) -> (Vec<Token>, Vec<LexerError>) {
    let mut lexer = Lexer::new(source, interner);
    let tokens = lexer.by_ref().collect();

    (tokens, lexer.finish())
}

/// Token kinds without the trailing `Eof`, plus error kinds.
fn kinds_with(source: &str, interner: &Interner) -> (Vec<TokenKind>, Vec<LexerErrorKind>) {
    let (tokens, errors) = lex(source, interner);

    let mut kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
    assert_eq!(kinds.pop(), Some(TokenKind::Eof), "missing eof");

    (kinds, errors.iter().map(|e| e.kind).collect())
}

fn kinds(source: &str) -> (Vec<TokenKind>, Vec<LexerErrorKind>) {
    kinds_with(source, &Interner::new())
}

fn single_error(source: &str) -> LexerErrorKind {
    let (kinds, errors) = kinds(source);

    assert_eq!(errors.len(), 1, "{source:?}: {errors:?}");
    assert_eq!(kinds, vec![TokenKind::Error(errors[0])], "{source:?}");

    errors[0]
}

fn float(f: f64) -> TokenKind {
    TokenKind::Float(FloatValue::new(f))
}

macro_rules! assert_lex {
    ($source:expr, @$snapshot:literal) => {{
        let source = $source;
        assert_yaml_snapshot_with_source!(source => lex(source, &Interner::new()), @$snapshot);
    }};
}

#[test]
fn statement() {
    assert_lex!("let x = 1;", @r###"
    ---
    - - kind:
          Keyword: Let
        span:
          start: 0
          end: 3
      - kind:
          Identifier: 1
        span:
          start: 4
          end: 5
      - kind: Eq
        span:
          start: 6
          end: 7
      - kind:
          Integer: 1
        span:
          start: 8
          end: 9
      - kind: Semicolon
        span:
          start: 9
          end: 10
      - kind: Eof
        span:
          start: 10
          end: 10
    - []
    "###);
}

#[test]
fn unterminated_string_token() {
    assert_lex!("x \"ab", @r###"
    ---
    - - kind:
          Identifier: 1
        span:
          start: 0
          end: 1
      - kind:
          Error: UnterminatedString
        span:
          start: 2
          end: 5
      - kind: Eof
        span:
          start: 5
          end: 5
    - - kind: UnterminatedString
        span:
          start: 2
          end: 5
    "###);
}

#[test]
fn integers() {
    let (kinds, errors) = kinds("0b1010 0o17 017 0xFF 0XfF 1_000_000 0 0B1_1 0_7");

    assert_eq!(errors, vec![]);
    assert_eq!(
        kinds,
        [10, 15, 15, 255, 255, 1_000_000, 0, 3, 7]
            .map(|n| TokenKind::Integer(Some(n)))
            .to_vec()
    );
}

#[test]
fn integer_formats_round_trip() {
    for n in [0, 1, 7, 42, 255, 0o777, 65_535, u64::from(u32::MAX), u64::MAX] {
        for text in [
            format!("{n}"),
            format!("{n:#b}"),
            format!("{n:#o}"),
            format!("{n:#x}"),
            format!("{n:#X}").replacen("0x", "0X", 1),
        ] {
            let (kinds, errors) = kinds(&text);

            assert_eq!(errors, vec![], "{text}");
            assert_eq!(kinds, vec![TokenKind::Integer(Some(n))], "{text}");
        }
    }
}

#[test]
fn integer_overflow_is_deferred() {
    let (kinds, errors) = kinds("18446744073709551616 0x1_0000_0000_0000_0000");

    assert_eq!(errors, vec![]);
    assert_eq!(kinds, vec![TokenKind::Integer(None); 2]);
}

#[test]
fn digit_separators() {
    for source in ["1__0", "1_", "0x_1", "0b1__1", "1_.5", "1e_5"] {
        assert_eq!(
            single_error(source),
            LexerErrorKind::InvalidDigitSeparator,
            "{source}"
        );
    }
}

#[test]
fn malformed_integers() {
    assert_eq!(single_error("0x"), LexerErrorKind::MissingDigits);
    assert_eq!(single_error("0b"), LexerErrorKind::MissingDigits);

    assert_eq!(
        single_error("0b102"),
        LexerErrorKind::InvalidDigit {
            digit: '2',
            base: 2
        }
    );
    assert_eq!(
        single_error("09"),
        LexerErrorKind::InvalidDigit {
            digit: '9',
            base: 8
        }
    );
}

#[test]
fn floats() {
    let (kinds, errors) = kinds("1.5 .25 1e3 2.5E-2 1_0.0_1 3e+2");

    assert_eq!(errors, vec![]);
    assert_eq!(
        kinds,
        vec![
            float(1.5),
            float(0.25),
            float(1000.0),
            float(0.025),
            float(10.01),
            float(300.0)
        ]
    );
}

#[test]
fn malformed_floats() {
    assert_eq!(single_error("1e"), LexerErrorKind::MissingExponentDigits);
    assert_eq!(single_error("1.5e-"), LexerErrorKind::MissingExponentDigits);
    assert_eq!(single_error("0x1.5"), LexerErrorKind::NonDecimalFloat);
    assert_eq!(single_error("0b1e3"), LexerErrorKind::NonDecimalFloat);
    assert_eq!(single_error("017.5"), LexerErrorKind::NonDecimalFloat);
}

#[test]
fn dot_after_integer() {
    let interner = Interner::new();
    let (kinds, errors) = kinds_with("1..2 3.max", &interner);

    assert_eq!(errors, vec![]);
    assert_eq!(
        kinds,
        vec![
            TokenKind::Integer(Some(1)),
            TokenKind::DotDot,
            TokenKind::Integer(Some(2)),
            TokenKind::Integer(Some(3)),
            TokenKind::Dot,
            TokenKind::Identifier(interner.intern("max")),
        ]
    );

    // `.0` after a name is a float, not a field access.
    let (kinds, _) = kinds_with("t.0", &interner);
    assert_eq!(
        kinds,
        vec![TokenKind::Identifier(interner.intern("t")), float(0.0)]
    );
}

#[test]
fn keywords() {
    let interner = Interner::new();
    let (tokens, _) = kinds_with("fun( funny fun_ _fun fun", &interner);

    assert_eq!(
        tokens,
        vec![
            TokenKind::Keyword(Keyword::Fun),
            TokenKind::LParen,
            TokenKind::Identifier(interner.intern("funny")),
            TokenKind::Identifier(interner.intern("fun_")),
            TokenKind::Identifier(interner.intern("_fun")),
            TokenKind::Keyword(Keyword::Fun),
        ]
    );

    let all = "as break continue defer dyn else enum for fun if implements import in \
               interface let loop match pub return struct type where while";

    for word in all.split_whitespace() {
        let (tokens, _) = kinds(word);
        assert!(
            matches!(tokens[..], [TokenKind::Keyword(kw)] if kw.as_str() == word),
            "{word}: {tokens:?}"
        );
    }

    let (tokens, _) = kinds("true false");
    assert_eq!(tokens, vec![TokenKind::Bool(true), TokenKind::Bool(false)]);
}

#[test]
fn identifiers() {
    let interner = Interner::new();
    let (kinds, errors) = kinds_with("héllo _x _ 名前 x1 x", &interner);

    assert_eq!(errors, vec![]);
    assert_eq!(
        kinds,
        vec![
            TokenKind::Identifier(interner.intern("héllo")),
            TokenKind::Identifier(interner.intern("_x")),
            TokenKind::Underscore,
            TokenKind::Identifier(interner.intern("名前")),
            TokenKind::Identifier(interner.intern("x1")),
            TokenKind::Identifier(interner.intern("x")),
        ]
    );

    // Same text, same handle.
    assert_eq!(kinds[5], TokenKind::Identifier(interner.intern("x")));
}

#[test]
fn wrapped_identifiers() {
    let interner = Interner::new();
    let (kinds, errors) = kinds_with("`match` `two words` `x` x fun", &interner);

    assert_eq!(errors, vec![]);
    assert_eq!(
        kinds,
        vec![
            TokenKind::Identifier(interner.intern("match")),
            TokenKind::Identifier(interner.intern("two words")),
            TokenKind::Identifier(interner.intern("x")),
            TokenKind::Identifier(interner.intern("x")),
            TokenKind::Keyword(Keyword::Fun),
        ]
    );
}

#[test]
fn malformed_wrapped_identifiers() {
    assert_eq!(single_error("``"), LexerErrorKind::EmptyWrappedIdentifier);
    assert_eq!(single_error("`abc"), LexerErrorKind::UnterminatedWrappedIdentifier);

    let interner = Interner::new();
    let (tokens, errors) = lex("`ab\nx", &interner);

    assert_eq!(
        errors,
        vec![LexerError {
            kind: LexerErrorKind::UnterminatedWrappedIdentifier,
            span: Span::new(0, 3),
        }]
    );
    assert_eq!(tokens[1].kind, TokenKind::Identifier(interner.intern("x")));
}

#[test]
fn longest_match() {
    use TokenKind::*;

    let (tokens, errors) =
        kinds(concat!(
            "<<= << <= < >>= >> >= > && &= & || |= | ** *= * ",
            "-> -- -= - ++ += + .. . != ! == = %= ^= ~ @ ? #",
        ));

    assert_eq!(errors, vec![]);
    assert_eq!(
        tokens,
        vec![
            LtLtEq, LtLt, LtEq, Lt, GtGtEq, GtGt, GtEq, Gt, AmpAmp, AmpEq, Amp, PipePipe,
            PipeEq, Pipe, StarStar, StarEq, Star, Arrow, MinusMinus, MinusEq, Minus, PlusPlus,
            PlusEq, Plus, DotDot, Dot, BangEq, Bang, EqEq, Eq, PercentEq, CaretEq, Tilde, At,
            Question, Hash,
        ]
    );

    let (compact, _) = kinds("a<<=b");
    assert_eq!(compact[1], LtLtEq);
}

#[test]
fn comments() {
    let interner = Interner::new();
    let (kinds, errors) = kinds_with("a // c\nb /* x /* nested */ y */ c", &interner);

    assert_eq!(errors, vec![]);
    assert_eq!(
        kinds,
        ["a", "b", "c"]
            .map(|s| TokenKind::Identifier(interner.intern(s)))
            .to_vec()
    );
}

#[test]
fn doc_comments() {
    let interner = Interner::new();
    let source = "/// doc\n//! module\n//// not a doc\nx";
    let (tokens, errors) = lex(source, &interner);

    assert_eq!(errors, vec![]);
    assert_eq!(
        tokens,
        vec![
            Token {
                kind: TokenKind::DocComment { module: false },
                span: Span::new(0, 7),
            },
            Token {
                kind: TokenKind::DocComment { module: true },
                span: Span::new(8, 18),
            },
            Token {
                kind: TokenKind::Identifier(interner.intern("x")),
                span: Span::new(34, 35),
            },
            Token {
                kind: TokenKind::Eof,
                span: Span::new(35, 35),
            },
        ]
    );
}

#[test]
fn unterminated_block_comment() {
    let interner = Interner::new();
    let mut lexer = Lexer::new("a /* /* */", &interner);

    assert_eq!(
        lexer.next_token().kind,
        TokenKind::Identifier(interner.intern("a"))
    );

    for _ in 0..3 {
        assert_eq!(
            lexer.next_token(),
            Token {
                kind: TokenKind::Eof,
                span: Span::new(10, 10)
            }
        );
    }

    assert_eq!(
        lexer.finish(),
        vec![LexerError {
            kind: LexerErrorKind::UnterminatedBlockComment,
            span: Span::new(2, 10),
        }]
    );
}

#[test]
fn unterminated_literals() {
    assert_eq!(single_error("\"abc"), LexerErrorKind::UnterminatedString);
    assert_eq!(single_error("'a"), LexerErrorKind::UnterminatedChar);
    assert_eq!(single_error("'\\"), LexerErrorKind::UnterminatedChar);
    assert_eq!(single_error("\"\\x4"), LexerErrorKind::UnterminatedString);

    let interner = Interner::new();
    let (kinds, errors) = kinds_with("\"ab\nx", &interner);

    assert_eq!(errors, vec![LexerErrorKind::UnterminatedString]);
    assert_eq!(
        kinds,
        vec![
            TokenKind::Error(LexerErrorKind::UnterminatedString),
            TokenKind::Identifier(interner.intern("x")),
        ]
    );
}

#[test]
fn char_literals() {
    let (kinds, errors) =
        kinds(r"'a' '\n' '\x41' 'é' '\U0001F600' '\101' '\'' '\v' 'é'");

    assert_eq!(errors, vec![]);
    assert_eq!(
        kinds,
        ['a', '\n', 'A', 'é', '😀', 'A', '\'', '\x0b', 'é']
            .map(TokenKind::Char)
            .to_vec()
    );
}

#[test]
fn malformed_char_literals() {
    use LexerErrorKind::*;

    let cases = [
        (r"'\xa'", TooFewHexDigits { expected: 2 }),
        (r"'\u12'", TooFewHexDigits { expected: 4 }),
        (r"'\U0001F6'", TooFewHexDigits { expected: 8 }),
        (r"'\ud800'", SurrogateEscape),
        (r"'\U0000DFFF'", SurrogateEscape),
        (r"'\U00110000'", EscapeOutOfRange),
        (r"'\400'", EscapeOutOfRange),
        (r"'\12'", TooFewOctalDigits),
        (r"'\q'", UnknownEscape('q')),
        ("''", EmptyCharLiteral),
        ("'ab'", MultipleCharsInLiteral),
        (r"'\n\n'", MultipleCharsInLiteral),
    ];

    for (source, expected) in cases {
        assert_eq!(single_error(source), expected, "{source}");
    }
}

#[test]
fn error_skips_to_closing_quote() {
    let interner = Interner::new();
    let (tokens, errors) = lex(r"'\xa' x", &interner);

    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].span, Span::new(0, 5));
    assert_eq!(
        tokens[1].kind,
        TokenKind::Identifier(interner.intern("x"))
    );
}

#[test]
fn string_literals() {
    let interner = Interner::new();
    let (kinds, errors) = kinds_with(r#""a\tb" "" "\"q\"""#, &interner);

    assert_eq!(errors, vec![]);
    assert_eq!(
        kinds,
        ["a\tb", "", "\"q\""]
            .map(|s| TokenKind::String(interner.intern(s)))
            .to_vec()
    );

    assert_eq!(single_error(r#""bad \z escape""#), LexerErrorKind::UnknownEscape('z'));
}

#[test]
fn unexpected_char() {
    let interner = Interner::new();
    let (tokens, errors) = lex("a $ b", &interner);

    assert_eq!(
        tokens.iter().map(|t| t.kind).collect::<Vec<_>>(),
        vec![
            TokenKind::Identifier(interner.intern("a")),
            TokenKind::Error(LexerErrorKind::UnexpectedChar('$')),
            TokenKind::Identifier(interner.intern("b")),
            TokenKind::Eof,
        ]
    );
    assert_eq!(
        errors,
        vec![LexerError {
            kind: LexerErrorKind::UnexpectedChar('$'),
            span: Span::new(2, 3),
        }]
    );
}

#[test]
fn spans() {
    let interner = Interner::new();
    let (tokens, _) = lex("let x = 10;\n", &interner);

    assert_eq!(
        tokens.iter().map(|t| t.span).collect::<Vec<_>>(),
        vec![
            Span::new(0, 3),
            Span::new(4, 5),
            Span::new(6, 7),
            Span::new(8, 10),
            Span::new(10, 11),
            Span::new(12, 12),
        ]
    );
}

#[test]
fn iterator_yields_one_eof() {
    let interner = Interner::new();
    let mut lexer = Lexer::new("x", &interner);

    assert_eq!(lexer.by_ref().count(), 2);
    assert_eq!(lexer.next(), None);
    assert_eq!(lexer.next_token().kind, TokenKind::Eof);
}

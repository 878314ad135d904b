use std::fmt;

use starling_diagnostic::span::Span;
use starling_interner::Istr;

use crate::lexer::LexerErrorKind;
use crate::NodeCopy;

#[derive(NodeCopy!)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

#[derive(NodeCopy!)]
pub enum TokenKind {
    /// `None` if the value doesn't fit in a `u64`.
    Integer(Option<u64>),
    Float(FloatValue),
    Char(char),
    String(Istr),
    Bool(bool),

    Identifier(Istr),
    Keyword(Keyword),

    /// `///` (item) or `//!` (module) comment. The text is recovered from the
    /// token's span.
    DocComment {
        module: bool,
    },

    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,

    Dot,
    DotDot,
    Comma,
    Semicolon,
    Colon,
    At,
    Question,
    Hash,
    Arrow,
    Underscore,

    Plus,
    PlusPlus,
    PlusEq,
    Minus,
    MinusMinus,
    MinusEq,
    Star,
    StarStar,
    StarEq,
    Slash,
    SlashEq,
    Percent,
    PercentEq,

    Eq,
    EqEq,
    Bang,
    BangEq,
    Lt,
    LtEq,
    LtLt,
    LtLtEq,
    Gt,
    GtEq,
    GtGt,
    GtGtEq,

    Amp,
    AmpAmp,
    AmpEq,
    Pipe,
    PipePipe,
    PipeEq,
    Caret,
    CaretEq,
    Tilde,

    /// A malformed token. The error itself is reported by the lexer.
    Error(LexerErrorKind),
    Eof,
}

macro_rules! keywords {
    ($($kw:ident => $s:literal,)*) => {
        #[derive(NodeCopy!)]
        pub enum Keyword {
            $($kw,)*
        }

        impl Keyword {
            pub fn lookup(s: &str) -> Option<Self> {
                match s {
                    $($s => Some(Self::$kw),)*
                    _ => None,
                }
            }

            pub fn as_str(self) -> &'static str {
                match self {
                    $(Self::$kw => $s,)*
                }
            }
        }
    };
}

keywords! {
    As => "as",
    Break => "break",
    Continue => "continue",
    Defer => "defer",
    Dyn => "dyn",
    Else => "else",
    Enum => "enum",
    For => "for",
    Fun => "fun",
    If => "if",
    Implements => "implements",
    Import => "import",
    In => "in",
    Interface => "interface",
    Let => "let",
    Loop => "loop",
    Match => "match",
    Pub => "pub",
    Return => "return",
    Struct => "struct",
    Type => "type",
    Where => "where",
    While => "while",
}

impl Keyword {
    /// Keywords that start an item, used as recovery points.
    pub fn starts_item(self) -> bool {
        matches!(
            self,
            Self::Fun
                | Self::Struct
                | Self::Enum
                | Self::Interface
                | Self::Type
                | Self::Import
                | Self::Pub
        )
    }
}

/// A float stored by its bits so that tokens can be `Eq` and `Hash`.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct FloatValue(u64);

impl FloatValue {
    pub fn new(value: f64) -> Self {
        Self(value.to_bits())
    }

    pub fn get(self) -> f64 {
        f64::from_bits(self.0)
    }
}

impl fmt::Debug for FloatValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.get())
    }
}

impl serde::Serialize for FloatValue {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.get())
    }
}

impl TokenKind {
    /// The source text of fixed tokens.
    pub fn as_str(&self) -> Option<&'static str> {
        let s = match self {
            TokenKind::Keyword(kw) => kw.as_str(),

            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::LBracket => "[",
            TokenKind::RBracket => "]",
            TokenKind::LBrace => "{",
            TokenKind::RBrace => "}",

            TokenKind::Dot => ".",
            TokenKind::DotDot => "..",
            TokenKind::Comma => ",",
            TokenKind::Semicolon => ";",
            TokenKind::Colon => ":",
            TokenKind::At => "@",
            TokenKind::Question => "?",
            TokenKind::Hash => "#",
            TokenKind::Arrow => "->",
            TokenKind::Underscore => "_",

            TokenKind::Plus => "+",
            TokenKind::PlusPlus => "++",
            TokenKind::PlusEq => "+=",
            TokenKind::Minus => "-",
            TokenKind::MinusMinus => "--",
            TokenKind::MinusEq => "-=",
            TokenKind::Star => "*",
            TokenKind::StarStar => "**",
            TokenKind::StarEq => "*=",
            TokenKind::Slash => "/",
            TokenKind::SlashEq => "/=",
            TokenKind::Percent => "%",
            TokenKind::PercentEq => "%=",

            TokenKind::Eq => "=",
            TokenKind::EqEq => "==",
            TokenKind::Bang => "!",
            TokenKind::BangEq => "!=",
            TokenKind::Lt => "<",
            TokenKind::LtEq => "<=",
            TokenKind::LtLt => "<<",
            TokenKind::LtLtEq => "<<=",
            TokenKind::Gt => ">",
            TokenKind::GtEq => ">=",
            TokenKind::GtGt => ">>",
            TokenKind::GtGtEq => ">>=",

            TokenKind::Amp => "&",
            TokenKind::AmpAmp => "&&",
            TokenKind::AmpEq => "&=",
            TokenKind::Pipe => "|",
            TokenKind::PipePipe => "||",
            TokenKind::PipeEq => "|=",
            TokenKind::Caret => "^",
            TokenKind::CaretEq => "^=",
            TokenKind::Tilde => "~",

            TokenKind::Integer(_)
            | TokenKind::Float(_)
            | TokenKind::Char(_)
            | TokenKind::String(_)
            | TokenKind::Bool(_)
            | TokenKind::Identifier(_)
            | TokenKind::DocComment { .. }
            | TokenKind::Error(_)
            | TokenKind::Eof => return None,
        };

        Some(s)
    }

    pub fn is_keyword(&self, kw: Keyword) -> bool {
        *self == TokenKind::Keyword(kw)
    }
}

/// Human-readable token name for error messages.
impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Keyword(kw) => write!(f, "keyword `{}`", kw.as_str()),

            TokenKind::Integer(_) => write!(f, "integer literal"),
            TokenKind::Float(_) => write!(f, "float literal"),
            TokenKind::Char(_) => write!(f, "character literal"),
            TokenKind::String(_) => write!(f, "string literal"),
            TokenKind::Bool(b) => write!(f, "`{b}`"),
            TokenKind::Identifier(_) => write!(f, "identifier"),
            TokenKind::DocComment { .. } => write!(f, "doc comment"),
            TokenKind::Error(_) => write!(f, "invalid token"),
            TokenKind::Eof => write!(f, "end of file"),

            other => match other.as_str() {
                Some(s) => write!(f, "`{s}`"),
                None => write!(f, "token"),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Keyword, TokenKind};

    #[test]
    fn keyword_table() {
        for kw in [Keyword::Fun, Keyword::Implements, Keyword::In, Keyword::Where] {
            assert_eq!(Keyword::lookup(kw.as_str()), Some(kw));
        }

        assert_eq!(Keyword::lookup("funny"), None);
        assert_eq!(Keyword::lookup("true"), None);
    }

    #[test]
    fn names() {
        assert_eq!(TokenKind::Keyword(Keyword::Let).to_string(), "keyword `let`");
        assert_eq!(TokenKind::LtLtEq.to_string(), "`<<=`");
        assert_eq!(TokenKind::Eof.to_string(), "end of file");
        assert_eq!(TokenKind::Integer(Some(1)).to_string(), "integer literal");
    }
}

use starling_utils::peek::Peek;

use super::{Lexer, LexerErrorKind, LexerResult};
use crate::token::TokenKind;

impl Lexer<'_> {
    /// Called after the opening `'`.
    ///
    /// Lexing always continues to the closing quote on the same line, so a
    /// malformed literal produces a single error.
    pub(super) fn lex_char(&mut self) -> LexerResult<TokenKind> {
        let mut error = None;
        let mut value = None;
        let mut count = 0;

        loop {
            match self.chars.peek() {
                None | Some('\n') => return Err(LexerErrorKind::UnterminatedChar),

                Some('\'') => {
                    self.chars.next();
                    break;
                }

                Some('\\') => {
                    self.chars.next();

                    match self.lex_escape() {
                        Ok(ch) => value = Some(ch),
                        Err(err) => {
                            error.get_or_insert(err);
                        }
                    }

                    count += 1;
                }

                Some(ch) => {
                    self.chars.next();
                    value = Some(ch);
                    count += 1;
                }
            }
        }

        if let Some(error) = error {
            return Err(error);
        }

        match (value, count) {
            (Some(ch), 1) => Ok(TokenKind::Char(ch)),
            (_, 0) => Err(LexerErrorKind::EmptyCharLiteral),
            _ => Err(LexerErrorKind::MultipleCharsInLiteral),
        }
    }

    /// Called after the opening `"`. Strings can't span lines.
    pub(super) fn lex_string(&mut self) -> LexerResult<TokenKind> {
        let mut error = None;
        let mut value = String::new();

        loop {
            match self.chars.peek() {
                None | Some('\n') => return Err(LexerErrorKind::UnterminatedString),

                Some('"') => {
                    self.chars.next();
                    break;
                }

                Some('\\') => {
                    self.chars.next();

                    match self.lex_escape() {
                        Ok(ch) => value.push(ch),
                        Err(err) => {
                            error.get_or_insert(err);
                        }
                    }
                }

                Some(ch) => {
                    self.chars.next();
                    value.push(ch);
                }
            }
        }

        match error {
            Some(error) => Err(error),
            None => Ok(TokenKind::String(self.interner.intern(&value))),
        }
    }

    /// Called after a backslash.
    ///
    /// A line break or the end of the source is left in place for the caller
    /// to report as an unterminated literal.
    fn lex_escape(&mut self) -> LexerResult<char> {
        let ch = match self.chars.peek() {
            None | Some('\n') => return Ok('\\'),
            Some(ch) => {
                self.chars.next();
                ch
            }
        };

        match ch {
            'a' => Ok('\x07'),
            'b' => Ok('\x08'),
            'f' => Ok('\x0c'),
            'n' => Ok('\n'),
            'r' => Ok('\r'),
            't' => Ok('\t'),
            'v' => Ok('\x0b'),
            '\\' | '\'' | '"' => Ok(ch),

            'x' => {
                let value = self.hex_digits(2)?;
                char::from_u32(value).ok_or(LexerErrorKind::EscapeOutOfRange)
            }
            'u' => self.unicode_escape(4),
            'U' => self.unicode_escape(8),

            '0'..='7' => self.octal_escape(ch as u32 - '0' as u32),

            other => Err(LexerErrorKind::UnknownEscape(other)),
        }
    }

    fn hex_digits(&mut self, count: u8) -> LexerResult<u32> {
        let mut value = 0;

        for _ in 0..count {
            let digit = self
                .chars
                .peek()
                .and_then(|ch| ch.to_digit(16))
                .ok_or(LexerErrorKind::TooFewHexDigits { expected: count })?;

            self.chars.next();
            value = value * 16 + digit;
        }

        Ok(value)
    }

    fn unicode_escape(&mut self, count: u8) -> LexerResult<char> {
        let value = self.hex_digits(count)?;

        if (0xd800..=0xdfff).contains(&value) {
            return Err(LexerErrorKind::SurrogateEscape);
        }

        char::from_u32(value).ok_or(LexerErrorKind::EscapeOutOfRange)
    }

    fn octal_escape(&mut self, first: u32) -> LexerResult<char> {
        let mut value = first;

        for _ in 0..2 {
            let digit = self
                .chars
                .peek()
                .and_then(|ch| ch.to_digit(8))
                .ok_or(LexerErrorKind::TooFewOctalDigits)?;

            self.chars.next();
            value = value * 8 + digit;
        }

        u8::try_from(value)
            .map(char::from)
            .map_err(|_| LexerErrorKind::EscapeOutOfRange)
    }
}

use starling_utils::peek::Peek;

use super::{Lexer, LexerErrorKind, LexerResult};
use crate::token::{FloatValue, TokenKind};

impl Lexer<'_> {
    /// Lex a number literal. `first` has already been consumed: it is either a
    /// digit or a `.` followed by a digit.
    ///
    /// The whole literal is consumed even if it's malformed, and the first
    /// problem found is returned.
    pub(super) fn lex_number(&mut self, first: char) -> LexerResult<TokenKind> {
        let mut error = None;
        let mut value = Some(0);

        if first == '0' {
            if let Some(base) = self.chars.peek().and_then(prefix_base) {
                self.chars.next();

                if self.digit_run(base, false, &mut value, &mut error) == 0 {
                    error.get_or_insert(LexerErrorKind::MissingDigits);
                }

                return self.finish_non_decimal(value, error);
            }

            // A leading zero followed by more digits is octal.
            if self.chars.peek().is_some_and(|ch| ch.is_ascii_digit() || ch == '_') {
                self.digit_run(8, true, &mut value, &mut error);
                return self.finish_non_decimal(value, error);
            }
        }

        let mut is_float = false;

        if first == '.' {
            is_float = true;
            self.digit_run(10, false, &mut None, &mut error);
        } else {
            value = first.to_digit(10).map(u64::from);
            self.digit_run(10, true, &mut value, &mut error);

            if self.at_fraction() {
                is_float = true;
                self.chars.next();
                self.digit_run(10, false, &mut None, &mut error);
            }
        }

        if self.eat_exponent(&mut error) {
            is_float = true;
        }

        if let Some(error) = error {
            return Err(error);
        }

        if !is_float {
            return Ok(TokenKind::Integer(value));
        }

        let text: String = self.all[self.token_start..self.byte_pos()]
            .chars()
            .filter(|&ch| ch != '_')
            .collect();

        text.parse()
            .map(|f| TokenKind::Float(FloatValue::new(f)))
            .map_err(|_| LexerErrorKind::MissingDigits)
    }

    fn finish_non_decimal(
        &mut self,
        value: Option<u64>,
        mut error: Option<LexerErrorKind>,
    ) -> LexerResult<TokenKind> {
        let mut has_float_part = false;

        if self.at_fraction() {
            has_float_part = true;
            self.chars.next();
            self.digit_run(10, false, &mut None, &mut error);
        }

        // Hex literals have already eaten any `e` as a digit.
        has_float_part |= self.eat_exponent(&mut None);

        if has_float_part {
            return Err(LexerErrorKind::NonDecimalFloat);
        }

        match error {
            Some(error) => Err(error),
            None => Ok(TokenKind::Integer(value)),
        }
    }

    /// Consume a run of digits and `_` separators, accumulating the value in
    /// `base`. `after_digit` is true if the run continues a digit that has
    /// already been consumed. Returns the number of digits.
    fn digit_run(
        &mut self,
        base: u32,
        after_digit: bool,
        value: &mut Option<u64>,
        error: &mut Option<LexerErrorKind>,
    ) -> usize {
        let mut digits = 0;
        let mut prev_was_digit = after_digit;

        loop {
            match self.chars.peek() {
                Some('_') => {
                    self.chars.next();

                    let next_is_digit = self.chars.peek().is_some_and(|ch| is_run_digit(ch, base));
                    if !prev_was_digit || !next_is_digit {
                        error.get_or_insert(LexerErrorKind::InvalidDigitSeparator);
                    }

                    prev_was_digit = false;
                }

                Some(ch) if is_run_digit(ch, base) => {
                    self.chars.next();

                    match ch.to_digit(base) {
                        Some(digit) => {
                            *value = value
                                .and_then(|n| n.checked_mul(u64::from(base)))
                                .and_then(|n| n.checked_add(u64::from(digit)));
                        }
                        None => {
                            error.get_or_insert(LexerErrorKind::InvalidDigit { digit: ch, base });
                        }
                    }

                    digits += 1;
                    prev_was_digit = true;
                }

                _ => return digits,
            }
        }
    }

    fn at_fraction(&self) -> bool {
        self.chars.peek() == Some('.')
            && self.chars.peek_nth(1).is_some_and(|ch| ch.is_ascii_digit())
    }

    /// Consume an exponent (`e`, optional sign, digits) if there is one.
    fn eat_exponent(&mut self, error: &mut Option<LexerErrorKind>) -> bool {
        if !matches!(self.chars.peek(), Some('e' | 'E')) {
            return false;
        }

        self.chars.next();

        if !self.chars.eat('+') {
            self.chars.eat('-');
        }

        if self.digit_run(10, false, &mut None, error) == 0 {
            error.get_or_insert(LexerErrorKind::MissingExponentDigits);
        }

        true
    }
}

fn prefix_base(ch: char) -> Option<u32> {
    match ch {
        'b' | 'B' => Some(2),
        'o' | 'O' => Some(8),
        'x' | 'X' => Some(16),
        _ => None,
    }
}

/// Characters that belong to a digit run, including ones that are out of
/// range for `base` (reported as invalid digits).
fn is_run_digit(ch: char, base: u32) -> bool {
    if base == 16 {
        ch.is_ascii_hexdigit()
    } else {
        ch.is_ascii_digit()
    }
}

pub trait Peek: Iterator {
    fn peek_nth(&self, n: usize) -> Option<Self::Item>;

    fn peek(&self) -> Option<Self::Item> {
        self.peek_nth(0)
    }

    fn eat<P>(&mut self, pat: P) -> bool
    where
        Self::Item: PartialEq<P>,
    {
        match self.peek() {
            Some(item) if item == pat => {
                self.next();
                true
            }
            _ => false,
        }
    }

    fn eat_if(&mut self, f: impl FnOnce(&Self::Item) -> bool) -> Option<Self::Item> {
        match self.peek() {
            Some(item) if f(&item) => self.next(),
            _ => None,
        }
    }

    fn eat_while(&mut self, mut f: impl FnMut(&Self::Item) -> bool) -> usize {
        let mut count = 0;
        while self.eat_if(&mut f).is_some() {
            count += 1;
        }
        count
    }

    fn at_end(&self) -> bool {
        self.peek().is_none()
    }
}

impl<P: Peek> Peek for &mut P {
    fn peek_nth(&self, n: usize) -> Option<Self::Item> {
        (**self).peek_nth(n)
    }
}

impl<T> Peek for std::slice::Iter<'_, T> {
    fn peek_nth(&self, n: usize) -> Option<Self::Item> {
        self.as_slice().get(n)
    }
}

impl Peek for std::str::Chars<'_> {
    fn peek_nth(&self, n: usize) -> Option<Self::Item> {
        self.clone().nth(n)
    }
}

#[cfg(test)]
mod tests {
    use super::Peek;

    #[test]
    fn chars_lookahead() {
        let mut chars = "ab1".chars();

        assert_eq!(chars.peek(), Some('a'));
        assert_eq!(chars.peek_nth(2), Some('1'));
        assert_eq!(chars.peek_nth(3), None);

        assert!(!chars.eat('b'));
        assert!(chars.eat('a'));
        assert_eq!(chars.eat_while(|ch| ch.is_ascii_alphabetic()), 1);
        assert_eq!(chars.eat_if(char::is_ascii_digit), Some('1'));
        assert!(chars.at_end());
    }
}

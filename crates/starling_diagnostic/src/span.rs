use std::ops::Range;

/// A half-open byte range into a source string.
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end, "span ends before it starts");
        Self { start, end }
    }

    /// A zero-width span at `at`.
    pub fn empty(at: usize) -> Self {
        Self { start: at, end: at }
    }

    /// The smallest span covering both `self` and `other`.
    #[must_use]
    pub fn to(self, other: Span) -> Self {
        Self {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// The zero-width span just past the end of `self`.
    #[must_use]
    pub fn after(self) -> Self {
        Self::empty(self.end)
    }

    pub fn contains(&self, n: usize) -> bool {
        n >= self.start && n < self.end
    }

    pub fn contains_span(&self, other: Span) -> bool {
        other.start >= self.start && other.end <= self.end
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_range(&self) -> Range<usize> {
        self.start..self.end
    }
}

impl IntoIterator for Span {
    type Item = usize;
    type IntoIter = Range<usize>;

    fn into_iter(self) -> Self::IntoIter {
        self.start..self.end
    }
}

pub trait AsSpan {
    fn as_span(&self) -> Span;
}

impl AsSpan for Span {
    fn as_span(&self) -> Span {
        *self
    }
}

impl AsSpan for Range<usize> {
    fn as_span(&self) -> Span {
        Span::new(self.start, self.end)
    }
}

impl AsSpan for (usize, usize) {
    fn as_span(&self) -> Span {
        Span::new(self.0, self.1)
    }
}

#[cfg(test)]
mod tests {
    use super::Span;

    #[test]
    fn union() {
        let a = Span::new(2, 5);
        let b = Span::new(8, 10);

        assert_eq!(a.to(b), Span::new(2, 10));
        assert_eq!(b.to(a), Span::new(2, 10));
        assert_eq!(a.to(Span::new(3, 4)), a);

        assert!(a.to(b).contains_span(a));
        assert!(a.to(b).contains_span(b));
        assert!(!a.contains_span(b));
    }

    #[test]
    fn empty_spans() {
        let span = Span::empty(4);
        assert!(span.is_empty());
        assert!(!span.contains(4));
        assert_eq!(Span::new(1, 4).after(), span);
    }
}

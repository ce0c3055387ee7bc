//! Token spans and node alignments.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Half-open token range `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Shift left by `offset`, clamping at zero.
    pub fn relative_to(&self, offset: usize) -> Span {
        Span::new(self.start.saturating_sub(offset), self.end.saturating_sub(offset))
    }

    /// Parse `"<start> <end>"`.
    pub fn parse(text: &str) -> Result<Span> {
        let mut parts = text.split_whitespace();
        let (Some(start), Some(end), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(Error::InvalidInput(format!("expected '<start> <end>', got '{text}'")));
        };
        Ok(Span::new(parse_index(start)?, parse_index(end)?))
    }
}

/// One token aligned to one node, by short-name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alignment {
    pub token: usize,
    pub short: String,
}

impl Alignment {
    pub fn new(token: usize, short: impl Into<String>) -> Self {
        Self { token, short: short.into() }
    }

    /// Parse one sentence's alignment line: `"<idx> <short>\t<idx> <short>..."`.
    ///
    /// Any whitespace separates fields; a dangling trailing field is ignored.
    pub fn parse_line(line: &str) -> Result<Vec<Alignment>> {
        let fields: Vec<&str> = line.split_whitespace().collect();
        fields
            .chunks_exact(2)
            .map(|pair| parse_index(pair[0]).map(|token| Alignment::new(token, pair[1])))
            .collect()
    }
}

fn parse_index(text: &str) -> Result<usize> {
    text.parse()
        .map_err(|_| Error::InvalidInput(format!("'{text}' is not a token index")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_alignment_line() {
        let aligned = Alignment::parse_line("0 t\t2 d\t5 b\t8 k").unwrap();
        assert_eq!(aligned, vec![
            Alignment::new(0, "t"),
            Alignment::new(2, "d"),
            Alignment::new(5, "b"),
            Alignment::new(8, "k"),
        ]);
    }

    #[test]
    fn test_parse_alignment_line_empty_and_dangling() {
        assert!(Alignment::parse_line("").unwrap().is_empty());
        assert_eq!(Alignment::parse_line("3 x\t4").unwrap(), vec![Alignment::new(3, "x")]);
    }

    #[test]
    fn test_parse_alignment_bad_index() {
        assert!(matches!(Alignment::parse_line("x t"), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_span_parse() {
        assert_eq!(Span::parse("3 7").unwrap(), Span::new(3, 7));
        assert!(Span::parse("3").is_err());
        assert!(Span::parse("3 7 9").is_err());
        assert!(Span::parse("a 7").is_err());
    }

    #[test]
    fn test_relative_to() {
        assert_eq!(Span::new(12, 14).relative_to(10), Span::new(2, 4));
        assert_eq!(Span::new(8, 11).relative_to(10), Span::new(0, 1));
        assert_eq!(Span::new(3, 5).len(), 2);
    }
}

//! Parse diagnostics.
//!
//! Diagnostics are plain data collected during scanning/parsing; nothing in the
//! frontend ever raises one. Parse errors and warnings share the same shape.

use std::cmp::Ordering;

use crate::ast::Span;

/// A single error or warning attached (optionally) to a source range and file.
///
/// The `filename` is filled in by the include cache when diagnostics from
/// several files get aggregated; diagnostics produced while parsing a lone
/// text have `filename == None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub message: String,
    pub location: Option<Span>,
    pub filename: Option<String>,
}

impl Diagnostic {
    pub fn new(message: impl Into<String>, location: Span) -> Self {
        Self {
            message: message.into(),
            location: Some(location),
            filename: None,
        }
    }

    pub fn without_location(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            location: None,
            filename: None,
        }
    }

    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }
}

/// Presentation order: location-less diagnostics first, then diagnostics
/// without a filename, then by filename, line, and column.
pub fn compare(a: &Diagnostic, b: &Diagnostic) -> Ordering {
    let (la, lb) = match (&a.location, &b.location) {
        (None, None) => return Ordering::Equal,
        (None, Some(_)) => return Ordering::Less,
        (Some(_), None) => return Ordering::Greater,
        (Some(la), Some(lb)) => (la, lb),
    };
    let by_file = match (&a.filename, &b.filename) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(fa), Some(fb)) => fa.cmp(fb),
    };
    by_file
        .then(la.begin.line.cmp(&lb.begin.line))
        .then(la.begin.col.cmp(&lb.begin.col))
}

/// Sort diagnostics into presentation order (stable).
pub fn sort(diagnostics: &mut [Diagnostic]) {
    diagnostics.sort_by(compare);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Pos, Span};

    fn at(line: u32, col: u32) -> Span {
        Span::at(Pos::new(0, line, col))
    }

    #[test]
    fn test_no_location_sorts_first() {
        let mut ds = vec![
            Diagnostic::new("b", at(1, 1)),
            Diagnostic::without_location("a"),
        ];
        sort(&mut ds);
        assert_eq!(ds[0].message, "a");
        assert_eq!(ds[1].message, "b");
    }

    #[test]
    fn test_no_filename_before_filename() {
        let mut ds = vec![
            Diagnostic::new("included", at(1, 1)).with_filename("Lib.aes"),
            Diagnostic::new("root", at(9, 9)),
        ];
        sort(&mut ds);
        assert_eq!(ds[0].message, "root");
        assert_eq!(ds[1].message, "included");
    }

    #[test]
    fn test_line_then_column() {
        let mut ds = vec![
            Diagnostic::new("c", at(2, 1)),
            Diagnostic::new("b", at(1, 7)),
            Diagnostic::new("a", at(1, 3)),
        ];
        sort(&mut ds);
        let messages: Vec<_> = ds.iter().map(|d| d.message.as_str()).collect();
        assert_eq!(messages, ["a", "b", "c"]);
    }

    #[test]
    fn test_filename_order_is_lexicographic() {
        let mut ds = vec![
            Diagnostic::new("z", at(1, 1)).with_filename("Z.aes"),
            Diagnostic::new("a", at(5, 5)).with_filename("A.aes"),
        ];
        sort(&mut ds);
        assert_eq!(ds[0].message, "a");
        assert_eq!(ds[1].message, "z");
    }
}

//! Buffered diagnostics for one compile pass.
//!
//! Neither the parser nor the compiler ever raises a hard error that aborts
//! the whole show: a bad continuity is advisory for that one marcher's
//! command chain, so the author sees as many problems as one pass can find.
//! `ErrorTable` is the accumulator both layers write into and the one the
//! caller reads back after `calchart_core::compile_show`.

use std::collections::HashSet;

use calchart_ast::Span;
use thiserror::Error;

/// The ten kinds of advisory error a compile can register.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    #[error("ran out of time for this procedure; it was clipped to fit the sheet")]
    OutOfTime,
    #[error("procedures left time unused; marcher stands mark-time for the remainder")]
    ExtraTime,
    #[error("marcher did not arrive at the expected position for the next sheet")]
    WrongPlace,
    #[error("countermarch's current position does not lie on any leg of the path")]
    InvalidCm,
    #[error("fountain decomposition has no solution for the given directions")]
    InvalidFntn,
    #[error("division by a value too close to zero")]
    DivisionZero,
    #[error("read of an unset continuity variable or a degenerate direction")]
    Undefined,
    #[error("continuity text did not parse")]
    Syntax,
    #[error("value used as a beat count was not within tolerance of an integer")]
    NonInt,
    #[error("value used as a beat count rounded to a negative integer")]
    NegInt,
}

impl ErrorKind {
    pub const ALL: [ErrorKind; 10] = [
        ErrorKind::OutOfTime,
        ErrorKind::ExtraTime,
        ErrorKind::WrongPlace,
        ErrorKind::InvalidCm,
        ErrorKind::InvalidFntn,
        ErrorKind::DivisionZero,
        ErrorKind::Undefined,
        ErrorKind::Syntax,
        ErrorKind::NonInt,
        ErrorKind::NegInt,
    ];
}

/// One error kind's accumulated state for a single compile pass: which
/// marchers tripped it, and the source span of the first occurrence (for
/// jumping the editor cursor there).
#[derive(Debug, Clone, Default)]
pub struct ErrorMarker {
    marchers: HashSet<usize>,
    first_span: Option<Span>,
}

impl ErrorMarker {
    pub fn marchers(&self) -> impl Iterator<Item = usize> + '_ {
        self.marchers.iter().copied()
    }

    pub fn contains(&self, marcher: usize) -> bool {
        self.marchers.contains(&marcher)
    }

    pub fn first_span(&self) -> Option<Span> {
        self.first_span
    }

    pub fn is_empty(&self) -> bool {
        self.marchers.is_empty()
    }
}

/// The full set of errors a compile pass produced, grouped by kind.
#[derive(Debug, Clone, Default)]
pub struct ErrorTable {
    markers: [ErrorMarker; 10],
}

fn kind_index(kind: ErrorKind) -> usize {
    ErrorKind::ALL.iter().position(|k| *k == kind).expect("ErrorKind::ALL is exhaustive")
}

impl ErrorTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `kind` against `marcher`, recording `span` only if this is
    /// the first time this `kind` has been seen this compile.
    pub fn register(&mut self, kind: ErrorKind, marcher: usize, span: Span) {
        let marker = &mut self.markers[kind_index(kind)];
        if marker.marchers.is_empty() {
            marker.first_span = Some(span);
        }
        marker.marchers.insert(marcher);
    }

    pub fn marker(&self, kind: ErrorKind) -> &ErrorMarker {
        &self.markers[kind_index(kind)]
    }

    pub fn is_empty(&self) -> bool {
        self.markers.iter().all(ErrorMarker::is_empty)
    }

    /// Iterates every non-empty `(kind, marker)` pair, for a UI that wants
    /// to light up offending dots per error kind.
    pub fn non_empty(&self) -> impl Iterator<Item = (ErrorKind, &ErrorMarker)> {
        ErrorKind::ALL
            .into_iter()
            .zip(self.markers.iter())
            .filter(|(_, marker)| !marker.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_span_is_sticky() {
        let mut table = ErrorTable::new();
        let first = Span::new(1, 1, 3);
        let second = Span::new(2, 1, 3);
        table.register(ErrorKind::OutOfTime, 0, first);
        table.register(ErrorKind::OutOfTime, 1, second);
        let marker = table.marker(ErrorKind::OutOfTime);
        assert_eq!(marker.first_span(), Some(first));
        assert!(marker.contains(0));
        assert!(marker.contains(1));
        assert!(!marker.contains(2));
    }

    #[test]
    fn empty_table_reports_empty() {
        let table = ErrorTable::new();
        assert!(table.is_empty());
        assert_eq!(table.non_empty().count(), 0);
    }
}

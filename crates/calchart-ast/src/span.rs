/// Where a token or node came from in the original continuity text.
///
/// `line`/`column` are 1-based, matching the convention a human reading a
/// source listing expects; `length` is the number of characters the node's
/// own text occupies (not including any child nodes), so the UI layer can
/// underline exactly the offending fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Span {
    pub line: u32,
    pub column: u32,
    pub length: u32,
}

impl Span {
    pub const fn new(line: u32, column: u32, length: u32) -> Self {
        Span {
            line,
            column,
            length,
        }
    }

    /// A placeholder span for nodes synthesized by the compiler itself
    /// (e.g. the implicit terminal move appended after a procedure list
    /// runs out), which have no corresponding source text.
    pub const fn synthetic() -> Self {
        Span::new(0, 0, 0)
    }
}

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The dot glyph used to draw a marcher on the field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Symbol {
    Plain,
    Sol,
    Bksl,
    Sl,
    X,
    SolBksl,
    SolSl,
    SolX,
}

impl Default for Symbol {
    fn default() -> Self {
        Symbol::Plain
    }
}

//! AST node types for the CalChart continuity DSL.
//!
//! Every node is a closed, exhaustively-matched `enum` rather than a class
//! hierarchy with virtual dispatch: the DSL's node shapes are fixed (no
//! plugin grammar), so a sum type is lighter and lets the compiler check
//! exhaustiveness for us at every consumer (the parser builds these, the
//! compiler in `calchart-compiler` walks them).

mod point;
mod procedure;
mod span;
mod value;

pub use point::Point;
pub use procedure::Procedure;
pub use span::Span;
pub use value::{DefinedValue, Function, Value, Variable};

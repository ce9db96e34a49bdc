//! Primitive `AnimateCommand` motion steps and the per-sheet command arena.
//!
//! A marcher's compiled procedure list becomes a chain of these primitives
//! (hold, straight move, arc), threaded together as an index-keyed doubly
//! linked list inside one [`arena::CommandArena`] per sheet — see
//! [`arena`]'s doc comment for why an arena replaces raw `prev`/`next`
//! pointers (spec §9 "Cyclic owner/child references").

mod arena;
mod command;
mod dir;

pub use arena::{AnimateSheet, ChainNode, CommandArena, CommandId, MarcherChain};
pub use command::{AnimateCommand, AnimateCommandKind, AnimatePoint};
pub use dir::AnimateDir;

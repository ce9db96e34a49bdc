use calchart_geom::Coord;

use crate::command::AnimateCommand;

/// An index into one sheet's [`CommandArena`]. Plain `Copy` data, not a
/// pointer: the doubly linked command chain is represented as an
/// index-keyed list inside an owning arena rather than `Box`-based
/// prev/next pointers, so ownership stays acyclic (spec §9 "Cyclic
/// owner/child references").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CommandId(u32);

/// One node in the arena: the primitive command plus its neighbours in the
/// owning marcher's chain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChainNode {
    pub command: AnimateCommand,
    pub prev: Option<CommandId>,
    pub next: Option<CommandId>,
}

/// The owning store for every command on one sheet, across every marcher.
/// Each marcher's chain is a subsequence of this arena threaded together by
/// `prev`/`next` indices; the arena itself owns every node, so walking
/// `next` from a chain's head can never outlive the arena, and there is no
/// `unsafe` needed to support backward traversal.
#[derive(Debug, Clone, Default)]
pub struct CommandArena {
    nodes: Vec<ChainNode>,
}

impl CommandArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: CommandId) -> &ChainNode {
        &self.nodes[id.0 as usize]
    }

    pub fn get_mut(&mut self, id: CommandId) -> &mut ChainNode {
        &mut self.nodes[id.0 as usize]
    }

    /// Appends `command` to the arena, linking it after `tail` (if any).
    /// Returns the new node's id, which becomes the chain's new tail.
    pub fn push_after(&mut self, tail: Option<CommandId>, command: AnimateCommand) -> CommandId {
        let id = CommandId(self.nodes.len() as u32);
        self.nodes.push(ChainNode {
            command,
            prev: tail,
            next: None,
        });
        if let Some(tail_id) = tail {
            self.nodes[tail_id.0 as usize].next = Some(id);
        }
        id
    }
}

/// One marcher's command chain on a sheet: a head/tail pair into the
/// sheet's shared [`CommandArena`], plus the positions the chain starts and
/// ends at (cached so neither `calchart-anim`'s sheet refresh nor a UI
/// wanting the landing spot needs to walk the whole chain).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarcherChain {
    pub head: Option<CommandId>,
    pub tail: Option<CommandId>,
    pub start_position: Coord,
    pub end_position: Coord,
}

impl MarcherChain {
    pub fn empty(start_position: Coord) -> Self {
        MarcherChain {
            head: None,
            tail: None,
            start_position,
            end_position: start_position,
        }
    }
}

/// The compiled per-sheet result: every marcher's command chain, sharing
/// one arena. An `AnimateSheet` is immutable once built — `calchart-anim`
/// only ever reads it.
#[derive(Debug, Clone)]
pub struct AnimateSheet {
    pub name: String,
    pub numbeats: u32,
    pub commands: CommandArena,
    pub marchers: Vec<MarcherChain>,
}

impl AnimateSheet {
    pub fn new(name: impl Into<String>, numbeats: u32, num_marchers: usize, start_positions: &[Coord]) -> Self {
        AnimateSheet {
            name: name.into(),
            numbeats,
            commands: CommandArena::new(),
            marchers: (0..num_marchers)
                .map(|i| MarcherChain::empty(start_positions[i]))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::AnimateCommand;

    #[test]
    fn chain_links_are_doubly_traversable() {
        let mut arena = CommandArena::new();
        let a = arena.push_after(None, AnimateCommand::hold(4, 0.0));
        let b = arena.push_after(Some(a), AnimateCommand::hold(4, 90.0));
        assert_eq!(arena.get(a).next, Some(b));
        assert_eq!(arena.get(b).prev, Some(a));
        assert_eq!(arena.get(b).next, None);
    }
}

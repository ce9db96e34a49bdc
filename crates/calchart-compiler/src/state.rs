use calchart_ast::{Span, Variable};
use calchart_command::{AnimateCommand, AnimatePoint, CommandArena, CommandId};
use calchart_diagnostics::{ErrorKind, ErrorTable};
use calchart_geom::Coord;
use calchart_show::NUM_REF_PNTS;

/// One marcher's compile-time state for one sheet: the running position,
/// the growing command chain, the remaining beat budget, and the nine
/// continuity variable slots (spec §4.2 "Compile state").
pub struct CompileState<'a> {
    pub marcher: usize,
    pub pt: AnimatePoint,
    pub start: Coord,
    /// Position on the next sheet, or `None` on the last animated sheet —
    /// where `NextPoint` falls back to whatever the current position is at
    /// evaluation time (`ContNextPoint::Get` in the original: "if there is
    /// no next sheet, `NP` means `P`").
    pub next: Option<Coord>,
    pub ref_positions: [Coord; NUM_REF_PNTS],
    pub beats_rem: u32,
    vars: [Option<f64>; 9],
    head: Option<CommandId>,
    tail: Option<CommandId>,
    arena: &'a mut CommandArena,
    pub errors: &'a mut ErrorTable,
}

impl<'a> CompileState<'a> {
    pub fn new(
        marcher: usize,
        start: Coord,
        next: Option<Coord>,
        ref_positions: [Coord; NUM_REF_PNTS],
        beats: u32,
        arena: &'a mut CommandArena,
        errors: &'a mut ErrorTable,
    ) -> Self {
        CompileState {
            marcher,
            pt: AnimatePoint::new(start),
            start,
            next,
            ref_positions,
            beats_rem: beats,
            vars: [None; 9],
            head: None,
            tail: None,
            arena,
            errors,
        }
    }

    pub fn cur(&self) -> Coord {
        self.pt.pos
    }

    pub fn set_var(&mut self, var: Variable, value: f64) {
        self.vars[var.slot()] = Some(value);
    }

    /// Reads a continuity variable, registering `Undefined` against this
    /// marcher at `span` on first read of an unset slot (spec §4.2 `vars`:
    /// "initialised to unset; reading an unset variable registers
    /// UNDEFINED").
    pub fn read_var(&mut self, var: Variable, span: Span) -> f64 {
        match self.vars[var.slot()] {
            Some(v) => v,
            None => {
                self.errors.register(ErrorKind::Undefined, self.marcher, span);
                0.0
            }
        }
    }

    pub fn var_slot(&self, var: Variable) -> Option<f64> {
        self.vars[var.slot()]
    }

    pub fn register(&mut self, kind: ErrorKind, span: Span) {
        self.errors.register(kind, self.marcher, span);
    }

    /// Implements spec §4.2's `Append` primitive: clips an over-budget
    /// command, links it onto the tail of the chain, decrements the
    /// remaining beat budget, and immediately applies it so subsequent
    /// procedures see the resulting position. Returns `false` iff there was
    /// no time left to append anything at all (`beats_rem == 0` before this
    /// call), mirroring `AnimateCompile::Append`'s `Bool` return used by
    /// multi-leg procedures (`EWNS`, `DMHS`, ...) to bail after their first
    /// leg.
    pub fn append(&mut self, mut cmd: AnimateCommand, span: Span) -> bool {
        if self.beats_rem == 0 {
            return false;
        }
        if cmd.numbeats() > self.beats_rem {
            cmd.clip_beats(self.beats_rem);
            self.errors.register(ErrorKind::OutOfTime, self.marcher, span);
        }
        self.beats_rem -= cmd.numbeats();
        let id = self.arena.push_after(self.tail, cmd);
        if self.head.is_none() {
            self.head = Some(id);
        }
        self.tail = Some(id);
        self.arena.get(id).command.apply_forward(&mut self.pt);
        true
    }

    pub fn finish(self) -> (Option<CommandId>, Option<CommandId>, Coord) {
        (self.head, self.tail, self.pt.pos)
    }
}

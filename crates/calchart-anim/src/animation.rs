use calchart_command::{AnimateCommand, AnimatePoint, AnimateSheet, CommandId};
use calchart_geom::Coord;

use crate::collision::{scan_collisions, CollisionPolicy};

/// Steps a compiled show's [`AnimateSheet`]s forward and backward one beat
/// at a time. Built once from the sheets a `compile_show` pass produced;
/// the sheets themselves are read-only for `Animation`'s whole lifetime —
/// only the cursor (`current_sheet`, `current_beat`, per-marcher live
/// position/command/collision state) is mutable (spec §4.4 "Shared-resource
/// policy").
///
/// Per-marcher "current command" state is kept as `Animation`'s own
/// `Copy` of the `AnimateCommand` found at `current_ids[i]`, not a mutation
/// of the shared arena node: the arena stores the immutable compiled
/// program, while the beat cursor inside a command (`AnimateCommand::beat`)
/// is playback state private to this `Animation`. `Animation` owns its
/// sheets outright rather than borrowing them — since `AnimateSheet` is
/// `Clone`, two independent playback cursors over the same compiled show
/// are just two `Animation`s built from the same cloned `Vec`.
pub struct Animation {
    sheets: Vec<AnimateSheet>,
    current_sheet: usize,
    current_beat: u32,
    points: Vec<AnimatePoint>,
    current_ids: Vec<Option<CommandId>>,
    current_cmds: Vec<Option<AnimateCommand>>,
    collisions: Vec<bool>,
    pub collision_policy: CollisionPolicy,
}

impl Animation {
    /// Builds an `Animation` over `sheets`, refreshed to the first sheet.
    /// Panics if `sheets` is empty — an `Animation` always has a current
    /// sheet (mirrors spec §6: a compiled show is never animation-less).
    pub fn new(sheets: Vec<AnimateSheet>) -> Self {
        assert!(!sheets.is_empty(), "cannot animate a show with no sheets");
        let num_marchers = sheets[0].marchers.len();
        let mut anim = Animation {
            sheets,
            current_sheet: 0,
            current_beat: 0,
            points: vec![AnimatePoint::new(Coord::new(0, 0)); num_marchers],
            current_ids: vec![None; num_marchers],
            current_cmds: vec![None; num_marchers],
            collisions: vec![false; num_marchers],
            collision_policy: CollisionPolicy::None,
        };
        anim.refresh_sheet();
        anim
    }

    pub fn current_sheet_index(&self) -> usize {
        self.current_sheet
    }

    pub fn current_beat(&self) -> u32 {
        self.current_beat
    }

    pub fn current_sheet(&self) -> &AnimateSheet {
        &self.sheets[self.current_sheet]
    }

    pub fn position(&self, marcher: usize) -> Coord {
        self.points[marcher].pos
    }

    pub fn facing(&self, marcher: usize) -> f64 {
        self.points[marcher].facing
    }

    pub fn is_colliding(&self, marcher: usize) -> bool {
        self.collisions[marcher]
    }

    /// Jumps directly to sheet `i`, clamped to the last sheet (the original
    /// walked an unchecked `next` pointer `i` times; clamping here avoids
    /// the equivalent of a null dereference for an out-of-range `i`).
    pub fn goto_sheet(&mut self, i: usize) {
        self.current_sheet = i.min(self.sheets.len() - 1);
        self.refresh_sheet();
    }

    pub fn next_sheet(&mut self) -> bool {
        if self.current_sheet + 1 < self.sheets.len() {
            self.current_sheet += 1;
            self.refresh_sheet();
            true
        } else if self.current_sheet == 0 && self.current_beat != 0 {
            self.refresh_sheet();
            true
        } else {
            false
        }
    }

    pub fn prev_sheet(&mut self) -> bool {
        if self.current_sheet > 0 {
            self.current_sheet -= 1;
        }
        self.refresh_sheet();
        true
    }

    pub fn next_beat(&mut self) -> bool {
        self.current_beat += 1;
        if self.current_beat >= self.sheets[self.current_sheet].numbeats {
            return self.next_sheet();
        }
        for i in 0..self.points.len() {
            let advanced = match &mut self.current_cmds[i] {
                Some(cmd) => cmd.next_beat(&mut self.points[i]),
                None => true,
            };
            if !advanced {
                let idx = self.current_sheet;
                self.current_ids[i] = self.current_ids[i].and_then(|id| self.sheets[idx].commands.get(id).next);
                self.begin_cmd(i);
            }
        }
        self.rescan_collisions();
        true
    }

    pub fn prev_beat(&mut self) -> bool {
        if self.current_beat == 0 {
            if self.current_sheet == 0 {
                return false;
            }
            self.current_sheet -= 1;
            let idx = self.current_sheet;
            for i in 0..self.points.len() {
                self.current_ids[i] = self.sheets[idx].marchers[i].tail;
                self.end_cmd(i);
            }
            self.current_beat = self.sheets[idx].numbeats;
        }
        for i in 0..self.points.len() {
            loop {
                let stepped_back = match &mut self.current_cmds[i] {
                    Some(cmd) => cmd.prev_beat(&mut self.points[i]),
                    None => break,
                };
                if stepped_back {
                    break;
                }
                let idx = self.current_sheet;
                self.current_ids[i] = self.current_ids[i].and_then(|id| self.sheets[idx].commands.get(id).prev);
                self.end_cmd(i);
            }
        }
        self.current_beat -= 1;
        self.rescan_collisions();
        true
    }

    fn refresh_sheet(&mut self) {
        let idx = self.current_sheet;
        for i in 0..self.points.len() {
            self.points[i].pos = self.sheets[idx].marchers[i].start_position;
            self.current_ids[i] = self.sheets[idx].marchers[i].head;
        }
        self.current_beat = 0;
        for i in 0..self.points.len() {
            self.begin_cmd(i);
        }
        self.rescan_collisions();
    }

    /// Walks forward from `current_ids[i]`, skipping zero-beat commands,
    /// until one accepts `Begin` (non-zero-beat) or the chain runs out.
    fn begin_cmd(&mut self, i: usize) {
        let idx = self.current_sheet;
        loop {
            let Some(id) = self.current_ids[i] else {
                self.current_cmds[i] = None;
                return;
            };
            let mut cmd = self.sheets[idx].commands.get(id).command;
            if cmd.begin(&mut self.points[i]) {
                self.current_cmds[i] = Some(cmd);
                return;
            }
            self.current_ids[i] = self.sheets[idx].commands.get(id).next;
        }
    }

    /// Same walk as [`Self::begin_cmd`] but settling via `End` — used when
    /// the cursor lands on a command from the tail (`PrevBeat`'s sheet
    /// crossing) or after stepping one link backward, matching
    /// `Animation::EndCmd`'s always-forward skip in the original.
    fn end_cmd(&mut self, i: usize) {
        let idx = self.current_sheet;
        loop {
            let Some(id) = self.current_ids[i] else {
                self.current_cmds[i] = None;
                return;
            };
            let mut cmd = self.sheets[idx].commands.get(id).command;
            if cmd.end(&mut self.points[i]) {
                self.current_cmds[i] = Some(cmd);
                return;
            }
            self.current_ids[i] = self.sheets[idx].commands.get(id).next;
        }
    }

    fn rescan_collisions(&mut self) {
        if !self.collision_policy.is_active() {
            self.collisions.iter_mut().for_each(|f| *f = false);
            return;
        }
        let positions: Vec<Coord> = self.points.iter().map(|p| p.pos).collect();
        scan_collisions(&positions, &mut self.collisions);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use calchart_command::{AnimateSheet, CommandArena};

    fn one_marcher_sheet(name: &str, start: Coord, cmd: Option<AnimateCommand>, numbeats: u32) -> AnimateSheet {
        let mut arena = CommandArena::new();
        let mut sheet = AnimateSheet::new(name, numbeats, 1, &[start]);
        if let Some(cmd) = cmd {
            let id = arena.push_after(None, cmd);
            sheet.marchers[0].head = Some(id);
            sheet.marchers[0].tail = Some(id);
        }
        sheet.commands = arena;
        sheet.marchers[0].end_position = start;
        sheet
    }

    /// `NextBeat` only steps a command forward when `current_beat` stays
    /// under the sheet's `numbeats` after incrementing; reaching it hands
    /// off to `NextSheet` immediately, without applying that last beat's
    /// displacement (mirrors `Animation::NextBeat` in the original, where
    /// the final position comes from the following sheet's own recorded
    /// start, not from walking the command to its last beat).
    #[test]
    fn next_beat_crossing_into_the_next_sheet_lands_on_its_recorded_start() {
        let start = Coord::from_steps(0.0, 0.0);
        let vector = Coord::from_steps(4.0, 0.0);
        let sheet_a = one_marcher_sheet("1", start, Some(AnimateCommand::mv(4, vector)), 4);
        let sheet_b = one_marcher_sheet("2", start + vector, None, 4);
        let sheets = vec![sheet_a, sheet_b];
        let mut anim = Animation::new(sheets);
        assert_eq!(anim.position(0), start);
        for _ in 0..4 {
            anim.next_beat();
        }
        assert_eq!(anim.current_sheet_index(), 1);
        assert_eq!(anim.position(0), start + vector);
    }

    #[test]
    fn prev_beat_undoes_next_beat_within_the_same_sheet() {
        let start = Coord::from_steps(0.0, 0.0);
        let vector = Coord::from_steps(4.0, 0.0);
        let sheet = one_marcher_sheet("1", start, Some(AnimateCommand::mv(4, vector)), 4);
        let sheets = vec![sheet];
        let mut anim = Animation::new(sheets);
        anim.next_beat();
        anim.next_beat();
        anim.prev_beat();
        anim.prev_beat();
        assert_eq!(anim.current_beat(), 0);
        assert_eq!(anim.position(0), start);
    }

    #[test]
    fn next_sheet_refreshes_cursor_to_the_new_sheets_start() {
        let a_start = Coord::from_steps(0.0, 0.0);
        let b_start = Coord::from_steps(10.0, 0.0);
        let sheet_a = one_marcher_sheet("1", a_start, None, 4);
        let sheet_b = one_marcher_sheet("2", b_start, None, 4);
        let sheets = vec![sheet_a, sheet_b];
        let mut anim = Animation::new(sheets);
        assert!(anim.next_sheet());
        assert_eq!(anim.current_sheet_index(), 1);
        assert_eq!(anim.position(0), b_start);
    }

    #[test]
    fn collision_policy_none_never_flags() {
        let start = Coord::from_steps(0.0, 0.0);
        let sheet = one_marcher_sheet("1", start, None, 4);
        let sheets = vec![sheet];
        let mut anim = Animation::new(sheets);
        anim.collision_policy = CollisionPolicy::None;
        anim.next_beat();
        assert!(!anim.is_colliding(0));
    }
}

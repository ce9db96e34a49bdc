use calchart_geom::Coord;

use crate::dir::AnimateDir;

/// An `AnimatePoint`'s live position plus its current facing angle, in
/// degrees. `facing` is kept in sync by whichever `AnimateCommand` is
/// currently stepping this point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimatePoint {
    pub pos: Coord,
    pub facing: f64,
}

impl AnimatePoint {
    pub fn new(pos: Coord) -> Self {
        AnimatePoint { pos, facing: 0.0 }
    }
}

/// Integer division that rounds toward negative infinity, not toward zero.
/// `AnimateCommandMove`'s per-beat interpolation depends on this rounding
/// direction (spec §4.3): `floor(beat * delta / numbeats)`, which must
/// telescope exactly back to the whole displacement over `numbeats` calls
/// regardless of the sign of `delta`.
fn floor_div(a: i64, b: i64) -> i64 {
    let q = a / b;
    let r = a % b;
    if (r != 0) && ((r < 0) != (b < 0)) {
        q - 1
    } else {
        q
    }
}

/// The shape-specific payload of one primitive motion step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AnimateCommandKind {
    /// Stand still, holding `facing_dir` degrees.
    Hold { facing_dir: f64 },
    /// A straight-line displacement of `vector`. `facing_dir_override`, when
    /// set, is the facing angle reported instead of the direction of
    /// travel — how a backwards march keeps facing the opposite way from
    /// where it's moving.
    Move {
        vector: Coord,
        facing_dir_override: Option<f64>,
    },
    /// An arc about `center` with the given `radius` (in coord units, not
    /// steps), sweeping from `ang_start` to `ang_end` degrees. `backwards`
    /// flips the tangent-to-facing convention the same way a reversed
    /// `ROTATE` direction does.
    Rotate {
        center: Coord,
        radius: f64,
        ang_start: f64,
        ang_end: f64,
        backwards: bool,
    },
}

/// One primitive motion command in a marcher's per-sheet chain. `numbeats`
/// may be `0` (an instantaneous displacement, e.g. `MAGIC`/`GRID`); the
/// `beat` cursor is the only mutable field, shared by `begin`/`end`/
/// `next_beat`/`prev_beat`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimateCommand {
    pub kind: AnimateCommandKind,
    numbeats: u32,
    beat: u32,
}

impl AnimateCommand {
    pub fn hold(numbeats: u32, facing_dir: f64) -> Self {
        AnimateCommand {
            kind: AnimateCommandKind::Hold { facing_dir },
            numbeats,
            beat: 0,
        }
    }

    pub fn mv(numbeats: u32, vector: Coord) -> Self {
        AnimateCommand {
            kind: AnimateCommandKind::Move {
                vector,
                facing_dir_override: None,
            },
            numbeats,
            beat: 0,
        }
    }

    pub fn mv_facing(numbeats: u32, vector: Coord, facing_dir: f64) -> Self {
        AnimateCommand {
            kind: AnimateCommandKind::Move {
                vector,
                facing_dir_override: Some(facing_dir),
            },
            numbeats,
            beat: 0,
        }
    }

    pub fn rotate(
        numbeats: u32,
        center: Coord,
        radius: f64,
        ang_start: f64,
        ang_end: f64,
        backwards: bool,
    ) -> Self {
        AnimateCommand {
            kind: AnimateCommandKind::Rotate {
                center,
                radius,
                ang_start,
                ang_end,
                backwards,
            },
            numbeats,
            beat: 0,
        }
    }

    pub fn numbeats(&self) -> u32 {
        self.numbeats
    }

    pub fn beat(&self) -> u32 {
        self.beat
    }

    /// Clips this command's beat budget down to `beats`, used by the
    /// compiler's `Append` when a procedure overruns the sheet's remaining
    /// time.
    pub fn clip_beats(&mut self, beats: u32) {
        self.numbeats = beats;
    }

    /// Seeks to beat 0. Returns `false` without consuming a beat for a
    /// zero-beat command — the displacement is still applied, which is how
    /// instantaneous directives like `MAGIC`/`GRID` work. For a non-zero
    /// command `pt.pos` is left untouched: the chain-building invariant
    /// (every command's exit position is the next command's entry
    /// position, and the sheet's stored start position is the first
    /// command's entry position) already guarantees `pt` is correctly
    /// placed whenever `begin` is reached.
    pub fn begin(&mut self, pt: &mut AnimatePoint) -> bool {
        self.beat = 0;
        if self.numbeats == 0 {
            self.apply_forward(pt);
            return false;
        }
        pt.facing = self.facing_at(0.0);
        true
    }

    /// Seeks to the final beat. Mirrors `begin`'s zero-beat handling and
    /// the same left-untouched invariant for `pt.pos` otherwise.
    pub fn end(&mut self, pt: &mut AnimatePoint) -> bool {
        self.beat = self.numbeats;
        if self.numbeats == 0 {
            self.apply_backward(pt);
            return false;
        }
        pt.facing = self.facing_at(1.0);
        true
    }

    /// Advances one beat, returning `false` once the command is exhausted
    /// (the caller then advances to the next command in the chain).
    pub fn next_beat(&mut self, pt: &mut AnimatePoint) -> bool {
        let from_beat = self.beat;
        self.beat += 1;
        self.step(pt, from_beat, self.beat);
        self.beat < self.numbeats
    }

    /// Steps one beat backward, returning `false` at the command's start.
    pub fn prev_beat(&mut self, pt: &mut AnimatePoint) -> bool {
        if self.beat == 0 {
            return false;
        }
        let from_beat = self.beat;
        self.beat -= 1;
        self.step(pt, from_beat, self.beat);
        true
    }

    /// Moves `pt` from `from_beat` to `to_beat` within a non-zero-beat
    /// command (both relative to `self.numbeats`, which is guaranteed
    /// nonzero here: zero-beat commands never reach `next_beat`/`prev_beat`,
    /// `begin`/`end` intercept them first).
    fn step(&self, pt: &mut AnimatePoint, from_beat: u32, to_beat: u32) {
        match self.kind {
            AnimateCommandKind::Hold { .. } => {}
            AnimateCommandKind::Move { vector, .. } => {
                let n = self.numbeats as i64;
                let dx = floor_div(to_beat as i64 * vector.x as i64, n)
                    - floor_div(from_beat as i64 * vector.x as i64, n);
                let dy = floor_div(to_beat as i64 * vector.y as i64, n)
                    - floor_div(from_beat as i64 * vector.y as i64, n);
                pt.pos.x += dx as i32;
                pt.pos.y += dy as i32;
            }
            AnimateCommandKind::Rotate { .. } => {
                let t = to_beat as f64 / self.numbeats as f64;
                pt.pos = self.rotate_pos_at(t);
            }
        }
        pt.facing = self.facing_at(to_beat as f64 / self.numbeats.max(1) as f64);
    }

    fn rotate_pos_at(&self, t: f64) -> Coord {
        let (center, radius, ang_start, ang_end) = match self.kind {
            AnimateCommandKind::Rotate {
                center,
                radius,
                ang_start,
                ang_end,
                ..
            } => (center, radius, ang_start, ang_end),
            _ => unreachable!("rotate_pos_at only used for Rotate"),
        };
        let ang = (ang_end - ang_start) * t + ang_start;
        let rad = ang.to_radians();
        Coord::new(
            center.x + (rad.cos() * radius).round() as i32,
            center.y - (rad.sin() * radius).round() as i32,
        )
    }

    fn facing_at(&self, t: f64) -> f64 {
        match self.kind {
            AnimateCommandKind::Hold { facing_dir } => facing_dir,
            AnimateCommandKind::Move {
                vector,
                facing_dir_override,
            } => facing_dir_override.unwrap_or_else(|| vector.direction()),
            AnimateCommandKind::Rotate {
                ang_start,
                ang_end,
                backwards,
                ..
            } => {
                let tangent = (ang_end - ang_start) * t + ang_start;
                if backwards {
                    tangent - 90.0
                } else {
                    tangent + 90.0
                }
            }
        }
    }

    /// Applies the command's whole displacement in one step, without
    /// consuming the beat cursor — used for a zero-beat command and by the
    /// compiler's `Append` to advance its running position.
    pub fn apply_forward(&self, pt: &mut AnimatePoint) {
        match self.kind {
            AnimateCommandKind::Hold { facing_dir } => {
                pt.facing = facing_dir;
            }
            AnimateCommandKind::Move { vector, .. } => {
                pt.pos += vector;
                pt.facing = self.facing_at(1.0);
            }
            AnimateCommandKind::Rotate { .. } => {
                pt.pos = self.rotate_pos_at(1.0);
                pt.facing = self.facing_at(1.0);
            }
        }
    }

    pub fn apply_backward(&self, pt: &mut AnimatePoint) {
        match self.kind {
            AnimateCommandKind::Hold { facing_dir } => {
                pt.facing = facing_dir;
            }
            AnimateCommandKind::Move { vector, .. } => {
                pt.pos -= vector;
                pt.facing = self.facing_at(0.0);
            }
            AnimateCommandKind::Rotate { .. } => {
                pt.pos = self.rotate_pos_at(0.0);
                pt.facing = self.facing_at(0.0);
            }
        }
    }

    /// The renderer's 8-way facing at the command's current beat.
    pub fn direction(&self) -> AnimateDir {
        AnimateDir::from_angle(self.real_direction())
    }

    /// The facing angle, in degrees, at the command's current beat.
    pub fn real_direction(&self) -> f64 {
        self.facing_at(self.beat as f64 / self.numbeats.max(1) as f64)
    }

    /// The direction of travel at the command's current beat, distinct from
    /// `real_direction` for a backwards march (which faces opposite its
    /// motion).
    pub fn motion_direction(&self) -> f64 {
        match self.kind {
            AnimateCommandKind::Hold { facing_dir } => facing_dir,
            AnimateCommandKind::Move { vector, .. } => vector.direction(),
            AnimateCommandKind::Rotate { .. } => {
                self.facing_at(self.beat as f64 / self.numbeats.max(1) as f64)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;

    #[test]
    fn zero_beat_move_applies_displacement_without_consuming_a_beat() {
        let mut cmd = AnimateCommand::mv(0, Coord::from_steps(2.0, 0.0));
        let mut pt = AnimatePoint::new(Coord::from_steps(0.0, 0.0));
        assert!(!cmd.begin(&mut pt));
        assert_eq!(pt.pos, Coord::from_steps(2.0, 0.0));
        assert!(!cmd.end(&mut pt));
        assert_eq!(pt.pos, Coord::from_steps(0.0, 0.0));
    }

    #[test]
    fn forward_then_backward_is_identity() {
        let cmd = AnimateCommand::mv(4, Coord::from_steps(3.0, -2.0));
        let start = AnimatePoint::new(Coord::from_steps(1.0, 1.0));
        let mut pt = start;
        cmd.apply_forward(&mut pt);
        cmd.apply_backward(&mut pt);
        assert_eq!(pt.pos, start.pos);
    }

    #[test]
    fn step_round_trip_restores_exact_position() {
        let mut cmd = AnimateCommand::mv(7, Coord::from_steps(5.0, -3.0));
        let mut pt = AnimatePoint::new(Coord::from_steps(0.0, 0.0));
        cmd.begin(&mut pt);
        let start = pt;
        for _ in 0..7 {
            cmd.next_beat(&mut pt);
        }
        assert_eq!(pt.pos, start.pos + Coord::from_steps(5.0, -3.0));
        for _ in 0..7 {
            cmd.prev_beat(&mut pt);
        }
        assert_eq!(pt.pos, start.pos);
    }

    #[test]
    fn backwards_march_faces_opposite_of_travel() {
        let cmd = AnimateCommand::mv_facing(4, Coord::from_steps(0.0, -4.0), 180.0);
        assert!(approx_eq!(f64, cmd.motion_direction(), 90.0, epsilon = 1e-6));
        assert!(approx_eq!(f64, cmd.real_direction(), 180.0, epsilon = 1e-6));
    }

    #[test]
    fn rotate_forward_backward_round_trips_position() {
        let mut cmd =
            AnimateCommand::rotate(8, Coord::from_steps(0.0, 0.0), 64.0, 0.0, 90.0, false);
        let mut pt = AnimatePoint::new(Coord::new(64, 0));
        cmd.begin(&mut pt);
        let start = pt;
        for _ in 0..8 {
            cmd.next_beat(&mut pt);
        }
        for _ in 0..8 {
            cmd.prev_beat(&mut pt);
        }
        assert_eq!(pt.pos, start.pos);
    }

    #[test]
    fn zero_beat_rotate_begin_and_end_give_distinct_endpoints() {
        let mut cmd = AnimateCommand::rotate(0, Coord::new(0, 0), 16.0, 0.0, 90.0, false);
        let mut pt = AnimatePoint::new(Coord::new(16, 0));
        cmd.begin(&mut pt);
        let forward_pos = pt.pos;
        cmd.end(&mut pt);
        let backward_pos = pt.pos;
        assert_ne!(forward_pos, backward_pos);
    }
}

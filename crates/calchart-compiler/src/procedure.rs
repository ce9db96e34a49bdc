use calchart_ast::{Procedure, Span, Variable};
use calchart_command::AnimateCommand;
use calchart_diagnostics::ErrorKind;
use calchart_geom::{create_vector, Coord, COORD_DECIMAL};

use crate::coerce::{round_beats, round_beats_abs};
use crate::countermarch::compile_countermarch;
use crate::eval::{eval_point, eval_value};
use crate::fountain::solve_fountain;
use crate::geometry::dm_hs_decompose;
use crate::state::CompileState;

/// Tolerance for treating a `GRID` size (or a `DIVISION_ZERO`-style
/// denominator elsewhere in this module) as zero.
const GRID_EPSILON: f64 = 1e-5;

/// Dispatches one procedure against `state`, mutating its running position
/// and beat budget and appending whatever `AnimateCommand`s the procedure
/// produces.
pub fn compile_procedure(state: &mut CompileState, proc: &Procedure) {
    let span = proc.span();
    match proc {
        Procedure::Set { var, value, .. } => {
            let v = eval_value(state, value);
            state.set_var(*var, v);
        }
        Procedure::Blam { .. } => {
            let beats = state.beats_rem;
            let vector = state.next.unwrap_or_else(|| state.cur()) - state.cur();
            state.append(AnimateCommand::mv(beats, vector), span);
        }
        Procedure::Cm { pnt1, pnt2, steps, dir1, dir2, beats, .. } => {
            let p1 = eval_point(state, pnt1);
            let p2 = eval_point(state, pnt2);
            let steps_val = eval_value(state, steps);
            let d1 = eval_value(state, dir1);
            let d2 = eval_value(state, dir2);
            let v1 = create_vector(d1, steps_val);
            let v2 = create_vector(d2, steps_val);
            let beats_raw = eval_value(state, beats);
            compile_countermarch(state, p1, p2, v1, v2, beats_raw, span);
        }
        Procedure::Dmcm { pnt1, pnt2, beats, .. } => {
            let p1 = eval_point(state, pnt1);
            let p2 = eval_point(state, pnt2);
            let (dm, _hs) = dm_hs_decompose(p2 - p1);
            let beats_raw = eval_value(state, beats);
            compile_countermarch(state, p1, p2, dm, dm, beats_raw, span);
        }
        Procedure::Hscm { pnt1, pnt2, beats, .. } => {
            let p1 = eval_point(state, pnt1);
            let p2 = eval_point(state, pnt2);
            let (_dm, hs) = dm_hs_decompose(p2 - p1);
            let beats_raw = eval_value(state, beats);
            compile_countermarch(state, p1, p2, hs, hs, beats_raw, span);
        }
        Procedure::Dmhs { point, .. } => compile_two_leg(state, point, span, dm_hs_decompose),
        Procedure::Hsdm { point, .. } => {
            compile_two_leg(state, point, span, |c| {
                let (dm, hs) = dm_hs_decompose(c);
                (hs, dm)
            });
        }
        Procedure::Ewns { point, .. } => {
            // Despite the name, the shipped compiler takes the north/south
            // leg first.
            compile_two_leg(state, point, span, |c| (Coord::new(0, c.y), Coord::new(c.x, 0)));
        }
        Procedure::Nsew { point, .. } => {
            // Despite the name, the shipped compiler takes the east/west
            // leg first.
            compile_two_leg(state, point, span, |c| (Coord::new(c.x, 0), Coord::new(0, c.y)));
        }
        Procedure::Even { beats, point, .. } => {
            let raw_n = eval_value(state, beats);
            let p = eval_point(state, point);
            let vector = p - state.cur();
            let n = round_beats_abs(state, raw_n, span);
            if raw_n < 0.0 {
                let facing = vector.direction() + 180.0;
                state.append(AnimateCommand::mv_facing(n, vector, facing), span);
            } else {
                state.append(AnimateCommand::mv(n, vector), span);
            }
        }
        Procedure::Fountain { dir1, dir2, step_size1, step_size2, point, .. } => {
            compile_fountain(state, dir1, dir2, step_size1.as_ref(), step_size2.as_ref(), point, span);
        }
        Procedure::Fm { beats, dir, .. } => {
            let raw_n = eval_value(state, beats);
            let d = eval_value(state, dir);
            let n = round_beats_abs(state, raw_n, span);
            let vector = create_vector(d, raw_n);
            if raw_n < 0.0 {
                state.append(AnimateCommand::mv_facing(n, vector, d), span);
            } else {
                state.append(AnimateCommand::mv(n, vector), span);
            }
        }
        Procedure::Fmto { point, .. } => {
            let p = eval_point(state, point);
            let vector = p - state.cur();
            let n = round_beats(state, vector.dm_magnitude(), span);
            state.append(AnimateCommand::mv(n, vector), span);
        }
        Procedure::Grid { grid, .. } => {
            let g = eval_value(state, grid);
            if g.abs() < GRID_EPSILON {
                state.register(ErrorKind::DivisionZero, span);
                return;
            }
            let g_units = g * COORD_DECIMAL as f64;
            let cur = state.cur();
            let snap = |v: i32| -> i32 { ((v as f64 / g_units).round() * g_units).round() as i32 };
            let target = Coord::new(snap(cur.x), snap(cur.y));
            state.append(AnimateCommand::mv(0, target - cur), span);
        }
        Procedure::Magic { point, .. } => {
            let p = eval_point(state, point);
            state.append(AnimateCommand::mv(0, p - state.cur()), span);
        }
        Procedure::March { step_size, steps, dir, face, .. } => {
            let size = eval_value(state, step_size);
            let raw_n = eval_value(state, steps);
            let d = eval_value(state, dir);
            let vector = create_vector(d, size * raw_n);
            let n = round_beats_abs(state, raw_n, span);
            let facing_override = match face {
                Some(face_val) => Some(eval_value(state, face_val)),
                None if raw_n < 0.0 => Some(d),
                None => None,
            };
            match facing_override {
                Some(f) => state.append(AnimateCommand::mv_facing(n, vector, f), span),
                None => state.append(AnimateCommand::mv(n, vector), span),
            };
        }
        Procedure::Mt { beats, dir, .. } => {
            let raw_n = eval_value(state, beats);
            let n = round_beats(state, raw_n, span);
            let d = eval_value(state, dir);
            state.append(AnimateCommand::hold(n, d), span);
        }
        Procedure::Mtrm { dir, .. } => {
            let n = state.beats_rem;
            let d = eval_value(state, dir);
            state.append(AnimateCommand::hold(n, d), span);
        }
        Procedure::Rotate { angle, beats, point, .. } => {
            let p = eval_point(state, point);
            let cur = state.cur();
            let radial = cur - p;
            let radius = ((radial.x as f64).powi(2) + (radial.y as f64).powi(2)).sqrt();
            let ang_start = if radial.x == 0 && radial.y == 0 {
                state.read_var(Variable::Doh, span)
            } else {
                p.direction_to(cur)
            };
            let raw_n = eval_value(state, beats);
            let angle_deg = eval_value(state, angle);
            let n = round_beats_abs(state, raw_n, span);
            let backwards = raw_n < 0.0;
            state.append(
                AnimateCommand::rotate(n, p, radius, ang_start, ang_start + angle_deg, backwards),
                span,
            );
        }
    }
}

/// Shared shape for the four two-leg procedures (`DMHS`, `HSDM`, `EWNS`,
/// `NSEW`): decompose the displacement to `point` into a first and second
/// leg via `decompose`, then append each leg in turn against the single
/// displacement computed up front (the second leg does not need to be
/// recomputed against the post-first-leg position, since the two legs are
/// orthogonal components of the same original vector).
fn compile_two_leg(
    state: &mut CompileState,
    point: &calchart_ast::Point,
    span: Span,
    decompose: impl Fn(Coord) -> (Coord, Coord),
) {
    let p = eval_point(state, point);
    let c = p - state.cur();
    let (first, second) = decompose(c);
    let zero = Coord::new(0, 0);
    if first != zero {
        let n = round_beats(state, first.dm_magnitude(), span);
        if !state.append(AnimateCommand::mv(n, first), span) {
            return;
        }
    }
    if second != zero {
        let n = round_beats(state, second.dm_magnitude(), span);
        state.append(AnimateCommand::mv(n, second), span);
    }
}

#[allow(clippy::too_many_arguments)]
fn compile_fountain(
    state: &mut CompileState,
    dir1: &calchart_ast::Value,
    dir2: &calchart_ast::Value,
    step_size1: Option<&calchart_ast::Value>,
    step_size2: Option<&calchart_ast::Value>,
    point: &calchart_ast::Point,
    span: Span,
) {
    let p = eval_point(state, point);
    let d1 = eval_value(state, dir1);
    let d2 = eval_value(state, dir2);
    let s1 = step_size1.map(|v| eval_value(state, v)).unwrap_or(1.0);
    let s2 = step_size2.map(|v| eval_value(state, v)).unwrap_or(1.0);
    let u1 = create_vector(d1, s1);
    let u2 = create_vector(d2, s2);
    let delta = p - state.cur();

    let Some((t1, t2)) = solve_fountain(u1, u2, delta) else {
        state.register(ErrorKind::InvalidFntn, span);
        return;
    };

    let n1 = round_beats_abs(state, t1, span);
    let vec1 = create_vector(d1, s1 * t1);
    let appended = if t1 < 0.0 {
        state.append(AnimateCommand::mv_facing(n1, vec1, d1), span)
    } else {
        state.append(AnimateCommand::mv(n1, vec1), span)
    };
    if !appended {
        return;
    }

    let n2 = round_beats_abs(state, t2, span);
    let vec2 = create_vector(d2, s2 * t2);
    if t2 < 0.0 {
        state.append(AnimateCommand::mv_facing(n2, vec2, d2), span);
    } else {
        state.append(AnimateCommand::mv(n2, vec2), span);
    }
}

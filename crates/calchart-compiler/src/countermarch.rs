use calchart_ast::Span;
use calchart_diagnostics::ErrorKind;
use calchart_geom::Coord;

use crate::coerce::round_beats;
use crate::state::CompileState;
use calchart_command::AnimateCommand;

/// Below this fraction of a leg's length, a leg is treated as having zero
/// extent for move-splitting purposes (avoids emitting a degenerate
/// zero-vector `Move` for a leg the current position sits exactly on a
/// corner of).
const SEGMENT_EPSILON: f64 = 1e-6;

/// How far (in squared coord units, scaled by leg length) the current
/// position may stray from a leg's line before it's no longer considered
/// to lie on that leg.
const COLINEAR_TOLERANCE: f64 = 2.0;

/// Builds the closed four-corner path `p1 -> p1+v1 -> p2+v2 -> p2 -> p1`
/// used by every countermarch procedure (`CM`, `DMCM`, `HSCM`), locates
/// which leg the current position lies on, and appends the move sequence
/// that walks the remaining perimeter back around to the starting point,
/// allocating `beats_raw` across the legs in proportion to their length.
///
/// This four-corner shape always closes exactly regardless of `v1`/`v2`
/// (the four leg vectors `v1`, `p2-p1+v2-v1`, `-v2`, `p1-p2` sum to zero by
/// construction), and degenerates to a parallelogram when `v1 == v2`,
/// which is what `DMCM`/`HSCM` use.
pub fn compile_countermarch(
    state: &mut CompileState,
    p1: Coord,
    p2: Coord,
    v1: Coord,
    v2: Coord,
    beats_raw: f64,
    span: Span,
) {
    let a = p1;
    let b = p1 + v1;
    let c = p2 + v2;
    let d = p2;
    let legs = [(a, b), (b, c), (c, d), (d, a)];
    let lengths: Vec<f64> = legs.iter().map(|(s, e)| (*e - *s).dm_magnitude()).collect();

    let cur = state.cur();
    let entry = legs.iter().enumerate().find_map(|(i, (s, e))| point_on_segment(cur, *s, *e).map(|t| (i, t)));
    let Some((entry, t)) = entry else {
        state.register(ErrorKind::InvalidCm, span);
        return;
    };

    let total_len: f64 = lengths.iter().sum();
    let total_beats = round_beats(state, beats_raw, span);

    let mut segments: Vec<(Coord, Coord, f64)> = Vec::with_capacity(5);
    if 1.0 - t > SEGMENT_EPSILON {
        segments.push((cur, legs[entry].1, (1.0 - t) * lengths[entry]));
    }
    for k in 1..=3 {
        let idx = (entry + k) % 4;
        segments.push((legs[idx].0, legs[idx].1, lengths[idx]));
    }
    if t > SEGMENT_EPSILON {
        segments.push((legs[entry].0, cur, t * lengths[entry]));
    }

    let last = segments.len().saturating_sub(1);
    let mut beats_left = total_beats;
    for (i, (start, end, length)) in segments.into_iter().enumerate() {
        let beats = if i == last {
            beats_left
        } else {
            let share = if total_len > SEGMENT_EPSILON {
                ((total_beats as f64) * length / total_len).round() as u32
            } else {
                0
            };
            let share = share.min(beats_left);
            beats_left -= share;
            share
        };
        if !state.append(AnimateCommand::mv(beats, end - start), span) {
            break;
        }
    }
}

/// If `cur` lies on the segment `s -> e` (within [`COLINEAR_TOLERANCE`]),
/// returns how far along it as a fraction in `[0, 1]`.
fn point_on_segment(cur: Coord, s: Coord, e: Coord) -> Option<f64> {
    let d = e - s;
    let len2 = (d.x as i64 * d.x as i64 + d.y as i64 * d.y as i64) as f64;
    if len2 < 1.0 {
        return None;
    }
    let rel = cur - s;
    let cross = (rel.x as i64 * d.y as i64 - rel.y as i64 * d.x as i64) as f64;
    if cross.abs() > COLINEAR_TOLERANCE * len2.sqrt() {
        return None;
    }
    let dot = (rel.x as i64 * d.x as i64 + rel.y as i64 * d.y as i64) as f64;
    let t = dot / len2;
    if !(-1e-6..=1.0 + 1e-6).contains(&t) {
        return None;
    }
    Some(t.clamp(0.0, 1.0))
}

use calchart_geom::Coord;

/// Determinant below which `u1`/`u2` are treated as parallel (or one of
/// them degenerate), falling back to a single-direction solve.
const DETERMINANT_EPSILON: f64 = 1e-6;

/// How far `delta` may deviate from a candidate direction `u` (relative to
/// `u`'s own length) before it's no longer considered colinear with it.
const COLINEAR_EPSILON: f64 = 1e-3;

/// Solves `t1*u1 + t2*u2 = delta` for `(t1, t2)`.
///
/// When `u1`/`u2` aren't parallel this is a plain 2x2 linear solve via
/// Cramer's rule. When they are (or one is the zero vector), falls back to
/// projecting `delta` onto whichever of `u1`/`u2` it's actually colinear
/// with; if it's colinear with neither, there's no solution.
pub fn solve_fountain(u1: Coord, u2: Coord, delta: Coord) -> Option<(f64, f64)> {
    let (dx, dy) = (delta.x as f64, delta.y as f64);
    let (u1x, u1y) = (u1.x as f64, u1.y as f64);
    let (u2x, u2y) = (u2.x as f64, u2.y as f64);
    let det = u1x * u2y - u1y * u2x;
    if det.abs() > DETERMINANT_EPSILON {
        let t1 = (dx * u2y - dy * u2x) / det;
        let t2 = (u1x * dy - u1y * dx) / det;
        return Some((t1, t2));
    }
    if let Some(t1) = project_onto(u1, delta) {
        return Some((t1, 0.0));
    }
    if let Some(t2) = project_onto(u2, delta) {
        return Some((0.0, t2));
    }
    None
}

fn project_onto(u: Coord, delta: Coord) -> Option<f64> {
    let denom = u.x as f64 * u.x as f64 + u.y as f64 * u.y as f64;
    if denom < 1e-9 {
        return None;
    }
    let cross = delta.x as f64 * u.y as f64 - delta.y as f64 * u.x as f64;
    if cross.abs() > COLINEAR_EPSILON * denom.sqrt() {
        return None;
    }
    let dot = delta.x as f64 * u.x as f64 + delta.y as f64 * u.y as f64;
    Some(dot / denom)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn orthogonal_directions_solve_exactly() {
        let u1 = Coord::from_steps(1.0, 0.0);
        let u2 = Coord::from_steps(0.0, 1.0);
        let delta = Coord::from_steps(3.0, -2.0);
        let (t1, t2) = solve_fountain(u1, u2, delta).unwrap();
        assert!((t1 - 3.0).abs() < 1e-6);
        assert!((t2 - (-2.0)).abs() < 1e-6);
    }

    #[test]
    fn parallel_directions_fall_back_to_single_leg() {
        let u1 = Coord::from_steps(1.0, 1.0);
        let u2 = Coord::from_steps(2.0, 2.0);
        let delta = Coord::from_steps(4.0, 4.0);
        let (t1, t2) = solve_fountain(u1, u2, delta).unwrap();
        assert!((t1 - 4.0).abs() < 1e-6);
        assert_eq!(t2, 0.0);
    }

    #[test]
    fn parallel_directions_off_axis_delta_has_no_solution() {
        let u1 = Coord::from_steps(1.0, 1.0);
        let u2 = Coord::from_steps(2.0, 2.0);
        let delta = Coord::from_steps(1.0, 0.0);
        assert!(solve_fountain(u1, u2, delta).is_none());
    }
}

use calchart_geom::Coord;

/// Splits a displacement `c` into a diagonal-military leg and an
/// orthogonal (high-school) leg whose sum is `c`, matching
/// `ContProcDMHS`/`ContProcHSDM`'s shared decomposition in the original
/// continuity compiler: the longer axis absorbs the shorter axis
/// diagonally first, leaving a pure orthogonal remainder on the longer
/// axis.
///
/// Returns `(dm_leg, hs_leg)`; either may be the zero vector if `c` is
/// already axis-aligned or already a pure diagonal.
pub fn dm_hs_decompose(c: Coord) -> (Coord, Coord) {
    let opposite_signs = (c.x < 0) != (c.y < 0);
    if c.x.abs() > c.y.abs() {
        let hs_x = if opposite_signs { c.x + c.y } else { c.x - c.y };
        let hs = Coord::new(hs_x, 0);
        let dm_x = if opposite_signs { -c.y } else { c.y };
        let dm = Coord::new(dm_x, c.y);
        (dm, hs)
    } else {
        let hs_y = if opposite_signs { c.y + c.x } else { c.y - c.x };
        let hs = Coord::new(0, hs_y);
        let dm_y = if opposite_signs { -c.x } else { c.x };
        let dm = Coord::new(c.x, dm_y);
        (dm, hs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decompose_sums_back_to_original() {
        let c = Coord::from_steps(5.0, 2.0);
        let (dm, hs) = dm_hs_decompose(c);
        assert_eq!(dm + hs, c);
    }

    #[test]
    fn pure_diagonal_has_no_hs_leg() {
        let c = Coord::from_steps(3.0, 3.0);
        let (dm, hs) = dm_hs_decompose(c);
        assert_eq!(dm, c);
        assert_eq!(hs, Coord::new(0, 0));
    }

    #[test]
    fn pure_axis_aligned_has_no_dm_leg() {
        let c = Coord::from_steps(4.0, 0.0);
        let (dm, hs) = dm_hs_decompose(c);
        assert_eq!(hs, c);
        assert_eq!(dm, Coord::new(0, 0));
    }
}

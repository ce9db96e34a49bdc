#![cfg_attr(not(feature = "std"), no_std)]

//! Fixed-point 2-D coordinates and the direction/magnitude geometry that the
//! continuity compiler and animation runtime are built on.
//!
//! A [`Coord`] stores its axes as integers with [`COORD_SHIFT`] fractional
//! bits, so one logical "step" of the drill field is [`COORD_DECIMAL`] coord
//! units. This mirrors the field's historical fixed-point representation:
//! positions never carry floating error, while direction/magnitude math
//! (which is inherently trigonometric) is computed in `f64` and converted
//! back at the boundary.

use core::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Number of fractional bits in a [`Coord`] axis.
pub const COORD_SHIFT: i32 = 4;
/// One logical step, in coord units (`1 << COORD_SHIFT`).
pub const COORD_DECIMAL: i32 = 1 << COORD_SHIFT;

/// A fixed-point 2-D position, 4 fractional bits per axis.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Coord {
    pub x: i32,
    pub y: i32,
}

impl Coord {
    pub const fn new(x: i32, y: i32) -> Self {
        Coord { x, y }
    }

    /// Builds a `Coord` from a position expressed in whole/fractional steps.
    pub fn from_steps(x_steps: f64, y_steps: f64) -> Self {
        Coord {
            x: (x_steps * COORD_DECIMAL as f64).round() as i32,
            y: (y_steps * COORD_DECIMAL as f64).round() as i32,
        }
    }

    /// This position's axes expressed in whole/fractional steps.
    pub fn to_steps(self) -> (f64, f64) {
        (
            self.x as f64 / COORD_DECIMAL as f64,
            self.y as f64 / COORD_DECIMAL as f64,
        )
    }

    /// Euclidean distance from the origin, in steps.
    pub fn magnitude(self) -> f64 {
        let (x, y) = self.to_steps();
        (x * x + y * y).sqrt()
    }

    /// Euclidean distance, except when `|x| == |y|` (a 45-degree diagonal),
    /// in which case the integer step count along one axis is returned
    /// directly — diagonal military moves count one step per beat along
    /// each axis simultaneously, not `sqrt(2)` steps.
    pub fn dm_magnitude(self) -> f64 {
        if self.x == self.y || self.x == -self.y {
            let (x, _) = self.to_steps();
            x.abs()
        } else {
            self.magnitude()
        }
    }

    /// Direction of this vector from the origin, in degrees, `y` inverted
    /// because the field's `y` axis grows southward. Zero vectors have
    /// direction `0.0` (the caller is expected to treat this as degenerate;
    /// see [`calchart_diagnostics`]-level `Undefined` handling upstream).
    pub fn direction(self) -> f64 {
        if self.x == 0 && self.y == 0 {
            return 0.0;
        }
        let (x, y) = self.to_steps();
        (-y).atan2(x).to_degrees()
    }

    /// Direction from `self` to `other`, in degrees.
    pub fn direction_to(self, other: Coord) -> f64 {
        (other - self).direction()
    }

    /// True if `self` and `other` are within one step in both axes and
    /// within one step Euclidean.
    pub fn collides(self, other: Coord) -> bool {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        if dx.abs() > COORD_DECIMAL || dy.abs() > COORD_DECIMAL {
            return false;
        }
        (dx as i64 * dx as i64 + dy as i64 * dy as i64) <= (COORD_DECIMAL as i64 * COORD_DECIMAL as i64)
    }
}

impl Add for Coord {
    type Output = Coord;
    fn add(self, rhs: Coord) -> Coord {
        Coord::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Coord {
    fn add_assign(&mut self, rhs: Coord) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Coord {
    type Output = Coord;
    fn sub(self, rhs: Coord) -> Coord {
        Coord::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl SubAssign for Coord {
    fn sub_assign(&mut self, rhs: Coord) {
        self.x -= rhs.x;
        self.y -= rhs.y;
    }
}

impl Neg for Coord {
    type Output = Coord;
    fn neg(self) -> Coord {
        Coord::new(-self.x, -self.y)
    }
}

impl Mul<i32> for Coord {
    type Output = Coord;
    fn mul(self, rhs: i32) -> Coord {
        Coord::new(self.x * rhs, self.y * rhs)
    }
}

impl Div<i32> for Coord {
    type Output = Coord;
    fn div(self, rhs: i32) -> Coord {
        Coord::new(self.x / rhs, self.y / rhs)
    }
}

/// Normalises an angle in degrees into `[0, 360)`.
pub fn bound_direction(mut degrees: f64) -> f64 {
    degrees %= 360.0;
    if degrees < 0.0 {
        degrees += 360.0;
    }
    degrees
}

/// Normalises an angle in degrees into `(-180, 180]`.
pub fn fold_direction_signed(degrees: f64) -> f64 {
    let mut d = bound_direction(degrees);
    if d > 180.0 {
        d -= 360.0;
    }
    d
}

/// Tolerance for comparing a direction against one of the eight named
/// compass constants, to absorb accumulated `f64` error from upstream
/// arithmetic (e.g. `Opp`, `Either`).
const DIRECTION_EPSILON: f64 = 1e-5;

/// True iff `degrees`, once bounded into `[0, 360)`, is one of the four
/// diagonal directions `{45, 135, 225, 315}`.
pub fn is_diagonal_direction(degrees: f64) -> bool {
    let d = bound_direction(degrees);
    [45.0, 135.0, 225.0, 315.0]
        .iter()
        .any(|diag| (d - diag).abs() < DIRECTION_EPSILON)
}

/// Builds the exact integer displacement for `mag` steps travelled in
/// direction `dir_degrees`. Diagonal directions get an exact integer
/// result on both axes (no trig rounding, so a diagonal military move
/// never drifts off the grid); any other direction falls back to
/// `sin`/`cos`.
pub fn create_vector(dir_degrees: f64, mag: f64) -> Coord {
    let d = bound_direction(dir_degrees);
    if is_diagonal_direction(d) {
        let mag_round = mag.round();
        let mut x = mag_round;
        let mut y = mag_round;
        if d > 50.0 && d < 310.0 {
            x = -x;
        }
        if d < 180.0 {
            y = -y;
        }
        Coord::from_steps(x, y)
    } else {
        let rad = d.to_radians();
        Coord::from_steps(rad.cos() * mag, -(rad.sin() * mag))
    }
}

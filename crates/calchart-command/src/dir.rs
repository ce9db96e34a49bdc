use calchart_geom::bound_direction;

/// The renderer's 8-way facing, derived from a continuous angle by
/// `AnimateDir::from_angle` exactly the way the original cascading
/// `AnimGetDirFromAngle` buckets angles into compass octants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnimateDir {
    N,
    Ne,
    E,
    Se,
    S,
    Sw,
    W,
    Nw,
}

impl AnimateDir {
    /// Buckets `degrees` into one of the eight compass octants, folding any
    /// multiple of 360 first. Octant boundaries sit at odd multiples of
    /// 22.5 degrees, matching the nested-threshold cascade this is ported
    /// from: an angle exactly on a boundary rounds toward `N`.
    pub fn from_angle(degrees: f64) -> AnimateDir {
        let ang = bound_direction(degrees);
        if ang > 22.5 {
            if ang > 67.5 {
                if ang > 112.5 {
                    if ang > 157.5 {
                        if ang > 202.5 {
                            if ang > 247.5 {
                                if ang > 292.5 {
                                    if ang > 337.5 {
                                        AnimateDir::N
                                    } else {
                                        AnimateDir::Ne
                                    }
                                } else {
                                    AnimateDir::E
                                }
                            } else {
                                AnimateDir::Se
                            }
                        } else {
                            AnimateDir::S
                        }
                    } else {
                        AnimateDir::Sw
                    }
                } else {
                    AnimateDir::W
                }
            } else {
                AnimateDir::Nw
            }
        } else {
            AnimateDir::N
        }
    }
}

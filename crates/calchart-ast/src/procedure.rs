use crate::{Point, Span, Value, Variable};

/// One continuity DSL statement, keyword-selected. Each sheet's continuity
/// text parses to an ordered `Vec<Procedure>`, compiled in order against a
/// single marcher's compile state.
#[derive(Debug, Clone, PartialEq)]
pub enum Procedure {
    /// `var = value`
    Set {
        var: Variable,
        value: Value,
        span: Span,
    },
    /// `BLAM` — move to `NextPoint` over all remaining beats.
    Blam { span: Span },
    /// `CM(p1 p2 steps dir1 dir2 beats)` — countermarch between two
    /// reference points.
    Cm {
        pnt1: Point,
        pnt2: Point,
        steps: Value,
        dir1: Value,
        dir2: Value,
        beats: Value,
        span: Span,
    },
    /// `DMCM(p1 p2 beats)` — diagonal-military countermarch.
    Dmcm {
        pnt1: Point,
        pnt2: Point,
        beats: Value,
        span: Span,
    },
    /// `DMHS(p)` — diagonal leg then orthogonal leg to `p`.
    Dmhs { point: Point, span: Span },
    /// `EVEN(n p)` — one move of `|n|` beats covering the vector to `p`.
    Even {
        beats: Value,
        point: Point,
        span: Span,
    },
    /// `EWNS(p)` — despite the name, the shipped compiler takes the
    /// north/south leg first and the east/west leg second.
    Ewns { point: Point, span: Span },
    /// `FOUNTAIN(d1 d2 [s1 s2] p)` — decompose the vector to `p` along two
    /// directions.
    Fountain {
        dir1: Value,
        dir2: Value,
        step_size1: Option<Value>,
        step_size2: Option<Value>,
        point: Point,
        span: Span,
    },
    /// `FM(n d)` — move `|n|` beats in direction `d`.
    Fm {
        beats: Value,
        dir: Value,
        span: Span,
    },
    /// `FMTO(p)` — move directly to `p`.
    Fmto { point: Point, span: Span },
    /// `GRID(g)` — snap the current position to the nearest multiple of
    /// `g` steps (zero-beat).
    Grid { grid: Value, span: Span },
    /// `HSCM(p1 p2 beats)` — orthogonal-leg-first countermarch.
    Hscm {
        pnt1: Point,
        pnt2: Point,
        beats: Value,
        span: Span,
    },
    /// `HSDM(p)` — orthogonal leg then diagonal leg to `p`.
    Hsdm { point: Point, span: Span },
    /// `MAGIC(p)` — instantaneous (zero-beat) jump to `p`.
    Magic { point: Point, span: Span },
    /// `MARCH(size n d [face])` — `size * n` steps in direction `d`.
    March {
        step_size: Value,
        steps: Value,
        dir: Value,
        face: Option<Value>,
        span: Span,
    },
    /// `MT(n d)` — mark time `n` beats facing `d`.
    Mt { beats: Value, dir: Value, span: Span },
    /// `MTRM(d)` — mark time for all remaining beats facing `d`.
    Mtrm { dir: Value, span: Span },
    /// `NSEW(p)` — despite the name, the shipped compiler takes the
    /// east/west leg first and the north/south leg second.
    Nsew { point: Point, span: Span },
    /// `ROTATE(angle n p)` — arc `angle` degrees about `p` over `|n|` beats.
    Rotate {
        angle: Value,
        beats: Value,
        point: Point,
        span: Span,
    },
}

impl Procedure {
    pub fn span(&self) -> Span {
        match self {
            Procedure::Set { span, .. }
            | Procedure::Blam { span }
            | Procedure::Cm { span, .. }
            | Procedure::Dmcm { span, .. }
            | Procedure::Dmhs { span, .. }
            | Procedure::Even { span, .. }
            | Procedure::Ewns { span, .. }
            | Procedure::Fountain { span, .. }
            | Procedure::Fm { span, .. }
            | Procedure::Fmto { span, .. }
            | Procedure::Grid { span, .. }
            | Procedure::Hscm { span, .. }
            | Procedure::Hsdm { span, .. }
            | Procedure::Magic { span, .. }
            | Procedure::March { span, .. }
            | Procedure::Mt { span, .. }
            | Procedure::Mtrm { span, .. }
            | Procedure::Nsew { span, .. }
            | Procedure::Rotate { span, .. } => *span,
        }
    }
}

use crate::{Point, Span};

/// The nine per-marcher, per-sheet continuity variable slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Variable {
    A,
    B,
    C,
    D,
    X,
    Y,
    Z,
    Dof,
    Doh,
}

impl Variable {
    pub const ALL: [Variable; 9] = [
        Variable::A,
        Variable::B,
        Variable::C,
        Variable::D,
        Variable::X,
        Variable::Y,
        Variable::Z,
        Variable::Dof,
        Variable::Doh,
    ];

    /// A dense index into a fixed-size `[T; 9]` variable slot array.
    pub fn slot(self) -> usize {
        self as usize
    }
}

/// A named constant of the continuity DSL: a compass direction in degrees,
/// or a step-size ratio.
///
/// Directions follow the DSL's own convention (not [`calchart_geom`]'s
/// `Direction()` convention directly, though the two agree once bounded):
/// `N = 0`, and then `NW, W, SW, S, SE, E, NE` step by 45 degrees each, per
/// the original grammar's `ContValueDefined::Get`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DefinedValue {
    N,
    Nw,
    W,
    Sw,
    S,
    Se,
    E,
    Ne,
    Hs,
    Mm,
    Sh,
    Js,
    Gv,
    M,
    Dm,
}

impl DefinedValue {
    /// The constant's numeric value: degrees for the eight compass
    /// directions, a unitless step-size ratio for the other seven.
    pub fn numeric_value(self) -> f64 {
        match self {
            DefinedValue::N => 0.0,
            DefinedValue::Nw => 45.0,
            DefinedValue::W => 90.0,
            DefinedValue::Sw => 135.0,
            DefinedValue::S => 180.0,
            DefinedValue::Se => 225.0,
            DefinedValue::E => 270.0,
            DefinedValue::Ne => 315.0,
            DefinedValue::Hs => 1.0,
            DefinedValue::Mm => 1.0,
            DefinedValue::Sh => 0.5,
            DefinedValue::Js => 0.5,
            DefinedValue::Gv => 1.0,
            DefinedValue::M => 4.0 / 3.0,
            DefinedValue::Dm => std::f64::consts::SQRT_2,
        }
    }
}

/// A scalar expression in the continuity DSL.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Literal { value: f64, span: Span },
    Defined { value: DefinedValue, span: Span },
    Add(Box<Value>, Box<Value>),
    Sub(Box<Value>, Box<Value>),
    Mult(Box<Value>, Box<Value>),
    Div(Box<Value>, Box<Value>),
    Neg(Box<Value>, Span),
    /// `REM` — beats remaining in the sheet budget at the current compile
    /// position, read live at evaluation time.
    Rem { span: Span },
    Variable { var: Variable, span: Span },
    Function(Box<Function>),
}

impl Value {
    pub fn span(&self) -> Span {
        match self {
            Value::Literal { span, .. } => *span,
            Value::Defined { span, .. } => *span,
            Value::Add(a, b) | Value::Sub(a, b) | Value::Mult(a, b) | Value::Div(a, b) => {
                span_join(a.span(), b.span())
            }
            Value::Neg(_, span) => *span,
            Value::Rem { span } => *span,
            Value::Variable { span, .. } => *span,
            Value::Function(f) => f.span(),
        }
    }
}

fn span_join(a: Span, b: Span) -> Span {
    // Binary operators report the left operand's start; length extends far
    // enough to at least cover both operands' source text.
    let end_a = a.column + a.length;
    let end_b = b.column + b.length;
    let end = end_a.max(end_b);
    Span::new(a.line, a.column, end.saturating_sub(a.column))
}

/// A built-in function of the continuity DSL. Functions are values (they
/// evaluate to a scalar), kept as a distinct type because every variant
/// other than `Opp` needs a [`Point`] operand, not just other `Value`s.
#[derive(Debug, Clone, PartialEq)]
pub enum Function {
    /// `DIR(p)` — direction from the current position to `p`.
    Dir { point: Point, span: Span },
    /// `DIRFROM(p1 p2)` — direction from `p1` to `p2`.
    DirFrom {
        from: Point,
        to: Point,
        span: Span,
    },
    /// `DIST(p)` — `DM_Magnitude` from the current position to `p`.
    Dist { point: Point, span: Span },
    /// `DISTFROM(p1 p2)` — `Magnitude` from `p1` to `p2`.
    DistFrom {
        from: Point,
        to: Point,
        span: Span,
    },
    /// `EITHER(d1 d2 p)` — whichever of `d1`, `d2` is the shorter signed
    /// angular turn from the direction to `p`.
    Either {
        dir1: Value,
        dir2: Value,
        point: Point,
        span: Span,
    },
    /// `OPP(d)` — `d + 180`.
    Opp { dir: Value, span: Span },
    /// `STEP(beats blocksize p)` — `DM_Magnitude(p - cur) * beats / blocksize`.
    Step {
        beats: Value,
        blocksize: Value,
        point: Point,
        span: Span,
    },
}

impl Function {
    pub fn span(&self) -> Span {
        match self {
            Function::Dir { span, .. }
            | Function::DirFrom { span, .. }
            | Function::Dist { span, .. }
            | Function::DistFrom { span, .. }
            | Function::Either { span, .. }
            | Function::Opp { span, .. }
            | Function::Step { span, .. } => *span,
        }
    }
}

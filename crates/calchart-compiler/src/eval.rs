use calchart_ast::{Function, Point, Value};
use calchart_diagnostics::ErrorKind;
use calchart_geom::{fold_direction_signed, Coord};

use crate::state::CompileState;

/// Division tolerance below which a `Value::Div` is treated as
/// division-by-zero (spec §4.2 "Division: `a / b` with `|b| < 1e-5`
/// registers `DIVISION_ZERO` and yields 0").
const DIVISION_EPSILON: f64 = 1e-5;

pub fn eval_point(state: &mut CompileState, point: &Point) -> Coord {
    match point {
        Point::CurrentPoint { .. } => state.cur(),
        Point::StartPoint { .. } => state.start,
        Point::NextPoint { .. } => state.next.unwrap_or_else(|| state.cur()),
        Point::RefPoint { index, .. } => state.ref_positions[*index as usize],
    }
}

pub fn eval_value(state: &mut CompileState, value: &Value) -> f64 {
    match value {
        Value::Literal { value, .. } => *value,
        Value::Defined { value, .. } => value.numeric_value(),
        Value::Add(a, b) => eval_value(state, a) + eval_value(state, b),
        Value::Sub(a, b) => eval_value(state, a) - eval_value(state, b),
        Value::Mult(a, b) => eval_value(state, a) * eval_value(state, b),
        Value::Div(a, b) => {
            let numerator = eval_value(state, a);
            let denominator = eval_value(state, b);
            if denominator.abs() < DIVISION_EPSILON {
                state.register(ErrorKind::DivisionZero, value.span());
                0.0
            } else {
                numerator / denominator
            }
        }
        Value::Neg(v, _) => -eval_value(state, v),
        Value::Rem { .. } => state.beats_rem as f64,
        Value::Variable { var, span } => state.read_var(*var, *span),
        Value::Function(f) => eval_function(state, f),
    }
}

fn eval_function(state: &mut CompileState, func: &Function) -> f64 {
    match func {
        Function::Dir { point, .. } => {
            let p = eval_point(state, point);
            state.cur().direction_to(p)
        }
        Function::DirFrom { from, to, .. } => {
            let a = eval_point(state, from);
            let b = eval_point(state, to);
            a.direction_to(b)
        }
        Function::Dist { point, .. } => {
            let p = eval_point(state, point);
            (p - state.cur()).dm_magnitude()
        }
        Function::DistFrom { from, to, .. } => {
            let a = eval_point(state, from);
            let b = eval_point(state, to);
            (b - a).magnitude()
        }
        Function::Either { dir1, dir2, point, .. } => {
            let p = eval_point(state, point);
            let dir_to_point = state.cur().direction_to(p);
            let d1 = eval_value(state, dir1);
            let d2 = eval_value(state, dir2);
            let delta1 = fold_direction_signed(d1 - dir_to_point);
            let delta2 = fold_direction_signed(d2 - dir_to_point);
            if delta1.abs() > delta2.abs() {
                d2
            } else {
                d1
            }
        }
        Function::Opp { dir, .. } => eval_value(state, dir) + 180.0,
        Function::Step { beats, blocksize, point, .. } => {
            let p = eval_point(state, point);
            let dist = (p - state.cur()).dm_magnitude();
            let b = eval_value(state, beats);
            let block = eval_value(state, blocksize);
            if block.abs() < DIVISION_EPSILON {
                state.register(ErrorKind::DivisionZero, func.span());
                0.0
            } else {
                dist * b / block
            }
        }
    }
}

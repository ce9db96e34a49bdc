use calchart_ast::Span;
use calchart_diagnostics::ErrorKind;

use crate::state::CompileState;

/// Tolerance, in beats, used to decide whether a value used as an integer
/// beat count is "close enough" to an integer to avoid registering
/// `NONINT` (spec §4.2 "register NONINT if the float wasn't within
/// `COORD_DECIMAL` of an integer" — read here as a fractional-beat
/// tolerance rather than a literal coord-unit count, since beat counts
/// have no coordinate scale of their own).
const NONINT_EPSILON: f64 = 1e-3;

/// Rounds `raw` to the nearest integer beat count, registering `NonInt`
/// if it wasn't already close to one and `NegInt` (clipping to `0`) if the
/// rounded result is negative (spec §4.2 "Numeric coercion").
pub fn round_beats(state: &mut CompileState, raw: f64, span: Span) -> u32 {
    let rounded = raw.round();
    if (raw - rounded).abs() > NONINT_EPSILON {
        state.register(ErrorKind::NonInt, span);
    }
    if rounded < 0.0 {
        state.register(ErrorKind::NegInt, span);
        0
    } else {
        rounded as u32
    }
}

/// Like [`round_beats`] but takes the absolute value first — used wherever
/// the DSL's own sign convention (negative beats meaning "go backwards")
/// is consumed separately from the magnitude (e.g. `FM`, `March`, `Even`).
pub fn round_beats_abs(state: &mut CompileState, raw: f64, span: Span) -> u32 {
    round_beats(state, raw.abs(), span)
}

//! Lowers one marcher's continuity procedure list into a primitive
//! [`AnimateCommand`] chain for one sheet.
//!
//! The entry point, [`compile_marcher`], drives one [`CompileState`]
//! through every [`Procedure`] in order (see [`procedure`]), then performs
//! the terminal alignment/extra-time finalisation spec'd for the end of a
//! marcher's compile pass: a correcting move if the marcher didn't land
//! where the next sheet expects it, and a mark-time hold (with
//! [`ErrorKind::ExtraTime`]) if beats are left over with nothing left to do.

mod coerce;
mod countermarch;
mod eval;
mod fountain;
mod geometry;
mod procedure;
mod state;

use calchart_ast::{DefinedValue, Procedure, Span};
use calchart_command::{AnimateCommand, CommandArena, MarcherChain};
use calchart_diagnostics::{ErrorKind, ErrorTable};
use calchart_geom::Coord;
use calchart_show::NUM_REF_PNTS;

pub use state::CompileState;

/// Compiles one marcher's procedure list for one sheet into a
/// [`MarcherChain`] threaded into `arena`, registering any advisory errors
/// against `errors`.
///
/// `next` is the marcher's position on the following sheet, or `None` on
/// the last animated sheet (where `NextPoint` falls back to the marcher's
/// own current position instead of a fixed target, and no terminal
/// alignment move is appended).
pub fn compile_marcher(
    marcher: usize,
    procs: &[Procedure],
    start: Coord,
    next: Option<Coord>,
    ref_positions: [Coord; NUM_REF_PNTS],
    beats: u32,
    arena: &mut CommandArena,
    errors: &mut ErrorTable,
) -> MarcherChain {
    let mut state = CompileState::new(marcher, start, next, ref_positions, beats, arena, errors);
    for proc in procs {
        procedure::compile_procedure(&mut state, proc);
    }

    let tail_span = procs.last().map(Procedure::span).unwrap_or_else(Span::synthetic);

    if let Some(next_pos) = next {
        if state.cur() != next_pos {
            let beats_rem = state.beats_rem;
            let vector = next_pos - state.cur();
            state.append(AnimateCommand::mv(beats_rem, vector), tail_span);
            if state.cur() != next_pos {
                state.register(ErrorKind::WrongPlace, tail_span);
            }
        }
    }

    if state.beats_rem > 0 {
        let beats_rem = state.beats_rem;
        state.append(AnimateCommand::hold(beats_rem, DefinedValue::E.numeric_value()), tail_span);
        state.register(ErrorKind::ExtraTime, tail_span);
    }

    let (head, tail, end_position) = state.finish();
    MarcherChain { head, tail, start_position: start, end_position }
}

#[cfg(test)]
mod tests {
    use super::*;
    use calchart_parser::parse;

    fn ref_positions() -> [Coord; NUM_REF_PNTS] {
        [Coord::new(0, 0); NUM_REF_PNTS]
    }

    #[test]
    fn mt_then_ewns_lands_on_target_with_no_leftover_beats() {
        let procs = parse("MT 8 E\nEWNS NP").unwrap();
        let mut arena = CommandArena::new();
        let mut errors = ErrorTable::new();
        let start = Coord::from_steps(0.0, 0.0);
        let next = Coord::from_steps(4.0, -4.0);
        let chain = compile_marcher(0, &procs, start, Some(next), ref_positions(), 16, &mut arena, &mut errors);
        assert_eq!(chain.end_position, next);
        assert!(errors.is_empty());
    }

    #[test]
    fn leftover_beats_become_a_mark_time_and_register_extra_time() {
        let procs = parse("MT 4 E").unwrap();
        let mut arena = CommandArena::new();
        let mut errors = ErrorTable::new();
        let start = Coord::from_steps(0.0, 0.0);
        let chain = compile_marcher(0, &procs, start, Some(start), ref_positions(), 16, &mut arena, &mut errors);
        assert_eq!(chain.end_position, start);
        assert!(errors.marker(ErrorKind::ExtraTime).contains(0));
    }

    #[test]
    fn missing_final_position_registers_wrong_place() {
        let procs = parse("MT 16 E").unwrap();
        let mut arena = CommandArena::new();
        let mut errors = ErrorTable::new();
        let start = Coord::from_steps(0.0, 0.0);
        let next = Coord::from_steps(10.0, 0.0);
        compile_marcher(0, &procs, start, Some(next), ref_positions(), 16, &mut arena, &mut errors);
        assert!(errors.marker(ErrorKind::WrongPlace).contains(0));
    }

    #[test]
    fn last_sheet_next_point_falls_back_to_current_position() {
        let procs = parse("BLAM").unwrap();
        let mut arena = CommandArena::new();
        let mut errors = ErrorTable::new();
        let start = Coord::from_steps(2.0, 2.0);
        let chain = compile_marcher(0, &procs, start, None, ref_positions(), 8, &mut arena, &mut errors);
        assert_eq!(chain.end_position, start);
    }
}

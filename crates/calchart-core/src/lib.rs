//! Facade crate: turns a caller's [`ShowSource`] into a playable
//! [`Animation`] plus the advisory diagnostics the compile pass produced.
//!
//! [`compile_show`] is the only public operation (spec §6's "Animation-
//! producing interface"). It walks sheets in declaration order and
//! marchers in index order, parsing each sheet's distinct continuity texts
//! once (not once per marcher) and compiling every marcher's assigned
//! procedure list against the resulting [`Procedure`] list — matching the
//! iteration order `Animation::Animation(CC_show*)` uses in
//! `original_source/animate.cpp`.

use std::collections::HashMap;

use calchart_ast::{Procedure, Span};
use calchart_command::{AnimateSheet, CommandArena};
use calchart_diagnostics::{ErrorKind, ErrorTable};
use calchart_show::{ShowSource, NUM_REF_PNTS};

pub use calchart_anim::Animation;

/// Compiles every animated sheet of `show` and returns the resulting
/// [`Animation`] together with the errors the compile pass registered.
///
/// A sheet with a zero beat budget ([`ShowSource::is_animated`] false) is a
/// dot-book-only formation and is skipped: it contributes no
/// [`AnimateSheet`] and is invisible to `NextPoint` lookups, which instead
/// resolve against the next sheet that *is* animated.
pub fn compile_show(show: &dyn ShowSource) -> (Animation, ErrorTable) {
    let num_marchers = show.num_marchers();
    let animated: Vec<usize> = (0..show.num_sheets()).filter(|&s| show.is_animated(s)).collect();

    let mut errors = ErrorTable::new();
    let mut sheets = Vec::with_capacity(animated.len());

    for (pos, &sheet_idx) in animated.iter().enumerate() {
        let next_sheet_idx = animated.get(pos + 1).copied();
        sheets.push(compile_sheet(show, sheet_idx, next_sheet_idx, num_marchers, &mut errors));
    }

    if sheets.is_empty() {
        tracing::warn!("show has no animated sheets; falling back to a single empty sheet");
        sheets.push(AnimateSheet::new("(no animated sheets)", 0, num_marchers, &vec![calchart_geom::Coord::new(0, 0); num_marchers]));
    }

    (Animation::new(sheets), errors)
}

fn compile_sheet(
    show: &dyn ShowSource,
    sheet_idx: usize,
    next_sheet_idx: Option<usize>,
    num_marchers: usize,
    errors: &mut ErrorTable,
) -> AnimateSheet {
    let beats = show.beats(sheet_idx);
    let starts: Vec<_> = (0..num_marchers).map(|m| show.position(sheet_idx, m, None)).collect();

    let mut parsed: HashMap<u32, Result<Vec<Procedure>, Span>> = HashMap::new();
    for continuity in show.continuities(sheet_idx) {
        let result = calchart_parser::parse(&continuity.text).map_err(|e| e.span);
        parsed.insert(continuity.id, result);
    }

    let mut arena = CommandArena::new();
    let mut chains = Vec::with_capacity(num_marchers);
    for marcher in 0..num_marchers {
        let ref_positions: [calchart_geom::Coord; NUM_REF_PNTS] =
            std::array::from_fn(|i| show.position(sheet_idx, marcher, Some(i)));
        let next = next_sheet_idx.map(|s| show.position(s, marcher, None));

        let continuity_id = show.continuity_id(sheet_idx, marcher);
        let procs: &[Procedure] = match parsed.get(&continuity_id) {
            Some(Ok(procs)) => procs,
            Some(Err(span)) => {
                errors.register(ErrorKind::Syntax, marcher, *span);
                &[]
            }
            None => &[],
        };

        let chain = calchart_compiler::compile_marcher(
            marcher,
            procs,
            starts[marcher],
            next,
            ref_positions,
            beats,
            &mut arena,
            errors,
        );
        chains.push(chain);
    }

    let mut sheet = AnimateSheet::new(show.sheet_name(sheet_idx), beats, num_marchers, &starts);
    sheet.commands = arena;
    sheet.marchers = chains;
    sheet
}

#[cfg(test)]
mod tests {
    use super::*;
    use calchart_geom::Coord;
    use calchart_show::{InMemoryShow, Marcher, Sheet, SheetMarcher, Symbol};

    fn two_sheet_show() -> InMemoryShow {
        let start = Coord::from_steps(0.0, 0.0);
        let next = Coord::from_steps(4.0, 0.0);
        let sheet_a = Sheet::new("opener", 4, vec![SheetMarcher::new(start, Symbol::Sol, 0)])
            .with_continuity(0, "everyone", "MT 4 E");
        let sheet_b = Sheet::new("set 2", 4, vec![SheetMarcher::new(next, Symbol::Sol, 0)])
            .with_continuity(0, "everyone", "MT 4 E");
        InMemoryShow::new(vec![Marcher::new("A1")], vec![sheet_a, sheet_b])
    }

    #[test]
    fn compiles_two_sheets_into_an_animation_with_no_errors() {
        let show = two_sheet_show();
        let (anim, errors) = compile_show(&show);
        assert_eq!(anim.current_sheet_index(), 0);
        assert!(errors.is_empty());
    }

    #[test]
    fn dot_book_only_sheets_are_excluded_from_animation() {
        let mut show = two_sheet_show();
        show.sheets.insert(
            1,
            Sheet::new("dot book page", 0, vec![SheetMarcher::new(Coord::from_steps(9.0, 9.0), Symbol::Plain, 0)]),
        );
        let (mut anim, _) = compile_show(&show);
        assert_eq!(anim.current_sheet().name, "opener");
        assert!(anim.next_sheet());
        assert_eq!(anim.current_sheet().name, "set 2");
    }

    #[test]
    fn unparseable_continuity_registers_syntax_error() {
        let start = Coord::from_steps(0.0, 0.0);
        let sheet = Sheet::new("opener", 4, vec![SheetMarcher::new(start, Symbol::Sol, 0)])
            .with_continuity(0, "everyone", "MT 4 E EWNS");
        let show = InMemoryShow::new(vec![Marcher::new("A1")], vec![sheet]);
        let (_, errors) = compile_show(&show);
        assert!(errors.marker(ErrorKind::Syntax).contains(0));
    }

    #[test]
    fn show_with_no_animated_sheets_still_produces_an_animation() {
        let sheet = Sheet::new("dot book only", 0, vec![SheetMarcher::new(Coord::from_steps(0.0, 0.0), Symbol::Plain, 0)]);
        let show = InMemoryShow::new(vec![Marcher::new("A1")], vec![sheet]);
        let (anim, errors) = compile_show(&show);
        assert_eq!(anim.current_sheet_index(), 0);
        assert!(errors.is_empty());
    }
}

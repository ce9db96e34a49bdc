//! End-to-end scenarios run through the full pipeline (parser -> compiler ->
//! animation runtime) via the one public entry point, [`compile_show`]. These
//! mirror the acceptance scenarios and universal invariants a conforming
//! continuity core is expected to satisfy: beat conservation, terminal
//! alignment, and the worked DSL examples for points/values/functions.

use calchart_command::AnimateCommandKind;
use calchart_core::compile_show;
use calchart_diagnostics::ErrorKind;
use calchart_geom::Coord;
use calchart_show::{InMemoryShow, Marcher, Sheet, SheetMarcher, Symbol};

fn single_marcher_show(start: Coord, next: Option<Coord>, beats: u32, text: &str) -> InMemoryShow {
    let sheet_a = Sheet::new("1", beats, vec![SheetMarcher::new(start, Symbol::Plain, 0)]).with_continuity(0, "everyone", text);
    let sheets = match next {
        Some(next_pos) => vec![sheet_a, Sheet::new("2", 1, vec![SheetMarcher::new(next_pos, Symbol::Plain, 0)])],
        None => vec![sheet_a],
    };
    InMemoryShow::new(vec![Marcher::new("A1")], sheets)
}

/// Walks a marcher's compiled chain and sums every command's `numbeats`,
/// which must equal the sheet's beat budget (spec §8 "Beat conservation").
fn sum_numbeats(sheet: &calchart_command::AnimateSheet, marcher: usize) -> u32 {
    let chain = &sheet.marchers[marcher];
    let mut total = 0;
    let mut cursor = chain.head;
    while let Some(id) = cursor {
        let node = sheet.commands.get(id);
        total += node.command.numbeats();
        cursor = node.next;
    }
    total
}

fn nth_command_kind(sheet: &calchart_command::AnimateSheet, marcher: usize, n: usize) -> AnimateCommandKind {
    let chain = &sheet.marchers[marcher];
    let mut cursor = chain.head;
    let mut i = 0;
    while let Some(id) = cursor {
        let node = sheet.commands.get(id);
        if i == n {
            return node.command.kind;
        }
        cursor = node.next;
        i += 1;
    }
    panic!("sheet has fewer than {n} commands for marcher {marcher}");
}

/// Spec §8 scenario 1: points resolve against the compile-time position,
/// the sheet's start, the next sheet, and a marcher's reference points.
#[test]
fn points_resolve_against_start_next_and_reference_positions() {
    let start = Coord::from_steps(2.0, 2.0);
    let next = Coord::from_steps(6.0, 6.0);
    let ref2 = Coord::from_steps(4.0, 4.0);

    let mut sheet_a = Sheet::new("1", 8, vec![SheetMarcher::new(start, Symbol::Plain, 0), SheetMarcher::new(start, Symbol::Plain, 1)])
        .with_continuity(0, "sp-and-p", "MAGIC SP")
        .with_continuity(1, "ref-point", "FMTO R2");
    sheet_a.marchers[1].ref_positions[1] = ref2;
    let sheet_b = Sheet::new("2", 1, vec![SheetMarcher::new(next, Symbol::Plain, 0), SheetMarcher::new(next, Symbol::Plain, 1)]);
    let show = InMemoryShow::new(vec![Marcher::new("A1"), Marcher::new("A2")], vec![sheet_a, sheet_b]);

    let (anim, errors) = compile_show(&show);
    assert!(errors.is_empty());

    let sheet = anim.current_sheet();
    // `MAGIC SP` jumps to SP, which is the marcher's own starting position:
    // the displacement is the zero vector.
    match nth_command_kind(sheet, 0, 0) {
        AnimateCommandKind::Move { vector, .. } => assert_eq!(vector, Coord::new(0, 0)),
        other => panic!("expected a zero-length Move, got {other:?}"),
    }
    // `FMTO R2` moves directly to the marcher's second reference point.
    match nth_command_kind(sheet, 1, 0) {
        AnimateCommandKind::Move { vector, .. } => assert_eq!(vector, ref2 - start),
        other => panic!("expected a Move to R2, got {other:?}"),
    }
}

/// Spec §8 scenario 2/3: a sequence of `MT 1 <expr>` statements, each
/// holding for one beat, whose facing direction is the exact DSL expression
/// under test. Every command lands on a `Hold` carrying the raw, un-bounded
/// evaluated degrees — so the worked values from the spec can be asserted
/// directly against `facing_dir`.
#[test]
fn values_and_functions_evaluate_to_the_spec_worked_examples() {
    let start = Coord::from_steps(2.0, 2.0);
    let next = Coord::from_steps(6.0, 6.0);
    let text = concat!(
        "MT 1 REM\n",        // 0: REM -> 20 (beats_rem before any command consumed it)
        "MT 1 (S + 50)\n",   // 1: -> 230
        "MT 1 3.14\n",       // 2: -> 3.14
        "MT 1 (S * DM)\n",   // 3: -> 180 * sqrt(2)
        "MT 1 (1 + 2 * 3)\n", // 4: -> 7
        "MT 1 ((1 + 2) * 3)\n", // 5: -> 9
        "MT 1 (E + W * -DM)\n", // 6: -> 270 - 90*sqrt(2)
        "MT 1 (W - OPP(W))\n", // 7: -> -180
        "MT 1 DIR(NP)\n",    // 8: -> -45
        "MT 1 DIRFROM(NP SP)\n", // 9: -> 135
        "MT 1 DIST(SP)\n",   // 10: -> 0
        "MT 1 DISTFROM(SP NP)\n", // 11: -> 4*sqrt(2)
        "MT 1 EITHER(N S NP)\n", // 12: -> 0
        "MT 1 OPP(W)\n",     // 13: -> 270
        "MT 1 STEP(8 2 NP)\n", // 14: -> 16
        "MT 1 STEP(2 8 NP)\n", // 15: -> 1
    );
    // 16 one-beat holds, then a 4-beat diagonal correction back onto NP.
    let show = single_marcher_show(start, Some(next), 20, text);
    let (anim, errors) = compile_show(&show);
    assert!(errors.is_empty(), "unexpected errors: {errors:?}", errors = errors.non_empty().map(|(k, _)| k).collect::<Vec<_>>());

    let sheet = anim.current_sheet();
    let facing_of = |n: usize| match nth_command_kind(sheet, 0, n) {
        AnimateCommandKind::Hold { facing_dir } => facing_dir,
        other => panic!("expected command {n} to be a Hold, got {other:?}"),
    };
    let eps = 1e-6;
    let sqrt2 = std::f64::consts::SQRT_2;
    assert!((facing_of(0) - 20.0).abs() < eps, "REM");
    assert!((facing_of(1) - 230.0).abs() < eps, "S + 50");
    assert!((facing_of(2) - 3.14).abs() < eps, "3.14");
    assert!((facing_of(3) - 180.0 * sqrt2).abs() < eps, "S * DM");
    assert!((facing_of(4) - 7.0).abs() < eps, "1 + 2 * 3");
    assert!((facing_of(5) - 9.0).abs() < eps, "(1 + 2) * 3");
    assert!((facing_of(6) - (270.0 - 90.0 * sqrt2)).abs() < eps, "E + W * -DM");
    assert!((facing_of(7) - (-180.0)).abs() < eps, "W - OPP(W)");
    assert!((facing_of(8) - (-45.0)).abs() < eps, "DIR(NP)");
    assert!((facing_of(9) - 135.0).abs() < eps, "DIRFROM(NP SP)");
    assert!((facing_of(10) - 0.0).abs() < eps, "DIST(SP)");
    assert!((facing_of(11) - 4.0 * sqrt2).abs() < eps, "DISTFROM(SP NP)");
    assert!((facing_of(12) - 0.0).abs() < eps, "EITHER(N S NP)");
    assert!((facing_of(13) - 270.0).abs() < eps, "OPP(W)");
    assert!((facing_of(14) - 16.0).abs() < eps, "STEP(8 2 NP)");
    assert!((facing_of(15) - 1.0).abs() < eps, "STEP(2 8 NP)");
}

/// Spec §8 "Arithmetic": `Eval(-v, sigma) == -Eval(v, sigma)`.
#[test]
fn negation_is_the_arithmetic_inverse_of_the_unnegated_expression() {
    let start = Coord::from_steps(0.0, 0.0);
    let show = single_marcher_show(start, None, 2, "MT 1 (S * DM)\nMT 1 (-(S * DM))");
    let (anim, _) = compile_show(&show);
    let sheet = anim.current_sheet();
    let facing_of = |n: usize| match nth_command_kind(sheet, 0, n) {
        AnimateCommandKind::Hold { facing_dir } => facing_dir,
        other => panic!("expected a Hold, got {other:?}"),
    };
    assert!((facing_of(0) + facing_of(1)).abs() < 1e-9);
}

/// Spec §8 scenario 4: `MT 8 E` then `EWNS NP` over a 16-beat sheet compiles
/// to `Hold(8), Move(4, (0,-4)), Move(4, (4,0))`, and stepping the animation
/// forward lands exactly on the expected position at each leg boundary.
#[test]
fn mt_then_ewns_steps_through_the_expected_leg_boundaries() {
    let start = Coord::from_steps(0.0, 0.0);
    let next = Coord::from_steps(4.0, -4.0);
    let show = single_marcher_show(start, Some(next), 16, "MT 8 E\nEWNS NP");
    let (mut anim, errors) = compile_show(&show);
    assert!(errors.is_empty());

    let sheet = anim.current_sheet();
    assert_eq!(sum_numbeats(sheet, 0), 16);
    match nth_command_kind(sheet, 0, 1) {
        AnimateCommandKind::Move { vector, .. } => assert_eq!(vector, Coord::from_steps(0.0, -4.0)),
        other => panic!("expected the north/south leg first, got {other:?}"),
    }
    match nth_command_kind(sheet, 0, 2) {
        AnimateCommandKind::Move { vector, .. } => assert_eq!(vector, Coord::from_steps(4.0, 0.0)),
        other => panic!("expected the east/west leg second, got {other:?}"),
    }

    for _ in 0..8 {
        anim.next_beat();
    }
    assert_eq!(anim.position(0), start);
    for _ in 0..4 {
        anim.next_beat();
    }
    assert_eq!(anim.position(0), Coord::from_steps(0.0, -4.0));
    for _ in 0..4 {
        anim.next_beat();
    }
    assert_eq!(anim.position(0), next);
}

/// Spec §8 scenario 5: a countermarch closes its rectangular path exactly
/// at the end of its beat budget when the marcher starts on a corner.
#[test]
fn countermarch_returns_to_its_entry_point_after_the_full_perimeter() {
    let r1 = Coord::from_steps(0.0, 0.0);
    let r2 = Coord::from_steps(8.0, 0.0);
    let mut sheet = Sheet::new("1", 24, vec![SheetMarcher::new(r1, Symbol::Plain, 0)])
        .with_continuity(0, "everyone", "CM R1 R2 4 E E 24");
    sheet.marchers[0].ref_positions[0] = r1;
    sheet.marchers[0].ref_positions[1] = r2;
    let show = InMemoryShow::new(vec![Marcher::new("A1")], vec![sheet]);

    let (mut anim, errors) = compile_show(&show);
    assert!(errors.marker(ErrorKind::InvalidCm).is_empty());
    assert!(errors.marker(ErrorKind::OutOfTime).is_empty());

    let sheet = anim.current_sheet();
    assert_eq!(sum_numbeats(sheet, 0), 24);

    for _ in 0..24 {
        anim.next_beat();
    }
    assert_eq!(anim.position(0), r1);
}

/// Spec §8 scenario 6: a move that overruns the sheet's remaining beats is
/// clipped and registers `OutOfTime`; if the resulting position doesn't
/// line up with the next sheet's recorded position, `WrongPlace` follows.
#[test]
fn overrunning_a_procedure_registers_out_of_time_and_wrong_place() {
    let start = Coord::from_steps(0.0, 0.0);
    let show = single_marcher_show(start, Some(start), 2, "FM 3 E");
    let (_, errors) = compile_show(&show);
    assert!(errors.marker(ErrorKind::OutOfTime).contains(0));
    assert!(errors.marker(ErrorKind::WrongPlace).contains(0));
}

/// Spec §8 "Terminal alignment": when the procedure list lands exactly on
/// the next sheet's position, no correcting move or error is produced.
#[test]
fn landing_exactly_on_next_position_needs_no_correction() {
    let start = Coord::from_steps(0.0, 0.0);
    let next = Coord::from_steps(4.0, 0.0);
    let show = single_marcher_show(start, Some(next), 4, "FM 4 N");
    let (_, errors) = compile_show(&show);
    assert!(errors.is_empty());
}

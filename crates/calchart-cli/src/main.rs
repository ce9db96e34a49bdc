//! Headless demo for the continuity core: builds a synthetic show, compiles
//! it, and prints every beat's marcher positions, facings, and collision
//! flags to stdout. No GUI, no show file loader, no network — just a text
//! dump exercising `calchart_core::compile_show` end to end.

use anyhow::Result;
use calchart_geom::Coord;
use calchart_show::{InMemoryShow, Marcher, Sheet, SheetMarcher, Symbol};
use clap::Parser;
use tracing::info;

/// Compiles a synthetic CalChart show and steps through its animation.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Number of sheets in the synthetic show.
    #[arg(short, long, default_value_t = 3)]
    sheet_count: usize,

    /// Number of marchers in the synthetic show.
    #[arg(short, long, default_value_t = 4)]
    marcher_count: usize,

    /// Beats allotted to each sheet.
    #[arg(short, long, default_value_t = 8)]
    beats: u32,
}

/// Builds a show where every marcher stands abreast, one step apart, and
/// marches east four steps (via `EWNS NP`) on every sheet transition.
fn build_fixture(sheet_count: usize, marcher_count: usize, beats: u32) -> InMemoryShow {
    let marchers = (0..marcher_count).map(|m| Marcher::new(format!("M{m}"))).collect();

    let sheets = (0..sheet_count)
        .map(|s| {
            let sheet_marchers = (0..marcher_count)
                .map(|m| {
                    let pos = Coord::from_steps(m as f64 * 2.0 + s as f64 * 4.0, 0.0);
                    SheetMarcher::new(pos, Symbol::Sol, 0)
                })
                .collect();
            Sheet::new(format!("{}", s + 1), beats, sheet_marchers).with_continuity(0, "everyone", "EWNS NP")
        })
        .collect();

    InMemoryShow::new(marchers, sheets)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    info!(
        sheets = cli.sheet_count,
        marchers = cli.marcher_count,
        beats = cli.beats,
        "building synthetic show"
    );
    let show = build_fixture(cli.sheet_count, cli.marcher_count, cli.beats);

    let (mut anim, errors) = calchart_core::compile_show(&show);
    if !errors.is_empty() {
        for (kind, marker) in errors.non_empty() {
            info!(marchers = ?marker.marchers().collect::<Vec<_>>(), "{kind}");
        }
    }

    println!("sheet {} ({} beats)", anim.current_sheet().name, anim.current_sheet().numbeats);
    print_beat(&anim);
    loop {
        if !anim.next_beat() {
            break;
        }
        if anim.current_beat() == 0 {
            println!("sheet {} ({} beats)", anim.current_sheet().name, anim.current_sheet().numbeats);
        }
        print_beat(&anim);
    }

    Ok(())
}

fn print_beat(anim: &calchart_core::Animation) {
    let marchers = anim.current_sheet().marchers.len();
    for m in 0..marchers {
        let pos = anim.position(m);
        let facing = anim.facing(m);
        let collides = if anim.is_colliding(m) { " COLLISION" } else { "" };
        println!(
            "  beat {:>3}  M{m}  ({:>6.2}, {:>6.2})  facing {:>6.1}{}",
            anim.current_beat(),
            pos.to_steps().0,
            pos.to_steps().1,
            facing,
            collides
        );
    }
}

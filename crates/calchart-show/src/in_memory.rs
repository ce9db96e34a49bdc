use calchart_geom::Coord;

use crate::{Continuity, ShowSource, Symbol, NUM_REF_PNTS};

/// A marcher's identity. Everything that varies sheet to sheet — position,
/// reference points, symbol, continuity assignment — lives on [`Sheet`]
/// instead, so a `Marcher` is nothing more than a label to hang those
/// per-sheet records off of.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Marcher {
    pub label: String,
}

impl Marcher {
    pub fn new(label: impl Into<String>) -> Self {
        Self { label: label.into() }
    }
}

/// One marcher's record on a single sheet.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SheetMarcher {
    pub position: Coord,
    pub ref_positions: [Coord; NUM_REF_PNTS],
    pub symbol: Symbol,
    pub continuity_id: u32,
}

impl SheetMarcher {
    /// A marcher whose reference points haven't been divorced from its
    /// primary position yet; all three default to `position`.
    pub fn new(position: Coord, symbol: Symbol, continuity_id: u32) -> Self {
        Self {
            position,
            ref_positions: [position; NUM_REF_PNTS],
            symbol,
            continuity_id,
        }
    }
}

/// One sheet: a beat budget, every marcher's record on it, and the
/// continuities marchers can be assigned to.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Sheet {
    pub name: String,
    pub number: Option<String>,
    /// `0` for a dot-book-only sheet; such a sheet is not animated.
    pub beats: u32,
    pub marchers: Vec<SheetMarcher>,
    pub continuities: Vec<Continuity>,
}

impl Sheet {
    pub fn new(name: impl Into<String>, beats: u32, marchers: Vec<SheetMarcher>) -> Self {
        Self {
            name: name.into(),
            number: None,
            beats,
            marchers,
            continuities: Vec::new(),
        }
    }

    pub fn with_continuity(mut self, id: u32, name: impl Into<String>, text: impl Into<String>) -> Self {
        self.continuities.push(Continuity { id, name: name.into(), text: text.into() });
        self
    }
}

/// A minimal, in-process [`ShowSource`] for tests, fixtures, and the CLI
/// demo. Not a persistence format: nothing here round-trips to disk.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InMemoryShow {
    pub marchers: Vec<Marcher>,
    pub sheets: Vec<Sheet>,
}

impl InMemoryShow {
    pub fn new(marchers: Vec<Marcher>, sheets: Vec<Sheet>) -> Self {
        Self { marchers, sheets }
    }
}

impl ShowSource for InMemoryShow {
    fn num_marchers(&self) -> usize {
        self.marchers.len()
    }

    fn num_sheets(&self) -> usize {
        self.sheets.len()
    }

    fn sheet_name(&self, sheet: usize) -> &str {
        &self.sheets[sheet].name
    }

    fn beats(&self, sheet: usize) -> u32 {
        self.sheets[sheet].beats
    }

    fn position(&self, sheet: usize, marcher: usize, reference: Option<usize>) -> Coord {
        let m = &self.sheets[sheet].marchers[marcher];
        match reference {
            None => m.position,
            Some(idx) => m.ref_positions[idx],
        }
    }

    fn symbol(&self, sheet: usize, marcher: usize) -> Symbol {
        self.sheets[sheet].marchers[marcher].symbol
    }

    fn continuity_id(&self, sheet: usize, marcher: usize) -> u32 {
        self.sheets[sheet].marchers[marcher].continuity_id
    }

    fn continuities(&self, sheet: usize) -> &[Continuity] {
        &self.sheets[sheet].continuities
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_show() -> InMemoryShow {
        let pos = Coord::from_steps(4.0, 4.0);
        let sheet = Sheet::new(
            "opener",
            8,
            vec![SheetMarcher::new(pos, Symbol::Sol, 0)],
        )
        .with_continuity(0, "everyone", "MT 8 E");
        InMemoryShow::new(vec![Marcher::new("A1")], vec![sheet])
    }

    #[test]
    fn reference_positions_default_to_primary() {
        let show = sample_show();
        let primary = show.position(0, 0, None);
        for idx in 0..NUM_REF_PNTS {
            assert_eq!(show.position(0, 0, Some(idx)), primary);
        }
    }

    #[test]
    fn dot_book_only_sheet_is_not_animated() {
        let mut show = sample_show();
        show.sheets.push(Sheet::new("dot book page", 0, vec![SheetMarcher::new(
            Coord::from_steps(0.0, 0.0),
            Symbol::Plain,
            0,
        )]));
        assert!(show.is_animated(0));
        assert!(!show.is_animated(1));
    }

    #[test]
    fn continuity_lookup_round_trips() {
        let show = sample_show();
        let conts = show.continuities(0);
        assert_eq!(conts.len(), 1);
        assert_eq!(conts[0].text, "MT 8 E");
        assert_eq!(show.continuity_id(0, 0), 0);
    }
}

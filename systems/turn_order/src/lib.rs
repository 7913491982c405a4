#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that derives the order in which units act during a round.

use beverage_bandits_core::{CellCoord, UnitId, UnitView};

/// Turn scheduler that reuses its scratch buffer between rounds.
#[derive(Debug, Default)]
pub struct TurnOrder {
    scratch: Vec<(CellCoord, UnitId)>,
}

impl TurnOrder {
    /// Creates a new scheduler with an empty scratch buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Orders the living units by the reading order of their current cells.
    ///
    /// The output buffer is cleared before populating it. The caller keeps the
    /// list fixed for the whole round and asks again at the start of the next
    /// one, so units that move mid-round keep their original slot.
    pub fn order_for_round(&mut self, units: &UnitView, out: &mut Vec<UnitId>) {
        out.clear();

        self.scratch.clear();
        self.scratch
            .extend(units.iter().map(|snapshot| (snapshot.cell, snapshot.id)));
        self.scratch.sort_unstable();

        out.extend(self.scratch.iter().map(|(_, id)| *id));
    }
}

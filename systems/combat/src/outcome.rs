//! Final scoring of a finished battle.

use beverage_bandits_core::{BattleReport, Faction, UnitView};

/// Reduces the surviving units to a [`BattleReport`].
///
/// The outcome is the number of fully completed rounds multiplied by the hit
/// points the survivors have left.
#[must_use]
pub fn tally(completed_rounds: u32, victor: Faction, survivors: &UnitView) -> BattleReport {
    let remaining_hit_points = survivors.total_hit_points();
    BattleReport {
        completed_rounds,
        remaining_hit_points,
        survivors: survivors.len(),
        victor,
        outcome: u64::from(completed_rounds) * remaining_hit_points,
    }
}

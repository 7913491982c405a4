//! Search for the smallest attack power that wins a battle without losses.

use beverage_bandits_core::{
    AttackPower, BattleReport, CombatRules, Faction, GridMap, UnitSeed,
};
use beverage_bandits_world::World;
use tracing::{debug, info, info_span};

use crate::{check_round_limit, CombatEngine, CombatError, RoundResult};

/// Attack power that carried a faction to victory without a single casualty.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FlawlessVictory {
    /// Smallest sufficient attack power.
    pub attack_power: AttackPower,
    /// Report of the battle fought at that power.
    pub report: BattleReport,
}

/// Raises `faction`'s attack power one point at a time, starting from the
/// value in `rules`, until it wins without losing a unit.
///
/// Each attempt replays the battle from the starting layout. An attempt is
/// abandoned at the end of the first round in which `faction` loses a unit.
/// Powers above `max_power` are not tried.
pub fn minimum_flawless_attack(
    grid: &GridMap,
    seeds: &[UnitSeed],
    rules: &CombatRules,
    faction: Faction,
    max_power: AttackPower,
    round_limit: Option<u32>,
) -> Result<FlawlessVictory, CombatError> {
    let _span = info_span!("flawless_search", ?faction).entered();
    let roster = seeds.iter().filter(|seed| seed.faction == faction).count();

    for power in rules.attack_power(faction).get()..=max_power.get() {
        let attack_power = AttackPower::new(power);
        let attempt = rules.with_attack_power(faction, attack_power);
        let world = World::new(grid.clone(), seeds, &attempt)?;

        match fight_without_losses(CombatEngine::new(world), faction, roster, round_limit)? {
            Some(report) => {
                info!(power, outcome = report.outcome, "flawless victory found");
                return Ok(FlawlessVictory {
                    attack_power,
                    report,
                });
            }
            None => debug!(power, "attack power falls short"),
        }
    }

    Err(CombatError::NoFlawlessVictory {
        faction,
        limit: max_power.get(),
    })
}

/// Plays the battle out, giving up as soon as `faction` drops below `roster`.
fn fight_without_losses(
    mut engine: CombatEngine,
    faction: Faction,
    roster: usize,
    round_limit: Option<u32>,
) -> Result<Option<BattleReport>, CombatError> {
    loop {
        let result = engine.play_round()?;
        if engine.survivors(faction) < roster {
            return Ok(None);
        }

        match result {
            RoundResult::Completed { round } => check_round_limit(round, round_limit)?,
            RoundResult::CombatEnded(report) => {
                return Ok((report.victor == faction).then_some(report));
            }
        }
    }
}

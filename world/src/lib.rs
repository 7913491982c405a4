#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative battlefield state for Beverage Bandits.
//!
//! The [`World`] owns the immutable cavern grid and the registry of living
//! units. It changes only through [`apply`], and every change is reported back
//! as an [`Event`]. Read access goes through the [`query`] module.

mod registry;

use beverage_bandits_core::{
    CellCoord, CombatRules, Command, Event, Faction, GridMap, UnitSeed,
};

use crate::registry::{DamageOutcome, UnitRegistry};

/// Reasons a starting unit layout is rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SetupError {
    /// A unit was placed outside of the grid.
    #[error("unit at {cell:?} lies outside the grid")]
    OutOfBounds {
        /// Offending starting cell.
        cell: CellCoord,
    },
    /// A unit was placed on a wall.
    #[error("unit at {cell:?} stands on a wall")]
    OnWall {
        /// Offending starting cell.
        cell: CellCoord,
    },
    /// Two units were placed on the same cell.
    #[error("more than one unit starts at {cell:?}")]
    SharedCell {
        /// Offending starting cell.
        cell: CellCoord,
    },
    /// Units would start with zero hit points.
    #[error("starting hit points must be positive")]
    NoHitPoints,
    /// A faction's attacks would never deal damage.
    #[error("{faction:?} attack power must be positive")]
    NoAttackPower {
        /// Faction with zero attack power.
        faction: Faction,
    },
}

/// Represents the authoritative state of a single battle.
#[derive(Clone, Debug)]
pub struct World {
    grid: GridMap,
    registry: UnitRegistry,
}

impl World {
    /// Places the seeded units on the grid.
    ///
    /// Identifiers are handed out in reading order of the starting cells, and
    /// every unit receives the hit points and faction attack power named by
    /// `rules`.
    pub fn new(grid: GridMap, seeds: &[UnitSeed], rules: &CombatRules) -> Result<Self, SetupError> {
        if rules.hit_points.get() == 0 {
            return Err(SetupError::NoHitPoints);
        }
        if let Some(faction) = Faction::ALL
            .into_iter()
            .find(|&faction| rules.attack_power(faction).get() == 0)
        {
            return Err(SetupError::NoAttackPower { faction });
        }

        let mut ordered: Vec<UnitSeed> = seeds.to_vec();
        ordered.sort_by_key(|seed| seed.cell);

        for pair in ordered.windows(2) {
            if pair[0].cell == pair[1].cell {
                return Err(SetupError::SharedCell { cell: pair[0].cell });
            }
        }

        let (columns, rows) = grid.dimensions();
        let mut registry = UnitRegistry::new(columns, rows);
        for seed in ordered {
            if !grid.in_bounds(seed.cell) {
                return Err(SetupError::OutOfBounds { cell: seed.cell });
            }
            if !grid.is_floor(seed.cell) {
                return Err(SetupError::OnWall { cell: seed.cell });
            }

            let _ = registry.spawn(
                seed.faction,
                seed.cell,
                rules.hit_points,
                rules.attack_power(seed.faction),
            );
        }

        Ok(Self { grid, registry })
    }
}

/// Applies the provided command to the world, mutating state deterministically.
///
/// Commands are produced by the engine from the current state, so a command
/// that breaks an occupancy or adjacency invariant means the engine is wrong.
/// Such commands panic instead of being ignored.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::MoveUnit { unit, to } => {
            let Some(current) = world.registry.by_id(unit) else {
                panic!("unit {unit:?} is not alive and cannot move");
            };
            assert!(
                current.cell.is_adjacent(to),
                "unit {unit:?} at {:?} cannot step to non-adjacent cell {to:?}",
                current.cell
            );

            let from = world.registry.move_unit(unit, to, &world.grid);
            out_events.push(Event::UnitMoved { unit, from, to });
        }
        Command::Attack { attacker, target } => {
            let Some(striker) = world.registry.by_id(attacker) else {
                panic!("unit {attacker:?} is not alive and cannot attack");
            };
            let Some(victim) = world.registry.by_id(target) else {
                panic!("unit {attacker:?} attacked {target:?}, which is not alive");
            };
            assert!(
                striker.faction != victim.faction,
                "unit {attacker:?} attacked {target:?} of its own faction"
            );
            assert!(
                striker.cell.is_adjacent(victim.cell),
                "unit {attacker:?} at {:?} attacked {target:?} at non-adjacent {:?}",
                striker.cell,
                victim.cell
            );

            let damage = striker.attack_power;
            match world.registry.apply_damage(target, damage) {
                DamageOutcome::Survived { remaining } => out_events.push(Event::UnitDamaged {
                    attacker,
                    target,
                    remaining,
                }),
                DamageOutcome::Killed { cell } => out_events.push(Event::UnitKilled {
                    attacker,
                    target,
                    cell,
                }),
            }
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use super::World;
    use beverage_bandits_core::{
        BattleSnapshot, CellCoord, Faction, GridMap, OccupancyView, UnitId, UnitSnapshot,
        UnitView,
    };

    /// Provides read-only access to the cavern grid.
    #[must_use]
    pub fn grid(world: &World) -> &GridMap {
        &world.grid
    }

    /// Looks up a living unit by identifier.
    #[must_use]
    pub fn unit(world: &World, id: UnitId) -> Option<UnitSnapshot> {
        world.registry.by_id(id).map(|unit| unit.snapshot())
    }

    /// Looks up the living unit standing on `cell`.
    #[must_use]
    pub fn unit_at(world: &World, cell: CellCoord) -> Option<UnitSnapshot> {
        world.registry.unit_at(cell).map(|unit| unit.snapshot())
    }

    /// Captures a read-only view of every living unit.
    #[must_use]
    pub fn unit_view(world: &World) -> UnitView {
        UnitView::from_snapshots(world.registry.alive().map(|unit| unit.snapshot()).collect())
    }

    /// Reports whether `faction` still has a unit standing.
    #[must_use]
    pub fn has_living(world: &World, faction: Faction) -> bool {
        world.registry.alive_of(faction).next().is_some()
    }

    /// Cells currently held by living units of `faction`, in identifier order.
    #[must_use]
    pub fn cells_of(world: &World, faction: Faction) -> Vec<CellCoord> {
        world
            .registry
            .alive_of(faction)
            .map(|unit| unit.cell)
            .collect()
    }

    /// Living units orthogonally adjacent to `cell`, in reading order.
    #[must_use]
    pub fn adjacent_units(world: &World, cell: CellCoord) -> Vec<UnitSnapshot> {
        cell.neighbors()
            .filter_map(|neighbor| unit_at(world, neighbor))
            .collect()
    }

    /// Terrain and occupants together, as consumed by path planning.
    #[must_use]
    pub fn occupancy_view(world: &World) -> OccupancyView<'_> {
        world.registry.occupancy(&world.grid)
    }

    /// Reports whether a unit could step onto `cell` right now.
    #[must_use]
    pub fn is_passable(world: &World, cell: CellCoord) -> bool {
        occupancy_view(world).is_passable(cell)
    }

    /// Draws the current battlefield for renderers and debuggers.
    #[must_use]
    pub fn snapshot(world: &World) -> BattleSnapshot {
        BattleSnapshot::capture(&world.grid, &unit_view(world))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use beverage_bandits_core::{AttackPower, Cell, Faction, Health, UnitId};

    fn corridor(width: usize) -> GridMap {
        let mut middle = vec![Cell::Floor; width];
        middle[0] = Cell::Wall;
        middle[width - 1] = Cell::Wall;
        GridMap::from_rows(vec![vec![Cell::Wall; width], middle, vec![Cell::Wall; width]])
            .expect("rectangular grid")
    }

    fn seed(faction: Faction, column: u32, row: u32) -> UnitSeed {
        UnitSeed {
            faction,
            cell: CellCoord::new(column, row),
        }
    }

    #[test]
    fn identifiers_follow_reading_order_of_seeds() {
        let seeds = [
            seed(Faction::Goblin, 4, 1),
            seed(Faction::Elf, 1, 1),
            seed(Faction::Goblin, 2, 1),
        ];
        let world = World::new(corridor(6), &seeds, &CombatRules::default()).expect("world");

        let cells: Vec<_> = query::unit_view(&world)
            .iter()
            .map(|unit| (unit.id, unit.cell))
            .collect();
        assert_eq!(
            cells,
            vec![
                (UnitId::new(0), CellCoord::new(1, 1)),
                (UnitId::new(1), CellCoord::new(2, 1)),
                (UnitId::new(2), CellCoord::new(4, 1)),
            ]
        );
    }

    #[test]
    fn rules_assign_faction_attack_power() {
        let rules = CombatRules::default().with_attack_power(Faction::Elf, AttackPower::new(20));
        let seeds = [seed(Faction::Elf, 1, 1), seed(Faction::Goblin, 3, 1)];
        let world = World::new(corridor(5), &seeds, &rules).expect("world");

        let elf = query::unit(&world, UnitId::new(0)).expect("elf");
        let goblin = query::unit(&world, UnitId::new(1)).expect("goblin");
        assert_eq!(elf.attack_power, AttackPower::new(20));
        assert_eq!(goblin.attack_power, AttackPower::new(3));
        assert_eq!(goblin.health, Health::new(200));
    }

    #[test]
    fn setup_rejects_invalid_placements() {
        let rules = CombatRules::default();
        assert_eq!(
            World::new(corridor(5), &[seed(Faction::Elf, 0, 1)], &rules).err(),
            Some(SetupError::OnWall {
                cell: CellCoord::new(0, 1)
            })
        );
        assert_eq!(
            World::new(corridor(5), &[seed(Faction::Elf, 9, 1)], &rules).err(),
            Some(SetupError::OutOfBounds {
                cell: CellCoord::new(9, 1)
            })
        );
        assert_eq!(
            World::new(
                corridor(5),
                &[seed(Faction::Elf, 2, 1), seed(Faction::Goblin, 2, 1)],
                &rules
            )
            .err(),
            Some(SetupError::SharedCell {
                cell: CellCoord::new(2, 1)
            })
        );
    }

    #[test]
    fn setup_rejects_rules_that_cannot_finish_a_battle() {
        let seeds = [seed(Faction::Elf, 1, 1), seed(Faction::Goblin, 2, 1)];
        let no_hit_points = CombatRules {
            hit_points: Health::new(0),
            ..CombatRules::default()
        };
        let harmless_goblins =
            CombatRules::default().with_attack_power(Faction::Goblin, AttackPower::new(0));

        assert_eq!(
            World::new(corridor(5), &seeds, &no_hit_points).err(),
            Some(SetupError::NoHitPoints)
        );
        assert_eq!(
            World::new(corridor(5), &seeds, &harmless_goblins).err(),
            Some(SetupError::NoAttackPower {
                faction: Faction::Goblin
            })
        );
    }

    #[test]
    fn apply_moves_and_reports() {
        let seeds = [seed(Faction::Elf, 1, 1), seed(Faction::Goblin, 4, 1)];
        let mut world = World::new(corridor(6), &seeds, &CombatRules::default()).expect("world");
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::MoveUnit {
                unit: UnitId::new(0),
                to: CellCoord::new(2, 1),
            },
            &mut events,
        );

        assert_eq!(
            events,
            vec![Event::UnitMoved {
                unit: UnitId::new(0),
                from: CellCoord::new(1, 1),
                to: CellCoord::new(2, 1),
            }]
        );
        assert!(query::is_passable(&world, CellCoord::new(1, 1)));
        assert!(!query::is_passable(&world, CellCoord::new(2, 1)));
    }

    #[test]
    fn apply_attack_kills_and_frees_the_cell() {
        let rules = CombatRules {
            hit_points: Health::new(4),
            ..CombatRules::default()
        };
        let seeds = [seed(Faction::Elf, 1, 1), seed(Faction::Goblin, 2, 1)];
        let mut world = World::new(corridor(5), &seeds, &rules).expect("world");
        let attack = Command::Attack {
            attacker: UnitId::new(0),
            target: UnitId::new(1),
        };
        let mut events = Vec::new();

        apply(&mut world, attack, &mut events);
        apply(&mut world, attack, &mut events);

        assert_eq!(
            events,
            vec![
                Event::UnitDamaged {
                    attacker: UnitId::new(0),
                    target: UnitId::new(1),
                    remaining: Health::new(1),
                },
                Event::UnitKilled {
                    attacker: UnitId::new(0),
                    target: UnitId::new(1),
                    cell: CellCoord::new(2, 1),
                },
            ]
        );
        assert!(!query::has_living(&world, Faction::Goblin));
        assert!(query::is_passable(&world, CellCoord::new(2, 1)));
    }

    #[test]
    #[should_panic(expected = "non-adjacent")]
    fn attacking_out_of_reach_panics() {
        let seeds = [seed(Faction::Elf, 1, 1), seed(Faction::Goblin, 3, 1)];
        let mut world = World::new(corridor(5), &seeds, &CombatRules::default()).expect("world");
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::Attack {
                attacker: UnitId::new(0),
                target: UnitId::new(1),
            },
            &mut events,
        );
    }

    #[test]
    fn adjacent_units_are_listed_in_reading_order() {
        let grid = GridMap::from_rows(vec![vec![Cell::Floor; 3]; 3]).expect("grid");
        let seeds = [
            seed(Faction::Goblin, 1, 2),
            seed(Faction::Goblin, 2, 1),
            seed(Faction::Elf, 1, 1),
            seed(Faction::Goblin, 1, 0),
        ];
        let world = World::new(grid, &seeds, &CombatRules::default()).expect("world");

        let cells: Vec<_> = query::adjacent_units(&world, CellCoord::new(1, 1))
            .into_iter()
            .map(|unit| unit.cell)
            .collect();
        assert_eq!(
            cells,
            vec![
                CellCoord::new(1, 0),
                CellCoord::new(2, 1),
                CellCoord::new(1, 2),
            ]
        );
    }
}

#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that picks which adjacent enemy a unit strikes.

use beverage_bandits_core::{CellCoord, Command, Health, UnitId, UnitSnapshot};

/// Targeting system that emits at most one attack command per turn.
#[derive(Debug, Default)]
pub struct Targeting;

impl Targeting {
    /// Creates a new targeting system.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Emits a `Command::Attack` against the weakest adjacent enemy.
    ///
    /// Units in `nearby` that are friendly or not orthogonally adjacent to the
    /// attacker are ignored. Among the rest, fewest hit points wins and equal
    /// hit points fall back to reading order of the target's cell. Nothing is
    /// emitted when no enemy is in reach.
    pub fn handle(&self, attacker: &UnitSnapshot, nearby: &[UnitSnapshot], out: &mut Vec<Command>) {
        let mut best: Option<BestCandidate> = None;

        for candidate in nearby {
            if candidate.faction == attacker.faction {
                continue;
            }
            if !attacker.cell.is_adjacent(candidate.cell) {
                continue;
            }

            let current = BestCandidate {
                health: candidate.health,
                cell: candidate.cell,
                unit: candidate.id,
            };

            match &mut best {
                Some(existing) => {
                    if current.precedes(existing) {
                        *existing = current;
                    }
                }
                None => best = Some(current),
            }
        }

        if let Some(target) = best {
            out.push(Command::Attack {
                attacker: attacker.id,
                target: target.unit,
            });
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct BestCandidate {
    health: Health,
    cell: CellCoord,
    unit: UnitId,
}

impl BestCandidate {
    fn precedes(&self, other: &Self) -> bool {
        if self.health != other.health {
            return self.health < other.health;
        }

        self.cell < other.cell
    }
}

#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Round-based combat engine that drives the pure systems against the world.
//!
//! Each round the engine snapshots the turn order, then walks it unit by unit.
//! A unit that is not yet next to an enemy asks the [`Pathfinder`] for a step,
//! and any unit next to an enemy asks [`Targeting`] whom to strike. Every
//! decision is made against the live world, so a move or a kill is visible to
//! the very next unit in the same round.

pub mod outcome;
pub mod search;

use beverage_bandits_core::{
    BattleReport, CellCoord, Command, Event, Faction, UnitId, UnitSnapshot,
};
use beverage_bandits_system_pathfinding::{candidate_squares, Pathfinder};
use beverage_bandits_system_targeting::Targeting;
use beverage_bandits_system_turn_order::TurnOrder;
use beverage_bandits_world::{apply, query, SetupError, World};
use tracing::{debug, info, trace};

/// Lifecycle of a battle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CombatState {
    /// A round is in progress, or the first round has not started yet.
    Running,
    /// The last round ran to completion with both factions standing.
    RoundComplete,
    /// A unit found no enemies left. The battle is over.
    CombatEnded,
}

/// Result of playing a single round.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RoundResult {
    /// Every scheduled unit took its turn.
    Completed {
        /// Number of completed rounds, including this one.
        round: u32,
    },
    /// Combat ended part-way through the round, which therefore does not count.
    CombatEnded(BattleReport),
}

/// Reasons a battle cannot be brought to a conclusion.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CombatError {
    /// The battle outlasted the caller's round limit.
    #[error("combat was still running after {limit} completed rounds")]
    RoundLimitExceeded {
        /// Limit supplied by the caller.
        limit: u32,
    },
    /// A whole round passed without a single move or attack.
    #[error("round {round} passed without a move or an attack; the factions cannot reach each other")]
    Stalled {
        /// The round that made no progress.
        round: u32,
    },
    /// No attack power within the search bound wins without losses.
    #[error("{faction:?} cannot win without losses at attack power {limit} or below")]
    NoFlawlessVictory {
        /// Faction whose attack power was searched.
        faction: Faction,
        /// Highest attack power tried.
        limit: u32,
    },
    /// The starting layout was rejected by the world.
    #[error(transparent)]
    Setup(#[from] SetupError),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum TurnOutcome {
    Idle,
    Moved,
    Attacked,
}

/// Owns a [`World`] and plays it out round by round.
#[derive(Debug)]
pub struct CombatEngine {
    world: World,
    turn_order: TurnOrder,
    pathfinder: Pathfinder,
    targeting: Targeting,
    state: CombatState,
    completed_rounds: u32,
    report: Option<BattleReport>,
    order: Vec<UnitId>,
    candidates: Vec<CellCoord>,
    commands: Vec<Command>,
    events: Vec<Event>,
}

impl CombatEngine {
    /// Creates an engine that has not played any round yet.
    #[must_use]
    pub fn new(world: World) -> Self {
        Self {
            world,
            turn_order: TurnOrder::new(),
            pathfinder: Pathfinder::new(),
            targeting: Targeting::new(),
            state: CombatState::Running,
            completed_rounds: 0,
            report: None,
            order: Vec::new(),
            candidates: Vec::new(),
            commands: Vec::new(),
            events: Vec::new(),
        }
    }

    /// Read-only access to the battlefield.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> CombatState {
        self.state
    }

    /// Rounds that ran to completion so far.
    #[must_use]
    pub fn completed_rounds(&self) -> u32 {
        self.completed_rounds
    }

    /// Final report, available once combat has ended.
    #[must_use]
    pub fn report(&self) -> Option<BattleReport> {
        self.report
    }

    /// Events emitted during the most recent round, in the order they happened.
    #[must_use]
    pub fn last_round_events(&self) -> &[Event] {
        &self.events
    }

    /// Number of living units fighting for `faction`.
    #[must_use]
    pub fn survivors(&self, faction: Faction) -> usize {
        query::unit_view(&self.world).of_faction(faction).count()
    }

    /// Plays one round.
    ///
    /// Calling this after combat has ended returns the final report again
    /// without touching the world.
    pub fn play_round(&mut self) -> Result<RoundResult, CombatError> {
        if let Some(report) = self.report {
            return Ok(RoundResult::CombatEnded(report));
        }

        self.state = CombatState::Running;
        self.events.clear();

        let units = query::unit_view(&self.world);
        self.turn_order.order_for_round(&units, &mut self.order);

        let order = std::mem::take(&mut self.order);
        let mut ended_by = None;
        for &unit in &order {
            if let Some(faction) = self.take_turn(unit) {
                ended_by = Some(faction);
                break;
            }
        }
        self.order = order;

        if let Some(victor) = ended_by {
            let report = outcome::tally(
                self.completed_rounds,
                victor,
                &query::unit_view(&self.world),
            );
            info!(
                rounds = report.completed_rounds,
                hit_points = report.remaining_hit_points,
                outcome = report.outcome,
                ?victor,
                "combat ended"
            );
            self.state = CombatState::CombatEnded;
            self.report = Some(report);
            return Ok(RoundResult::CombatEnded(report));
        }

        let round = self.completed_rounds + 1;
        if self.events.is_empty() {
            return Err(CombatError::Stalled { round });
        }

        self.completed_rounds = round;
        self.state = CombatState::RoundComplete;
        debug!(round, events = self.events.len(), "round complete");
        Ok(RoundResult::Completed { round })
    }

    /// Plays rounds until one faction is wiped out.
    ///
    /// With a `round_limit`, a battle that completes more rounds than the limit
    /// fails with [`CombatError::RoundLimitExceeded`].
    pub fn run(&mut self, round_limit: Option<u32>) -> Result<BattleReport, CombatError> {
        self.run_observed(round_limit, |_| {})
    }

    /// Like [`CombatEngine::run`], calling `observer` after every round,
    /// including the one in which combat ends.
    pub fn run_observed<F>(
        &mut self,
        round_limit: Option<u32>,
        mut observer: F,
    ) -> Result<BattleReport, CombatError>
    where
        F: FnMut(&Self),
    {
        loop {
            let result = self.play_round()?;
            observer(self);
            match result {
                RoundResult::Completed { round } => check_round_limit(round, round_limit)?,
                RoundResult::CombatEnded(report) => return Ok(report),
            }
        }
    }

    /// Runs one unit's turn. Returns the unit's faction if it found no enemy left.
    fn take_turn(&mut self, id: UnitId) -> Option<Faction> {
        let Some(mut unit) = query::unit(&self.world, id) else {
            trace!(unit = id.get(), "skipping fallen unit");
            return None;
        };

        let enemy = unit.faction.opponent();
        if !query::has_living(&self.world, enemy) {
            return Some(unit.faction);
        }

        let turn = if self.in_reach(&unit) {
            self.strike(&unit)
        } else {
            match self.advance(&unit) {
                Some(cell) => {
                    unit.cell = cell;
                    self.strike(&unit)
                }
                None => TurnOutcome::Idle,
            }
        };
        trace!(unit = id.get(), ?turn, "turn finished");
        None
    }

    fn in_reach(&self, unit: &UnitSnapshot) -> bool {
        query::adjacent_units(&self.world, unit.cell)
            .iter()
            .any(|other| other.faction != unit.faction)
    }

    /// Moves the unit one step toward the nearest enemy, returning its new cell.
    fn advance(&mut self, unit: &UnitSnapshot) -> Option<CellCoord> {
        let world = &self.world;
        let enemy_cells = query::cells_of(world, unit.faction.opponent());
        let occupancy = query::occupancy_view(world);
        candidate_squares(&enemy_cells, occupancy, &mut self.candidates);

        let step = self
            .pathfinder
            .next_step(unit.cell, &self.candidates, occupancy)?;

        trace!(
            unit = unit.id.get(),
            destination = ?step.destination,
            distance = step.distance,
            "planned step"
        );
        self.execute(Command::MoveUnit {
            unit: unit.id,
            to: step.next,
        });
        Some(step.next)
    }

    /// Attacks the weakest adjacent enemy, if any. Only called after the unit
    /// either started in reach or just moved.
    fn strike(&mut self, unit: &UnitSnapshot) -> TurnOutcome {
        let nearby = query::adjacent_units(&self.world, unit.cell);

        self.commands.clear();
        self.targeting.handle(unit, &nearby, &mut self.commands);

        let mut commands = std::mem::take(&mut self.commands);
        let acted = !commands.is_empty();
        for command in commands.drain(..) {
            self.execute(command);
        }
        self.commands = commands;

        if acted {
            TurnOutcome::Attacked
        } else {
            TurnOutcome::Moved
        }
    }

    fn execute(&mut self, command: Command) {
        let start = self.events.len();
        apply(&mut self.world, command, &mut self.events);
        for event in &self.events[start..] {
            log_event(event);
        }
    }
}

fn check_round_limit(round: u32, round_limit: Option<u32>) -> Result<(), CombatError> {
    match round_limit {
        Some(limit) if round > limit => Err(CombatError::RoundLimitExceeded { limit }),
        _ => Ok(()),
    }
}

fn log_event(event: &Event) {
    match *event {
        Event::UnitMoved { unit, from, to } => {
            debug!(unit = unit.get(), ?from, ?to, "unit moved");
        }
        Event::UnitDamaged {
            attacker,
            target,
            remaining,
        } => {
            debug!(
                attacker = attacker.get(),
                target = target.get(),
                remaining = remaining.get(),
                "unit damaged"
            );
        }
        Event::UnitKilled {
            attacker,
            target,
            cell,
        } => {
            debug!(
                attacker = attacker.get(),
                target = target.get(),
                ?cell,
                "unit killed"
            );
        }
    }
}

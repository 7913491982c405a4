#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Beverage Bandits combat simulator.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Systems inspect immutable views of the
//! battlefield and respond with [`Command`] values, the world executes those
//! commands via its `apply` entry point, and then broadcasts [`Event`] values
//! describing exactly what changed. Nothing in here mutates state on its own.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

/// Hit points every unit starts with unless the rules say otherwise.
pub const DEFAULT_HIT_POINTS: Health = Health::new(200);

/// Attack power every unit wields unless the rules say otherwise.
pub const DEFAULT_ATTACK_POWER: AttackPower = AttackPower::new(3);

/// Commands that express all permissible world mutations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Command {
    /// Requests that a unit step into an adjacent free floor cell.
    MoveUnit {
        /// Identifier of the unit attempting to move.
        unit: UnitId,
        /// Destination cell orthogonally adjacent to the unit.
        to: CellCoord,
    },
    /// Requests that a unit strike an adjacent enemy.
    Attack {
        /// Identifier of the unit dealing damage.
        attacker: UnitId,
        /// Identifier of the unit receiving damage.
        target: UnitId,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Event {
    /// Confirms that a unit moved between two cells.
    UnitMoved {
        /// Identifier of the unit that moved.
        unit: UnitId,
        /// Cell the unit occupied before moving.
        from: CellCoord,
        /// Cell the unit occupies after moving.
        to: CellCoord,
    },
    /// Confirms that an attack landed and the target survived.
    UnitDamaged {
        /// Identifier of the attacking unit.
        attacker: UnitId,
        /// Identifier of the unit that was hit.
        target: UnitId,
        /// Hit points the target has left.
        remaining: Health,
    },
    /// Confirms that an attack killed its target and freed its cell.
    UnitKilled {
        /// Identifier of the attacking unit.
        attacker: UnitId,
        /// Identifier of the unit that died.
        target: UnitId,
        /// Cell that became free when the target died.
        cell: CellCoord,
    },
}

/// Location of a single grid cell expressed as column and row coordinates.
///
/// Cells order in reading order: top-to-bottom, then left-to-right. Every
/// tie-break in the simulation relies on this ordering.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Computes the Manhattan distance between two cell coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: CellCoord) -> u32 {
        self.column().abs_diff(other.column()) + self.row().abs_diff(other.row())
    }

    /// Reports whether `other` shares an edge with this cell.
    #[must_use]
    pub fn is_adjacent(self, other: CellCoord) -> bool {
        self.manhattan_distance(other) == 1
    }

    /// Orthogonal neighbours in reading order.
    ///
    /// Neighbours that would fall below zero are omitted; the upper bounds are
    /// left to the caller because only the grid knows its dimensions.
    pub fn neighbors(self) -> impl Iterator<Item = CellCoord> {
        let up = self
            .row
            .checked_sub(1)
            .map(|row| CellCoord::new(self.column, row));
        let left = self
            .column
            .checked_sub(1)
            .map(|column| CellCoord::new(column, self.row));
        let right = self
            .column
            .checked_add(1)
            .map(|column| CellCoord::new(column, self.row));
        let down = self
            .row
            .checked_add(1)
            .map(|row| CellCoord::new(self.column, row));

        [up, left, right, down].into_iter().flatten()
    }
}

impl Ord for CellCoord {
    fn cmp(&self, other: &Self) -> Ordering {
        self.row
            .cmp(&other.row)
            .then_with(|| self.column.cmp(&other.column))
    }
}

impl PartialOrd for CellCoord {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Unique identifier assigned to a unit.
///
/// Identifiers are handed out in reading order of the starting positions and
/// never reused.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct UnitId(u32);

impl UnitId {
    /// Creates a new unit identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// The two opposing sides of the battle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Faction {
    /// Elves, drawn as `E`.
    Elf,
    /// Goblins, drawn as `G`.
    Goblin,
}

impl Faction {
    /// Both factions in a stable order.
    pub const ALL: [Faction; 2] = [Faction::Elf, Faction::Goblin];

    /// The faction this one fights against.
    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Self::Elf => Self::Goblin,
            Self::Goblin => Self::Elf,
        }
    }

    /// Map glyph used for units of this faction.
    #[must_use]
    pub const fn glyph(self) -> char {
        match self {
            Self::Elf => 'E',
            Self::Goblin => 'G',
        }
    }

    /// Resolves a map glyph into a faction.
    #[must_use]
    pub const fn from_glyph(glyph: char) -> Option<Self> {
        match glyph {
            'E' => Some(Self::Elf),
            'G' => Some(Self::Goblin),
            _ => None,
        }
    }
}

/// Remaining hit points of a living unit. Always positive.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Health(u32);

impl Health {
    /// Creates a health value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the underlying hit points.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Hit points left after absorbing `damage`, or `None` once they reach zero.
    #[must_use]
    pub fn after_damage(self, damage: AttackPower) -> Option<Self> {
        self.0
            .checked_sub(damage.get())
            .filter(|remaining| *remaining > 0)
            .map(Self)
    }
}

/// Damage dealt by a single attack.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct AttackPower(u32);

impl AttackPower {
    /// Creates a new attack power value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the underlying damage value.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Tunable constants applied when units are created.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CombatRules {
    /// Starting hit points for every unit.
    pub hit_points: Health,
    /// Attack power wielded by every elf.
    pub elf_attack: AttackPower,
    /// Attack power wielded by every goblin.
    pub goblin_attack: AttackPower,
}

impl CombatRules {
    /// Attack power assigned to units of `faction`.
    #[must_use]
    pub const fn attack_power(&self, faction: Faction) -> AttackPower {
        match faction {
            Faction::Elf => self.elf_attack,
            Faction::Goblin => self.goblin_attack,
        }
    }

    /// Returns a copy of the rules with a different attack power for `faction`.
    #[must_use]
    pub fn with_attack_power(mut self, faction: Faction, power: AttackPower) -> Self {
        match faction {
            Faction::Elf => self.elf_attack = power,
            Faction::Goblin => self.goblin_attack = power,
        }
        self
    }
}

impl Default for CombatRules {
    fn default() -> Self {
        Self {
            hit_points: DEFAULT_HIT_POINTS,
            elf_attack: DEFAULT_ATTACK_POWER,
            goblin_attack: DEFAULT_ATTACK_POWER,
        }
    }
}

/// Terrain of a single cell. Fixed for the lifetime of a battle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cell {
    /// Impassable rock.
    Wall,
    /// Open cavern floor. May additionally hold a unit.
    Floor,
}

impl Cell {
    /// Map glyph used for the empty terrain.
    #[must_use]
    pub const fn glyph(self) -> char {
        match self {
            Self::Wall => '#',
            Self::Floor => '.',
        }
    }
}

/// Reasons a grid cannot be assembled.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum GridError {
    /// No rows or no columns were supplied.
    #[error("grid must contain at least one row and one column")]
    Empty,
    /// A row's width differed from the first row's.
    #[error("row {row} has {found} cells but the grid is {expected} cells wide")]
    Ragged {
        /// Zero-based index of the offending row.
        row: usize,
        /// Width established by the first row.
        expected: usize,
        /// Width of the offending row.
        found: usize,
    },
    /// The grid does not fit into `u32` coordinates.
    #[error("grid dimensions exceed the supported coordinate range")]
    TooLarge,
}

/// Immutable floor and wall lookup over a rectangular grid.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GridMap {
    columns: u32,
    rows: u32,
    cells: Vec<Cell>,
}

impl GridMap {
    /// Builds a grid from row-major terrain, rejecting ragged input.
    pub fn from_rows(rows: Vec<Vec<Cell>>) -> Result<Self, GridError> {
        let width = rows.first().map_or(0, Vec::len);
        if width == 0 {
            return Err(GridError::Empty);
        }

        if let Some((row, found)) = rows
            .iter()
            .enumerate()
            .find_map(|(index, row)| (row.len() != width).then_some((index, row.len())))
        {
            return Err(GridError::Ragged {
                row,
                expected: width,
                found,
            });
        }

        let columns = u32::try_from(width).map_err(|_| GridError::TooLarge)?;
        let row_count = u32::try_from(rows.len()).map_err(|_| GridError::TooLarge)?;

        Ok(Self {
            columns,
            rows: row_count,
            cells: rows.into_iter().flatten().collect(),
        })
    }

    /// Provides the grid dimensions as `(columns, rows)`.
    #[must_use]
    pub const fn dimensions(&self) -> (u32, u32) {
        (self.columns, self.rows)
    }

    /// Reports whether the cell lies inside the grid.
    #[must_use]
    pub const fn in_bounds(&self, cell: CellCoord) -> bool {
        cell.column() < self.columns && cell.row() < self.rows
    }

    /// Terrain at the provided cell, if it lies inside the grid.
    #[must_use]
    pub fn cell(&self, cell: CellCoord) -> Option<Cell> {
        self.index(cell)
            .and_then(|index| self.cells.get(index).copied())
    }

    /// Reports whether the cell is open floor. Out-of-bounds cells are not.
    #[must_use]
    pub fn is_floor(&self, cell: CellCoord) -> bool {
        self.cell(cell) == Some(Cell::Floor)
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if !self.in_bounds(cell) {
            return None;
        }
        let row = usize::try_from(cell.row()).ok()?;
        let column = usize::try_from(cell.column()).ok()?;
        let width = usize::try_from(self.columns).ok()?;
        Some(row * width + column)
    }
}

/// Starting placement of a unit, as produced by a map parser.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UnitSeed {
    /// Side the unit fights for.
    pub faction: Faction,
    /// Floor cell the unit starts on.
    pub cell: CellCoord,
}

/// Immutable representation of a single unit's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UnitSnapshot {
    /// Unique identifier assigned to the unit.
    pub id: UnitId,
    /// Side the unit fights for.
    pub faction: Faction,
    /// Cell currently occupied by the unit.
    pub cell: CellCoord,
    /// Hit points the unit has left.
    pub health: Health,
    /// Damage dealt by each of the unit's attacks.
    pub attack_power: AttackPower,
}

/// Read-only snapshot describing all living units.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UnitView {
    snapshots: Vec<UnitSnapshot>,
}

impl UnitView {
    /// Creates a new unit view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<UnitSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured unit snapshots in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = &UnitSnapshot> {
        self.snapshots.iter()
    }

    /// Iterator over the living units of one faction in identifier order.
    pub fn of_faction(&self, faction: Faction) -> impl Iterator<Item = &UnitSnapshot> {
        self.snapshots
            .iter()
            .filter(move |snapshot| snapshot.faction == faction)
    }

    /// Number of living units.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether no unit is alive.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Sum of the hit points of every living unit.
    #[must_use]
    pub fn total_hit_points(&self) -> u64 {
        self.snapshots
            .iter()
            .map(|snapshot| u64::from(snapshot.health.get()))
            .sum()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<UnitSnapshot> {
        self.snapshots
    }
}

/// Live passability of the battlefield: terrain plus the units standing on it.
#[derive(Clone, Copy, Debug)]
pub struct OccupancyView<'a> {
    grid: &'a GridMap,
    occupants: &'a [Option<UnitId>],
}

impl<'a> OccupancyView<'a> {
    /// Pairs the terrain with a row-major slice holding the occupant of each cell.
    ///
    /// Cells beyond the end of `occupants` are treated as empty.
    #[must_use]
    pub fn new(grid: &'a GridMap, occupants: &'a [Option<UnitId>]) -> Self {
        Self { grid, occupants }
    }

    /// Terrain the view was built over.
    #[must_use]
    pub fn grid(&self) -> &'a GridMap {
        self.grid
    }

    /// Living unit standing on the cell, if any.
    #[must_use]
    pub fn occupant(&self, cell: CellCoord) -> Option<UnitId> {
        self.grid
            .index(cell)
            .and_then(|index| self.occupants.get(index).copied().flatten())
    }

    /// Reports whether a unit could step onto the cell: open floor with nobody on it.
    #[must_use]
    pub fn is_passable(&self, cell: CellCoord) -> bool {
        self.grid.is_floor(cell) && self.occupant(cell).is_none()
    }
}

/// Glyph-level picture of the battlefield for renderers and debuggers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleSnapshot {
    columns: u32,
    rows: u32,
    glyphs: Vec<char>,
    units: Vec<UnitSnapshot>,
}

impl BattleSnapshot {
    /// Draws the grid and overlays the provided units on top of it.
    #[must_use]
    pub fn capture(grid: &GridMap, units: &UnitView) -> Self {
        let (columns, rows) = grid.dimensions();
        let mut glyphs: Vec<char> = grid.cells.iter().map(|cell| cell.glyph()).collect();
        for unit in units.iter() {
            if let Some(index) = grid.index(unit.cell) {
                glyphs[index] = unit.faction.glyph();
            }
        }

        let mut units: Vec<UnitSnapshot> = units.iter().copied().collect();
        units.sort_by_key(|unit| unit.cell);

        Self {
            columns,
            rows,
            glyphs,
            units,
        }
    }

    /// Provides the snapshot dimensions as `(columns, rows)`.
    #[must_use]
    pub const fn dimensions(&self) -> (u32, u32) {
        (self.columns, self.rows)
    }

    /// Glyph drawn at the provided cell.
    #[must_use]
    pub fn glyph_at(&self, cell: CellCoord) -> Option<char> {
        if cell.column() >= self.columns || cell.row() >= self.rows {
            return None;
        }
        let width = usize::try_from(self.columns).ok()?;
        let row = usize::try_from(cell.row()).ok()?;
        let column = usize::try_from(cell.column()).ok()?;
        self.glyphs.get(row * width + column).copied()
    }

    /// Glyphs of a single row, left to right.
    #[must_use]
    pub fn row(&self, row: u32) -> Option<&[char]> {
        if row >= self.rows {
            return None;
        }
        let width = usize::try_from(self.columns).ok()?;
        let start = usize::try_from(row).ok()? * width;
        self.glyphs.get(start..start + width)
    }

    /// Living units in reading order of their cells.
    #[must_use]
    pub fn units(&self) -> &[UnitSnapshot] {
        &self.units
    }
}

/// Final tally of a finished battle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BattleReport {
    /// Rounds that ran to completion before combat ended.
    pub completed_rounds: u32,
    /// Sum of the hit points of every surviving unit.
    pub remaining_hit_points: u64,
    /// Number of surviving units.
    pub survivors: usize,
    /// Faction that still has units standing.
    pub victor: Faction,
    /// `completed_rounds * remaining_hit_points`.
    pub outcome: u64,
}

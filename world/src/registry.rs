//! Arena of living units indexed by identifier and by position.

use beverage_bandits_core::{
    AttackPower, CellCoord, Faction, GridMap, Health, OccupancyView, UnitId, UnitSnapshot,
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Unit {
    pub(crate) id: UnitId,
    pub(crate) faction: Faction,
    pub(crate) cell: CellCoord,
    pub(crate) health: Health,
    pub(crate) attack_power: AttackPower,
}

impl Unit {
    pub(crate) fn snapshot(&self) -> UnitSnapshot {
        UnitSnapshot {
            id: self.id,
            faction: self.faction,
            cell: self.cell,
            health: self.health,
            attack_power: self.attack_power,
        }
    }
}

/// Result of landing a blow on a unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum DamageOutcome {
    Survived { remaining: Health },
    Killed { cell: CellCoord },
}

/// Units live in `slots` at the index of their identifier, so lookups by id
/// and by cell are both constant time. A dead unit leaves a `None` behind;
/// identifiers are never reused.
#[derive(Clone, Debug)]
pub(crate) struct UnitRegistry {
    slots: Vec<Option<Unit>>,
    occupancy: OccupancyGrid,
}

impl UnitRegistry {
    pub(crate) fn new(columns: u32, rows: u32) -> Self {
        Self {
            slots: Vec::new(),
            occupancy: OccupancyGrid::new(columns, rows),
        }
    }

    /// Adds a unit on a free cell and returns its freshly allocated identifier.
    pub(crate) fn spawn(
        &mut self,
        faction: Faction,
        cell: CellCoord,
        health: Health,
        attack_power: AttackPower,
    ) -> UnitId {
        assert!(
            self.occupancy.occupant(cell).is_none(),
            "cannot spawn a unit on occupied cell {cell:?}"
        );

        let raw_id = u32::try_from(self.slots.len()).unwrap_or(u32::MAX);
        let id = UnitId::new(raw_id);
        self.occupancy.occupy(id, cell);
        self.slots.push(Some(Unit {
            id,
            faction,
            cell,
            health,
            attack_power,
        }));
        id
    }

    pub(crate) fn by_id(&self, id: UnitId) -> Option<&Unit> {
        let index = usize::try_from(id.get()).ok()?;
        self.slots.get(index).and_then(Option::as_ref)
    }

    pub(crate) fn unit_at(&self, cell: CellCoord) -> Option<&Unit> {
        self.occupancy
            .occupant(cell)
            .and_then(|id| self.by_id(id))
    }

    pub(crate) fn alive(&self) -> impl Iterator<Item = &Unit> {
        self.slots.iter().flatten()
    }

    pub(crate) fn alive_of(&self, faction: Faction) -> impl Iterator<Item = &Unit> {
        self.alive().filter(move |unit| unit.faction == faction)
    }

    /// Relocates a unit, panicking if the destination is a wall or occupied.
    pub(crate) fn move_unit(&mut self, id: UnitId, to: CellCoord, grid: &GridMap) -> CellCoord {
        assert!(grid.is_floor(to), "unit {id:?} cannot move onto non-floor cell {to:?}");
        if let Some(occupant) = self.occupancy.occupant(to) {
            panic!("unit {id:?} cannot move onto {to:?}: occupied by {occupant:?}");
        }

        let unit = self
            .slot_mut(id)
            .unwrap_or_else(|| panic!("unit {id:?} is not alive and cannot move"));
        let from = unit.cell;
        unit.cell = to;

        self.occupancy.vacate(from);
        self.occupancy.occupy(id, to);
        from
    }

    /// Subtracts `amount` from the unit's hit points, removing it once they run out.
    pub(crate) fn apply_damage(&mut self, id: UnitId, amount: AttackPower) -> DamageOutcome {
        let index = usize::try_from(id.get()).unwrap_or(usize::MAX);
        let Some(unit) = self.slots.get_mut(index).and_then(Option::as_mut) else {
            panic!("unit {id:?} is not alive and cannot take damage");
        };

        match unit.health.after_damage(amount) {
            Some(remaining) => {
                unit.health = remaining;
                DamageOutcome::Survived { remaining }
            }
            None => {
                let cell = unit.cell;
                self.slots[index] = None;
                self.occupancy.vacate(cell);
                DamageOutcome::Killed { cell }
            }
        }
    }

    pub(crate) fn occupancy<'a>(&'a self, grid: &'a GridMap) -> OccupancyView<'a> {
        OccupancyView::new(grid, &self.occupancy.cells)
    }

    fn slot_mut(&mut self, id: UnitId) -> Option<&mut Unit> {
        let index = usize::try_from(id.get()).ok()?;
        self.slots.get_mut(index).and_then(Option::as_mut)
    }
}

#[derive(Clone, Debug)]
struct OccupancyGrid {
    columns: u32,
    rows: u32,
    cells: Vec<Option<UnitId>>,
}

impl OccupancyGrid {
    fn new(columns: u32, rows: u32) -> Self {
        let capacity_u64 = u64::from(columns) * u64::from(rows);
        let capacity = usize::try_from(capacity_u64).unwrap_or(0);
        Self {
            columns,
            rows,
            cells: vec![None; capacity],
        }
    }

    fn occupant(&self, cell: CellCoord) -> Option<UnitId> {
        self.index(cell)
            .and_then(|index| self.cells.get(index).copied().flatten())
    }

    fn occupy(&mut self, unit: UnitId, cell: CellCoord) {
        let slot = self
            .index(cell)
            .and_then(|index| self.cells.get_mut(index))
            .unwrap_or_else(|| panic!("cell {cell:?} lies outside the occupancy grid"));
        *slot = Some(unit);
    }

    fn vacate(&mut self, cell: CellCoord) {
        if let Some(slot) = self.index(cell).and_then(|index| self.cells.get_mut(index)) {
            *slot = None;
        }
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if cell.column() < self.columns && cell.row() < self.rows {
            let row = usize::try_from(cell.row()).ok()?;
            let column = usize::try_from(cell.column()).ok()?;
            let width = usize::try_from(self.columns).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }
}

#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that picks a unit's next step toward the nearest enemy.
//!
//! Movement is decided in two phases. A forward search from the unit finds the
//! closest reachable candidate square, ties broken in reading order. A second
//! search from that square then ranks the unit's own neighbours, and the first
//! of them in reading order that lies on a shortest path wins.

mod field;

use beverage_bandits_core::{CellCoord, OccupancyView};

use crate::field::DistanceField;

/// Movement decision produced for a single unit turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Step {
    /// Candidate square the unit is heading for.
    pub destination: CellCoord,
    /// Adjacent cell the unit should move into this turn.
    pub next: CellCoord,
    /// Hops between the unit and `destination` before moving.
    pub distance: u32,
}

/// Shortest-path planner that reuses its search buffers between turns.
#[derive(Debug, Default)]
pub struct Pathfinder {
    forward: DistanceField,
    backward: DistanceField,
}

impl Pathfinder {
    /// Creates a new pathfinder with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Chooses the step `origin` should take toward the nearest candidate.
    ///
    /// `occupancy` must describe the live battlefield. `origin` itself is never
    /// checked for passability. Returns `None` when no candidate can be reached.
    pub fn next_step(
        &mut self,
        origin: CellCoord,
        candidates: &[CellCoord],
        occupancy: OccupancyView<'_>,
    ) -> Option<Step> {
        if candidates.is_empty() {
            return None;
        }

        let (width, height) = occupancy.grid().dimensions();
        self.forward
            .rebuild_with(width, height, &[origin], |cell| !occupancy.is_passable(cell));

        let (distance, destination) = candidates
            .iter()
            .filter_map(|&cell| self.forward.distance(cell).map(|distance| (distance, cell)))
            .min()?;
        if distance == 0 {
            return None;
        }

        self.backward
            .rebuild_with(width, height, &[destination], |cell| {
                !occupancy.is_passable(cell)
            });

        let next = origin
            .neighbors()
            .filter(|&neighbor| occupancy.is_passable(neighbor))
            .filter(|&neighbor| self.backward.distance(neighbor) == Some(distance - 1))
            .min()?;

        Some(Step {
            destination,
            next,
            distance,
        })
    }
}

/// Collects the free squares orthogonally adjacent to any of `enemy_cells`.
///
/// The output buffer is cleared first and left sorted in reading order with
/// duplicates removed.
pub fn candidate_squares(
    enemy_cells: &[CellCoord],
    occupancy: OccupancyView<'_>,
    out: &mut Vec<CellCoord>,
) {
    out.clear();
    for &enemy in enemy_cells {
        out.extend(enemy.neighbors().filter(|&cell| occupancy.is_passable(cell)));
    }
    out.sort_unstable();
    out.dedup();
}

//! Reusable breadth-first distance field.

use std::collections::VecDeque;

use beverage_bandits_core::CellCoord;

/// Dense hop-count grid produced by a breadth-first search.
///
/// Cells the search never reached hold `None`, so "unreachable" is never
/// confused with a large distance.
#[derive(Clone, Debug, Default)]
pub(crate) struct DistanceField {
    width: u32,
    height: u32,
    distances: Vec<Option<u32>>,
    queue: VecDeque<CellCoord>,
}

impl DistanceField {
    /// Rebuilds the distances outward from `sources`.
    ///
    /// Sources are seeded at distance zero even when `is_blocked` rejects them,
    /// which lets a search start from the cell a unit is standing on.
    pub(crate) fn rebuild_with<F>(
        &mut self,
        width: u32,
        height: u32,
        sources: &[CellCoord],
        mut is_blocked: F,
    ) where
        F: FnMut(CellCoord) -> bool,
    {
        let width_usize = usize::try_from(width).unwrap_or(0);
        let height_usize = usize::try_from(height).unwrap_or(0);
        let cell_count = width_usize.checked_mul(height_usize).unwrap_or(0);

        self.width = width;
        self.height = height;
        self.queue.clear();

        if self.distances.len() != cell_count {
            self.distances = vec![None; cell_count];
        } else {
            self.distances.fill(None);
        }

        if cell_count == 0 {
            return;
        }

        for &source in sources {
            let Some(index) = self.index(source) else {
                continue;
            };
            if self.distances[index].is_some() {
                continue;
            }
            self.distances[index] = Some(0);
            self.queue.push_back(source);
        }

        while let Some(cell) = self.queue.pop_front() {
            let Some(current) = self.index(cell).and_then(|index| self.distances[index]) else {
                continue;
            };
            let next_distance = current + 1;

            for neighbor in cell.neighbors() {
                let Some(neighbor_index) = self.index(neighbor) else {
                    continue;
                };
                if self.distances[neighbor_index].is_some() {
                    continue;
                }
                if is_blocked(neighbor) {
                    continue;
                }

                self.distances[neighbor_index] = Some(next_distance);
                self.queue.push_back(neighbor);
            }
        }
    }

    /// Distance captured for the provided cell, or `None` if it was not reached.
    #[must_use]
    pub(crate) fn distance(&self, cell: CellCoord) -> Option<u32> {
        self.index(cell)
            .and_then(|index| self.distances.get(index).copied().flatten())
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if cell.column() >= self.width || cell.row() >= self.height {
            return None;
        }
        let width = usize::try_from(self.width).ok()?;
        let column = usize::try_from(cell.column()).ok()?;
        let row = usize::try_from(cell.row()).ok()?;
        row.checked_mul(width)?.checked_add(column)
    }
}

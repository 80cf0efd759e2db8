//! Uniform-grid spatial hash used as the broad phase.

use std::collections::HashMap;

use crate::error::PhysicsError;
use crate::shape::Aabb;

/// A uniform grid spatial hash mapping AABBs to the cells they overlap.
///
/// Insertion keys on floor-divided cell coordinates, the same as the grid it's
/// grounded on. Queries collect all candidates across the queried cells, sort
/// them, then deduplicate adjacent-equal entries, so a body spanning several
/// cells is only reported once per query.
pub struct SpatialHash {
    cell_size: f32,
    inverse_cell_size: f32,
    cells: HashMap<(i32, i32), Vec<usize>>,
    scratch: Vec<usize>,
}

impl SpatialHash {
    /// Creates a spatial hash with the given cell size. `cell_size` must be
    /// positive.
    pub fn new(cell_size: f32) -> Result<Self, PhysicsError> {
        if cell_size <= 0.0 {
            return Err(PhysicsError::InvalidCellSize);
        }

        Ok(Self {
            cell_size,
            inverse_cell_size: 1.0 / cell_size,
            cells: HashMap::new(),
            scratch: Vec::new(),
        })
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Empties every cell's contents while retaining their allocated capacity.
    pub fn clear(&mut self) {
        for bucket in self.cells.values_mut() {
            bucket.clear();
        }
        self.scratch.clear();
    }

    /// Inserts `index` into every cell `aabb` overlaps.
    pub fn insert(&mut self, aabb: Aabb, index: usize) {
        let min_x = (aabb.x * self.inverse_cell_size).floor() as i32;
        let min_y = (aabb.y * self.inverse_cell_size).floor() as i32;
        let max_x = ((aabb.x + aabb.width) * self.inverse_cell_size).floor() as i32;
        let max_y = ((aabb.y + aabb.height) * self.inverse_cell_size).floor() as i32;

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                self.cells.entry((x, y)).or_default().push(index);
            }
        }
    }

    /// Invokes `visit` once per distinct index whose cell(s) overlap `aabb`,
    /// in ascending index order.
    pub fn query(&mut self, aabb: Aabb, mut visit: impl FnMut(usize)) {
        self.scratch.clear();

        let min_x = (aabb.x * self.inverse_cell_size).floor() as i32;
        let min_y = (aabb.y * self.inverse_cell_size).floor() as i32;
        let max_x = ((aabb.x + aabb.width) * self.inverse_cell_size).floor() as i32;
        let max_y = ((aabb.y + aabb.height) * self.inverse_cell_size).floor() as i32;

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                if let Some(bucket) = self.cells.get(&(x, y)) {
                    self.scratch.extend_from_slice(bucket);
                }
            }
        }

        self.scratch.sort_unstable();
        self.scratch.dedup();

        for &index in &self.scratch {
            visit(index);
        }
    }
}

//! Coarse placement grid: room footprints and per-cell ownership.

use serde::{Deserialize, Serialize};

use crate::error::PlacementError;
use crate::types::{GridPos, Pos, RoomId};

/// Rectangle of grid cells claimed by one room.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Footprint {
    pub origin: GridPos,
    pub width: usize,
    pub height: usize,
}

impl Footprint {
    pub fn right(self) -> i32 {
        self.origin.x + self.width as i32 - 1
    }

    pub fn bottom(self) -> i32 {
        self.origin.y + self.height as i32 - 1
    }

    pub fn contains(self, cell: GridPos) -> bool {
        cell.x >= self.origin.x
            && cell.x <= self.right()
            && cell.y >= self.origin.y
            && cell.y <= self.bottom()
    }

    pub fn intersects(self, other: &Self) -> bool {
        self.origin.x <= other.right()
            && self.right() >= other.origin.x
            && self.origin.y <= other.bottom()
            && self.bottom() >= other.origin.y
    }

    /// Cells in row-major order.
    pub fn cells(self) -> impl Iterator<Item = GridPos> {
        (self.origin.y..=self.bottom())
            .flat_map(move |y| (self.origin.x..=self.right()).map(move |x| GridPos { y, x }))
    }

    /// Global tile coordinate of the footprint's top-left tile.
    pub fn tile_offset(self, tiles_per_cell: usize) -> Pos {
        let scale = tiles_per_cell as i32;
        Pos { y: self.origin.y * scale, x: self.origin.x * scale }
    }

    pub fn tile_size(self, tiles_per_cell: usize) -> (usize, usize) {
        (self.width * tiles_per_cell, self.height * tiles_per_cell)
    }
}

/// Ownership of every grid cell. Only the placement manager mutates it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoomGrid {
    width: usize,
    height: usize,
    cells: Vec<Option<RoomId>>,
}

impl RoomGrid {
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height, cells: vec![None; width * height] }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn in_bounds(&self, cell: GridPos) -> bool {
        cell.x >= 0
            && cell.y >= 0
            && (cell.x as usize) < self.width
            && (cell.y as usize) < self.height
    }

    fn index(&self, cell: GridPos) -> usize {
        (cell.y as usize) * self.width + (cell.x as usize)
    }

    /// Owning room of `cell`; `None` for unclaimed or out-of-grid cells.
    pub fn owner(&self, cell: GridPos) -> Option<RoomId> {
        if !self.in_bounds(cell) {
            return None;
        }
        self.cells[self.index(cell)]
    }

    pub fn is_claimed(&self, cell: GridPos) -> bool {
        self.owner(cell).is_some()
    }

    /// Whether `footprint` lies inside the grid over unclaimed cells only.
    pub fn fits(&self, footprint: Footprint) -> bool {
        let inside = footprint.origin.x >= 0
            && footprint.origin.y >= 0
            && footprint.right() < self.width as i32
            && footprint.bottom() < self.height as i32;
        inside && footprint.cells().all(|cell| !self.is_claimed(cell))
    }

    pub fn claim(&mut self, footprint: Footprint, room: RoomId) -> Result<(), PlacementError> {
        if let Some(cell) = footprint.cells().find(|&cell| !self.in_bounds(cell)) {
            return Err(PlacementError::OutOfBounds { at: cell });
        }
        if let Some(cell) = footprint.cells().find(|&cell| self.is_claimed(cell)) {
            return Err(PlacementError::CellClaimed { at: cell });
        }
        for cell in footprint.cells() {
            let index = self.index(cell);
            self.cells[index] = Some(room);
        }
        Ok(())
    }

    pub fn claimed_count(&self) -> usize {
        self.cells.iter().filter(|owner| owner.is_some()).count()
    }

    /// Fraction of claimed cells.
    pub fn coverage(&self) -> f64 {
        self.claimed_count() as f64 / self.cells.len() as f64
    }

    pub fn cells(&self) -> impl Iterator<Item = GridPos> + '_ {
        (0..self.height).flat_map(move |y| {
            (0..self.width).map(move |x| GridPos { y: y as i32, x: x as i32 })
        })
    }

    pub fn unclaimed(&self) -> impl Iterator<Item = GridPos> + '_ {
        self.cells().filter(|&cell| !self.is_claimed(cell))
    }

    /// Unclaimed cells orthogonally adjacent to at least one claimed cell, row-major.
    pub fn frontier(&self) -> Vec<GridPos> {
        self.unclaimed()
            .filter(|cell| {
                cell.orthogonal_neighbors().into_iter().any(|neighbor| self.is_claimed(neighbor))
            })
            .collect()
    }
}

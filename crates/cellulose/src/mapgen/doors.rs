//! Door point detection on the edges a room shares with neighboring grid cells.

use serde::{Deserialize, Serialize};

use crate::types::{GridPos, Pos, Side};

use super::field::Field;
use super::grid::Footprint;
use super::seed::GenRng;

/// A room cell and the orthogonal neighbor cell its edge faces.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DoorSlot {
    pub from: GridPos,
    pub to: GridPos,
    pub side: Side,
}

/// Where a path may cross from `slot.from` into `slot.to`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DoorPoint {
    pub slot: DoorSlot,
    /// Tile in the owning room's field.
    pub tile: Pos,
}

impl DoorPoint {
    pub fn global_tile(&self, room_offset: Pos) -> Pos {
        self.tile.offset(room_offset.x, room_offset.y)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DoorScan {
    pub doors: Vec<DoorPoint>,
    /// Slots whose scan line never met an open tile.
    pub sealed: Vec<DoorSlot>,
}

pub(super) struct DoorContext {
    pub(super) grid_width: usize,
    pub(super) grid_height: usize,
    pub(super) tiles_per_cell: usize,
    pub(super) jitter: u32,
}

/// Every orthogonal neighbor cell outside `footprint` and inside the grid, in
/// row-major cell order and `Side::ALL` order per cell. Diagonal neighbors never get doors.
pub fn door_slots(footprint: Footprint, grid_width: usize, grid_height: usize) -> Vec<DoorSlot> {
    let in_grid = |cell: GridPos| {
        cell.x >= 0 && cell.y >= 0 && (cell.x as usize) < grid_width && (cell.y as usize) < grid_height
    };
    footprint
        .cells()
        .flat_map(|from| Side::ALL.map(|side| DoorSlot { from, to: from.step(side), side }))
        .filter(|slot| !footprint.contains(slot.to) && in_grid(slot.to))
        .collect()
}

pub(super) fn detect_doors(
    footprint: Footprint,
    field: &Field,
    context: &DoorContext,
    rng: &mut GenRng,
) -> DoorScan {
    let mut scan = DoorScan::default();
    for slot in door_slots(footprint, context.grid_width, context.grid_height) {
        match locate_door(footprint, field, slot, context, rng) {
            Some(tile) => scan.doors.push(DoorPoint { slot, tile }),
            None => scan.sealed.push(slot),
        }
    }
    scan
}

fn locate_door(
    footprint: Footprint,
    field: &Field,
    slot: DoorSlot,
    context: &DoorContext,
    rng: &mut GenRng,
) -> Option<Pos> {
    let span = context.tiles_per_cell as i32;
    let jitter = i32::try_from(context.jitter).unwrap_or(i32::MAX);
    let cell_x = slot.from.x - footprint.origin.x;
    let cell_y = slot.from.y - footprint.origin.y;

    let along = |cell: i32, rng: &mut GenRng| {
        let start = span * cell;
        let midpoint = start + span / 2;
        let shifted = midpoint.saturating_add(rng.range_inclusive(-jitter, jitter));
        shifted.clamp(start, start + span - 1)
    };

    let width = field.width() as i32;
    let height = field.height() as i32;
    match slot.side {
        Side::Top => {
            let x = along(cell_x, rng);
            let y = (0..height).find(|&y| field.is_open(Pos { y, x }))?;
            Some(Pos { y: (y - 1).max(0), x })
        }
        Side::Bottom => {
            let x = along(cell_x, rng);
            let y = (0..height).rev().find(|&y| field.is_open(Pos { y, x }))?;
            Some(Pos { y: (y + 1).min(height - 1), x })
        }
        Side::Left => {
            let y = along(cell_y, rng);
            let x = (0..width).find(|&x| field.is_open(Pos { y, x }))?;
            Some(Pos { y, x: (x - 1).max(0) })
        }
        Side::Right => {
            let y = along(cell_y, rng);
            let x = (0..width).rev().find(|&x| field.is_open(Pos { y, x }))?;
            Some(Pos { y, x: (x + 1).min(width - 1) })
        }
    }
}

//! Hallway carving between door points and room linking on the placement grid.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::{FieldError, LinkError};
use crate::types::{GridPos, Pos, RoomId, Side};

use super::field::Field;
use super::placement::MapLayout;
use super::seed::GenRng;
use super::walker::Brush;

/// A carved path in its own field, positioned at `offset` in global tiles.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HallwayPath {
    pub origin: Pos,
    pub destination: Pos,
    pub offset: Pos,
    pub field: Field,
    pub steps: u32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Hallway {
    pub from: GridPos,
    pub to: GridPos,
    pub path: HallwayPath,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LinkOutcome {
    /// Index of the new hallway.
    Linked(usize),
    /// One side had no door point toward the other; nothing was carved.
    MissingDoor { from: GridPos, to: GridPos },
}

/// Walks a taxicab path from `origin` to `destination`, picking the axis at random
/// while both still have distance left, and stamps `brush` at every cursor position
/// including the destination. Stamps are clipped to a `map_width`×`map_height` map.
pub fn carve_hallway(
    origin: Pos,
    destination: Pos,
    brush: &Brush,
    map_width: usize,
    map_height: usize,
    rng: &mut GenRng,
) -> Result<HallwayPath, FieldError> {
    let offsets = brush.offsets();
    let min_dx = offsets.iter().map(|offset| offset.dx).min().unwrap_or(0);
    let max_dx = offsets.iter().map(|offset| offset.dx).max().unwrap_or(0);
    let min_dy = offsets.iter().map(|offset| offset.dy).min().unwrap_or(0);
    let max_dy = offsets.iter().map(|offset| offset.dy).max().unwrap_or(0);

    let left = (origin.x.min(destination.x) + min_dx).max(0);
    let top = (origin.y.min(destination.y) + min_dy).max(0);
    let right = (origin.x.max(destination.x) + max_dx).min(map_width as i32 - 1);
    let bottom = (origin.y.max(destination.y) + max_dy).min(map_height as i32 - 1);
    let width = usize::try_from(right - left + 1).unwrap_or(0);
    let height = usize::try_from(bottom - top + 1).unwrap_or(0);

    let offset = Pos { y: top, x: left };
    let mut field = Field::new(width, height)?;
    let paint = |field: &mut Field, at: Pos| {
        brush.paint(field, at.offset(-offset.x, -offset.y));
    };

    let mut cursor = origin;
    let mut steps = 0_u32;
    while cursor != destination {
        paint(&mut field, cursor);
        let dx = destination.x - cursor.x;
        let dy = destination.y - cursor.y;
        let along_x = match (dx, dy) {
            (0, _) => false,
            (_, 0) => true,
            _ => rng.coin(),
        };
        cursor = if along_x {
            cursor.offset(dx.signum(), 0)
        } else {
            cursor.offset(0, dy.signum())
        };
        steps += 1;
    }
    paint(&mut field, destination);

    Ok(HallwayPath { origin, destination, offset, field, steps })
}

impl MapLayout {
    pub fn hallways(&self) -> &[Hallway] {
        &self.hallways
    }

    pub fn are_linked(&self, a: GridPos, b: GridPos) -> bool {
        self.linked.contains(&(a, b))
    }

    /// Linked cell pairs, each recorded in both directions.
    pub fn linked_cells(&self) -> impl Iterator<Item = (GridPos, GridPos)> + '_ {
        self.linked.iter().copied()
    }

    pub fn missing_doors(&self) -> &[(GridPos, GridPos)] {
        &self.missing_doors
    }

    /// Carves a hallway between the door of `from` facing `to` and the door of `to`
    /// facing `from`. A missing door leaves the pair unlinked and is recorded.
    pub fn link_rooms(
        &mut self,
        from: GridPos,
        to: GridPos,
        rng: &mut GenRng,
    ) -> Result<LinkOutcome, LinkError> {
        if Side::between(from, to).is_none() {
            return Err(LinkError::NotAdjacent { from, to });
        }
        let origin_room = self.room_in_cell(from).ok_or(LinkError::Unclaimed { at: from })?;
        let destination_room = self.room_in_cell(to).ok_or(LinkError::Unclaimed { at: to })?;
        if origin_room.id == destination_room.id {
            return Err(LinkError::SameRoom { from, to });
        }

        let tiles_per_cell = self.config.tiles_per_cell;
        let doors = origin_room.door_toward(from, to).zip(destination_room.door_toward(to, from));
        let Some((origin_door, destination_door)) = doors else {
            log::warn!("no door point between {from:?} and {to:?}; leaving them unlinked");
            self.missing_doors.push((from, to));
            return Ok(LinkOutcome::MissingDoor { from, to });
        };
        let origin = origin_door.global_tile(origin_room.tile_offset(tiles_per_cell));
        let destination =
            destination_door.global_tile(destination_room.tile_offset(tiles_per_cell));

        let path = carve_hallway(
            origin,
            destination,
            &self.config.hallway_brush,
            self.config.map_width(),
            self.config.map_height(),
            rng,
        )?;
        log::debug!(
            "hallway {from:?} -> {to:?}: {origin:?} to {destination:?} in {} steps",
            path.steps
        );

        self.hallways.push(Hallway { from, to, path });
        self.linked.insert((from, to));
        self.linked.insert((to, from));
        Ok(LinkOutcome::Linked(self.hallways.len() - 1))
    }

    /// Links every pair of rooms that share a grid edge, once per pair, through the
    /// first shared edge in row-major order.
    pub fn link_adjacent_rooms(&mut self, rng: &mut GenRng) -> Result<Vec<LinkOutcome>, LinkError> {
        let mut seen: BTreeSet<(RoomId, RoomId)> = BTreeSet::new();
        let mut edges = Vec::new();
        for cell in self.grid.cells() {
            for side in [Side::Right, Side::Bottom] {
                let neighbor = cell.step(side);
                let (Some(a), Some(b)) = (self.grid.owner(cell), self.grid.owner(neighbor)) else {
                    continue;
                };
                if a != b && seen.insert((a.min(b), a.max(b))) {
                    edges.push((cell, neighbor));
                }
            }
        }

        edges.into_iter().map(|(from, to)| self.link_rooms(from, to, rng)).collect()
    }

    /// Number of groups of rooms joined by hallways. Isolated rooms count as their own group.
    pub fn components(&self) -> usize {
        let index_of = |cell: GridPos| {
            let id = self.grid.owner(cell)?;
            self.order.iter().position(|&placed| placed == id)
        };
        let mut parent: Vec<usize> = (0..self.order.len()).collect();
        for hallway in &self.hallways {
            if let (Some(a), Some(b)) = (index_of(hallway.from), index_of(hallway.to)) {
                let root_a = find_root(&mut parent, a);
                let root_b = find_root(&mut parent, b);
                parent[root_a] = root_b;
            }
        }
        (0..parent.len()).filter(|&index| find_root(&mut parent, index) == index).count()
    }
}

fn find_root(parent: &mut [usize], mut index: usize) -> usize {
    while parent[index] != index {
        parent[index] = parent[parent[index]];
        index = parent[index];
    }
    index
}

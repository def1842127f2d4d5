//! Public data models for a generated map and its generation report.

use serde::{Deserialize, Serialize};

use crate::types::{GridPos, Pos};

use super::assembly::render_ascii;
use super::cellulose::CarveReport;
use super::doors::{DoorPoint, DoorSlot};
use super::field::Field;
use super::grid::Footprint;
use super::placement::PlacementHalt;
use super::rooms::RoomKind;
use super::seed::GenRng;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoomRecord {
    pub kind: RoomKind,
    pub footprint: Footprint,
    pub tile_offset: Pos,
    /// Door tiles in global coordinates.
    pub doors: Vec<DoorPoint>,
    pub sealed: Vec<DoorSlot>,
    pub carve: CarveReport,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HallwayRecord {
    pub from: GridPos,
    pub to: GridPos,
    pub origin: Pos,
    pub destination: Pos,
    pub steps: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissingDoor {
    pub from: GridPos,
    pub to: GridPos,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GenerationReport {
    pub halt: PlacementHalt,
    pub coverage: f64,
    pub failed_placements: Vec<GridPos>,
    /// Rooms whose carve stopped at the tick bound short of the target openness.
    pub shortfalls: Vec<GridPos>,
    pub missing_doors: Vec<MissingDoor>,
    /// Groups of rooms joined by hallways; 1 means every room is reachable.
    pub components: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeneratedMap {
    pub seed: u64,
    pub tiles_per_cell: usize,
    pub grid_width: usize,
    pub grid_height: usize,
    pub field: Field,
    /// Same extents as `field`; an open tile here marks a wall.
    pub walls: Field,
    pub rooms: Vec<RoomRecord>,
    pub hallways: Vec<HallwayRecord>,
    /// Linked cell pairs, recorded in both directions.
    pub linked_cells: Vec<(GridPos, GridPos)>,
    pub report: GenerationReport,
}

impl GeneratedMap {
    pub fn width(&self) -> usize {
        self.field.width()
    }

    pub fn height(&self) -> usize {
        self.field.height()
    }

    pub fn canonical_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend(self.seed.to_le_bytes());
        bytes.extend((self.tiles_per_cell as u32).to_le_bytes());
        bytes.extend((self.grid_width as u32).to_le_bytes());
        bytes.extend((self.grid_height as u32).to_le_bytes());
        bytes.extend(self.field.canonical_bytes());
        bytes.extend(self.walls.canonical_bytes());

        bytes.extend((self.rooms.len() as u32).to_le_bytes());
        for room in &self.rooms {
            bytes.push(match room.kind {
                RoomKind::Small => 0,
                RoomKind::Medium => 1,
                RoomKind::Large => 2,
            });
            bytes.extend(room.footprint.origin.y.to_le_bytes());
            bytes.extend(room.footprint.origin.x.to_le_bytes());
            bytes.extend((room.doors.len() as u32).to_le_bytes());
            for door in &room.doors {
                bytes.extend(door.tile.y.to_le_bytes());
                bytes.extend(door.tile.x.to_le_bytes());
            }
        }

        bytes.extend((self.hallways.len() as u32).to_le_bytes());
        for hallway in &self.hallways {
            bytes.extend(hallway.origin.y.to_le_bytes());
            bytes.extend(hallway.origin.x.to_le_bytes());
            bytes.extend(hallway.destination.y.to_le_bytes());
            bytes.extend(hallway.destination.x.to_le_bytes());
        }
        bytes
    }

    pub fn room_in_cell(&self, cell: GridPos) -> Option<&RoomRecord> {
        self.rooms.iter().find(|room| room.footprint.contains(cell))
    }

    pub fn are_linked(&self, a: GridPos, b: GridPos) -> bool {
        self.linked_cells.contains(&(a, b))
    }

    /// Every open tile, row-major.
    pub fn spawn_candidates(&self) -> Vec<Pos> {
        self.field.open_positions().collect()
    }

    /// Uniform pick among open tiles; `None` on a map with no open tile.
    pub fn pick_spawn(&self, rng: &mut GenRng) -> Option<Pos> {
        let candidates = self.spawn_candidates();
        rng.choose(&candidates).copied()
    }

    pub fn wall_tiles(&self) -> Vec<Pos> {
        self.walls.open_positions().collect()
    }

    pub fn render_ascii(&self) -> String {
        render_ascii(&self.field, &self.walls)
    }
}

//! Procedural map generation split into coherent submodules, leaf-first:
//! field, walkers, room carving, smoothing, placement, doors, hallways, assembly.

pub mod model;

mod assembly;
mod cave;
mod cellulose;
mod doors;
mod field;
mod generator;
mod grid;
mod hallway;
mod placement;
mod rooms;
mod seed;
mod smoothing;
mod walker;

pub use assembly::{OPEN_GLYPH, VOID_GLYPH, WALL_GLYPH, derive_walls, render_ascii};
pub use cave::{Cave, generate_cave};
pub use cellulose::{CarveReport, RoomCellulose};
pub use doors::{DoorPoint, DoorScan, DoorSlot, door_slots};
pub use field::Field;
pub use generator::MapGenerator;
pub use grid::{Footprint, RoomGrid};
pub use hallway::{Hallway, HallwayPath, LinkOutcome, carve_hallway};
pub use model::{GeneratedMap, GenerationReport, HallwayRecord, MissingDoor, RoomRecord};
pub use placement::{MapLayout, PlacedRoom, PlacementHalt, PlacementReport};
pub use rooms::RoomKind;
pub use seed::GenRng;
pub use smoothing::{NeighborCounts, SmoothingRule, smooth, smooth_passes};
pub use walker::{Brush, MovePolicy, Walker, WalkerProfile};

use crate::config::MapConfig;
use crate::error::GenerationError;

pub fn generate_map(config: MapConfig, seed: u64) -> Result<GeneratedMap, GenerationError> {
    MapGenerator::new(config, seed)?.generate()
}

//! Procedural dungeon topology: walker-carved rooms on a coarse grid, joined by
//! hallways, with a derived wall layer for the game layer to instantiate.

pub mod config;
pub mod error;
pub mod mapgen;
pub mod types;

pub use config::{MapConfig, RoomCandidate, RoomProfile};
pub use error::{ConfigError, FieldError, GenerationError, LinkError, PlacementError};
pub use mapgen::{
    Brush, CarveReport, Cave, Field, GenRng, GeneratedMap, GenerationReport, MapGenerator,
    MapLayout, MovePolicy, NeighborCounts, PlacementHalt, RoomKind, SmoothingRule, WalkerProfile,
    generate_cave, generate_map,
};
pub use types::*;

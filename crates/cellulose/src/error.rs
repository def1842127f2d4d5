//! Error taxonomy for configuration, field access, placement and linking.
//!
//! Recoverable pipeline conditions (placement exhaustion, convergence shortfall,
//! missing door points) are not errors; they are reported in
//! [`crate::mapgen::GenerationReport`].

use std::io;

use thiserror::Error;
use toml::{de, ser};

use crate::mapgen::RoomKind;
use crate::types::{GridPos, Pos};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    #[error("field dimensions must be non-zero, got {width}x{height}")]
    ZeroSized { width: usize, height: usize },

    #[error("tile {pos:?} is outside a {width}x{height} field")]
    OutOfBounds { pos: Pos, width: usize, height: usize },

    #[error("stamping a {src_width}x{src_height} field at {offset:?} overhangs a {width}x{height} field")]
    StampOverhang { offset: Pos, src_width: usize, src_height: usize, width: usize, height: usize },

    #[error("ascii row {row} has width {found}, expected {expected}")]
    RaggedRows { row: usize, expected: usize, found: usize },

    #[error("unrecognised glyph {glyph:?} in ascii field")]
    UnknownGlyph { glyph: char },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{name} must be non-zero")]
    Zero { name: &'static str },

    #[error("{name} must lie in [0, 1], got {value}")]
    OutOfUnitRange { name: &'static str, value: f64 },

    #[error("{name} must be finite and non-negative, got {value}")]
    NegativeWeight { name: &'static str, value: f64 },

    #[error("room candidate list is empty")]
    NoCandidates,

    #[error("room candidate weights sum to zero")]
    ZeroTotalWeight,

    #[error("brush has no offsets")]
    EmptyBrush,

    #[error("brush offset ({dx}, {dy}) reaches more than {limit} tiles")]
    BrushTooWide { dx: i32, dy: i32, limit: u32 },

    #[error("door_jitter {jitter} must be smaller than tiles_per_cell {tiles_per_cell}")]
    JitterExceedsCell { jitter: u32, tiles_per_cell: usize },

    #[error("neighbor count {0} is outside 0..=8")]
    NeighborCountOutOfRange(u8),

    #[error("{kind:?} room footprint {width}x{height} does not fit a {grid_width}x{grid_height} grid")]
    FootprintExceedsGrid {
        kind: RoomKind,
        width: usize,
        height: usize,
        grid_width: usize,
        grid_height: usize,
    },

    #[error("tiles_per_cell must be at least {minimum}, got {found}")]
    CellTooSmall { minimum: usize, found: usize },

    #[error("field {width}x{height} is too small to carve; both sides need at least 2 tiles")]
    FieldTooSmall { width: usize, height: usize },

    #[error(transparent)]
    Field(#[from] FieldError),

    #[error("failed to read config: {0}")]
    Io(#[from] io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] de::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] ser::Error),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlacementError {
    #[error("grid cell {at:?} is outside the placement grid")]
    OutOfBounds { at: GridPos },

    #[error("grid cell {at:?} is already claimed")]
    CellClaimed { at: GridPos },

    #[error("no room candidate fits at {at:?} after {attempts} attempts")]
    NoCandidateFits { at: GridPos, attempts: u32 },

    #[error("room field {width}x{height} at {at:?} is too small to carve")]
    FieldTooSmall { at: GridPos, width: usize, height: usize },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LinkError {
    #[error("grid cells {from:?} and {to:?} are not orthogonal neighbors")]
    NotAdjacent { from: GridPos, to: GridPos },

    #[error("grid cell {at:?} is not claimed by any room")]
    Unclaimed { at: GridPos },

    #[error("grid cells {from:?} and {to:?} belong to the same room")]
    SameRoom { from: GridPos, to: GridPos },

    #[error("hallway could not be carved: {0}")]
    Carve(#[from] FieldError),
}

#[derive(Error, Debug)]
pub enum GenerationError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Field(#[from] FieldError),

    #[error(transparent)]
    Link(#[from] LinkError),
}

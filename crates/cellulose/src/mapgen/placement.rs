//! Grid placement manager: claims footprints, carves each room and records its doors.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use slotmap::SlotMap;

use crate::config::{MapConfig, RoomProfile};
use crate::error::{ConfigError, PlacementError};
use crate::types::{GridPos, Pos, RoomId};

use super::cellulose::{CarveReport, RoomCellulose};
use super::doors::{DoorContext, DoorPoint, DoorSlot, detect_doors};
use super::field::Field;
use super::grid::{Footprint, RoomGrid};
use super::hallway::Hallway;
use super::rooms::{RoomKind, choose_candidate};
use super::seed::GenRng;

/// Side length of the block the first room is dropped into.
const FIRST_ROOM_BLOCK: usize = 2;

#[derive(Clone, Debug, PartialEq)]
pub struct PlacedRoom {
    pub id: RoomId,
    pub kind: RoomKind,
    pub footprint: Footprint,
    pub field: Field,
    pub carve: CarveReport,
    pub doors: Vec<DoorPoint>,
    pub sealed: Vec<DoorSlot>,
}

impl PlacedRoom {
    pub fn tile_offset(&self, tiles_per_cell: usize) -> Pos {
        self.footprint.tile_offset(tiles_per_cell)
    }

    /// Door on the edge of `from` facing `to`.
    pub fn door_toward(&self, from: GridPos, to: GridPos) -> Option<&DoorPoint> {
        self.doors.iter().find(|door| door.slot.from == from && door.slot.to == to)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlacementHalt {
    CoverageReached,
    TooManyFailures,
    NoFrontier,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PlacementReport {
    pub halt: PlacementHalt,
    pub placed: usize,
    pub failures: Vec<PlacementError>,
    pub coverage: f64,
}

/// Rooms, hallways and grid ownership for one map under construction.
pub struct MapLayout {
    pub(super) config: MapConfig,
    profiles: Vec<RoomProfile>,
    pub(super) grid: RoomGrid,
    pub(super) rooms: SlotMap<RoomId, PlacedRoom>,
    pub(super) order: Vec<RoomId>,
    pub(super) hallways: Vec<Hallway>,
    pub(super) linked: BTreeSet<(GridPos, GridPos)>,
    pub(super) missing_doors: Vec<(GridPos, GridPos)>,
}

impl MapLayout {
    pub fn new(config: MapConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let profiles =
            config.candidates.iter().map(|candidate| candidate.resolved_profile()).collect();
        let grid = RoomGrid::new(config.grid_width, config.grid_height);
        Ok(Self {
            config,
            profiles,
            grid,
            rooms: SlotMap::with_key(),
            order: Vec::new(),
            hallways: Vec::new(),
            linked: BTreeSet::new(),
            missing_doors: Vec::new(),
        })
    }

    pub fn config(&self) -> &MapConfig {
        &self.config
    }

    pub fn grid(&self) -> &RoomGrid {
        &self.grid
    }

    pub fn room(&self, id: RoomId) -> Option<&PlacedRoom> {
        self.rooms.get(id)
    }

    /// Rooms in placement order.
    pub fn rooms(&self) -> impl Iterator<Item = &PlacedRoom> + '_ {
        self.order.iter().filter_map(|&id| self.rooms.get(id))
    }

    pub fn room_count(&self) -> usize {
        self.order.len()
    }

    pub fn room_in_cell(&self, cell: GridPos) -> Option<&PlacedRoom> {
        self.grid.owner(cell).and_then(|id| self.rooms.get(id))
    }

    /// Draws candidates until one fits at `at`, carves it, claims its footprint and
    /// detects its doors.
    pub fn place_room(&mut self, at: GridPos, rng: &mut GenRng) -> Result<RoomId, PlacementError> {
        if !self.grid.in_bounds(at) {
            return Err(PlacementError::OutOfBounds { at });
        }
        if self.grid.is_claimed(at) {
            return Err(PlacementError::CellClaimed { at });
        }

        let attempts = self.config.placement_retries;
        let chosen = (0..attempts).find_map(|_| {
            let index = choose_candidate(&self.config.candidates, rng)?;
            let footprint = self.config.candidates[index].kind.footprint_at(at);
            self.grid.fits(footprint).then_some((index, footprint))
        });
        let Some((index, footprint)) = chosen else {
            return Err(PlacementError::NoCandidateFits { at, attempts });
        };

        let kind = self.config.candidates[index].kind;
        let profile = &self.profiles[index];
        let (width, height) = footprint.tile_size(self.config.tiles_per_cell);
        let mut room_rng = rng.fork(self.order.len() as u64);
        let carver = RoomCellulose::new(width, height, profile)
            .map_err(|_| PlacementError::FieldTooSmall { at, width, height })?;
        let (field, carve) = carver.run(&mut room_rng);

        let doors = detect_doors(
            footprint,
            &field,
            &DoorContext {
                grid_width: self.config.grid_width,
                grid_height: self.config.grid_height,
                tiles_per_cell: self.config.tiles_per_cell,
                jitter: self.config.door_jitter,
            },
            &mut room_rng,
        );

        if !carve.converged {
            log::warn!(
                "{kind:?} room at {at:?} stopped at openness {:.3} of {:.3} after {} ticks",
                carve.openness,
                carve.target,
                carve.ticks
            );
        }

        let id = self.rooms.insert_with_key(|id| PlacedRoom {
            id,
            kind,
            footprint,
            field,
            carve,
            doors: doors.doors,
            sealed: doors.sealed,
        });
        if let Err(err) = self.grid.claim(footprint, id) {
            self.rooms.remove(id);
            return Err(err);
        }
        self.order.push(id);

        log::debug!(
            "placed {kind:?} room at {at:?}: {} ticks, openness {:.3}, peak walkers {}",
            carve.ticks,
            carve.openness,
            carve.peak_walkers
        );
        Ok(id)
    }

    /// Grows the map from a random cell in the top-left block outward through the
    /// frontier of cells bordering claimed ones, until the coverage target or the
    /// failure bound stops it.
    pub fn generate_map(&mut self, rng: &mut GenRng) -> PlacementReport {
        let mut failures = Vec::new();
        let mut consecutive_failures = 0_u32;
        let halt = loop {
            if self.grid.coverage() >= self.config.target_coverage {
                break PlacementHalt::CoverageReached;
            }
            if consecutive_failures >= self.config.max_consecutive_failures {
                log::warn!(
                    "placement halted after {consecutive_failures} consecutive failures at coverage {:.3}",
                    self.grid.coverage()
                );
                break PlacementHalt::TooManyFailures;
            }

            let candidates = self.placement_candidates();
            let Some(&at) = rng.choose(&candidates) else {
                break PlacementHalt::NoFrontier;
            };
            match self.place_room(at, rng) {
                Ok(_) => consecutive_failures = 0,
                Err(err) => {
                    log::debug!("placement at {at:?} failed: {err}");
                    consecutive_failures += 1;
                    failures.push(err);
                }
            }
        };

        PlacementReport { halt, placed: self.order.len(), failures, coverage: self.grid.coverage() }
    }

    fn placement_candidates(&self) -> Vec<GridPos> {
        if self.grid.claimed_count() > 0 {
            return self.grid.frontier();
        }
        let block_width = FIRST_ROOM_BLOCK.min(self.grid.width());
        let block_height = FIRST_ROOM_BLOCK.min(self.grid.height());
        (0..block_height)
            .flat_map(|y| (0..block_width).map(move |x| GridPos { y: y as i32, x: x as i32 }))
            .collect()
    }
}

//! High-level map generation orchestration: placement, linking, assembly and walls.

use crate::config::MapConfig;
use crate::error::{ConfigError, GenerationError, PlacementError};
use crate::types::GridPos;

use super::assembly::derive_walls;
use super::model::{GeneratedMap, GenerationReport, HallwayRecord, MissingDoor, RoomRecord};
use super::placement::MapLayout;
use super::seed::GenRng;

pub struct MapGenerator {
    config: MapConfig,
    seed: u64,
}

impl MapGenerator {
    pub fn new(config: MapConfig, seed: u64) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config, seed })
    }

    pub fn config(&self) -> &MapConfig {
        &self.config
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Builds the placed-room layout without assembling it; useful for callers that
    /// want to link rooms themselves.
    pub fn layout(&self) -> Result<(MapLayout, GenRng), ConfigError> {
        Ok((MapLayout::new(self.config.clone())?, GenRng::new(self.seed)))
    }

    pub fn generate(&self) -> Result<GeneratedMap, GenerationError> {
        let (mut layout, mut rng) = self.layout()?;
        let placement = layout.generate_map(&mut rng);
        if self.config.link_adjacent_rooms {
            layout.link_adjacent_rooms(&mut rng)?;
        }

        let field = layout.assemble()?;
        let walls = derive_walls(&field);
        let tiles_per_cell = self.config.tiles_per_cell;

        let rooms: Vec<RoomRecord> = layout
            .rooms()
            .map(|room| {
                let tile_offset = room.tile_offset(tiles_per_cell);
                let doors = room
                    .doors
                    .iter()
                    .map(|door| {
                        let mut global = *door;
                        global.tile = door.global_tile(tile_offset);
                        global
                    })
                    .collect();
                RoomRecord {
                    kind: room.kind,
                    footprint: room.footprint,
                    tile_offset,
                    doors,
                    sealed: room.sealed.clone(),
                    carve: room.carve,
                }
            })
            .collect();
        let hallways = layout
            .hallways()
            .iter()
            .map(|hallway| HallwayRecord {
                from: hallway.from,
                to: hallway.to,
                origin: hallway.path.origin,
                destination: hallway.path.destination,
                steps: hallway.path.steps,
            })
            .collect();

        let report = GenerationReport {
            halt: placement.halt,
            coverage: placement.coverage,
            failed_placements: placement.failures.iter().filter_map(failed_cell).collect(),
            shortfalls: layout
                .rooms()
                .filter(|room| !room.carve.converged)
                .map(|room| room.footprint.origin)
                .collect(),
            missing_doors: layout
                .missing_doors()
                .iter()
                .map(|&(from, to)| MissingDoor { from, to })
                .collect(),
            components: layout.components(),
        };

        log::info!(
            "generated {}x{} map from seed {}: {} rooms, {} hallways, coverage {:.2}, {} components",
            field.width(),
            field.height(),
            self.seed,
            rooms.len(),
            layout.hallways().len(),
            report.coverage,
            report.components
        );

        Ok(GeneratedMap {
            seed: self.seed,
            tiles_per_cell,
            grid_width: self.config.grid_width,
            grid_height: self.config.grid_height,
            field,
            walls,
            rooms,
            hallways,
            linked_cells: layout.linked_cells().collect(),
            report,
        })
    }
}

fn failed_cell(error: &PlacementError) -> Option<GridPos> {
    match *error {
        PlacementError::OutOfBounds { at }
        | PlacementError::CellClaimed { at }
        | PlacementError::NoCandidateFits { at, .. }
        | PlacementError::FieldTooSmall { at, .. } => Some(at),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use proptest::prelude::*;
    use xxhash_rust::xxh3::xxh3_64;

    use super::*;
    use crate::config::RoomCandidate;
    use crate::mapgen::rooms::RoomKind;

    fn compact_config() -> MapConfig {
        MapConfig { grid_width: 4, grid_height: 3, tiles_per_cell: 10, ..MapConfig::default() }
    }

    fn generate(config: MapConfig, seed: u64) -> GeneratedMap {
        MapGenerator::new(config, seed).expect("valid config").generate().expect("map")
    }

    #[test]
    fn same_seed_produces_identical_maps() {
        let first = generate(compact_config(), 42);
        let second = generate(compact_config(), 42);
        assert_eq!(xxh3_64(&first.canonical_bytes()), xxh3_64(&second.canonical_bytes()));
        assert_eq!(first, second);
    }

    #[test]
    fn different_seeds_produce_different_maps() {
        let fingerprints: BTreeSet<u64> = (0..4_u64)
            .map(|seed| xxh3_64(&generate(compact_config(), seed).canonical_bytes()))
            .collect();
        assert!(fingerprints.len() > 1);
    }

    #[test]
    fn invalid_config_is_rejected_at_construction() {
        let config = MapConfig { tiles_per_cell: 0, ..compact_config() };
        assert!(matches!(
            MapGenerator::new(config, 1),
            Err(ConfigError::CellTooSmall { found: 0, .. })
        ));
    }

    #[test]
    fn map_exposes_spawn_walls_and_lookups() {
        let map = generate(compact_config(), 7);
        assert_eq!((map.width(), map.height()), (40, 30));
        assert!(!map.rooms.is_empty());

        let spawns = map.spawn_candidates();
        assert_eq!(spawns.len(), map.field.open_count());
        let spawn = map.pick_spawn(&mut GenRng::new(3)).expect("open tile");
        assert!(map.field.is_open(spawn));

        for wall in map.wall_tiles() {
            assert!(!map.field.is_open(wall));
        }

        let first = &map.rooms[0];
        assert_eq!(map.room_in_cell(first.footprint.origin), Some(first));
        for hallway in &map.hallways {
            assert!(map.are_linked(hallway.from, hallway.to));
            assert!(map.are_linked(hallway.to, hallway.from));
            assert!(map.field.is_open(hallway.origin));
            assert!(map.field.is_open(hallway.destination));
        }
        for room in &map.rooms {
            let (width, height) = room.footprint.tile_size(10);
            for door in &room.doors {
                let local_x = door.tile.x - room.tile_offset.x;
                let local_y = door.tile.y - room.tile_offset.y;
                assert!((0..width as i32).contains(&local_x), "{door:?}");
                assert!((0..height as i32).contains(&local_y), "{door:?}");
            }
        }
    }

    #[test]
    fn ascii_render_has_one_line_per_row() {
        let map = generate(compact_config(), 9);
        let rendered = map.render_ascii();
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), map.height());
        assert!(lines.iter().all(|line| line.chars().count() == map.width()));
        assert_eq!(rendered.matches('#').count(), map.walls.open_count());
    }

    #[test]
    fn linked_map_of_small_rooms_is_mostly_connected() {
        let config = MapConfig {
            grid_width: 3,
            grid_height: 3,
            tiles_per_cell: 10,
            target_coverage: 1.0,
            candidates: vec![RoomCandidate::new(RoomKind::Small)],
            ..MapConfig::default()
        };
        let map = generate(config, 11);
        assert_eq!(map.rooms.len(), 9);
        assert_eq!(map.hallways.len() + map.report.missing_doors.len(), 12);
        assert!(map.report.components >= 1);
        assert!(map.report.components <= 9);
        assert!(map.room_in_cell(GridPos { y: 2, x: 2 }).is_some());
    }

    #[test]
    fn map_round_trips_through_json() {
        let map = generate(compact_config(), 5);
        let json = serde_json::to_string(&map).expect("serialize");
        let decoded: GeneratedMap = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(decoded.canonical_bytes(), map.canonical_bytes());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(8))]

        #[test]
        fn generated_walls_border_open_tiles_only(seed in any::<u64>()) {
            let map = generate(compact_config(), seed);
            for pos in map.walls.open_positions() {
                prop_assert!(!map.field.is_open(pos));
                prop_assert!(map.field.open_neighbors(pos) > 0);
            }
            for pos in map.field.positions() {
                if !map.field.is_open(pos) && map.field.open_neighbors(pos) == 0 {
                    prop_assert!(!map.walls.is_open(pos));
                }
            }
        }
    }
}

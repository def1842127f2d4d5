//! Generator configuration: map shape, room candidates and per-room carving profiles.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::mapgen::{Brush, RoomKind, SmoothingRule, WalkerProfile};

/// Smallest cell span that still leaves room for a door scan and a 2×2 brush.
pub const MIN_TILES_PER_CELL: usize = 4;

pub(crate) fn check_probability(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if !(0.0..=1.0).contains(&value) {
        return Err(ConfigError::OutOfUnitRange { name, value });
    }
    Ok(())
}

pub(crate) fn check_weight(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if !value.is_finite() || value < 0.0 {
        return Err(ConfigError::NegativeWeight { name, value });
    }
    Ok(())
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoomProfile {
    pub target_fullness: f64,
    pub spawn_chance: f64,
    pub death_chance: f64,
    pub max_ticks: u32,
    pub walker: WalkerProfile,
    pub smoothing: SmoothingRule,
}

impl RoomProfile {
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_probability("target_fullness", self.target_fullness)?;
        check_probability("spawn_chance", self.spawn_chance)?;
        check_probability("death_chance", self.death_chance)?;
        if self.max_ticks == 0 {
            return Err(ConfigError::Zero { name: "max_ticks" });
        }
        self.walker.validate()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoomCandidate {
    pub kind: RoomKind,
    pub weight: f64,
    /// Replaces the kind's default profile when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<RoomProfile>,
}

impl RoomCandidate {
    pub fn new(kind: RoomKind) -> Self {
        Self { kind, weight: kind.default_weight(), profile: None }
    }

    pub fn resolved_profile(&self) -> RoomProfile {
        self.profile.clone().unwrap_or_else(|| self.kind.default_profile())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    pub grid_width: usize,
    pub grid_height: usize,
    pub tiles_per_cell: usize,
    /// Placement stops once this fraction of grid cells is claimed.
    pub target_coverage: f64,
    /// Candidate draws per `place_room` call.
    pub placement_retries: u32,
    /// Consecutive failed placements before the map is left partial.
    pub max_consecutive_failures: u32,
    /// Door points wander up to this many tiles either side of the cell midpoint.
    pub door_jitter: u32,
    pub link_adjacent_rooms: bool,
    pub hallway_brush: Brush,
    pub candidates: Vec<RoomCandidate>,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            grid_width: 7,
            grid_height: 5,
            tiles_per_cell: 15,
            target_coverage: 0.6,
            placement_retries: 10,
            max_consecutive_failures: 10,
            door_jitter: 2,
            link_adjacent_rooms: true,
            hallway_brush: Brush::square(2),
            candidates: RoomKind::ALL.into_iter().map(RoomCandidate::new).collect(),
        }
    }
}

impl MapConfig {
    pub fn map_width(&self) -> usize {
        self.grid_width * self.tiles_per_cell
    }

    pub fn map_height(&self) -> usize {
        self.grid_height * self.tiles_per_cell
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grid_width == 0 {
            return Err(ConfigError::Zero { name: "grid_width" });
        }
        if self.grid_height == 0 {
            return Err(ConfigError::Zero { name: "grid_height" });
        }
        if self.tiles_per_cell < MIN_TILES_PER_CELL {
            return Err(ConfigError::CellTooSmall {
                minimum: MIN_TILES_PER_CELL,
                found: self.tiles_per_cell,
            });
        }
        if self.door_jitter as usize >= self.tiles_per_cell {
            return Err(ConfigError::JitterExceedsCell {
                jitter: self.door_jitter,
                tiles_per_cell: self.tiles_per_cell,
            });
        }
        check_probability("target_coverage", self.target_coverage)?;
        if self.placement_retries == 0 {
            return Err(ConfigError::Zero { name: "placement_retries" });
        }
        if self.max_consecutive_failures == 0 {
            return Err(ConfigError::Zero { name: "max_consecutive_failures" });
        }
        self.hallway_brush.validate()?;

        if self.candidates.is_empty() {
            return Err(ConfigError::NoCandidates);
        }
        let mut total_weight = 0.0;
        for candidate in &self.candidates {
            check_weight("candidate.weight", candidate.weight)?;
            total_weight += candidate.weight;
            if candidate.weight > 0.0 {
                let (width, height) = candidate.kind.cells();
                if width > self.grid_width || height > self.grid_height {
                    return Err(ConfigError::FootprintExceedsGrid {
                        kind: candidate.kind,
                        width,
                        height,
                        grid_width: self.grid_width,
                        grid_height: self.grid_height,
                    });
                }
            }
            if let Some(profile) = &candidate.profile {
                profile.validate()?;
            }
        }
        if total_weight <= 0.0 {
            return Err(ConfigError::ZeroTotalWeight);
        }
        Ok(())
    }

    /// Parses and validates a TOML document. Missing keys take their defaults.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn write_atomic(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let tmp_path = path.with_extension("toml.tmp");
        fs::write(&tmp_path, self.to_toml_string()?)?;
        fs::rename(&tmp_path, path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;
    use crate::error::GenerationError;
    use crate::mapgen::{MovePolicy, NeighborCounts};

    #[test]
    fn default_config_is_valid_and_spans_the_grid_in_tiles() {
        let config = MapConfig::default();
        config.validate().expect("default config is valid");
        assert_eq!(config.map_width(), 105);
        assert_eq!(config.map_height(), 75);
        let weights: Vec<f64> = config.candidates.iter().map(|c| c.weight).collect();
        assert_eq!(weights, vec![0.15, 0.45, 0.40]);
    }

    #[test]
    fn validation_rejects_bad_values() {
        let zero_grid = MapConfig { grid_width: 0, ..MapConfig::default() };
        assert!(matches!(zero_grid.validate(), Err(ConfigError::Zero { name: "grid_width" })));

        let tiny_cells = MapConfig { tiles_per_cell: 2, ..MapConfig::default() };
        assert!(matches!(tiny_cells.validate(), Err(ConfigError::CellTooSmall { found: 2, .. })));

        let no_candidates = MapConfig { candidates: Vec::new(), ..MapConfig::default() };
        assert!(matches!(no_candidates.validate(), Err(ConfigError::NoCandidates)));

        let zero_weights = MapConfig {
            candidates: vec![RoomCandidate { weight: 0.0, ..RoomCandidate::new(RoomKind::Small) }],
            ..MapConfig::default()
        };
        assert!(matches!(zero_weights.validate(), Err(ConfigError::ZeroTotalWeight)));

        let oversized = MapConfig { grid_width: 2, ..MapConfig::default() };
        assert!(matches!(
            oversized.validate(),
            Err(ConfigError::FootprintExceedsGrid { kind: RoomKind::Large, .. })
        ));

        let coverage = MapConfig { target_coverage: 1.5, ..MapConfig::default() };
        assert!(matches!(coverage.validate(), Err(ConfigError::OutOfUnitRange { .. })));
    }

    #[test]
    fn door_jitter_must_stay_inside_a_cell() {
        let widest = MapConfig { tiles_per_cell: 15, door_jitter: 14, ..MapConfig::default() };
        widest.validate().expect("jitter below the cell span");

        let full_cell = MapConfig { door_jitter: 15, ..widest.clone() };
        assert!(matches!(
            full_cell.validate(),
            Err(ConfigError::JitterExceedsCell { jitter: 15, tiles_per_cell: 15 })
        ));

        let huge = MapConfig { door_jitter: u32::MAX, ..MapConfig::default() };
        assert!(matches!(huge.validate(), Err(ConfigError::JitterExceedsCell { .. })));
        assert!(matches!(
            crate::generate_map(huge, 1),
            Err(GenerationError::Config(ConfigError::JitterExceedsCell { .. }))
        ));
    }

    #[test]
    fn hallway_brush_offsets_are_bounded_when_loading() {
        let err = MapConfig::from_toml_str("hallway_brush = [{ dx = 2147483647, dy = 0 }]")
            .unwrap_err();
        assert!(matches!(err, ConfigError::BrushTooWide { dx: i32::MAX, dy: 0, .. }));

        let config =
            MapConfig::from_toml_str("hallway_brush = [{ dx = 0, dy = 0 }, { dx = 1, dy = 1 }]")
                .expect("small brush");
        assert_eq!(config.hallway_brush.offsets().len(), 2);
    }

    #[test]
    fn invalid_profile_override_is_rejected() {
        let mut profile = RoomKind::Small.default_profile();
        profile.death_chance = -0.1;
        let config = MapConfig {
            candidates: vec![RoomCandidate {
                kind: RoomKind::Small,
                weight: 1.0,
                profile: Some(profile),
            }],
            ..MapConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::OutOfUnitRange { name: "death_chance", .. })
        ));
    }

    #[test]
    fn toml_overrides_merge_with_defaults() {
        let config = MapConfig::from_toml_str(
            r#"
grid_width = 4
grid_height = 3
tiles_per_cell = 12

[[candidates]]
kind = "small"
weight = 1.0

[candidates.profile]
target_fullness = 0.5
spawn_chance = 0.1
death_chance = 0.01
max_ticks = 400

[candidates.profile.walker]
stickiness = 0.3
policy = { kind = "center_biased", toward = 0.7, away = 0.2 }
brush = [{ dx = 0, dy = 0 }, { dx = 1, dy = 0 }]

[candidates.profile.smoothing]
survive = [4, 5, 6, 7, 8]
born = [5, 6, 7, 8]
passes = 2

[[candidates]]
kind = "medium"
weight = 0.5
"#,
        )
        .expect("valid config");

        assert_eq!(config.grid_width, 4);
        assert_eq!(config.placement_retries, 10);
        assert_eq!(config.candidates.len(), 2);

        let profile = config.candidates[0].resolved_profile();
        assert_eq!(profile.max_ticks, 400);
        assert_eq!(profile.walker.policy, MovePolicy::CenterBiased { toward: 0.7, away: 0.2 });
        assert_eq!(profile.walker.brush.offsets().len(), 2);
        assert_eq!(profile.smoothing.passes, 2);
        assert_eq!(profile.smoothing.born, NeighborCounts::range(5, 8).expect("valid range"));

        assert_eq!(config.candidates[1].resolved_profile(), RoomKind::Medium.default_profile());
    }

    #[test]
    fn toml_parse_errors_surface_as_config_errors() {
        let err = MapConfig::from_toml_str("grid_width = \"wide\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
        let err = MapConfig::from_toml_str("tiles_per_cell = 1").unwrap_err();
        assert!(matches!(err, ConfigError::CellTooSmall { .. }));
    }

    #[test]
    fn config_atomic_write_and_load() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("mapgen.toml");
        let config = MapConfig { grid_width: 9, door_jitter: 1, ..MapConfig::default() };

        config.write_atomic(&path).expect("write");
        let loaded = MapConfig::load(&path).expect("load");
        assert_eq!(config, loaded);
        assert!(!path.with_extension("toml.tmp").exists());
    }

    #[test]
    fn loading_a_missing_file_is_an_io_error() {
        let dir = tempdir().expect("tempdir");
        let err = MapConfig::load(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}

//! Whole-map cave: one walker population carves a single map-sized field, with no
//! room grid, doors or hallways.

use serde::{Deserialize, Serialize};

use crate::config::RoomProfile;
use crate::error::ConfigError;
use crate::types::Pos;

use super::assembly::{derive_walls, render_ascii};
use super::cellulose::{CarveReport, RoomCellulose};
use super::field::Field;
use super::seed::GenRng;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Cave {
    pub seed: u64,
    pub field: Field,
    pub walls: Field,
    pub carve: CarveReport,
}

impl Cave {
    pub fn spawn_candidates(&self) -> Vec<Pos> {
        self.field.open_positions().collect()
    }

    pub fn pick_spawn(&self, rng: &mut GenRng) -> Option<Pos> {
        let candidates = self.spawn_candidates();
        rng.choose(&candidates).copied()
    }

    pub fn render_ascii(&self) -> String {
        render_ascii(&self.field, &self.walls)
    }
}

pub fn generate_cave(
    width: usize,
    height: usize,
    profile: &RoomProfile,
    seed: u64,
) -> Result<Cave, ConfigError> {
    profile.validate()?;
    let mut rng = GenRng::new(seed);
    let (field, carve) = RoomCellulose::new(width, height, profile)?.run(&mut rng);
    let walls = derive_walls(&field);
    log::info!(
        "carved {width}x{height} cave from seed {seed}: openness {:.3} after {} ticks",
        field.openness(),
        carve.ticks
    );
    Ok(Cave { seed, field, walls, carve })
}

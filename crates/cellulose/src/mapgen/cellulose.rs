//! Room interior generator: a walker population carves a fixed-size field toward a
//! target openness, then smoothing rounds it off.

use serde::{Deserialize, Serialize};

use crate::config::RoomProfile;
use crate::error::ConfigError;

use super::field::Field;
use super::seed::GenRng;
use super::smoothing::{SmoothingRule, smooth_passes};
use super::walker::Walker;

/// Outcome of the carving phase.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CarveReport {
    pub ticks: u32,
    /// Openness right after carving, before smoothing.
    pub openness: f64,
    pub target: f64,
    pub converged: bool,
    pub peak_walkers: usize,
}

impl CarveReport {
    /// How far short of the target the carve stopped; zero when it converged.
    pub fn shortfall(&self) -> f64 {
        (self.target - self.openness).max(0.0)
    }
}

pub struct RoomCellulose<'a> {
    field: Field,
    profile: &'a RoomProfile,
    walkers: Vec<Walker>,
    ticks: u32,
    peak_walkers: usize,
}

impl<'a> RoomCellulose<'a> {
    pub fn new(width: usize, height: usize, profile: &'a RoomProfile) -> Result<Self, ConfigError> {
        if width < 2 || height < 2 {
            return Err(ConfigError::FieldTooSmall { width, height });
        }
        let field = Field::new(width, height)?;
        let start = field.center();
        Ok(Self { field, profile, walkers: vec![Walker::new(start)], ticks: 0, peak_walkers: 1 })
    }

    pub fn field(&self) -> &Field {
        &self.field
    }

    pub fn walkers(&self) -> &[Walker] {
        &self.walkers
    }

    pub fn ticks(&self) -> u32 {
        self.ticks
    }

    /// Advances every walker once, then applies spawn and death. Returns the new openness.
    pub fn tick(&mut self, rng: &mut GenRng) -> f64 {
        for walker in &mut self.walkers {
            walker.step(&mut self.field, &self.profile.walker, rng);
        }

        if rng.chance(self.profile.spawn_chance) {
            let parent = rng.below(self.walkers.len());
            let child = self.walkers[parent].spawn_child();
            self.walkers.push(child);
            self.peak_walkers = self.peak_walkers.max(self.walkers.len());
        }
        if self.walkers.len() > 1 && rng.chance(self.profile.death_chance) {
            let victim = rng.below(self.walkers.len());
            self.walkers.swap_remove(victim);
        }

        self.ticks += 1;
        self.field.openness()
    }

    /// Ticks until the target openness or the tick bound, whichever comes first.
    pub fn generate(&mut self, rng: &mut GenRng) -> CarveReport {
        let target = self.profile.target_fullness;
        let mut openness = self.field.openness();
        while openness < target && self.ticks < self.profile.max_ticks {
            openness = self.tick(rng);
        }
        CarveReport {
            ticks: self.ticks,
            openness,
            target,
            converged: openness >= target,
            peak_walkers: self.peak_walkers,
        }
    }

    pub fn smooth(&mut self, rule: &SmoothingRule) {
        self.field = smooth_passes(&self.field, rule);
    }

    pub fn into_field(self) -> Field {
        self.field
    }

    /// Carve, smooth with the profile's rule, and hand back the finished field.
    pub fn run(mut self, rng: &mut GenRng) -> (Field, CarveReport) {
        let report = self.generate(rng);
        let rule = self.profile.smoothing;
        self.smooth(&rule);
        (self.field, report)
    }
}

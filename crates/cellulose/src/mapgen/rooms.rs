//! Room types and weighted candidate selection.

use serde::{Deserialize, Serialize};

use crate::config::{RoomCandidate, RoomProfile};
use crate::types::GridPos;

use super::grid::Footprint;
use super::seed::GenRng;
use super::smoothing::SmoothingRule;
use super::walker::{Brush, MovePolicy, WalkerProfile};

const DEFAULT_MAX_TICKS: u32 = 1_000;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomKind {
    Small,
    Medium,
    Large,
}

impl RoomKind {
    pub const ALL: [RoomKind; 3] = [RoomKind::Small, RoomKind::Medium, RoomKind::Large];

    /// Footprint size in grid cells, `(width, height)`.
    pub const fn cells(self) -> (usize, usize) {
        match self {
            RoomKind::Small => (1, 1),
            RoomKind::Medium => (2, 2),
            RoomKind::Large => (3, 3),
        }
    }

    pub fn footprint_at(self, origin: GridPos) -> Footprint {
        let (width, height) = self.cells();
        Footprint { origin, width, height }
    }

    pub const fn default_weight(self) -> f64 {
        match self {
            RoomKind::Small => 0.15,
            RoomKind::Medium => 0.45,
            RoomKind::Large => 0.40,
        }
    }

    /// Larger rooms carve to a lower fullness with a busier, stickier population
    /// that is pulled less strongly toward the center.
    pub fn default_profile(self) -> RoomProfile {
        let (target_fullness, spawn_chance, death_chance, stickiness, toward) = match self {
            RoomKind::Small => (0.65, 0.15, 0.025, 0.0, 0.85),
            RoomKind::Medium => (0.55, 0.15, 0.025, 0.15, 0.55),
            RoomKind::Large => (0.475, 0.25, 0.03, 0.20, 0.35),
        };
        RoomProfile {
            target_fullness,
            spawn_chance,
            death_chance,
            max_ticks: DEFAULT_MAX_TICKS,
            walker: WalkerProfile {
                stickiness,
                policy: MovePolicy::center_biased(toward),
                brush: Brush::square(2),
            },
            smoothing: SmoothingRule::default(),
        }
    }
}

/// Index of one candidate drawn proportionally to its weight.
pub(super) fn choose_candidate(candidates: &[RoomCandidate], rng: &mut GenRng) -> Option<usize> {
    let weights: Vec<f64> = candidates.iter().map(|candidate| candidate.weight).collect();
    rng.weighted_index(&weights)
}

//! Walker agent: a wandering brush that opens tiles as it moves.

use serde::{Deserialize, Serialize};

use crate::config::{check_probability, check_weight};
use crate::error::ConfigError;
use crate::types::{Direction, Offset, Pos};

use super::field::Field;
use super::seed::GenRng;

/// Largest offset a brush may carry along either axis.
pub const MAX_BRUSH_REACH: u32 = 64;

/// Fixed set of offsets painted open around a walker or hallway cursor.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Brush(Vec<Offset>);

impl Brush {
    pub fn new(offsets: Vec<Offset>) -> Result<Self, ConfigError> {
        let brush = Self(offsets);
        brush.validate()?;
        Ok(brush)
    }

    pub fn single() -> Self {
        Self(vec![Offset { dx: 0, dy: 0 }])
    }

    /// `size`×`size` block anchored at its top-left tile.
    pub fn square(size: u8) -> Self {
        let size = i32::from(size.max(1));
        let offsets =
            (0..size).flat_map(|dy| (0..size).map(move |dx| Offset { dx, dy })).collect();
        Self(offsets)
    }

    /// The tile plus its four orthogonal neighbors.
    pub fn plus() -> Self {
        Self(vec![
            Offset { dx: 0, dy: 0 },
            Offset { dx: -1, dy: 0 },
            Offset { dx: 1, dy: 0 },
            Offset { dx: 0, dy: -1 },
            Offset { dx: 0, dy: 1 },
        ])
    }

    pub fn offsets(&self) -> &[Offset] {
        &self.0
    }

    /// Opens every in-bounds tile under the brush at `at`; overhanging offsets are dropped.
    pub fn paint(&self, field: &mut Field, at: Pos) -> usize {
        self.0.iter().filter(|offset| field.open_cell(at.offset(offset.dx, offset.dy))).count()
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.0.is_empty() {
            return Err(ConfigError::EmptyBrush);
        }
        let too_wide = self.0.iter().find(|offset| {
            offset.dx.unsigned_abs() > MAX_BRUSH_REACH || offset.dy.unsigned_abs() > MAX_BRUSH_REACH
        });
        if let Some(&Offset { dx, dy }) = too_wide {
            return Err(ConfigError::BrushTooWide { dx, dy, limit: MAX_BRUSH_REACH });
        }
        Ok(())
    }
}

impl Default for Brush {
    fn default() -> Self {
        Brush::square(2)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MovePolicy {
    Uniform,
    /// Destinations strictly closer to the field center are drawn with weight `toward`,
    /// every other destination with weight `away`.
    CenterBiased { toward: f64, away: f64 },
}

impl MovePolicy {
    pub const AWAY_WEIGHT: f64 = 0.2;

    pub fn center_biased(toward: f64) -> Self {
        MovePolicy::CenterBiased { toward, away: Self::AWAY_WEIGHT }
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if let MovePolicy::CenterBiased { toward, away } = *self {
            check_weight("policy.toward", toward)?;
            check_weight("policy.away", away)?;
            if toward + away <= 0.0 {
                return Err(ConfigError::ZeroTotalWeight);
            }
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WalkerProfile {
    /// Probability of repeating the previous move when it is still legal.
    pub stickiness: f64,
    pub policy: MovePolicy,
    pub brush: Brush,
}

impl WalkerProfile {
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        check_probability("walker.stickiness", self.stickiness)?;
        self.policy.validate()?;
        self.brush.validate()
    }
}

impl Default for WalkerProfile {
    fn default() -> Self {
        Self { stickiness: 0.0, policy: MovePolicy::Uniform, brush: Brush::default() }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Walker {
    pos: Pos,
    last_move: Option<Direction>,
}

impl Walker {
    pub fn new(pos: Pos) -> Self {
        Self { pos, last_move: None }
    }

    pub fn pos(&self) -> Pos {
        self.pos
    }

    pub fn last_move(&self) -> Option<Direction> {
        self.last_move
    }

    /// A fresh walker on this walker's tile. It does not inherit the move history.
    pub fn spawn_child(&self) -> Walker {
        Walker::new(self.pos)
    }

    /// Moves one tile and paints the brush at the new position.
    pub fn step(&mut self, field: &mut Field, profile: &WalkerProfile, rng: &mut GenRng) {
        let legal = legal_moves(field, self.pos);
        let sticky = rng.chance(profile.stickiness);
        let direction = match self.last_move {
            Some(last) if sticky && legal.contains(&last) => last,
            _ => self.choose_direction(field, &legal, profile.policy, rng),
        };

        self.pos = self.pos.step(direction);
        self.last_move = Some(direction);
        profile.brush.paint(field, self.pos);
    }

    fn choose_direction(
        &self,
        field: &Field,
        legal: &[Direction],
        policy: MovePolicy,
        rng: &mut GenRng,
    ) -> Direction {
        match policy {
            MovePolicy::Uniform => legal[rng.below(legal.len())],
            MovePolicy::CenterBiased { toward, away } => {
                let own_distance = distance_to_center(field, self.pos);
                let weights: Vec<f64> = legal
                    .iter()
                    .map(|&direction| {
                        let destination = self.pos.step(direction);
                        if distance_to_center(field, destination) < own_distance {
                            toward
                        } else {
                            away
                        }
                    })
                    .collect();
                match rng.weighted_index(&weights) {
                    Some(index) => legal[index],
                    None => legal[rng.below(legal.len())],
                }
            }
        }
    }
}

/// Directions that keep the walker inside the field. Never empty for fields of at least 2×2.
pub(crate) fn legal_moves(field: &Field, pos: Pos) -> Vec<Direction> {
    Direction::ALL.into_iter().filter(|&direction| field.in_bounds(pos.step(direction))).collect()
}

fn distance_to_center(field: &Field, pos: Pos) -> f64 {
    let center_x = (field.width() as f64 - 1.0) / 2.0;
    let center_y = (field.height() as f64 - 1.0) / 2.0;
    let dx = pos.x as f64 - center_x;
    let dy = pos.y as f64 - center_y;
    (dx * dx + dy * dy).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corner_walker_only_sees_inward_moves() {
        let field = Field::new(4, 4).expect("valid dimensions");
        let legal = legal_moves(&field, Pos { y: 0, x: 0 });
        assert_eq!(legal, vec![Direction::Right, Direction::DownRight, Direction::Down]);

        let legal = legal_moves(&field, Pos { y: 3, x: 3 });
        assert_eq!(legal, vec![Direction::Up, Direction::Left, Direction::UpLeft]);
    }

    #[test]
    fn step_moves_one_tile_and_paints_brush() {
        let mut field = Field::new(6, 6).expect("valid dimensions");
        let profile = WalkerProfile { brush: Brush::single(), ..WalkerProfile::default() };
        let mut rng = GenRng::new(3);
        let mut walker = Walker::new(Pos { y: 3, x: 3 });

        walker.step(&mut field, &profile, &mut rng);

        let moved = walker.pos();
        assert_eq!(moved.x.abs_diff(3).max(moved.y.abs_diff(3)), 1);
        assert!(field.is_open(moved));
        assert_eq!(field.open_count(), 1);
    }

    #[test]
    fn overhanging_brush_is_partially_applied() {
        let mut field = Field::new(3, 3).expect("valid dimensions");
        let painted = Brush::square(2).paint(&mut field, Pos { y: 2, x: 2 });
        assert_eq!(painted, 1);
        assert!(field.is_open(Pos { y: 2, x: 2 }));
    }

    #[test]
    fn full_stickiness_repeats_last_legal_move() {
        let mut field = Field::new(30, 3).expect("valid dimensions");
        let profile = WalkerProfile {
            stickiness: 1.0,
            policy: MovePolicy::Uniform,
            brush: Brush::single(),
        };
        let mut rng = GenRng::new(11);
        let mut walker = Walker::new(Pos { y: 1, x: 15 });
        walker.step(&mut field, &profile, &mut rng);

        for _ in 0..12 {
            let before = walker.pos();
            let previous = walker.last_move().expect("walker moved");
            walker.step(&mut field, &profile, &mut rng);
            if legal_moves(&field, before).contains(&previous) {
                assert_eq!(walker.last_move(), Some(previous));
            }
        }
    }

    #[test]
    fn strong_center_bias_pulls_walker_inward() {
        let mut field = Field::new(41, 41).expect("valid dimensions");
        let profile = WalkerProfile {
            stickiness: 0.0,
            policy: MovePolicy::CenterBiased { toward: 1.0, away: 0.0 },
            brush: Brush::single(),
        };
        let mut rng = GenRng::new(17);
        let mut walker = Walker::new(Pos { y: 0, x: 0 });
        for _ in 0..40 {
            walker.step(&mut field, &profile, &mut rng);
        }
        assert!(distance_to_center(&field, walker.pos()) < 2.0);
    }

    #[test]
    fn empty_brush_is_rejected() {
        assert!(matches!(Brush::new(Vec::new()), Err(ConfigError::EmptyBrush)));
    }

    #[test]
    fn far_reaching_brush_offsets_are_rejected() {
        let reach = MAX_BRUSH_REACH as i32;
        assert!(Brush::new(vec![Offset { dx: -reach, dy: reach }]).is_ok());
        assert!(matches!(
            Brush::new(vec![Offset { dx: 0, dy: 0 }, Offset { dx: reach + 1, dy: 0 }]),
            Err(ConfigError::BrushTooWide { dx, dy: 0, .. }) if dx == reach + 1
        ));
        assert!(matches!(
            Brush::new(vec![Offset { dx: 0, dy: i32::MIN }]),
            Err(ConfigError::BrushTooWide { .. })
        ));
    }
}

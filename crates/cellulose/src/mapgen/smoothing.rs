//! Neighbor-counting cellular automaton pass over a passability field.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

use super::field::Field;

/// Set of 8-neighbor counts (`0..=8`) stored as a bitmask.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "Vec<u8>", try_from = "Vec<u8>")]
pub struct NeighborCounts(u16);

impl NeighborCounts {
    pub const EMPTY: NeighborCounts = NeighborCounts(0);

    /// Inclusive range `lo..=hi`; values past 8 are rejected.
    pub fn range(lo: u8, hi: u8) -> Result<Self, ConfigError> {
        if hi > 8 {
            return Err(ConfigError::NeighborCountOutOfRange(hi));
        }
        let mut counts = NeighborCounts::EMPTY;
        for n in lo..=hi {
            counts.0 |= 1 << n;
        }
        Ok(counts)
    }

    pub fn contains(self, count: u8) -> bool {
        count <= 8 && self.0 & (1 << count) != 0
    }

    pub fn iter(self) -> impl Iterator<Item = u8> {
        (0..=8).filter(move |&count| self.contains(count))
    }
}

impl From<NeighborCounts> for Vec<u8> {
    fn from(counts: NeighborCounts) -> Self {
        counts.iter().collect()
    }
}

impl TryFrom<Vec<u8>> for NeighborCounts {
    type Error = ConfigError;

    fn try_from(values: Vec<u8>) -> Result<Self, Self::Error> {
        let mut counts = NeighborCounts::EMPTY;
        for value in values {
            if value > 8 {
                return Err(ConfigError::NeighborCountOutOfRange(value));
            }
            counts.0 |= 1 << value;
        }
        Ok(counts)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmoothingRule {
    /// Open tiles stay open when their open-neighbor count is in this set.
    pub survive: NeighborCounts,
    /// Closed tiles open when their open-neighbor count is in this set.
    pub born: NeighborCounts,
    pub passes: u32,
}

impl Default for SmoothingRule {
    fn default() -> Self {
        Self { survive: NeighborCounts(0b1_1111_0000), born: NeighborCounts(0b1_1110_0000), passes: 1 }
    }
}

/// One pass. Edge tiles are forced closed; every interior tile reads only `field`.
pub fn smooth(field: &Field, rule: &SmoothingRule) -> Field {
    field.par_map(|pos| {
        if !field.has_full_neighborhood(pos) {
            return false;
        }
        let count = field.open_neighbors(pos);
        if field.is_open(pos) { rule.survive.contains(count) } else { rule.born.contains(count) }
    })
}

/// Chains `rule.passes` passes, each reading the previous pass's output.
pub fn smooth_passes(field: &Field, rule: &SmoothingRule) -> Field {
    let mut current = field.clone();
    for _ in 0..rule.passes {
        current = smooth(&current, rule);
    }
    current
}

#[cfg(test)]
mod tests {
    use proptest::collection;
    use proptest::prelude::*;

    use super::*;
    use crate::types::Pos;
    #[test]
    fn default_rule_matches_four_five_automaton() {
        let rule = SmoothingRule::default();
        assert_eq!(rule.survive, NeighborCounts::range(4, 8).expect("valid range"));
        assert_eq!(rule.born, NeighborCounts::range(5, 8).expect("valid range"));
        assert!(!rule.survive.contains(3));
        assert!(!rule.born.contains(4));
    }

    #[test]
    fn neighbor_counts_reject_values_past_eight() {
        assert!(matches!(
            NeighborCounts::range(2, 9),
            Err(ConfigError::NeighborCountOutOfRange(9))
        ));
        assert!(NeighborCounts::try_from(vec![1, 12]).is_err());
        let parsed: NeighborCounts = serde_json::from_str("[4,5,6]").expect("deserialize");
        assert_eq!(parsed, NeighborCounts::range(4, 6).expect("valid range"));
    }

    #[test]
    fn all_open_field_keeps_interior_and_closes_border() {
        let field = Field::from_ascii(&[".....", ".....", ".....", ".....", "....."])
            .expect("valid ascii");
        let smoothed = smooth(&field, &SmoothingRule::default());
        for pos in smoothed.positions() {
            let interior = (1..=3).contains(&pos.x) && (1..=3).contains(&pos.y);
            assert_eq!(smoothed.is_open(pos), interior, "tile {pos:?}");
        }
    }

    #[test]
    fn isolated_open_tile_dies_and_dense_gap_fills() {
        let field = Field::from_ascii(&[
            "#######", //
            "#.#####", //
            "#######", //
            "###...#", //
            "###.#.#", //
            "###...#", //
            "#######",
        ])
        .expect("valid ascii");
        let smoothed = smooth(&field, &SmoothingRule::default());
        assert!(!smoothed.is_open(Pos { y: 1, x: 1 }));
        assert!(smoothed.is_open(Pos { y: 4, x: 4 }));
    }

    #[test]
    fn passes_chain_on_previous_output() {
        let field = Field::from_ascii(&["######", "#.#..#", "#....#", "#..#.#", "######"])
            .expect("valid ascii");
        let rule = SmoothingRule { passes: 2, ..SmoothingRule::default() };
        let single = SmoothingRule { passes: 1, ..rule };
        let twice = smooth(&smooth(&field, &single), &single);
        assert_eq!(smooth_passes(&field, &rule), twice);
        assert_eq!(smooth_passes(&field, &SmoothingRule { passes: 0, ..rule }), field);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(48))]

        #[test]
        fn smoothing_converges_to_fixed_points(
            width in 3_usize..14,
            height in 3_usize..14,
            bits in collection::vec(any::<bool>(), 14 * 14),
        ) {
            let mut field = Field::new(width, height).expect("non-zero dimensions");
            for (index, pos) in field.clone().positions().enumerate() {
                field.set(pos, bits[index]).expect("in bounds");
            }
            let rule = SmoothingRule::default();
            let mut current = smooth(&field, &rule);
            let mut stable = false;
            for _ in 0..64 {
                let next = smooth(&current, &rule);
                if next == current {
                    stable = true;
                    break;
                }
                current = next;
            }
            prop_assert!(stable, "no fixed point within 64 passes");
            prop_assert_eq!(&smooth(&current, &rule), &current);
            for pos in current.positions() {
                if !current.has_full_neighborhood(pos) {
                    prop_assert!(!current.is_open(pos));
                }
            }
        }
    }
}

/// The puzzle board: left values, shuffled multiplier slots, hidden answer key.
///
/// A board is dealt once per round and never mutated afterwards.
/// Display order of the multipliers and the answer key come from two
/// separate shuffles, so slot position says nothing about the solution.

use std::collections::HashSet;

use crate::config::BoardConfig;
use super::rng::GameRng;

/// Display color of a left node (and of every wire leaving it).
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct NodeColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl NodeColor {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        NodeColor { r, g, b }
    }

    /// `#rrggbb`, as written to the event log.
    pub fn hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Left node palette, cycled when there are more nodes than colors.
pub const PALETTE: [NodeColor; 3] = [
    NodeColor::rgb(0xff, 0xcc, 0x00),
    NodeColor::rgb(0xff, 0x33, 0x55),
    NodeColor::rgb(0x33, 0x66, 0xff),
];

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Board {
    left_values: Vec<u32>,
    multiplier_slots: Vec<u32>,
    answer_key: Vec<usize>,
    target: u32,
}

impl Board {
    /// Build a board from explicit parts.
    ///
    /// Returns `None` unless all three sequences have the same length,
    /// the left values are distinct, `answer_key` is a permutation of
    /// `0..len` and the target fits in a `u32`.
    #[cfg_attr(not(test), allow(dead_code))]
    pub fn from_parts(
        left_values: Vec<u32>,
        multiplier_slots: Vec<u32>,
        answer_key: Vec<usize>,
    ) -> Option<Board> {
        let n = left_values.len();
        if multiplier_slots.len() != n || answer_key.len() != n {
            return None;
        }
        let distinct: HashSet<u32> = left_values.iter().copied().collect();
        if distinct.len() != n {
            return None;
        }
        let mut seen = vec![false; n];
        for &slot in &answer_key {
            if slot >= n || seen[slot] {
                return None;
            }
            seen[slot] = true;
        }

        let mut target: u32 = 0;
        for (&v, &slot) in left_values.iter().zip(&answer_key) {
            target = target.checked_add(v.checked_mul(multiplier_slots[slot])?)?;
        }

        Some(Board { left_values, multiplier_slots, answer_key, target })
    }

    /// Number of nodes per column.
    pub fn len(&self) -> usize {
        self.left_values.len()
    }

    pub fn left_values(&self) -> &[u32] {
        &self.left_values
    }

    pub fn multiplier_slots(&self) -> &[u32] {
        &self.multiplier_slots
    }

    /// The hidden pairing. Never rendered.
    #[cfg_attr(not(test), allow(dead_code))]
    pub fn answer_key(&self) -> &[usize] {
        &self.answer_key
    }

    pub fn target(&self) -> u32 {
        self.target
    }

    pub fn color(&self, left: usize) -> NodeColor {
        PALETTE[left % PALETTE.len()]
    }
}

/// Deal a fresh board.
///
/// The caller guarantees the value range holds at least as many integers
/// as there are multipliers; `config::GameConfig::load` enforces this.
pub fn generate_board(rng: &mut GameRng, cfg: &BoardConfig) -> Board {
    let n = cfg.multipliers.len();

    // Rejection sampling into a set, keeping first-draw order.
    let mut drawn = HashSet::with_capacity(n);
    let mut left_values = Vec::with_capacity(n);
    while left_values.len() < n {
        let v = rng.range_inclusive(cfg.value_min, cfg.value_max);
        if drawn.insert(v) {
            left_values.push(v);
        }
    }

    let mut multiplier_slots = cfg.multipliers.clone();
    rng.shuffle(&mut multiplier_slots);

    let mut answer_key: Vec<usize> = (0..n).collect();
    rng.shuffle(&mut answer_key);

    // Saturating like `score::score`, so the answer wiring always matches.
    let target = left_values
        .iter()
        .zip(&answer_key)
        .map(|(&v, &slot)| v.saturating_mul(multiplier_slots[slot]))
        .fold(0u32, u32::saturating_add);

    Board { left_values, multiplier_slots, answer_key, target }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn default_cfg() -> BoardConfig {
        BoardConfig::default()
    }

    #[test]
    fn scenario_target_is_weighted_sum() {
        let b = Board::from_parts(vec![4, 7, 12], vec![10, 1, 2], vec![2, 0, 1]).unwrap();
        assert_eq!(b.target(), 90);
        assert_eq!(b.len(), 3);
    }

    #[test]
    fn from_parts_rejects_bad_shapes() {
        assert!(Board::from_parts(vec![1, 2], vec![1, 2, 10], vec![0, 1]).is_none());
        assert!(Board::from_parts(vec![1, 1, 2], vec![1, 2, 10], vec![0, 1, 2]).is_none());
        assert!(Board::from_parts(vec![1, 2, 3], vec![1, 2, 10], vec![0, 0, 2]).is_none());
        assert!(Board::from_parts(vec![1, 2, 3], vec![1, 2, 10], vec![0, 1, 3]).is_none());
    }

    #[test]
    fn from_parts_rejects_overflowing_target() {
        assert!(Board::from_parts(vec![u32::MAX, 1], vec![2, 1], vec![0, 1]).is_none());
        assert!(Board::from_parts(vec![u32::MAX - 1, 1], vec![1, 1], vec![0, 1]).is_some());
        assert!(Board::from_parts(vec![u32::MAX, 1], vec![1, 1], vec![0, 1]).is_none());
    }

    #[test]
    fn huge_values_deal_without_panicking() {
        let cfg = BoardConfig {
            value_min: 1_000_000_000,
            value_max: 1_000_000_100,
            multipliers: vec![1, 2, 10],
        };
        let b = generate_board(&mut GameRng::new(5), &cfg);
        assert_eq!(b.target(), u32::MAX);
        let pairs = b.answer_key().iter().enumerate().map(|(l, &r)| (l, r));
        assert_eq!(crate::domain::score::score(&b, pairs), b.target());
    }

    #[test]
    fn colors_cycle_through_palette() {
        let b = Board::from_parts(vec![1, 2, 3, 4], vec![1, 2, 10, 5], vec![0, 1, 2, 3]).unwrap();
        assert_eq!(b.color(0), PALETTE[0]);
        assert_eq!(b.color(3), PALETTE[0]);
        assert_eq!(PALETTE[0].hex(), "#ffcc00");
    }

    #[test]
    fn narrow_range_still_terminates() {
        let cfg = BoardConfig { value_min: 5, value_max: 7, multipliers: vec![1, 2, 10] };
        let mut rng = GameRng::new(3);
        let b = generate_board(&mut rng, &cfg);
        let mut vals = b.left_values().to_vec();
        vals.sort();
        assert_eq!(vals, vec![5, 6, 7]);
    }

    #[test]
    fn same_seed_same_board() {
        let a = generate_board(&mut GameRng::new(77), &default_cfg());
        let b = generate_board(&mut GameRng::new(77), &default_cfg());
        assert_eq!(a, b);
    }

    /// Over many deals, the slot where the answer puts left node 0 should
    /// not track the display position of any particular multiplier.
    #[test]
    fn answer_key_independent_of_display_order() {
        let cfg = default_cfg();
        let mut rng = GameRng::new(2024);
        let deals = 3000;
        // counts[k][s]: answer slot of left0 == s while multiplier k sits in slot 0
        let mut counts = [[0u32; 3]; 3];
        for _ in 0..deals {
            let b = generate_board(&mut rng, &cfg);
            let k = cfg.multipliers.iter().position(|&m| m == b.multiplier_slots()[0]).unwrap();
            counts[k][b.answer_key()[0]] += 1;
        }
        // Each of the 9 cells expects deals/9 ≈ 333; allow a wide band.
        for row in &counts {
            for &c in row {
                assert!((230..=440).contains(&c), "skewed cell count {c} in {counts:?}");
            }
        }
    }

    proptest! {
        #[test]
        fn generated_values_are_distinct_and_in_range(seed in any::<u64>()) {
            let cfg = default_cfg();
            let b = generate_board(&mut GameRng::new(seed), &cfg);
            let vals = b.left_values();
            prop_assert_eq!(vals.len(), 3);
            let set: HashSet<u32> = vals.iter().copied().collect();
            prop_assert_eq!(set.len(), 3);
            for &v in vals {
                prop_assert!(v >= cfg.value_min && v <= cfg.value_max);
            }
        }

        #[test]
        fn slots_are_a_permutation_of_multipliers(seed in any::<u64>()) {
            let cfg = default_cfg();
            let b = generate_board(&mut GameRng::new(seed), &cfg);
            let mut slots = b.multiplier_slots().to_vec();
            slots.sort();
            prop_assert_eq!(slots, vec![1, 2, 10]);
            let mut key = b.answer_key().to_vec();
            key.sort();
            prop_assert_eq!(key, vec![0, 1, 2]);
        }

        #[test]
        fn target_matches_answer_wiring(seed in any::<u64>()) {
            let b = generate_board(&mut GameRng::new(seed), &default_cfg());
            let sum: u32 = b.left_values().iter().enumerate()
                .map(|(i, &v)| v * b.multiplier_slots()[b.answer_key()[i]])
                .sum();
            prop_assert_eq!(sum, b.target());
        }
    }
}

/// Scoring and win validation.
///
/// Pure functions over a board and a connection set, no side effects.
/// A win needs the exact target AND every left node wired: a partial
/// wiring that happens to hit the target does not count.

use super::board::Board;

/// Outcome of a validation pass.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Validation {
    pub value: u32,
    pub is_win: bool,
}

/// Σ left_value × slot multiplier over `(left, slot)` pairs.
///
/// Pairs pointing outside the board contribute nothing. Saturates at
/// `u32::MAX` instead of wrapping.
pub fn score<I>(board: &Board, pairs: I) -> u32
where
    I: IntoIterator<Item = (usize, usize)>,
{
    let values = board.left_values();
    let slots = board.multiplier_slots();
    pairs
        .into_iter()
        .filter_map(|(l, r)| Some(values.get(l)?.saturating_mul(*slots.get(r)?)))
        .fold(0, u32::saturating_add)
}

pub fn validate<I>(board: &Board, pairs: I) -> Validation
where
    I: IntoIterator<Item = (usize, usize)>,
{
    let pairs: Vec<(usize, usize)> = pairs.into_iter().collect();
    let value = score(board, pairs.iter().copied());
    Validation {
        value,
        is_win: value == board.target() && pairs.len() == board.len(),
    }
}

/// Zero-pad to three digits for the HUD (`7` → `"007"`).
pub fn pad3(n: u32) -> String {
    format!("{:03}", n)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario() -> Board {
        Board::from_parts(vec![4, 7, 12], vec![10, 1, 2], vec![2, 0, 1]).unwrap()
    }

    /// All 6 complete wirings of a 3-node board.
    fn bijections() -> Vec<[usize; 3]> {
        vec![[0, 1, 2], [0, 2, 1], [1, 0, 2], [1, 2, 0], [2, 0, 1], [2, 1, 0]]
    }

    #[test]
    fn empty_scores_zero() {
        let b = scenario();
        assert_eq!(score(&b, std::iter::empty()), 0);
        assert_eq!(validate(&b, std::iter::empty()), Validation { value: 0, is_win: false });
    }

    #[test]
    fn answer_wiring_wins() {
        let b = scenario();
        let v = validate(&b, [(0, 2), (1, 0), (2, 1)]);
        assert_eq!(v, Validation { value: 90, is_win: true });
    }

    #[test]
    fn every_other_bijection_loses() {
        let b = scenario();
        for perm in bijections() {
            let pairs = perm.iter().enumerate().map(|(l, &r)| (l, r));
            let v = validate(&b, pairs);
            assert_eq!(v.is_win, perm == [2, 0, 1], "wiring {perm:?} scored {}", v.value);
        }
    }

    #[test]
    fn coincidental_partial_sum_does_not_win() {
        // target = 10×2 + 20×1 + 1×10 = 50
        let b = Board::from_parts(vec![10, 20, 1], vec![1, 2, 10], vec![1, 0, 2]).unwrap();
        assert_eq!(b.target(), 50);
        // 20×2 + 1×10 = 50 with node 0 left dangling
        let partial = validate(&b, [(1, 1), (2, 2)]);
        assert_eq!(partial.value, 50);
        assert!(!partial.is_win);
    }

    #[test]
    fn out_of_range_pairs_are_ignored() {
        let b = scenario();
        assert_eq!(score(&b, [(5, 0), (0, 9)]), 0);
    }

    #[test]
    fn oversized_products_saturate() {
        let b = Board::from_parts(vec![u32::MAX / 2, 3], vec![4, 1], vec![1, 0]).unwrap();
        assert_eq!(score(&b, [(0, 0)]), u32::MAX);
        assert_eq!(score(&b, [(0, 0), (1, 1)]), u32::MAX);
    }

    #[test]
    fn pad3_zero_pads() {
        assert_eq!(pad3(0), "000");
        assert_eq!(pad3(7), "007");
        assert_eq!(pad3(90), "090");
        assert_eq!(pad3(999), "999");
        assert_eq!(pad3(1234), "1234");
    }
}

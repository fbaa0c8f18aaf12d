/// Player wiring: left node → multiplier slot.
///
/// Keyed by left index, so a left node has at most one wire. A slot takes
/// at most one incoming wire; `connect` refuses a slot that is already in
/// use and leaves the mapping untouched.

use std::collections::BTreeMap;

/// Point-in-time copy of the wiring, ordered by left index.
pub type ConnectionsSnapshot = BTreeMap<usize, usize>;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ConnectOutcome {
    /// Precondition failed; nothing changed.
    Rejected,
    /// Wire placed. `replaced` is the slot the left node was wired to before.
    Connected { replaced: Option<usize> },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Connections {
    by_left: Vec<Option<usize>>,
}

impl Connections {
    pub fn new(nodes: usize) -> Self {
        Connections { by_left: vec![None; nodes] }
    }

    /// Number of wired left nodes.
    pub fn len(&self) -> usize {
        self.by_left.iter().filter(|s| s.is_some()).count()
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub fn is_empty(&self) -> bool {
        self.by_left.iter().all(Option::is_none)
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub fn slot_of(&self, left: usize) -> Option<usize> {
        self.by_left.get(left).copied().flatten()
    }

    /// Which left node feeds `right`, if any.
    pub fn left_of(&self, right: usize) -> Option<usize> {
        self.by_left.iter().position(|s| *s == Some(right))
    }

    pub fn slot_taken(&self, right: usize) -> bool {
        self.left_of(right).is_some()
    }

    /// `(left, right)` pairs in left order.
    pub fn pairs(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.by_left
            .iter()
            .enumerate()
            .filter_map(|(l, s)| s.map(|r| (l, r)))
    }

    pub fn snapshot(&self) -> ConnectionsSnapshot {
        self.pairs().collect()
    }

    /// Wire `left` to `right`, replacing any earlier wire from `left`.
    ///
    /// Rejected when either index is off the board or `right` already has
    /// an incoming wire (re-wiring a node to its own slot included).
    pub fn connect(&mut self, left: usize, right: usize) -> ConnectOutcome {
        let nodes = self.by_left.len();
        if left >= nodes || right >= nodes || self.slot_taken(right) {
            return ConnectOutcome::Rejected;
        }
        let replaced = self.by_left[left].replace(right);
        ConnectOutcome::Connected { replaced }
    }

    pub fn clear(&mut self) {
        self.by_left.fill(None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_is_empty() {
        let c = Connections::new(3);
        assert!(c.is_empty());
        assert_eq!(c.len(), 0);
        assert!(c.snapshot().is_empty());
    }

    #[test]
    fn connect_then_query() {
        let mut c = Connections::new(3);
        assert_eq!(c.connect(0, 2), ConnectOutcome::Connected { replaced: None });
        assert_eq!(c.slot_of(0), Some(2));
        assert_eq!(c.left_of(2), Some(0));
        assert!(c.slot_taken(2));
        assert!(!c.slot_taken(0));
    }

    #[test]
    fn used_slot_is_rejected_without_change() {
        let mut c = Connections::new(3);
        c.connect(0, 1);
        let before = c.clone();
        assert_eq!(c.connect(2, 1), ConnectOutcome::Rejected);
        assert_eq!(c, before);
        // Same node, same slot: still a used slot.
        assert_eq!(c.connect(0, 1), ConnectOutcome::Rejected);
        assert_eq!(c, before);
    }

    #[test]
    fn rewire_frees_previous_slot() {
        let mut c = Connections::new(3);
        c.connect(1, 0);
        assert_eq!(c.connect(1, 2), ConnectOutcome::Connected { replaced: Some(0) });
        assert!(!c.slot_taken(0));
        assert_eq!(c.len(), 1);
        assert_eq!(c.connect(2, 0), ConnectOutcome::Connected { replaced: None });
    }

    #[test]
    fn out_of_range_is_rejected() {
        let mut c = Connections::new(3);
        assert_eq!(c.connect(3, 0), ConnectOutcome::Rejected);
        assert_eq!(c.connect(0, 3), ConnectOutcome::Rejected);
        assert!(c.is_empty());
    }

    #[test]
    fn snapshot_is_ordered_by_left() {
        let mut c = Connections::new(3);
        c.connect(2, 0);
        c.connect(0, 1);
        let pairs: Vec<_> = c.snapshot().into_iter().collect();
        assert_eq!(pairs, vec![(0, 1), (2, 0)]);
        c.clear();
        assert!(c.is_empty());
    }
}

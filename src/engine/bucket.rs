//! Hash-bucketed entries: values ordered by their hash only.
//!
//! Equal hashes form a collision run of adjacent entries. A lookup descends
//! once to the first entry of the run and scans it linearly, so the cost is
//! O(log n + k) for a run of k entries. Order within a run is unspecified.

use super::tree::Tree;
use crate::compare::{Comparer, DuplicateAware, NaturalOrder, SearchBias};

/// A value stored together with its hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Bucketed<T> {
    pub(crate) hash: u64,
    pub(crate) value: T,
}

impl<T> Bucketed<T> {
    pub(crate) const fn new(hash: u64, value: T) -> Self {
        Self { hash, value }
    }
}

/// Looks up the entry with `hash` whose value satisfies `matches`.
///
/// Returns `Ok(index)` of the matching entry, or `Err(start)` where `start` is
/// the first index of the collision run for `hash` (where a new entry with
/// this hash is inserted).
pub(crate) fn locate_in_bucket<T, F>(tree: &Tree<Bucketed<T>>, hash: u64, mut matches: F) -> Result<usize, usize>
where
    F: FnMut(&T) -> bool,
{
    let start = run_start(tree, hash);
    for (offset, entry) in tree.iter_from(start).enumerate() {
        if entry.hash != hash {
            break;
        }
        if matches(&entry.value) {
            return Ok(start + offset);
        }
    }
    Err(start)
}

/// First index whose hash is not below `hash`.
fn run_start<T>(tree: &Tree<Bucketed<T>>, hash: u64) -> usize {
    let by_hash = DuplicateAware::new(NaturalOrder, SearchBias::First);
    tree.partition_point(0, tree.len(), |entry| by_hash.compare(&entry.hash, &hash).is_lt())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn bucketed(entries: &[(u64, i32)]) -> Tree<Bucketed<i32>> {
        let items = entries
            .iter()
            .map(|&(hash, value)| Bucketed::new(hash, value))
            .collect();
        Tree::packed(items, 3)
    }

    #[rstest]
    #[case(0, 3, Ok(2))]
    #[case(0, 1, Ok(0))]
    #[case(1, 7, Ok(5))]
    #[case(0, 9, Err(0))]
    #[case(1, 9, Err(4))]
    #[case(2, 9, Err(6))]
    #[case(5, 9, Err(7))]
    fn test_locate_scans_collision_run(
        #[case] hash: u64,
        #[case] value: i32,
        #[case] expected: Result<usize, usize>,
    ) {
        let tree = bucketed(&[(0, 1), (0, 2), (0, 3), (0, 4), (1, 5), (1, 7), (3, 8)]);
        assert_eq!(locate_in_bucket(&tree, hash, |candidate| *candidate == value), expected);
    }

    #[rstest]
    fn test_new_entry_leads_its_collision_run() {
        let mut tree = bucketed(&[(0, 1), (1, 5), (1, 7), (3, 8)]);
        let Err(index) = locate_in_bucket(&tree, 1, |candidate| *candidate == 6) else {
            panic!("6 is not stored");
        };
        tree.insert(index, Bucketed::new(1, 6)).unwrap();

        let run: Vec<i32> = tree.iter_from(1).take(3).map(|entry| entry.value).collect();
        assert_eq!(run, vec![6, 5, 7]);
        assert_eq!(locate_in_bucket(&tree, 1, |candidate| *candidate == 7), Ok(3));
    }

    #[rstest]
    fn test_locate_in_empty_tree() {
        let tree = bucketed(&[]);
        assert_eq!(locate_in_bucket(&tree, 42, |_| true), Err(0));
    }
}

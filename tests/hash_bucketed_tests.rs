//! Unit tests for HashBucketedTree and PersistentHashBucketedTree.
//!
//! Hash collisions are forced with a coarse hash function so every lookup
//! has to scan a collision run.

use std::collections::HashSet;

use ordtree::compare::{DefaultEquality, EqualityComparer, FnEquality, KeyEquality};
use ordtree::{HashBucketedTree, TreeError, ValidationRule};
use rstest::rstest;

/// Hash 0 for values below 5 in magnitude, hash 1 otherwise.
fn coarse() -> impl EqualityComparer<i32> + Clone {
    FnEquality::new(
        |left: &i32, right: &i32| left == right,
        |value: &i32| u64::from(value.unsigned_abs() >= 5),
    )
}

#[rstest]
fn test_forced_collisions_intersection() {
    let mut set = HashBucketedTree::with_branching_factor(3, coarse()).unwrap();
    for value in 0..10 {
        assert!(set.insert(value));
    }
    set.intersect_with([3, 4, 5]);

    let values: HashSet<i32> = set.iter().copied().collect();
    assert_eq!(values, HashSet::from([3, 4, 5]));
    assert!(set.validate(ValidationRule::Structural).is_ok());
}

#[rstest]
fn test_forced_collisions_match_hash_set() {
    let mut set = HashBucketedTree::with_branching_factor(3, coarse()).unwrap();
    let mut reference = HashSet::new();
    for value in [4, 9, -2, 7, 0, 12, -9, 3, 4, 9] {
        assert_eq!(set.insert(value), reference.insert(value));
    }
    for value in [9, 1, -2, 12, 12, 100] {
        assert_eq!(set.remove(&value), reference.remove(&value));
    }
    assert_eq!(set.len(), reference.len());
    assert_eq!(set.iter().copied().collect::<HashSet<_>>(), reference);
    for value in -15..15 {
        assert_eq!(set.contains(&value), reference.contains(&value));
    }
}

#[rstest]
fn test_union_and_except() {
    let mut set: HashBucketedTree<u32> = (0..10).collect();
    set.union_with(5..15);
    set.except_with([0, 14, 99]);
    let mut values: Vec<u32> = set.iter().copied().collect();
    values.sort_unstable();
    assert_eq!(values, (1..14).collect::<Vec<_>>());
}

#[rstest]
fn test_try_from_unique_reports_position() {
    assert_eq!(
        HashBucketedTree::<&str>::try_from_unique(["a", "b", "c", "b"]).err(),
        Some(TreeError::DuplicateKey { position: 3 })
    );
}

#[rstest]
fn test_key_equality_gives_map_semantics() {
    let mut map: HashBucketedTree<(String, u32), KeyEquality<DefaultEquality>> = HashBucketedTree::new();
    map.insert(("one".to_string(), 1));
    map.insert(("two".to_string(), 2));
    assert!(!map.insert(("one".to_string(), 100)));
    assert_eq!(map.replace(("one".to_string(), 11)), Some(("one".to_string(), 1)));

    let hash = map.equality().key_hash("one");
    assert_eq!(map.find_with(hash, |entry| entry.0 == "one").map(|entry| entry.1), Some(11));
    assert_eq!(map.take(&("two".to_string(), 0)), Some(("two".to_string(), 2)));
    assert_eq!(map.len(), 1);
}

#[rstest]
fn test_retain_and_trim() {
    let mut set: HashBucketedTree<i32> =
        HashBucketedTree::with_branching_factor(3, DefaultEquality::default()).unwrap();
    set.union_with(0..100);
    set.retain(|value| value % 10 == 0);
    assert_eq!(set.len(), 10);
    set.trim_excess();
    assert!(set.validate(ValidationRule::RequirePacked).is_ok());
    assert!(set.contains(&90));
    assert!(!set.contains(&91));
}

#[cfg(feature = "persistent")]
mod persistent {
    use super::coarse;
    use ordtree::PersistentHashBucketedTree;
    use rstest::rstest;
    use std::collections::HashSet;

    #[rstest]
    fn test_persistent_set_operations() {
        let empty = PersistentHashBucketedTree::with_branching_factor(3, coarse()).unwrap();
        let full = empty.union_with(0..10);
        let middle = full.intersect_with([3, 4, 5]);
        let trimmed = full.except_with([0, 9]).retain(|value| *value != 5);

        assert_eq!(full.len(), 10);
        assert_eq!(middle.iter().copied().collect::<HashSet<_>>(), HashSet::from([3, 4, 5]));
        assert_eq!(trimmed.len(), 7);
        assert!(!trimmed.contains(&5));
        assert!(full.contains(&5));
    }
}

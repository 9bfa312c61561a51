#![cfg(feature = "persistent")]
//! Unit tests for PersistentTreeList.
//!
//! Every update must leave the original list untouched and agree with the
//! mutable TreeList performing the same update.

use ordtree::compare::NaturalOrder;
use ordtree::persistent::PersistentTreeList;
use ordtree::{TreeError, TreeList, ValidationRule};
use rstest::rstest;

// =============================================================================
// Construction
// =============================================================================

#[rstest]
fn test_new_creates_empty_list() {
    let list: PersistentTreeList<i32> = PersistentTreeList::new();
    assert!(list.is_empty());
    assert_eq!(list.height(), 1);
    assert_eq!(list, PersistentTreeList::default());
}

#[rstest]
fn test_with_branching_factor_rejects_one() {
    assert_eq!(
        PersistentTreeList::<u8>::with_branching_factor(1).err(),
        Some(TreeError::InvalidBranchingFactor { branching_factor: 1 })
    );
}

// =============================================================================
// Persistence
// =============================================================================

#[rstest]
fn test_push_back_does_not_modify_original() {
    let first = PersistentTreeList::new().push_back(1);
    let second = first.push_back(2);

    assert_eq!(first.len(), 1);
    assert_eq!(first.get(1), None);
    assert_eq!(second.to_vec(), vec![1, 2]);
}

#[rstest]
fn test_every_version_stays_readable() {
    let mut versions = vec![PersistentTreeList::with_branching_factor(3).unwrap()];
    for value in 0..40 {
        let next = versions[versions.len() - 1].insert(value as usize / 2, value).unwrap();
        versions.push(next);
    }
    for (length, version) in versions.iter().enumerate() {
        assert_eq!(version.len(), length);
        assert!(version.validate(ValidationRule::Structural).is_ok());
    }
}

#[rstest]
fn test_updates_match_mutable_list() {
    let persistent = PersistentTreeList::from_iter_with_branching_factor(0..30, 4).unwrap();
    let mut mutable = TreeList::from_iter_with_branching_factor(0..30, 4).unwrap();

    let persistent = persistent
        .insert(7, 100)
        .and_then(|list| list.remove_range(10, 5))
        .and_then(|list| list.set(0, -5))
        .and_then(|list| list.reverse_range(3, 10))
        .unwrap()
        .push_front(42)
        .remove_all(|value| value % 3 == 0);

    mutable.insert(7, 100).unwrap();
    mutable.remove_range(10, 5).unwrap();
    mutable.set(0, -5).unwrap();
    mutable.reverse_range(3, 10).unwrap();
    mutable.push_front(42);
    mutable.remove_all(|value| value % 3 == 0);

    assert_eq!(persistent.to_vec(), mutable.to_vec());
}

#[rstest]
fn test_sort_by_leaves_original() {
    let list: PersistentTreeList<i32> = [5, 3, 9, 1].into_iter().collect();
    let sorted = list.sort_by(&NaturalOrder);
    assert_eq!(sorted.to_vec(), vec![1, 3, 5, 9]);
    assert_eq!(list.to_vec(), vec![5, 3, 9, 1]);
    assert_eq!(sorted.binary_search(&5), Ok(2));
}

#[rstest]
fn test_trim_excess_twice_shares_root() {
    let mut list = PersistentTreeList::with_branching_factor(3).unwrap();
    for value in 0..50 {
        list = list.insert(0, value).unwrap();
    }
    let packed = list.trim_excess();
    assert!(!packed.ptr_eq(&list));
    assert!(packed.validate(ValidationRule::RequirePacked).is_ok());
    assert!(packed.trim_excess().ptr_eq(&packed));
    assert_eq!(packed, list);
}

#[rstest]
fn test_errors_leave_list_unchanged() {
    let list: PersistentTreeList<i32> = (0..4).collect();
    assert_eq!(
        list.set(4, 0).err(),
        Some(TreeError::IndexOutOfRange { index: 4, length: 4 })
    );
    assert!(list.sort_range(2, 3, &NaturalOrder).is_err());
    assert!(list.get_range(1, 4).is_err());
    assert_eq!(list.to_vec(), vec![0, 1, 2, 3]);
}

#[rstest]
fn test_queries() {
    let list: PersistentTreeList<i32> = [4, 8, 15, 16, 23, 42].into_iter().collect();
    assert_eq!(list.first(), Some(&4));
    assert_eq!(list.last(), Some(&42));
    assert_eq!(list.find_index(|value| *value > 10), Some(2));
    assert_eq!(list.find_last(|value| value % 2 == 0), Some(&42));
    assert_eq!(list.find_all(|value| value % 2 == 1).to_vec(), vec![15, 23]);
    assert_eq!(list.index_of_in(&16, 0, 3), Ok(None));
    assert!(list.true_for_all(|value| *value > 0));
    assert_eq!(list.convert_all(|value| value * 2).get(5), Some(&84));
}

#[rstest]
fn test_converts_into_mutable_list() {
    let list: PersistentTreeList<i32> = (0..5).collect();
    let mut mutable = TreeList::from(list.clone());
    mutable.push_back(5);
    assert_eq!(list.len(), 5);
    assert_eq!(mutable.len(), 6);
}

#[rstest]
fn test_extend_appends_without_touching_original() {
    let list: PersistentTreeList<i32> = (0..3).collect();
    let extended = list.extend(3..10);
    assert_eq!(list.len(), 3);
    assert_eq!(extended.to_vec(), (0..10).collect::<Vec<_>>());
    assert!(list.extend(std::iter::empty()).ptr_eq(&list));
}

#![cfg(feature = "persistent")]
//! Unit tests for TransientTreeList.
//!
//! A transient mutates its own working tree in place and must never change
//! a list it has published.

use ordtree::persistent::{PersistentTreeList, TransientTreeList};
use ordtree::ValidationRule;
use rstest::rstest;

#[rstest]
fn test_to_persistent_twice_returns_same_snapshot() {
    let mut transient: TransientTreeList<i32> = (0..50).collect();
    let first = transient.to_persistent();
    let second = transient.to_persistent();
    assert!(first.ptr_eq(&second));
}

#[rstest]
fn test_mutation_after_publish_copies_on_write() {
    let mut transient = TransientTreeList::with_branching_factor(3).unwrap();
    transient.extend(0..40);
    let snapshot = transient.to_persistent();

    for index in 0..40 {
        transient.set(index, index as i32 * 10).unwrap();
    }
    transient.remove_range(0, 10).unwrap();
    transient.insert_range(5, [-1, -2, -3]).unwrap();
    transient.reverse();

    assert_eq!(snapshot.to_vec(), (0..40).collect::<Vec<_>>());
    assert!(!transient.to_persistent().ptr_eq(&snapshot));
    assert_eq!(transient.len(), 33);
}

#[rstest]
fn test_round_trip_from_persistent() {
    let original: PersistentTreeList<i32> = (0..20).collect();
    let mut transient = original.clone().transient();
    transient.push_front(-1);
    transient.pop_back();
    transient.remove_all(|value| value % 2 == 0);
    let updated = transient.persistent();

    assert_eq!(original.len(), 20);
    assert_eq!(updated.to_vec(), vec![-1, 1, 3, 5, 7, 9, 11, 13, 15, 17]);
}

#[rstest]
fn test_batch_appends_stay_packed() {
    let mut transient = TransientTreeList::with_branching_factor(4).unwrap();
    for value in 0..64 {
        transient.push_back(value);
    }
    assert_eq!(transient.height(), 3);
    assert!(transient.validate(ValidationRule::RequirePacked).is_ok());

    let published = transient.persistent();
    assert_eq!(published.len(), 64);
    assert_eq!(published.last(), Some(&63));
}

#[rstest]
fn test_trim_excess_after_publish() {
    let mut transient = TransientTreeList::with_branching_factor(3).unwrap();
    for value in 0..30 {
        transient.insert(0, value).unwrap();
    }
    let before = transient.to_persistent();
    assert!(transient.trim_excess());
    assert!(!transient.trim_excess());
    assert!(transient.validate(ValidationRule::RequirePacked).is_ok());
    assert_eq!(before.to_vec(), transient.to_persistent().to_vec());
}

#[rstest]
fn test_sort_and_pop_front() {
    let mut transient: TransientTreeList<i32> = [3, 1, 2].into_iter().collect();
    transient.sort();
    assert_eq!(transient.pop_front(), Some(1));
    assert_eq!(transient.first(), Some(&2));
    assert_eq!(transient.binary_search(&3), Ok(1));
}

#[rstest]
fn test_windowed_queries_match_persistent_list() {
    let values = [4, 8, 15, 16, 23, 42, 8];
    let transient: TransientTreeList<i32> = values.into_iter().collect();
    let persistent: PersistentTreeList<i32> = values.into_iter().collect();

    assert_eq!(transient.index_of_in(&8, 2, 5), persistent.index_of_in(&8, 2, 5));
    assert_eq!(transient.last_index_of(&8), Some(6));
    assert_eq!(transient.last_index_of_in(&8, 0, 6), Ok(Some(1)));
    assert_eq!(transient.find_index_in(3, 4, |value| value % 2 == 1), Ok(Some(4)));
    assert!(transient.find_last_index_in(5, 3, |_| true).is_err());
    assert_eq!(transient.find(|value| *value > 15), Some(&16));
    assert_eq!(transient.find_last(|value| *value < 10), Some(&8));
    assert!(transient.exists(|value| *value == 42));
    assert!(!transient.true_for_all(|value| *value < 42));
}

#[rstest]
fn test_derived_transients() {
    let transient: TransientTreeList<i32> = (0..10).collect();
    let evens = transient.find_all(|value| value % 2 == 0);
    let middle = transient.get_range(3, 4).unwrap();
    let doubled = transient.convert_all(|value| value * 2);

    assert_eq!(evens.persistent().to_vec(), vec![0, 2, 4, 6, 8]);
    assert_eq!(middle.persistent().to_vec(), vec![3, 4, 5, 6]);
    assert_eq!(doubled.last(), Some(&18));

    let mut destination = [0; 5];
    transient.copy_to(6, &mut destination, 1, 4).unwrap();
    assert_eq!(destination, [0, 6, 7, 8, 9]);

    let mut sum = 0;
    transient.for_each(|value| sum += value);
    assert_eq!(sum, 45);
    assert_eq!(
        transient.binary_search_by(2, 5, &4, &ordtree::compare::NaturalOrder),
        Ok(Ok(4))
    );
}

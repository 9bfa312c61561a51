//! A mutable list kept in the order of a comparer.

use std::fmt;

use super::list::TreeList;
use crate::compare::{Comparer, NaturalOrder, SearchBias};
use crate::engine::{Tree, TreeListIterator, ValidationRule, DEFAULT_BRANCHING_FACTOR};
use crate::error::{TreeError, check_branching_factor};

/// Sorts `items` stably with `comparer` and reports the source position of the
/// first value that repeats an earlier one, if any.
pub(crate) fn sort_detecting_duplicates<T, C>(items: Vec<T>, comparer: &C) -> (Vec<T>, Option<usize>)
where
    C: Comparer<T> + ?Sized,
{
    let mut indexed: Vec<(usize, T)> = items.into_iter().enumerate().collect();
    indexed.sort_by(|(_, left), (_, right)| comparer.compare(left, right));
    let duplicate = indexed
        .windows(2)
        .filter(|pair| comparer.compare(&pair[0].1, &pair[1].1).is_eq())
        .map(|pair| pair[1].0)
        .min();
    (indexed.into_iter().map(|(_, item)| item).collect(), duplicate)
}

/// An ordered multiset: a list whose items always stay sorted by a
/// per-instance [`Comparer`].
///
/// Positional insertion is not offered; [`add`](Self::add) places every new
/// item after all items that compare equal to it, so equal items keep their
/// insertion order. Lookups use the duplicate-aware search, which finds the
/// first or last item of a run of equal items in one descent making O(log n)
/// comparisons.
///
/// # Examples
///
/// ```rust
/// use ordtree::SortedTreeList;
///
/// let mut list: SortedTreeList<i32> = SortedTreeList::new();
/// for value in [5, 1, 3, 3, 9] {
///     list.add(value);
/// }
/// assert_eq!(list.iter().copied().collect::<Vec<_>>(), vec![1, 3, 3, 5, 9]);
/// assert_eq!(list.index_of(&3), Some(1));
/// assert_eq!(list.last_index_of(&3), Some(2));
/// assert_eq!(list.index_of(&4), None);
/// ```
pub struct SortedTreeList<T, C = NaturalOrder> {
    list: TreeList<T>,
    comparer: C,
}

impl<T, C: Comparer<T> + Default> SortedTreeList<T, C> {
    /// Creates an empty list ordered by `C::default()`.
    #[must_use]
    pub fn new() -> Self {
        Self::with_comparer(C::default())
    }

    /// Builds a sorted list from `items`, rejecting duplicates.
    ///
    /// # Errors
    ///
    /// [`TreeError::DuplicateKey`] with the position (in `items`) of the first
    /// item that compares equal to an earlier one.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ordtree::{SortedTreeList, TreeError};
    ///
    /// let unique: SortedTreeList<i32> = SortedTreeList::try_from_unique([3, 1, 2]).unwrap();
    /// assert_eq!(unique.first(), Some(&1));
    /// assert!(matches!(
    ///     SortedTreeList::<i32>::try_from_unique([3, 1, 3]),
    ///     Err(TreeError::DuplicateKey { position: 2 })
    /// ));
    /// ```
    pub fn try_from_unique<I>(items: I) -> Result<Self, TreeError>
    where
        I: IntoIterator<Item = T>,
    {
        Self::try_from_unique_with(items, C::default())
    }
}

impl<T, C: Comparer<T>> SortedTreeList<T, C> {
    /// Creates an empty list ordered by `comparer`.
    #[must_use]
    pub fn with_comparer(comparer: C) -> Self {
        Self {
            list: TreeList::new(),
            comparer,
        }
    }

    /// Creates an empty list ordered by `comparer` with the given branching
    /// factor.
    ///
    /// # Errors
    ///
    /// [`TreeError::InvalidBranchingFactor`] if `branching_factor < 2`.
    pub fn with_branching_factor(branching_factor: usize, comparer: C) -> Result<Self, TreeError> {
        Ok(Self {
            list: TreeList::with_branching_factor(branching_factor)?,
            comparer,
        })
    }

    /// Builds a packed, sorted list from `items` in any order.
    ///
    /// # Errors
    ///
    /// [`TreeError::InvalidBranchingFactor`] if `branching_factor < 2`.
    pub fn from_iter_with(
        items: impl IntoIterator<Item = T>,
        branching_factor: usize,
        comparer: C,
    ) -> Result<Self, TreeError> {
        check_branching_factor(branching_factor)?;
        let mut items: Vec<T> = items.into_iter().collect();
        items.sort_by(|left, right| comparer.compare(left, right));
        Ok(Self::from_sorted(Tree::packed(items, branching_factor), comparer))
    }

    /// Like [`try_from_unique`](Self::try_from_unique) with an explicit
    /// comparer.
    ///
    /// # Errors
    ///
    /// [`TreeError::DuplicateKey`] with the position of the first duplicate.
    pub fn try_from_unique_with<I>(items: I, comparer: C) -> Result<Self, TreeError>
    where
        I: IntoIterator<Item = T>,
    {
        let (sorted, duplicate) = sort_detecting_duplicates(items.into_iter().collect(), &comparer);
        if let Some(position) = duplicate {
            return Err(TreeError::DuplicateKey { position });
        }
        Ok(Self::from_sorted(Tree::packed(sorted, DEFAULT_BRANCHING_FACTOR), comparer))
    }

    fn from_sorted(tree: Tree<T>, comparer: C) -> Self {
        Self {
            list: TreeList::from_tree(tree),
            comparer,
        }
    }

    /// Returns the comparer that orders this list.
    pub const fn comparer(&self) -> &C {
        &self.comparer
    }

    /// Returns the number of items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.list.len()
    }

    /// Returns `true` if the list holds no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    /// Returns the maximum number of entries per node.
    #[must_use]
    pub const fn branching_factor(&self) -> usize {
        self.list.branching_factor()
    }

    /// Returns the number of node levels.
    #[must_use]
    pub fn height(&self) -> usize {
        self.list.height()
    }

    /// Returns the mutation counter of the underlying list.
    #[must_use]
    pub const fn version(&self) -> u64 {
        self.list.version()
    }

    /// Returns the item at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&T> {
        self.list.get(index)
    }

    /// Returns the smallest item.
    #[must_use]
    pub fn first(&self) -> Option<&T> {
        self.list.first()
    }

    /// Returns the largest item.
    #[must_use]
    pub fn last(&self) -> Option<&T> {
        self.list.last()
    }

    /// Returns an iterator over the items in ascending order.
    pub fn iter(&self) -> TreeListIterator<'_, T> {
        self.list.iter()
    }

    /// Returns an iterator over `count` items starting at `start`.
    ///
    /// # Errors
    ///
    /// [`TreeError::RangeOutOfBounds`] if the window exceeds the list.
    pub fn range(&self, start: usize, count: usize) -> Result<TreeListIterator<'_, T>, TreeError> {
        self.list.range(start, count)
    }

    /// Returns the index of the first item not ordered before `value`.
    pub fn lower_bound(&self, value: &T) -> usize {
        self.list.tree().biased_search(value, &self.comparer, SearchBias::First).0
    }

    /// Returns the index of the first item ordered after `value`.
    pub fn upper_bound(&self, value: &T) -> usize {
        self.list.tree().biased_search(value, &self.comparer, SearchBias::Last).0
    }

    /// Returns the index of the first item equal to `value`.
    pub fn index_of(&self, value: &T) -> Option<usize> {
        let (point, matched) = self.list.tree().biased_search(value, &self.comparer, SearchBias::First);
        matched.then_some(point)
    }

    /// Returns the index of the last item equal to `value`.
    pub fn last_index_of(&self, value: &T) -> Option<usize> {
        let (point, matched) = self.list.tree().biased_search(value, &self.comparer, SearchBias::Last);
        matched.then(|| point - 1)
    }

    /// Returns `true` if an item equal to `value` is present.
    pub fn contains(&self, value: &T) -> bool {
        self.index_of(value).is_some()
    }

    /// Returns how many items are equal to `value`.
    pub fn count_of(&self, value: &T) -> usize {
        self.upper_bound(value) - self.lower_bound(value)
    }

    /// Binary-searches for `value` with the list's comparer.
    ///
    /// Among equal items, any one of their indexes may be returned; use
    /// [`index_of`](Self::index_of) or [`last_index_of`](Self::last_index_of)
    /// for a specific end of the run.
    pub fn binary_search(&self, value: &T) -> Result<usize, usize> {
        self.list
            .tree()
            .search_window(0, self.len(), |item| self.comparer.compare(item, value))
    }

    /// Checks the structure of the tree.
    ///
    /// # Errors
    ///
    /// [`TreeError::InvariantViolation`] describing the first broken
    /// invariant.
    pub fn validate(&self, rule: ValidationRule) -> Result<(), TreeError> {
        self.list.validate(rule)
    }

    /// Removes every item.
    pub fn clear(&mut self) {
        self.list.clear();
    }
}

impl<T: Clone, C: Comparer<T>> SortedTreeList<T, C> {
    /// Adds `value` after every item equal to it and returns its index.
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn add(&mut self, value: T) -> usize {
        let index = self.upper_bound(&value);
        self.list.insert(index, value).ok();
        index
    }

    /// Removes the first item equal to `value`. Returns `false` if there was
    /// none.
    pub fn remove(&mut self, value: &T) -> bool {
        self.index_of(value)
            .is_some_and(|index| self.list.remove_at(index).is_ok())
    }

    /// Removes and returns the item at `index`.
    ///
    /// # Errors
    ///
    /// [`TreeError::IndexOutOfRange`] if `index >= len()`.
    pub fn remove_at(&mut self, index: usize) -> Result<T, TreeError> {
        self.list.remove_at(index)
    }

    /// Removes `count` items starting at `start`.
    ///
    /// # Errors
    ///
    /// [`TreeError::RangeOutOfBounds`] if the window exceeds the list.
    pub fn remove_range(&mut self, start: usize, count: usize) -> Result<(), TreeError> {
        self.list.remove_range(start, count)
    }

    /// Removes every item matching `predicate`, returning how many went.
    pub fn remove_all<P>(&mut self, predicate: P) -> usize
    where
        P: FnMut(&T) -> bool,
    {
        self.list.remove_all(predicate)
    }

    /// Repacks the tree. See [`TreeList::trim_excess`].
    pub fn trim_excess(&mut self) -> bool {
        self.list.trim_excess()
    }

    /// Returns the items as a `Vec`, in ascending order.
    #[must_use]
    pub fn to_vec(&self) -> Vec<T> {
        self.list.to_vec()
    }
}

impl<T: Clone, C: Comparer<T> + Clone> SortedTreeList<T, C> {
    /// Returns a new sorted list holding `count` items starting at `start`.
    ///
    /// # Errors
    ///
    /// [`TreeError::RangeOutOfBounds`] if the window exceeds the list.
    pub fn get_range(&self, start: usize, count: usize) -> Result<Self, TreeError> {
        Ok(Self {
            list: self.list.get_range(start, count)?,
            comparer: self.comparer.clone(),
        })
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

impl<T, C: Comparer<T> + Default> Default for SortedTreeList<T, C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, C: Clone> Clone for SortedTreeList<T, C> {
    fn clone(&self) -> Self {
        Self {
            list: self.list.clone(),
            comparer: self.comparer.clone(),
        }
    }
}

impl<T: fmt::Debug, C> fmt::Debug for SortedTreeList<T, C> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_list().entries(self.list.iter()).finish()
    }
}

impl<T, C: Comparer<T> + Default> FromIterator<T> for SortedTreeList<T, C> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let comparer = C::default();
        let mut items: Vec<T> = iter.into_iter().collect();
        items.sort_by(|left, right| comparer.compare(left, right));
        Self::from_sorted(Tree::packed(items, DEFAULT_BRANCHING_FACTOR), comparer)
    }
}

impl<'a, T, C> IntoIterator for &'a SortedTreeList<T, C> {
    type Item = &'a T;
    type IntoIter = TreeListIterator<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.list.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compare::{FnComparer, ReverseOrder};
    use rstest::rstest;

    #[rstest]
    fn test_add_keeps_order_and_inserts_after_equals() {
        let by_key = FnComparer(|left: &(i32, char), right: &(i32, char)| left.0.cmp(&right.0));
        let mut list = SortedTreeList::with_branching_factor(3, by_key).unwrap();
        assert_eq!(list.add((2, 'a')), 0);
        assert_eq!(list.add((1, 'b')), 0);
        assert_eq!(list.add((2, 'c')), 2);
        assert_eq!(list.add((2, 'd')), 3);
        assert_eq!(list.add((0, 'e')), 0);
        assert_eq!(
            list.to_vec(),
            vec![(0, 'e'), (1, 'b'), (2, 'a'), (2, 'c'), (2, 'd')]
        );
    }

    #[rstest]
    fn test_occurrence_queries() {
        let list: SortedTreeList<i32> = [7, 1, 3, 3, 3, 9, 3].into_iter().collect();
        assert_eq!(list.index_of(&3), Some(1));
        assert_eq!(list.last_index_of(&3), Some(4));
        assert_eq!(list.count_of(&3), 4);
        assert_eq!(list.count_of(&4), 0);
        assert_eq!(list.lower_bound(&4), 5);
        assert_eq!(list.upper_bound(&9), 7);
        assert_eq!(list.index_of(&8), None);
        assert_eq!(list.last_index_of(&0), None);
        assert!(matches!(list.binary_search(&3), Ok(index) if (1..=4).contains(&index)));
        assert_eq!(list.binary_search(&8), Err(6));
    }

    #[rstest]
    fn test_remove_takes_first_occurrence() {
        let mut list: SortedTreeList<i32> = [2, 1, 2, 3].into_iter().collect();
        assert!(list.remove(&2));
        assert_eq!(list.to_vec(), vec![1, 2, 3]);
        assert!(!list.remove(&5));
    }

    #[rstest]
    fn test_reverse_comparer() {
        let mut list = SortedTreeList::with_comparer(ReverseOrder(NaturalOrder));
        for value in [1, 5, 3] {
            list.add(value);
        }
        assert_eq!(list.to_vec(), vec![5, 3, 1]);
        assert_eq!(list.index_of(&1), Some(2));
    }

    #[rstest]
    fn test_try_from_unique_reports_earliest_duplicate() {
        let result = SortedTreeList::<i32>::try_from_unique([5, 4, 9, 4, 5]);
        assert_eq!(result.err(), Some(TreeError::DuplicateKey { position: 3 }));
    }

    #[rstest]
    fn test_get_range_is_independent() {
        let mut list =
            SortedTreeList::from_iter_with(0..100, 4, NaturalOrder).unwrap();
        let range = list.get_range(10, 80).unwrap();
        list.add(50);
        assert_eq!(range.len(), 80);
        assert_eq!(range.first(), Some(&10));
        assert_eq!(range.count_of(&50), 1);
        assert_eq!(list.count_of(&50), 2);
    }
}

//! The mutable, index-addressable list.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};

use super::cursor::TreeListCursor;
use crate::compare::{Comparer, NaturalOrder};
use crate::engine::{Tree, TreeListIntoIterator, TreeListIterator, ValidationRule};
use crate::error::{TreeError, check_branching_factor};

/// A mutable list backed by an order-statistics B-tree.
///
/// Indexed access, insertion and removal anywhere in the list are
/// O(log n). Nodes split eagerly when they overflow but are never merged when
/// they shrink; [`trim_excess`](Self::trim_excess) repacks the tree on demand.
///
/// Every structural mutation increments [`version`](Self::version), which
/// lets a [`TreeListCursor`] detect that the list changed under it.
///
/// Cloning a `TreeList` is O(1): the clone shares every node with the
/// original, and whichever list is mutated first copies the nodes on its
/// mutation path.
///
/// # Examples
///
/// ```rust
/// use ordtree::TreeList;
///
/// let mut list = TreeList::new();
/// list.push_back(2);
/// list.push_back(3);
/// list.push_front(1);
/// list.insert(3, 4).unwrap();
///
/// assert_eq!(list.len(), 4);
/// assert_eq!(list.get(2), Some(&3));
/// assert_eq!(list.iter().copied().collect::<Vec<_>>(), vec![1, 2, 3, 4]);
/// ```
pub struct TreeList<T> {
    tree: Tree<T>,
    identity: u64,
    version: u64,
}

/// Source of list identities; every list, clones included, takes a fresh one.
static NEXT_IDENTITY: AtomicU64 = AtomicU64::new(0);

fn next_identity() -> u64 {
    NEXT_IDENTITY.fetch_add(1, Ordering::Relaxed)
}

impl<T> TreeList<T> {
    /// Creates an empty list with the default branching factor.
    #[must_use]
    pub fn new() -> Self {
        Self::from_tree(Tree::with_default_factor())
    }

    /// Creates an empty list whose nodes hold at most `branching_factor`
    /// entries.
    ///
    /// # Errors
    ///
    /// [`TreeError::InvalidBranchingFactor`] if `branching_factor < 2`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ordtree::{TreeError, TreeList};
    ///
    /// let list: TreeList<u8> = TreeList::with_branching_factor(3).unwrap();
    /// assert_eq!(list.branching_factor(), 3);
    /// assert!(matches!(
    ///     TreeList::<u8>::with_branching_factor(1),
    ///     Err(TreeError::InvalidBranchingFactor { branching_factor: 1 })
    /// ));
    /// ```
    pub fn with_branching_factor(branching_factor: usize) -> Result<Self, TreeError> {
        Tree::new(branching_factor).map(Self::from_tree)
    }

    /// Builds a packed list of `items` with the given branching factor.
    ///
    /// # Errors
    ///
    /// [`TreeError::InvalidBranchingFactor`] if `branching_factor < 2`.
    pub fn from_iter_with_branching_factor<I>(items: I, branching_factor: usize) -> Result<Self, TreeError>
    where
        I: IntoIterator<Item = T>,
    {
        check_branching_factor(branching_factor)?;
        Ok(Self::from_tree(Tree::packed(items.into_iter().collect(), branching_factor)))
    }

    pub(crate) fn from_tree(tree: Tree<T>) -> Self {
        Self {
            tree,
            identity: next_identity(),
            version: 0,
        }
    }

    pub(crate) const fn tree(&self) -> &Tree<T> {
        &self.tree
    }

    pub(crate) const fn identity(&self) -> u64 {
        self.identity
    }

    fn touch(&mut self) {
        self.version = self.version.wrapping_add(1);
    }

    /// Returns the number of items.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.tree.len()
    }

    /// Returns `true` if the list holds no items.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// Returns the maximum number of entries per node.
    #[inline]
    #[must_use]
    pub const fn branching_factor(&self) -> usize {
        self.tree.branching_factor()
    }

    /// Returns the number of node levels; an empty or single-leaf list has
    /// height 1.
    #[must_use]
    pub fn height(&self) -> usize {
        self.tree.height()
    }

    /// Returns the mutation counter.
    ///
    /// Every structural mutation (insert, remove, set, sort, reverse, clear,
    /// and a [`trim_excess`](Self::trim_excess) that rebuilds) increments it.
    #[inline]
    #[must_use]
    pub const fn version(&self) -> u64 {
        self.version
    }

    /// Returns a fail-fast cursor positioned before the first item.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ordtree::{TreeError, TreeList};
    ///
    /// let mut list: TreeList<i32> = (1..=3).collect();
    /// let mut cursor = list.cursor();
    /// assert_eq!(cursor.move_next(&list), Ok(true));
    /// assert_eq!(cursor.current(), Some(&1));
    ///
    /// list.push_back(4);
    /// assert!(matches!(cursor.move_next(&list), Err(TreeError::VersionMismatch { .. })));
    /// assert_eq!(cursor.current(), Some(&1));
    /// ```
    #[must_use]
    pub const fn cursor(&self) -> TreeListCursor<T> {
        TreeListCursor::new(self.identity, self.version)
    }

    /// Returns the item at `index`, or `None` when out of range.
    ///
    /// # Complexity
    ///
    /// O(log n)
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&T> {
        self.tree.get(index)
    }

    /// Returns the first item.
    #[must_use]
    pub fn first(&self) -> Option<&T> {
        self.tree.get(0)
    }

    /// Returns the last item.
    #[must_use]
    pub fn last(&self) -> Option<&T> {
        self.len().checked_sub(1).and_then(|index| self.tree.get(index))
    }

    /// Returns an iterator over the items in index order.
    pub fn iter(&self) -> TreeListIterator<'_, T> {
        self.tree.iter()
    }

    /// Returns an iterator over `count` items starting at `start`.
    ///
    /// # Errors
    ///
    /// [`TreeError::RangeOutOfBounds`] if the window exceeds the list.
    pub fn range(&self, start: usize, count: usize) -> Result<TreeListIterator<'_, T>, TreeError> {
        self.tree.range(start, count)
    }

    /// Returns the index of the first item matching `predicate`.
    pub fn find_index<P>(&self, predicate: P) -> Option<usize>
    where
        P: FnMut(&T) -> bool,
    {
        self.iter().position(predicate)
    }

    /// Returns the index of the first item in `[start, start + count)`
    /// matching `predicate`.
    ///
    /// # Errors
    ///
    /// [`TreeError::RangeOutOfBounds`] if the window exceeds the list.
    pub fn find_index_in<P>(&self, start: usize, count: usize, predicate: P) -> Result<Option<usize>, TreeError>
    where
        P: FnMut(&T) -> bool,
    {
        self.tree.find_index_in(start, count, predicate)
    }

    /// Returns the index of the last item matching `predicate`.
    pub fn find_last_index<P>(&self, predicate: P) -> Option<usize>
    where
        P: FnMut(&T) -> bool,
    {
        self.iter().rposition(predicate)
    }

    /// Returns the index of the last item in `[start, start + count)`
    /// matching `predicate`.
    ///
    /// # Errors
    ///
    /// [`TreeError::RangeOutOfBounds`] if the window exceeds the list.
    pub fn find_last_index_in<P>(&self, start: usize, count: usize, predicate: P) -> Result<Option<usize>, TreeError>
    where
        P: FnMut(&T) -> bool,
    {
        self.tree.find_last_index_in(start, count, predicate)
    }

    /// Returns the first item matching `predicate`.
    pub fn find<P>(&self, mut predicate: P) -> Option<&T>
    where
        P: FnMut(&T) -> bool,
    {
        self.iter().find(|item| predicate(*item))
    }

    /// Returns the last item matching `predicate`.
    pub fn find_last<P>(&self, mut predicate: P) -> Option<&T>
    where
        P: FnMut(&T) -> bool,
    {
        self.iter().rev().find(|item| predicate(*item))
    }

    /// Returns `true` if any item matches `predicate`.
    pub fn exists<P>(&self, predicate: P) -> bool
    where
        P: FnMut(&T) -> bool,
    {
        self.find_index(predicate).is_some()
    }

    /// Returns `true` if every item matches `predicate` (vacuously true for an
    /// empty list).
    pub fn true_for_all<P>(&self, predicate: P) -> bool
    where
        P: FnMut(&T) -> bool,
    {
        self.iter().all(predicate)
    }

    /// Returns the index of the first item equal to `value`.
    pub fn index_of(&self, value: &T) -> Option<usize>
    where
        T: PartialEq,
    {
        self.find_index(|item| item == value)
    }

    /// Returns the index of the first item in `[start, start + count)` equal
    /// to `value`.
    ///
    /// # Errors
    ///
    /// [`TreeError::RangeOutOfBounds`] if the window exceeds the list.
    pub fn index_of_in(&self, value: &T, start: usize, count: usize) -> Result<Option<usize>, TreeError>
    where
        T: PartialEq,
    {
        self.find_index_in(start, count, |item| item == value)
    }

    /// Returns the index of the last item equal to `value`.
    pub fn last_index_of(&self, value: &T) -> Option<usize>
    where
        T: PartialEq,
    {
        self.find_last_index(|item| item == value)
    }

    /// Returns the index of the last item in `[start, start + count)` equal to
    /// `value`.
    ///
    /// # Errors
    ///
    /// [`TreeError::RangeOutOfBounds`] if the window exceeds the list.
    pub fn last_index_of_in(&self, value: &T, start: usize, count: usize) -> Result<Option<usize>, TreeError>
    where
        T: PartialEq,
    {
        self.find_last_index_in(start, count, |item| item == value)
    }

    /// Returns `true` if some item equals `value`.
    pub fn contains(&self, value: &T) -> bool
    where
        T: PartialEq,
    {
        self.index_of(value).is_some()
    }

    /// Binary-searches a list sorted by [`Ord`].
    ///
    /// Returns `Ok(index)` of an equal item or `Err(point)` with the position
    /// where `value` would be inserted to keep the order.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ordtree::TreeList;
    ///
    /// let list: TreeList<i32> = [1, 3, 5, 7].into_iter().collect();
    /// assert_eq!(list.binary_search(&5), Ok(2));
    /// assert_eq!(list.binary_search(&4), Err(2));
    /// ```
    pub fn binary_search(&self, value: &T) -> Result<usize, usize>
    where
        T: Ord,
    {
        self.tree
            .search_window(0, self.len(), |item| NaturalOrder.compare(item, value))
    }

    /// Binary-searches `[index, index + count)` of a list sorted by
    /// `comparer`.
    ///
    /// # Errors
    ///
    /// [`TreeError::RangeOutOfBounds`] if the window exceeds the list.
    pub fn binary_search_by<C>(
        &self,
        index: usize,
        count: usize,
        value: &T,
        comparer: &C,
    ) -> Result<Result<usize, usize>, TreeError>
    where
        C: Comparer<T> + ?Sized,
    {
        self.tree.binary_search_by(index, count, value, comparer)
    }

    /// Calls `action` on every item in index order.
    pub fn for_each<F>(&self, action: F)
    where
        F: FnMut(&T),
    {
        self.iter().for_each(action);
    }

    /// Returns a new list holding `map` applied to every item, with the same
    /// branching factor.
    pub fn convert_all<U, F>(&self, map: F) -> TreeList<U>
    where
        F: FnMut(&T) -> U,
    {
        TreeList::from_tree(self.tree.convert(map))
    }

    /// Copies `count` items starting at `start` into
    /// `destination[offset..offset + count]`.
    ///
    /// # Errors
    ///
    /// [`TreeError::RangeOutOfBounds`] if the source window exceeds the list,
    /// [`TreeError::DestinationTooSmall`] if `destination` is shorter than
    /// `offset + count`. Nothing is written on error.
    pub fn copy_to(&self, start: usize, destination: &mut [T], offset: usize, count: usize) -> Result<(), TreeError>
    where
        T: Clone,
    {
        self.tree.copy_to(start, destination, offset, count)
    }

    /// Checks the structure of the tree.
    ///
    /// # Errors
    ///
    /// [`TreeError::InvariantViolation`] describing the first broken
    /// invariant.
    pub fn validate(&self, rule: ValidationRule) -> Result<(), TreeError> {
        self.tree.validate(rule)
    }

    /// Removes every item.
    pub fn clear(&mut self) {
        self.tree.clear();
        self.touch();
    }
}

impl<T: Clone> TreeList<T> {
    /// Replaces the item at `index`, returning the previous one.
    ///
    /// # Errors
    ///
    /// [`TreeError::IndexOutOfRange`] if `index >= len()`.
    pub fn set(&mut self, index: usize, value: T) -> Result<T, TreeError> {
        let previous = self.tree.set(index, value)?;
        self.touch();
        Ok(previous)
    }

    /// Inserts `value` at `index`, shifting later items right.
    ///
    /// `index == len()` appends.
    ///
    /// # Errors
    ///
    /// [`TreeError::IndexOutOfRange`] if `index > len()`.
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn insert(&mut self, index: usize, value: T) -> Result<(), TreeError> {
        self.tree.insert(index, value)?;
        self.touch();
        Ok(())
    }

    /// Appends `value`.
    pub fn push_back(&mut self, value: T) {
        self.tree.push_back(value);
        self.touch();
    }

    /// Prepends `value`.
    pub fn push_front(&mut self, value: T) {
        self.tree.insert(0, value).ok();
        self.touch();
    }

    /// Inserts every item of `values` at `index`, keeping their order.
    ///
    /// An empty `values` leaves the version untouched.
    ///
    /// # Errors
    ///
    /// [`TreeError::IndexOutOfRange`] if `index > len()`.
    pub fn insert_range<I>(&mut self, index: usize, values: I) -> Result<(), TreeError>
    where
        I: IntoIterator<Item = T>,
    {
        let before = self.len();
        self.tree.insert_range(index, values)?;
        if self.len() != before {
            self.touch();
        }
        Ok(())
    }

    /// Removes and returns the item at `index`.
    ///
    /// # Errors
    ///
    /// [`TreeError::IndexOutOfRange`] if `index >= len()`.
    pub fn remove_at(&mut self, index: usize) -> Result<T, TreeError> {
        let removed = self.tree.remove_at(index)?;
        self.touch();
        Ok(removed)
    }

    /// Removes `count` items starting at `start`.
    ///
    /// # Errors
    ///
    /// [`TreeError::RangeOutOfBounds`] if the window exceeds the list.
    pub fn remove_range(&mut self, start: usize, count: usize) -> Result<(), TreeError> {
        self.tree.remove_range(start, count)?;
        if count > 0 {
            self.touch();
        }
        Ok(())
    }

    /// Removes every item matching `predicate` and returns how many were
    /// removed.
    pub fn remove_all<P>(&mut self, predicate: P) -> usize
    where
        P: FnMut(&T) -> bool,
    {
        let removed = self.tree.remove_all(predicate);
        if removed > 0 {
            self.touch();
        }
        removed
    }

    /// Removes and returns the last item.
    pub fn pop_back(&mut self) -> Option<T> {
        let index = self.len().checked_sub(1)?;
        self.remove_at(index).ok()
    }

    /// Removes and returns the first item.
    pub fn pop_front(&mut self) -> Option<T> {
        if self.is_empty() {
            return None;
        }
        self.remove_at(0).ok()
    }

    /// Returns a new list holding clones of `count` items starting at `start`.
    ///
    /// # Errors
    ///
    /// [`TreeError::RangeOutOfBounds`] if the window exceeds the list.
    pub fn get_range(&self, start: usize, count: usize) -> Result<Self, TreeError> {
        self.tree.get_range(start, count).map(Self::from_tree)
    }

    /// Returns a new list holding clones of every item matching `predicate`.
    pub fn find_all<P>(&self, predicate: P) -> Self
    where
        P: FnMut(&T) -> bool,
    {
        Self::from_tree(self.tree.find_all(predicate))
    }

    /// Sorts the list by [`Ord`]. The sort is stable.
    pub fn sort(&mut self)
    where
        T: Ord,
    {
        self.sort_by(&NaturalOrder);
    }

    /// Sorts the list with `comparer`. The sort is stable.
    pub fn sort_by<C>(&mut self, comparer: &C)
    where
        C: Comparer<T> + ?Sized,
    {
        self.sort_range(0, self.len(), comparer).ok();
    }

    /// Sorts `count` items starting at `index` with `comparer`.
    ///
    /// Windows shorter than two items leave the version untouched.
    ///
    /// # Errors
    ///
    /// [`TreeError::RangeOutOfBounds`] if the window exceeds the list.
    pub fn sort_range<C>(&mut self, index: usize, count: usize, comparer: &C) -> Result<(), TreeError>
    where
        C: Comparer<T> + ?Sized,
    {
        self.tree.sort_range(index, count, comparer)?;
        if count > 1 {
            self.touch();
        }
        Ok(())
    }

    /// Reverses the order of the items.
    pub fn reverse(&mut self) {
        self.reverse_range(0, self.len()).ok();
    }

    /// Reverses `count` items starting at `index`.
    ///
    /// # Errors
    ///
    /// [`TreeError::RangeOutOfBounds`] if the window exceeds the list.
    pub fn reverse_range(&mut self, index: usize, count: usize) -> Result<(), TreeError> {
        self.tree.reverse_range(index, count)?;
        if count > 1 {
            self.touch();
        }
        Ok(())
    }

    /// Repacks the tree so every node but the last on each level is full,
    /// restoring the minimal height.
    ///
    /// Returns `false`, leaving the list and its version untouched, when the
    /// tree was already packed.
    ///
    /// # Complexity
    ///
    /// O(n) when a rebuild happens, O(n) for the packed check otherwise.
    pub fn trim_excess(&mut self) -> bool {
        let rebuilt = self.tree.trim_excess();
        if rebuilt {
            self.touch();
        }
        rebuilt
    }

    /// Returns the items as a `Vec`.
    #[must_use]
    pub fn to_vec(&self) -> Vec<T> {
        self.iter().cloned().collect()
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

impl<T> Default for TreeList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for TreeList<T> {
    fn clone(&self) -> Self {
        Self {
            tree: self.tree.clone(),
            identity: next_identity(),
            version: self.version,
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for TreeList<T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_list().entries(self.iter()).finish()
    }
}

impl<T: PartialEq> PartialEq for TreeList<T> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<T: Eq> Eq for TreeList<T> {}

impl<T: Hash> Hash for TreeList<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.len().hash(state);
        for item in self {
            item.hash(state);
        }
    }
}

impl<T> FromIterator<T> for TreeList<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::from_tree(Tree::packed(
            iter.into_iter().collect(),
            crate::DEFAULT_BRANCHING_FACTOR,
        ))
    }
}

impl<T: Clone> Extend<T> for TreeList<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        let index = self.len();
        self.insert_range(index, iter).ok();
    }
}

impl<T: Clone> IntoIterator for TreeList<T> {
    type Item = T;
    type IntoIter = TreeListIntoIterator<T>;

    fn into_iter(self) -> Self::IntoIter {
        TreeListIntoIterator::new(self.tree.into_vec())
    }
}

impl<'a, T> IntoIterator for &'a TreeList<T> {
    type Item = &'a T;
    type IntoIter = TreeListIterator<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

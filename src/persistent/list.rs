//! Persistent (immutable) indexed list.
//!
//! This module provides [`PersistentTreeList`], an immutable list backed by
//! the same order-statistics B-tree as [`TreeList`](crate::TreeList).
//!
//! # Overview
//!
//! Every update returns a new list and leaves the original untouched. An
//! update copies only the nodes on the root-to-leaf path it changes (at most
//! `height()` nodes); every other subtree is shared between the old and the
//! new list.
//!
//! - O(log n) `get`, `set`, `insert`, `remove_at`
//! - O(1) `clone` and [`ptr_eq`](PersistentTreeList::ptr_eq)
//! - O(1) conversion to a [`TransientTreeList`] for batches of updates
//!
//! # Examples
//!
//! ```rust
//! use ordtree::PersistentTreeList;
//!
//! let list: PersistentTreeList<i32> = (1..=5).collect();
//! let updated = list.set(2, 30).unwrap();
//! let shorter = updated.remove_at(0).unwrap();
//!
//! assert_eq!(list.get(2), Some(&3));
//! assert_eq!(updated.get(2), Some(&30));
//! assert_eq!(shorter.to_vec(), vec![2, 30, 4, 5]);
//! ```

use std::fmt;
use std::hash::{Hash, Hasher};

use super::TransientTreeList;
use crate::compare::{Comparer, NaturalOrder};
use crate::engine::{Tree, TreeListIntoIterator, TreeListIterator, ValidationRule};
use crate::error::{TreeError, check_branching_factor};

// =============================================================================
// PersistentTreeList Definition
// =============================================================================

/// An immutable list backed by an order-statistics B-tree with structural
/// sharing.
///
/// Nodes are shared through reference counting and never change once another
/// list can see them, so every version of a list stays valid for as long as
/// it is alive.
///
/// # Time Complexity
///
/// | Operation          | Complexity |
/// |--------------------|------------|
/// | `get`              | O(log n)   |
/// | `set`              | O(log n)   |
/// | `insert`           | O(log n)   |
/// | `remove_at`        | O(log n)   |
/// | `push_back`        | O(log n)   |
/// | `get_range`        | O(n)       |
/// | `sort` / `reverse` | O(n log n) / O(n) |
/// | `clone`, `ptr_eq`  | O(1)       |
///
/// # Examples
///
/// ```rust
/// use ordtree::PersistentTreeList;
///
/// let empty = PersistentTreeList::new();
/// let one = empty.push_back(1);
/// let two = one.push_back(2);
///
/// assert!(empty.is_empty());
/// assert_eq!(one.len(), 1);
/// assert_eq!(two.iter().copied().collect::<Vec<_>>(), vec![1, 2]);
/// ```
pub struct PersistentTreeList<T> {
    tree: Tree<T>,
}

#[cfg(feature = "arc")]
static_assertions::assert_impl_all!(PersistentTreeList<i32>: Send, Sync);

impl<T> PersistentTreeList<T> {
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

    pub(crate) const fn from_tree(tree: Tree<T>) -> Self {
        Self { tree }
    }

    pub(crate) const fn tree(&self) -> &Tree<T> {
        &self.tree
    }

    /// Returns the number of items.
    ///
    /// # Complexity
    ///
    /// O(1)
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

    /// Returns the number of node levels.
    #[must_use]
    pub fn height(&self) -> usize {
        self.tree.height()
    }

    /// Returns `true` if both lists share the same root node, which implies
    /// equal content.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ordtree::PersistentTreeList;
    ///
    /// let list: PersistentTreeList<i32> = (0..10).collect();
    /// let same = list.clone();
    /// let changed = list.set(0, 0).unwrap();
    ///
    /// assert!(list.ptr_eq(&same));
    /// assert!(!list.ptr_eq(&changed));
    /// assert_eq!(list, changed);
    /// ```
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        self.tree.ptr_eq(&other.tree)
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

    /// Returns `true` if every item matches `predicate`.
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

    /// Returns a new list holding `map` applied to every item.
    pub fn convert_all<U, F>(&self, map: F) -> PersistentTreeList<U>
    where
        F: FnMut(&T) -> U,
    {
        PersistentTreeList::from_tree(self.tree.convert(map))
    }

    /// Copies `count` items starting at `start` into
    /// `destination[offset..offset + count]`.
    ///
    /// # Errors
    ///
    /// [`TreeError::RangeOutOfBounds`] if the source window exceeds the list,
    /// [`TreeError::DestinationTooSmall`] if `destination` is too short.
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

    /// Returns an empty list with the same branching factor.
    #[must_use]
    pub fn clear(&self) -> Self {
        let mut tree = self.tree.clone();
        tree.clear();
        Self::from_tree(tree)
    }
}

impl<T: Clone> PersistentTreeList<T> {
    fn updated<F>(&self, update: F) -> Result<Self, TreeError>
    where
        F: FnOnce(&mut Tree<T>) -> Result<(), TreeError>,
    {
        let mut tree = self.tree.clone();
        update(&mut tree)?;
        Ok(Self::from_tree(tree))
    }

    /// Returns a list with the item at `index` replaced by `value`.
    ///
    /// # Errors
    ///
    /// [`TreeError::IndexOutOfRange`] if `index >= len()`.
    ///
    /// # Complexity
    ///
    /// O(log n), copying `height()` nodes
    pub fn set(&self, index: usize, value: T) -> Result<Self, TreeError> {
        self.updated(|tree| tree.set(index, value).map(drop))
    }

    /// Returns a list with `value` inserted at `index`.
    ///
    /// # Errors
    ///
    /// [`TreeError::IndexOutOfRange`] if `index > len()`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ordtree::PersistentTreeList;
    ///
    /// let list: PersistentTreeList<char> = "ac".chars().collect();
    /// let filled = list.insert(1, 'b').unwrap();
    /// assert_eq!(filled.iter().collect::<String>(), "abc");
    /// assert_eq!(list.len(), 2);
    /// ```
    pub fn insert(&self, index: usize, value: T) -> Result<Self, TreeError> {
        self.updated(|tree| tree.insert(index, value))
    }

    /// Returns a list with `value` appended.
    #[must_use]
    pub fn push_back(&self, value: T) -> Self {
        let mut tree = self.tree.clone();
        tree.push_back(value);
        Self::from_tree(tree)
    }

    /// Returns a list with `value` prepended.
    #[must_use]
    pub fn push_front(&self, value: T) -> Self {
        let mut tree = self.tree.clone();
        tree.insert(0, value).ok();
        Self::from_tree(tree)
    }

    /// Returns a list with every item of `values` appended.
    #[must_use]
    pub fn extend<I>(&self, values: I) -> Self
    where
        I: IntoIterator<Item = T>,
    {
        let mut tree = self.tree.clone();
        for value in values {
            tree.push_back(value);
        }
        Self::from_tree(tree)
    }

    /// Returns a list with every item of `values` inserted at `index`.
    ///
    /// # Errors
    ///
    /// [`TreeError::IndexOutOfRange`] if `index > len()`.
    pub fn insert_range<I>(&self, index: usize, values: I) -> Result<Self, TreeError>
    where
        I: IntoIterator<Item = T>,
    {
        self.updated(|tree| tree.insert_range(index, values))
    }

    /// Returns a list with the item at `index` removed.
    ///
    /// # Errors
    ///
    /// [`TreeError::IndexOutOfRange`] if `index >= len()`.
    pub fn remove_at(&self, index: usize) -> Result<Self, TreeError> {
        self.updated(|tree| tree.remove_at(index).map(drop))
    }

    /// Returns a list without the `count` items starting at `start`.
    ///
    /// # Errors
    ///
    /// [`TreeError::RangeOutOfBounds`] if the window exceeds the list.
    pub fn remove_range(&self, start: usize, count: usize) -> Result<Self, TreeError> {
        self.updated(|tree| tree.remove_range(start, count))
    }

    /// Returns a list without the items matching `predicate`.
    ///
    /// When nothing matches, the result shares its root with `self`.
    #[must_use]
    pub fn remove_all<P>(&self, predicate: P) -> Self
    where
        P: FnMut(&T) -> bool,
    {
        let mut tree = self.tree.clone();
        tree.remove_all(predicate);
        Self::from_tree(tree)
    }

    /// Returns the list without its last item, together with that item.
    #[must_use]
    pub fn pop_back(&self) -> Option<(Self, T)> {
        let index = self.len().checked_sub(1)?;
        let mut tree = self.tree.clone();
        let item = tree.remove_at(index).ok()?;
        Some((Self::from_tree(tree), item))
    }

    /// Returns the list without its first item, together with that item.
    #[must_use]
    pub fn pop_front(&self) -> Option<(Self, T)> {
        if self.is_empty() {
            return None;
        }
        let mut tree = self.tree.clone();
        let item = tree.remove_at(0).ok()?;
        Some((Self::from_tree(tree), item))
    }

    /// Returns a new packed list of `count` items starting at `start`.
    ///
    /// # Errors
    ///
    /// [`TreeError::RangeOutOfBounds`] if the window exceeds the list.
    pub fn get_range(&self, start: usize, count: usize) -> Result<Self, TreeError> {
        self.tree.get_range(start, count).map(Self::from_tree)
    }

    /// Returns a new list of the items matching `predicate`.
    #[must_use]
    pub fn find_all<P>(&self, predicate: P) -> Self
    where
        P: FnMut(&T) -> bool,
    {
        Self::from_tree(self.tree.find_all(predicate))
    }

    /// Returns a stably sorted copy of the list.
    #[must_use]
    pub fn sort(&self) -> Self
    where
        T: Ord,
    {
        self.sort_by(&NaturalOrder)
    }

    /// Returns a copy of the list stably sorted with `comparer`.
    #[must_use]
    pub fn sort_by<C>(&self, comparer: &C) -> Self
    where
        C: Comparer<T> + ?Sized,
    {
        let mut tree = self.tree.clone();
        tree.sort_range(0, self.len(), comparer).ok();
        Self::from_tree(tree)
    }

    /// Returns a copy of the list with `count` items starting at `index`
    /// sorted with `comparer`.
    ///
    /// # Errors
    ///
    /// [`TreeError::RangeOutOfBounds`] if the window exceeds the list.
    pub fn sort_range<C>(&self, index: usize, count: usize, comparer: &C) -> Result<Self, TreeError>
    where
        C: Comparer<T> + ?Sized,
    {
        self.updated(|tree| tree.sort_range(index, count, comparer))
    }

    /// Returns the list in reverse order.
    #[must_use]
    pub fn reverse(&self) -> Self {
        let mut tree = self.tree.clone();
        tree.reverse_range(0, self.len()).ok();
        Self::from_tree(tree)
    }

    /// Returns a copy with `count` items starting at `index` reversed.
    ///
    /// # Errors
    ///
    /// [`TreeError::RangeOutOfBounds`] if the window exceeds the list.
    pub fn reverse_range(&self, index: usize, count: usize) -> Result<Self, TreeError> {
        self.updated(|tree| tree.reverse_range(index, count))
    }

    /// Returns a packed copy of the list.
    ///
    /// When the tree is already packed the result shares its root with
    /// `self`.
    #[must_use]
    pub fn trim_excess(&self) -> Self {
        let mut tree = self.tree.clone();
        tree.trim_excess();
        Self::from_tree(tree)
    }

    /// Returns the items as a `Vec`.
    #[must_use]
    pub fn to_vec(&self) -> Vec<T> {
        self.iter().cloned().collect()
    }

    /// Converts this list into a transient list for a batch of updates.
    ///
    /// The transient starts out sharing every node with `self`. Calling
    /// [`to_persistent`](TransientTreeList::to_persistent) before any update
    /// returns a list that is [`ptr_eq`](Self::ptr_eq) to `self`.
    ///
    /// # Complexity
    ///
    /// O(1)
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ordtree::PersistentTreeList;
    ///
    /// let list: PersistentTreeList<i32> = (0..3).collect();
    /// let mut transient = list.clone().transient();
    /// transient.push_back(3);
    /// transient.remove_at(0).unwrap();
    ///
    /// let updated = transient.persistent();
    /// assert_eq!(updated.to_vec(), vec![1, 2, 3]);
    /// assert_eq!(list.to_vec(), vec![0, 1, 2]);
    /// ```
    #[must_use]
    pub fn transient(self) -> TransientTreeList<T> {
        TransientTreeList::from_published(self)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

impl<T> Default for PersistentTreeList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for PersistentTreeList<T> {
    fn clone(&self) -> Self {
        Self {
            tree: self.tree.clone(),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for PersistentTreeList<T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_list().entries(self.iter()).finish()
    }
}

impl<T: PartialEq> PartialEq for PersistentTreeList<T> {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || (self.len() == other.len() && self.iter().eq(other.iter()))
    }
}

impl<T: Eq> Eq for PersistentTreeList<T> {}

impl<T: Hash> Hash for PersistentTreeList<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.len().hash(state);
        for item in self {
            item.hash(state);
        }
    }
}

impl<T> FromIterator<T> for PersistentTreeList<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::from_tree(Tree::packed(
            iter.into_iter().collect(),
            crate::DEFAULT_BRANCHING_FACTOR,
        ))
    }
}

impl<T: Clone> IntoIterator for PersistentTreeList<T> {
    type Item = T;
    type IntoIter = TreeListIntoIterator<T>;

    fn into_iter(self) -> Self::IntoIter {
        TreeListIntoIterator::new(self.tree.into_vec())
    }
}

impl<'a, T> IntoIterator for &'a PersistentTreeList<T> {
    type Item = &'a T;
    type IntoIter = TreeListIterator<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T> From<PersistentTreeList<T>> for crate::TreeList<T> {
    fn from(list: PersistentTreeList<T>) -> Self {
        Self::from_tree(list.tree)
    }
}

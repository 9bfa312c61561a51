//! Transient (temporarily mutable) builder for [`PersistentTreeList`].

use std::fmt;
use std::marker::PhantomData;
use std::rc::Rc;

use super::PersistentTreeList;
use crate::compare::{Comparer, NaturalOrder};
use crate::engine::{Tree, TreeListIterator, ValidationRule};
use crate::error::TreeError;

// =============================================================================
// TransientTreeList Definition
// =============================================================================

/// A transient (temporarily mutable) list for efficient batch updates.
///
/// A transient owns a private working tree and mutates it in place through
/// `&mut self`. Nodes it shares with a published [`PersistentTreeList`] are
/// copied the first time an update reaches them, so snapshots never change.
///
/// [`to_persistent`](Self::to_persistent) publishes a snapshot and keeps
/// working; calling it again before the next update returns the same snapshot.
/// [`persistent`](Self::persistent) consumes the transient.
///
/// # Design
///
/// - `PhantomData<Rc<()>>` ensures `!Send` and `!Sync`
/// - Does not implement `Clone`
///
/// # Examples
///
/// ```rust
/// use ordtree::TransientTreeList;
///
/// let mut transient = TransientTreeList::new();
/// for value in 0..100 {
///     transient.push_back(value);
/// }
/// let snapshot = transient.to_persistent();
/// transient.set(0, -1).unwrap();
///
/// assert_eq!(snapshot.get(0), Some(&0));
/// assert_eq!(transient.persistent().get(0), Some(&-1));
/// ```
pub struct TransientTreeList<T> {
    tree: Tree<T>,
    published: Option<PersistentTreeList<T>>,
    /// Marker to ensure `!Send` and `!Sync`.
    _marker: PhantomData<Rc<()>>,
}

// Static assertions to verify TransientTreeList is not Send/Sync
static_assertions::assert_not_impl_any!(TransientTreeList<i32>: Send, Sync);
static_assertions::assert_not_impl_any!(TransientTreeList<String>: Send, Sync);

// Arc feature verification: even with Arc, TransientTreeList remains !Send/!Sync
#[cfg(feature = "arc")]
mod arc_send_sync_verification_transient_tree_list {
    use super::TransientTreeList;
    use std::sync::Arc;

    static_assertions::assert_not_impl_any!(TransientTreeList<Arc<i32>>: Send, Sync);
    static_assertions::assert_not_impl_any!(TransientTreeList<Arc<String>>: Send, Sync);
}

// =============================================================================
// TransientTreeList Implementation
// =============================================================================

impl<T> TransientTreeList<T> {
    /// Creates an empty transient with the default branching factor.
    #[must_use]
    pub fn new() -> Self {
        Self::from_tree(Tree::with_default_factor())
    }

    /// Creates an empty transient whose nodes hold at most
    /// `branching_factor` entries.
    ///
    /// # Errors
    ///
    /// [`TreeError::InvalidBranchingFactor`] if `branching_factor < 2`.
    pub fn with_branching_factor(branching_factor: usize) -> Result<Self, TreeError> {
        Tree::new(branching_factor).map(Self::from_tree)
    }

    const fn from_tree(tree: Tree<T>) -> Self {
        Self {
            tree,
            published: None,
            _marker: PhantomData,
        }
    }

    pub(crate) fn from_published(list: PersistentTreeList<T>) -> Self {
        Self {
            tree: list.tree().clone(),
            published: Some(list),
            _marker: PhantomData,
        }
    }

    /// Returns the number of items.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.tree.len()
    }

    /// Returns `true` if the transient holds no items.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// Returns the maximum number of entries per node.
    #[must_use]
    pub const fn branching_factor(&self) -> usize {
        self.tree.branching_factor()
    }

    /// Returns the number of node levels.
    #[must_use]
    pub fn height(&self) -> usize {
        self.tree.height()
    }

    /// Returns the item at `index`, or `None` when out of range.
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

    /// Returns the index of the last item matching `predicate`.
    pub fn find_last_index<P>(&self, predicate: P) -> Option<usize>
    where
        P: FnMut(&T) -> bool,
    {
        self.iter().rposition(predicate)
    }

    /// Returns the index of the first item equal to `value`.
    pub fn index_of(&self, value: &T) -> Option<usize>
    where
        T: PartialEq,
    {
        self.find_index(|item| item == value)
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

    /// Calls `action` on every item in index order.
    pub fn for_each<F>(&self, action: F)
    where
        F: FnMut(&T),
    {
        self.iter().for_each(action);
    }

    /// Returns a new transient holding `map` applied to every item.
    pub fn convert_all<U, F>(&self, map: F) -> TransientTreeList<U>
    where
        F: FnMut(&T) -> U,
    {
        TransientTreeList::from_tree(self.tree.convert(map))
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

    /// Checks the structure of the working tree.
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
    }

    /// Publishes the current content as a [`PersistentTreeList`] and keeps
    /// the transient usable.
    ///
    /// Returns the previously published list when nothing changed since, so
    /// repeated calls return lists that are [`ptr_eq`](PersistentTreeList::ptr_eq).
    ///
    /// # Complexity
    ///
    /// O(1)
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ordtree::TransientTreeList;
    ///
    /// let mut transient: TransientTreeList<i32> = (0..10).collect();
    /// let first = transient.to_persistent();
    /// let second = transient.to_persistent();
    /// assert!(first.ptr_eq(&second));
    ///
    /// transient.push_back(10);
    /// let third = transient.to_persistent();
    /// assert!(!first.ptr_eq(&third));
    /// assert_eq!(first.len(), 10);
    /// ```
    pub fn to_persistent(&mut self) -> PersistentTreeList<T> {
        if let Some(published) = &self.published
            && published.tree().ptr_eq(&self.tree)
        {
            return published.clone();
        }
        let snapshot = PersistentTreeList::from_tree(self.tree.clone());
        self.published = Some(snapshot.clone());
        snapshot
    }

    /// Converts this transient into a persistent list.
    ///
    /// # Complexity
    ///
    /// O(1)
    #[must_use]
    pub fn persistent(self) -> PersistentTreeList<T> {
        match self.published {
            Some(published) if published.tree().ptr_eq(&self.tree) => published,
            _ => PersistentTreeList::from_tree(self.tree),
        }
    }
}

impl<T: Clone> TransientTreeList<T> {
    /// Returns a new transient holding clones of `count` items starting at
    /// `start`.
    ///
    /// # Errors
    ///
    /// [`TreeError::RangeOutOfBounds`] if the window exceeds the list.
    pub fn get_range(&self, start: usize, count: usize) -> Result<Self, TreeError> {
        self.tree.get_range(start, count).map(Self::from_tree)
    }

    /// Returns a new transient holding clones of every item matching
    /// `predicate`.
    pub fn find_all<P>(&self, predicate: P) -> Self
    where
        P: FnMut(&T) -> bool,
    {
        Self::from_tree(self.tree.find_all(predicate))
    }

    /// Returns a mutable reference to the item at `index`.
    ///
    /// The leaf holding it and its ancestors are copied first when they are
    /// shared with a published list.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.tree.get_mut(index)
    }

    /// Replaces the item at `index`, returning the previous one.
    ///
    /// # Errors
    ///
    /// [`TreeError::IndexOutOfRange`] if `index >= len()`.
    pub fn set(&mut self, index: usize, value: T) -> Result<T, TreeError> {
        self.tree.set(index, value)
    }

    /// Inserts `value` at `index`.
    ///
    /// # Errors
    ///
    /// [`TreeError::IndexOutOfRange`] if `index > len()`.
    pub fn insert(&mut self, index: usize, value: T) -> Result<(), TreeError> {
        self.tree.insert(index, value)
    }

    /// Appends `value`.
    pub fn push_back(&mut self, value: T) {
        self.tree.push_back(value);
    }

    /// Prepends `value`.
    pub fn push_front(&mut self, value: T) {
        self.tree.insert(0, value).ok();
    }

    /// Inserts every item of `values` at `index`.
    ///
    /// # Errors
    ///
    /// [`TreeError::IndexOutOfRange`] if `index > len()`.
    pub fn insert_range<I>(&mut self, index: usize, values: I) -> Result<(), TreeError>
    where
        I: IntoIterator<Item = T>,
    {
        self.tree.insert_range(index, values)
    }

    /// Removes and returns the item at `index`.
    ///
    /// # Errors
    ///
    /// [`TreeError::IndexOutOfRange`] if `index >= len()`.
    pub fn remove_at(&mut self, index: usize) -> Result<T, TreeError> {
        self.tree.remove_at(index)
    }

    /// Removes `count` items starting at `start`.
    ///
    /// # Errors
    ///
    /// [`TreeError::RangeOutOfBounds`] if the window exceeds the list.
    pub fn remove_range(&mut self, start: usize, count: usize) -> Result<(), TreeError> {
        self.tree.remove_range(start, count)
    }

    /// Removes every item matching `predicate`, returning how many went.
    pub fn remove_all<P>(&mut self, predicate: P) -> usize
    where
        P: FnMut(&T) -> bool,
    {
        self.tree.remove_all(predicate)
    }

    /// Removes and returns the last item.
    pub fn pop_back(&mut self) -> Option<T> {
        let index = self.len().checked_sub(1)?;
        self.tree.remove_at(index).ok()
    }

    /// Removes and returns the first item.
    pub fn pop_front(&mut self) -> Option<T> {
        if self.is_empty() {
            return None;
        }
        self.tree.remove_at(0).ok()
    }

    /// Sorts the items by [`Ord`]. The sort is stable.
    pub fn sort(&mut self)
    where
        T: Ord,
    {
        self.sort_by(&NaturalOrder);
    }

    /// Sorts the items with `comparer`. The sort is stable.
    pub fn sort_by<C>(&mut self, comparer: &C)
    where
        C: Comparer<T> + ?Sized,
    {
        let length = self.len();
        self.tree.sort_range(0, length, comparer).ok();
    }

    /// Sorts `count` items starting at `index` with `comparer`.
    ///
    /// # Errors
    ///
    /// [`TreeError::RangeOutOfBounds`] if the window exceeds the list.
    pub fn sort_range<C>(&mut self, index: usize, count: usize, comparer: &C) -> Result<(), TreeError>
    where
        C: Comparer<T> + ?Sized,
    {
        self.tree.sort_range(index, count, comparer)
    }

    /// Reverses the order of the items.
    pub fn reverse(&mut self) {
        let length = self.len();
        self.tree.reverse_range(0, length).ok();
    }

    /// Reverses `count` items starting at `index`.
    ///
    /// # Errors
    ///
    /// [`TreeError::RangeOutOfBounds`] if the window exceeds the list.
    pub fn reverse_range(&mut self, index: usize, count: usize) -> Result<(), TreeError> {
        self.tree.reverse_range(index, count)
    }

    /// Repacks the working tree. Returns `false` when it was already packed.
    pub fn trim_excess(&mut self) -> bool {
        self.tree.trim_excess()
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

impl<T> Default for TransientTreeList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug> fmt::Debug for TransientTreeList<T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_list().entries(self.iter()).finish()
    }
}

impl<T> FromIterator<T> for TransientTreeList<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::from_tree(Tree::packed(
            iter.into_iter().collect(),
            crate::DEFAULT_BRANCHING_FACTOR,
        ))
    }
}

impl<T: Clone> Extend<T> for TransientTreeList<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        let index = self.len();
        self.tree.insert_range(index, iter).ok();
    }
}

impl<'a, T> IntoIterator for &'a TransientTreeList<T> {
    type Item = &'a T;
    type IntoIter = TreeListIterator<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

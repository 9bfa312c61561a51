//! Persistent (immutable) sorted list.

use std::fmt;

use super::PersistentTreeList;
use crate::compare::{Comparer, NaturalOrder, SearchBias};
use crate::engine::{Tree, TreeListIterator, ValidationRule, DEFAULT_BRANCHING_FACTOR};
use crate::error::{TreeError, check_branching_factor};
use crate::tree::sort_detecting_duplicates;

/// An immutable ordered multiset with structural sharing.
///
/// The persistent counterpart of [`SortedTreeList`](crate::SortedTreeList):
/// [`add`](Self::add) and the removal operations return a new list, copying
/// only the root-to-leaf path they change. Equal items keep their insertion
/// order.
///
/// # Examples
///
/// ```rust
/// use ordtree::PersistentSortedTreeList;
///
/// let list: PersistentSortedTreeList<i32> = [4, 2, 8].into_iter().collect();
/// let more = list.add(5).add(2);
///
/// assert_eq!(list.len(), 3);
/// assert_eq!(more.iter().copied().collect::<Vec<_>>(), vec![2, 2, 4, 5, 8]);
/// assert_eq!(more.count_of(&2), 2);
/// ```
pub struct PersistentSortedTreeList<T, C = NaturalOrder> {
    list: PersistentTreeList<T>,
    comparer: C,
}

impl<T, C: Comparer<T> + Default> PersistentSortedTreeList<T, C> {
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
    pub fn try_from_unique<I>(items: I) -> Result<Self, TreeError>
    where
        I: IntoIterator<Item = T>,
    {
        Self::try_from_unique_with(items, C::default())
    }
}

impl<T, C: Comparer<T>> PersistentSortedTreeList<T, C> {
    /// Creates an empty list ordered by `comparer`.
    #[must_use]
    pub fn with_comparer(comparer: C) -> Self {
        Self {
            list: PersistentTreeList::new(),
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
            list: PersistentTreeList::with_branching_factor(branching_factor)?,
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
        match duplicate {
            Some(position) => Err(TreeError::DuplicateKey { position }),
            None => Ok(Self::from_sorted(
                Tree::packed(sorted, DEFAULT_BRANCHING_FACTOR),
                comparer,
            )),
        }
    }

    const fn from_sorted(tree: Tree<T>, comparer: C) -> Self {
        Self {
            list: PersistentTreeList::from_tree(tree),
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

    /// Returns `true` if both lists share the same root node.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        self.list.ptr_eq(&other.list)
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

    /// Binary-searches for `value`; among equal items any index may be
    /// returned.
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
}

impl<T: Clone, C: Comparer<T> + Clone> PersistentSortedTreeList<T, C> {
    fn with_list(&self, list: PersistentTreeList<T>) -> Self {
        Self {
            list,
            comparer: self.comparer.clone(),
        }
    }

    /// Returns a list with `value` added after every item equal to it.
    ///
    /// # Complexity
    ///
    /// O(log n), copying `height()` nodes
    #[must_use]
    pub fn add(&self, value: T) -> Self {
        let index = self.upper_bound(&value);
        match self.list.insert(index, value) {
            Ok(list) => self.with_list(list),
            Err(_) => self.clone(),
        }
    }

    /// Returns a list without the first item equal to `value`, or a list
    /// sharing this one's root when there is none.
    #[must_use]
    pub fn remove(&self, value: &T) -> Self {
        self.index_of(value)
            .and_then(|index| self.list.remove_at(index).ok())
            .map_or_else(|| self.clone(), |list| self.with_list(list))
    }

    /// Returns a list without the item at `index`.
    ///
    /// # Errors
    ///
    /// [`TreeError::IndexOutOfRange`] if `index >= len()`.
    pub fn remove_at(&self, index: usize) -> Result<Self, TreeError> {
        self.list.remove_at(index).map(|list| self.with_list(list))
    }

    /// Returns a list without the `count` items starting at `start`.
    ///
    /// # Errors
    ///
    /// [`TreeError::RangeOutOfBounds`] if the window exceeds the list.
    pub fn remove_range(&self, start: usize, count: usize) -> Result<Self, TreeError> {
        self.list.remove_range(start, count).map(|list| self.with_list(list))
    }

    /// Returns a list without the items matching `predicate`.
    #[must_use]
    pub fn remove_all<P>(&self, predicate: P) -> Self
    where
        P: FnMut(&T) -> bool,
    {
        self.with_list(self.list.remove_all(predicate))
    }

    /// Returns a new packed list of `count` items starting at `start`.
    ///
    /// # Errors
    ///
    /// [`TreeError::RangeOutOfBounds`] if the window exceeds the list.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ordtree::PersistentSortedTreeList;
    /// use ordtree::compare::NaturalOrder;
    ///
    /// let list = PersistentSortedTreeList::from_iter_with(0..100, 4, NaturalOrder).unwrap();
    /// let middle = list.get_range(10, 80).unwrap();
    /// let grown = list.add(50);
    ///
    /// assert_eq!(middle.count_of(&50), 1);
    /// assert_eq!(grown.count_of(&50), 2);
    /// ```
    pub fn get_range(&self, start: usize, count: usize) -> Result<Self, TreeError> {
        self.list.get_range(start, count).map(|list| self.with_list(list))
    }

    /// Returns a packed copy of the list.
    #[must_use]
    pub fn trim_excess(&self) -> Self {
        self.with_list(self.list.trim_excess())
    }

    /// Returns an empty list with the same comparer and branching factor.
    #[must_use]
    pub fn clear(&self) -> Self {
        self.with_list(self.list.clear())
    }

    /// Returns the items as a `Vec`, in ascending order.
    #[must_use]
    pub fn to_vec(&self) -> Vec<T> {
        self.list.to_vec()
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

impl<T, C: Comparer<T> + Default> Default for PersistentSortedTreeList<T, C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, C: Clone> Clone for PersistentSortedTreeList<T, C> {
    fn clone(&self) -> Self {
        Self {
            list: self.list.clone(),
            comparer: self.comparer.clone(),
        }
    }
}

impl<T: fmt::Debug, C> fmt::Debug for PersistentSortedTreeList<T, C> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_list().entries(self.list.iter()).finish()
    }
}

impl<T: PartialEq, C> PartialEq for PersistentSortedTreeList<T, C> {
    fn eq(&self, other: &Self) -> bool {
        self.list == other.list
    }
}

impl<T, C: Comparer<T> + Default> FromIterator<T> for PersistentSortedTreeList<T, C> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let comparer = C::default();
        let mut items: Vec<T> = iter.into_iter().collect();
        items.sort_by(|left, right| comparer.compare(left, right));
        Self::from_sorted(Tree::packed(items, DEFAULT_BRANCHING_FACTOR), comparer)
    }
}

impl<'a, T, C> IntoIterator for &'a PersistentSortedTreeList<T, C> {
    type Item = &'a T;
    type IntoIter = TreeListIterator<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.list.iter()
    }
}

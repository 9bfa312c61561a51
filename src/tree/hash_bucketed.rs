//! A mutable set ordered by hash.

use std::fmt;
use std::iter::FusedIterator;

use crate::compare::{DefaultEquality, EqualityComparer};
use crate::engine::{Bucketed, Tree, TreeListIterator, ValidationRule, locate_in_bucket};
use crate::error::TreeError;

/// A set of values stored in an order-statistics tree ordered by hash.
///
/// Each value is stored next to its hash, and entries are ordered by hash
/// alone. Values with colliding hashes sit next to each other in a collision
/// run, which lookups scan linearly after one descent to its start, so
/// membership costs O(log n + k) comparisons for a run of k values. Arbitrary collisions
/// are always handled correctly; they only cost time.
///
/// Equality and hashing come from an [`EqualityComparer`]. Storing
/// `(key, value)` pairs with [`KeyEquality`](crate::compare::KeyEquality)
/// gives map semantics.
///
/// The order of values within a collision run is unspecified.
///
/// # Examples
///
/// ```rust
/// use ordtree::HashBucketedTree;
///
/// let mut set: HashBucketedTree<&str> = HashBucketedTree::new();
/// assert!(set.insert("apple"));
/// assert!(set.insert("pear"));
/// assert!(!set.insert("apple"));
///
/// assert_eq!(set.len(), 2);
/// assert!(set.contains(&"pear"));
/// assert!(set.remove(&"pear"));
/// assert!(!set.contains(&"pear"));
/// ```
pub struct HashBucketedTree<T, E = DefaultEquality> {
    tree: Tree<Bucketed<T>>,
    equality: E,
}

impl<T, E: EqualityComparer<T> + Default> HashBucketedTree<T, E> {
    /// Creates an empty set with `E::default()` equality.
    #[must_use]
    pub fn new() -> Self {
        Self::with_equality(E::default())
    }

    /// Builds a set from `values`, rejecting duplicates.
    ///
    /// # Errors
    ///
    /// [`TreeError::DuplicateKey`] with the position (in `values`) of the
    /// first value equal to an earlier one.
    pub fn try_from_unique<I>(values: I) -> Result<Self, TreeError>
    where
        T: Clone,
        I: IntoIterator<Item = T>,
    {
        Self::try_from_unique_with(values, E::default())
    }
}

impl<T, E: EqualityComparer<T>> HashBucketedTree<T, E> {
    /// Creates an empty set using `equality`.
    #[must_use]
    pub fn with_equality(equality: E) -> Self {
        Self {
            tree: Tree::with_default_factor(),
            equality,
        }
    }

    /// Creates an empty set using `equality` with the given branching factor.
    ///
    /// # Errors
    ///
    /// [`TreeError::InvalidBranchingFactor`] if `branching_factor < 2`.
    pub fn with_branching_factor(branching_factor: usize, equality: E) -> Result<Self, TreeError> {
        Ok(Self {
            tree: Tree::new(branching_factor)?,
            equality,
        })
    }

    /// Like [`try_from_unique`](Self::try_from_unique) with an explicit
    /// equality.
    ///
    /// # Errors
    ///
    /// [`TreeError::DuplicateKey`] with the position of the first duplicate.
    pub fn try_from_unique_with<I>(values: I, equality: E) -> Result<Self, TreeError>
    where
        T: Clone,
        I: IntoIterator<Item = T>,
    {
        let mut set = Self::with_equality(equality);
        for (position, value) in values.into_iter().enumerate() {
            if !set.insert(value) {
                return Err(TreeError::DuplicateKey { position });
            }
        }
        Ok(set)
    }

    pub(crate) const fn from_parts(tree: Tree<Bucketed<T>>, equality: E) -> Self {
        Self { tree, equality }
    }

    pub(crate) fn into_parts(self) -> (Tree<Bucketed<T>>, E) {
        (self.tree, self.equality)
    }

    /// Returns the equality used by this set.
    pub const fn equality(&self) -> &E {
        &self.equality
    }

    /// Returns the number of values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tree.len()
    }

    /// Returns `true` if the set holds no values.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// Returns the number of node levels.
    #[must_use]
    pub fn height(&self) -> usize {
        self.tree.height()
    }

    fn locate(&self, value: &T) -> (u64, Result<usize, usize>) {
        let hash = self.equality.hash_of(value);
        let position = locate_in_bucket(&self.tree, hash, |candidate| self.equality.equals(candidate, value));
        (hash, position)
    }

    /// Returns `true` if a value equal to `value` is present.
    pub fn contains(&self, value: &T) -> bool {
        self.locate(value).1.is_ok()
    }

    /// Returns the stored value equal to `value`.
    pub fn get(&self, value: &T) -> Option<&T> {
        let index = self.locate(value).1.ok()?;
        self.tree.get(index).map(|entry| &entry.value)
    }

    /// Returns the first value in the collision run of `hash` that satisfies
    /// `predicate`.
    ///
    /// `hash` must come from the same hash function the set uses, which makes
    /// lookups by a part of the value possible.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ordtree::HashBucketedTree;
    /// use ordtree::compare::{DefaultEquality, KeyEquality};
    ///
    /// let mut ages: HashBucketedTree<(&str, u32), KeyEquality<DefaultEquality>> =
    ///     HashBucketedTree::new();
    /// ages.insert(("ada", 36));
    /// ages.insert(("alan", 41));
    ///
    /// let hash = ages.equality().key_hash(&"alan");
    /// assert_eq!(ages.find_with(hash, |entry| entry.0 == "alan"), Some(&("alan", 41)));
    /// ```
    pub fn find_with<P>(&self, hash: u64, predicate: P) -> Option<&T>
    where
        P: FnMut(&T) -> bool,
    {
        let index = locate_in_bucket(&self.tree, hash, predicate).ok()?;
        self.tree.get(index).map(|entry| &entry.value)
    }

    /// Returns an iterator over the values, in hash order.
    pub fn iter(&self) -> HashBucketedIterator<'_, T> {
        HashBucketedIterator::new(self.tree.iter())
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

    /// Removes every value.
    pub fn clear(&mut self) {
        self.tree.clear();
    }
}

impl<T: Clone, E: EqualityComparer<T>> HashBucketedTree<T, E> {
    /// Adds `value` unless an equal value is present.
    ///
    /// Returns `true` if the value was added.
    pub fn insert(&mut self, value: T) -> bool {
        match self.locate(&value) {
            (_, Ok(_)) => false,
            (hash, Err(start)) => self.tree.insert(start, Bucketed::new(hash, value)).is_ok(),
        }
    }

    /// Adds `value`, replacing an equal value if one is present.
    ///
    /// Returns the replaced value.
    pub fn replace(&mut self, value: T) -> Option<T> {
        match self.locate(&value) {
            (hash, Ok(index)) => self
                .tree
                .set(index, Bucketed::new(hash, value))
                .ok()
                .map(|entry| entry.value),
            (hash, Err(start)) => {
                self.tree.insert(start, Bucketed::new(hash, value)).ok();
                None
            }
        }
    }

    /// Removes the value equal to `value`. Returns `false` if there was none.
    pub fn remove(&mut self, value: &T) -> bool {
        self.take(value).is_some()
    }

    /// Removes and returns the value equal to `value`.
    pub fn take(&mut self, value: &T) -> Option<T> {
        let index = self.locate(value).1.ok()?;
        self.tree.remove_at(index).ok().map(|entry| entry.value)
    }

    /// Removes and returns the first value in the collision run of `hash`
    /// that satisfies `predicate`.
    pub fn remove_with<P>(&mut self, hash: u64, predicate: P) -> Option<T>
    where
        P: FnMut(&T) -> bool,
    {
        let index = locate_in_bucket(&self.tree, hash, predicate).ok()?;
        self.tree.remove_at(index).ok().map(|entry| entry.value)
    }

    /// Keeps only the values matching `predicate`.
    pub fn retain<P>(&mut self, mut predicate: P)
    where
        P: FnMut(&T) -> bool,
    {
        self.tree.remove_all(|entry| !predicate(&entry.value));
    }

    /// Keeps only the values that also occur in `other`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ordtree::HashBucketedTree;
    ///
    /// let mut set: HashBucketedTree<i32> = (0..10).collect();
    /// set.intersect_with([3, 4, 5, 42]);
    /// let mut values: Vec<i32> = set.iter().copied().collect();
    /// values.sort_unstable();
    /// assert_eq!(values, vec![3, 4, 5]);
    /// ```
    pub fn intersect_with<I>(&mut self, other: I)
    where
        I: IntoIterator<Item = T>,
    {
        let mut keep = vec![false; self.len()];
        for value in other {
            if let (_, Ok(index)) = self.locate(&value) {
                keep[index] = true;
            }
        }
        if keep.iter().all(|&kept| kept) {
            return;
        }
        let entries = self
            .tree
            .take_vec()
            .into_iter()
            .zip(keep)
            .filter_map(|(entry, kept)| kept.then_some(entry))
            .collect();
        self.tree.rebuild(entries);
    }

    /// Adds every value of `other`.
    pub fn union_with<I>(&mut self, other: I)
    where
        I: IntoIterator<Item = T>,
    {
        for value in other {
            self.insert(value);
        }
    }

    /// Removes every value that occurs in `other`.
    pub fn except_with<I>(&mut self, other: I)
    where
        I: IntoIterator<Item = T>,
    {
        for value in other {
            self.remove(&value);
        }
    }

    /// Repacks the tree. See [`TreeList::trim_excess`](crate::TreeList::trim_excess).
    pub fn trim_excess(&mut self) -> bool {
        self.tree.trim_excess()
    }
}

/// An iterator over the values of a [`HashBucketedTree`] in hash order.
pub struct HashBucketedIterator<'a, T> {
    entries: TreeListIterator<'a, Bucketed<T>>,
}

impl<'a, T> HashBucketedIterator<'a, T> {
    pub(crate) const fn new(entries: TreeListIterator<'a, Bucketed<T>>) -> Self {
        Self { entries }
    }
}

impl<'a, T> Iterator for HashBucketedIterator<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        self.entries.next().map(|entry| &entry.value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.entries.size_hint()
    }
}

impl<T> DoubleEndedIterator for HashBucketedIterator<'_, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.entries.next_back().map(|entry| &entry.value)
    }
}

impl<T> ExactSizeIterator for HashBucketedIterator<'_, T> {}

impl<T> FusedIterator for HashBucketedIterator<'_, T> {}

// =============================================================================
// Trait Implementations
// =============================================================================

impl<T, E: EqualityComparer<T> + Default> Default for HashBucketedTree<T, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, E: Clone> Clone for HashBucketedTree<T, E> {
    fn clone(&self) -> Self {
        Self {
            tree: self.tree.clone(),
            equality: self.equality.clone(),
        }
    }
}

impl<T: fmt::Debug, E> fmt::Debug for HashBucketedTree<T, E> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_set()
            .entries(self.tree.iter().map(|entry| &entry.value))
            .finish()
    }
}

impl<T: Clone, E: EqualityComparer<T> + Default> FromIterator<T> for HashBucketedTree<T, E> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

impl<T: Clone, E: EqualityComparer<T>> Extend<T> for HashBucketedTree<T, E> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.union_with(iter);
    }
}

impl<'a, T, E: EqualityComparer<T>> IntoIterator for &'a HashBucketedTree<T, E> {
    type Item = &'a T;
    type IntoIter = HashBucketedIterator<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

//! Persistent (immutable) set ordered by hash.

use std::fmt;

use crate::compare::{DefaultEquality, EqualityComparer};
use crate::engine::{Bucketed, Tree, ValidationRule, locate_in_bucket};
use crate::error::TreeError;
use crate::tree::{HashBucketedIterator, HashBucketedTree};

/// An immutable set stored in an order-statistics tree ordered by hash.
///
/// The persistent counterpart of [`HashBucketedTree`]: every update returns
/// a new set and shares all untouched subtrees with the original. Colliding
/// hashes are tolerated and resolved by a linear scan of the collision run.
///
/// # Examples
///
/// ```rust
/// use ordtree::PersistentHashBucketedTree;
///
/// let set: PersistentHashBucketedTree<&str> = ["a", "b"].into_iter().collect();
/// let more = set.insert("c");
/// let fewer = more.remove(&"a");
///
/// assert_eq!(set.len(), 2);
/// assert_eq!(more.len(), 3);
/// assert!(!fewer.contains(&"a"));
/// assert!(set.contains(&"a"));
/// ```
pub struct PersistentHashBucketedTree<T, E = DefaultEquality> {
    tree: Tree<Bucketed<T>>,
    equality: E,
}

impl<T, E: EqualityComparer<T> + Default> PersistentHashBucketedTree<T, E> {
    /// Creates an empty set with `E::default()` equality.
    #[must_use]
    pub fn new() -> Self {
        Self::with_equality(E::default())
    }

    /// Builds a set from `values`, rejecting duplicates.
    ///
    /// # Errors
    ///
    /// [`TreeError::DuplicateKey`] with the position of the first duplicate.
    pub fn try_from_unique<I>(values: I) -> Result<Self, TreeError>
    where
        T: Clone,
        I: IntoIterator<Item = T>,
    {
        HashBucketedTree::try_from_unique(values).map(Self::from_mutable)
    }
}

impl<T, E: EqualityComparer<T>> PersistentHashBucketedTree<T, E> {
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

    fn from_mutable(set: HashBucketedTree<T, E>) -> Self {
        let (tree, equality) = set.into_parts();
        Self { tree, equality }
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

    /// Returns `true` if both sets share the same root node.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        self.tree.ptr_eq(&other.tree)
    }

    fn position(&self, value: &T) -> Option<usize> {
        let hash = self.equality.hash_of(value);
        locate_in_bucket(&self.tree, hash, |candidate| self.equality.equals(candidate, value)).ok()
    }

    /// Returns `true` if a value equal to `value` is present.
    pub fn contains(&self, value: &T) -> bool {
        self.position(value).is_some()
    }

    /// Returns the stored value equal to `value`.
    pub fn get(&self, value: &T) -> Option<&T> {
        let index = self.position(value)?;
        self.tree.get(index).map(|entry| &entry.value)
    }

    /// Returns the first value in the collision run of `hash` that satisfies
    /// `predicate`.
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
}

impl<T: Clone, E: EqualityComparer<T> + Clone> PersistentHashBucketedTree<T, E> {
    fn updated<F>(&self, update: F) -> Self
    where
        F: FnOnce(&mut HashBucketedTree<T, E>),
    {
        let mut working = HashBucketedTree::from_parts(self.tree.clone(), self.equality.clone());
        update(&mut working);
        Self::from_mutable(working)
    }

    /// Returns a set with `value` added. When an equal value is present the
    /// result shares its root with `self`.
    #[must_use]
    pub fn insert(&self, value: T) -> Self {
        self.updated(|set| {
            set.insert(value);
        })
    }

    /// Returns a set holding `value` in place of any equal value, together
    /// with the replaced value.
    #[must_use]
    pub fn replace(&self, value: T) -> (Self, Option<T>) {
        let mut previous = None;
        let set = self.updated(|set| previous = set.replace(value));
        (set, previous)
    }

    /// Returns a set without the value equal to `value`.
    #[must_use]
    pub fn remove(&self, value: &T) -> Self {
        self.updated(|set| {
            set.remove(value);
        })
    }

    /// Returns a set holding only the values matching `predicate`.
    #[must_use]
    pub fn retain<P>(&self, predicate: P) -> Self
    where
        P: FnMut(&T) -> bool,
    {
        self.updated(|set| set.retain(predicate))
    }

    /// Returns the values that also occur in `other`.
    #[must_use]
    pub fn intersect_with<I>(&self, other: I) -> Self
    where
        I: IntoIterator<Item = T>,
    {
        self.updated(|set| set.intersect_with(other))
    }

    /// Returns the union of this set and `other`.
    #[must_use]
    pub fn union_with<I>(&self, other: I) -> Self
    where
        I: IntoIterator<Item = T>,
    {
        self.updated(|set| set.union_with(other))
    }

    /// Returns this set without the values of `other`.
    #[must_use]
    pub fn except_with<I>(&self, other: I) -> Self
    where
        I: IntoIterator<Item = T>,
    {
        self.updated(|set| set.except_with(other))
    }

    /// Returns a packed copy of the set.
    #[must_use]
    pub fn trim_excess(&self) -> Self {
        self.updated(|set| {
            set.trim_excess();
        })
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

impl<T, E: EqualityComparer<T> + Default> Default for PersistentHashBucketedTree<T, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, E: Clone> Clone for PersistentHashBucketedTree<T, E> {
    fn clone(&self) -> Self {
        Self {
            tree: self.tree.clone(),
            equality: self.equality.clone(),
        }
    }
}

impl<T: fmt::Debug, E> fmt::Debug for PersistentHashBucketedTree<T, E> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_set()
            .entries(self.tree.iter().map(|entry| &entry.value))
            .finish()
    }
}

impl<T: Clone, E: EqualityComparer<T> + Default> FromIterator<T> for PersistentHashBucketedTree<T, E> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::from_mutable(iter.into_iter().collect())
    }
}

impl<'a, T, E: EqualityComparer<T>> IntoIterator for &'a PersistentHashBucketedTree<T, E> {
    type Item = &'a T;
    type IntoIter = HashBucketedIterator<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compare::FnEquality;
    use rstest::rstest;
    use std::collections::HashSet;

    #[rstest]
    fn test_updates_leave_original() {
        let coarse = FnEquality::new(
            |left: &i32, right: &i32| left == right,
            |value: &i32| u64::from(value.unsigned_abs() >= 5),
        );
        let empty = PersistentHashBucketedTree::with_branching_factor(3, coarse).unwrap();
        let full = empty.union_with(0..10);
        let middle = full.intersect_with([3, 4, 5]);

        assert!(empty.is_empty());
        assert_eq!(full.len(), 10);
        assert_eq!(middle.iter().copied().collect::<HashSet<_>>(), HashSet::from([3, 4, 5]));
        assert!(full.validate(ValidationRule::Structural).is_ok());
    }

    #[rstest]
    fn test_insert_of_present_value_shares_root() {
        let set: PersistentHashBucketedTree<i32> = (0..20).collect();
        assert!(set.insert(7).ptr_eq(&set));
        assert!(set.remove(&100).ptr_eq(&set));
        assert!(!set.insert(20).ptr_eq(&set));
    }

    #[rstest]
    fn test_replace_returns_previous() {
        use crate::compare::KeyEquality;

        let map: PersistentHashBucketedTree<(u8, char), KeyEquality<DefaultEquality>> =
            PersistentHashBucketedTree::new();
        let (map, previous) = map.replace((1, 'a'));
        assert_eq!(previous, None);
        let (updated, previous) = map.replace((1, 'b'));
        assert_eq!(previous, Some((1, 'a')));
        assert_eq!(map.get(&(1, ' ')), Some(&(1, 'a')));
        assert_eq!(updated.get(&(1, ' ')), Some(&(1, 'b')));
    }
}

//! Ordering and equality strategies used by the trees.
//!
//! Trees never require `T: Ord` or `T: Hash` directly. They are handed a
//! [`Comparer`] (three-way ordering) or an [`EqualityComparer`] (equality plus
//! hash) per instance, with [`NaturalOrder`] and [`DefaultEquality`] as the
//! defaults.
//!
//! [`DuplicateAware`] is the one search primitive behind first-occurrence,
//! last-occurrence and insert-after-equals queries: it turns every `Equal`
//! answer of its base comparer into a fixed bias, so a plain binary search
//! lands on one end of a run of equal elements.
//!
//! # Examples
//!
//! ```rust
//! use ordtree::compare::{Comparer, DuplicateAware, NaturalOrder, SearchBias};
//!
//! let values = [1, 3, 3, 3, 7];
//! let first = DuplicateAware::new(NaturalOrder, SearchBias::First);
//! let point = values.partition_point(|value| first.compare(value, &3).is_lt());
//! assert_eq!(point, 1);
//! assert!(first.matched());
//! ```

use std::cell::Cell;
use std::cmp::Ordering;
use std::hash::{BuildHasher, Hash};

// =============================================================================
// Comparer
// =============================================================================

/// A three-way ordering function.
///
/// `compare(left, right)` returns the position of `left` relative to `right`.
/// Binary searches in this crate always call it as
/// `compare(element_in_tree, searched_value)`.
pub trait Comparer<T: ?Sized> {
    /// Compares two values.
    fn compare(&self, left: &T, right: &T) -> Ordering;
}

impl<T: ?Sized, C: Comparer<T> + ?Sized> Comparer<T> for &C {
    #[inline]
    fn compare(&self, left: &T, right: &T) -> Ordering {
        (**self).compare(left, right)
    }
}

/// Orders values by their [`Ord`] implementation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct NaturalOrder;

impl<T: Ord + ?Sized> Comparer<T> for NaturalOrder {
    #[inline]
    fn compare(&self, left: &T, right: &T) -> Ordering {
        left.cmp(right)
    }
}

/// Reverses the ordering of the wrapped comparer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ReverseOrder<C>(pub C);

impl<T: ?Sized, C: Comparer<T>> Comparer<T> for ReverseOrder<C> {
    #[inline]
    fn compare(&self, left: &T, right: &T) -> Ordering {
        self.0.compare(right, left)
    }
}

/// Adapts a closure `Fn(&T, &T) -> Ordering` into a [`Comparer`].
///
/// ```rust
/// use ordtree::compare::{Comparer, FnComparer};
///
/// let by_length = FnComparer(|left: &&str, right: &&str| left.len().cmp(&right.len()));
/// assert!(by_length.compare(&"ab", &"abc").is_lt());
/// ```
#[derive(Clone, Copy)]
pub struct FnComparer<F>(pub F);

impl<T: ?Sized, F: Fn(&T, &T) -> Ordering> Comparer<T> for FnComparer<F> {
    #[inline]
    fn compare(&self, left: &T, right: &T) -> Ordering {
        (self.0)(left, right)
    }
}

impl<F> std::fmt::Debug for FnComparer<F> {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str("FnComparer")
    }
}

// =============================================================================
// DuplicateAware
// =============================================================================

/// Which end of a run of equal elements a biased search settles on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchBias {
    /// Treat equal elements as greater than the target: the search ends at
    /// the first element of the run.
    First,
    /// Treat equal elements as less than the target: the search ends just
    /// past the last element of the run.
    Last,
}

/// A comparer wrapper that never reports [`Ordering::Equal`].
///
/// Equal answers of the base comparer are replaced by `Greater`
/// ([`SearchBias::First`]) or `Less` ([`SearchBias::Last`]) and remembered, so
/// after a search [`matched`](Self::matched) tells whether an equal element was
/// seen. A search driven by this wrapper always yields an insertion point:
///
/// | query                  | bias    | result                           |
/// |------------------------|---------|----------------------------------|
/// | first occurrence       | `First` | point `p`, found iff matched     |
/// | last occurrence        | `Last`  | point `p`, index `p - 1`         |
/// | insert after equals    | `Last`  | point `p`                        |
///
/// The wrapper is stateful per search; call [`reset`](Self::reset) before
/// reusing it.
#[derive(Debug)]
pub struct DuplicateAware<C> {
    base: C,
    bias: SearchBias,
    matched: Cell<bool>,
}

impl<C> DuplicateAware<C> {
    /// Wraps `base` with the given bias.
    #[must_use]
    pub const fn new(base: C, bias: SearchBias) -> Self {
        Self {
            base,
            bias,
            matched: Cell::new(false),
        }
    }

    /// Returns `true` if the base comparer reported equality since creation or
    /// the last [`reset`](Self::reset).
    #[must_use]
    pub fn matched(&self) -> bool {
        self.matched.get()
    }

    /// Forgets any previously observed match.
    pub fn reset(&self) {
        self.matched.set(false);
    }

    /// Returns the bias this wrapper applies.
    #[must_use]
    pub const fn bias(&self) -> SearchBias {
        self.bias
    }
}

impl<T: ?Sized, C: Comparer<T>> Comparer<T> for DuplicateAware<C> {
    fn compare(&self, left: &T, right: &T) -> Ordering {
        match self.base.compare(left, right) {
            Ordering::Equal => {
                self.matched.set(true);
                match self.bias {
                    SearchBias::First => Ordering::Greater,
                    SearchBias::Last => Ordering::Less,
                }
            }
            ordering => ordering,
        }
    }
}

/// Converts a search result into the `found-index-or-bitwise-complement`
/// encoding: `Ok(index)` becomes `index`, `Err(point)` becomes `!point`.
///
/// ```rust
/// use ordtree::compare::complement_encoded;
///
/// assert_eq!(complement_encoded(Ok(4)), 4);
/// assert_eq!(complement_encoded(Err(2)), !2);
/// assert!(complement_encoded(Err(0)) < 0);
/// ```
#[must_use]
pub fn complement_encoded(result: Result<usize, usize>) -> isize {
    match result {
        Ok(index) => isize::try_from(index).unwrap_or(isize::MAX),
        Err(point) => !isize::try_from(point).unwrap_or(isize::MAX),
    }
}

// =============================================================================
// EqualityComparer
// =============================================================================

/// An equality relation paired with a compatible hash function.
///
/// Values that are equal must hash to the same value; values with the same
/// hash need not be equal.
pub trait EqualityComparer<T: ?Sized> {
    /// Returns `true` if both values are equal.
    fn equals(&self, left: &T, right: &T) -> bool;

    /// Returns the hash of `value`.
    fn hash_of(&self, value: &T) -> u64;
}

impl<T: ?Sized, E: EqualityComparer<T> + ?Sized> EqualityComparer<T> for &E {
    #[inline]
    fn equals(&self, left: &T, right: &T) -> bool {
        (**self).equals(left, right)
    }

    #[inline]
    fn hash_of(&self, value: &T) -> u64 {
        (**self).hash_of(value)
    }
}

/// The `BuildHasher` used by [`DefaultEquality`].
///
/// `rustc_hash::FxBuildHasher` with the `fxhash` feature,
/// `ahash::RandomState` with the `ahash` feature, and the standard library's
/// `RandomState` otherwise.
#[cfg(feature = "fxhash")]
pub type DefaultBuildHasher = rustc_hash::FxBuildHasher;

/// The `BuildHasher` used by [`DefaultEquality`].
#[cfg(all(feature = "ahash", not(feature = "fxhash")))]
pub type DefaultBuildHasher = ahash::RandomState;

/// The `BuildHasher` used by [`DefaultEquality`].
#[cfg(not(any(feature = "fxhash", feature = "ahash")))]
pub type DefaultBuildHasher = std::collections::hash_map::RandomState;

/// Equality through [`Eq`] and hashing through [`Hash`] with a `BuildHasher`.
#[derive(Debug, Clone, Default)]
pub struct DefaultEquality<S = DefaultBuildHasher> {
    build_hasher: S,
}

impl<S> DefaultEquality<S> {
    /// Uses `build_hasher` to hash values.
    #[must_use]
    pub const fn with_hasher(build_hasher: S) -> Self {
        Self { build_hasher }
    }
}

impl<T: Hash + Eq + ?Sized, S: BuildHasher> EqualityComparer<T> for DefaultEquality<S> {
    #[inline]
    fn equals(&self, left: &T, right: &T) -> bool {
        left == right
    }

    #[inline]
    fn hash_of(&self, value: &T) -> u64 {
        self.build_hasher.hash_one(value)
    }
}

/// Builds an [`EqualityComparer`] from an equality closure and a hash closure.
///
/// ```rust
/// use ordtree::compare::{EqualityComparer, FnEquality};
///
/// // Everything below 5 lands in bucket 0, everything else in bucket 1.
/// let coarse = FnEquality::new(|left: &i32, right: &i32| left == right, |value: &i32| {
///     u64::from(value.unsigned_abs() >= 5)
/// });
/// assert_eq!(coarse.hash_of(&3), coarse.hash_of(&-4));
/// assert!(!coarse.equals(&3, &4));
/// ```
#[derive(Clone, Copy)]
pub struct FnEquality<E, H> {
    equals: E,
    hash: H,
}

impl<E, H> FnEquality<E, H> {
    /// Pairs an equality closure with a hash closure.
    #[must_use]
    pub const fn new(equals: E, hash: H) -> Self {
        Self { equals, hash }
    }
}

impl<T: ?Sized, E: Fn(&T, &T) -> bool, H: Fn(&T) -> u64> EqualityComparer<T> for FnEquality<E, H> {
    #[inline]
    fn equals(&self, left: &T, right: &T) -> bool {
        (self.equals)(left, right)
    }

    #[inline]
    fn hash_of(&self, value: &T) -> u64 {
        (self.hash)(value)
    }
}

impl<E, H> std::fmt::Debug for FnEquality<E, H> {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str("FnEquality")
    }
}

/// Compares `(key, value)` entries by key only, giving map semantics to a
/// hash-bucketed tree of pairs.
///
/// ```rust
/// use ordtree::compare::{DefaultEquality, EqualityComparer, KeyEquality};
///
/// let by_key: KeyEquality<DefaultEquality> = KeyEquality::default();
/// assert!(by_key.equals(&("a", 1), &("a", 2)));
/// assert_eq!(by_key.hash_of(&("a", 1)), by_key.key_hash(&"a"));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyEquality<E> {
    keys: E,
}

impl<E> KeyEquality<E> {
    /// Compares entry keys with `keys`.
    #[must_use]
    pub const fn new(keys: E) -> Self {
        Self { keys }
    }

    /// Hashes a bare key the same way the entry holding it is hashed.
    pub fn key_hash<K: ?Sized>(&self, key: &K) -> u64
    where
        E: EqualityComparer<K>,
    {
        self.keys.hash_of(key)
    }

    /// Compares two bare keys.
    pub fn keys_equal<K: ?Sized>(&self, left: &K, right: &K) -> bool
    where
        E: EqualityComparer<K>,
    {
        self.keys.equals(left, right)
    }
}

impl<K, V, E: EqualityComparer<K>> EqualityComparer<(K, V)> for KeyEquality<E> {
    #[inline]
    fn equals(&self, left: &(K, V), right: &(K, V)) -> bool {
        self.keys.equals(&left.0, &right.0)
    }

    #[inline]
    fn hash_of(&self, value: &(K, V)) -> u64 {
        self.keys.hash_of(&value.0)
    }
}

//! The tree handle: root, branching factor and every index-based algorithm.

use std::cmp::Ordering;

use super::iter::TreeListIterator;
use super::node::{Internal, Node};
use super::validate::ValidationRule;
use super::ReferenceCounter;
use crate::compare::{Comparer, DuplicateAware, SearchBias};
use crate::error::{TreeError, check_branching_factor, check_index, check_position, check_range};

/// Branching factor used when none is given.
///
/// Matches [`INLINE_CAPACITY`](crate::node_array::INLINE_CAPACITY), so nodes
/// of default trees never spill to the heap.
pub const DEFAULT_BRANCHING_FACTOR: usize = 8;

/// Root handle and branching factor of one tree.
///
/// Cloning a tree clones the root handle only; the two trees share every node
/// until one of them is mutated.
pub(crate) struct Tree<T> {
    root: ReferenceCounter<Node<T>>,
    branching_factor: usize,
}

impl<T> Clone for Tree<T> {
    fn clone(&self) -> Self {
        Self {
            root: self.root.clone(),
            branching_factor: self.branching_factor,
        }
    }
}

impl<T> Tree<T> {
    pub(crate) fn new(branching_factor: usize) -> Result<Self, TreeError> {
        check_branching_factor(branching_factor)?;
        Ok(Self::with_checked_factor(branching_factor))
    }

    pub(crate) fn with_default_factor() -> Self {
        Self::with_checked_factor(DEFAULT_BRANCHING_FACTOR)
    }

    fn with_checked_factor(branching_factor: usize) -> Self {
        Self {
            root: ReferenceCounter::new(Node::empty()),
            branching_factor,
        }
    }

    /// Builds a packed tree from `items`. `branching_factor` must already be
    /// validated.
    pub(crate) fn packed(items: Vec<T>, branching_factor: usize) -> Self {
        Self {
            root: ReferenceCounter::new(Node::packed(items, branching_factor)),
            branching_factor,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.root.count()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) const fn branching_factor(&self) -> usize {
        self.branching_factor
    }

    pub(crate) fn height(&self) -> usize {
        self.root.height()
    }

    pub(crate) const fn root(&self) -> &ReferenceCounter<Node<T>> {
        &self.root
    }

    #[cfg(test)]
    pub(crate) fn replace_root(&mut self, root: ReferenceCounter<Node<T>>) {
        self.root = root;
    }

    /// Returns `true` if both trees have the same root node.
    pub(crate) fn ptr_eq(&self, other: &Self) -> bool {
        ReferenceCounter::ptr_eq(&self.root, &other.root)
    }

    pub(crate) fn get(&self, index: usize) -> Option<&T> {
        self.root.get(index)
    }

    pub(crate) fn iter(&self) -> TreeListIterator<'_, T> {
        TreeListIterator::new(&self.root, 0, self.len())
    }

    pub(crate) fn range(&self, start: usize, count: usize) -> Result<TreeListIterator<'_, T>, TreeError> {
        check_range(start, count, self.len())?;
        Ok(TreeListIterator::new(&self.root, start, count))
    }

    /// Iterates from `start` to the end. `start` may equal the length.
    pub(crate) fn iter_from(&self, start: usize) -> TreeListIterator<'_, T> {
        let start = start.min(self.len());
        TreeListIterator::new(&self.root, start, self.len() - start)
    }

    pub(crate) fn clear(&mut self) {
        self.root = ReferenceCounter::new(Node::empty());
    }

    // =========================================================================
    // Searching
    // =========================================================================

    pub(crate) fn find_index_in<P>(&self, start: usize, count: usize, predicate: P) -> Result<Option<usize>, TreeError>
    where
        P: FnMut(&T) -> bool,
    {
        Ok(self.range(start, count)?.position(predicate).map(|offset| start + offset))
    }

    pub(crate) fn find_last_index_in<P>(
        &self,
        start: usize,
        count: usize,
        predicate: P,
    ) -> Result<Option<usize>, TreeError>
    where
        P: FnMut(&T) -> bool,
    {
        Ok(self.range(start, count)?.rposition(predicate).map(|offset| start + offset))
    }

    /// Returns the first position in `[index, index + count)` whose item
    /// fails `before`. The window must already be validated.
    pub(crate) fn partition_point<P>(&self, index: usize, count: usize, mut before: P) -> usize
    where
        P: FnMut(&T) -> bool,
    {
        self.root.partition_point(index, index + count, &mut before)
    }

    /// Binary search over `[index, index + count)` driven by `order`, which
    /// orders an item relative to the searched value. The window must already
    /// be validated.
    ///
    /// The bounds of the run of items ordered `Equal` come from two
    /// descents. The midpoint sequence of a classic `low + (high - low) / 2`
    /// search is then replayed on indices alone, so the index reported for a
    /// run of duplicates is the one a search over a slice reports.
    pub(crate) fn search_window<F>(&self, index: usize, count: usize, mut order: F) -> Result<usize, usize>
    where
        F: FnMut(&T) -> Ordering,
    {
        let end = index + count;
        let lower = self.partition_point(index, count, |item| order(item).is_lt());
        let upper = self.partition_point(lower, end - lower, |item| order(item).is_le());

        let mut low = index;
        let mut high = end;
        while low < high {
            let middle = low + (high - low) / 2;
            if middle < lower {
                low = middle + 1;
            } else if middle >= upper {
                high = middle;
            } else {
                return Ok(middle);
            }
        }
        Err(low)
    }

    pub(crate) fn binary_search_by<C>(
        &self,
        index: usize,
        count: usize,
        value: &T,
        comparer: &C,
    ) -> Result<Result<usize, usize>, TreeError>
    where
        C: Comparer<T> + ?Sized,
    {
        check_range(index, count, self.len())?;
        Ok(self.search_window(index, count, |item| comparer.compare(item, value)))
    }

    /// Searches the whole tree with a [`DuplicateAware`] comparer.
    ///
    /// Returns the insertion point the bias settles on and whether an equal
    /// item sits next to it: at the point for [`SearchBias::First`], just
    /// before it for [`SearchBias::Last`].
    pub(crate) fn biased_search<C>(&self, value: &T, comparer: &C, bias: SearchBias) -> (usize, bool)
    where
        C: Comparer<T> + ?Sized,
    {
        let biased = DuplicateAware::new(comparer, bias);
        let point = self.partition_point(0, self.len(), |item| biased.compare(item, value).is_lt());
        let neighbour = match bias {
            SearchBias::First => self.get(point),
            SearchBias::Last => point.checked_sub(1).and_then(|index| self.get(index)),
        };
        let matched = neighbour.is_some_and(|item| comparer.compare(item, value).is_eq());
        (point, matched)
    }

    /// Copies `count` items starting at `start` into `destination[offset..]`.
    pub(crate) fn copy_to(
        &self,
        start: usize,
        destination: &mut [T],
        offset: usize,
        count: usize,
    ) -> Result<(), TreeError>
    where
        T: Clone,
    {
        let items = self.range(start, count)?;
        let required = offset.saturating_add(count);
        if required > destination.len() {
            return Err(TreeError::DestinationTooSmall {
                required,
                available: destination.len(),
            });
        }
        for (slot, item) in destination[offset..required].iter_mut().zip(items) {
            slot.clone_from(item);
        }
        Ok(())
    }

    pub(crate) fn convert<U, F>(&self, map: F) -> Tree<U>
    where
        F: FnMut(&T) -> U,
    {
        Tree::packed(self.iter().map(map).collect(), self.branching_factor)
    }
}

impl<T: Clone> Tree<T> {
    pub(crate) fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        ReferenceCounter::make_mut(&mut self.root).get_mut(index)
    }

    pub(crate) fn set(&mut self, index: usize, value: T) -> Result<T, TreeError> {
        let length = self.len();
        check_index(index, length)?;
        let slot = self
            .get_mut(index)
            .ok_or(TreeError::IndexOutOfRange { index, length })?;
        Ok(std::mem::replace(slot, value))
    }

    /// Inserts `item` at `index` (`index == len` appends).
    ///
    /// A full node is split before the item lands; when the root splits a new
    /// root is grown above the two halves.
    pub(crate) fn insert(&mut self, index: usize, item: T) -> Result<(), TreeError> {
        check_position(index, self.len())?;
        self.insert_unchecked(index, item);
        Ok(())
    }

    pub(crate) fn push_back(&mut self, item: T) {
        self.insert_unchecked(self.len(), item);
    }

    fn insert_unchecked(&mut self, index: usize, item: T) {
        let root = ReferenceCounter::make_mut(&mut self.root);
        if let Some(sibling) = root.insert(index, item, self.branching_factor) {
            let left = std::mem::replace(root, Node::empty());
            *root = Node::Internal(Internal::from_children([left, sibling]));
            #[cfg(feature = "tracing")]
            tracing::trace!(height = root.height(), "grew new root");
        }
    }

    pub(crate) fn remove_at(&mut self, index: usize) -> Result<T, TreeError> {
        let length = self.len();
        check_index(index, length)?;
        let removed = ReferenceCounter::make_mut(&mut self.root)
            .remove(index)
            .ok_or(TreeError::IndexOutOfRange { index, length })?;
        self.collapse_root();
        Ok(removed)
    }

    pub(crate) fn remove_range(&mut self, start: usize, count: usize) -> Result<(), TreeError> {
        check_range(start, count, self.len())?;
        if count == 0 {
            return Ok(());
        }
        if count == self.len() {
            self.clear();
            return Ok(());
        }
        ReferenceCounter::make_mut(&mut self.root).remove_range(start, count)?;
        self.collapse_root();
        Ok(())
    }

    /// Replaces an internal root that is left with a single child by that
    /// child, and one left without children by an empty leaf.
    fn collapse_root(&mut self) {
        loop {
            let replacement = match self.root.as_ref() {
                Node::Internal(internal) => match internal.children.as_slice() {
                    [] => ReferenceCounter::new(Node::empty()),
                    [only] => only.clone(),
                    _ => return,
                },
                Node::Leaf(_) => return,
            };
            self.root = replacement;
            #[cfg(feature = "tracing")]
            tracing::trace!(height = self.root.height(), "collapsed root");
        }
    }

    /// Takes every item out of the tree, leaving it empty.
    pub(crate) fn take_vec(&mut self) -> Vec<T> {
        let root = std::mem::replace(&mut self.root, ReferenceCounter::new(Node::empty()));
        let mut items = Vec::with_capacity(root.count());
        ReferenceCounter::unwrap_or_clone(root).drain_into(&mut items);
        items
    }

    pub(crate) fn into_vec(mut self) -> Vec<T> {
        self.take_vec()
    }

    /// Replaces the content with a packed tree of `items`.
    pub(crate) fn rebuild(&mut self, items: Vec<T>) {
        self.root = ReferenceCounter::new(Node::packed(items, self.branching_factor));
    }

    /// Repacks the tree so every node but the last on each level is full.
    ///
    /// Returns `false` without touching a node when the tree is already
    /// packed.
    pub(crate) fn trim_excess(&mut self) -> bool {
        if self.check(ValidationRule::RequirePacked).is_ok() {
            return false;
        }
        let items = self.take_vec();
        self.rebuild(items);
        #[cfg(feature = "tracing")]
        tracing::debug!(
            count = self.len(),
            height = self.height(),
            "rebuilt packed tree"
        );
        true
    }

    pub(crate) fn get_range(&self, start: usize, count: usize) -> Result<Self, TreeError> {
        let items = self.range(start, count)?.cloned().collect();
        Ok(Self::packed(items, self.branching_factor))
    }

    pub(crate) fn find_all<P>(&self, mut predicate: P) -> Self
    where
        P: FnMut(&T) -> bool,
    {
        let items = self.iter().filter(|item| predicate(*item)).cloned().collect();
        Self::packed(items, self.branching_factor)
    }

    /// Removes every item matching `predicate`, returning how many went.
    pub(crate) fn remove_all<P>(&mut self, mut predicate: P) -> usize
    where
        P: FnMut(&T) -> bool,
    {
        if !self.iter().any(&mut predicate) {
            return 0;
        }
        let mut items = self.take_vec();
        let before = items.len();
        items.retain(|item| !predicate(item));
        let removed = before - items.len();
        self.rebuild(items);
        removed
    }

    /// Inserts every item of `items` at `index`, in order.
    pub(crate) fn insert_range<I>(&mut self, index: usize, items: I) -> Result<(), TreeError>
    where
        I: IntoIterator<Item = T>,
    {
        check_position(index, self.len())?;
        if self.is_empty() {
            self.rebuild(items.into_iter().collect());
            return Ok(());
        }
        for (offset, item) in items.into_iter().enumerate() {
            self.insert(index + offset, item)?;
        }
        Ok(())
    }

    /// Sorts `[index, index + count)` with `comparer`.
    ///
    /// A window inside one leaf is sorted in place with the node sort;
    /// anything wider is sorted stably as a flat sequence and rebuilt.
    pub(crate) fn sort_range<C>(&mut self, index: usize, count: usize, comparer: &C) -> Result<(), TreeError>
    where
        C: Comparer<T> + ?Sized,
    {
        check_range(index, count, self.len())?;
        if count < 2 {
            return Ok(());
        }
        let within_leaf = self
            .root
            .leaf(index)
            .is_some_and(|(items, offset)| offset + count <= items.len());
        if within_leaf {
            if let Some((items, offset)) = ReferenceCounter::make_mut(&mut self.root).leaf_mut(index) {
                items.sort(offset, count, comparer)?;
            }
            return Ok(());
        }

        let mut items = self.take_vec();
        items[index..index + count].sort_by(|left, right| comparer.compare(left, right));
        self.rebuild(items);
        Ok(())
    }

    pub(crate) fn reverse_range(&mut self, index: usize, count: usize) -> Result<(), TreeError> {
        check_range(index, count, self.len())?;
        if count < 2 {
            return Ok(());
        }
        let mut items = self.take_vec();
        items[index..index + count].reverse();
        self.rebuild(items);
        Ok(())
    }
}

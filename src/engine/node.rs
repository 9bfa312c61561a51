//! Leaf and internal nodes and the recursive algorithms that walk them.

use super::ReferenceCounter;
use crate::error::TreeError;
use crate::node_array::NodeArray;

/// A tree node: a leaf of items or an internal node of counted children.
#[derive(Debug, Clone)]
pub(crate) enum Node<T> {
    Leaf(NodeArray<T>),
    Internal(Internal<T>),
}

/// Child handles, the exact item count of each child subtree, and their sum.
#[derive(Debug, Clone)]
pub(crate) struct Internal<T> {
    pub(crate) children: NodeArray<ReferenceCounter<Node<T>>>,
    pub(crate) counts: NodeArray<usize>,
    pub(crate) count: usize,
}

impl<T> Node<T> {
    pub(crate) fn empty() -> Self {
        Self::Leaf(NodeArray::new())
    }

    /// Number of items in the subtree rooted here.
    pub(crate) fn count(&self) -> usize {
        match self {
            Self::Leaf(items) => items.len(),
            Self::Internal(internal) => internal.count,
        }
    }

    /// Number of entries (items or children) held directly by this node.
    pub(crate) fn width(&self) -> usize {
        match self {
            Self::Leaf(items) => items.len(),
            Self::Internal(internal) => internal.children.len(),
        }
    }

    pub(crate) const fn is_leaf(&self) -> bool {
        matches!(self, Self::Leaf(_))
    }

    /// Number of levels below and including this node.
    pub(crate) fn height(&self) -> usize {
        let mut height = 1;
        let mut node = self;
        while let Self::Internal(internal) = node {
            match internal.children.as_slice().first() {
                Some(child) => node = child.as_ref(),
                None => break,
            }
            height += 1;
        }
        height
    }

    /// Finds the leaf holding position `index` and the offset within it.
    ///
    /// An index equal to the subtree count resolves to the end of the last
    /// leaf, which is where an append lands.
    pub(crate) fn leaf(&self, mut index: usize) -> Option<(&NodeArray<T>, usize)> {
        let mut node = self;
        loop {
            match node {
                Self::Leaf(items) => return Some((items, index)),
                Self::Internal(internal) => {
                    let (slot, offset) = internal.locate(index);
                    node = internal.children.as_slice().get(slot)?.as_ref();
                    index = offset;
                }
            }
        }
    }

    pub(crate) fn get(&self, index: usize) -> Option<&T> {
        self.leaf(index)
            .and_then(|(items, offset)| items.as_slice().get(offset))
    }

    /// First item of the subtree, reached down the leftmost spine.
    pub(crate) fn first(&self) -> Option<&T> {
        let mut node = self;
        loop {
            match node {
                Self::Leaf(items) => return items.as_slice().first(),
                Self::Internal(internal) => node = internal.children.as_slice().first()?.as_ref(),
            }
        }
    }

    /// Returns the first position in `[start, end)` whose item fails
    /// `before`, or `end` when every item passes.
    ///
    /// `before` must hold for a prefix of the window and fail for the rest.
    /// The search makes one descent: each internal node picks its child by
    /// testing the first items of the children the window covers.
    pub(crate) fn partition_point<P>(&self, start: usize, end: usize, before: &mut P) -> usize
    where
        P: FnMut(&T) -> bool,
    {
        match self {
            Self::Leaf(items) => items
                .as_slice()
                .get(start..end)
                .map_or(start, |window| start + window.partition_point(|item| before(item))),
            Self::Internal(internal) => internal.partition_point(start, end, before),
        }
    }

    /// Builds a packed subtree: every node but the last on each level holds
    /// exactly `capacity` entries.
    pub(crate) fn packed(items: Vec<T>, capacity: usize) -> Self {
        let mut items = items.into_iter().peekable();
        let mut level: Vec<Self> = Vec::new();
        while items.peek().is_some() {
            level.push(Self::Leaf(items.by_ref().take(capacity).collect()));
        }

        while level.len() > 1 {
            let mut parents = Vec::with_capacity(level.len().div_ceil(capacity));
            let mut nodes = level.into_iter().peekable();
            while nodes.peek().is_some() {
                parents.push(Self::Internal(Internal::from_children(
                    nodes.by_ref().take(capacity),
                )));
            }
            level = parents;
        }
        level.pop().unwrap_or_else(Self::empty)
    }
}

impl<T: Clone> Node<T> {
    /// Mutable counterpart of [`leaf`](Self::leaf). Every node on the path is
    /// made unique first, copying it when it is shared.
    pub(crate) fn leaf_mut(&mut self, index: usize) -> Option<(&mut NodeArray<T>, usize)> {
        match self {
            Self::Leaf(items) => Some((items, index)),
            Self::Internal(internal) => {
                let (slot, offset) = internal.locate(index);
                let child = internal.children.as_mut_slice().get_mut(slot)?;
                ReferenceCounter::make_mut(child).leaf_mut(offset)
            }
        }
    }

    pub(crate) fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.leaf_mut(index)
            .and_then(|(items, offset)| items.as_mut_slice().get_mut(offset))
    }

    /// Inserts `item` at `index`, returning the new right sibling when this
    /// node had to split.
    pub(crate) fn insert(&mut self, index: usize, item: T, capacity: usize) -> Option<Self> {
        match self {
            Self::Leaf(items) => items
                .insert_with_split(index, item, capacity)
                .map(Self::Leaf),
            Self::Internal(internal) => internal.insert(index, item, capacity).map(Self::Internal),
        }
    }

    /// Removes the item at `index`. Children left empty are pruned; underfull
    /// nodes are left as they are.
    pub(crate) fn remove(&mut self, index: usize) -> Option<T> {
        match self {
            Self::Leaf(items) => items.remove(index).ok(),
            Self::Internal(internal) => internal.remove(index),
        }
    }

    /// Removes `count` items starting at `start`.
    ///
    /// Children covered entirely by the window are dropped without being
    /// visited, so shared subtrees are released rather than copied.
    pub(crate) fn remove_range(&mut self, start: usize, count: usize) -> Result<(), TreeError> {
        match self {
            Self::Leaf(items) => items.mark_unused(start, count),
            Self::Internal(internal) => internal.remove_range(start, count),
        }
    }

    /// Moves every item of the subtree into `output`, cloning only the items
    /// of nodes that are still shared.
    pub(crate) fn drain_into(self, output: &mut Vec<T>) {
        match self {
            Self::Leaf(items) => output.extend(items),
            Self::Internal(internal) => {
                for child in internal.children {
                    ReferenceCounter::unwrap_or_clone(child).drain_into(output);
                }
            }
        }
    }
}

impl<T> Internal<T> {
    pub(crate) fn from_children<I>(nodes: I) -> Self
    where
        I: IntoIterator<Item = Node<T>>,
    {
        let mut internal = Self {
            children: NodeArray::new(),
            counts: NodeArray::new(),
            count: 0,
        };
        for node in nodes {
            let count = node.count();
            internal.count += count;
            internal.counts.push(count);
            internal.children.push(ReferenceCounter::new(node));
        }
        internal
    }

    /// Resolves `index` to `(slot, offset)` by scanning the child counts.
    ///
    /// Positions past the end resolve into the last child.
    pub(crate) fn locate(&self, mut index: usize) -> (usize, usize) {
        let last = self.counts.len().saturating_sub(1);
        for (slot, &count) in self.counts.iter().enumerate() {
            if index < count || slot == last {
                return (slot, index);
            }
            index -= count;
        }
        (0, index)
    }

    /// Position of the first item of the child at `slot`.
    fn offset_of(&self, slot: usize) -> usize {
        self.counts.iter().take(slot).sum()
    }

    fn partition_point<P>(&self, start: usize, end: usize, before: &mut P) -> usize
    where
        P: FnMut(&T) -> bool,
    {
        if start >= end {
            return start;
        }
        let (first_slot, _) = self.locate(start);
        let (last_slot, _) = self.locate(end - 1);
        let passed = self
            .children
            .as_slice()
            .get(first_slot + 1..=last_slot)
            .map_or(0, |candidates| {
                candidates.partition_point(|child| child.first().is_some_and(|item| before(item)))
            });
        let slot = first_slot + passed;
        let Some(child) = self.children.as_slice().get(slot) else {
            return start;
        };
        let child_start = self.offset_of(slot);
        let child_end = child_start + self.counts[slot];
        let local_start = start.max(child_start) - child_start;
        let local_end = end.min(child_end) - child_start;
        child_start + child.partition_point(local_start, local_end, before)
    }
}

impl<T: Clone> Internal<T> {
    fn insert(&mut self, index: usize, item: T, capacity: usize) -> Option<Self> {
        let (slot, offset) = self.locate(index);
        let child = ReferenceCounter::make_mut(&mut self.children[slot]);
        let sibling = child.insert(offset, item, capacity);
        let child_count = child.count();
        self.count += 1;
        self.counts[slot] = child_count;

        let sibling = sibling?;
        let sibling_count = sibling.count();
        let back_children =
            self.children
                .insert_with_split(slot + 1, ReferenceCounter::new(sibling), capacity);
        let back_counts = self
            .counts
            .insert_with_split(slot + 1, sibling_count, capacity);

        match (back_children, back_counts) {
            (Some(children), Some(counts)) => {
                let moved: usize = counts.iter().sum();
                self.count -= moved;
                Some(Self {
                    children,
                    counts,
                    count: moved,
                })
            }
            _ => None,
        }
    }

    fn remove(&mut self, index: usize) -> Option<T> {
        let (slot, offset) = self.locate(index);
        let child = ReferenceCounter::make_mut(self.children.as_mut_slice().get_mut(slot)?);
        let removed = child.remove(offset)?;
        let remaining = child.count();
        self.count -= 1;
        if remaining == 0 {
            self.children.remove(slot).ok()?;
            self.counts.remove(slot).ok()?;
        } else {
            self.counts[slot] = remaining;
        }
        Some(removed)
    }

    fn remove_range(&mut self, start: usize, count: usize) -> Result<(), TreeError> {
        let mut slot = 0;
        let mut offset = start;
        let mut remaining = count;
        while remaining > 0 && slot < self.counts.len() {
            let child_count = self.counts[slot];
            if offset >= child_count {
                offset -= child_count;
                slot += 1;
                continue;
            }

            let taken = (child_count - offset).min(remaining);
            if taken == child_count {
                self.children.remove(slot)?;
                self.counts.remove(slot)?;
            } else {
                ReferenceCounter::make_mut(&mut self.children[slot]).remove_range(offset, taken)?;
                self.counts[slot] -= taken;
                slot += 1;
            }
            self.count -= taken;
            remaining -= taken;
            offset = 0;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn collect<T: Clone>(node: &Node<T>) -> Vec<T> {
        let mut output = Vec::new();
        node.clone().drain_into(&mut output);
        output
    }

    #[rstest]
    #[case(0, 1)]
    #[case(3, 1)]
    #[case(4, 2)]
    #[case(9, 2)]
    #[case(10, 3)]
    #[case(27, 3)]
    #[case(28, 4)]
    fn test_packed_height(#[case] count: usize, #[case] expected: usize) {
        let node = Node::packed((0..count).collect(), 3);
        assert_eq!(node.height(), expected);
        assert_eq!(node.count(), count);
        assert_eq!(collect(&node), (0..count).collect::<Vec<_>>());
    }

    #[rstest]
    fn test_locate_resolves_slots() {
        let Node::Internal(internal) = Node::packed((0..7).collect::<Vec<_>>(), 3) else {
            panic!("expected an internal root");
        };
        assert_eq!(internal.locate(0), (0, 0));
        assert_eq!(internal.locate(2), (0, 2));
        assert_eq!(internal.locate(3), (1, 0));
        assert_eq!(internal.locate(6), (2, 0));
        assert_eq!(internal.locate(7), (2, 1));
    }

    #[rstest]
    fn test_get_descends_by_count() {
        let node = Node::packed((0..50).collect::<Vec<_>>(), 4);
        for index in 0..50 {
            assert_eq!(node.get(index), Some(&index));
        }
        assert_eq!(node.get(50), None);
    }

    #[rstest]
    fn test_insert_splits_and_reports_sibling() {
        let mut node = Node::packed(vec![1, 2, 3], 3);
        let sibling = node.insert(0, 0, 3).unwrap();
        assert_eq!(collect(&node), vec![0, 1]);
        assert_eq!(collect(&sibling), vec![2, 3]);
    }

    #[rstest]
    fn test_remove_prunes_empty_children() {
        let mut node = Node::packed((0..4).collect::<Vec<_>>(), 3);
        assert_eq!(node.remove(3), Some(3));
        let Node::Internal(internal) = &node else {
            panic!("expected an internal root");
        };
        assert_eq!(internal.children.len(), 1);
        assert_eq!(internal.count, 3);
    }

    #[rstest]
    fn test_remove_range_drops_whole_children() {
        let mut node = Node::packed((0..9).collect::<Vec<_>>(), 3);
        node.remove_range(2, 5).unwrap();
        assert_eq!(collect(&node), vec![0, 1, 7, 8]);
        assert_eq!(node.count(), 4);
        assert_eq!(node.width(), 2);
    }

    #[rstest]
    fn test_leaf_mut_copies_shared_path_only() {
        let mut node = Node::packed((0..9).collect::<Vec<_>>(), 3);
        let snapshot = node.clone();
        *node.get_mut(4).unwrap() = 40;

        assert_eq!(snapshot.get(4), Some(&4));
        assert_eq!(node.get(4), Some(&40));
        let (Node::Internal(before), Node::Internal(after)) = (&snapshot, &node) else {
            panic!("expected internal roots");
        };
        assert!(ReferenceCounter::ptr_eq(&before.children[0], &after.children[0]));
        assert!(!ReferenceCounter::ptr_eq(&before.children[1], &after.children[1]));
        assert!(ReferenceCounter::ptr_eq(&before.children[2], &after.children[2]));
    }
}

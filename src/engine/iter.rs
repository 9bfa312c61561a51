//! Borrowing and owning iterators over the items of a tree.

use std::iter::FusedIterator;

use super::node::{Internal, Node};

/// One ancestor on the path to the cached leaf.
struct PathEntry<'a, T> {
    /// The internal node
    node: &'a Internal<T>,
    /// Slot of the child the path continues through
    slot: usize,
}

/// A position inside the tree: the path from the root, the cached leaf and the
/// offset within it.
///
/// Stepping to a neighbouring leaf climbs only as far as the first ancestor
/// with a neighbouring slot, so a full traversal is O(n).
struct LeafCursor<'a, T> {
    path: Vec<PathEntry<'a, T>>,
    leaf: &'a [T],
    position: usize,
}

impl<'a, T> LeafCursor<'a, T> {
    /// Positions the cursor on item `index`.
    fn seek(root: &'a Node<T>, mut index: usize) -> Self {
        let mut path = Vec::with_capacity(root.height());
        let mut node = root;
        loop {
            match node {
                Node::Leaf(items) => {
                    return Self {
                        path,
                        leaf: items.as_slice(),
                        position: index,
                    };
                }
                Node::Internal(internal) => {
                    let (slot, offset) = internal.locate(index);
                    let Some(child) = internal.children.as_slice().get(slot) else {
                        return Self {
                            path,
                            leaf: &[],
                            position: 0,
                        };
                    };
                    path.push(PathEntry {
                        node: internal,
                        slot,
                    });
                    node = child.as_ref();
                    index = offset;
                }
            }
        }
    }

    fn current(&self) -> Option<&'a T> {
        self.leaf.get(self.position)
    }

    /// Descends from `node` to its first (or last) leaf.
    fn descend(&mut self, mut node: &'a Node<T>, from_back: bool) {
        loop {
            match node {
                Node::Leaf(items) => {
                    self.leaf = items.as_slice();
                    self.position = if from_back { items.len().saturating_sub(1) } else { 0 };
                    return;
                }
                Node::Internal(internal) => {
                    let slot = if from_back {
                        internal.children.len().saturating_sub(1)
                    } else {
                        0
                    };
                    let Some(child) = internal.children.as_slice().get(slot) else {
                        self.leaf = &[];
                        return;
                    };
                    self.path.push(PathEntry {
                        node: internal,
                        slot,
                    });
                    node = child.as_ref();
                }
            }
        }
    }

    fn step_forward(&mut self) {
        self.position += 1;
        if self.position < self.leaf.len() {
            return;
        }
        while let Some(entry) = self.path.pop() {
            let next = entry.slot + 1;
            if let Some(child) = entry.node.children.as_slice().get(next) {
                self.path.push(PathEntry {
                    node: entry.node,
                    slot: next,
                });
                self.descend(child, false);
                return;
            }
        }
        self.leaf = &[];
        self.position = 0;
    }

    fn step_backward(&mut self) {
        if self.position > 0 {
            self.position -= 1;
            return;
        }
        while let Some(entry) = self.path.pop() {
            if entry.slot > 0 {
                let previous = entry.slot - 1;
                self.path.push(PathEntry {
                    node: entry.node,
                    slot: previous,
                });
                self.descend(&entry.node.children[previous], true);
                return;
            }
        }
        self.leaf = &[];
    }
}

/// An iterator over references to the items of a list, in index order.
///
/// Returned by `iter()` and `range()` on every list type of the crate. It is
/// double-ended, so `iter().rev()` walks the list backwards, and knows its
/// exact length.
///
/// # Examples
///
/// ```rust
/// use ordtree::TreeList;
///
/// let list: TreeList<i32> = (0..10).collect();
/// let tail: Vec<i32> = list.range(6, 4).unwrap().rev().copied().collect();
/// assert_eq!(tail, vec![9, 8, 7, 6]);
/// ```
pub struct TreeListIterator<'a, T> {
    front: LeafCursor<'a, T>,
    back: LeafCursor<'a, T>,
    remaining: usize,
}

impl<'a, T> TreeListIterator<'a, T> {
    /// Iterates `count` items starting at `start`; the window must be valid.
    pub(crate) fn new(root: &'a Node<T>, start: usize, count: usize) -> Self {
        let front = LeafCursor::seek(root, start);
        let back = if count <= 1 {
            LeafCursor::seek(root, start)
        } else {
            LeafCursor::seek(root, start + count - 1)
        };
        Self {
            front,
            back,
            remaining: count,
        }
    }
}

impl<'a, T> Iterator for TreeListIterator<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let item = self.front.current()?;
        self.remaining -= 1;
        if self.remaining > 0 {
            self.front.step_forward();
        }
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> DoubleEndedIterator for TreeListIterator<'_, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let item = self.back.current()?;
        self.remaining -= 1;
        if self.remaining > 0 {
            self.back.step_backward();
        }
        Some(item)
    }
}

impl<T> ExactSizeIterator for TreeListIterator<'_, T> {
    fn len(&self) -> usize {
        self.remaining
    }
}

impl<T> FusedIterator for TreeListIterator<'_, T> {}

/// An owning iterator over the items of a list.
///
/// Items of nodes still shared with another list are cloned; items of nodes
/// owned by the consumed list alone are moved.
pub struct TreeListIntoIterator<T> {
    items: std::vec::IntoIter<T>,
}

impl<T> TreeListIntoIterator<T> {
    pub(crate) fn new(items: Vec<T>) -> Self {
        Self {
            items: items.into_iter(),
        }
    }
}

impl<T> Iterator for TreeListIntoIterator<T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        self.items.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.items.size_hint()
    }
}

impl<T> DoubleEndedIterator for TreeListIntoIterator<T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.items.next_back()
    }
}

impl<T> ExactSizeIterator for TreeListIntoIterator<T> {}

impl<T> FusedIterator for TreeListIntoIterator<T> {}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn tree(count: usize, capacity: usize) -> Node<usize> {
        Node::packed((0..count).collect(), capacity)
    }

    #[rstest]
    #[case(0, 3)]
    #[case(1, 3)]
    #[case(3, 3)]
    #[case(10, 3)]
    #[case(100, 2)]
    #[case(100, 8)]
    fn test_forward_and_backward_traversal(#[case] count: usize, #[case] capacity: usize) {
        let root = tree(count, capacity);
        let forward: Vec<usize> = TreeListIterator::new(&root, 0, count).copied().collect();
        assert_eq!(forward, (0..count).collect::<Vec<_>>());
        let backward: Vec<usize> = TreeListIterator::new(&root, 0, count).rev().copied().collect();
        assert_eq!(backward, (0..count).rev().collect::<Vec<_>>());
    }

    #[rstest]
    #[case(0, 0)]
    #[case(5, 1)]
    #[case(2, 17)]
    #[case(9, 30)]
    fn test_range_window(#[case] start: usize, #[case] count: usize) {
        let root = tree(40, 3);
        let items: Vec<usize> = TreeListIterator::new(&root, start, count).copied().collect();
        assert_eq!(items, (start..start + count).collect::<Vec<_>>());
    }

    #[rstest]
    fn test_meets_in_the_middle() {
        let root = tree(20, 3);
        let mut iterator = TreeListIterator::new(&root, 0, 20);
        let mut seen = Vec::new();
        while let (Some(front), Some(back)) = (iterator.next(), iterator.next_back()) {
            seen.push(*front);
            seen.push(*back);
        }
        seen.sort_unstable();
        assert_eq!(seen, (0..20).collect::<Vec<_>>());
        assert_eq!(iterator.len(), 0);
        assert_eq!(iterator.next(), None);
    }

    #[rstest]
    fn test_exact_size() {
        let root = tree(25, 4);
        let mut iterator = TreeListIterator::new(&root, 3, 10);
        assert_eq!(iterator.len(), 10);
        iterator.next();
        iterator.next_back();
        assert_eq!(iterator.len(), 8);
    }
}

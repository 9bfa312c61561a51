//! Structural self-check of a tree, level by level.

use super::node::Node;
use super::tree::Tree;
use crate::error::TreeError;

/// How strictly [`validate`](crate::TreeList::validate) checks a tree.
///
/// # Examples
///
/// ```rust
/// use ordtree::{TreeList, ValidationRule};
///
/// let mut list = TreeList::with_branching_factor(4).unwrap();
/// for value in 0..20 {
///     list.insert(0, value).unwrap();
/// }
/// assert!(list.validate(ValidationRule::Structural).is_ok());
/// assert!(list.validate(ValidationRule::RequirePacked).is_err());
///
/// list.trim_excess();
/// assert!(list.validate(ValidationRule::RequirePacked).is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ValidationRule {
    /// Counts are exact, every leaf sits at the same depth, no node exceeds
    /// the branching factor and no node below the root is empty.
    #[default]
    Structural,
    /// Everything [`Structural`](Self::Structural) checks, plus: every node
    /// except the last on its level holds exactly B entries, and the root is
    /// not an internal node with a single child.
    RequirePacked,
}

impl<T> Tree<T> {
    /// Validates the tree, logging the violation when there is one.
    pub(crate) fn validate(&self, rule: ValidationRule) -> Result<(), TreeError> {
        let result = self.check(rule);
        #[cfg(feature = "tracing")]
        if let Err(error) = &result {
            tracing::debug!(%error, ?rule, "tree validation failed");
        }
        result
    }

    /// Validates the tree without logging.
    pub(crate) fn check(&self, rule: ValidationRule) -> Result<(), TreeError> {
        let capacity = self.branching_factor();
        let root: &Node<T> = self.root();

        if rule == ValidationRule::RequirePacked
            && let Node::Internal(internal) = root
            && internal.children.len() < 2
        {
            return Err(TreeError::invariant(
                0,
                "internal root with fewer than two children",
            ));
        }

        let mut level = vec![root];
        let mut depth = 0;
        loop {
            let leaves = level.iter().filter(|node| node.is_leaf()).count();
            if leaves != 0 && leaves != level.len() {
                return Err(TreeError::invariant(
                    depth,
                    "leaves and internal nodes on the same level",
                ));
            }

            let last = level.len() - 1;
            let mut next = Vec::new();
            for (position, node) in level.iter().copied().enumerate() {
                check_node(node, position, position == last, depth, capacity, rule)?;
                if let Node::Internal(internal) = node {
                    next.extend(internal.children.iter().map(|child| &**child));
                }
            }

            if next.is_empty() {
                return Ok(());
            }
            level = next;
            depth += 1;
        }
    }
}

fn check_node<T>(
    node: &Node<T>,
    position: usize,
    is_last: bool,
    depth: usize,
    capacity: usize,
    rule: ValidationRule,
) -> Result<(), TreeError> {
    let width = node.width();
    if width > capacity {
        return Err(TreeError::invariant(
            depth,
            format!("node {position} holds {width} entries, capacity is {capacity}"),
        ));
    }
    if width == 0 && (depth > 0 || !node.is_leaf()) {
        return Err(TreeError::invariant(depth, format!("node {position} is empty")));
    }
    if rule == ValidationRule::RequirePacked && !is_last && width != capacity {
        return Err(TreeError::invariant(
            depth,
            format!("node {position} holds {width} of {capacity} entries but is not the last on its level"),
        ));
    }

    let Node::Internal(internal) = node else {
        return Ok(());
    };
    if internal.counts.len() != internal.children.len() {
        return Err(TreeError::invariant(
            depth,
            format!(
                "node {position} has {} children but {} counts",
                internal.children.len(),
                internal.counts.len()
            ),
        ));
    }
    let mut total = 0;
    for (slot, (child, &recorded)) in internal.children.iter().zip(internal.counts.iter()).enumerate() {
        let actual = child.count();
        if actual != recorded {
            return Err(TreeError::invariant(
                depth,
                format!("node {position} records {recorded} items in slot {slot} but the child holds {actual}"),
            ));
        }
        total += recorded;
    }
    if total != internal.count {
        return Err(TreeError::invariant(
            depth,
            format!(
                "node {position} declares {} items but its children hold {total}",
                internal.count
            ),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::ReferenceCounter;
    use crate::engine::node::Internal;
    use crate::node_array::NodeArray;
    use rstest::rstest;

    fn leaf(values: &[i32]) -> Node<i32> {
        Node::Leaf(values.iter().copied().collect())
    }

    fn tree_with_root(root: Node<i32>, branching_factor: usize) -> Tree<i32> {
        let mut tree = Tree::packed(Vec::new(), branching_factor);
        tree.replace_root(ReferenceCounter::new(root));
        tree
    }

    #[rstest]
    fn test_packed_tree_passes_both_rules() {
        let tree = Tree::packed((0..12).collect(), 3);
        assert_eq!(tree.check(ValidationRule::Structural), Ok(()));
        assert_eq!(tree.check(ValidationRule::RequirePacked), Ok(()));
    }

    #[rstest]
    fn test_detects_wrong_count() {
        let mut internal = Internal::from_children([leaf(&[1, 2]), leaf(&[3])]);
        internal.counts[1] = 5;
        let tree = tree_with_root(Node::Internal(internal), 3);
        let error = tree.check(ValidationRule::Structural).unwrap_err();
        assert!(matches!(error, TreeError::InvariantViolation { depth: 0, .. }));
    }

    #[rstest]
    fn test_detects_overfull_leaf() {
        let tree = tree_with_root(leaf(&[1, 2, 3, 4]), 3);
        assert!(tree.check(ValidationRule::Structural).is_err());
    }

    #[rstest]
    fn test_detects_mixed_levels() {
        let deep = Node::Internal(Internal::from_children([leaf(&[1])]));
        let root = Node::Internal(Internal::from_children([deep, leaf(&[2])]));
        let tree = tree_with_root(root, 3);
        let error = tree.check(ValidationRule::Structural).unwrap_err();
        assert!(matches!(error, TreeError::InvariantViolation { depth: 1, .. }));
    }

    #[rstest]
    fn test_detects_empty_child() {
        let root = Node::Internal(Internal::from_children([leaf(&[1]), Node::Leaf(NodeArray::new())]));
        let tree = tree_with_root(root, 3);
        assert!(tree.check(ValidationRule::Structural).is_err());
    }

    #[rstest]
    fn test_packed_rule_rejects_underfull_middle_node() {
        let root = Node::Internal(Internal::from_children([leaf(&[1, 2]), leaf(&[3, 4, 5])]));
        let tree = tree_with_root(root, 3);
        assert!(tree.check(ValidationRule::Structural).is_ok());
        assert!(tree.check(ValidationRule::RequirePacked).is_err());
    }

    #[rstest]
    fn test_packed_rule_rejects_single_child_root() {
        let root = Node::Internal(Internal::from_children([leaf(&[1, 2, 3])]));
        let tree = tree_with_root(root, 3);
        assert!(tree.check(ValidationRule::Structural).is_ok());
        assert!(tree.check(ValidationRule::RequirePacked).is_err());
    }

    #[rstest]
    fn test_empty_tree_is_valid() {
        let tree: Tree<i32> = Tree::packed(Vec::new(), 2);
        assert_eq!(tree.check(ValidationRule::RequirePacked), Ok(()));
    }
}

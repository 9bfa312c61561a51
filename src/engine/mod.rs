//! The order-statistics B-tree shared by every list, sorted and
//! hash-bucketed type of the crate.
//!
//! A [`Tree`] is a root handle plus a branching factor. Nodes are either
//! leaves holding up to B items or internal nodes holding up to B child
//! handles together with the exact item count of each child subtree, so an
//! index is resolved by one top-down descent without parent pointers.
//!
//! Children are held through [`ReferenceCounter`] handles and every mutation
//! reaches its nodes through `ReferenceCounter::make_mut`. A node owned by one
//! tree only is changed in place; a node shared with another tree (a
//! persistent snapshot, or the last snapshot a transient published) is copied
//! first. The same code therefore serves in-place mutation and root-to-leaf
//! path copying.

mod bucket;
mod iter;
mod node;
mod tree;
mod validate;

pub(crate) use bucket::{Bucketed, locate_in_bucket};
pub use iter::{TreeListIntoIterator, TreeListIterator};
#[cfg(all(test, feature = "persistent"))]
pub(crate) use node::Node;
pub(crate) use tree::Tree;
pub use tree::DEFAULT_BRANCHING_FACTOR;
pub use validate::ValidationRule;

// =============================================================================
// Reference Counter Type Alias
// =============================================================================

/// Reference-counted handle to a node.
///
/// `std::sync::Arc` with the `arc` feature, so persistent snapshots can be
/// shared between threads; `std::rc::Rc` otherwise.
#[cfg(feature = "arc")]
pub(crate) type ReferenceCounter<T> = std::sync::Arc<T>;

#[cfg(not(feature = "arc"))]
pub(crate) type ReferenceCounter<T> = std::rc::Rc<T>;

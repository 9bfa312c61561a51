//! # ordtree
//!
//! An order-statistics B-tree engine with in-place mutable and persistent
//! (structurally shared) variants.
//!
//! ## Overview
//!
//! Every collection in this crate stores its items in a counted B-tree: each
//! internal node records the exact item count of every child, so an item is
//! found by position with one top-down descent. On top of that engine the
//! crate provides:
//!
//! - **Lists**: [`TreeList`] with O(log n) access, insertion and removal at
//!   any index, and a fail-fast [`TreeListCursor`]
//! - **Sorted lists**: [`SortedTreeList`], ordered by a per-instance
//!   [`Comparer`](compare::Comparer), with first/last-occurrence queries
//! - **Hash-ordered sets**: [`HashBucketedTree`], ordered by hash and
//!   tolerant of arbitrary collisions
//! - **Persistent variants**: [`PersistentTreeList`], [`PersistentSortedTreeList`]
//!   and [`PersistentHashBucketedTree`], which copy only the root-to-leaf path
//!   of an update, plus the [`TransientTreeList`] builder
//!
//! Nodes split eagerly when they overflow and are never merged when they
//! shrink. A tree is repacked on demand with `trim_excess`, and its structure
//! can be checked at any time with `validate`.
//!
//! ## Feature Flags
//!
//! - `persistent`: Persistent collections and transients (default)
//! - `arc`: Share nodes through `Arc` so persistent collections are `Send + Sync`
//! - `fxhash`: Use `rustc-hash` as the default hasher of [`DefaultEquality`](compare::DefaultEquality)
//! - `ahash`: Use `ahash` as the default hasher of [`DefaultEquality`](compare::DefaultEquality)
//! - `tracing`: Emit structural events (root growth, rebuilds, failed validation)
//! - `full`: Enable all features except `arc`
//!
//! ## Example
//!
//! ```rust
//! use ordtree::prelude::*;
//!
//! let mut list: TreeList<i32> = TreeList::with_branching_factor(3)?;
//! for value in 0..12 {
//!     list.push_back(value);
//! }
//! assert_eq!(list.height(), 3);
//! assert!(list.validate(ValidationRule::RequirePacked).is_ok());
//!
//! let snapshot: PersistentTreeList<i32> = list.iter().copied().collect();
//! let updated = snapshot.insert(0, -1)?;
//! assert_eq!(snapshot.first(), Some(&0));
//! assert_eq!(updated.first(), Some(&-1));
//! # Ok::<(), ordtree::TreeError>(())
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
// Note: Disabling redundant_closure_for_method_calls due to clippy 0.1.92 panic bug
#![allow(clippy::redundant_closure_for_method_calls)]

/// Prelude module for convenient imports.
///
/// Re-exports the collection types, the error type and the comparer traits.
///
/// # Usage
///
/// ```rust
/// use ordtree::prelude::*;
/// ```
pub mod prelude {
    pub use crate::compare::{Comparer, EqualityComparer, NaturalOrder};
    pub use crate::error::{ErrorKind, TreeError};
    pub use crate::tree::*;
    pub use crate::{TreeListIterator, ValidationRule};

    #[cfg(feature = "persistent")]
    pub use crate::persistent::*;
}

pub mod compare;
mod engine;
pub mod error;
pub mod node_array;
pub mod tree;

#[cfg(feature = "persistent")]
pub mod persistent;

pub use engine::{DEFAULT_BRANCHING_FACTOR, TreeListIntoIterator, TreeListIterator, ValidationRule};
pub use error::{ErrorKind, TreeError};
pub use node_array::{INLINE_CAPACITY, NodeArray};
pub use tree::{HashBucketedTree, SortedTreeList, TreeList, TreeListCursor};

#[cfg(feature = "persistent")]
pub use persistent::{
    PersistentHashBucketedTree, PersistentSortedTreeList, PersistentTreeList, TransientTreeList,
};

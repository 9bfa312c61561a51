//! Persistent (immutable) order-statistics collections.
//!
//! This module provides immutable counterparts of the collections in
//! [`tree`](crate::tree), using structural sharing to minimize copying:
//!
//! - [`PersistentTreeList`]: Persistent indexed list
//! - [`TransientTreeList`]: Mutable builder for [`PersistentTreeList`]
//! - [`PersistentSortedTreeList`]: Persistent ordered multiset
//! - [`PersistentHashBucketedTree`]: Persistent set ordered by hash
//!
//! # Structural Sharing
//!
//! Nodes are held through reference-counted handles (`Rc`, or `Arc` with the
//! `arc` feature). An update copies only the nodes on the root-to-leaf path
//! it touches and reuses every other subtree by reference, so it allocates at
//! most `height()` nodes and never changes a list another owner can see.
//!
//! # Examples
//!
//! ## `PersistentTreeList`
//!
//! ```rust
//! use ordtree::persistent::PersistentTreeList;
//!
//! let list: PersistentTreeList<i32> = (0..100).collect();
//! assert_eq!(list.get(50), Some(&50));
//!
//! // Structural sharing: the original list is preserved
//! let updated = list.set(50, 999).unwrap();
//! assert_eq!(list.get(50), Some(&50));     // Original unchanged
//! assert_eq!(updated.get(50), Some(&999)); // New version
//! ```
//!
//! ## `TransientTreeList`
//!
//! ```rust
//! use ordtree::persistent::PersistentTreeList;
//!
//! let list: PersistentTreeList<i32> = (0..10).collect();
//! let mut transient = list.clone().transient();
//! for value in 10..1000 {
//!     transient.push_back(value);
//! }
//! let grown = transient.persistent();
//! assert_eq!(list.len(), 10);
//! assert_eq!(grown.len(), 1000);
//! ```

mod hash_bucketed;
mod list;
mod sorted;
mod transient;

pub use hash_bucketed::PersistentHashBucketedTree;
pub use list::PersistentTreeList;
pub use sorted::PersistentSortedTreeList;
pub use transient::TransientTreeList;

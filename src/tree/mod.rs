//! Mutable order-statistics collections.
//!
//! Every collection in this module stores its items in a counted B-tree, so
//! access by index, insertion and removal at any index all cost O(log n):
//!
//! - [`TreeList`]: an indexed list with a fail-fast [`TreeListCursor`]
//! - [`SortedTreeList`]: a list kept sorted by a [`Comparer`](crate::compare::Comparer),
//!   with duplicate-aware search
//! - [`HashBucketedTree`]: a set ordered by hash, tolerating collisions
//!
//! # Examples
//!
//! ```rust
//! use ordtree::tree::{SortedTreeList, TreeList};
//!
//! let mut list = TreeList::new();
//! list.push_back(3);
//! list.push_front(1);
//! list.insert(1, 2).unwrap();
//! assert_eq!(list.to_vec(), vec![1, 2, 3]);
//!
//! let mut sorted: SortedTreeList<i32> = [5, 1, 3, 3].into_iter().collect();
//! sorted.add(2);
//! assert_eq!(sorted.to_vec(), vec![1, 2, 3, 3, 5]);
//! assert_eq!(sorted.count_of(&3), 2);
//! ```

mod cursor;
mod hash_bucketed;
mod list;
mod sorted;

pub use cursor::TreeListCursor;
pub use hash_bucketed::{HashBucketedIterator, HashBucketedTree};
pub use list::TreeList;
#[cfg(feature = "persistent")]
pub(crate) use sorted::sort_detecting_duplicates;
pub use sorted::SortedTreeList;

//! Fail-fast cursor over a [`TreeList`].

use super::list::TreeList;
use crate::error::TreeError;

/// A detached cursor that walks a [`TreeList`] by index and refuses to
/// advance once the list has changed.
///
/// The cursor records the list's [`version`](TreeList::version) when it is
/// created. [`move_next`](Self::move_next) compares it with the list's current
/// version and fails with [`TreeError::VersionMismatch`] on a difference.
/// It also records which list it came from: passing any other list, a clone
/// included, fails with [`TreeError::ListMismatch`] until
/// [`reset`](Self::reset) adopts that list.
/// Reading [`current`](Self::current) never fails: after an invalidation it
/// still returns the item yielded last.
///
/// Unlike [`TreeListIterator`](crate::TreeListIterator), the cursor does not
/// borrow the list between steps, so the list can be mutated while a cursor
/// exists.
///
/// # Examples
///
/// ```rust
/// use ordtree::TreeList;
///
/// let list: TreeList<&str> = ["a", "b"].into_iter().collect();
/// let mut cursor = list.cursor();
/// let mut seen = Vec::new();
/// while cursor.move_next(&list).unwrap() {
///     seen.push(*cursor.current().unwrap());
/// }
/// assert_eq!(seen, vec!["a", "b"]);
/// assert_eq!(cursor.current(), None);
/// ```
#[derive(Debug, Clone)]
pub struct TreeListCursor<T> {
    list: u64,
    version: u64,
    next_index: usize,
    current: Option<T>,
}

impl<T> TreeListCursor<T> {
    pub(crate) const fn new(list: u64, version: u64) -> Self {
        Self {
            list,
            version,
            next_index: 0,
            current: None,
        }
    }

    /// Returns the item yielded by the last successful
    /// [`move_next`](Self::move_next), or `None` before the first step and
    /// after the end was reached.
    #[must_use]
    pub const fn current(&self) -> Option<&T> {
        self.current.as_ref()
    }

    /// Returns the list version this cursor was created against.
    #[must_use]
    pub const fn version(&self) -> u64 {
        self.version
    }

    /// Rewinds the cursor to the start of `list` and adopts its identity and
    /// current version.
    pub fn reset(&mut self, list: &TreeList<T>) {
        self.list = list.identity();
        self.version = list.version();
        self.next_index = 0;
        self.current = None;
    }
}

impl<T: Clone> TreeListCursor<T> {
    /// Advances to the next item of `list`.
    ///
    /// Returns `Ok(true)` when an item was reached and `Ok(false)` at the end.
    ///
    /// # Errors
    ///
    /// [`TreeError::ListMismatch`] if `list` is not the list the cursor was
    /// created from or last reset against.
    /// [`TreeError::VersionMismatch`] if `list` was structurally mutated since
    /// the cursor was created or last reset. The current item is kept in both
    /// cases.
    pub fn move_next(&mut self, list: &TreeList<T>) -> Result<bool, TreeError> {
        if list.identity() != self.list {
            return Err(TreeError::ListMismatch {
                expected: self.list,
                actual: list.identity(),
            });
        }
        if list.version() != self.version {
            return Err(TreeError::VersionMismatch {
                expected: self.version,
                actual: list.version(),
            });
        }
        match list.get(self.next_index) {
            Some(item) => {
                self.current = Some(item.clone());
                self.next_index += 1;
                Ok(true)
            }
            None => {
                self.current = None;
                Ok(false)
            }
        }
    }
}

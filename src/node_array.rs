//! Fixed-capacity storage for the entries of one tree node.
//!
//! A [`NodeArray`] holds the items of a leaf, or the child handles and child
//! counts of an internal node. Its capacity is the tree's branching factor,
//! which is small (single digits by default), so the storage lives inline in a
//! [`SmallVec`] and only spills to the heap for branching factors above
//! [`INLINE_CAPACITY`].
//!
//! Every window-taking operation validates its `(start, count)` window and
//! reports [`TreeError`] instead of panicking.
//!
//! # Examples
//!
//! ```rust
//! use ordtree::compare::NaturalOrder;
//! use ordtree::NodeArray;
//!
//! let mut array: NodeArray<i32> = [5, 1, 4].into_iter().collect();
//! array.sort(0, 3, &NaturalOrder).unwrap();
//! assert_eq!(array.as_slice(), &[1, 4, 5]);
//! assert_eq!(array.binary_search(0, 3, &4, &NaturalOrder), Ok(Ok(1)));
//! assert_eq!(array.binary_search(0, 3, &2, &NaturalOrder), Ok(Err(1)));
//! ```

use std::fmt;
use std::iter::FromIterator;
use std::ops::{Index, IndexMut};

use smallvec::SmallVec;

use crate::compare::Comparer;
use crate::error::{TreeError, check_index, check_position, check_range};

/// Number of entries a [`NodeArray`] stores without a heap allocation.
pub const INLINE_CAPACITY: usize = 8;

/// Inline, bounds-checked storage for the entries of one node.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct NodeArray<T> {
    items: SmallVec<[T; INLINE_CAPACITY]>,
}

impl<T> NodeArray<T> {
    /// Creates an empty array.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            items: SmallVec::new(),
        }
    }

    /// Returns the number of slots in use.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if no slot is in use.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns the used slots as a slice.
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    /// Returns the used slots as a mutable slice.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.items
    }

    /// Returns an iterator over the used slots.
    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    /// Returns a reference to the entry at `index`.
    ///
    /// # Errors
    ///
    /// [`TreeError::IndexOutOfRange`] if `index >= len()`.
    pub fn get(&self, index: usize) -> Result<&T, TreeError> {
        check_index(index, self.len())?;
        Ok(&self.items[index])
    }

    /// Returns a mutable reference to the entry at `index`.
    ///
    /// # Errors
    ///
    /// [`TreeError::IndexOutOfRange`] if `index >= len()`.
    pub fn get_mut(&mut self, index: usize) -> Result<&mut T, TreeError> {
        check_index(index, self.len())?;
        Ok(&mut self.items[index])
    }

    /// Replaces the entry at `index`, returning the previous one.
    ///
    /// # Errors
    ///
    /// [`TreeError::IndexOutOfRange`] if `index >= len()`.
    pub fn set(&mut self, index: usize, value: T) -> Result<T, TreeError> {
        check_index(index, self.len())?;
        Ok(std::mem::replace(&mut self.items[index], value))
    }

    /// Appends an entry.
    #[inline]
    pub fn push(&mut self, value: T) {
        self.items.push(value);
    }

    /// Inserts an entry at `index`, shifting later entries right.
    ///
    /// # Errors
    ///
    /// [`TreeError::IndexOutOfRange`] if `index > len()`.
    pub fn insert(&mut self, index: usize, value: T) -> Result<(), TreeError> {
        check_position(index, self.len())?;
        self.items.insert(index, value);
        Ok(())
    }

    /// Removes and returns the entry at `index`, shifting later entries left.
    ///
    /// # Errors
    ///
    /// [`TreeError::IndexOutOfRange`] if `index >= len()`.
    pub fn remove(&mut self, index: usize) -> Result<T, TreeError> {
        check_index(index, self.len())?;
        Ok(self.items.remove(index))
    }

    /// Logically removes `length` slots starting at `index`.
    ///
    /// The removed values are dropped; for types without drop glue this is
    /// only a length adjustment.
    ///
    /// # Errors
    ///
    /// [`TreeError::RangeOutOfBounds`] if the window exceeds `len()`.
    pub fn mark_unused(&mut self, index: usize, length: usize) -> Result<(), TreeError> {
        check_range(index, length, self.len())?;
        if index + length == self.len() {
            self.items.truncate(index);
        } else {
            self.items.drain(index..index + length);
        }
        Ok(())
    }

    /// Finds the first index in the window whose entry satisfies `predicate`.
    ///
    /// # Errors
    ///
    /// [`TreeError::RangeOutOfBounds`] if the window exceeds `len()`.
    pub fn find_index<P>(&self, start: usize, count: usize, mut predicate: P) -> Result<Option<usize>, TreeError>
    where
        P: FnMut(&T) -> bool,
    {
        check_range(start, count, self.len())?;
        Ok(self.items[start..start + count]
            .iter()
            .position(|item| predicate(item))
            .map(|offset| start + offset))
    }

    /// Finds the last index in the window whose entry satisfies `predicate`.
    ///
    /// The window is given in forward coordinates and scanned backwards.
    ///
    /// # Errors
    ///
    /// [`TreeError::RangeOutOfBounds`] if the window exceeds `len()`.
    pub fn find_last_index<P>(&self, start: usize, count: usize, mut predicate: P) -> Result<Option<usize>, TreeError>
    where
        P: FnMut(&T) -> bool,
    {
        check_range(start, count, self.len())?;
        Ok(self.items[start..start + count]
            .iter()
            .rposition(|item| predicate(item))
            .map(|offset| start + offset))
    }

    /// Finds the first index in the window whose entry equals `value`.
    ///
    /// # Errors
    ///
    /// [`TreeError::RangeOutOfBounds`] if the window exceeds `len()`.
    pub fn index_of(&self, value: &T, start: usize, count: usize) -> Result<Option<usize>, TreeError>
    where
        T: PartialEq,
    {
        self.find_index(start, count, |item| item == value)
    }

    /// Finds the last index in the window whose entry equals `value`.
    ///
    /// # Errors
    ///
    /// [`TreeError::RangeOutOfBounds`] if the window exceeds `len()`.
    pub fn last_index_of(&self, value: &T, start: usize, count: usize) -> Result<Option<usize>, TreeError>
    where
        T: PartialEq,
    {
        self.find_last_index(start, count, |item| item == value)
    }

    /// Binary-searches the window for `value`.
    ///
    /// Returns `Ok(Ok(index))` for a match and `Ok(Err(point))` with the
    /// insertion point otherwise (see [`complement_encoded`] for the
    /// bitwise-complement form).
    ///
    /// # Errors
    ///
    /// [`TreeError::RangeOutOfBounds`] if the window exceeds `len()`.
    ///
    /// [`complement_encoded`]: crate::compare::complement_encoded
    pub fn binary_search<C>(
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

    /// Binary search over an already validated window, driven by `order`, which
    /// orders an entry relative to the searched value.
    pub(crate) fn search_window<F>(&self, index: usize, count: usize, mut order: F) -> Result<usize, usize>
    where
        F: FnMut(&T) -> std::cmp::Ordering,
    {
        let mut low = index;
        let mut high = index + count;
        while low < high {
            let middle = low + (high - low) / 2;
            match order(&self.items[middle]) {
                std::cmp::Ordering::Equal => return Ok(middle),
                std::cmp::Ordering::Less => low = middle + 1,
                std::cmp::Ordering::Greater => high = middle,
            }
        }
        Err(low)
    }

    /// Sorts the window in place.
    ///
    /// Windows of 0 or 1 entries are left alone, 2 entries take one
    /// conditional swap, 3 entries a three-compare network, and longer
    /// windows a (stable) insertion sort, which is the cheapest choice at
    /// node sizes.
    ///
    /// # Errors
    ///
    /// [`TreeError::RangeOutOfBounds`] if the window exceeds `len()`.
    pub fn sort<C>(&mut self, index: usize, count: usize, comparer: &C) -> Result<(), TreeError>
    where
        C: Comparer<T> + ?Sized,
    {
        check_range(index, count, self.len())?;
        let window = &mut self.items[index..index + count];
        match window.len() {
            0 | 1 => {}
            2 => swap_if_greater(window, 0, 1, comparer),
            3 => {
                swap_if_greater(window, 0, 1, comparer);
                swap_if_greater(window, 1, 2, comparer);
                swap_if_greater(window, 0, 1, comparer);
            }
            _ => insertion_sort(window, comparer),
        }
        Ok(())
    }

    /// Splits off the entries from `at` onwards into a new array.
    pub(crate) fn split_off(&mut self, at: usize) -> Self {
        self.items.drain(at..).collect()
    }

    /// Inserts `value` at `index`, splitting the array first if it already
    /// holds `capacity` entries.
    ///
    /// Returns the back half when a split happened. The array never holds
    /// more than `capacity` entries, not even transiently. An append to a full
    /// array moves only the new entry into the back half, so append-only
    /// workloads leave every node but the last full.
    pub(crate) fn insert_with_split(&mut self, index: usize, value: T, capacity: usize) -> Option<Self> {
        if self.len() < capacity {
            self.items.insert(index, value);
            return None;
        }
        if index == self.len() {
            return Some(std::iter::once(value).collect());
        }

        let front = (capacity + 2) / 2;
        if index < front {
            let back = self.split_off(front - 1);
            self.items.insert(index, value);
            Some(back)
        } else {
            let mut back = self.split_off(front);
            back.items.insert(index - front, value);
            Some(back)
        }
    }
}

impl<T: Clone> NodeArray<T> {
    /// Copies `count` entries from `source_index` to `destination_index`
    /// within this array.
    ///
    /// The copy runs backwards when the destination lies after the source,
    /// so overlapping shifts never read an entry that was already overwritten.
    ///
    /// # Errors
    ///
    /// [`TreeError::RangeOutOfBounds`] if either window exceeds `len()`.
    pub fn copy_within(&mut self, source_index: usize, destination_index: usize, count: usize) -> Result<(), TreeError> {
        check_range(source_index, count, self.len())?;
        check_range(destination_index, count, self.len())?;
        if destination_index > source_index {
            for offset in (0..count).rev() {
                self.items[destination_index + offset] = self.items[source_index + offset].clone();
            }
        } else {
            for offset in 0..count {
                self.items[destination_index + offset] = self.items[source_index + offset].clone();
            }
        }
        Ok(())
    }

    /// Copies `count` entries starting at `source_index` into `destination`
    /// starting at `destination_index`.
    ///
    /// Slots of `destination` past its used length are appended.
    ///
    /// # Errors
    ///
    /// [`TreeError::RangeOutOfBounds`] if the source window exceeds `len()`,
    /// [`TreeError::IndexOutOfRange`] if `destination_index > destination.len()`.
    pub fn copy_to(
        &self,
        source_index: usize,
        destination: &mut Self,
        destination_index: usize,
        count: usize,
    ) -> Result<(), TreeError> {
        check_range(source_index, count, self.len())?;
        check_position(destination_index, destination.len())?;
        for (offset, item) in self.items[source_index..source_index + count].iter().enumerate() {
            let target = destination_index + offset;
            if target < destination.len() {
                destination.items[target] = item.clone();
            } else {
                destination.items.push(item.clone());
            }
        }
        Ok(())
    }
}

fn swap_if_greater<T, C: Comparer<T> + ?Sized>(window: &mut [T], left: usize, right: usize, comparer: &C) {
    if comparer.compare(&window[left], &window[right]).is_gt() {
        window.swap(left, right);
    }
}

fn insertion_sort<T, C: Comparer<T> + ?Sized>(window: &mut [T], comparer: &C) {
    for unsorted in 1..window.len() {
        let mut position = unsorted;
        while position > 0 && comparer.compare(&window[position - 1], &window[position]).is_gt() {
            window.swap(position - 1, position);
            position -= 1;
        }
    }
}

impl<T> Default for NodeArray<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Index<usize> for NodeArray<T> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        &self.items[index]
    }
}

impl<T> IndexMut<usize> for NodeArray<T> {
    fn index_mut(&mut self, index: usize) -> &mut T {
        &mut self.items[index]
    }
}

impl<T> FromIterator<T> for NodeArray<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

impl<T> IntoIterator for NodeArray<T> {
    type Item = T;
    type IntoIter = smallvec::IntoIter<[T; INLINE_CAPACITY]>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a NodeArray<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl<T: fmt::Debug> fmt::Debug for NodeArray<T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_list().entries(self.items.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compare::{FnComparer, NaturalOrder, ReverseOrder};
    use rstest::rstest;

    fn array_of(values: &[i32]) -> NodeArray<i32> {
        values.iter().copied().collect()
    }

    #[rstest]
    fn test_get_and_set_are_bounds_checked() {
        let mut array = array_of(&[1, 2, 3]);
        assert_eq!(array.get(2), Ok(&3));
        assert_eq!(
            array.get(3),
            Err(TreeError::IndexOutOfRange {
                index: 3,
                length: 3
            })
        );
        assert_eq!(array.set(0, 10), Ok(1));
        assert_eq!(array.as_slice(), &[10, 2, 3]);
        assert!(array.set(5, 0).is_err());
    }

    #[rstest]
    fn test_insert_and_remove() {
        let mut array = array_of(&[1, 3]);
        array.insert(1, 2).unwrap();
        array.insert(3, 4).unwrap();
        assert_eq!(array.as_slice(), &[1, 2, 3, 4]);
        assert!(array.insert(9, 0).is_err());
        assert_eq!(array.remove(0), Ok(1));
        assert_eq!(array.as_slice(), &[2, 3, 4]);
    }

    #[rstest]
    fn test_window_searches() {
        let array = array_of(&[4, 7, 4, 9, 4]);
        assert_eq!(array.index_of(&4, 1, 4), Ok(Some(2)));
        assert_eq!(array.last_index_of(&4, 0, 4), Ok(Some(2)));
        assert_eq!(array.last_index_of(&4, 0, 5), Ok(Some(4)));
        assert_eq!(array.find_index(0, 5, |value| *value > 8), Ok(Some(3)));
        assert_eq!(array.find_last_index(0, 3, |value| *value > 8), Ok(None));
        assert!(array.index_of(&4, 3, 3).is_err());
    }

    #[rstest]
    fn test_copy_within_shifts_right_without_corruption() {
        let mut array = array_of(&[1, 2, 3, 4, 5]);
        array.copy_within(0, 1, 4).unwrap();
        assert_eq!(array.as_slice(), &[1, 1, 2, 3, 4]);
    }

    #[rstest]
    fn test_copy_within_shifts_left_without_corruption() {
        let mut array = array_of(&[1, 2, 3, 4, 5]);
        array.copy_within(1, 0, 4).unwrap();
        assert_eq!(array.as_slice(), &[2, 3, 4, 5, 5]);
    }

    #[rstest]
    fn test_copy_to_other_array_appends_past_end() {
        let source = array_of(&[1, 2, 3]);
        let mut destination = array_of(&[9, 9]);
        source.copy_to(0, &mut destination, 1, 3).unwrap();
        assert_eq!(destination.as_slice(), &[9, 1, 2, 3]);
        assert!(source.copy_to(0, &mut destination, 7, 1).is_err());
    }

    #[rstest]
    fn test_mark_unused_drops_window() {
        let mut array: NodeArray<String> = ["a", "b", "c", "d"].iter().map(ToString::to_string).collect();
        array.mark_unused(1, 2).unwrap();
        assert_eq!(array.as_slice(), &["a".to_string(), "d".to_string()]);
        array.mark_unused(1, 1).unwrap();
        assert_eq!(array.len(), 1);
        assert!(array.mark_unused(0, 2).is_err());
    }

    #[rstest]
    #[case(&[], &[])]
    #[case(&[1], &[1])]
    #[case(&[2, 1], &[1, 2])]
    #[case(&[1, 2], &[1, 2])]
    #[case(&[3, 1, 2], &[1, 2, 3])]
    #[case(&[3, 2, 1], &[1, 2, 3])]
    #[case(&[2, 3, 1], &[1, 2, 3])]
    #[case(&[5, 1, 4, 2, 3], &[1, 2, 3, 4, 5])]
    #[case(&[8, 7, 6, 5, 4, 3, 2, 1], &[1, 2, 3, 4, 5, 6, 7, 8])]
    fn test_sort_by_length(#[case] input: &[i32], #[case] expected: &[i32]) {
        let mut array = array_of(input);
        array.sort(0, input.len(), &NaturalOrder).unwrap();
        assert_eq!(array.as_slice(), expected);
    }

    #[rstest]
    fn test_sort_window_only() {
        let mut array = array_of(&[9, 3, 2, 1, 0]);
        array.sort(1, 3, &NaturalOrder).unwrap();
        assert_eq!(array.as_slice(), &[9, 1, 2, 3, 0]);
        array.sort(0, 5, &ReverseOrder(NaturalOrder)).unwrap();
        assert_eq!(array.as_slice(), &[9, 3, 2, 1, 0]);
    }

    #[rstest]
    fn test_insertion_sort_is_stable() {
        let mut array: NodeArray<(i32, char)> =
            [(2, 'a'), (1, 'b'), (2, 'c'), (1, 'd'), (0, 'e')].into_iter().collect();
        let by_key = FnComparer(|left: &(i32, char), right: &(i32, char)| left.0.cmp(&right.0));
        array.sort(0, 5, &by_key).unwrap();
        assert_eq!(
            array.as_slice(),
            &[(0, 'e'), (1, 'b'), (1, 'd'), (2, 'a'), (2, 'c')]
        );
    }

    #[rstest]
    #[case(5, Ok(2))]
    #[case(1, Ok(0))]
    #[case(9, Ok(4))]
    #[case(0, Err(0))]
    #[case(4, Err(2))]
    #[case(10, Err(5))]
    fn test_binary_search(#[case] target: i32, #[case] expected: Result<usize, usize>) {
        let array = array_of(&[1, 3, 5, 7, 9]);
        assert_eq!(array.binary_search(0, 5, &target, &NaturalOrder), Ok(expected));
    }

    #[rstest]
    fn test_binary_search_in_window() {
        let array = array_of(&[1, 3, 5, 7, 9]);
        assert_eq!(array.binary_search(2, 2, &1, &NaturalOrder), Ok(Err(2)));
        assert_eq!(array.binary_search(2, 2, &9, &NaturalOrder), Ok(Err(4)));
        assert!(array.binary_search(4, 2, &9, &NaturalOrder).is_err());
    }

    #[rstest]
    #[case(0, &[0, 1], &[2, 3])]
    #[case(1, &[1, 0], &[2, 3])]
    #[case(2, &[1, 2], &[0, 3])]
    #[case(3, &[1, 2, 3], &[0])]
    fn test_insert_with_split_places_new_entry(
        #[case] index: usize,
        #[case] front: &[i32],
        #[case] back: &[i32],
    ) {
        let mut array = array_of(&[1, 2, 3]);
        let split = array.insert_with_split(index, 0, 3).unwrap();
        assert_eq!(array.as_slice(), front);
        assert_eq!(split.as_slice(), back);
    }

    #[rstest]
    fn test_insert_with_split_halves() {
        let mut array = array_of(&[10, 20, 30, 40]);
        let back = array.insert_with_split(1, 15, 4).unwrap();
        assert_eq!(array.as_slice(), &[10, 15, 20]);
        assert_eq!(back.as_slice(), &[30, 40]);

        let mut array = array_of(&[10, 20, 30, 40]);
        let back = array.insert_with_split(3, 35, 4).unwrap();
        assert_eq!(array.as_slice(), &[10, 20, 30]);
        assert_eq!(back.as_slice(), &[35, 40]);
    }

    #[rstest]
    fn test_insert_with_split_append_keeps_front_full() {
        let mut array = array_of(&[1, 2, 3]);
        let back = array.insert_with_split(3, 4, 3).unwrap();
        assert_eq!(array.as_slice(), &[1, 2, 3]);
        assert_eq!(back.as_slice(), &[4]);
    }

    #[rstest]
    fn test_insert_with_split_not_full() {
        let mut array = array_of(&[1, 3]);
        assert!(array.insert_with_split(1, 2, 3).is_none());
        assert_eq!(array.as_slice(), &[1, 2, 3]);
    }
}

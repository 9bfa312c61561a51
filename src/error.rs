//! Error types for tree operations.
//!
//! Every fallible operation in this crate reports a [`TreeError`]. Each
//! variant belongs to one [`ErrorKind`]:
//!
//! - [`ErrorKind::InvalidArgument`]: the caller passed an index, range,
//!   branching factor or sequence the operation cannot accept.
//! - [`ErrorKind::InvalidState`]: a cursor was advanced after its list changed,
//!   or against a list other than the one it was created from.
//! - [`ErrorKind::Corrupted`]: a structural self-check found a broken invariant.
//!
//! Arguments are always checked before any mutation is applied, so a call that
//! returns an error leaves the tree exactly as it was.

use std::fmt;

/// Broad classification of a [`TreeError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The caller supplied an argument the operation cannot accept.
    InvalidArgument,
    /// The object was used in a state that does not allow the operation.
    InvalidState,
    /// A structural invariant of the tree does not hold.
    Corrupted,
}

/// Represents errors that can occur when working with trees.
///
/// # Examples
///
/// ```rust
/// use ordtree::{ErrorKind, TreeError};
///
/// let error = TreeError::IndexOutOfRange { index: 7, length: 3 };
/// assert_eq!(error.kind(), ErrorKind::InvalidArgument);
/// assert_eq!(format!("{error}"), "index 7 is out of range for length 3");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    /// An index did not address an existing element.
    IndexOutOfRange {
        /// The offending index.
        index: usize,
        /// The number of elements at the time of the call.
        length: usize,
    },
    /// A `(start, count)` window extends past the end of the container.
    RangeOutOfBounds {
        /// First index of the window.
        start: usize,
        /// Number of elements in the window.
        count: usize,
        /// The number of elements at the time of the call.
        length: usize,
    },
    /// A tree was configured with fewer than two entries per node.
    InvalidBranchingFactor {
        /// The rejected branching factor.
        branching_factor: usize,
    },
    /// A destination buffer cannot hold the requested elements.
    DestinationTooSmall {
        /// Slots required (`offset + count`).
        required: usize,
        /// Slots available in the destination.
        available: usize,
    },
    /// A sequence that must not contain duplicates contained one.
    DuplicateKey {
        /// Zero-based position of the duplicate within the source sequence.
        position: usize,
    },
    /// A cursor was advanced after the list it walks was structurally changed.
    VersionMismatch {
        /// Version captured when the cursor was created.
        expected: u64,
        /// Version of the list at the time of the call.
        actual: u64,
    },
    /// A cursor was advanced against a list other than the one it was created
    /// from.
    ListMismatch {
        /// Identity of the list the cursor belongs to.
        expected: u64,
        /// Identity of the list passed in.
        actual: u64,
    },
    /// The structural self-check found a broken invariant.
    InvariantViolation {
        /// Tree level (root = 0) where the violation was found.
        depth: usize,
        /// Description of the violated invariant.
        reason: String,
    },
}

impl TreeError {
    /// Returns the broad classification of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::IndexOutOfRange { .. }
            | Self::RangeOutOfBounds { .. }
            | Self::InvalidBranchingFactor { .. }
            | Self::DestinationTooSmall { .. }
            | Self::DuplicateKey { .. } => ErrorKind::InvalidArgument,
            Self::VersionMismatch { .. } | Self::ListMismatch { .. } => ErrorKind::InvalidState,
            Self::InvariantViolation { .. } => ErrorKind::Corrupted,
        }
    }

    pub(crate) fn invariant(depth: usize, reason: impl Into<String>) -> Self {
        Self::InvariantViolation {
            depth,
            reason: reason.into(),
        }
    }
}

impl fmt::Display for TreeError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IndexOutOfRange { index, length } => {
                write!(formatter, "index {index} is out of range for length {length}")
            }
            Self::RangeOutOfBounds {
                start,
                count,
                length,
            } => write!(
                formatter,
                "range starting at {start} with {count} elements exceeds length {length}"
            ),
            Self::InvalidBranchingFactor { branching_factor } => write!(
                formatter,
                "branching factor must be at least 2, got {branching_factor}"
            ),
            Self::DestinationTooSmall {
                required,
                available,
            } => write!(
                formatter,
                "destination needs {required} slots but only {available} are available"
            ),
            Self::DuplicateKey { position } => {
                write!(formatter, "duplicate key at position {position}")
            }
            Self::VersionMismatch { expected, actual } => write!(
                formatter,
                "collection was modified (cursor version {expected}, list version {actual})"
            ),
            Self::ListMismatch { expected, actual } => write!(
                formatter,
                "cursor belongs to list {expected} but was advanced against list {actual}"
            ),
            Self::InvariantViolation { depth, reason } => {
                write!(formatter, "invariant violated at depth {depth}: {reason}")
            }
        }
    }
}

impl std::error::Error for TreeError {}

// =============================================================================
// Argument Checks
// =============================================================================

/// Checks that `index` addresses an existing element.
pub(crate) const fn check_index(index: usize, length: usize) -> Result<(), TreeError> {
    if index < length {
        Ok(())
    } else {
        Err(TreeError::IndexOutOfRange { index, length })
    }
}

/// Checks that `index` is a valid insertion position (`index <= length`).
pub(crate) const fn check_position(index: usize, length: usize) -> Result<(), TreeError> {
    if index <= length {
        Ok(())
    } else {
        Err(TreeError::IndexOutOfRange { index, length })
    }
}

/// Checks that the window `[start, start + count)` lies within `length`.
pub(crate) const fn check_range(start: usize, count: usize, length: usize) -> Result<(), TreeError> {
    match start.checked_add(count) {
        Some(end) if end <= length => Ok(()),
        _ => Err(TreeError::RangeOutOfBounds {
            start,
            count,
            length,
        }),
    }
}

/// Checks that a tree may be built with `branching_factor` entries per node.
pub(crate) const fn check_branching_factor(branching_factor: usize) -> Result<(), TreeError> {
    if branching_factor >= 2 {
        Ok(())
    } else {
        Err(TreeError::InvalidBranchingFactor { branching_factor })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(TreeError::IndexOutOfRange { index: 1, length: 0 }, ErrorKind::InvalidArgument)]
    #[case(TreeError::RangeOutOfBounds { start: 1, count: 4, length: 3 }, ErrorKind::InvalidArgument)]
    #[case(TreeError::InvalidBranchingFactor { branching_factor: 1 }, ErrorKind::InvalidArgument)]
    #[case(TreeError::DestinationTooSmall { required: 5, available: 2 }, ErrorKind::InvalidArgument)]
    #[case(TreeError::DuplicateKey { position: 3 }, ErrorKind::InvalidArgument)]
    #[case(TreeError::VersionMismatch { expected: 1, actual: 2 }, ErrorKind::InvalidState)]
    #[case(TreeError::ListMismatch { expected: 1, actual: 2 }, ErrorKind::InvalidState)]
    #[case(TreeError::invariant(2, "count mismatch"), ErrorKind::Corrupted)]
    fn test_error_kind(#[case] error: TreeError, #[case] expected: ErrorKind) {
        assert_eq!(error.kind(), expected);
    }

    #[rstest]
    fn test_display_range_out_of_bounds() {
        let error = TreeError::RangeOutOfBounds {
            start: 2,
            count: 5,
            length: 4,
        };
        assert_eq!(
            format!("{error}"),
            "range starting at 2 with 5 elements exceeds length 4"
        );
    }

    #[rstest]
    fn test_display_version_mismatch() {
        let error = TreeError::VersionMismatch {
            expected: 3,
            actual: 4,
        };
        assert_eq!(
            format!("{error}"),
            "collection was modified (cursor version 3, list version 4)"
        );
    }

    #[rstest]
    fn test_display_list_mismatch() {
        let error = TreeError::ListMismatch {
            expected: 7,
            actual: 9,
        };
        assert_eq!(
            format!("{error}"),
            "cursor belongs to list 7 but was advanced against list 9"
        );
    }

    #[rstest]
    fn test_display_invariant_violation() {
        let error = TreeError::invariant(1, "leaf holds 4 entries");
        assert_eq!(
            format!("{error}"),
            "invariant violated at depth 1: leaf holds 4 entries"
        );
    }

    #[rstest]
    #[case(0, 1, true)]
    #[case(1, 1, false)]
    #[case(0, 0, false)]
    fn test_check_index(#[case] index: usize, #[case] length: usize, #[case] accepted: bool) {
        assert_eq!(check_index(index, length).is_ok(), accepted);
    }

    #[rstest]
    #[case(0, 0, true)]
    #[case(3, 3, true)]
    #[case(4, 3, false)]
    fn test_check_position(#[case] index: usize, #[case] length: usize, #[case] accepted: bool) {
        assert_eq!(check_position(index, length).is_ok(), accepted);
    }

    #[rstest]
    #[case(0, 0, 0, true)]
    #[case(2, 3, 5, true)]
    #[case(3, 3, 5, false)]
    #[case(usize::MAX, 2, 5, false)]
    fn test_check_range(
        #[case] start: usize,
        #[case] count: usize,
        #[case] length: usize,
        #[case] accepted: bool,
    ) {
        assert_eq!(check_range(start, count, length).is_ok(), accepted);
    }

    #[rstest]
    #[case(0, false)]
    #[case(1, false)]
    #[case(2, true)]
    #[case(64, true)]
    fn test_check_branching_factor(#[case] branching_factor: usize, #[case] accepted: bool) {
        assert_eq!(check_branching_factor(branching_factor).is_ok(), accepted);
    }

    #[rstest]
    fn test_error_is_std_error() {
        fn assert_error<E: std::error::Error>(_: &E) {}
        assert_error(&TreeError::DuplicateKey { position: 0 });
    }
}

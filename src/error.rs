use std::{collections::TryReserveError, error::Error, fmt};

/// Returned when an operation needs at least one element but the container has none.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct EmptyError;

impl fmt::Display for EmptyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "the container is empty")
    }
}

impl Error for EmptyError {}

/// Returned when a new node could not be allocated.
///
/// The container that reported it has not been modified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllocationError {
    source: TryReserveError,
}

impl AllocationError {
    /// The failed reservation, for callers that want to tell capacity overflow
    /// apart from allocator failure.
    pub fn into_inner(self) -> TryReserveError {
        self.source
    }
}

impl From<TryReserveError> for AllocationError {
    fn from(source: TryReserveError) -> Self {
        Self { source }
    }
}

impl fmt::Display for AllocationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to allocate a list node")
    }
}

impl Error for AllocationError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.source)
    }
}

/// The sentinel position a cursor was on when an operation was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Boundary {
    /// Before the first element.
    Start,
    /// After the last element.
    End,
    /// The list is empty, so the cursor is before the first and after the last element at once.
    Both,
}

impl fmt::Display for Boundary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Start => write!(f, "past the start"),
            Self::End => write!(f, "past the end"),
            Self::Both => write!(f, "on an empty list"),
        }
    }
}

/// The error type for cursor operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IteratorError {
    /// The cursor is on a sentinel position that forbids the operation.
    OutOfRange(Boundary),
    /// The list was structurally changed after the bookmark was taken.
    Stale {
        /// Generation recorded in the bookmark.
        expected: u64,
        /// Generation of the list when the bookmark was resumed.
        found: u64,
    },
    /// The bookmark was taken on a different list.
    ForeignList,
    /// A node for a cursor insertion could not be allocated.
    Alloc(AllocationError),
}

impl fmt::Display for IteratorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfRange(boundary) => write!(f, "cursor is {boundary}"),
            Self::Stale { expected, found } => write!(
                f,
                "stale cursor: bookmark generation {expected}, list generation {found}"
            ),
            Self::ForeignList => write!(f, "bookmark belongs to a different list"),
            Self::Alloc(e) => write!(f, "cursor insertion failed: {e}"),
        }
    }
}

impl Error for IteratorError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Alloc(e) => Some(e),
            _ => None,
        }
    }
}

impl From<AllocationError> for IteratorError {
    fn from(e: AllocationError) -> Self {
        Self::Alloc(e)
    }
}

impl From<Boundary> for IteratorError {
    fn from(boundary: Boundary) -> Self {
        Self::OutOfRange(boundary)
    }
}

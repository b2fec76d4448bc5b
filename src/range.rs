/// A byte range within a file, anchored at the start of the file.
///
/// The range covers `[offset, offset + length)`. A `length` of 0 is special: the range extends
/// to the end of the file, *including* any bytes appended later. This mirrors the OS semantics
/// and is easy to trip over, so prefer [`LockRange::to_end()`] when that is what you mean.
///
/// Unix backends pass the pair through untouched, so a negative `length` locks the bytes
/// *before* `offset` there. The Windows backend rejects negative values.
#[derive(Copy, Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct LockRange {
    pub offset: i64,
    pub length: i64,
}

impl LockRange {
    #[inline]
    pub const fn new(offset: i64, length: i64) -> Self {
        Self { offset, length }
    }

    /// The range starting at `offset` and extending to the end of the file.
    #[inline]
    pub const fn to_end(offset: i64) -> Self {
        Self { offset, length: 0 }
    }

    /// The whole file, including anything appended later.
    #[inline]
    pub const fn whole_file() -> Self {
        Self::to_end(0)
    }

    #[inline]
    pub const fn is_to_end(&self) -> bool {
        self.length == 0
    }

    /// The exclusive end offset, or `None` if the range extends to the end of the file (or the
    /// end is not representable).
    #[inline]
    pub fn end(&self) -> Option<i64> {
        if self.is_to_end() {
            None
        } else {
            self.offset.checked_add(self.length)
        }
    }
}

/// Whether other holders may lock an overlapping range at the same time.
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq)]
pub enum LockMode {
    /// A read lock. Any number of shared locks may overlap.
    Shared,
    /// A write lock. Conflicts with every other lock on an overlapping range.
    Exclusive,
}

impl LockMode {
    #[inline]
    pub const fn from_shared(shared: bool) -> Self {
        if shared {
            Self::Shared
        } else {
            Self::Exclusive
        }
    }
}

/// What to do when a conflicting lock is held.
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq)]
pub enum WaitPolicy {
    /// Suspend the calling thread until the lock is granted or the wait is interrupted.
    ///
    /// There is no timeout; an interrupted wait fails with
    /// [`ErrorKind::Interrupted`](crate::ErrorKind::Interrupted).
    Blocking,
    /// Fail immediately with [`ErrorKind::WouldBlock`](crate::ErrorKind::WouldBlock).
    NonBlocking,
}

impl WaitPolicy {
    #[inline]
    pub const fn from_blocking(blocking: bool) -> Self {
        if blocking {
            Self::Blocking
        } else {
            Self::NonBlocking
        }
    }
}

use crate::internal_prelude::*;

/// The capability to set and clear byte-range locks through one OS locking facility.
///
/// Implementations issue exactly one OS request per call and keep no record of what they have
/// locked; the OS lock table is the only source of truth. Most callers should go through
/// [`acquire_with()`] and [`release_with()`] (or [`acquire()`](crate::acquire()) and
/// [`release()`](crate::release())), which reject invalid handles before the backend is
/// reached.
pub trait LockBackend {
    /// Lock `range` of the file behind `handle` in the given mode.
    ///
    /// Conflicts fail with [`ErrorKind::WouldBlock`] under [`WaitPolicy::NonBlocking`]; under
    /// [`WaitPolicy::Blocking`] the calling thread sleeps until the lock is granted.
    fn acquire(
        &self,
        handle: FileHandle,
        wait: WaitPolicy,
        range: LockRange,
        mode: LockMode,
    ) -> Result<()>;

    /// Remove any lock held on `range` through `handle`.
    ///
    /// Releasing a range that is not locked succeeds.
    fn release(&self, handle: FileHandle, range: LockRange) -> Result<()>;
}

impl<B: LockBackend + ?Sized> LockBackend for &B {
    #[inline]
    fn acquire(
        &self,
        handle: FileHandle,
        wait: WaitPolicy,
        range: LockRange,
        mode: LockMode,
    ) -> Result<()> {
        (**self).acquire(handle, wait, range, mode)
    }

    #[inline]
    fn release(&self, handle: FileHandle, range: LockRange) -> Result<()> {
        (**self).release(handle, range)
    }
}

/// Acquire a lock on `range` through the given backend.
///
/// If `handle` is not [valid](FileHandle::is_valid()), this fails with
/// [`ErrorKind::InvalidHandle`] without calling into `backend`. Every other failure is
/// returned exactly as the backend reported it; nothing is retried.
#[inline]
pub fn acquire_with<B: LockBackend + ?Sized>(
    backend: &B,
    handle: FileHandle,
    wait: WaitPolicy,
    range: LockRange,
    mode: LockMode,
) -> Result<()> {
    if !handle.is_valid() {
        return Err(Error::invalid_handle());
    }

    backend.acquire(handle, wait, range, mode)
}

/// Release any lock on `range` through the given backend.
///
/// Handle validation is the same as for [`acquire_with()`]. Success does not prove that a lock
/// was actually held.
#[inline]
pub fn release_with<B: LockBackend + ?Sized>(
    backend: &B,
    handle: FileHandle,
    range: LockRange,
) -> Result<()> {
    if !handle.is_valid() {
        return Err(Error::invalid_handle());
    }

    backend.release(handle, range)
}

use core::marker::PhantomData;

use crate::internal_prelude::*;

cfg_if::cfg_if! {
    if #[cfg(unix)] {
        /// The platform's default backend.
        ///
        /// On Unix, this is [`FcntlLock::process()`](crate::FcntlLock::process()).
        pub type SystemLock = crate::FcntlLock;
    } else {
        /// The platform's default backend.
        pub type SystemLock = crate::Win32Lock;
    }
}

/// Lock a byte range of an open file.
///
/// - `wait` chooses between sleeping until the lock can be granted and failing immediately with
///   [`ErrorKind::WouldBlock`].
/// - `range.length == 0` locks from `range.offset` to the end of the file (including bytes
///   appended later).
/// - `mode` is [`LockMode::Shared`] for a read lock or [`LockMode::Exclusive`] for a write lock.
///
/// An invalid `handle` fails with [`ErrorKind::InvalidHandle`] without any OS call. Every OS
/// failure is returned immediately; in particular, a blocking wait that is interrupted by a
/// signal fails with [`ErrorKind::Interrupted`] rather than being restarted.
///
/// On Unix this sets a classic POSIX record lock. These are owned by the *process*: closing any
/// descriptor for the file releases all of the process's locks on it, and they never conflict
/// with each other inside one process. See [`FcntlLock`](crate::FcntlLock) for alternatives.
#[inline]
pub fn acquire(
    handle: FileHandle,
    wait: WaitPolicy,
    range: LockRange,
    mode: LockMode,
) -> Result<()> {
    acquire_with(&SystemLock::default(), handle, wait, range, mode)
}

/// Release any lock held on a byte range of an open file.
///
/// Releasing a range that isn't locked succeeds, so this can't be used to check whether a lock
/// was held.
#[inline]
pub fn release(handle: FileHandle, range: LockRange) -> Result<()> {
    release_with(&SystemLock::default(), handle, range)
}

/// Lock a byte range, blocking until the lock is granted.
///
/// The range is released when the returned guard is dropped.
#[inline]
pub fn lock<F: AsFileHandle + ?Sized>(
    file: &F,
    range: LockRange,
    mode: LockMode,
) -> Result<RangeGuard<'_>> {
    RangeGuard::acquire(SystemLock::default(), file, WaitPolicy::Blocking, range, mode)
}

/// Lock a byte range, failing with [`ErrorKind::WouldBlock`] if a conflicting lock is held.
///
/// The range is released when the returned guard is dropped.
#[inline]
pub fn try_lock<F: AsFileHandle + ?Sized>(
    file: &F,
    range: LockRange,
    mode: LockMode,
) -> Result<RangeGuard<'_>> {
    RangeGuard::acquire(
        SystemLock::default(),
        file,
        WaitPolicy::NonBlocking,
        range,
        mode,
    )
}

/// A locked byte range that is released when dropped.
///
/// The guard borrows the file it was created from, so the file can't be closed while the guard
/// exists. It remembers only its own range; nothing else is tracked.
///
/// Errors from the implicit release on drop are ignored. Use [`RangeGuard::unlock()`] to
/// observe them.
#[must_use = "the range is unlocked as soon as the guard is dropped"]
#[derive(Debug)]
pub struct RangeGuard<'a, B: LockBackend = SystemLock> {
    backend: B,
    handle: FileHandle,
    range: LockRange,
    mode: LockMode,
    held: bool,
    _file: PhantomData<&'a ()>,
}

impl<'a, B: LockBackend> RangeGuard<'a, B> {
    /// Lock `range` of `file` through `backend`.
    pub fn acquire<F: AsFileHandle + ?Sized>(
        backend: B,
        file: &'a F,
        wait: WaitPolicy,
        range: LockRange,
        mode: LockMode,
    ) -> Result<Self> {
        let handle = file.as_file_handle();
        acquire_with(&backend, handle, wait, range, mode)?;

        Ok(Self {
            backend,
            handle,
            range,
            mode,
            held: true,
            _file: PhantomData,
        })
    }

    #[inline]
    pub fn range(&self) -> LockRange {
        self.range
    }

    #[inline]
    pub fn mode(&self) -> LockMode {
        self.mode
    }

    /// Release the range now, reporting any error.
    pub fn unlock(mut self) -> Result<()> {
        self.held = false;
        release_with(&self.backend, self.handle, self.range)
    }
}

impl<B: LockBackend> Drop for RangeGuard<'_, B> {
    fn drop(&mut self) {
        if self.held {
            let _ = release_with(&self.backend, self.handle, self.range);
        }
    }
}

//! Integer-code entry points.
//!
//! These take the lock parameters as plain values and return `0` on success or the raw OS error
//! code (`errno` on Unix, a Win32 error code on Windows) on failure. An invalid handle returns
//! `EBADF` / `ERROR_INVALID_HANDLE` without any OS call. Use [`Error::from_code()`] to get back
//! the [`ErrorKind`](crate::ErrorKind).

use crate::internal_prelude::*;

/// Lock `[offset, offset + length)` of `handle` (`length == 0` meaning "to end of file").
///
/// `blocking` selects between waiting and failing immediately on conflict; `shared` selects a
/// read lock over a write lock.
#[inline]
pub fn acquire(
    handle: RawFileHandle,
    blocking: bool,
    offset: i64,
    length: i64,
    shared: bool,
) -> i32 {
    to_code(crate::acquire(
        FileHandle::from_raw(handle),
        WaitPolicy::from_blocking(blocking),
        LockRange::new(offset, length),
        LockMode::from_shared(shared),
    ))
}

/// Release any lock on `[offset, offset + length)` of `handle`.
#[inline]
pub fn release(handle: RawFileHandle, offset: i64, length: i64) -> i32 {
    to_code(crate::release(
        FileHandle::from_raw(handle),
        LockRange::new(offset, length),
    ))
}

#[inline]
fn to_code(res: Result<()>) -> i32 {
    match res {
        Ok(()) => 0,
        Err(e) => e.code(),
    }
}

use windows_sys::Win32::Foundation as win;
use windows_sys::Win32::Storage::FileSystem::{
    LockFileEx, UnlockFileEx, LOCKFILE_EXCLUSIVE_LOCK, LOCKFILE_FAIL_IMMEDIATELY,
};
use windows_sys::Win32::System::IO::{GetOverlappedResult, OVERLAPPED};

use crate::internal_prelude::*;

/// The Windows backend: byte-range locks set with `LockFileEx()`.
///
/// Locks belong to the handle they were taken through. Windows has no notion of "to end of file"
/// ranges, so a zero-length [`LockRange`] is translated into a range running to the largest
/// representable offset. Negative offsets and lengths fail with `ERROR_INVALID_PARAMETER`.
///
/// `UnlockFileEx()` reports `ERROR_NOT_LOCKED` for a range that isn't locked; that is folded
/// into success to match the POSIX backend.
///
/// Unlike `fcntl()`, `UnlockFileEx()` can only remove a lock whose range matches a locked range
/// *exactly*. Releasing part of a locked range (say `[40, 60)` out of `[0, 100)`) unlocks
/// nothing, yet still succeeds, because the OS reports it as `ERROR_NOT_LOCKED`. Release the
/// same ranges that were acquired.
///
/// Handles should be opened for synchronous I/O. If a handle was opened with
/// `FILE_FLAG_OVERLAPPED`, a request the OS cannot grant immediately completes asynchronously;
/// the call then waits for that completion with `GetOverlappedResult()` before returning, so
/// such handles must not have other I/O in flight at the same time.
#[derive(Copy, Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct Win32Lock;

impl LockBackend for Win32Lock {
    fn acquire(
        &self,
        handle: FileHandle,
        wait: WaitPolicy,
        range: LockRange,
        mode: LockMode,
    ) -> Result<()> {
        let (offset, len) = span(range)?;

        let mut flags = 0;
        if mode == LockMode::Exclusive {
            flags |= LOCKFILE_EXCLUSIVE_LOCK;
        }
        if wait == WaitPolicy::NonBlocking {
            flags |= LOCKFILE_FAIL_IMMEDIATELY;
        }

        let mut overlapped = overlapped_at(offset);
        let res = Error::unpack_bool(unsafe {
            LockFileEx(
                handle.raw(),
                flags,
                0,
                len as u32,
                (len >> 32) as u32,
                &mut overlapped,
            )
        });
        let res = finish(handle, &overlapped, res);

        trace!(
            "LockFileEx(handle={}, flags={:#x}, offset={}, len={}) -> {:?}",
            handle.raw(),
            flags,
            offset,
            len,
            res
        );

        res
    }

    fn release(&self, handle: FileHandle, range: LockRange) -> Result<()> {
        let (offset, len) = span(range)?;

        let mut overlapped = overlapped_at(offset);
        let res = Error::unpack_bool(unsafe {
            UnlockFileEx(
                handle.raw(),
                0,
                len as u32,
                (len >> 32) as u32,
                &mut overlapped,
            )
        });
        let res = finish(handle, &overlapped, res);

        trace!(
            "UnlockFileEx(handle={}, offset={}, len={}) -> {:?}",
            handle.raw(),
            offset,
            len,
            res
        );

        match res {
            Err(e) if e.code() == win::ERROR_NOT_LOCKED as i32 => Ok(()),
            res => res,
        }
    }
}

/// Translate `range` into the unsigned (offset, length) pair `LockFileEx()` expects.
fn span(range: LockRange) -> Result<(u64, u64)> {
    if range.offset < 0 || range.length < 0 {
        return Err(Error::from_code(win::ERROR_INVALID_PARAMETER as i32));
    }

    let offset = range.offset as u64;
    let len = if range.is_to_end() {
        u64::MAX - offset
    } else {
        range.length as u64
    };

    Ok((offset, len))
}

/// Wait out a request that went asynchronous on an overlapped handle.
///
/// `overlapped` must be the structure passed to the request; the OS may write to it until the
/// request completes, so it has to outlive this call.
fn finish(handle: FileHandle, overlapped: &OVERLAPPED, res: Result<()>) -> Result<()> {
    match res {
        Err(e) if e.code() == win::ERROR_IO_PENDING as i32 => {
            let mut transferred = 0;
            Error::unpack_bool(unsafe {
                GetOverlappedResult(handle.raw(), overlapped, &mut transferred, 1)
            })
        }
        res => res,
    }
}

fn overlapped_at(offset: u64) -> OVERLAPPED {
    let mut overlapped: OVERLAPPED = unsafe { core::mem::zeroed() };
    unsafe {
        overlapped.Anonymous.Anonymous.Offset = offset as u32;
        overlapped.Anonymous.Anonymous.OffsetHigh = (offset >> 32) as u32;
    }
    overlapped
}

pub(crate) fn error_kind(code: i32) -> ErrorKind {
    match code as u32 {
        win::ERROR_INVALID_HANDLE => ErrorKind::InvalidHandle,
        win::ERROR_LOCK_VIOLATION => ErrorKind::WouldBlock,
        win::ERROR_OPERATION_ABORTED => ErrorKind::Interrupted,
        win::ERROR_ACCESS_DENIED => ErrorKind::PermissionDenied,
        win::ERROR_POSSIBLE_DEADLOCK => ErrorKind::Deadlock,
        win::ERROR_NOT_ENOUGH_MEMORY | win::ERROR_SHARING_BUFFER_EXCEEDED => {
            ErrorKind::Unavailable
        }
        win::ERROR_INVALID_PARAMETER => ErrorKind::InvalidRange,
        _ => ErrorKind::Other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span() {
        assert_eq!(span(LockRange::new(100, 50)).unwrap(), (100, 50));
        assert_eq!(span(LockRange::to_end(100)).unwrap(), (100, u64::MAX - 100));
        assert_eq!(span(LockRange::whole_file()).unwrap(), (0, u64::MAX));

        assert_eq!(
            span(LockRange::new(-1, 10)).unwrap_err().kind(),
            ErrorKind::InvalidRange
        );
        assert_eq!(
            span(LockRange::new(10, -1)).unwrap_err().kind(),
            ErrorKind::InvalidRange
        );
    }

    #[test]
    fn test_overlapped_at() {
        let overlapped = overlapped_at(0x1_0000_0002);
        unsafe {
            assert_eq!(overlapped.Anonymous.Anonymous.Offset, 2);
            assert_eq!(overlapped.Anonymous.Anonymous.OffsetHigh, 1);
        }
    }

    #[test]
    fn test_error_kind() {
        assert_eq!(
            error_kind(win::ERROR_LOCK_VIOLATION as i32),
            ErrorKind::WouldBlock
        );
        assert_eq!(
            error_kind(win::ERROR_INVALID_HANDLE as i32),
            ErrorKind::InvalidHandle
        );
        assert_eq!(error_kind(win::ERROR_NOT_LOCKED as i32), ErrorKind::Other);
    }

    #[test]
    fn test_finish_passes_through() {
        let overlapped = overlapped_at(0);
        let handle = FileHandle::invalid();

        assert_eq!(finish(handle, &overlapped, Ok(())), Ok(()));

        let err = Error::from_code(win::ERROR_LOCK_VIOLATION as i32);
        assert_eq!(finish(handle, &overlapped, Err(err)), Err(err));
    }
}

use core::fmt;

use crate::internal_prelude::*;

pub type Result<T> = core::result::Result<T, Error>;

/// The semantic category of a locking failure.
///
/// This is a closed set; callers can branch on it without looking at platform-specific codes.
/// The raw code is still available through [`Error::code()`].
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq)]
pub enum ErrorKind {
    /// The handle was rejected, either before any OS call (negative descriptor, null or
    /// `INVALID_HANDLE_VALUE`) or by the OS itself (e.g. a closed descriptor, or a descriptor
    /// not opened for writing when requesting an exclusive lock).
    InvalidHandle,
    /// A non-blocking request conflicted with a lock held through another process or open file
    /// description.
    WouldBlock,
    /// A blocking wait was interrupted (e.g. by a signal handler) before the lock was granted.
    Interrupted,
    /// The OS refused the request for a reason other than a conflicting lock.
    PermissionDenied,
    /// Granting a blocking request would have deadlocked with another waiter.
    Deadlock,
    /// The system lock table is exhausted, or the filesystem cannot store the lock.
    Unavailable,
    /// The offset/length pair does not describe a range the OS accepts.
    InvalidRange,
    /// Any other OS failure.
    Other,
}

impl ErrorKind {
    /// Whether retrying the identical request later may succeed.
    ///
    /// This is only a hint for the caller's retry policy; nothing in this crate retries.
    #[inline]
    pub fn is_transient(self) -> bool {
        matches!(self, Self::WouldBlock | Self::Interrupted | Self::Deadlock)
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::InvalidHandle => "invalid handle",
            Self::WouldBlock => "lock held by another owner",
            Self::Interrupted => "lock wait interrupted",
            Self::PermissionDenied => "permission denied",
            Self::Deadlock => "lock wait would deadlock",
            Self::Unavailable => "no locks available",
            Self::InvalidRange => "invalid lock range",
            Self::Other => "other error",
        }
    }
}

impl fmt::Display for ErrorKind {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Represents an OS error encountered when locking or unlocking a range.
///
/// On Unix this stores an `errno` value; on Windows it stores a Win32 error code.
#[derive(Copy, Clone, Eq, Hash, PartialEq)]
pub struct Error(i32);

impl Error {
    /// If `res` is -1, return the last OS error. Otherwise return `Ok(res)`.
    #[cfg(unix)]
    #[inline]
    pub(crate) fn unpack(res: i32) -> Result<i32> {
        if res == -1 {
            Err(Self::last())
        } else {
            Ok(res)
        }
    }

    /// If `res` is zero (`FALSE`), return the last OS error. Otherwise return `Ok(())`.
    #[cfg(windows)]
    #[inline]
    pub(crate) fn unpack_bool(res: i32) -> Result<()> {
        if res == 0 {
            Err(Self::last())
        } else {
            Ok(())
        }
    }

    /// The error reported for a handle that is rejected without consulting the OS.
    #[cfg(unix)]
    #[inline]
    pub(crate) const fn invalid_handle() -> Self {
        Self(libc::EBADF)
    }

    #[cfg(windows)]
    #[inline]
    pub(crate) const fn invalid_handle() -> Self {
        Self(windows_sys::Win32::Foundation::ERROR_INVALID_HANDLE as i32)
    }

    /// Get the last OS error that occured on this thread (the current `errno` value).
    #[cfg(unix)]
    #[inline]
    pub fn last() -> Self {
        Self(errno_get())
    }

    /// Get the last OS error that occured on this thread (`GetLastError()`).
    #[cfg(windows)]
    #[inline]
    pub fn last() -> Self {
        Self(unsafe { windows_sys::Win32::Foundation::GetLastError() } as i32)
    }

    /// Construct an `Error` from a raw OS error code.
    #[inline]
    pub const fn from_code(code: i32) -> Self {
        Self(code)
    }

    /// Get the raw OS error code represented by this `Error` object.
    #[inline]
    pub const fn code(&self) -> i32 {
        self.0
    }

    /// Map the raw code into its [`ErrorKind`].
    #[inline]
    pub fn kind(&self) -> ErrorKind {
        sys::error_kind(self.0)
    }

    #[cfg(unix)]
    pub(crate) fn strerror(&self) -> &'static str {
        // strerror() allocates "Unknown error %d" for out-of-range codes on most OSes, so that
        // case can't be 'static. Collapse it to a fixed message instead.
        static UNKNOWN_ERROR: &str = "Unknown error";

        use core::cmp::Ordering;
        match self.0.cmp(&0) {
            Ordering::Less => return UNKNOWN_ERROR,
            Ordering::Equal => return "Success",
            _ => (),
        }

        let ptr = unsafe { libc::strerror(self.0) };
        debug_assert!(!ptr.is_null());

        let msg = match core::str::from_utf8(unsafe { util::bytes_from_ptr(ptr) }) {
            Ok(msg) => msg,
            Err(_) => return UNKNOWN_ERROR,
        };

        #[cfg(not(all(target_os = "linux", target_env = "musl")))]
        if msg.starts_with(UNKNOWN_ERROR) {
            return UNKNOWN_ERROR;
        }

        msg
    }

    #[cfg(windows)]
    pub(crate) fn strerror(&self) -> &'static str {
        use windows_sys::Win32::Foundation as win;

        match self.0 as u32 {
            0 => "The operation completed successfully.",
            win::ERROR_INVALID_HANDLE => "The handle is invalid.",
            win::ERROR_ACCESS_DENIED => "Access is denied.",
            win::ERROR_LOCK_VIOLATION => {
                "The process cannot access the file because another process has locked a \
                 portion of the file."
            }
            win::ERROR_NOT_LOCKED => "The segment is already unlocked.",
            win::ERROR_INVALID_PARAMETER => "The parameter is incorrect.",
            win::ERROR_OPERATION_ABORTED => {
                "The I/O operation has been aborted because of either a thread exit or an \
                 application request."
            }
            win::ERROR_NOT_ENOUGH_MEMORY => {
                "Not enough memory resources are available to process this command."
            }
            _ => "Unknown error",
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.strerror())?;
        write!(f, " (code {})", self.0)
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Error")
            .field("code", &self.0)
            .field("kind", &self.kind())
            .field("message", &self.strerror())
            .finish()
    }
}

impl PartialEq<ErrorKind> for Error {
    #[inline]
    fn eq(&self, other: &ErrorKind) -> bool {
        self.kind() == *other
    }
}

impl PartialEq<Error> for ErrorKind {
    #[inline]
    fn eq(&self, other: &Error) -> bool {
        *self == other.kind()
    }
}

#[cfg_attr(docsrs, doc(cfg(feature = "std")))]
#[cfg(feature = "std")]
impl std::error::Error for Error {}

#[cfg_attr(docsrs, doc(cfg(feature = "std")))]
#[cfg(feature = "std")]
impl From<Error> for std::io::Error {
    #[inline]
    fn from(e: Error) -> Self {
        Self::from_raw_os_error(e.0)
    }
}

#[cfg_attr(docsrs, doc(cfg(feature = "nix")))]
#[cfg(all(unix, feature = "nix"))]
impl From<Error> for nix::Error {
    #[inline]
    fn from(e: Error) -> Self {
        Self::Sys(nix::errno::Errno::from_i32(e.0))
    }
}

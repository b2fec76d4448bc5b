//! Stateless advisory byte-range file locks.
//!
//! `rangelock` sets and clears locks on byte ranges of files that are already open, using the
//! operating system's own lock manager (`fcntl()` on Unix, `LockFileEx()` on Windows). It is
//! meant to sit underneath a higher-level lock manager, which decides *when* to lock and what to
//! do when a lock can't be had.
//!
//! ```
//! # #[cfg(all(unix, feature = "std"))]
//! # {
//! use rangelock::{acquire, release, AsFileHandle, LockMode, LockRange, WaitPolicy};
//!
//! let file = tempfile::tempfile().unwrap();
//! let handle = file.as_file_handle();
//!
//! acquire(handle, WaitPolicy::NonBlocking, LockRange::new(0, 100), LockMode::Exclusive).unwrap();
//! release(handle, LockRange::new(0, 100)).unwrap();
//! # }
//! ```
//!
//! ## No bookkeeping
//!
//! Nothing in this crate remembers which ranges are locked. Each call is a single request to the
//! OS, and the OS lock table is the only source of truth. In particular:
//!
//! - [`release()`] succeeds for a range that isn't locked, so its success proves nothing.
//! - On Windows a release only removes a lock whose range matches it exactly. Releasing part of
//!   a locked range succeeds without unlocking anything, where POSIX would split the lock.
//! - Locking several ranges atomically, retrying, backing off, and detecting deadlocks are all
//!   the caller's job.
//!
//! ## Lock ownership
//!
//! Who owns a lock depends on the backend. The default Unix backend sets classic POSIX record
//! locks, which belong to the *process*: closing any descriptor for a file drops every lock the
//! process holds on it, even if the lock was taken through a different descriptor. On Linux,
//! [`FcntlLock::open_file_description()`] gives locks that belong to a single open file
//! description instead. On Windows, locks belong to the handle.
//!
//! ## Zero-length ranges
//!
//! A [`LockRange`] with `length == 0` means "from `offset` to the end of the file", not "no
//! bytes". See [`LockRange::to_end()`].
//!
//! ## Errors
//!
//! Failures carry the raw OS code ([`Error::code()`]) and map into a small closed set of
//! [`ErrorKind`]s that a caller can branch on portably. Nothing is retried; an interrupted
//! blocking wait is reported as [`ErrorKind::Interrupted`].

#![cfg_attr(not(feature = "std"), no_std)]
#![cfg_attr(docsrs, feature(doc_cfg))]

macro_rules! trace {
    ($($arg:tt)+) => {{
        #[cfg(feature = "log")]
        log::trace!($($arg)+);
    }};
}

mod backend;
mod err;
mod handle;
mod lock;
mod range;

pub mod raw;

pub use backend::*;
pub use err::{Error, ErrorKind, Result};
pub use handle::*;
pub use lock::*;
pub use range::*;

cfg_if::cfg_if! {
    if #[cfg(unix)] {
        mod errno;
        mod fcntl;
        mod util;

        pub use fcntl::{FcntlLock, LockScope};
    } else if #[cfg(windows)] {
        mod lockfileex;

        pub use lockfileex::Win32Lock;
    }
}

mod internal_prelude {
    pub use core::mem::MaybeUninit;

    pub use super::{
        acquire_with, release_with, AsFileHandle, Error, ErrorKind, FileHandle, LockBackend,
        LockMode, LockRange, RawFileHandle, Result, WaitPolicy,
    };

    #[cfg(unix)]
    pub(crate) use super::fcntl as sys;
    #[cfg(windows)]
    pub(crate) use super::lockfileex as sys;

    #[cfg(unix)]
    pub(crate) use super::util;
    #[cfg(unix)]
    pub use super::errno::errno_get;
    #[cfg(all(unix, test))]
    pub use super::errno::errno_set;
}

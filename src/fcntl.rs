use core::convert::TryFrom;

use crate::internal_prelude::*;

/// Who owns a lock set through `fcntl()`.
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq)]
pub enum LockScope {
    /// Classic POSIX record locks (`F_SETLK`/`F_SETLKW`).
    ///
    /// Locks belong to the process. Two descriptors for the same file inside one process never
    /// conflict, and closing *any* descriptor for the file drops every lock the process holds on
    /// it. Locks are not inherited across `fork()`.
    Process,
    /// Open file description locks (`F_OFD_SETLK`/`F_OFD_SETLKW`).
    ///
    /// Locks belong to the open file description, so two `open()`s of the same path conflict
    /// even within one process, and the lock survives until the last descriptor referring to
    /// that description is closed.
    #[cfg_attr(docsrs, doc(cfg(any(target_os = "linux", target_os = "android"))))]
    #[cfg(linuxlike)]
    OpenFileDescription,
}

/// The POSIX backend: byte-range locks set with `fcntl()`.
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq)]
pub struct FcntlLock {
    scope: LockScope,
}

impl FcntlLock {
    #[inline]
    pub const fn process() -> Self {
        Self {
            scope: LockScope::Process,
        }
    }

    #[cfg_attr(docsrs, doc(cfg(any(target_os = "linux", target_os = "android"))))]
    #[cfg(linuxlike)]
    #[inline]
    pub const fn open_file_description() -> Self {
        Self {
            scope: LockScope::OpenFileDescription,
        }
    }

    #[inline]
    pub const fn scope(&self) -> LockScope {
        self.scope
    }

    fn setlk_cmd(&self, wait: WaitPolicy) -> libc::c_int {
        match (self.scope, wait) {
            (LockScope::Process, WaitPolicy::Blocking) => libc::F_SETLKW,
            (LockScope::Process, WaitPolicy::NonBlocking) => libc::F_SETLK,
            #[cfg(linuxlike)]
            (LockScope::OpenFileDescription, WaitPolicy::Blocking) => libc::F_OFD_SETLKW,
            #[cfg(linuxlike)]
            (LockScope::OpenFileDescription, WaitPolicy::NonBlocking) => libc::F_OFD_SETLK,
        }
    }

    fn set_lock(&self, handle: FileHandle, wait: WaitPolicy, mut fl: libc::flock) -> Result<()> {
        let cmd = self.setlk_cmd(wait);
        let res = unsafe {
            fcntl_ptr(
                handle.raw(),
                cmd,
                &mut fl as *mut libc::flock as *mut libc::c_void,
            )
        };

        trace!(
            "fcntl(fd={}, cmd={}, type={}, start={}, len={}) -> {:?}",
            handle.raw(),
            cmd,
            fl.l_type,
            fl.l_start,
            fl.l_len,
            res
        );

        res.map(drop)
    }
}

impl Default for FcntlLock {
    #[inline]
    fn default() -> Self {
        Self::process()
    }
}

impl LockBackend for FcntlLock {
    fn acquire(
        &self,
        handle: FileHandle,
        wait: WaitPolicy,
        range: LockRange,
        mode: LockMode,
    ) -> Result<()> {
        let l_type = match mode {
            LockMode::Shared => libc::F_RDLCK,
            LockMode::Exclusive => libc::F_WRLCK,
        };

        self.set_lock(handle, wait, range_flock(l_type as _, range)?)
    }

    fn release(&self, handle: FileHandle, range: LockRange) -> Result<()> {
        // Unlocking a range that isn't locked succeeds.
        self.set_lock(
            handle,
            WaitPolicy::NonBlocking,
            range_flock(libc::F_UNLCK as _, range)?,
        )
    }
}

/// Build the `struct flock` for `range`, anchored at the start of the file.
///
/// Fails with `EOVERFLOW` if the range does not fit in `off_t`.
pub(crate) fn range_flock(l_type: libc::c_int, range: LockRange) -> Result<libc::flock> {
    let start =
        libc::off_t::try_from(range.offset).map_err(|_| Error::from_code(libc::EOVERFLOW))?;
    let len =
        libc::off_t::try_from(range.length).map_err(|_| Error::from_code(libc::EOVERFLOW))?;

    // Zeroed so that platform-specific fields (l_pid, l_sysid, ...) start out as 0; OFD locks
    // require l_pid == 0.
    let mut fl = unsafe { MaybeUninit::<libc::flock>::zeroed().assume_init() };
    fl.l_type = l_type as _;
    fl.l_whence = libc::SEEK_SET as _;
    fl.l_start = start;
    fl.l_len = len;

    Ok(fl)
}

/// Call `fcntl()` with an pointer argument.
///
/// # Safety
///
/// 1. The given `arg` must be a valid pointer to a buffer that is large enough for the given
///    `cmd`.
/// 2. This must not be used to violate other invariants.
#[inline]
unsafe fn fcntl_ptr(
    fd: RawFileHandle,
    cmd: libc::c_int,
    arg: *mut libc::c_void,
) -> Result<libc::c_int> {
    Error::unpack(libc::fcntl(fd, cmd, arg))
}

pub(crate) fn error_kind(eno: i32) -> ErrorKind {
    match eno {
        libc::EBADF => ErrorKind::InvalidHandle,
        // POSIX lets a conflicting F_SETLK fail with either of these.
        libc::EAGAIN | libc::EACCES => ErrorKind::WouldBlock,
        eno if eno == libc::EWOULDBLOCK => ErrorKind::WouldBlock,
        libc::EINTR => ErrorKind::Interrupted,
        libc::EPERM => ErrorKind::PermissionDenied,
        libc::EDEADLK => ErrorKind::Deadlock,
        libc::ENOLCK => ErrorKind::Unavailable,
        libc::EINVAL | libc::EOVERFLOW => ErrorKind::InvalidRange,
        _ => ErrorKind::Other,
    }
}

#[cfg(all(feature = "std", unix))]
use std::os::unix::io::{AsRawFd, RawFd};
#[cfg(all(feature = "std", windows))]
use std::os::windows::io::{AsRawHandle, RawHandle};

cfg_if::cfg_if! {
    if #[cfg(unix)] {
        /// The platform's raw handle type: a file descriptor.
        pub type RawFileHandle = libc::c_int;
    } else {
        /// The platform's raw handle type: a Win32 `HANDLE`.
        pub type RawFileHandle = windows_sys::Win32::Foundation::HANDLE;
    }
}

/// A "borrowed" reference to an open file.
///
/// This never opens, closes or duplicates anything; the caller owns the underlying file and must
/// keep it open for as long as the handle is used. Any raw value is accepted, and obviously bogus
/// values are rejected by [`acquire()`](crate::acquire()) and [`release()`](crate::release())
/// before the OS is consulted.
///
/// On Windows the handle should be opened for synchronous I/O (without
/// `FILE_FLAG_OVERLAPPED`); see `Win32Lock` for what happens otherwise.
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq)]
pub struct FileHandle(RawFileHandle);

impl FileHandle {
    #[inline]
    pub const fn from_raw(raw: RawFileHandle) -> Self {
        Self(raw)
    }

    /// A handle that is never valid (`-1` on Unix, `INVALID_HANDLE_VALUE` on Windows).
    #[cfg(unix)]
    #[inline]
    pub const fn invalid() -> Self {
        Self(-1)
    }

    /// A handle that is never valid (`-1` on Unix, `INVALID_HANDLE_VALUE` on Windows).
    #[cfg(windows)]
    #[inline]
    pub const fn invalid() -> Self {
        Self(windows_sys::Win32::Foundation::INVALID_HANDLE_VALUE)
    }

    /// Access the raw value.
    ///
    /// This is only meaningful while the owning file is open.
    #[inline]
    pub const fn raw(self) -> RawFileHandle {
        self.0
    }

    /// Whether the raw value could name an open file.
    ///
    /// This only checks the value itself; a closed descriptor still passes and is reported by the
    /// OS when used.
    #[cfg(unix)]
    #[inline]
    pub const fn is_valid(self) -> bool {
        self.0 >= 0
    }

    /// Whether the raw value could name an open file.
    ///
    /// Null and `INVALID_HANDLE_VALUE` are rejected; a closed handle still passes and is
    /// reported by the OS when used.
    #[cfg(windows)]
    #[inline]
    pub const fn is_valid(self) -> bool {
        self.0 != 0 && self.0 != windows_sys::Win32::Foundation::INVALID_HANDLE_VALUE
    }
}

#[cfg(all(feature = "std", unix))]
impl AsRawFd for FileHandle {
    #[inline]
    fn as_raw_fd(&self) -> RawFd {
        self.0
    }
}

#[cfg(all(feature = "std", windows))]
impl AsRawHandle for FileHandle {
    #[inline]
    fn as_raw_handle(&self) -> RawHandle {
        self.0 as RawHandle
    }
}

/// Anything a [`FileHandle`] can be borrowed from.
///
/// With the `std` feature this covers everything implementing `AsRawFd` (Unix) or `AsRawHandle`
/// (Windows), such as `std::fs::File`.
pub trait AsFileHandle {
    fn as_file_handle(&self) -> FileHandle;
}

#[cfg(all(feature = "std", unix))]
impl<T: AsRawFd + ?Sized> AsFileHandle for T {
    #[inline]
    fn as_file_handle(&self) -> FileHandle {
        FileHandle(self.as_raw_fd())
    }
}

#[cfg(all(feature = "std", windows))]
impl<T: AsRawHandle + ?Sized> AsFileHandle for T {
    #[inline]
    fn as_file_handle(&self) -> FileHandle {
        FileHandle(self.as_raw_handle() as RawFileHandle)
    }
}

#[cfg(not(feature = "std"))]
impl AsFileHandle for FileHandle {
    #[inline]
    fn as_file_handle(&self) -> FileHandle {
        *self
    }
}

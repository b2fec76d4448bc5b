#[cfg(any(target_os = "linux", target_os = "dragonfly"))]
pub use libc::__errno_location as errno_ptr;

#[cfg(any(target_os = "freebsd", target_os = "macos", target_os = "ios"))]
pub use libc::__error as errno_ptr;

#[cfg(any(target_os = "android", target_os = "netbsd", target_os = "openbsd"))]
pub use libc::__errno as errno_ptr;

/// Equivalent to `CStr::from_ptr(ptr).to_bytes()`, but (possibly) slightly faster.
#[inline]
pub unsafe fn bytes_from_ptr<'a>(ptr: *const libc::c_char) -> &'a [u8] {
    core::slice::from_raw_parts(ptr as *const u8, libc::strlen(ptr))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bytes_from_ptr() {
        let s = b"abc\0";
        assert_eq!(
            unsafe { bytes_from_ptr(s.as_ptr() as *const libc::c_char) },
            b"abc"
        );

        let s = b"\0";
        assert_eq!(
            unsafe { bytes_from_ptr(s.as_ptr() as *const libc::c_char) },
            b""
        );
    }
}

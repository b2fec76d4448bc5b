use crate::internal_prelude::*;

/// Get the current thread's `errno` value.
#[inline]
pub fn errno_get() -> libc::c_int {
    unsafe { *util::errno_ptr() }
}

/// Set the current thread's `errno` value.
#[cfg(test)]
#[inline]
pub fn errno_set(eno: libc::c_int) {
    unsafe {
        *util::errno_ptr() = eno;
    }
}

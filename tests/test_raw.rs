#![cfg(unix)]

use std::os::unix::prelude::*;

use rangelock::{raw, Error, ErrorKind};

fn run_child<F: FnOnce() -> i32>(f: F) -> i32 {
    match unsafe { libc::fork() } {
        -1 => panic!("fork() failed: {}", std::io::Error::last_os_error()),

        0 => unsafe { libc::_exit(f()) },

        pid => {
            let mut status = 0;
            assert_eq!(unsafe { libc::waitpid(pid, &mut status, 0) }, pid);
            assert!(libc::WIFEXITED(status));
            libc::WEXITSTATUS(status)
        }
    }
}

#[test]
fn test_invalid_handle() {
    assert_eq!(raw::acquire(-1, false, 0, 100, false), libc::EBADF);
    assert_eq!(raw::acquire(-1, true, 0, 100, true), libc::EBADF);
    assert_eq!(raw::release(-1, 0, 100), libc::EBADF);
}

#[test]
fn test_codes() {
    let file = tempfile::tempfile().unwrap();
    let fd = file.as_raw_fd();

    assert_eq!(raw::acquire(fd, false, 0, 100, false), 0);
    assert_eq!(raw::acquire(fd, true, 200, 0, true), 0);

    let code = run_child(|| raw::acquire(fd, false, 50, 100, true));
    assert!(code == libc::EAGAIN || code == libc::EACCES, "{}", code);
    assert_eq!(Error::from_code(code).kind(), ErrorKind::WouldBlock);

    // Shared locks coexist
    assert_eq!(run_child(|| raw::acquire(fd, false, 300, 10, true)), 0);

    assert_eq!(raw::release(fd, 0, 100), 0);
    assert_eq!(raw::release(fd, 0, 100), 0);
    assert_eq!(raw::release(fd, 200, 0), 0);

    assert_eq!(run_child(|| raw::acquire(fd, false, 0, 0, false)), 0);
}

#![cfg(unix)]

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::os::unix::prelude::*;
use std::path::Path;

use rangelock::{
    acquire, raw, release, AsFileHandle, Error, ErrorKind, FileHandle, LockMode, LockRange,
    WaitPolicy,
};

fn open_rw(path: &Path) -> File {
    OpenOptions::new().read(true).write(true).open(path).unwrap()
}

/// Run `f` in a forked child and return its exit status.
///
/// Classic POSIX locks never conflict inside one process, so conflicts have to be observed from
/// another one.
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

/// Try a non-blocking lock from a child process and return the resulting code.
fn child_try_lock(fd: RawFd, range: LockRange, mode: LockMode) -> i32 {
    run_child(|| {
        raw::acquire(
            fd,
            false,
            range.offset,
            range.length,
            mode == LockMode::Shared,
        )
    })
}

fn assert_conflict(code: i32) {
    assert_ne!(code, 0);
    assert_eq!(Error::from_code(code).kind(), ErrorKind::WouldBlock);
}

#[test]
fn test_exclusive_conflicts() {
    let file = tempfile::tempfile().unwrap();
    let handle = file.as_file_handle();

    acquire(
        handle,
        WaitPolicy::NonBlocking,
        LockRange::new(0, 100),
        LockMode::Exclusive,
    )
    .unwrap();

    assert_conflict(child_try_lock(
        file.as_raw_fd(),
        LockRange::new(50, 100),
        LockMode::Exclusive,
    ));
    assert_conflict(child_try_lock(
        file.as_raw_fd(),
        LockRange::new(50, 100),
        LockMode::Shared,
    ));
    assert_conflict(child_try_lock(
        file.as_raw_fd(),
        LockRange::new(99, 1),
        LockMode::Shared,
    ));

    // Adjacent, not overlapping
    assert_eq!(
        child_try_lock(
            file.as_raw_fd(),
            LockRange::new(100, 50),
            LockMode::Exclusive
        ),
        0
    );

    release(handle, LockRange::new(0, 100)).unwrap();

    assert_eq!(
        child_try_lock(
            file.as_raw_fd(),
            LockRange::new(50, 100),
            LockMode::Exclusive
        ),
        0
    );
}

#[test]
fn test_shared_coexist() {
    let file = tempfile::tempfile().unwrap();
    let handle = file.as_file_handle();

    acquire(
        handle,
        WaitPolicy::NonBlocking,
        LockRange::new(0, 100),
        LockMode::Shared,
    )
    .unwrap();

    assert_eq!(
        child_try_lock(file.as_raw_fd(), LockRange::new(0, 100), LockMode::Shared),
        0
    );
    assert_conflict(child_try_lock(
        file.as_raw_fd(),
        LockRange::new(0, 100),
        LockMode::Exclusive,
    ));

    release(handle, LockRange::new(0, 100)).unwrap();

    assert_eq!(
        child_try_lock(
            file.as_raw_fd(),
            LockRange::new(0, 100),
            LockMode::Exclusive
        ),
        0
    );
}

#[test]
fn test_partial_release() {
    let file = tempfile::tempfile().unwrap();
    let handle = file.as_file_handle();

    acquire(
        handle,
        WaitPolicy::NonBlocking,
        LockRange::new(0, 100),
        LockMode::Exclusive,
    )
    .unwrap();

    // Punch a hole in the middle; both ends stay locked
    release(handle, LockRange::new(40, 20)).unwrap();

    assert_eq!(
        child_try_lock(
            file.as_raw_fd(),
            LockRange::new(40, 20),
            LockMode::Exclusive
        ),
        0
    );
    assert_conflict(child_try_lock(
        file.as_raw_fd(),
        LockRange::new(30, 20),
        LockMode::Exclusive,
    ));
    assert_conflict(child_try_lock(
        file.as_raw_fd(),
        LockRange::new(60, 1),
        LockMode::Shared,
    ));
}

#[test]
fn test_to_end_of_file() {
    let mut file = tempfile::tempfile().unwrap();
    file.write_all(&[0; 200]).unwrap();
    let handle = file.as_file_handle();

    acquire(
        handle,
        WaitPolicy::NonBlocking,
        LockRange::to_end(100),
        LockMode::Exclusive,
    )
    .unwrap();

    assert_conflict(child_try_lock(
        file.as_raw_fd(),
        LockRange::new(150, 10),
        LockMode::Shared,
    ));
    // Past the current end of the file
    assert_conflict(child_try_lock(
        file.as_raw_fd(),
        LockRange::new(10_000, 1),
        LockMode::Shared,
    ));
    assert_eq!(
        child_try_lock(file.as_raw_fd(), LockRange::new(0, 100), LockMode::Shared),
        0
    );

    release(handle, LockRange::to_end(100)).unwrap();

    acquire(
        handle,
        WaitPolicy::NonBlocking,
        LockRange::new(100, 50),
        LockMode::Exclusive,
    )
    .unwrap();

    assert_eq!(
        child_try_lock(file.as_raw_fd(), LockRange::new(150, 10), LockMode::Shared),
        0
    );
    assert_eq!(
        child_try_lock(
            file.as_raw_fd(),
            LockRange::new(10_000, 1),
            LockMode::Shared
        ),
        0
    );
    assert_conflict(child_try_lock(
        file.as_raw_fd(),
        LockRange::new(120, 1),
        LockMode::Shared,
    ));
    assert_conflict(child_try_lock(
        file.as_raw_fd(),
        LockRange::whole_file(),
        LockMode::Shared,
    ));
}

#[test]
fn test_release_unlocked() {
    let file = tempfile::tempfile().unwrap();
    let handle = file.as_file_handle();

    release(handle, LockRange::new(0, 100)).unwrap();
    release(handle, LockRange::whole_file()).unwrap();

    acquire(
        handle,
        WaitPolicy::NonBlocking,
        LockRange::new(0, 10),
        LockMode::Shared,
    )
    .unwrap();
    release(handle, LockRange::new(0, 10)).unwrap();
    release(handle, LockRange::new(0, 10)).unwrap();
}

#[test]
fn test_invalid_handle() {
    for &handle in &[FileHandle::invalid(), FileHandle::from_raw(-5)] {
        for &wait in &[WaitPolicy::Blocking, WaitPolicy::NonBlocking] {
            for &mode in &[LockMode::Shared, LockMode::Exclusive] {
                let err = acquire(handle, wait, LockRange::new(0, 100), mode).unwrap_err();
                assert_eq!(err.kind(), ErrorKind::InvalidHandle);
                assert_eq!(err.code(), libc::EBADF);
            }
        }

        assert_eq!(
            release(handle, LockRange::new(0, 100)).unwrap_err(),
            ErrorKind::InvalidHandle
        );
    }
}

#[test]
fn test_exclusive_needs_write_access() {
    let tmp = tempfile::NamedTempFile::new().unwrap();
    let file = File::open(tmp.path()).unwrap();
    let handle = file.as_file_handle();

    assert_eq!(
        acquire(
            handle,
            WaitPolicy::NonBlocking,
            LockRange::new(0, 10),
            LockMode::Exclusive
        )
        .unwrap_err()
        .code(),
        libc::EBADF
    );

    acquire(
        handle,
        WaitPolicy::NonBlocking,
        LockRange::new(0, 10),
        LockMode::Shared,
    )
    .unwrap();
}

#[test]
fn test_process_scope() {
    let tmp = tempfile::NamedTempFile::new().unwrap();
    let a = open_rw(tmp.path());
    let b = open_rw(tmp.path());

    acquire(
        a.as_file_handle(),
        WaitPolicy::NonBlocking,
        LockRange::new(0, 100),
        LockMode::Exclusive,
    )
    .unwrap();

    // Same process: never a conflict
    acquire(
        b.as_file_handle(),
        WaitPolicy::NonBlocking,
        LockRange::new(0, 100),
        LockMode::Exclusive,
    )
    .unwrap();
    release(b.as_file_handle(), LockRange::new(50, 50)).unwrap();

    assert_eq!(
        child_try_lock(a.as_raw_fd(), LockRange::new(50, 50), LockMode::Exclusive),
        0
    );
    assert_conflict(child_try_lock(
        a.as_raw_fd(),
        LockRange::new(0, 50),
        LockMode::Exclusive,
    ));

    // Closing any descriptor for the file drops all of the process's locks on it
    drop(b);

    assert_eq!(
        child_try_lock(a.as_raw_fd(), LockRange::new(0, 50), LockMode::Exclusive),
        0
    );
}

#[test]
fn test_guard() {
    let file = tempfile::tempfile().unwrap();

    let guard = rangelock::try_lock(&file, LockRange::new(0, 100), LockMode::Exclusive).unwrap();
    assert_conflict(child_try_lock(
        file.as_raw_fd(),
        LockRange::new(0, 1),
        LockMode::Shared,
    ));
    drop(guard);
    assert_eq!(
        child_try_lock(file.as_raw_fd(), LockRange::new(0, 1), LockMode::Shared),
        0
    );

    let guard = rangelock::lock(&file, LockRange::to_end(10), LockMode::Shared).unwrap();
    assert_eq!(
        child_try_lock(file.as_raw_fd(), LockRange::new(20, 1), LockMode::Shared),
        0
    );
    assert_conflict(child_try_lock(
        file.as_raw_fd(),
        LockRange::new(20, 1),
        LockMode::Exclusive,
    ));
    guard.unlock().unwrap();
    assert_eq!(
        child_try_lock(
            file.as_raw_fd(),
            LockRange::new(20, 1),
            LockMode::Exclusive
        ),
        0
    );
}

//! Exclusive advisory lock on the sibling `<config>.lock` file.
//!
//! The lock serializes every store operation across threads and processes.
//! It is acquired with exponential backoff and released when the guard is
//! dropped, on every exit path. The lock file itself is never removed: removing
//! it would let a waiter lock an unlinked inode while a newcomer locks a fresh
//! one.

use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

use fs2::FileExt;

use crate::error::{Error, Result};

const INITIAL_BACKOFF: Duration = Duration::from_millis(10);
const MAX_BACKOFF: Duration = Duration::from_millis(200);

/// A held exclusive lock; released on drop.
#[derive(Debug)]
pub struct FileLock {
    file: File,
    path: PathBuf,
}

impl FileLock {
    /// Acquire the lock at `path`, waiting at most `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LockTimeout`] if the lock is still held elsewhere
    /// when the timeout expires, or an I/O error if the lock file cannot be
    /// opened.
    pub fn acquire(path: &Path, timeout: Duration) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(path)?;

        let start = Instant::now();
        let mut backoff = INITIAL_BACKOFF;

        loop {
            match file.try_lock_exclusive() {
                Ok(()) => {
                    log::debug!(
                        "acquired {} after {:.3}s",
                        path.display(),
                        start.elapsed().as_secs_f64()
                    );
                    return Ok(Self {
                        file,
                        path: path.to_path_buf(),
                    });
                }
                Err(e) if Self::is_contended(&e) => {}
                Err(e) => return Err(e.into()),
            }

            let elapsed = start.elapsed();
            if elapsed >= timeout {
                return Err(Error::LockTimeout {
                    path: path.to_path_buf(),
                    seconds: elapsed.as_secs_f64(),
                });
            }

            thread::sleep(backoff.min(timeout - elapsed));
            backoff = (backoff * 2).min(MAX_BACKOFF);
        }
    }

    /// Acquire the lock, creating the parent directory first if needed.
    ///
    /// # Errors
    ///
    /// See [`FileLock::acquire`].
    pub fn acquire_creating_dir(path: &Path, timeout: Duration) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        Self::acquire(path, timeout)
    }

    /// Path of the lock file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn is_contended(err: &std::io::Error) -> bool {
        err.raw_os_error() == fs2::lock_contended_error().raw_os_error()
            || err.kind() == std::io::ErrorKind::WouldBlock
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        if let Err(e) = FileExt::unlock(&self.file) {
            log::warn!("failed to release {}: {e}", self.path.display());
        }
    }
}

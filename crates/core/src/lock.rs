//! Per-document exclusive locks
//!
//! The writer's load → consolidate → save cycle runs under an `flock` on
//! `<dir>/.lock;<name>`. The lock is released when the guard is dropped.

use crate::error::VersionError;
use crate::store::sibling_path;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// Prefix of the lock file
pub const LOCK_PREFIX: &str = ".lock;";

/// Guard holding the exclusive lock for one document
#[derive(Debug)]
pub struct DocumentLock {
    path: PathBuf,
    #[allow(dead_code)]
    file: File,
}

/// Lock file content
#[derive(Debug, Serialize, Deserialize)]
pub struct LockHolder {
    pub pid: u32,
    pub acquired_at: u64,
}

impl DocumentLock {
    /// Block until the lock for `doc` is held
    pub fn acquire(doc: &Path) -> Result<Self, VersionError> {
        let path = lock_path(doc);
        let mut file = open_lock_file(&path)?;
        flock_exclusive(&file).map_err(|e| VersionError::storage(&path, e))?;
        write_holder(&mut file).map_err(|e| VersionError::storage(&path, e))?;
        tracing::trace!(path = %path.display(), "document lock acquired");
        Ok(Self { path, file })
    }

    /// Take the lock if it is free, `None` if another holder has it
    pub fn try_acquire(doc: &Path) -> Result<Option<Self>, VersionError> {
        let path = lock_path(doc);
        let mut file = open_lock_file(&path)?;
        if !try_flock_exclusive(&file).map_err(|e| VersionError::storage(&path, e))? {
            if let Ok(holder) = read_holder(&mut file) {
                tracing::debug!(pid = holder.pid, path = %path.display(), "document lock busy");
            }
            return Ok(None);
        }
        write_holder(&mut file).map_err(|e| VersionError::storage(&path, e))?;
        Ok(Some(Self { path, file }))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Path of the lock file for `doc`
pub fn lock_path(doc: &Path) -> PathBuf {
    sibling_path(doc, LOCK_PREFIX)
}

fn open_lock_file(path: &Path) -> Result<File, VersionError> {
    OpenOptions::new()
        .create(true)
        .read(true)
        .write(true)
        .truncate(false)
        .open(path)
        .map_err(|e| VersionError::storage(path, e))
}

/// Record the holder's PID (diagnostics only)
fn write_holder(file: &mut File) -> std::io::Result<()> {
    let holder = LockHolder {
        pid: std::process::id(),
        acquired_at: current_timestamp_ms(),
    };
    let serialized = serde_json::to_string(&holder)?;
    file.set_len(0)?;
    file.seek(SeekFrom::Start(0))?;
    file.write_all(serialized.as_bytes())?;
    Ok(())
}

fn read_holder(file: &mut File) -> std::io::Result<LockHolder> {
    file.seek(SeekFrom::Start(0))?;
    let mut contents = String::new();
    file.read_to_string(&mut contents)?;
    Ok(serde_json::from_str(&contents)?)
}

#[cfg(unix)]
fn flock_exclusive(file: &File) -> std::io::Result<()> {
    use nix::fcntl::{flock, FlockArg};
    use std::os::unix::io::AsRawFd;

    loop {
        match flock(file.as_raw_fd(), FlockArg::LockExclusive) {
            Ok(()) => return Ok(()),
            Err(nix::errno::Errno::EINTR) => continue,
            Err(e) => return Err(e.into()),
        }
    }
}

#[cfg(unix)]
fn try_flock_exclusive(file: &File) -> std::io::Result<bool> {
    use nix::fcntl::{flock, FlockArg};
    use std::os::unix::io::AsRawFd;

    match flock(file.as_raw_fd(), FlockArg::LockExclusiveNonblock) {
        Ok(()) => Ok(true),
        Err(nix::errno::Errno::EWOULDBLOCK) => Ok(false),
        Err(e) => Err(e.into()),
    }
}

// Other platforms run without cross-process exclusion
#[cfg(not(unix))]
fn flock_exclusive(_file: &File) -> std::io::Result<()> {
    Ok(())
}

#[cfg(not(unix))]
fn try_flock_exclusive(_file: &File) -> std::io::Result<bool> {
    Ok(true)
}

fn current_timestamp_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

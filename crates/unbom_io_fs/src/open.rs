//! Exclusive read-write file opening with classified failures.

use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use fs2::FileExt;
use thiserror::Error;
use tracing::debug;

use crate::spec::EnumFileOpResult;

/// Why a file could not be opened for processing.
#[derive(Debug, Error)]
pub enum OpenStreamError {
    #[error("Invalid path: {}", .0.display())]
    InvalidPath(PathBuf),
    #[error("Access denied: {}", .0.display())]
    AccessDenied(PathBuf),
    #[error("Directory not found: {}", .0.display())]
    DirectoryNotFound(PathBuf),
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),
    #[error("File is locked by another process: {}", .0.display())]
    Locked(PathBuf),
    #[error("Failed to open {} ({source})", .path.display())]
    Io {
        /// File that failed to open.
        path: PathBuf,
        /// Underlying IO error.
        source: io::Error,
    },
}

/// Open an existing file for read-write and hold an exclusive lock on it.
///
/// The lock is advisory and released when the handle drops.
pub fn open_stream(path: &Path) -> EnumFileOpResult<File> {
    match try_open_exclusive(path) {
        Ok(file) => EnumFileOpResult::Continue(file),
        Err(e) => EnumFileOpResult::Failed(e.to_string()),
    }
}

pub(crate) fn try_open_exclusive(path: &Path) -> Result<File, OpenStreamError> {
    if !_is_well_formed(path) {
        return Err(OpenStreamError::InvalidPath(path.to_path_buf()));
    }

    let file = OpenOptions::new()
        .read(true)
        .write(true)
        .open(path)
        .map_err(|e| classify_open_error(path, e))?;

    match FileExt::try_lock_exclusive(&file) {
        Ok(()) => Ok(file),
        Err(e) if e.raw_os_error() == fs2::lock_contended_error().raw_os_error() => {
            Err(OpenStreamError::Locked(path.to_path_buf()))
        }
        Err(e) => {
            // Some filesystems do not implement locking at all.
            debug!(path = %path.display(), "lock unavailable, continuing unlocked ({e})");
            Ok(file)
        }
    }
}

fn _is_well_formed(path: &Path) -> bool {
    let raw = path.as_os_str();
    !raw.is_empty() && !raw.to_string_lossy().contains('\0')
}

pub(crate) fn classify_open_error(path: &Path, e: io::Error) -> OpenStreamError {
    match e.kind() {
        io::ErrorKind::PermissionDenied => OpenStreamError::AccessDenied(path.to_path_buf()),
        io::ErrorKind::NotFound => {
            let b_parent_exists = path
                .parent()
                .map(|p| p.as_os_str().is_empty() || p.is_dir())
                .unwrap_or(true);
            if b_parent_exists {
                OpenStreamError::FileNotFound(path.to_path_buf())
            } else {
                OpenStreamError::DirectoryNotFound(path.to_path_buf())
            }
        }
        _ => OpenStreamError::Io {
            path: path.to_path_buf(),
            source: e,
        },
    }
}

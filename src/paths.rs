//! Idempotent directory and file existence helpers.
//!
//! Every helper makes one best-effort attempt against the host file system and
//! reports the outcome as a typed error that maps onto a small status code
//! (see [`crate::error::StatusCode`]). Nothing here locks; two callers racing
//! on the same path may both observe it missing.

use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::Path;

use tracing::debug;

use crate::error::{CreateFileError, EnsureDirError, EnsureParentError};

/// Ensure a directory exists, creating it and any missing ancestors.
pub fn ensure_directory(path: &Path) -> Result<(), EnsureDirError> {
    if path.exists() {
        if path.is_dir() {
            return Ok(());
        }
        return Err(EnsureDirError::NotADirectory(path.to_owned()));
    }

    fs::create_dir_all(path).map_err(|source| EnsureDirError::CreateFailed {
        path: path.to_owned(),
        source,
    })?;
    debug!(path = %path.display(), "created directory");
    Ok(())
}

/// Ensure the directory that would contain `path` exists.
pub fn ensure_parent_directory(path: &Path) -> Result<(), EnsureParentError> {
    let parent = parent_of(path).ok_or_else(|| EnsureParentError::NoParent(path.to_owned()))?;
    ensure_directory(parent).map_err(|err| match err {
        EnsureDirError::NotADirectory(parent) => EnsureParentError::ParentNotADirectory(parent),
        EnsureDirError::CreateFailed { path, source } => {
            EnsureParentError::CreateFailed { path, source }
        }
    })
}

/// Create an empty file at `path` unless something already exists there.
///
/// Missing parent directories are created first. A bare relative name has no
/// parent component and is created in the working directory.
pub fn create_file_if_absent(path: &Path) -> Result<(), CreateFileError> {
    if path.exists() {
        return Ok(());
    }
    prepare_parent(path)?;
    create_new(path).map(drop)
}

/// Like [`create_file_if_absent`], but runs `on_create` with the freshly created
/// file so the caller can seed its contents. The callback is skipped when the
/// file already exists.
pub fn create_file_if_absent_with<F>(path: &Path, on_create: F) -> Result<&Path, CreateFileError>
where
    F: FnOnce(&mut File) -> io::Result<()>,
{
    if path.exists() {
        return Ok(path);
    }
    prepare_parent(path)?;

    let mut file = create_new(path)?;
    on_create(&mut file).map_err(|source| CreateFileError::Initialize {
        path: path.to_owned(),
        source,
    })?;
    Ok(path)
}

/// Parent component of `path`, treating the empty parent of a bare name as absent.
pub(crate) fn parent_of(path: &Path) -> Option<&Path> {
    path.parent().filter(|parent| !parent.as_os_str().is_empty())
}

fn prepare_parent(path: &Path) -> Result<(), CreateFileError> {
    match ensure_parent_directory(path) {
        Ok(()) | Err(EnsureParentError::NoParent(_)) => Ok(()),
        Err(err) => Err(CreateFileError::ParentUnavailable(err)),
    }
}

fn create_new(path: &Path) -> Result<File, CreateFileError> {
    match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(file) => {
            debug!(path = %path.display(), "created file");
            Ok(file)
        }
        Err(err) if err.kind() == io::ErrorKind::AlreadyExists => {
            Err(CreateFileError::NotCreated(path.to_owned()))
        }
        Err(source) => Err(CreateFileError::Io {
            path: path.to_owned(),
            source,
        }),
    }
}

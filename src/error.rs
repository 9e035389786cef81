use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Status code reported for a successful operation.
pub const CODE_SUCCESS: i32 = 0;

/// Maps an error onto the small negative integer its operation documents.
pub trait StatusCode {
    fn code(&self) -> i32;
}

/// Collapse an operation result into its status code (`0` on success).
pub fn status<T, E: StatusCode>(result: &Result<T, E>) -> i32 {
    match result {
        Ok(_) => CODE_SUCCESS,
        Err(err) => err.code(),
    }
}

#[derive(Debug, Error)]
pub enum EnsureDirError {
    #[error("{0} exists but is not a directory")]
    NotADirectory(PathBuf),
    #[error("creating directory {path}")]
    CreateFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl StatusCode for EnsureDirError {
    fn code(&self) -> i32 {
        match self {
            EnsureDirError::NotADirectory(_) => -1,
            EnsureDirError::CreateFailed { .. } => -2,
        }
    }
}

#[derive(Debug, Error)]
pub enum EnsureParentError {
    #[error("{0} has no parent directory")]
    NoParent(PathBuf),
    #[error("creating parent directory {path}")]
    CreateFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("parent {0} exists but is not a directory")]
    ParentNotADirectory(PathBuf),
}

impl StatusCode for EnsureParentError {
    fn code(&self) -> i32 {
        match self {
            EnsureParentError::NoParent(_) => -1,
            EnsureParentError::CreateFailed { .. } => -2,
            EnsureParentError::ParentNotADirectory(_) => -3,
        }
    }
}

#[derive(Debug, Error)]
pub enum CreateFileError {
    /// The path was claimed by someone else between the existence check and creation.
    #[error("{0} could not be created")]
    NotCreated(PathBuf),
    #[error("creating file {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("preparing parent directory")]
    ParentUnavailable(#[from] EnsureParentError),
    #[error("initializing new file {path}")]
    Initialize {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl StatusCode for CreateFileError {
    fn code(&self) -> i32 {
        match self {
            CreateFileError::NotCreated(_) => -1,
            CreateFileError::Io { .. } => -2,
            CreateFileError::ParentUnavailable(_) => -3,
            CreateFileError::Initialize { .. } => -4,
        }
    }
}

/// Failure of a stream copy. `copied` counts bytes already written to the output.
#[derive(Debug, Error)]
pub enum CopyError {
    #[error("input ended after {copied} of {expected} bytes")]
    ShortRead { copied: u64, expected: u64 },
    #[error("reading input after {copied} bytes")]
    Read {
        copied: u64,
        #[source]
        source: io::Error,
    },
    #[error("writing output after {copied} bytes")]
    Write {
        copied: u64,
        #[source]
        source: io::Error,
    },
    #[error("buffer size must be greater than zero")]
    InvalidBufferSize,
}

impl CopyError {
    pub fn copied(&self) -> u64 {
        match self {
            CopyError::ShortRead { copied, .. }
            | CopyError::Read { copied, .. }
            | CopyError::Write { copied, .. } => *copied,
            CopyError::InvalidBufferSize => 0,
        }
    }
}

impl StatusCode for CopyError {
    fn code(&self) -> i32 {
        match self {
            CopyError::ShortRead { .. } => -1,
            CopyError::Read { .. } => -2,
            CopyError::Write { .. } => -3,
            CopyError::InvalidBufferSize => -4,
        }
    }
}

#[derive(Debug, Error)]
pub enum OpsError {
    #[error("{0} does not exist")]
    SourceMissing(PathBuf),
    #[error("{0} already exists")]
    DestinationExists(PathBuf),
    #[error("preparing destination")]
    Parent(#[from] EnsureParentError),
    #[error("{path}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{0} is not a regular file")]
    NotAFile(PathBuf),
    #[error("copying {path}")]
    Copy {
        path: PathBuf,
        #[source]
        source: CopyError,
    },
    #[error("{dst} is inside {src}")]
    DestinationInsideSource { src: PathBuf, dst: PathBuf },
}

impl OpsError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        OpsError::Io {
            path: path.into(),
            source,
        }
    }
}

impl StatusCode for OpsError {
    fn code(&self) -> i32 {
        match self {
            OpsError::SourceMissing(_) => -1,
            OpsError::DestinationExists(_) => -2,
            OpsError::Parent(_) => -3,
            OpsError::Io { .. } => -4,
            OpsError::NotAFile(_) => -5,
            OpsError::Copy { .. } => -6,
            OpsError::DestinationInsideSource { .. } => -7,
        }
    }
}

impl From<EnsureDirError> for OpsError {
    fn from(err: EnsureDirError) -> Self {
        match err {
            EnsureDirError::NotADirectory(path) => OpsError::DestinationExists(path),
            EnsureDirError::CreateFailed { path, source } => OpsError::Io { path, source },
        }
    }
}

//! File-system convenience helpers.
//!
//! - [`paths`]: ensure a directory or parent directory exists, create a file
//!   only when absent.
//! - [`copy`]: copy an exact byte count between streams through a fixed buffer.
//! - [`ops`]: delete, copy, and move whole trees; read and write text.
//!
//! Helpers in [`paths`] report outcomes as typed errors that also map onto
//! small negative status codes through [`StatusCode`].

pub mod cli;
pub mod config;
pub mod copy;
pub mod error;
pub mod logging;
pub mod ops;
pub mod paths;
pub mod runner;

pub use copy::{DEFAULT_BUFFER_SIZE, copy_exact, copy_stream};
pub use error::{
    CODE_SUCCESS, CopyError, CreateFileError, EnsureDirError, EnsureParentError, OpsError,
    StatusCode, status,
};
pub use ops::ExistPolicy;
pub use paths::{
    create_file_if_absent, create_file_if_absent_with, ensure_directory, ensure_parent_directory,
};

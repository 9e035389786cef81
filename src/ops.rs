//! Whole-file and whole-tree operations built on [`crate::paths`] and [`crate::copy`].

use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::copy::copy_stream;
use crate::error::{EnsureParentError, OpsError};
use crate::paths::{ensure_directory, ensure_parent_directory, parent_of};

/// Characters that must not appear in a portable file name.
pub const INVALID_FILE_NAME_CHARS: &[char] = &[
    // windows
    '"', '*', '<', '>', '?', '|',
    // unix
    '\0', ':',
];

/// What a writing operation does when its destination already exists.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ExistPolicy {
    /// Remove the existing destination and write a fresh one.
    #[default]
    Overwrite,
    /// Leave the destination untouched and report success.
    Skip,
    /// Refuse with [`OpsError::DestinationExists`].
    Fail,
}

impl ExistPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExistPolicy::Overwrite => "overwrite",
            ExistPolicy::Skip => "skip",
            ExistPolicy::Fail => "fail",
        }
    }
}

/// Delete a file, symlink, or directory tree. A missing path counts as deleted.
pub fn delete(path: &Path) -> Result<(), OpsError> {
    let metadata = match fs::symlink_metadata(path) {
        Ok(metadata) => metadata,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(source) => return Err(OpsError::io(path, source)),
    };

    let removed = if metadata.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    };
    removed.map_err(|source| OpsError::io(path, source))?;
    debug!(path = %path.display(), "deleted");
    Ok(())
}

/// Copy a file or a directory tree from `src` to `dst`.
///
/// `policy` is applied to every file that already exists under `dst`.
/// Directories are merged rather than replaced. Copying a path onto itself
/// is a no-op; copying a directory into one of its own descendants is
/// rejected with [`OpsError::DestinationInsideSource`].
pub fn copy_path(src: &Path, dst: &Path, policy: ExistPolicy) -> Result<(), OpsError> {
    let metadata = fs::metadata(src).map_err(|err| missing_or_io(src, err))?;
    let src_real = fs::canonicalize(src).map_err(|source| OpsError::io(src, source))?;
    let dst_real = resolve_entry(dst).map_err(|source| OpsError::io(dst, source))?;

    if src_real == dst_real {
        debug!(path = %src.display(), "source and destination are the same; nothing to copy");
        return Ok(());
    }
    if metadata.is_dir() && dst_real.starts_with(&src_real) {
        return Err(OpsError::DestinationInsideSource {
            src: src.to_owned(),
            dst: dst.to_owned(),
        });
    }
    copy_tree(src, dst, policy)
}

/// Move `src` to `dst`, falling back to copy-then-delete when a rename is
/// not possible (for example across file systems).
///
/// Moving a path onto itself is a no-op. A directory cannot be moved into
/// one of its own descendants.
pub fn move_path(src: &Path, dst: &Path, policy: ExistPolicy) -> Result<(), OpsError> {
    let metadata = fs::symlink_metadata(src).map_err(|err| missing_or_io(src, err))?;
    let src_real = resolve_entry(src).map_err(|source| OpsError::io(src, source))?;
    let dst_real = resolve_entry(dst).map_err(|source| OpsError::io(dst, source))?;

    if src_real == dst_real {
        debug!(path = %src.display(), "source and destination are the same; nothing to move");
        return Ok(());
    }
    if metadata.is_dir() && dst_real.starts_with(&src_real) {
        return Err(OpsError::DestinationInsideSource {
            src: src.to_owned(),
            dst: dst.to_owned(),
        });
    }
    if !clear_destination(dst, policy)? {
        return Ok(());
    }
    prepare_parent(dst)?;

    match fs::rename(src, dst) {
        Ok(()) => {
            debug!(from = %src.display(), to = %dst.display(), "renamed");
            Ok(())
        }
        Err(err) => {
            warn!(
                from = %src.display(),
                to = %dst.display(),
                error = %err,
                "rename failed; copying then deleting"
            );
            relocate_by_copy(src, dst)
        }
    }
}

/// Read a regular file as UTF-8 text.
pub fn read_text(path: &Path) -> Result<String, OpsError> {
    if !path.is_file() {
        return Err(OpsError::NotAFile(path.to_owned()));
    }
    fs::read_to_string(path).map_err(|source| OpsError::io(path, source))
}

/// Read the remainder of a stream as UTF-8 text.
pub fn read_text_from<R: Read + ?Sized>(reader: &mut R) -> io::Result<String> {
    let mut text = String::new();
    reader.read_to_string(&mut text)?;
    Ok(text)
}

/// Write `text` to `path`, creating missing parent directories.
pub fn write_text(path: &Path, text: &str, policy: ExistPolicy) -> Result<(), OpsError> {
    prepare_parent(path)?;
    if !clear_destination(path, policy)? {
        return Ok(());
    }
    fs::write(path, text).map_err(|source| OpsError::io(path, source))?;
    debug!(path = %path.display(), bytes = text.len(), "wrote text");
    Ok(())
}

/// Whether `name` is free of every character in [`INVALID_FILE_NAME_CHARS`].
pub fn is_file_name_valid(name: &str) -> bool {
    !name.contains(INVALID_FILE_NAME_CHARS)
}

/// Copy without the overlap checks done once by [`copy_path`].
fn copy_tree(src: &Path, dst: &Path, policy: ExistPolicy) -> Result<(), OpsError> {
    let metadata = fs::metadata(src).map_err(|err| missing_or_io(src, err))?;
    if metadata.is_dir() {
        copy_dir(src, dst, policy)
    } else {
        copy_file(src, dst, policy)
    }
}

fn relocate_by_copy(src: &Path, dst: &Path) -> Result<(), OpsError> {
    copy_tree(src, dst, ExistPolicy::Overwrite)?;
    delete(src)
}

fn copy_file(src: &Path, dst: &Path, policy: ExistPolicy) -> Result<(), OpsError> {
    if !clear_destination(dst, policy)? {
        return Ok(());
    }
    prepare_parent(dst)?;

    let mut input = File::open(src).map_err(|source| OpsError::io(src, source))?;
    let mut output = File::create(dst).map_err(|source| OpsError::io(dst, source))?;
    let copied = copy_stream(&mut input, &mut output).map_err(|source| OpsError::Copy {
        path: src.to_owned(),
        source,
    })?;
    debug!(from = %src.display(), to = %dst.display(), copied, "copied file");
    Ok(())
}

fn copy_dir(src: &Path, dst: &Path, policy: ExistPolicy) -> Result<(), OpsError> {
    if dst.exists() && !dst.is_dir() && !clear_destination(dst, policy)? {
        return Ok(());
    }
    ensure_directory(dst)?;

    let mut entries = fs::read_dir(src)
        .and_then(|entries| entries.collect::<io::Result<Vec<_>>>())
        .map_err(|source| OpsError::io(src, source))?;
    entries.sort_by_key(|entry| entry.file_name());

    for entry in entries {
        copy_tree(&entry.path(), &dst.join(entry.file_name()), policy)?;
    }
    Ok(())
}

/// Apply `policy` to an existing `dst`. Returns whether the caller should go on writing.
fn clear_destination(dst: &Path, policy: ExistPolicy) -> Result<bool, OpsError> {
    if fs::symlink_metadata(dst).is_err() {
        return Ok(true);
    }
    match policy {
        ExistPolicy::Overwrite => {
            delete(dst)?;
            Ok(true)
        }
        ExistPolicy::Skip => {
            debug!(path = %dst.display(), "destination exists; skipping");
            Ok(false)
        }
        ExistPolicy::Fail => Err(OpsError::DestinationExists(dst.to_owned())),
    }
}

/// A bare relative name lives in the working directory and needs no parent.
fn prepare_parent(path: &Path) -> Result<(), OpsError> {
    match ensure_parent_directory(path) {
        Ok(()) | Err(EnsureParentError::NoParent(_)) => Ok(()),
        Err(err) => Err(err.into()),
    }
}

/// Absolute form of `path` with its parent resolved. The final component is
/// kept as named, so it may be missing or a symlink. Missing ancestors are
/// appended unresolved.
fn resolve_entry(path: &Path) -> io::Result<PathBuf> {
    let Some(name) = path.file_name() else {
        return fs::canonicalize(path);
    };
    let parent = parent_of(path).unwrap_or(Path::new("."));
    let parent = match fs::canonicalize(parent) {
        Ok(parent) => parent,
        Err(err)
            if matches!(
                err.kind(),
                io::ErrorKind::NotFound | io::ErrorKind::NotADirectory
            ) =>
        {
            resolve_entry(parent)?
        }
        Err(err) => return Err(err),
    };
    Ok(parent.join(name))
}

fn missing_or_io(path: &Path, err: io::Error) -> OpsError {
    if err.kind() == io::ErrorKind::NotFound {
        OpsError::SourceMissing(path.to_owned())
    } else {
        OpsError::io(path, err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn rejects_each_forbidden_character() {
        for ch in INVALID_FILE_NAME_CHARS {
            let name = format!("report{ch}2024.txt");
            assert!(!is_file_name_valid(&name), "{name:?} should be invalid");
        }
        assert!(is_file_name_valid("report-2024.txt"));
    }

    #[test]
    fn reads_text_from_stream() {
        let mut reader = Cursor::new("line one\nline two");
        assert_eq!(read_text_from(&mut reader).unwrap(), "line one\nline two");
    }

    #[test]
    fn read_text_rejects_directory() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            read_text(dir.path()),
            Err(OpsError::NotAFile(_))
        ));
    }

    #[test]
    fn relocate_by_copy_moves_tree() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("tree");
        fs::create_dir_all(src.join("inner")).unwrap();
        fs::write(src.join("inner/a.txt"), "a").unwrap();
        let dst = dir.path().join("elsewhere/tree");

        relocate_by_copy(&src, &dst).unwrap();

        assert!(!src.exists());
        assert_eq!(fs::read_to_string(dst.join("inner/a.txt")).unwrap(), "a");
    }

    #[test]
    fn relocate_by_copy_keeps_source_when_copy_fails() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("from.txt");
        let blocker = dir.path().join("blocker");
        fs::write(&src, "payload").unwrap();
        fs::write(&blocker, "x").unwrap();

        let err = relocate_by_copy(&src, &blocker.join("to.txt")).unwrap_err();

        assert!(matches!(err, OpsError::Parent(_)));
        assert_eq!(fs::read_to_string(&src).unwrap(), "payload");
    }

    #[test]
    fn resolve_entry_keeps_missing_tail() {
        let dir = tempfile::tempdir().unwrap();
        let root = fs::canonicalize(dir.path()).unwrap();

        let resolved = resolve_entry(&dir.path().join("missing/deeper/leaf")).unwrap();
        assert_eq!(resolved, root.join("missing/deeper/leaf"));
    }

    #[test]
    fn policy_names_match_config_spelling() {
        for policy in [ExistPolicy::Overwrite, ExistPolicy::Skip, ExistPolicy::Fail] {
            let parsed: ExistPolicy =
                toml::Value::String(policy.as_str().to_owned()).try_into().unwrap();
            assert_eq!(parsed, policy);
        }
    }
}

use std::cmp::Ordering;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, SecondsFormat};
use ignore::WalkBuilder;

use crate::ReaderError;

pub const DEFAULT_FILE_EXTENSION: &str = "md";

/// Case-insensitive extension check; `extensions` are given without the dot.
#[must_use]
pub fn has_extension<S: AsRef<str>>(path: &Path, extensions: &[S]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| {
            extensions
                .iter()
                .any(|allowed| allowed.as_ref().eq_ignore_ascii_case(ext))
        })
}

/// Ensures `path` is an existing regular file with an accepted extension.
///
/// # Errors
///
/// Returns [`ReaderError::NotFound`] or [`ReaderError::WrongExtension`].
pub fn check_file<S: AsRef<str>>(path: &Path, extensions: &[S]) -> Result<(), ReaderError> {
    if !path.is_file() {
        return Err(ReaderError::NotFound(path.to_path_buf()));
    }
    if !has_extension(path, extensions) {
        return Err(ReaderError::WrongExtension(path.to_path_buf()));
    }
    Ok(())
}

/// Lists files under `dir` whose extension is accepted.
///
/// Without `walk` only the direct children of `dir` are listed. With `walk`
/// the tree is visited top-down: each directory's files come before its
/// subdirectories, and names are sorted within a directory. Symlinked files
/// are listed; symlinked directories are not entered.
///
/// # Errors
///
/// Returns [`ReaderError::NotADirectory`] if `dir` is not a directory, or
/// [`ReaderError::Walk`] if an entry cannot be read.
pub fn list_files<S: AsRef<str>>(
    dir: &Path,
    extensions: &[S],
    walk: bool,
) -> Result<Vec<PathBuf>, ReaderError> {
    if !dir.is_dir() {
        return Err(ReaderError::NotADirectory(dir.to_path_buf()));
    }

    let walker = WalkBuilder::new(dir)
        .standard_filters(false)
        .follow_links(false)
        .max_depth(if walk { None } else { Some(1) })
        .sort_by_file_path(files_first)
        .build();

    let mut files = Vec::new();
    for entry in walker {
        let entry = entry?;
        if entry.path().is_file() && has_extension(entry.path(), extensions) {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

fn files_first(a: &Path, b: &Path) -> Ordering {
    a.is_dir().cmp(&b.is_dir()).then_with(|| a.cmp(b))
}

/// Modification time of `path` as an RFC 3339 timestamp in the local zone.
///
/// # Errors
///
/// Returns an IO error if the metadata cannot be read.
pub fn last_update(path: &Path) -> std::io::Result<String> {
    let modified = std::fs::metadata(path)?.modified()?;
    let local: DateTime<Local> = modified.into();
    Ok(local.to_rfc3339_opts(SecondsFormat::Micros, false))
}

// ABOUTME: Filesystem handlers behind ls, rm, and tree.
// ABOUTME: Thin wrappers over std::fs with optional name ordering and a recursive tree printer.

use std::fs::{self, DirEntry};
use std::io::{self, Write};
use std::path::Path;

/// Marker printed before every tree entry.
pub const TREE_BRANCH: &str = "|-- ";
/// Indentation added per nesting level.
pub const TREE_INDENT: &str = "|   ";

/// Result of an `rm` attempt on a path that could be inspected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Removal {
    Removed,
    NotFound,
}

fn read_entries(dir: &Path, sorted: bool) -> io::Result<Vec<DirEntry>> {
    let mut entries = fs::read_dir(dir)?.collect::<io::Result<Vec<_>>>()?;
    if sorted {
        entries.sort_by_key(|e| e.file_name());
    }
    Ok(entries)
}

/// Names of the immediate children of `dir`.
pub fn list_dir(dir: &Path, sorted: bool) -> io::Result<Vec<String>> {
    Ok(read_entries(dir, sorted)?
        .iter()
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect())
}

/// Remove a file, symlink, or whole directory tree.
///
/// Existence is checked without following a trailing symlink, so a dangling
/// link is still removable and a link to a directory removes only the link.
pub fn remove_path(path: &Path) -> io::Result<Removal> {
    let meta = match fs::symlink_metadata(path) {
        Ok(meta) => meta,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Removal::NotFound),
        Err(e) => return Err(e),
    };
    if meta.is_dir() {
        fs::remove_dir_all(path)?;
    } else {
        fs::remove_file(path)?;
    }
    Ok(Removal::Removed)
}

/// Print `dir` recursively, depth first.
///
/// Unreadable directories are reported on `err` and skipped; only failures
/// writing to `out` or `err` are returned.
pub fn write_tree(
    dir: &Path,
    sorted: bool,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> io::Result<()> {
    write_tree_level(dir, "", sorted, out, err)
}

fn write_tree_level(
    dir: &Path,
    prefix: &str,
    sorted: bool,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> io::Result<()> {
    let entries = match read_entries(dir, sorted) {
        Ok(entries) => entries,
        Err(e) => {
            writeln!(err, "tree: {}: {}", dir.display(), e)?;
            return Ok(());
        }
    };
    for entry in entries {
        writeln!(
            out,
            "{prefix}{TREE_BRANCH}{}",
            entry.file_name().to_string_lossy()
        )?;
        // file_type() does not follow symlinks, so linked directories stay leaves.
        if entry.file_type().is_ok_and(|t| t.is_dir()) {
            let nested = format!("{prefix}{TREE_INDENT}");
            write_tree_level(&entry.path(), &nested, sorted, out, err)?;
        }
    }
    Ok(())
}

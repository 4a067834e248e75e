//! Small filesystem helpers shared by the strategies

use super::error::{IoContext, Result};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

/// True if something (including a dangling symlink) exists at `path`.
pub(crate) fn entry_exists(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}

/// Copy a file, symlink or directory tree to `dest`.
///
/// Symlinks are recreated with the same target rather than followed.
pub(crate) fn copy_entry(src: &Path, dest: &Path) -> Result<()> {
    let meta = fs::symlink_metadata(src).io_context("Failed to inspect", src)?;
    let file_type = meta.file_type();

    if file_type.is_symlink() {
        copy_symlink(src, dest)
    } else if file_type.is_dir() {
        fs::create_dir(dest).io_context("Failed to create directory", dest)?;
        let mut names = Vec::new();
        for entry in fs::read_dir(src).io_context("Failed to read directory", src)? {
            names.push(entry.io_context("Failed to read directory", src)?.file_name());
        }
        names.sort();
        for name in names {
            copy_entry(&src.join(&name), &dest.join(&name))?;
        }
        fs::set_permissions(dest, meta.permissions()).io_context("Failed to set permissions", dest)
    } else {
        fs::copy(src, dest).io_context("Failed to copy", src)?;
        Ok(())
    }
}

/// Recreate the symlink at `src` as `dest`, pointing at the same raw target.
pub(crate) fn copy_symlink(src: &Path, dest: &Path) -> Result<()> {
    let target = fs::read_link(src).io_context("Failed to read link", src)?;
    std::os::unix::fs::symlink(&target, dest).io_context("Failed to create link", dest)
}

/// Remove a file or symlink, ignoring a missing one. Directories are left alone.
pub(crate) fn remove_file_if_present(path: &Path) -> Result<()> {
    match fs::symlink_metadata(path) {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => fs::remove_file(path).io_context("Failed to remove", path),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e).io_context("Failed to inspect", path),
    }
}

/// Remove a whole tree if it exists.
pub(crate) fn remove_tree_if_present(path: &Path) -> Result<()> {
    match fs::symlink_metadata(path) {
        Ok(meta) if meta.is_dir() => fs::remove_dir_all(path).io_context("Failed to remove", path),
        Ok(_) => fs::remove_file(path).io_context("Failed to remove", path),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e).io_context("Failed to inspect", path),
    }
}

/// Create an empty marker file.
pub(crate) fn touch(path: &Path) -> Result<()> {
    fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .io_context("Failed to create", path)?;
    Ok(())
}

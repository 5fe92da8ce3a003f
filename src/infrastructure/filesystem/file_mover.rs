use std::fs;
use std::io;
use std::path::Path;
use walkdir::WalkDir;

use crate::common::error::TidyError;
use crate::common::result::{ResultExt, TidyResult};

/// Whether anything (file, directory or dangling symlink) exists at `path`
pub fn path_exists(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}

/// Move a file or directory tree to `destination`.
///
/// Missing parent directories of `destination` are created. The move is a rename where the
/// filesystem allows it and a copy followed by removal of the source otherwise. An existing
/// destination is never overwritten. On success the source no longer exists.
pub fn relocate(source: &Path, destination: &Path) -> TidyResult<()> {
    if !path_exists(source) {
        return Err(TidyError::path_not_found(source));
    }
    if path_exists(destination) {
        return Err(TidyError::filesystem_error(
            format!("Destination already exists: {}", destination.display()),
            Some(destination.to_path_buf()),
        ));
    }

    if let Some(parent) = destination.parent() {
        fs::create_dir_all(parent).with_filesystem_error(
            "Failed to create destination directory",
            Some(parent.to_path_buf()),
        )?;
    }

    match fs::rename(source, destination) {
        Ok(()) => Ok(()),
        Err(rename_error) => {
            tracing::debug!(
                source = %source.display(),
                destination = %destination.display(),
                error = %rename_error,
                "rename failed, falling back to copy and delete"
            );
            copy_then_remove(source, destination)
        }
    }
}

fn copy_then_remove(source: &Path, destination: &Path) -> TidyResult<()> {
    copy_then_remove_with(source, destination, remove_any)
}

fn copy_then_remove_with<F>(source: &Path, destination: &Path, remove_source: F) -> TidyResult<()>
where
    F: FnOnce(&Path) -> io::Result<()>,
{
    if let Err(copy_error) = copy_recursive(source, destination) {
        // the source is untouched, so a partial copy can go
        let _ = remove_any(destination);
        return Err(TidyError::filesystem_error_with_source(
            format!(
                "Failed to copy {} to {}",
                source.display(),
                destination.display()
            ),
            Some(source.to_path_buf()),
            copy_error,
        ));
    }

    // Once removal has started the destination holds the only complete copy; keep it.
    if let Err(remove_error) = remove_source(source) {
        return Err(TidyError::filesystem_error_with_source(
            format!(
                "Copied {} to {} but failed to remove the source; the complete copy is kept at {}",
                source.display(),
                destination.display(),
                destination.display()
            ),
            Some(source.to_path_buf()),
            remove_error,
        ));
    }

    Ok(())
}

fn copy_recursive(source: &Path, destination: &Path) -> io::Result<()> {
    let metadata = fs::symlink_metadata(source)?;
    if !metadata.is_dir() {
        fs::copy(source, destination)?;
        return Ok(());
    }

    for entry in WalkDir::new(source) {
        let entry = entry.map_err(io::Error::from)?;
        let relative = entry
            .path()
            .strip_prefix(source)
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
        let target = destination.join(relative);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else {
            fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}

fn remove_any(path: &Path) -> io::Result<()> {
    let metadata = fs::symlink_metadata(path)?;
    if metadata.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    }
}

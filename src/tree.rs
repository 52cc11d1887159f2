//! Filesystem primitives for daily folders.
//!
//! Every operation here reports its outcome as a value. Missing paths,
//! permission problems and similar conditions never abort a maintenance pass:
//! they show up as `false`, an empty set, or an entry in a failure set.

use crate::date::is_daily_folder_name;

use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// List the immediate children of `root` that are daily folders.
///
/// Symlinks are not followed, so a link named like a date is ignored.
/// An unreadable root yields an empty set.
pub fn list_daily_folders(root: &Path) -> BTreeSet<PathBuf> {
    let entries = match fs::read_dir(root) {
        Ok(entries) => entries,
        Err(err) => {
            warn!("Failed to list {}: {}", root.display(), err);
            return BTreeSet::new();
        }
    };

    let mut folders = BTreeSet::new();
    for entry_result in entries {
        let entry = match entry_result {
            Ok(entry) => entry,
            Err(err) => {
                warn!("Error reading entry in {}: {}", root.display(), err);
                continue;
            }
        };

        let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
        if !is_dir {
            continue;
        }

        let name = entry.file_name();
        if name.to_str().is_some_and(is_daily_folder_name) {
            folders.insert(entry.path());
        }
    }

    folders
}

/// Check whether `path` is a directory without any children.
///
/// Non-directories, missing paths and unreadable directories are not empty.
pub fn is_empty(path: &Path) -> bool {
    match fs::symlink_metadata(path) {
        Ok(metadata) if metadata.is_dir() => {}
        _ => return false,
    }

    match fs::read_dir(path) {
        Ok(mut entries) => entries.next().is_none(),
        Err(err) => {
            debug!("Cannot read {}: {}", path.display(), err);
            false
        }
    }
}

/// Delete `path` and, for directories, everything below it.
///
/// Children are removed first, in sorted order. A failing child does not stop
/// its siblings from being attempted, but the directory itself is only removed
/// once all of its children are gone. Returns `true` only if `path` no longer
/// exists afterwards; a path that did not exist to begin with yields `false`.
pub fn delete_recursive(path: &Path) -> bool {
    delete_with(path, &remove_entry)
}

/// Remove a single file, link or empty directory
fn remove_entry(path: &Path, is_dir: bool) -> io::Result<()> {
    if is_dir {
        fs::remove_dir(path)
    } else {
        fs::remove_file(path)
    }
}

/// `delete_recursive` with the actual removal supplied by the caller
pub(crate) fn delete_with(path: &Path, remove: &dyn Fn(&Path, bool) -> io::Result<()>) -> bool {
    // Use symlink_metadata so links are removed, not followed
    let metadata = match fs::symlink_metadata(path) {
        Ok(meta) => meta,
        Err(_) => return false,
    };

    if !metadata.is_dir() {
        return finish_removal(path, remove(path, false));
    }

    let entries = match fs::read_dir(path) {
        Ok(entries) => entries,
        Err(err) => {
            warn!("Failed to read directory {}: {}", path.display(), err);
            return false;
        }
    };

    let mut all_removed = true;
    let mut children = Vec::new();
    for entry_result in entries {
        match entry_result {
            Ok(entry) => children.push(entry.path()),
            Err(err) => {
                warn!("Error reading entry in {}: {}", path.display(), err);
                all_removed = false;
            }
        }
    }
    children.sort();

    for child in &children {
        // no short-circuit: every child gets its attempt
        if !delete_with(child, remove) {
            all_removed = false;
        }
    }

    if !all_removed {
        warn!("Not deleted (content left behind): {}", path.display());
        return false;
    }

    finish_removal(path, remove(path, true))
}

/// Delete each path independently and return the ones that could not be removed
pub fn delete_many_recursive<'a, I>(paths: I) -> BTreeSet<PathBuf>
where
    I: IntoIterator<Item = &'a PathBuf>,
{
    paths
        .into_iter()
        .filter(|path| !delete_recursive(path))
        .cloned()
        .collect()
}

/// Create `root/today_name`, including missing intermediate directories.
///
/// Returns `true` if the folder exists afterwards, whether it was created now
/// or was already there.
pub fn create_today_folder(root: &Path, today_name: &str) -> bool {
    let today = root.join(today_name);
    if today.is_dir() {
        debug!("Already present: {}", today.display());
        return true;
    }

    match fs::create_dir_all(&today) {
        Ok(()) => {
            info!("Created: {}", today.display());
            true
        }
        Err(err) => {
            warn!("Unable to create {}: {}", today.display(), err);
            today.is_dir()
        }
    }
}

/// Sorted names of the immediate children of `path`, empty if it cannot be read
pub fn list_content_names(path: &Path) -> Vec<String> {
    let mut names: Vec<String> = match fs::read_dir(path) {
        Ok(entries) => entries
            .flatten()
            .map(|entry| entry.file_name().to_string_lossy().into_owned())
            .collect(),
        Err(_) => Vec::new(),
    };
    names.sort();
    names
}

/// Total size of the regular files below `path`.
///
/// Symlinks are skipped and unreadable entries count as zero.
pub fn folder_size(path: &Path) -> u64 {
    let mut total = 0u64;

    if let Ok(entries) = fs::read_dir(path) {
        for entry in entries.flatten() {
            let entry_path = entry.path();
            if let Ok(metadata) = fs::symlink_metadata(&entry_path) {
                if metadata.is_file() {
                    total += metadata.len();
                } else if metadata.is_dir() {
                    total += folder_size(&entry_path);
                }
            }
        }
    }

    total
}

fn finish_removal(path: &Path, result: io::Result<()>) -> bool {
    match result {
        Ok(()) => {
            info!("Deleted: {}", path.display());
            true
        }
        // Someone else removed it in the meantime
        Err(err) if err.kind() == io::ErrorKind::NotFound => true,
        Err(err) => {
            warn!("Unable to delete {}: {}", path.display(), err);
            false
        }
    }
}

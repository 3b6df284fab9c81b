//! Name-sorted directory traversal.
//!
//! Both walkers skip the root itself and visit its descendants in file-name
//! order, so every consumer sees the same sequence on every host. A missing
//! root is a no-op. The first callback error aborts the walk; whatever was
//! already visited stays visited.
//!
//! A `.git` directory directly below the root belongs to the user's
//! repository and is never visited.

use log::debug;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

use crate::constants::PRESERVED_ENTRY;
use crate::error::Result;

fn is_preserved(entry: &DirEntry) -> bool {
    entry.depth() == 1 && entry.file_name() == PRESERVED_ENTRY
}

/// Visits every directory before its children and every file in name order.
pub fn pre_order<P, D, F>(root: P, mut on_dir: D, mut on_file: F) -> Result<()>
where
    P: AsRef<Path>,
    D: FnMut(&Path) -> Result<()>,
    F: FnMut(&Path) -> Result<()>,
{
    let root = root.as_ref();
    if !root.exists() {
        debug!("Nothing to traverse at '{}'.", root.display());
        return Ok(());
    }

    let walker = WalkDir::new(root).min_depth(1).sort_by_file_name();
    for entry in walker.into_iter().filter_entry(|e| !is_preserved(e)) {
        let entry = entry?;
        if entry.file_type().is_dir() {
            on_dir(entry.path())?;
        } else {
            on_file(entry.path())?;
        }
    }
    Ok(())
}

/// Visits every directory after all of its descendants.
///
/// Removing entries from inside the callbacks is safe: a directory callback
/// only fires once its contents have been handled.
pub fn post_order<P, D, F>(root: P, mut on_dir: D, mut on_file: F) -> Result<()>
where
    P: AsRef<Path>,
    D: FnMut(&Path) -> Result<()>,
    F: FnMut(&Path) -> Result<()>,
{
    let root = root.as_ref();
    if !root.exists() {
        debug!("Nothing to traverse at '{}'.", root.display());
        return Ok(());
    }

    let walker = WalkDir::new(root).min_depth(1).contents_first(true).sort_by_file_name();
    for entry in walker.into_iter().filter_entry(|e| !is_preserved(e)) {
        let entry = entry?;
        if entry.file_type().is_dir() {
            on_dir(entry.path())?;
        } else {
            on_file(entry.path())?;
        }
    }
    Ok(())
}

/// Collects every file below `root` in pre-order.
pub fn list_files<P: AsRef<Path>>(root: P) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    pre_order(
        root,
        |_| Ok(()),
        |file| {
            files.push(file.to_path_buf());
            Ok(())
        },
    )?;
    Ok(files)
}

/// Removes everything below `root`, keeping `root` itself and its `.git`.
pub fn empty_dir<P: AsRef<Path>>(root: P) -> Result<()> {
    post_order(root, |dir| Ok(fs::remove_dir(dir)?), |file| Ok(fs::remove_file(file)?))
}

/// Removes the directories that deleting `removed` left empty, walking up
/// from each file's parent and stopping at the first non-empty directory or
/// at `root`. Directories that were already empty are not touched.
pub fn prune_empty_parents<P: AsRef<Path>>(root: P, removed: &[PathBuf]) -> Result<()> {
    let root = root.as_ref();
    for file in removed {
        let file = if file.is_absolute() { file.clone() } else { root.join(file) };
        let mut dir = file.parent();
        while let Some(current) = dir {
            if current == root || !current.starts_with(root) || !current.is_dir() {
                break;
            }
            if fs::read_dir(current)?.next().is_some() {
                break;
            }
            debug!("Removing empty directory '{}'.", current.display());
            fs::remove_dir(current)?;
            dir = current.parent();
        }
    }
    Ok(())
}

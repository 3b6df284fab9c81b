//! Template copying: reproduces a template layer under the destination root.
//!
//! Files are written verbatim. Data fragments are written too and queue a
//! [`Task`] for the callback stage. Writing a path that already exists in the
//! destination is a structural conflict, except for mergeable JSON files and
//! `.gitignore`, which combine with what is already there.

use globset::GlobSet;
use log::debug;
use std::fs;
use std::path::{Path, PathBuf};

use crate::callback::{fragment_key, Task, TaskQueue};
use crate::config::TemplateConfig;
use crate::constants::{CONFIG_FILES, IGNORE_FILE};
use crate::error::{Error, Result};
use crate::ignore::is_ignored;
use crate::manifest::{merge, read_manifest, sort_dependencies, write_manifest};
use crate::traverse::pre_order;

/// What happened to one template file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileAction {
    Copy,
    Merge,
    Append,
    /// Copied and queued for the callback stage.
    Defer,
}

/// Maps a template-relative path to its destination path.
///
/// A file name starting with `_` is written with a leading `.` instead, so
/// templates can ship dotfiles such as `_gitignore`.
pub fn resolve_target_path<P: AsRef<Path>>(relative: P, dest_root: &Path) -> PathBuf {
    let relative = relative.as_ref();
    let target = dest_root.join(relative);
    match relative.file_name().and_then(|n| n.to_str()) {
        Some(name) if name.len() > 1 && name.starts_with('_') => {
            target.with_file_name(format!(".{}", &name[1..]))
        }
        _ => target,
    }
}

fn is_template_metadata(relative: &Path) -> bool {
    relative.to_str().map(|p| p == IGNORE_FILE || CONFIG_FILES.contains(&p)).unwrap_or(false)
}

/// Copies template layers into a destination root, collecting callbacks.
pub struct Copier<'a> {
    config: &'a TemplateConfig,
    ignored: &'a GlobSet,
}

impl<'a> Copier<'a> {
    pub fn new(config: &'a TemplateConfig, ignored: &'a GlobSet) -> Self {
        Self { config, ignored }
    }

    fn is_mergeable(&self, dest_root: &Path, target: &Path) -> bool {
        target
            .strip_prefix(dest_root)
            .map(|relative| self.config.mergeable.iter().any(|m| m == relative))
            .unwrap_or(false)
    }

    /// Decides how a template file reaches `target` without touching disk.
    pub fn plan_file(&self, source: &Path, target: &Path, dest_root: &Path) -> Result<FileAction> {
        if target.exists() {
            if self.is_mergeable(dest_root, target) {
                return Ok(FileAction::Merge);
            }
            let from_gitignore = source.file_name().map(|n| n == "_gitignore").unwrap_or(false);
            if from_gitignore {
                return Ok(FileAction::Append);
            }
            return Err(Error::StructuralConflict { path: target.to_path_buf() });
        }
        if fragment_key(target, &self.config.data_suffixes).is_some() {
            return Ok(FileAction::Defer);
        }
        Ok(FileAction::Copy)
    }

    /// Copies `layer_root` into `dest_root` in pre-order and returns the
    /// destination paths written, in write order.
    ///
    /// # Errors
    /// * `Error::StructuralConflict` if a destination file already exists and
    ///   cannot be combined
    pub fn copy(&self, layer_root: &Path, dest_root: &Path, queue: &mut TaskQueue) -> Result<Vec<PathBuf>> {
        debug!("Copying layer '{}'.", layer_root.display());
        let mut written = Vec::new();

        let relative_of = |path: &Path| -> Result<PathBuf> {
            path.strip_prefix(layer_root)
                .map(Path::to_path_buf)
                .map_err(|e| Error::ConfigError(e.to_string()))
        };

        pre_order(
            layer_root,
            |dir| {
                let relative = relative_of(dir)?;
                if is_ignored(self.ignored, &relative) {
                    debug!("Skipping ignored directory '{}'.", relative.display());
                    return Ok(());
                }
                fs::create_dir_all(dest_root.join(&relative))?;
                Ok(())
            },
            |file| {
                let relative = relative_of(file)?;
                if is_template_metadata(&relative) || is_ignored(self.ignored, &relative) {
                    debug!("Skipping '{}'.", relative.display());
                    return Ok(());
                }
                let target = resolve_target_path(&relative, dest_root);
                let action = self.plan_file(file, &target, dest_root)?;
                self.commit(action, file, &target, queue)?;
                written.push(target);
                Ok(())
            },
        )?;

        Ok(written)
    }

    fn commit(&self, action: FileAction, source: &Path, target: &Path, queue: &mut TaskQueue) -> Result<()> {
        match action {
            FileAction::Copy => {
                debug!("Copying file: {}", target.display());
                fs::copy(source, target)?;
            }
            FileAction::Defer => {
                debug!("Copying data fragment: {}", target.display());
                fs::copy(source, target)?;
                if let Some(key) = fragment_key(target, &self.config.data_suffixes) {
                    queue.push(Task::fragment(target, key));
                }
            }
            FileAction::Merge => {
                debug!("Merging file: {}", target.display());
                let existing = read_manifest(target)?;
                let incoming = read_manifest(source)?;
                write_manifest(target, &sort_dependencies(&merge(&existing, &incoming)))?;
            }
            FileAction::Append => {
                debug!("Appending to: {}", target.display());
                let mut content = fs::read_to_string(target)?;
                if !content.is_empty() && !content.ends_with('\n') {
                    content.push('\n');
                }
                content.push_str(&fs::read_to_string(source)?);
                fs::write(target, content)?;
            }
        }
        Ok(())
    }
}

//! Second rendering pass over the materialized tree.
//!
//! Every file carrying the placeholder suffix is expanded against its render
//! context and replaced by a file of the same name without the suffix. All
//! placeholders are resolved before anything is written, so a single
//! rendering error leaves the tree exactly as the callback stage left it.

use globset::GlobSet;
use log::debug;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

use crate::callback::DataStore;
use crate::error::{Error, Result};
use crate::flags::FeatureFlags;
use crate::renderer::TemplateRenderer;
use crate::traverse::pre_order;

/// Builds the render context for one file. Later layers win on collisions:
/// environment, then the data-store fragment, then the feature flags.
pub fn render_context(environment: &Value, fragment: Option<&Value>, flags: &FeatureFlags) -> Value {
    let mut context = match environment {
        Value::Object(map) => map.clone(),
        _ => serde_json::Map::new(),
    };
    if let Some(Value::Object(fragment)) = fragment {
        for (key, value) in fragment {
            context.insert(key.clone(), value.clone());
        }
    }
    for (key, value) in flags.as_map() {
        context.insert(key.clone(), value.clone());
    }
    Value::Object(context)
}

/// Final content for one placeholder, not yet written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedFile {
    pub source: PathBuf,
    pub target: PathBuf,
    pub content: String,
}

pub struct RenderPass<'a> {
    engine: &'a dyn TemplateRenderer,
    suffix: &'a str,
    excluded: &'a GlobSet,
    environment: &'a Value,
    flags: &'a FeatureFlags,
    store: &'a DataStore,
}

impl<'a> RenderPass<'a> {
    pub fn new(
        engine: &'a dyn TemplateRenderer,
        suffix: &'a str,
        excluded: &'a GlobSet,
        environment: &'a Value,
        flags: &'a FeatureFlags,
        store: &'a DataStore,
    ) -> Self {
        Self { engine, suffix, excluded, environment, flags, store }
    }

    /// Destination path of a placeholder, or `None` for any other file.
    pub fn target_of(&self, path: &Path) -> Option<PathBuf> {
        let name = path.file_name()?.to_str()?;
        let stem = name.strip_suffix(self.suffix)?;
        if stem.is_empty() {
            return None;
        }
        Some(path.with_file_name(stem))
    }

    /// Placeholders below `root` in pre-order, skipping excluded areas.
    pub fn placeholders(&self, root: &Path) -> Result<Vec<PathBuf>> {
        let mut found = Vec::new();
        pre_order(
            root,
            |_| Ok(()),
            |file| {
                let excluded = file
                    .strip_prefix(root)
                    .map(|relative| self.excluded.is_match(relative))
                    .unwrap_or(false);
                if !excluded && self.target_of(file).is_some() {
                    found.push(file.to_path_buf());
                }
                Ok(())
            },
        )?;
        Ok(found)
    }

    /// Renders one placeholder without touching the tree.
    ///
    /// # Errors
    /// * `Error::RenderFailure` on a missing variable or malformed expression
    pub fn resolve(&self, source: &Path) -> Result<ResolvedFile> {
        let target = self.target_of(source).ok_or_else(|| {
            Error::ConfigError(format!("'{}' is not a placeholder", source.display()))
        })?;
        let template = fs::read_to_string(source)?;
        let context = render_context(self.environment, self.store.get(&target), self.flags);
        let content = self.engine.render(&template, &context).map_err(|e| match e {
            Error::MinijinjaError(source_err) => {
                Error::RenderFailure { path: source.to_path_buf(), source: source_err }
            }
            other => other,
        })?;
        Ok(ResolvedFile { source: source.to_path_buf(), target, content })
    }

    /// Writes the resolved content and removes the placeholder.
    pub fn commit(resolved: &ResolvedFile) -> Result<()> {
        if resolved.target.exists() {
            return Err(Error::StructuralConflict { path: resolved.target.clone() });
        }
        debug!("Rendering file: {}", resolved.target.display());
        fs::write(&resolved.target, &resolved.content)?;
        fs::remove_file(&resolved.source)?;
        Ok(())
    }

    /// Renders every placeholder below `root` and returns the written targets.
    /// A tree without placeholders is left untouched.
    pub fn run(&self, root: &Path) -> Result<Vec<PathBuf>> {
        let resolved = self
            .placeholders(root)?
            .iter()
            .map(|source| self.resolve(source))
            .collect::<Result<Vec<_>>>()?;

        for file in &resolved {
            if file.target.exists() {
                return Err(Error::StructuralConflict { path: file.target.clone() });
            }
        }
        for file in &resolved {
            Self::commit(file)?;
        }
        Ok(resolved.into_iter().map(|file| file.target).collect())
    }
}

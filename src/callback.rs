//! Deferred callbacks and the data store they populate.
//!
//! Copying only *collects* [`Task`]s. Once the whole tree is on disk,
//! [`run_tasks`] executes them one after another, in queue order, against a
//! single [`DataStore`]. Each task sees the writes of the tasks before it.
//! The store is then read-only input for the second rendering pass.

use indexmap::IndexMap;
use log::debug;
use serde_json::{json, Value};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::manifest::merge;
use crate::renderer::{render_value, TemplateRenderer};

/// Per-destination context fragments, keyed by destination path.
#[derive(Debug, Default, Clone)]
pub struct DataStore {
    entries: IndexMap<PathBuf, Value>,
}

impl DataStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, dest: &Path) -> Option<&Value> {
        self.entries.get(dest)
    }

    /// The fragment for `dest`, or an empty object.
    pub fn fragment(&self, dest: &Path) -> Value {
        self.entries.get(dest).cloned().unwrap_or_else(|| json!({}))
    }

    pub fn insert<P: Into<PathBuf>>(&mut self, dest: P, fragment: Value) {
        self.entries.insert(dest.into(), fragment);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

pub type CallbackFn = Box<dyn FnOnce(&mut DataStore) -> Result<()>>;

enum Action {
    /// Load a data fragment file and merge it into the store.
    Fragment { source: PathBuf },
    Custom(CallbackFn),
}

/// A unit of deferred work bound to one destination path.
pub struct Task {
    dest: PathBuf,
    action: Action,
}

impl Task {
    /// A task that loads the data fragment at `source` into the entry for `dest`.
    pub fn fragment<S: Into<PathBuf>, D: Into<PathBuf>>(source: S, dest: D) -> Self {
        Self { dest: dest.into(), action: Action::Fragment { source: source.into() } }
    }

    pub fn custom<D, F>(dest: D, callback: F) -> Self
    where
        D: Into<PathBuf>,
        F: FnOnce(&mut DataStore) -> Result<()> + 'static,
    {
        Self { dest: dest.into(), action: Action::Custom(Box::new(callback)) }
    }

    pub fn dest(&self) -> &Path {
        &self.dest
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match &self.action {
            Action::Fragment { source } => format!("fragment '{}'", source.display()),
            Action::Custom(_) => "custom".to_string(),
        };
        write!(f, "Task({kind} -> '{}')", self.dest.display())
    }
}

/// Tasks in the order they were queued.
#[derive(Debug, Default)]
pub struct TaskQueue {
    tasks: Vec<Task>,
}

impl TaskQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, task: Task) {
        self.tasks.push(task);
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Task> {
        self.tasks.iter()
    }
}

/// Returns the destination key of a data fragment, or `None` if `path` does
/// not carry one of `suffixes`.
pub fn fragment_key(path: &Path, suffixes: &[String]) -> Option<PathBuf> {
    let name = path.file_name()?.to_str()?;
    suffixes
        .iter()
        .find_map(|suffix| name.strip_suffix(suffix.as_str()))
        .filter(|stem| !stem.is_empty())
        .map(|stem| path.with_file_name(stem))
}

fn load_fragment(source: &Path) -> Result<Value> {
    let content = fs::read_to_string(source)?;
    let is_json = source.extension().map(|ext| ext == "json").unwrap_or(false);
    let value: Value = if is_json {
        serde_json::from_str(&content)?
    } else {
        serde_yaml::from_str(&content)?
    };
    match value {
        Value::Object(_) => Ok(value),
        Value::Null => Ok(json!({})),
        _ => Err(Error::ManifestError(format!(
            "data fragment '{}' must contain an object",
            source.display()
        ))),
    }
}

/// Executes every task in queue order.
///
/// Fragment values are rendered against `base_context` plus `old`, the entry
/// already stored for the same destination, then deep-merged over that entry.
/// The consumed fragment file is removed and its path returned.
///
/// # Errors
/// * `Error::CallbackFailure` for the first task that fails; later tasks do
///   not run
pub fn run_tasks(
    queue: TaskQueue,
    store: &mut DataStore,
    engine: &dyn TemplateRenderer,
    base_context: &Value,
) -> Result<Vec<PathBuf>> {
    let mut consumed = Vec::new();
    for task in queue.tasks {
        let Task { dest, action } = task;
        debug!("Running callback for '{}'.", dest.display());
        let outcome = match action {
            Action::Fragment { source } => run_fragment(&source, &dest, store, engine, base_context)
                .map(|()| consumed.push(source)),
            Action::Custom(callback) => callback(store),
        };
        outcome.map_err(|e| match e {
            Error::CallbackFailure { .. } => e,
            other => Error::CallbackFailure { dest: dest.clone(), reason: other.to_string() },
        })?;
    }
    Ok(consumed)
}

fn run_fragment(
    source: &Path,
    dest: &Path,
    store: &mut DataStore,
    engine: &dyn TemplateRenderer,
    base_context: &Value,
) -> Result<()> {
    let fragment = load_fragment(source)?;
    let old = store.fragment(dest);
    let context = merge(base_context, &json!({ "old": old }));
    let rendered = render_value(engine, &fragment, &context)?;
    store.insert(dest, merge(&old, &rendered));
    fs::remove_file(source)?;
    Ok(())
}

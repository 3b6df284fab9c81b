//! Project identity, destination preparation and environment values.

use cruet::Inflector;
use indexmap::IndexMap;
use log::{debug, info};
use rand::distributions::Alphanumeric;
use rand::Rng;
use regex::Regex;
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use crate::constants::DEFAULT_PROJECT_NAME;
use crate::error::{Error, Result};
use crate::traverse::empty_dir;

static PACKAGE_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:@[a-z0-9-*~][a-z0-9-*._~]*/)?[a-z0-9-~][a-z0-9-._~]*$")
        .expect("package name pattern is valid")
});
static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));
static LEADING_DOT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[._]").expect("leading dot pattern is valid"));
static DISALLOWED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9-~]+").expect("disallowed pattern is valid"));

pub fn is_valid_package_name(name: &str) -> bool {
    PACKAGE_NAME.is_match(name)
}

pub fn to_valid_package_name(name: &str) -> String {
    let name = name.trim().to_lowercase();
    let name = WHITESPACE.replace_all(&name, "-");
    let name = LEADING_DOT.replace(&name, "");
    DISALLOWED.replace_all(&name, "-").into_owned()
}

/// A directory can be reused as-is when it is missing, empty, or holds only
/// a `.git` directory.
pub fn can_skip_emptying<P: AsRef<Path>>(dir: P) -> Result<bool> {
    let dir = dir.as_ref();
    if !dir.exists() {
        return Ok(true);
    }
    let names = fs::read_dir(dir)?
        .map(|entry| entry.map(|e| e.file_name()))
        .collect::<std::io::Result<Vec<_>>>()?;
    Ok(names.is_empty() || (names.len() == 1 && names[0] == ".git"))
}

/// Ensures the output directory exists and is safe to write to. Emptying
/// with `force` keeps an existing `.git`.
///
/// # Errors
/// * `Error::OutputDirectoryExistsError` if the directory has content and
///   `force` is false
pub fn prepare_output_dir<P: AsRef<Path>>(output_dir: P, force: bool) -> Result<()> {
    let output_dir = output_dir.as_ref();
    if !output_dir.exists() {
        debug!("Creating '{}'.", output_dir.display());
        fs::create_dir_all(output_dir)?;
        return Ok(());
    }
    if can_skip_emptying(output_dir)? {
        return Ok(());
    }
    if !force {
        return Err(Error::OutputDirectoryExistsError {
            output_dir: output_dir.display().to_string(),
        });
    }
    info!("Removing existing files in '{}'.", output_dir.display());
    empty_dir(output_dir)
}

/// Names derived from the target directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectIdentity {
    /// Target directory exactly as requested.
    pub target_dir: String,
    /// Package name used in the manifest.
    pub package_name: String,
}

impl ProjectIdentity {
    pub fn new<P: AsRef<Path>>(target_dir: &str, output_root: P) -> Self {
        let base = output_root
            .as_ref()
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(DEFAULT_PROJECT_NAME);
        let package_name = if is_valid_package_name(base) {
            base.to_string()
        } else {
            to_valid_package_name(base)
        };
        let package_name = if package_name.trim_matches('-').is_empty() {
            DEFAULT_PROJECT_NAME.to_string()
        } else {
            package_name
        };
        Self { target_dir: target_dir.to_string(), package_name }
    }
}

pub fn generate_secret(length: usize) -> String {
    rand::thread_rng().sample_iter(&Alphanumeric).take(length).map(char::from).collect()
}

/// Lowest-priority render values shared by every file.
///
/// `extra` comes from the template configuration and is applied first, so
/// the computed values always win.
pub fn environment(
    identity: &ProjectIdentity,
    production: bool,
    extra: &IndexMap<String, Value>,
) -> Value {
    let mut values: Map<String, Value> =
        extra.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
    let name = identity.package_name.clone();
    let password = if production { generate_secret(16) } else { "postgres".to_string() };

    values.insert("TARGET_DIR".to_string(), Value::String(identity.target_dir.clone()));
    values.insert("PROJECT_NAME".to_string(), Value::String(name.clone()));
    values.insert("PROJECT_IDENT".to_string(), Value::String(name.to_snake_case()));
    values.insert("PROJECT_TITLE".to_string(), Value::String(name.to_title_case()));
    values.insert("PGDATABASE".to_string(), Value::String(name.clone()));
    values.insert("PGPASSWORD".to_string(), Value::String(password));
    values.insert("VITE_NAME".to_string(), Value::String(name));
    Value::Object(values)
}

//! Package manifest composition.
//!
//! Manifests are plain JSON objects. Two manifests combine with [`merge`]; the
//! dependency sections are put into a canonical order with
//! [`sort_dependencies`] only after merging.

use log::debug;
use serde_json::{json, Map, Value};
use std::fs;
use std::path::Path;

use crate::constants::DEPENDENCY_SECTIONS;
use crate::error::{Error, Result};

/// A package descriptor such as `package.json`.
pub type Manifest = Value;

/// Deep-merges `overlay` into a copy of `base`.
///
/// Objects merge key by key, arrays concatenate without duplicates keeping the
/// first occurrence, and any other value from `overlay` replaces the one in
/// `base`.
pub fn merge(base: &Value, overlay: &Value) -> Value {
    match (base, overlay) {
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            let mut merged = base_map.clone();
            for (key, value) in overlay_map {
                let next = match merged.get(key) {
                    Some(existing) => merge_value(existing, value),
                    None => value.clone(),
                };
                merged.insert(key.clone(), next);
            }
            Value::Object(merged)
        }
        _ => overlay.clone(),
    }
}

fn merge_value(existing: &Value, value: &Value) -> Value {
    match (existing, value) {
        (Value::Object(_), Value::Object(_)) => merge(existing, value),
        (Value::Array(left), Value::Array(right)) => {
            let mut items: Vec<Value> = Vec::with_capacity(left.len() + right.len());
            for item in left.iter().chain(right) {
                if !items.contains(item) {
                    items.push(item.clone());
                }
            }
            Value::Array(items)
        }
        _ => value.clone(),
    }
}

/// Sorts the keys of every dependency section, leaving values and the
/// position of the sections themselves unchanged.
pub fn sort_dependencies(manifest: &Value) -> Value {
    let Value::Object(map) = manifest else {
        return manifest.clone();
    };

    let mut sorted = map.clone();
    for section in DEPENDENCY_SECTIONS {
        if let Some(Value::Object(deps)) = map.get(section) {
            let mut entries: Vec<(&String, &Value)> = deps.iter().collect();
            entries.sort_by(|(a, _), (b, _)| a.cmp(b));
            let deps: Map<String, Value> =
                entries.into_iter().map(|(k, v)| (k.clone(), v.clone())).collect();
            sorted.insert(section.to_string(), Value::Object(deps));
        }
    }
    Value::Object(sorted)
}

/// Reads a manifest, requiring a JSON object at the top level.
pub fn read_manifest<P: AsRef<Path>>(path: P) -> Result<Manifest> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)?;
    let manifest: Value = serde_json::from_str(&content)?;
    if !manifest.is_object() {
        return Err(Error::ManifestError(format!(
            "'{}' does not contain a JSON object",
            path.display()
        )));
    }
    Ok(manifest)
}

/// Writes a manifest as two-space indented JSON with a trailing newline.
pub fn write_manifest<P: AsRef<Path>>(path: P, manifest: &Manifest) -> Result<()> {
    let mut content = serde_json::to_string_pretty(manifest)?;
    content.push('\n');
    fs::write(path, content)?;
    Ok(())
}

/// Gives the manifest at `path` its final form: defaults for `name` and
/// `version` underneath what the template provided, the project name on top,
/// dependency sections sorted. Returns `None` when the template ships no
/// manifest.
pub fn finalize_manifest<P: AsRef<Path>>(path: P, package_name: &str) -> Result<Option<Manifest>> {
    let path = path.as_ref();
    if !path.exists() {
        debug!("No manifest at '{}'.", path.display());
        return Ok(None);
    }
    let existing = read_manifest(path)?;
    let seeded = merge(&json!({ "name": package_name, "version": "0.0.0" }), &existing);
    let updated = sort_dependencies(&merge(&seeded, &json!({ "name": package_name })));
    write_manifest(path, &updated)?;
    Ok(Some(updated))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sorted_sections_keep_their_position() {
        let manifest = json!({
            "name": "demo",
            "devDependencies": {"vite": "5", "eslint": "9"},
            "version": "0.0.0"
        });
        let sorted = sort_dependencies(&manifest);
        let keys: Vec<&String> = sorted.as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["name", "devDependencies", "version"]);
        let deps: Vec<&String> = sorted["devDependencies"].as_object().unwrap().keys().collect();
        assert_eq!(deps, vec!["eslint", "vite"]);
    }

    #[test]
    fn non_object_top_level_is_replaced() {
        assert_eq!(merge(&json!([1]), &json!({"a": 1})), json!({"a": 1}));
        assert_eq!(sort_dependencies(&json!("x")), json!("x"));
    }
}

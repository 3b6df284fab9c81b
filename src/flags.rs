//! Feature flags: the flat option map chosen before materialization starts.
//!
//! Flags are resolved once from the command line (and optionally stdin) and
//! are read-only for the rest of the run.

use serde::Serialize;
use serde_json::{Map, Value};
use std::io::Read;

use crate::cli::Args;
use crate::error::{Error, Result};
use crate::variant::Variant;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FeatureFlags(Map<String, Value>);

impl FeatureFlags {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn insert<K: Into<String>>(&mut self, name: K, value: Value) {
        self.0.insert(name.into(), value);
    }

    /// A flag is enabled when it is present and truthy.
    pub fn is_enabled(&self, name: &str) -> bool {
        match self.0.get(name) {
            None | Some(Value::Null) => false,
            Some(Value::Bool(b)) => *b,
            Some(Value::String(s)) => !s.is_empty() && s != "false",
            Some(Value::Number(n)) => n.as_f64() != Some(0.0),
            Some(_) => true,
        }
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}

impl From<Map<String, Value>> for FeatureFlags {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// Parses `KEY=VALUE` into a flag. Values that are valid JSON keep their
/// type, anything else is a string; a bare `KEY` is `true`.
pub fn parse_flag(raw: &str) -> Result<(String, Value)> {
    let (key, value) = match raw.split_once('=') {
        Some((key, value)) => {
            let value = serde_json::from_str(value).unwrap_or(Value::String(value.to_string()));
            (key.trim(), value)
        }
        None => (raw.trim(), Value::Bool(true)),
    };
    if key.is_empty() {
        return Err(Error::ConfigError(format!("invalid flag '{raw}'")));
    }
    Ok((key.to_string(), value))
}

/// Parses a JSON object of flags.
pub fn parse_flags_json(content: &str) -> Result<FeatureFlags> {
    let content = content.trim();
    if content.is_empty() {
        return Ok(FeatureFlags::new());
    }
    match serde_json::from_str::<Value>(content)? {
        Value::Object(map) => Ok(FeatureFlags(map)),
        _ => Err(Error::ConfigError("flags on stdin must be a JSON object".to_string())),
    }
}

pub fn load_from_stdin() -> Result<FeatureFlags> {
    let mut buffer = String::new();
    std::io::stdin().read_to_string(&mut buffer)?;
    parse_flags_json(&buffer)
}

/// Resolves the feature flags for a run.
///
/// Stdin flags are overridden by `--flag` values, which are overridden by
/// the dedicated switches. The variant always ends up as both `variant`
/// (`"ts"`/`"js"`) and `typescript` (bool).
pub fn from_args(args: &Args) -> Result<FeatureFlags> {
    let mut flags = if args.stdin { load_from_stdin()? } else { FeatureFlags::new() };

    for raw in &args.flags {
        let (key, value) = parse_flag(raw)?;
        flags.insert(key, value);
    }

    if args.js {
        flags.insert("variant", Value::String(Variant::JavaScript.tag().to_string()));
    } else if args.ts {
        flags.insert("variant", Value::String(Variant::TypeScript.tag().to_string()));
    }
    if args.prod {
        flags.insert("prod", Value::Bool(true));
    }

    let variant = Variant::from_flags(&flags)?;
    flags.insert("variant", Value::String(variant.tag().to_string()));
    flags.insert("typescript", Value::Bool(variant == Variant::TypeScript));
    Ok(flags)
}

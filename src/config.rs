//! Configuration handling for Sprout templates.
//! This module loads the optional template configuration file that tunes
//! naming conventions, overlay layers and variant cleanup.

use indexmap::IndexMap;
use log::debug;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::constants::{CONFIG_FILES, DATA_SUFFIXES, MANIFEST_FILE, PLACEHOLDER_SUFFIX};
use crate::error::{Error, Result};
use crate::flags::FeatureFlags;
use crate::variant::VariantRules;

/// One overlay directory of the template, copied when its flag holds.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Layer {
    /// Directory relative to the template root.
    pub dir: PathBuf,
    /// Flag that selects the layer; `!flag` selects it when the flag is off.
    #[serde(default)]
    pub when: Option<String>,
}

impl Layer {
    pub fn is_selected(&self, flags: &FeatureFlags) -> bool {
        match self.when.as_deref() {
            None => true,
            Some(flag) => match flag.strip_prefix('!') {
                Some(flag) => !flags.is_enabled(flag),
                None => flags.is_enabled(flag),
            },
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TemplateConfig {
    /// Suffix of files expanded in the second pass.
    pub placeholder_suffix: String,
    /// Suffixes of data fragments consumed by callbacks.
    pub data_suffixes: Vec<String>,
    /// Manifest path relative to the destination root.
    pub manifest: PathBuf,
    /// JSON files merged instead of conflicting when written twice.
    pub mergeable: Vec<PathBuf>,
    pub layers: Vec<Layer>,
    /// Globs exempt from the second pass.
    pub render_exclude: Vec<String>,
    /// Cleanup rules: `typescript_only`, `javascript_only`, `required`.
    pub variants: VariantRules,
    /// Extra lowest-priority render values.
    pub environment: IndexMap<String, serde_json::Value>,
}

impl Default for TemplateConfig {
    fn default() -> Self {
        Self {
            placeholder_suffix: PLACEHOLDER_SUFFIX.to_string(),
            data_suffixes: DATA_SUFFIXES.iter().map(|s| s.to_string()).collect(),
            manifest: PathBuf::from(MANIFEST_FILE),
            mergeable: vec![
                PathBuf::from(MANIFEST_FILE),
                PathBuf::from(".vscode/extensions.json"),
                PathBuf::from(".vscode/settings.json"),
            ],
            layers: vec![Layer { dir: PathBuf::from("."), when: None }],
            render_exclude: vec!["**/template/**".to_string()],
            variants: VariantRules::default(),
            environment: IndexMap::new(),
        }
    }
}

impl TemplateConfig {
    /// Rejects settings that would make the pipeline ambiguous.
    pub fn validate(&self) -> Result<()> {
        if self.placeholder_suffix.len() < 2 || !self.placeholder_suffix.starts_with('.') {
            return Err(Error::ConfigError(format!(
                "placeholder_suffix must look like '.ext', got '{}'",
                self.placeholder_suffix
            )));
        }
        if let Some(suffix) = self.data_suffixes.iter().find(|s| !s.starts_with('.')) {
            return Err(Error::ConfigError(format!("data suffix must start with '.', got '{suffix}'")));
        }
        if self.layers.is_empty() {
            return Err(Error::ConfigError("at least one layer is required".to_string()));
        }
        Ok(())
    }
}

/// Finds the first existing configuration file in a template directory.
///
/// # Returns
/// * `Result<Option<String>>` - Contents of the first found configuration file
pub fn load_config<P: AsRef<Path>>(template_dir: P, config_files: &[&str]) -> Result<Option<String>> {
    for file in config_files {
        let config_path = template_dir.as_ref().join(file);
        if config_path.exists() {
            debug!("Loading configuration from {}", config_path.display());
            return Ok(Some(std::fs::read_to_string(&config_path)?));
        }
    }
    Ok(None)
}

/// Parses configuration content, trying JSON first and YAML second.
pub fn parse_config(content: &str) -> Result<TemplateConfig> {
    let config: TemplateConfig = match serde_json::from_str(content) {
        Ok(config) => config,
        Err(_) => serde_yaml::from_str(content)
            .map_err(|e| Error::ConfigError(format!("Invalid configuration format: {e}")))?,
    };
    config.validate()?;
    Ok(config)
}

/// Loads the template configuration, falling back to defaults when the
/// template has no configuration file.
pub fn get_config<P: AsRef<Path>>(template_root: P) -> Result<TemplateConfig> {
    match load_config(template_root, &CONFIG_FILES)? {
        Some(content) => parse_config(&content),
        None => {
            debug!("No configuration file found (tried: {})", CONFIG_FILES.join(", "));
            Ok(TemplateConfig::default())
        }
    }
}

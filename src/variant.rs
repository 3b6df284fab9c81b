//! Language-variant resolution.
//!
//! A template may carry the same logical file in a TypeScript and a
//! JavaScript form, told apart by an extension segment (`main.ts` /
//! `main.js`, `a.ts.variant` / `a.js.variant`). After rendering, exactly one
//! form of each logical file survives: the chosen variant's form when it
//! exists, otherwise the remaining one. Config files that only make sense
//! for the rejected variant are removed as well.
//!
//! Resolution is split in two: [`plan_cleanup`] is a pure function of the file
//! list, the variant and the rules; [`apply_plan`] performs the deletions.

use globset::GlobSet;
use indexmap::IndexMap;
use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::flags::FeatureFlags;
use crate::ignore::build_glob_set;
use crate::traverse::{list_files, prune_empty_parents};

/// Extension segments per variant; the same index pairs the two forms.
const TYPESCRIPT_TAGS: [&str; 4] = ["ts", "tsx", "mts", "cts"];
const JAVASCRIPT_TAGS: [&str; 4] = ["js", "jsx", "mjs", "cjs"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    TypeScript,
    JavaScript,
}

impl Variant {
    /// Reads the variant from `variant` (`ts`/`js`), falling back to the
    /// `typescript` boolean. TypeScript when neither is set.
    pub fn from_flags(flags: &FeatureFlags) -> Result<Self> {
        if let Some(value) = flags.get("variant") {
            return match value.as_str().map(str::to_lowercase).as_deref() {
                Some("ts" | "typescript") => Ok(Variant::TypeScript),
                Some("js" | "javascript") => Ok(Variant::JavaScript),
                _ => Err(Error::ConfigError(format!("unknown variant {value}"))),
            };
        }
        match flags.get("typescript") {
            Some(_) if !flags.is_enabled("typescript") => Ok(Variant::JavaScript),
            _ => Ok(Variant::TypeScript),
        }
    }

    pub fn tag(&self) -> &'static str {
        self.tags()[0]
    }

    pub fn other(&self) -> Variant {
        match self {
            Variant::TypeScript => Variant::JavaScript,
            Variant::JavaScript => Variant::TypeScript,
        }
    }

    fn tags(&self) -> &'static [&'static str; 4] {
        match self {
            Variant::TypeScript => &TYPESCRIPT_TAGS,
            Variant::JavaScript => &JAVASCRIPT_TAGS,
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Variant::TypeScript => write!(f, "TypeScript"),
            Variant::JavaScript => write!(f, "JavaScript"),
        }
    }
}

/// Template-configurable cleanup rules.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VariantRules {
    /// File-name globs removed when TypeScript is rejected.
    pub typescript_only: Vec<String>,
    /// File-name globs removed when JavaScript is rejected.
    pub javascript_only: Vec<String>,
    /// Logical files that must keep one form, e.g. `src/main.ts`.
    pub required: Vec<String>,
}

impl Default for VariantRules {
    fn default() -> Self {
        Self {
            typescript_only: vec![
                "tsconfig.json".to_string(),
                "tsconfig.*.json".to_string(),
                "env.d.ts".to_string(),
            ],
            javascript_only: vec!["jsconfig.json".to_string()],
            required: Vec::new(),
        }
    }
}

impl VariantRules {
    fn rejected_configs(&self, variant: Variant) -> Result<GlobSet> {
        match variant.other() {
            Variant::TypeScript => build_glob_set(&self.typescript_only),
            Variant::JavaScript => build_glob_set(&self.javascript_only),
        }
    }
}

/// A file name split into its logical identity and variant form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// Name with the variant segment replaced by `{ts|js}`.
    pub logical: String,
    pub variant: Variant,
}

/// Classifies a relative path. Only segments after the first dot are
/// considered, so `ts.config` is not a candidate but `vite.config.ts` is.
pub fn classify(relative: &Path) -> Option<Candidate> {
    let name = relative.to_str()?.replace('\\', "/");
    let (dir, file) = match name.rsplit_once('/') {
        Some((dir, file)) => (Some(dir), file),
        None => (None, name.as_str()),
    };
    let segments: Vec<&str> = file.split('.').collect();

    for (position, segment) in segments.iter().enumerate().skip(1) {
        for variant in [Variant::TypeScript, Variant::JavaScript] {
            if let Some(index) = variant.tags().iter().position(|tag| tag == segment) {
                let mut logical_segments: Vec<String> =
                    segments.iter().map(|s| s.to_string()).collect();
                logical_segments[position] =
                    format!("{{{}|{}}}", TYPESCRIPT_TAGS[index], JAVASCRIPT_TAGS[index]);
                let logical_file = logical_segments.join(".");
                let logical = match dir {
                    Some(dir) => format!("{dir}/{logical_file}"),
                    None => logical_file,
                };
                return Some(Candidate { logical, variant });
            }
        }
    }
    None
}

/// The outcome of resolving a tree; paths are relative to the root.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CleanupPlan {
    pub keep: Vec<PathBuf>,
    pub remove: Vec<PathBuf>,
}

/// Decides which files survive for `variant`.
///
/// # Errors
/// * `Error::CleanupAmbiguity` if a required logical file has no form at all
pub fn plan_cleanup(files: &[PathBuf], variant: Variant, rules: &VariantRules) -> Result<CleanupPlan> {
    let rejected = rules.rejected_configs(variant)?;
    let mut plan = CleanupPlan::default();
    let mut groups: IndexMap<String, Vec<(Variant, PathBuf)>> = IndexMap::new();

    for file in files {
        let is_rejected_config =
            file.file_name().map(|name| rejected.is_match(Path::new(name))).unwrap_or(false);
        if is_rejected_config {
            plan.remove.push(file.clone());
            continue;
        }
        match classify(file) {
            Some(candidate) => groups
                .entry(candidate.logical)
                .or_default()
                .push((candidate.variant, file.clone())),
            None => plan.keep.push(file.clone()),
        }
    }

    for required in &rules.required {
        let logical = classify(Path::new(required))
            .map(|c| c.logical)
            .unwrap_or_else(|| required.clone());
        if !groups.contains_key(&logical) {
            return Err(Error::CleanupAmbiguity { logical });
        }
    }

    for (logical, forms) in groups {
        let survivor = forms
            .iter()
            .position(|(v, _)| *v == variant)
            .unwrap_or(0);
        if forms[survivor].0 != variant {
            debug!("No {variant} form of '{logical}', keeping '{}'.", forms[survivor].1.display());
        }
        for (index, (_, path)) in forms.into_iter().enumerate() {
            if index == survivor {
                plan.keep.push(path);
            } else {
                plan.remove.push(path);
            }
        }
    }

    plan.keep.sort();
    plan.remove.sort();
    Ok(plan)
}

/// Deletes the files the plan rejects, below `root`, along with any
/// directory those deletions left empty.
pub fn apply_plan<P: AsRef<Path>>(root: P, plan: &CleanupPlan) -> Result<()> {
    let root = root.as_ref();
    for relative in &plan.remove {
        debug!("Removing '{}'.", relative.display());
        fs::remove_file(root.join(relative))?;
    }
    prune_empty_parents(root, &plan.remove)
}

/// Resolves the whole destination tree and returns the removed paths.
pub fn cleanup<P: AsRef<Path>>(root: P, variant: Variant, rules: &VariantRules) -> Result<Vec<PathBuf>> {
    let root = root.as_ref();
    let files = list_files(root)?
        .into_iter()
        .map(|path| path.strip_prefix(root).map(Path::to_path_buf))
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| Error::ConfigError(e.to_string()))?;

    let plan = plan_cleanup(&files, variant, rules)?;
    apply_plan(root, &plan)?;
    Ok(plan.remove)
}

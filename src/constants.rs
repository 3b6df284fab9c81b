//! Common constants used throughout the Sprout application.

/// Supported configuration file names
pub const CONFIG_FILES: [&str; 3] = ["sprout.json", "sprout.yml", "sprout.yaml"];

/// Sprout's ignore file name
pub const IGNORE_FILE: &str = ".sproutignore";

/// Patterns that are never copied from a template.
pub const DEFAULT_IGNORE_PATTERNS: [&str; 3] = ["**/.git", "**/node_modules", "**/.DS_Store"];

/// Suffix marking a file for the second rendering pass.
pub const PLACEHOLDER_SUFFIX: &str = ".j2";

/// Suffixes marking a data fragment consumed by a callback.
pub const DATA_SUFFIXES: [&str; 3] = [".data.json", ".data.yaml", ".data.yml"];

/// Destination package descriptor.
pub const MANIFEST_FILE: &str = "package.json";

/// Manifest sections whose keys are sorted on write.
pub const DEPENDENCY_SECTIONS: [&str; 4] =
    ["dependencies", "devDependencies", "peerDependencies", "optionalDependencies"];

/// Project name used when no target directory is given.
pub const DEFAULT_PROJECT_NAME: &str = "sprout-app";

/// Entry of an existing destination that is kept and never traversed.
pub const PRESERVED_ENTRY: &str = ".git";

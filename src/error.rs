//! Error handling for the Sprout application.
//! Defines custom error types and results used throughout the materialization pipeline.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Custom error types for Sprout operations.
///
/// The first four variants are the fatal pipeline failures; none of them is
/// retried and every stage propagates them unchanged.
#[derive(Error, Debug)]
pub enum Error {
    /// A destination path was written twice during one run.
    #[error("Structural conflict: '{}' was already written in this run.", .path.display())]
    StructuralConflict { path: PathBuf },

    /// A queued callback failed before the second pass started.
    #[error("Callback for '{}' failed: {reason}.", .dest.display())]
    CallbackFailure { dest: PathBuf, reason: String },

    /// A placeholder file could not be rendered.
    #[error("Failed to render '{}': {source}.", .path.display())]
    RenderFailure {
        path: PathBuf,
        #[source]
        source: minijinja::Error,
    },

    /// No form of a required logical file exists.
    #[error("Cleanup ambiguity: no variant form of '{logical}' exists.")]
    CleanupAmbiguity { logical: String },

    /// Represents errors that occur during file system operations
    #[error("IO error: {0}.")]
    IoError(#[from] io::Error),

    #[error("Directory traversal error: {0}.")]
    WalkError(#[from] walkdir::Error),

    #[error("JSON error: {0}.")]
    JsonError(#[from] serde_json::Error),

    #[error("YAML error: {0}.")]
    YamlError(#[from] serde_yaml::Error),

    /// Represents errors that occur during template processing
    #[error("Template error: {0}.")]
    MinijinjaError(#[from] minijinja::Error),

    /// Represents errors that occur during configuration parsing or processing
    #[error("Configuration error: {0}.")]
    ConfigError(String),

    /// Represents errors in processing .sproutignore files
    #[error("SproutIgnore error: {0}.")]
    IgnoreError(String),

    #[error("Manifest error: {0}.")]
    ManifestError(String),

    #[error("Output directory '{output_dir}' is not empty; use --force to overwrite it.")]
    OutputDirectoryExistsError { output_dir: String },

    #[error("Template directory '{template_dir}' does not exist.")]
    TemplateDoesNotExistsError { template_dir: String },
}

/// Convenience type alias for Results with Error as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Default error handler that prints the error and exits the program.
///
/// # Arguments
/// * `err` - The Error to handle
///
/// # Behavior
/// Prints the error message to stderr and exits with status code 1
pub fn default_error_handler(err: Error) {
    eprintln!("{err}");
    std::process::exit(1);
}

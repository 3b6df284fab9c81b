//! Sprout materializes a new project directory from a template corpus.
//! Files are selected by feature flags, placeholders are rendered in a second
//! pass against values contributed by the template itself, and language
//! variants are resolved so exactly one form of each file survives.

/// Deferred callbacks and the data store they populate
pub mod callback;

/// Command-line interface module for the Sprout application
pub mod cli;

/// Configuration handling for Sprout templates
/// Supports JSON and YAML formats (sprout.json, sprout.yml, sprout.yaml)
pub mod config;

/// Shared file names, suffixes and defaults
pub mod constants;

/// Copies template layers into the destination tree
pub mod copier;

/// Error types and handling for the Sprout application
pub mod error;

/// Feature flag resolution
pub mod flags;

/// File and directory ignore patterns
/// Processes .sproutignore files to exclude specific paths
pub mod ignore;

/// Logging setup for the command-line tool
pub mod logger;

/// Manifest (package.json) merging and canonicalization
pub mod manifest;

/// Core orchestration: runs every stage in order
pub mod pipeline;

/// Project naming, destination preparation and environment values
pub mod project;

/// Second rendering pass over placeholder files
pub mod render;

/// Expression rendering engine
pub mod renderer;

/// Name-sorted pre-order and post-order traversal
pub mod traverse;

/// Language-variant cleanup
pub mod variant;

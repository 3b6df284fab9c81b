//! Command-line interface implementation for Sprout.
//! Provides argument parsing and help text formatting using clap.

use clap::{error::ErrorKind, CommandFactory, Parser};
use std::path::PathBuf;

use crate::constants::DEFAULT_PROJECT_NAME;

/// Command-line arguments structure for Sprout.
#[derive(Parser, Debug)]
#[command(author, version, about = "Sprout: materialize a new project from a template", long_about = None)]
pub struct Args {
    /// Directory where the generated project will be created
    #[arg(value_name = "TARGET_DIR", default_value = DEFAULT_PROJECT_NAME)]
    pub target_dir: String,

    /// Path to the template directory
    #[arg(short, long, value_name = "DIR", default_value = "template")]
    pub template: PathBuf,

    /// Remove existing files in a non-empty target directory
    #[arg(short, long)]
    pub force: bool,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Generate the TypeScript variant (default)
    #[arg(long, visible_alias = "typescript", conflicts_with = "js")]
    pub ts: bool,

    /// Generate the JavaScript variant
    #[arg(long, visible_alias = "javascript")]
    pub js: bool,

    /// Generate production secrets instead of development defaults
    #[arg(long)]
    pub prod: bool,

    /// Additional feature flag, repeatable (e.g. --flag router=true)
    #[arg(long = "flag", value_name = "KEY=VALUE")]
    pub flags: Vec<String>,

    /// Read feature flags as a JSON object from stdin
    #[arg(short, long)]
    pub stdin: bool,
}

/// Parses command line arguments and returns the Args structure.
///
/// # Exits
/// * With status code 1 if required arguments are missing
/// * With clap's default error handling for other argument errors
pub fn get_args() -> Args {
    match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            if e.kind() == ErrorKind::MissingRequiredArgument {
                let _ = Args::command()
                    .help_template(
                        r#"{about-section}
{usage-heading} {usage}

{all-args}
{after-help}
"#,
                    )
                    .print_help();
                std::process::exit(1);
            } else {
                e.exit();
            }
        }
    }
}

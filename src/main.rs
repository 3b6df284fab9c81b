//! Sprout's main application entry point.
//! Handles command-line argument parsing and hands the resolved inputs to
//! the materialization pipeline.

use std::path::Path;

use log::debug;
use sprout::{
    cli::{get_args, Args},
    error::{default_error_handler, Result},
    flags::from_args,
    logger::init_logger,
    pipeline::{self, Options},
};

/// Main application entry point.
fn main() {
    let args = get_args();
    init_logger(args.verbose);

    if let Err(err) = run(args) {
        default_error_handler(err);
    }
}

fn run(args: Args) -> Result<()> {
    let flags = from_args(&args)?;
    debug!("Feature flags: {}", serde_json::to_string(&flags)?);

    let cwd = std::env::current_dir()?;
    let output_root = cwd.join(&args.target_dir);
    let options = Options {
        template_root: args.template.clone(),
        target_dir: args.target_dir.clone(),
        output_root: output_root.clone(),
        force: args.force,
        production: args.prod,
        flags,
    };

    let report = pipeline::run(&options)?;

    for path in &report.rendered {
        println!("rendered: '{}'", path.display());
    }
    for path in &report.removed {
        println!("removed: '{}'", path.display());
    }
    println!(
        "Generated {} ({}) with {} file(s) in {}.",
        report.package_name,
        report.variant,
        report.files.len(),
        report.output_root.display()
    );
    if output_root != cwd {
        let relative = output_root.strip_prefix(&cwd).unwrap_or(Path::new(&args.target_dir));
        let shown = relative.display().to_string();
        if shown.contains(' ') {
            println!("\n  cd \"{shown}\"");
        } else {
            println!("\n  cd {shown}");
        }
    }
    Ok(())
}

//! Core materialization orchestration.
//! Runs copy, callback resolution, the second rendering pass and variant
//! cleanup strictly one after another against a single destination tree.

use log::info;
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::callback::{run_tasks, DataStore, TaskQueue};
use crate::config::{get_config, TemplateConfig};
use crate::copier::Copier;
use crate::error::{Error, Result};
use crate::flags::FeatureFlags;
use crate::ignore::{build_glob_set, parse_ignore_file};
use crate::manifest::finalize_manifest;
use crate::project::{environment, prepare_output_dir, ProjectIdentity};
use crate::render::{render_context, RenderPass};
use crate::renderer::{MiniJinjaRenderer, TemplateRenderer};
use crate::traverse::{list_files, prune_empty_parents};
use crate::variant::{cleanup, Variant};

/// Inputs of one run, resolved before materialization starts.
#[derive(Debug, Clone)]
pub struct Options {
    pub template_root: PathBuf,
    /// Target directory as the user gave it.
    pub target_dir: String,
    pub output_root: PathBuf,
    pub force: bool,
    pub production: bool,
    pub flags: FeatureFlags,
}

/// Description of what a run produced. Paths are relative to `output_root`.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Report {
    pub output_root: PathBuf,
    pub package_name: String,
    pub variant: Variant,
    /// Files written while copying, including placeholders and fragments.
    pub copied: Vec<PathBuf>,
    /// Files produced by the second pass.
    pub rendered: Vec<PathBuf>,
    /// Files deleted by variant cleanup.
    pub removed: Vec<PathBuf>,
    /// The final tree.
    pub files: Vec<PathBuf>,
}

fn relative_to(root: &Path, paths: Vec<PathBuf>) -> Vec<PathBuf> {
    paths
        .into_iter()
        .map(|p| p.strip_prefix(root).map(Path::to_path_buf).unwrap_or(p))
        .collect()
}

/// Materializes the template at `options.template_root` into
/// `options.output_root`.
pub fn run(options: &Options) -> Result<Report> {
    let engine = MiniJinjaRenderer::new();
    run_with(options, &engine)
}

/// Same as [`run`] with a caller-provided expression renderer.
pub fn run_with(options: &Options, engine: &dyn TemplateRenderer) -> Result<Report> {
    let template_root = &options.template_root;
    if !template_root.is_dir() {
        return Err(Error::TemplateDoesNotExistsError {
            template_dir: template_root.display().to_string(),
        });
    }
    let config = get_config(template_root)?;
    let ignored = parse_ignore_file(template_root)?;
    let variant = Variant::from_flags(&options.flags)?;

    let output_root = &options.output_root;
    prepare_output_dir(output_root, options.force)?;
    info!("Scaffolding project in {}...", output_root.display());

    let identity = ProjectIdentity::new(&options.target_dir, output_root);
    let env = environment(&identity, options.production, &config.environment);

    let mut queue = TaskQueue::new();
    let copied =
        copy_layers(&config, &ignored, template_root, output_root, &options.flags, &mut queue)?;

    finalize_manifest(output_root.join(&config.manifest), &identity.package_name)?;

    info!("Running {} callback(s)...", queue.len());
    let mut store = DataStore::new();
    let base = render_context(&env, None, &options.flags);
    let consumed = run_tasks(queue, &mut store, engine, &base)?;
    prune_empty_parents(output_root, &consumed)?;

    info!("Rendering templates...");
    let excluded = build_glob_set(&config.render_exclude)?;
    let pass = RenderPass::new(
        engine,
        &config.placeholder_suffix,
        &excluded,
        &env,
        &options.flags,
        &store,
    );
    let rendered = pass.run(output_root)?;

    info!("Resolving the {variant} variant...");
    let removed = cleanup(output_root, variant, &config.variants)?;

    let files = list_files(output_root)?;
    Ok(Report {
        output_root: output_root.clone(),
        package_name: identity.package_name,
        variant,
        copied: relative_to(output_root, copied),
        rendered: relative_to(output_root, rendered),
        removed,
        files: relative_to(output_root, files),
    })
}

fn copy_layers(
    config: &TemplateConfig,
    ignored: &globset::GlobSet,
    template_root: &Path,
    output_root: &Path,
    flags: &FeatureFlags,
    queue: &mut TaskQueue,
) -> Result<Vec<PathBuf>> {
    let copier = Copier::new(config, ignored);
    let mut written = Vec::new();
    for layer in config.layers.iter().filter(|layer| layer.is_selected(flags)) {
        let layer_root = if layer.dir == Path::new(".") {
            template_root.to_path_buf()
        } else {
            template_root.join(&layer.dir)
        };
        if !layer_root.is_dir() {
            return Err(Error::TemplateDoesNotExistsError {
                template_dir: layer_root.display().to_string(),
            });
        }
        info!("Rendering layer '{}'...", layer.dir.display());
        written.extend(copier.copy(&layer_root, output_root, queue)?);
    }
    Ok(written)
}

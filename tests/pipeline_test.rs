use serde_json::json;
use sprout::error::Error;
use sprout::flags::FeatureFlags;
use sprout::pipeline::{run, Options};
use sprout::variant::Variant;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn flags(pairs: serde_json::Value) -> FeatureFlags {
    FeatureFlags::from(pairs.as_object().unwrap().clone())
}

fn options(template: &Path, output: PathBuf, flags: FeatureFlags) -> Options {
    Options {
        template_root: template.to_path_buf(),
        target_dir: output.file_name().unwrap().to_string_lossy().into_owned(),
        output_root: output,
        force: false,
        production: false,
        flags,
    }
}

fn read_tree(root: &Path) -> Vec<(String, String)> {
    sprout::traverse::list_files(root)
        .unwrap()
        .into_iter()
        .map(|p| {
            let content = fs::read_to_string(&p).unwrap();
            (p.strip_prefix(root).unwrap().to_string_lossy().into_owned(), content)
        })
        .collect()
}

fn web_template() -> TempDir {
    let template = TempDir::new().unwrap();
    let root = template.path();
    write(
        root,
        "sprout.yaml",
        "layers:\n  - dir: base\n  - dir: router\n    when: router\n  - dir: plain\n    when: \"!typescript\"\n",
    );
    write(root, "base/package.json", r#"{"name": "base", "scripts": {"dev": "vite"}, "dependencies": {"vue": "^3.4"}}"#);
    write(root, "base/_gitignore", "node_modules\n");
    write(root, "base/index.html.j2", "<title>{{ title }}</title>\n");
    write(root, "base/index.html.data.json", r#"{"title": "{{ PROJECT_TITLE }}"}"#);
    write(root, "base/src/main.ts", "import './app'\n");
    write(root, "base/src/main.js", "import './app.js'\n");
    write(root, "base/tsconfig.json", "{}\n");
    write(root, "base/jsconfig.json", "{}\n");
    write(root, "base/.env.j2", "PGDATABASE={{ PGDATABASE }}\nPGPASSWORD={{ PGPASSWORD }}\n");
    write(root, "router/package.json", r#"{"dependencies": {"vue-router": "^4.3", "axios": "^1.6"}}"#);
    write(root, "router/src/router/index.ts.j2", "// router for {{ PROJECT_NAME }} ts={{ typescript }}\n");
    write(root, "plain/README.plain.md", "javascript only\n");
    template
}

#[test]
fn test_end_to_end_scenario() {
    let template = TempDir::new().unwrap();
    write(template.path(), "sprout.json", r#"{"environment": {"name": "demo"}}"#);
    write(template.path(), "pkg.j2", "{{ name }}");
    write(template.path(), "a.ts.variant", "x");
    write(template.path(), "a.js.variant", "y");
    let output = TempDir::new().unwrap();
    let root = output.path().join("demo");

    let report = run(&options(template.path(), root.clone(), flags(json!({"variant": "ts"})))).unwrap();

    assert_eq!(
        read_tree(&root),
        vec![("a.ts.variant".to_string(), "x".to_string()), ("pkg".to_string(), "demo".to_string())]
    );
    assert_eq!(report.variant, Variant::TypeScript);
    assert_eq!(report.rendered, vec![PathBuf::from("pkg")]);
    assert_eq!(report.removed, vec![PathBuf::from("a.js.variant")]);
    assert_eq!(report.files, vec![PathBuf::from("a.ts.variant"), PathBuf::from("pkg")]);
}

#[test]
fn test_full_typescript_project() {
    let template = web_template();
    let output = TempDir::new().unwrap();
    let root = output.path().join("My App");

    let report =
        run(&options(template.path(), root.clone(), flags(json!({"variant": "ts", "typescript": true, "router": true}))))
            .unwrap();

    assert_eq!(report.package_name, "my-app");
    let manifest: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(root.join("package.json")).unwrap()).unwrap();
    assert_eq!(
        manifest,
        json!({
            "name": "my-app",
            "version": "0.0.0",
            "scripts": {"dev": "vite"},
            "dependencies": {"axios": "^1.6", "vue": "^3.4", "vue-router": "^4.3"}
        })
    );
    let deps: Vec<&String> = manifest["dependencies"].as_object().unwrap().keys().collect();
    assert_eq!(deps, vec!["axios", "vue", "vue-router"]);

    assert_eq!(fs::read_to_string(root.join("index.html")).unwrap(), "<title>My App</title>\n");
    assert_eq!(fs::read_to_string(root.join(".env")).unwrap(), "PGDATABASE=my-app\nPGPASSWORD=postgres\n");
    assert_eq!(
        fs::read_to_string(root.join("src/router/index.ts")).unwrap(),
        "// router for my-app ts=true\n"
    );
    assert_eq!(fs::read_to_string(root.join(".gitignore")).unwrap(), "node_modules\n");
    assert!(root.join("src/main.ts").exists());
    assert!(!root.join("src/main.js").exists());
    assert!(root.join("tsconfig.json").exists());
    assert!(!root.join("jsconfig.json").exists());
    assert!(!root.join("README.plain.md").exists());
    assert!(!root.join("index.html.data.json").exists());
    assert!(!root.join("sprout.yaml").exists());
    assert!(report.files.iter().all(|f| !f.to_string_lossy().ends_with(".j2")));
}

#[test]
fn test_javascript_project_without_router() {
    let template = web_template();
    let output = TempDir::new().unwrap();
    let root = output.path().join("app");

    let report =
        run(&options(template.path(), root.clone(), flags(json!({"variant": "js", "typescript": false})))).unwrap();

    assert_eq!(report.variant, Variant::JavaScript);
    assert!(root.join("src/main.js").exists());
    assert!(!root.join("src/main.ts").exists());
    assert!(!root.join("tsconfig.json").exists());
    assert!(root.join("jsconfig.json").exists());
    assert!(!root.join("src/router").exists());
    assert!(root.join("README.plain.md").exists());
}

#[test]
fn test_runs_are_deterministic() {
    let template = web_template();
    let first = TempDir::new().unwrap();
    let second = TempDir::new().unwrap();
    let run_flags = flags(json!({"variant": "ts", "typescript": true, "router": true}));

    run(&options(template.path(), first.path().join("app"), run_flags.clone())).unwrap();
    run(&options(template.path(), second.path().join("app"), run_flags)).unwrap();

    assert!(!dir_diff::is_different(first.path().join("app"), second.path().join("app")).unwrap());
}

#[test]
fn test_production_generates_a_secret() {
    let template = web_template();
    let output = TempDir::new().unwrap();
    let root = output.path().join("app");
    let mut opts = options(template.path(), root.clone(), flags(json!({"variant": "ts"})));
    opts.production = true;

    run(&opts).unwrap();

    let env = fs::read_to_string(root.join(".env")).unwrap();
    let password = env.lines().find_map(|l| l.strip_prefix("PGPASSWORD=")).unwrap();
    assert_eq!(password.len(), 16);
    assert_ne!(password, "postgres");
}

#[test]
fn test_non_empty_output_requires_force() {
    let template = web_template();
    let output = TempDir::new().unwrap();
    let root = output.path().join("app");
    write(&root, "stale/old.txt", "stale");

    let result = run(&options(template.path(), root.clone(), flags(json!({}))));
    assert!(matches!(result, Err(Error::OutputDirectoryExistsError { .. })));
    assert!(root.join("stale/old.txt").exists());

    let mut opts = options(template.path(), root.clone(), flags(json!({})));
    opts.force = true;
    run(&opts).unwrap();
    assert!(!root.join("stale").exists());
    assert!(root.join("package.json").exists());
}

#[test]
fn test_git_only_output_is_reused() {
    let template = web_template();
    let output = TempDir::new().unwrap();
    let root = output.path().join("app");
    write(&root, ".git/HEAD", "ref: refs/heads/main\n");

    run(&options(template.path(), root.clone(), flags(json!({})))).unwrap();
    assert!(root.join(".git/HEAD").exists());
}

#[test]
fn test_render_failure_is_fatal() {
    let template = TempDir::new().unwrap();
    write(template.path(), "broken.txt.j2", "{{ nowhere }}");
    let output = TempDir::new().unwrap();

    let result = run(&options(template.path(), output.path().join("app"), flags(json!({}))));
    assert!(matches!(result, Err(Error::RenderFailure { .. })));
}

#[test]
fn test_missing_template() {
    let output = TempDir::new().unwrap();
    let result = run(&options(&output.path().join("nope"), output.path().join("app"), flags(json!({}))));
    assert!(matches!(result, Err(Error::TemplateDoesNotExistsError { .. })));
}

#[test]
fn test_missing_layer_directory() {
    let template = TempDir::new().unwrap();
    write(template.path(), "sprout.json", r#"{"layers": [{"dir": "base"}]}"#);
    let output = TempDir::new().unwrap();

    let result = run(&options(template.path(), output.path().join("app"), flags(json!({}))));
    assert!(matches!(result, Err(Error::TemplateDoesNotExistsError { .. })));
}

#[test]
fn test_emptied_directories_are_removed() {
    let template = TempDir::new().unwrap();
    write(template.path(), "data/index.html.data.json", r#"{"title": "demo"}"#);
    write(template.path(), "cfg/jsconfig.json", "{}\n");
    write(template.path(), "src/lib/util.js", "export {}\n");
    write(template.path(), "src/lib/util.ts", "export {}\n");
    fs::create_dir_all(template.path().join("public")).unwrap();
    let output = TempDir::new().unwrap();
    let root = output.path().join("app");

    let report = run(&options(template.path(), root.clone(), flags(json!({"variant": "ts"})))).unwrap();

    assert!(!root.join("data").exists());
    assert!(!root.join("cfg").exists());
    assert!(root.join("src/lib/util.ts").exists());
    assert!(root.join("public").is_dir());
    assert_eq!(report.removed, vec![PathBuf::from("cfg/jsconfig.json"), PathBuf::from("src/lib/util.js")]);
}

#[test]
fn test_reused_repository_is_left_alone() {
    let template = TempDir::new().unwrap();
    write(template.path(), "a.txt", "a\n");
    let output = TempDir::new().unwrap();
    let root = output.path().join("app");
    write(&root, ".git/jsconfig.json", "{}\n");
    write(&root, ".git/hooks/x.js", "hook\n");
    write(&root, ".git/notes.txt.j2", "{{ nowhere }}");

    let report = run(&options(template.path(), root.clone(), flags(json!({"variant": "ts"})))).unwrap();

    assert!(report.removed.is_empty());
    assert!(report.rendered.is_empty());
    assert_eq!(report.files, vec![PathBuf::from("a.txt")]);
    assert!(root.join(".git/jsconfig.json").exists());
    assert!(root.join(".git/hooks/x.js").exists());
    assert!(root.join(".git/notes.txt.j2").exists());
}

#[test]
fn test_force_keeps_the_repository() {
    let template = TempDir::new().unwrap();
    write(template.path(), "a.txt", "a\n");
    let output = TempDir::new().unwrap();
    let root = output.path().join("app");
    write(&root, ".git/HEAD", "ref: refs/heads/main\n");
    write(&root, "stale.txt", "stale");

    let mut opts = options(template.path(), root.clone(), flags(json!({})));
    opts.force = true;
    run(&opts).unwrap();

    assert!(root.join(".git/HEAD").exists());
    assert!(!root.join("stale.txt").exists());
}

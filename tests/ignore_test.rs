use sprout::constants::IGNORE_FILE;
use sprout::ignore::{is_ignored, parse_ignore_file};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use tempfile::TempDir;

#[test]
fn test_parse_ignore_file() {
    let temp_dir = TempDir::new().unwrap();

    // Test without .sproutignore
    let glob_set = parse_ignore_file(temp_dir.path()).unwrap();
    assert!(glob_set.is_match("sub/.DS_Store")); // Default pattern
    assert!(!glob_set.is_match("file.pyc"));

    // Test with .sproutignore
    let mut file = File::create(temp_dir.path().join(IGNORE_FILE)).unwrap();
    writeln!(file, "# compiled\n*.pyc\n\n**/__pycache__").unwrap();

    let glob_set = parse_ignore_file(temp_dir.path()).unwrap();
    assert!(glob_set.is_match("file.pyc"));
    assert!(glob_set.is_match("pkg/__pycache__"));
    assert!(glob_set.is_match("sub/.DS_Store")); // Default pattern still works
}

#[test]
fn test_ignored_ancestors() {
    let temp_dir = TempDir::new().unwrap();
    let glob_set = parse_ignore_file(temp_dir.path()).unwrap();

    assert!(is_ignored(&glob_set, Path::new("node_modules/vue/index.js")));
    assert!(is_ignored(&glob_set, Path::new("web/.git/config")));
    assert!(!is_ignored(&glob_set, Path::new("src/main.ts")));
}

#[test]
fn test_invalid_pattern() {
    let temp_dir = TempDir::new().unwrap();
    std::fs::write(temp_dir.path().join(IGNORE_FILE), "a[").unwrap();
    assert!(parse_ignore_file(temp_dir.path()).is_err());
}

use std::io;
use std::path::PathBuf;

use sprout::error::Error;

#[test]
fn test_error_conversion() {
    let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
    let sprout_err: Error = io_err.into();

    match sprout_err {
        Error::IoError(_) => (),
        _ => panic!("Expected IoError variant"),
    }
}

#[test]
fn test_error_display() {
    let err = Error::ConfigError("invalid config".to_string());
    assert_eq!(err.to_string(), "Configuration error: invalid config.");

    let err = Error::StructuralConflict { path: PathBuf::from("out/a.txt") };
    assert_eq!(err.to_string(), "Structural conflict: 'out/a.txt' was already written in this run.");

    let err = Error::CallbackFailure { dest: PathBuf::from("out/vite.config.js"), reason: "boom".to_string() };
    assert_eq!(err.to_string(), "Callback for 'out/vite.config.js' failed: boom.");

    let err = Error::CleanupAmbiguity { logical: "src/main.{ts|js}".to_string() };
    assert_eq!(err.to_string(), "Cleanup ambiguity: no variant form of 'src/main.{ts|js}' exists.");
}

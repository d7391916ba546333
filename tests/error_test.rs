use std::io;

use stencil::error::Error;
use stencil::ignore::RuleSet;

#[test]
fn test_error_conversion() {
    let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
    let err: Error = io_err.into();

    match err {
        Error::IoError(_) => (),
        _ => panic!("Expected IoError variant"),
    }
}

#[test]
fn test_error_display() {
    let err = Error::ConfigError("invalid config".to_string());
    assert_eq!(err.to_string(), "Configuration error: invalid config.");

    let err = Error::OutputDirectoryExistsError { output_dir: "widget".to_string() };
    assert_eq!(err.to_string(), "Output directory 'widget' already exists. Use --force to replace it.");

    let err = Error::file("src/main.cc", io::Error::new(io::ErrorKind::PermissionDenied, "denied"));
    assert_eq!(err.to_string(), "Cannot access 'src/main.cc': denied.");
}

#[test]
fn test_pattern_error_display() {
    let err = RuleSet::parse("tools", "[unclosed\n", "tools/.gitignore").unwrap_err();
    let message = err.to_string();
    assert!(message.starts_with("Invalid ignore pattern '[unclosed' in 'tools/.gitignore'"), "{message}");
}

use std::io;
use std::path::PathBuf;

use prjtpl::error::Error;

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

    let err = Error::MappingError {
        source_path: PathBuf::from("/etc/passwd"),
        template_root: PathBuf::from("/tpl"),
    };
    assert_eq!(err.to_string(), "Path '/etc/passwd' does not belong to the template '/tpl'.");

    let err = Error::fs("/out/a.txt", io::Error::new(io::ErrorKind::PermissionDenied, "denied"));
    assert_eq!(err.to_string(), "Filesystem error at '/out/a.txt': denied.");
}

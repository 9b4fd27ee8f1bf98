//! Error handling for prjtpl.
//! Defines the error type and result alias used throughout the engine and the CLI.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while scaffolding a project.
///
/// Every variant aborts the current `process()` run. Nothing is retried and the
/// destination tree may be left partially populated.
#[derive(Error, Debug)]
pub enum Error {
    /// A source path does not live under the template root.
    #[error("Path '{}' does not belong to the template '{}'.", source_path.display(), template_root.display())]
    MappingError { source_path: PathBuf, template_root: PathBuf },

    /// Open, read, write or mkdir failure on a specific path.
    #[error("Filesystem error at '{}': {source}.", path.display())]
    FileSystemError {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The project directory exists and overwriting was not requested
    #[error("Output directory '{output_dir}' already exists. Use --force to overwrite it.")]
    OutputDirectoryExistsError { output_dir: String },

    /// Represents I/O errors not tied to a template path
    #[error("IO error: {0}.")]
    IoError(#[from] io::Error),

    /// The external generator could not be spawned or exited unsuccessfully
    #[error("External generator error: {0}.")]
    ExternalProcessError(String),

    #[error("Invalid pattern: {0}.")]
    PatternError(#[from] regex::Error),

    #[error("Invalid glob: {0}.")]
    GlobError(#[from] globset::Error),

    /// Represents errors that occur while reading the substitution config
    #[error("Configuration error: {0}.")]
    ConfigError(String),

    #[error("Prompt error: {0}.")]
    PromptError(#[from] dialoguer::Error),

    /// Represents failures while initialising the project repository
    #[error("Git error: {0}.")]
    Git2Error(#[from] git2::Error),
}

impl Error {
    /// Wraps an I/O error together with the path it happened on.
    pub fn fs<P: Into<PathBuf>>(path: P, source: io::Error) -> Self {
        Error::FileSystemError { path: path.into(), source }
    }
}

/// Convenience type alias for Results with [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Default error handler that prints the error and exits the program.
///
/// # Behavior
/// Prints the error message to stderr and exits with status code 1
pub fn default_error_handler(err: Error) {
    eprintln!("{}", err);
    std::process::exit(1);
}

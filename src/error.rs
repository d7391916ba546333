//! Error handling for Stencil.
//! Defines the error type and result alias used throughout the application.

use std::io;
use thiserror::Error;

/// Errors that stop a Stencil run.
///
/// Unresolved template variables are deliberately absent: they are collected while
/// copying and reported as a warning once the output tree is complete.
#[derive(Error, Debug)]
pub enum Error {
    /// Represents errors that occur during file system operations
    #[error("IO error: {0}.")]
    IoError(#[from] io::Error),

    /// File system error tied to a specific path
    #[error("Cannot access '{path}': {source}.")]
    FileError {
        path: String,
        #[source]
        source: io::Error,
    },

    /// Malformed glob in an ignore file
    #[error("Invalid ignore pattern '{pattern}' in '{ignore_file}': {source}.")]
    PatternError {
        pattern: String,
        ignore_file: String,
        #[source]
        source: globset::Error,
    },

    /// Failure while traversing the template directory
    #[error("Template traversal error: {0}.")]
    WalkDirError(#[from] walkdir::Error),

    /// Failure reported by libgit2
    #[error("Git error: {0}.")]
    Git2Error(#[from] git2::Error),

    /// Represents errors that occur during configuration parsing or processing
    #[error("Configuration error: {0}.")]
    ConfigError(String),

    /// Variable name that can never appear inside a placeholder
    #[error("Invalid variable '{name}': names may only contain letters, digits and '_'.")]
    InvalidVariableError { name: String },

    #[error("Template directory '{template_dir}' does not exist.")]
    TemplateDoesNotExistsError { template_dir: String },

    #[error("Output directory '{output_dir}' already exists. Use --force to replace it.")]
    OutputDirectoryExistsError { output_dir: String },
}

impl Error {
    /// Wraps an [`io::Error`] together with the path it was raised for.
    pub fn file<P: AsRef<std::path::Path>>(path: P, source: io::Error) -> Self {
        Error::FileError { path: path.as_ref().display().to_string(), source }
    }
}

/// Convenience type alias for Results with [`Error`] as the error type.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Default error handler that prints the error and exits the program.
///
/// # Behavior
/// Prints the error message to stderr and exits with status code 1
pub fn default_error_handler(err: Error) {
    eprintln!("{err}");
    std::process::exit(1);
}

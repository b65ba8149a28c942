// ABOUTME: Error types for vshell — archive extraction and action log failures.
// ABOUTME: Command-level problems (bad args, missing paths) are reported by the shell, not here.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ShellError {
    #[error("Error opening tar file: {}: {source}", path.display())]
    ArchiveOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Error extracting tar file: {}: {source}", path.display())]
    ArchiveExtract {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not create working directory: {0}")]
    Workdir(#[source] std::io::Error),

    #[error("Corrupt action log {}: {reason}", path.display())]
    CorruptLog { path: PathBuf, reason: String },

    #[error("Action log I/O error on {}: {source}", path.display())]
    LogIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ShellError>;

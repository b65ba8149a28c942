// ABOUTME: Tar extraction into a fresh temporary working directory.
// ABOUTME: The directory is removed when the Workspace drops unless it is explicitly kept.

use std::fs::File;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::info;

use crate::error::{Result, ShellError};

/// An extracted archive living in its own temporary directory.
#[derive(Debug)]
pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    /// Create a temporary directory and unpack the whole archive into it.
    pub fn extract(archive: &Path) -> Result<Self> {
        let file = File::open(archive).map_err(|source| ShellError::ArchiveOpen {
            path: archive.to_path_buf(),
            source,
        })?;

        let dir = tempfile::Builder::new()
            .prefix("vshell-")
            .tempdir()
            .map_err(ShellError::Workdir)?;

        tar::Archive::new(file)
            .unpack(dir.path())
            .map_err(|source| ShellError::ArchiveExtract {
                path: archive.to_path_buf(),
                source,
            })?;

        info!(
            archive = %archive.display(),
            workdir = %dir.path().display(),
            "Extracted archive"
        );
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Stop managing the directory so it survives the process.
    pub fn keep(self) -> PathBuf {
        self.dir.keep()
    }
}

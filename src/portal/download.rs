//! Per-session download channel.
//!
//! A session owns one temporary root; each export gets its own subdirectory so
//! that only the file triggered by that export can arrive there. Subdirectories
//! are removed when the export ends, the root when the session closes.

use crate::error::DriverError;
use crate::portal::driver::Driver;
use std::io;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const ROOT_PREFIX: &str = "linznetz-session-";

pub struct DownloadChannel {
    root: TempDir,
    sequence: u32,
}

impl DownloadChannel {
    /// Creates the session root in `parent`, or in the system temp dir.
    pub fn create(parent: Option<&Path>) -> io::Result<Self> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(ROOT_PREFIX);
        let root = match parent {
            Some(parent) => {
                std::fs::create_dir_all(parent)?;
                builder.tempdir_in(parent)?
            }
            None => builder.tempdir()?,
        };
        tracing::debug!(root = %root.path().display(), "Created download root");
        Ok(Self { root, sequence: 0 })
    }

    pub fn root(&self) -> &Path {
        self.root.path()
    }

    /// Creates a fresh export directory and routes downloads into it.
    pub async fn arm<D: Driver>(&mut self, driver: &D) -> Result<ExportDir, DriverError> {
        self.sequence += 1;
        let path = self.root.path().join(format!("export-{:04}", self.sequence));
        if path.exists() {
            std::fs::remove_dir_all(&path)?;
        }
        std::fs::create_dir_all(&path)?;
        let dir = ExportDir {
            path,
            released: false,
        };
        driver.set_download_target(Some(dir.path())).await?;
        tracing::debug!(dir = %dir.path().display(), "Armed download directory");
        Ok(dir)
    }

    /// Stops routing downloads and removes the export directory.
    ///
    /// Both steps always run; the first failure is returned.
    pub async fn disarm<D: Driver>(&self, driver: &D, dir: ExportDir) -> Result<(), DriverError> {
        let reset = driver.set_download_target(None).await;
        let removed = dir.remove().map_err(DriverError::from);
        reset.and(removed)
    }

    /// Removes the session root and everything left under it.
    pub fn close(self) -> io::Result<()> {
        let root = self.root.path().to_path_buf();
        self.root.close()?;
        tracing::debug!(root = %root.display(), "Removed download root");
        Ok(())
    }
}

/// Directory that receives exactly one export. Removed on drop.
#[derive(Debug)]
pub struct ExportDir {
    path: PathBuf,
    released: bool,
}

impl ExportDir {
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn remove(mut self) -> io::Result<()> {
        self.released = true;
        match std::fs::remove_dir_all(&self.path) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
            _ => Ok(()),
        }
    }
}

impl Drop for ExportDir {
    fn drop(&mut self) {
        if !self.released {
            let _ = std::fs::remove_dir_all(&self.path);
        }
    }
}

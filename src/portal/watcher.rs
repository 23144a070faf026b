//! Waits for an exported file to land in a download directory.

use crate::error::PortalError;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::time::Instant;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Suffixes browsers use while a download is still being written.
const IN_PROGRESS_SUFFIXES: &[&str] = &[".crdownload", ".tmp", ".part"];

/// A file that finished arriving.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArrivedFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, Copy)]
pub struct FileArrivalWatcher {
    poll_interval: Duration,
    timeout: Duration,
}

impl FileArrivalWatcher {
    pub fn new(timeout: Duration) -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            timeout,
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Polls `dir` until one complete file is present and returns its content.
    ///
    /// A file counts as complete when it has no in-progress suffix, its size is
    /// the same on two consecutive polls and it can be read in full. More than
    /// one file without an in-progress suffix is an ambiguous artifact.
    pub async fn wait(&self, dir: &Path) -> Result<ArrivedFile, PortalError> {
        let deadline = Instant::now() + self.timeout;
        let mut sizes: HashMap<PathBuf, u64> = HashMap::new();

        loop {
            let found = candidates(dir).await;
            if found.len() > 1 {
                return Err(PortalError::AmbiguousArtifact {
                    directory: dir.to_path_buf(),
                    files: found.iter().map(|(path, _)| file_name(path)).collect(),
                });
            }

            let mut seen = HashMap::new();
            for (path, size) in found {
                if sizes.get(&path) == Some(&size) {
                    match tokio::fs::read(&path).await {
                        Ok(bytes) if bytes.len() as u64 == size => {
                            let file_name = file_name(&path);
                            tracing::debug!(file = file_name.as_str(), size, "Download arrived");
                            return Ok(ArrivedFile { file_name, bytes });
                        }
                        Ok(_) => {}
                        Err(e) => {
                            tracing::trace!(path = %path.display(), error = %e, "Download not readable yet");
                        }
                    }
                }
                seen.insert(path, size);
            }
            sizes = seen;

            if Instant::now() >= deadline {
                return Err(PortalError::DownloadTimeout {
                    directory: dir.to_path_buf(),
                    timeout: self.timeout,
                });
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Regular files in `dir` that are not in-progress downloads, sorted by name.
async fn candidates(dir: &Path) -> Vec<(PathBuf, u64)> {
    let mut found = Vec::new();
    let Ok(mut entries) = tokio::fs::read_dir(dir).await else {
        return found;
    };
    while let Ok(Some(entry)) = entries.next_entry().await {
        let name = entry.file_name().to_string_lossy().into_owned();
        if IN_PROGRESS_SUFFIXES.iter().any(|suffix| name.ends_with(suffix)) {
            continue;
        }
        match entry.metadata().await {
            Ok(metadata) if metadata.is_file() => found.push((entry.path(), metadata.len())),
            _ => {}
        }
    }
    found.sort();
    found
}

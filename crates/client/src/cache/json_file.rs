//! JSON file implementation of the cart cache.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use ladle_core::CartLine;

use super::CartCache;

/// Cart cache backed by a single JSON file.
///
/// The whole line sequence is serialized under one path - the file is the
/// "single key" of the cache. Writes are whole-state overwrites,
/// last-write-wins, no diffing.
pub struct JsonFileCache {
    path: PathBuf,
}

impl JsonFileCache {
    /// Create a cache over the given file path.
    ///
    /// The file and its parent directories are created lazily on first save.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The backing file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CartCache for JsonFileCache {
    fn load(&self) -> Vec<CartLine> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no cart cache yet, starting empty");
                return Vec::new();
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "failed to read cart cache, starting empty");
                return Vec::new();
            }
        };

        match serde_json::from_slice::<Vec<CartLine>>(&bytes) {
            Ok(lines) => {
                debug!(path = %self.path.display(), lines = lines.len(), "loaded cart cache");
                lines
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "corrupt cart cache, starting empty");
                Vec::new()
            }
        }
    }

    fn save(&self, lines: &[CartLine]) {
        let parent = self.path.parent().filter(|p| !p.as_os_str().is_empty());
        if let Some(parent) = parent {
            if let Err(e) = fs::create_dir_all(parent) {
                warn!(path = %self.path.display(), error = %e, "failed to create cart cache directory");
                return;
            }
        }

        let json = match serde_json::to_vec(lines) {
            Ok(json) => json,
            Err(e) => {
                warn!(error = %e, "failed to serialize cart cache");
                return;
            }
        };

        if let Err(e) = fs::write(&self.path, json) {
            warn!(path = %self.path.display(), error = %e, "failed to write cart cache");
        }
    }
}

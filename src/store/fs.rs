//! Directory-backed store: one pretty-printed JSON file per key.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde_json::Value;

use super::{validate_key, BlobStore};
use crate::errors::StoreError;

const TEMP_SUFFIX: &str = ".tmp";

/// A [`BlobStore`] rooted at a local directory.
#[derive(Debug, Clone)]
pub struct FsBlobStore {
    root: PathBuf,
}

impl FsBlobStore {
    /// Creates a store rooted at `root`. The directory is created on first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The store root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StoreError> {
        validate_key(key)?;
        Ok(key.split('/').fold(self.root.clone(), |path, segment| path.join(segment)))
    }

    fn io_error(key: &str, source: io::Error) -> StoreError {
        StoreError::Io {
            key: key.to_string(),
            source,
        }
    }

    /// Collects keys of every file under `dir`, relative to the root.
    fn walk(&self, dir: &Path, keys: &mut Vec<String>) -> Result<(), StoreError> {
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(Self::io_error(&dir.display().to_string(), e)),
        };

        for entry in entries {
            let entry = entry.map_err(|e| Self::io_error(&dir.display().to_string(), e))?;
            let path = entry.path();
            let file_type = entry
                .file_type()
                .map_err(|e| Self::io_error(&path.display().to_string(), e))?;

            if file_type.is_dir() {
                self.walk(&path, keys)?;
            } else if file_type.is_file() {
                if path.to_string_lossy().ends_with(TEMP_SUFFIX) {
                    continue;
                }
                if let Ok(relative) = path.strip_prefix(&self.root) {
                    let key = relative
                        .components()
                        .map(|c| c.as_os_str().to_string_lossy())
                        .collect::<Vec<_>>()
                        .join("/");
                    keys.push(key);
                }
            }
        }
        Ok(())
    }
}

impl BlobStore for FsBlobStore {
    fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        let path = self.path_for(key)?;
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(Self::io_error(key, e)),
        };

        serde_json::from_str(&content)
            .map(Some)
            .map_err(|source| StoreError::Parse {
                key: key.to_string(),
                source,
            })
    }

    /// Writes through a temp file and renames it over the target.
    fn put(&self, key: &str, document: &Value) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| Self::io_error(key, e))?;
        }

        let content = serde_json::to_string_pretty(document).map_err(|source| {
            StoreError::Parse {
                key: key.to_string(),
                source,
            }
        })?;

        let mut temp_name = path.clone().into_os_string();
        temp_name.push(TEMP_SUFFIX);
        let temp_path = PathBuf::from(temp_name);

        fs::write(&temp_path, content).map_err(|e| Self::io_error(key, e))?;
        fs::rename(&temp_path, &path).map_err(|e| Self::io_error(key, e))?;

        tracing::debug!("stored {key} at {}", path.display());
        Ok(())
    }

    fn list(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        // Start at the deepest directory the prefix names
        let dir_part = prefix.rsplit_once('/').map_or("", |(dir, _)| dir);
        let start = if dir_part.is_empty() {
            self.root.clone()
        } else {
            self.path_for(dir_part)?
        };

        let mut keys = Vec::new();
        self.walk(&start, &mut keys)?;
        keys.retain(|key| key.starts_with(prefix));
        keys.sort();
        Ok(keys)
    }
}

//! On-disk manifest persistence.
//!
//! [`ManifestStore`] keeps one JSON file per application in a directory:
//!
//! ```text
//! {dir}/
//! +-- tree_gitea.json     # {"tree": [{"path": "en-US/intro", "sha": "..."}]}
//! +-- tree_macaron.json
//! ```
//!
//! Writes go through a temporary file in the same directory followed by a
//! rename, so a reader never observes a half-written manifest.

use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::layout::manifest_file_name;
use crate::tree::Manifest;

/// Error loading or saving a manifest.
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    /// Local read/write/create failure.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        /// Manifest file (or directory) involved.
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// Persisted manifest is not valid JSON or has the wrong shape.
    #[error("Malformed manifest {}: {source}", path.display())]
    Decode {
        /// Manifest file that failed to decode.
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl ManifestError {
    fn io(path: &Path, source: io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Per-application manifest files rooted at a directory.
#[derive(Clone, Debug)]
pub struct ManifestStore {
    dir: PathBuf,
}

impl ManifestStore {
    /// Create a store rooted at `dir`. The directory is created on first save.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory holding the manifest files.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Manifest file path for an application.
    #[must_use]
    pub fn path_for(&self, app: &str) -> PathBuf {
        self.dir.join(manifest_file_name(app))
    }

    /// Whether a manifest has been persisted for `app`.
    #[must_use]
    pub fn exists(&self, app: &str) -> bool {
        self.path_for(app).is_file()
    }

    /// Load the manifest for `app`.
    ///
    /// Returns `Ok(None)` when no manifest has been saved yet.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError::Io`] if the file exists but cannot be read and
    /// [`ManifestError::Decode`] if its content is malformed.
    pub fn load(&self, app: &str) -> Result<Option<Manifest>, ManifestError> {
        let path = self.path_for(app);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(ManifestError::io(&path, e)),
        };

        let manifest: Manifest = serde_json::from_slice(&bytes)
            .map_err(|source| ManifestError::Decode { path, source })?;
        Ok(Some(manifest))
    }

    /// Persist the manifest for `app`, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError::Io`] if the directory cannot be created or the
    /// file cannot be written.
    pub fn save(&self, app: &str, manifest: &Manifest) -> Result<(), ManifestError> {
        fs::create_dir_all(&self.dir).map_err(|e| ManifestError::io(&self.dir, e))?;

        let path = self.path_for(app);
        let tmp = NamedTempFile::new_in(&self.dir).map_err(|e| ManifestError::io(&path, e))?;
        {
            let mut writer = BufWriter::new(tmp.as_file());
            serde_json::to_writer_pretty(&mut writer, manifest)
                .map_err(|e| ManifestError::io(&path, io::Error::other(e)))?;
            writer.flush().map_err(|e| ManifestError::io(&path, e))?;
        }
        tmp.persist(&path)
            .map_err(|e| ManifestError::io(&path, e.error))?;

        tracing::debug!(app, entries = manifest.len(), path = %path.display(), "Saved manifest");
        Ok(())
    }
}

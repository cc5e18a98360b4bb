//! Writing fetched files into the local mirror.

use std::fs;
use std::path::{Path, PathBuf};

use docmirror_manifest::layout::{is_safe_name, local_file_name, mirror_path};

/// Error writing one file into the mirror.
#[derive(Debug, thiserror::Error)]
pub enum MaterializeError {
    /// Directory creation or file write failed.
    #[error("Failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Name would escape the application directory.
    #[error("Refusing to write unsafe path {0:?}")]
    UnsafeName(String),
}

/// Writes files under `<data_dir>/docs/<app>/`.
///
/// Documents get their markup extension back; images and structured data
/// are written under their canonical name unchanged.
#[derive(Clone, Debug)]
pub struct Materializer {
    data_dir: PathBuf,
}

impl Materializer {
    #[must_use]
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Local path for a canonical name.
    #[must_use]
    pub fn local_path(&self, app: &str, name: &str) -> PathBuf {
        self.data_dir.join(mirror_path(app, &local_file_name(name)))
    }

    /// Write one file, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns [`MaterializeError::UnsafeName`] for names with empty, `.` or
    /// `..` segments, and [`MaterializeError::Io`] if the write fails.
    pub fn write(&self, app: &str, name: &str, bytes: &[u8]) -> Result<PathBuf, MaterializeError> {
        if !is_safe_name(name) {
            return Err(MaterializeError::UnsafeName(name.to_owned()));
        }

        let path = self.local_path(app, name);
        if let Some(parent) = path.parent() {
            create_dir(parent)?;
        }
        fs::write(&path, bytes).map_err(|source| MaterializeError::Io {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }

    /// Ensure `<data_dir>/docs/<app>/<lang>` exists.
    ///
    /// # Errors
    ///
    /// Returns [`MaterializeError::Io`] if the directory cannot be created.
    pub fn ensure_language_dir(&self, app: &str, lang: &str) -> Result<PathBuf, MaterializeError> {
        let dir = self.data_dir.join(mirror_path(app, lang));
        create_dir(&dir)?;
        Ok(dir)
    }
}

fn create_dir(dir: &Path) -> Result<(), MaterializeError> {
    fs::create_dir_all(dir).map_err(|source| MaterializeError::Io {
        path: dir.to_path_buf(),
        source,
    })
}

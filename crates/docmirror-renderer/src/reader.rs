//! Reading and rendering documents from the local mirror.

use std::fs;
use std::path::{Path, PathBuf};

use docmirror_manifest::layout::{MARKUP_EXT, is_asset, is_safe_name, mirror_path};

use crate::document::{Document, is_renderable};

/// Error reading a mirrored document.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// Source file could not be read.
    #[error("Failed to load {}: {source}", path.display())]
    Io {
        /// File that failed to load.
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Renders documents straight from the mirror under a data directory.
///
/// Cache keys (`<lang>/<name>`) resolve to `<data_dir>/docs/<app>/<lang>/<name>.md`.
#[derive(Clone, Debug)]
pub struct MirrorReader {
    data_dir: PathBuf,
}

impl MirrorReader {
    #[must_use]
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    #[must_use]
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Markup file backing a cache key.
    #[must_use]
    pub fn source_path(&self, app: &str, key: &str) -> PathBuf {
        let file = format!("{}{MARKUP_EXT}", mirror_path(app, key));
        self.data_dir.join(file)
    }

    /// Render the document for a cache key.
    ///
    /// Returns `Ok(None)` for keys that are not leaf documents (images,
    /// structured data, language roots) and for keys that would resolve
    /// outside the application directory.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Io`] if an eligible file cannot be read.
    pub fn try_document(&self, app: &str, key: &str) -> Result<Option<Document>, RenderError> {
        if !is_safe_name(key) || is_asset(key) || !is_renderable(&mirror_path(app, key)) {
            return Ok(None);
        }

        let path = self.source_path(app, key);
        let raw = fs::read(&path).map_err(|source| RenderError::Io { path, source })?;
        Ok(Some(Document::parse(&String::from_utf8_lossy(&raw))))
    }

    /// Render the document for a cache key, logging read failures.
    #[must_use]
    pub fn document(&self, app: &str, key: &str) -> Option<Document> {
        self.try_document(app, key).unwrap_or_else(|e| {
            tracing::error!(app, key, error = %e, "Failed to load document");
            None
        })
    }
}

//! Remote tree entries and the persisted manifest.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Kind of a remote tree entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    /// Regular file.
    Blob,
    /// Directory.
    Tree,
    /// Anything else the host reports (e.g. submodule commits).
    #[serde(other)]
    Other,
}

/// One entry of a recursive remote tree listing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeNode {
    /// Path relative to the repository root (e.g. `en-US/intro/setup.md`).
    pub path: String,
    /// Opaque content hash (a blob id for git hosts).
    #[serde(rename = "sha")]
    pub content_hash: String,
    /// Entry kind.
    #[serde(rename = "type")]
    pub kind: NodeKind,
}

impl TreeNode {
    /// Create a blob entry.
    #[must_use]
    pub fn blob(path: impl Into<String>, content_hash: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content_hash: content_hash.into(),
            kind: NodeKind::Blob,
        }
    }

    /// Create a tree (directory) entry.
    #[must_use]
    pub fn tree(path: impl Into<String>, content_hash: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content_hash: content_hash.into(),
            kind: NodeKind::Tree,
        }
    }

    /// Whether this entry is a regular file.
    #[must_use]
    pub fn is_blob(&self) -> bool {
        self.kind == NodeKind::Blob
    }
}

/// Persisted `(canonical name, content hash)` pair.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    /// Canonical document name (markup extension stripped).
    pub path: String,
    /// Content hash the local copy was fetched at.
    #[serde(rename = "sha")]
    pub content_hash: String,
}

impl ManifestEntry {
    #[must_use]
    pub fn new(path: impl Into<String>, content_hash: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content_hash: content_hash.into(),
        }
    }
}

/// Last-known snapshot of one application's documentation tree.
///
/// Entries keep insertion order and paths are unique: inserting a path that
/// already exists replaces its hash in place. A path-to-position index keeps
/// lookups and inserts constant time.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "StoredManifest")]
pub struct Manifest {
    #[serde(rename = "tree")]
    entries: Vec<ManifestEntry>,
    #[serde(skip)]
    positions: HashMap<String, usize>,
}

/// On-disk shape of a [`Manifest`].
#[derive(Deserialize)]
struct StoredManifest {
    tree: Vec<ManifestEntry>,
}

impl From<StoredManifest> for Manifest {
    fn from(stored: StoredManifest) -> Self {
        Self::new(stored.tree)
    }
}

impl Manifest {
    /// Build a manifest, collapsing duplicate paths (last hash wins).
    #[must_use]
    pub fn new(entries: impl IntoIterator<Item = ManifestEntry>) -> Self {
        let mut manifest = Self::default();
        for entry in entries {
            manifest.insert(entry.path, entry.content_hash);
        }
        manifest
    }

    /// Entries in insertion order.
    #[must_use]
    pub fn entries(&self) -> &[ManifestEntry] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Content hash recorded for a canonical name.
    #[must_use]
    pub fn hash_of(&self, path: &str) -> Option<&str> {
        let idx = *self.positions.get(path)?;
        Some(self.entries[idx].content_hash.as_str())
    }

    /// Insert or replace the hash for `path`.
    pub fn insert(&mut self, path: impl Into<String>, content_hash: impl Into<String>) {
        let path = path.into();
        let content_hash = content_hash.into();
        if let Some(&idx) = self.positions.get(&path) {
            self.entries[idx].content_hash = content_hash;
        } else {
            self.positions.insert(path.clone(), self.entries.len());
            self.entries.push(ManifestEntry { path, content_hash });
        }
    }

    /// Remove the entry for `path`, returning its hash.
    pub fn remove(&mut self, path: &str) -> Option<String> {
        let idx = self.positions.remove(path)?;
        let removed = self.entries.remove(idx);
        for entry in &self.entries[idx..] {
            if let Some(pos) = self.positions.get_mut(&entry.path) {
                *pos -= 1;
            }
        }
        Some(removed.content_hash)
    }

    /// Borrowed `path -> hash` lookup table.
    #[must_use]
    pub fn index(&self) -> HashMap<&str, &str> {
        self.entries
            .iter()
            .map(|e| (e.path.as_str(), e.content_hash.as_str()))
            .collect()
    }

    /// Return a copy with entries sorted by path.
    #[must_use]
    pub fn normalized(&self) -> Self {
        let mut entries = self.entries.clone();
        entries.sort_by(|a, b| a.path.cmp(&b.path));
        Self::new(entries)
    }
}

//! Mock remote implementation for testing.
//!
//! Provides [`MockRemote`] for exercising the sync pipeline without network
//! access.

use std::collections::{HashMap, HashSet};
use std::sync::RwLock;
use std::sync::atomic::{AtomicUsize, Ordering};

use docmirror_manifest::TreeNode;

use crate::RemoteSource;
use crate::error::FetchError;

/// In-memory repositories keyed by repository identifier.
///
/// Files can be added or changed between sync cycles through `&self`
/// methods, and individual tree or file fetches can be made to fail.
///
/// # Example
///
/// ```ignore
/// use docmirror_remote::{MockRemote, RemoteSource};
///
/// let remote = MockRemote::new()
///     .with_file("o/r", "en-US/intro.md", "h1", "# Intro\nHello");
///
/// let tree = remote.fetch_tree("o/r").unwrap();
/// let bytes = remote.fetch_raw("o/r", "en-US/intro.md").unwrap();
/// ```
#[derive(Debug, Default)]
pub struct MockRemote {
    trees: RwLock<HashMap<String, Vec<TreeNode>>>,
    files: RwLock<HashMap<(String, String), Vec<u8>>>,
    failing_trees: RwLock<HashSet<String>>,
    failing_files: RwLock<HashSet<(String, String)>>,
    raw_size_limit: Option<u64>,
    tree_fetches: AtomicUsize,
    raw_fetches: AtomicUsize,
}

impl MockRemote {
    /// Create an empty mock remote.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a blob with content.
    ///
    /// # Panics
    ///
    /// Panics if an internal lock is poisoned.
    #[must_use]
    pub fn with_file(
        self,
        repo: &str,
        path: &str,
        content_hash: &str,
        content: impl Into<Vec<u8>>,
    ) -> Self {
        self.put_file(repo, path, content_hash, content);
        self
    }

    /// Reject file bodies larger than `limit` bytes with
    /// [`FetchError::TooLarge`], as the HTTP client does.
    #[must_use]
    pub fn with_size_limit(mut self, limit: u64) -> Self {
        self.raw_size_limit = Some(limit);
        self
    }

    /// Add a directory entry.
    ///
    /// # Panics
    ///
    /// Panics if an internal lock is poisoned.
    #[must_use]
    pub fn with_dir(self, repo: &str, path: &str) -> Self {
        self.trees
            .write()
            .unwrap()
            .entry(repo.to_owned())
            .or_default()
            .push(TreeNode::tree(path, format!("tree:{path}")));
        self
    }

    /// Add or replace a blob.
    ///
    /// # Panics
    ///
    /// Panics if an internal lock is poisoned.
    pub fn put_file(
        &self,
        repo: &str,
        path: &str,
        content_hash: &str,
        content: impl Into<Vec<u8>>,
    ) {
        let mut trees = self.trees.write().unwrap();
        let tree = trees.entry(repo.to_owned()).or_default();
        if let Some(node) = tree.iter_mut().find(|n| n.path == path) {
            node.content_hash = content_hash.to_owned();
        } else {
            tree.push(TreeNode::blob(path, content_hash));
        }
        self.files
            .write()
            .unwrap()
            .insert((repo.to_owned(), path.to_owned()), content.into());
    }

    /// Make `fetch_tree` fail for a repository.
    ///
    /// # Panics
    ///
    /// Panics if an internal lock is poisoned.
    pub fn fail_tree(&self, repo: &str) {
        self.failing_trees.write().unwrap().insert(repo.to_owned());
    }

    /// Make `fetch_raw` fail for one file.
    ///
    /// # Panics
    ///
    /// Panics if an internal lock is poisoned.
    pub fn fail_file(&self, repo: &str, path: &str) {
        self.failing_files
            .write()
            .unwrap()
            .insert((repo.to_owned(), path.to_owned()));
    }

    /// Number of `fetch_tree` calls so far.
    #[must_use]
    pub fn tree_fetches(&self) -> usize {
        self.tree_fetches.load(Ordering::SeqCst)
    }

    /// Number of `fetch_raw` calls so far.
    #[must_use]
    pub fn raw_fetches(&self) -> usize {
        self.raw_fetches.load(Ordering::SeqCst)
    }
}

impl RemoteSource for MockRemote {
    fn fetch_tree(&self, repo: &str) -> Result<Vec<TreeNode>, FetchError> {
        self.tree_fetches.fetch_add(1, Ordering::SeqCst);
        if self.failing_trees.read().unwrap().contains(repo) {
            return Err(FetchError::HttpResponse {
                status: 503,
                body: "mock tree failure".to_owned(),
            });
        }
        self.trees
            .read()
            .unwrap()
            .get(repo)
            .cloned()
            .ok_or_else(|| FetchError::NotFound(repo.to_owned()))
    }

    fn fetch_raw(&self, repo: &str, path: &str) -> Result<Vec<u8>, FetchError> {
        self.raw_fetches.fetch_add(1, Ordering::SeqCst);
        let key = (repo.to_owned(), path.to_owned());
        if self.failing_files.read().unwrap().contains(&key) {
            return Err(FetchError::HttpResponse {
                status: 500,
                body: "mock file failure".to_owned(),
            });
        }
        let bytes = self
            .files
            .read()
            .unwrap()
            .get(&key)
            .cloned()
            .ok_or_else(|| FetchError::NotFound(format!("{repo}/{path}")))?;

        match self.raw_size_limit {
            Some(limit) if bytes.len() as u64 > limit => Err(FetchError::TooLarge {
                path: path.to_owned(),
                limit,
            }),
            _ => Ok(bytes),
        }
    }
}

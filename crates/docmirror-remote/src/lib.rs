//! Remote repository access for docmirror.
//!
//! The [`RemoteSource`] trait is the whole contract the sync pipeline needs
//! from a source-control host: a recursive tree listing of the default
//! branch, and raw bytes for one file.
//!
//! # Implementations
//!
//! - [`GithubClient`]: GitHub REST tree API plus raw content host, over `ureq`
//! - [`MockRemote`]: in-memory repositories for tests (behind the `mock` feature)

mod client;
mod error;
#[cfg(feature = "mock")]
mod mock;

use docmirror_manifest::TreeNode;

pub use client::{GithubClient, GithubConfig};
pub use error::FetchError;
#[cfg(feature = "mock")]
pub use mock::MockRemote;

/// Source-control host holding documentation repositories.
///
/// Repository identifiers are host-specific (`owner/name` for GitHub).
pub trait RemoteSource: Send + Sync {
    /// Full recursive tree of the repository's default branch.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] on network, authentication or decoding failure.
    fn fetch_tree(&self, repo: &str) -> Result<Vec<TreeNode>, FetchError>;

    /// Raw content of one file, addressed by its path in the tree listing.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] on network or authentication failure, or when
    /// the file does not exist.
    fn fetch_raw(&self, repo: &str, path: &str) -> Result<Vec<u8>, FetchError>;
}

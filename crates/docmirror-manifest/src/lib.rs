//! Remote tree manifests and change detection for docmirror.
//!
//! A manifest is the last-known snapshot of a documentation repository:
//! one `(path, content hash)` pair per tracked file. This crate provides:
//!
//! - [`TreeNode`]: one entry of a freshly fetched remote tree listing
//! - [`Manifest`]: the persisted snapshot, keyed by canonical document name
//! - [`ManifestStore`]: per-application JSON persistence on local disk
//! - [`detect_changes`]: set difference between a fetched tree and a manifest
//! - [`layout`]: the single home of path and key normalization rules
//!
//! # Example
//!
//! ```
//! use docmirror_manifest::{Manifest, ManifestEntry, TreeNode, detect_changes};
//!
//! let previous = Manifest::new(vec![ManifestEntry::new("en-US/intro", "h1")]);
//! let fetched = vec![
//!     TreeNode::blob("en-US/intro.md", "h2"),
//!     TreeNode::blob("en-US/setup.md", "h3"),
//! ];
//!
//! let changes = detect_changes(&fetched, Some(&previous));
//! assert_eq!(changes.pending_names(), vec!["en-US/intro", "en-US/setup"]);
//! ```

mod detect;
pub mod layout;
mod store;
mod tree;

pub use detect::{ChangeSet, PendingFile, detect_changes};
pub use store::{ManifestError, ManifestStore};
pub use tree::{Manifest, ManifestEntry, NodeKind, TreeNode};

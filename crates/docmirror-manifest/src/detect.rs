//! Change detection between a fetched remote tree and the last manifest.

use crate::layout::{canonical_name, is_tracked};
use crate::tree::{Manifest, TreeNode};

/// A tracked file whose local copy is missing or out of date.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingFile {
    /// Canonical document name (manifest key).
    pub name: String,
    /// Path on the remote host, with its original extension.
    pub remote_path: String,
    /// Content hash reported by the remote host.
    pub content_hash: String,
}

/// Result of comparing a fetched tree against the previous manifest.
#[derive(Clone, Debug, Default)]
pub struct ChangeSet {
    /// Files that need to be fetched, in remote listing order.
    pub pending: Vec<PendingFile>,
    /// Manifest to persist once the pending files are written: every
    /// tracked file with its current hash.
    pub baseline: Manifest,
}

impl ChangeSet {
    /// Canonical names of the pending files.
    #[must_use]
    pub fn pending_names(&self) -> Vec<&str> {
        self.pending.iter().map(|f| f.name.as_str()).collect()
    }

    /// Whether nothing needs to be fetched.
    #[must_use]
    pub fn is_up_to_date(&self) -> bool {
        self.pending.is_empty()
    }
}

/// Compare a freshly fetched tree with the previously persisted manifest.
///
/// Only tracked blobs take part (see [`is_tracked`]). Each survivor is joined
/// to `previous` on its canonical name; a missing entry or a different hash
/// marks it pending. With no previous manifest every tracked file is pending.
#[must_use]
pub fn detect_changes(fetched: &[TreeNode], previous: Option<&Manifest>) -> ChangeSet {
    let known = previous.map(Manifest::index).unwrap_or_default();
    let mut changes = ChangeSet::default();

    for node in fetched
        .iter()
        .filter(|n| n.is_blob() && is_tracked(&n.path))
    {
        let name = canonical_name(&node.path);

        if known.get(name).copied() != Some(node.content_hash.as_str()) {
            tracing::info!(name, "Need to update");
            changes.pending.push(PendingFile {
                name: name.to_owned(),
                remote_path: node.path.clone(),
                content_hash: node.content_hash.clone(),
            });
        }

        changes.baseline.insert(name, node.content_hash.as_str());
    }

    changes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::ManifestEntry;
    use pretty_assertions::assert_eq;

    fn manifest(entries: &[(&str, &str)]) -> Manifest {
        Manifest::new(
            entries
                .iter()
                .map(|(path, hash)| ManifestEntry::new(*path, *hash)),
        )
    }

    #[test]
    fn test_changed_and_new_files_are_pending() {
        let previous = manifest(&[("a", "h1")]);
        let fetched = vec![TreeNode::blob("a.md", "h2"), TreeNode::blob("b.md", "h3")];

        let changes = detect_changes(&fetched, Some(&previous));

        assert_eq!(changes.pending_names(), vec!["a", "b"]);
    }

    #[test]
    fn test_unchanged_file_is_not_pending() {
        let previous = manifest(&[("a", "h1")]);
        let fetched = vec![TreeNode::blob("a.md", "h1")];

        let changes = detect_changes(&fetched, Some(&previous));

        assert!(changes.is_up_to_date());
        assert_eq!(changes.baseline, previous);
    }

    #[test]
    fn test_no_previous_manifest_fetches_everything() {
        let fetched = vec![
            TreeNode::blob("en-US/a.md", "h1"),
            TreeNode::blob("en-US/images/logo.png", "h2"),
        ];

        let changes = detect_changes(&fetched, None);

        assert_eq!(
            changes.pending_names(),
            vec!["en-US/a", "en-US/images/logo.png"]
        );
    }

    #[test]
    fn test_join_key_is_stripped_name() {
        // A manifest keyed by the unstripped path would make every file look new.
        let previous = manifest(&[("en-US/a", "h1")]);
        let fetched = vec![TreeNode::blob("en-US/a.md", "h1")];

        assert!(detect_changes(&fetched, Some(&previous)).is_up_to_date());
    }

    #[test]
    fn test_untracked_entries_are_ignored() {
        let fetched = vec![
            TreeNode::tree("en-US", "t1"),
            TreeNode::blob("README.md", "h1"),
            TreeNode::blob("en-US/readme.md", "h2"),
            TreeNode::blob("Makefile", "h3"),
            TreeNode::blob("en-US/nav.json", "h4"),
        ];

        let changes = detect_changes(&fetched, None);

        assert_eq!(changes.pending_names(), vec!["en-US/nav.json"]);
        assert_eq!(changes.baseline, manifest(&[("en-US/nav.json", "h4")]));
    }

    #[test]
    fn test_baseline_contains_every_tracked_file() {
        let previous = manifest(&[("a", "h1"), ("gone", "h0")]);
        let fetched = vec![TreeNode::blob("a.md", "h1"), TreeNode::blob("b.md", "h2")];

        let changes = detect_changes(&fetched, Some(&previous));

        assert_eq!(changes.baseline, manifest(&[("a", "h1"), ("b", "h2")]));
        assert_eq!(
            changes.pending,
            vec![PendingFile {
                name: "b".to_owned(),
                remote_path: "b.md".to_owned(),
                content_hash: "h2".to_owned(),
            }]
        );
    }
}

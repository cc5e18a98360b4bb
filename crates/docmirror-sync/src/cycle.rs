//! One fetch, detect and materialize pass over the configured applications.

use std::path::Path;
use std::sync::Arc;

use docmirror_config::AppConfig;
use docmirror_manifest::layout::CONF_DIR;
use docmirror_manifest::{ChangeSet, Manifest, ManifestError, ManifestStore, detect_changes};
use docmirror_remote::{FetchError, RemoteSource};

use crate::materialize::Materializer;

/// Failure that aborts one application's sync.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// Tree listing could not be fetched.
    #[error("Failed to fetch tree of {repo}: {source}")]
    Tree {
        repo: String,
        #[source]
        source: FetchError,
    },
    /// A changed file could not be fetched.
    #[error("Failed to fetch {path} from {repo}: {source}")]
    File {
        repo: String,
        path: String,
        #[source]
        source: FetchError,
    },
    /// The new manifest could not be saved.
    #[error(transparent)]
    Manifest(#[from] ManifestError),
}

/// What one application's sync did.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AppSyncReport {
    /// Tracked files in the remote tree.
    pub tracked: usize,
    /// Canonical names written to the mirror.
    pub updated: Vec<String>,
    /// Canonical names fetched but not written; retried next cycle.
    pub failed: Vec<String>,
}

/// Result of syncing one application.
#[derive(Debug)]
pub struct AppSyncOutcome {
    pub app: String,
    pub result: Result<AppSyncReport, SyncError>,
}

/// Runs sync cycles against a remote source.
pub struct Syncer {
    remote: Arc<dyn RemoteSource>,
    store: ManifestStore,
    materializer: Materializer,
}

impl Syncer {
    /// Create a syncer writing manifests to `<data_dir>/conf` and files to
    /// `<data_dir>/docs`.
    #[must_use]
    pub fn new(remote: Arc<dyn RemoteSource>, data_dir: &Path) -> Self {
        Self {
            remote,
            store: ManifestStore::new(data_dir.join(CONF_DIR)),
            materializer: Materializer::new(data_dir),
        }
    }

    #[must_use]
    pub fn store(&self) -> &ManifestStore {
        &self.store
    }

    #[must_use]
    pub fn materializer(&self) -> &Materializer {
        &self.materializer
    }

    /// Last persisted manifest for an application.
    ///
    /// Unreadable or malformed manifests are logged and treated as absent,
    /// which forces a full resync.
    #[must_use]
    pub fn previous_manifest(&self, app: &str) -> Option<Manifest> {
        self.store.load(app).unwrap_or_else(|e| {
            tracing::warn!(app, error = %e, "Ignoring unusable manifest");
            None
        })
    }

    /// Sync one application.
    ///
    /// Write failures and oversized files skip only the affected file; its
    /// manifest entry keeps the previous hash (or is dropped if it had none)
    /// so the file is fetched again next cycle.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError`] if the tree or a changed file cannot be fetched,
    /// or the manifest cannot be saved. The manifest is left untouched in
    /// every error case.
    pub fn sync_app(&self, app: &AppConfig) -> Result<AppSyncReport, SyncError> {
        let previous = self.previous_manifest(&app.name);

        let tree = self
            .remote
            .fetch_tree(&app.repo)
            .map_err(|source| SyncError::Tree {
                repo: app.repo.clone(),
                source,
            })?;

        let ChangeSet {
            pending,
            mut baseline,
        } = detect_changes(&tree, previous.as_ref());
        let mut report = AppSyncReport {
            tracked: baseline.len(),
            ..AppSyncReport::default()
        };

        for file in &pending {
            let bytes = match self.remote.fetch_raw(&app.repo, &file.remote_path) {
                Ok(bytes) => bytes,
                Err(e @ FetchError::TooLarge { .. }) => {
                    tracing::warn!(
                        app = %app.name,
                        name = %file.name,
                        error = %e,
                        "Skipping file"
                    );
                    revert_entry(&mut baseline, previous.as_ref(), &file.name);
                    report.failed.push(file.name.clone());
                    continue;
                }
                Err(source) => {
                    return Err(SyncError::File {
                        repo: app.repo.clone(),
                        path: file.remote_path.clone(),
                        source,
                    });
                }
            };

            match self.materializer.write(&app.name, &file.name, &bytes) {
                Ok(path) => {
                    tracing::debug!(
                        app = %app.name,
                        path = %path.display(),
                        bytes = bytes.len(),
                        "Wrote file"
                    );
                    report.updated.push(file.name.clone());
                }
                Err(e) => {
                    tracing::error!(
                        app = %app.name,
                        name = %file.name,
                        error = %e,
                        "Failed to write file"
                    );
                    revert_entry(&mut baseline, previous.as_ref(), &file.name);
                    report.failed.push(file.name.clone());
                }
            }
        }

        self.store.save(&app.name, &baseline)?;
        Ok(report)
    }

    /// Sync every application in order. One application's failure never
    /// stops the others.
    pub fn sync_all(&self, apps: &[AppConfig]) -> Vec<AppSyncOutcome> {
        tracing::debug!("Checking file updates");

        let outcomes = apps
            .iter()
            .map(|app| {
                let result = self.sync_app(app);
                match &result {
                    Ok(report) => tracing::info!(
                        app = %app.name,
                        tracked = report.tracked,
                        updated = report.updated.len(),
                        failed = report.failed.len(),
                        "Synced application"
                    ),
                    Err(e) => tracing::error!(app = %app.name, error = %e, "Sync aborted"),
                }
                AppSyncOutcome {
                    app: app.name.clone(),
                    result,
                }
            })
            .collect();

        tracing::debug!("Finished checking file updates");
        outcomes
    }
}

/// Restore the previous hash of a file that was not written, or drop it if
/// it is new, so the next cycle fetches it again.
fn revert_entry(baseline: &mut Manifest, previous: Option<&Manifest>, name: &str) {
    match previous.and_then(|m| m.hash_of(name)) {
        Some(hash) => baseline.insert(name, hash),
        None => {
            baseline.remove(name);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docmirror_manifest::ManifestEntry;
    use docmirror_remote::MockRemote;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::TempDir;

    const REPO: &str = "go-gitea/docs";

    fn app() -> AppConfig {
        AppConfig::new("gitea", REPO)
    }

    fn remote() -> Arc<MockRemote> {
        Arc::new(
            MockRemote::new()
                .with_dir(REPO, "en-US")
                .with_file(REPO, "en-US/intro.md", "h1", "# Intro\nHello")
                .with_file(REPO, "en-US/images/logo.png", "h2", vec![1, 2, 3])
                .with_file(REPO, "en-US/nav.json", "h3", "[]")
                .with_file(REPO, "README.md", "h4", "# readme")
                .with_file(REPO, "LICENSE", "h5", "MIT"),
        )
    }

    fn syncer(remote: &Arc<MockRemote>, dir: &Path) -> Syncer {
        Syncer::new(Arc::clone(remote) as Arc<dyn RemoteSource>, dir)
    }

    #[test]
    fn test_first_sync_fetches_all_tracked_files() {
        let tmp = TempDir::new().unwrap();
        let remote = remote();
        let syncer = syncer(&remote, tmp.path());

        let report = syncer.sync_app(&app()).unwrap();

        assert_eq!(report.tracked, 3);
        assert_eq!(
            report.updated,
            vec!["en-US/intro", "en-US/images/logo.png", "en-US/nav.json"]
        );
        assert!(report.failed.is_empty());
        assert_eq!(remote.raw_fetches(), 3);

        let root = tmp.path().join("docs/gitea");
        assert_eq!(fs::read_to_string(root.join("en-US/intro.md")).unwrap(), "# Intro\nHello");
        assert_eq!(fs::read(root.join("en-US/images/logo.png")).unwrap(), vec![1, 2, 3]);
        assert!(!root.join("README.md").exists());

        let manifest = syncer.store().load("gitea").unwrap().unwrap();
        assert_eq!(
            manifest.entries(),
            &[
                ManifestEntry::new("en-US/intro", "h1"),
                ManifestEntry::new("en-US/images/logo.png", "h2"),
                ManifestEntry::new("en-US/nav.json", "h3"),
            ]
        );
    }

    #[test]
    fn test_second_sync_without_changes_is_idempotent() {
        let tmp = TempDir::new().unwrap();
        let remote = remote();
        let syncer = syncer(&remote, tmp.path());

        syncer.sync_app(&app()).unwrap();
        let first = fs::read(syncer.store().path_for("gitea")).unwrap();
        let fetches = remote.raw_fetches();

        let report = syncer.sync_app(&app()).unwrap();

        assert!(report.updated.is_empty());
        assert_eq!(remote.raw_fetches(), fetches);
        assert_eq!(fs::read(syncer.store().path_for("gitea")).unwrap(), first);
    }

    #[test]
    fn test_changed_file_is_refetched() {
        let tmp = TempDir::new().unwrap();
        let remote = remote();
        let syncer = syncer(&remote, tmp.path());
        syncer.sync_app(&app()).unwrap();

        remote.put_file(REPO, "en-US/intro.md", "h1b", "# Intro\nUpdated");
        remote.put_file(REPO, "en-US/new.md", "h6", "# New\nPage");
        let report = syncer.sync_app(&app()).unwrap();

        assert_eq!(report.updated, vec!["en-US/intro", "en-US/new"]);
        let intro = tmp.path().join("docs/gitea/en-US/intro.md");
        assert_eq!(fs::read_to_string(intro).unwrap(), "# Intro\nUpdated");
        let manifest = syncer.store().load("gitea").unwrap().unwrap();
        assert_eq!(manifest.hash_of("en-US/intro"), Some("h1b"));
        assert_eq!(manifest.hash_of("en-US/new"), Some("h6"));
    }

    #[test]
    fn test_write_failure_keeps_previous_hash() {
        let tmp = TempDir::new().unwrap();
        let remote = remote();
        let syncer = syncer(&remote, tmp.path());
        syncer.sync_app(&app()).unwrap();

        // Block the write of a new document by occupying its parent path
        // with a regular file.
        fs::write(tmp.path().join("docs/gitea/en-US/guide"), "not a dir").unwrap();
        remote.put_file(REPO, "en-US/guide/start.md", "h7", "# Start\nGo");
        remote.put_file(REPO, "en-US/intro.md", "h1b", "# Intro\nUpdated");
        let report = syncer.sync_app(&app()).unwrap();

        assert_eq!(report.updated, vec!["en-US/intro"]);
        assert_eq!(report.failed, vec!["en-US/guide/start"]);
        let manifest = syncer.store().load("gitea").unwrap().unwrap();
        assert_eq!(manifest.hash_of("en-US/intro"), Some("h1b"));
        assert_eq!(manifest.hash_of("en-US/guide/start"), None);

        // The failed file is retried once the obstacle is gone.
        fs::remove_file(tmp.path().join("docs/gitea/en-US/guide")).unwrap();
        let report = syncer.sync_app(&app()).unwrap();
        assert_eq!(report.updated, vec!["en-US/guide/start"]);
    }

    #[test]
    fn test_oversized_file_is_skipped_and_retried() {
        let tmp = TempDir::new().unwrap();
        let remote = Arc::new(
            MockRemote::new()
                .with_size_limit(16)
                .with_file(REPO, "en-US/intro.md", "h1", "# Intro\nHello")
                .with_file(REPO, "en-US/images/huge.png", "h2", vec![0u8; 64]),
        );
        let syncer = syncer(&remote, tmp.path());

        let report = syncer.sync_app(&app()).unwrap();

        assert_eq!(report.updated, vec!["en-US/intro"]);
        assert_eq!(report.failed, vec!["en-US/images/huge.png"]);
        let manifest = syncer.store().load("gitea").unwrap().unwrap();
        assert_eq!(manifest.hash_of("en-US/intro"), Some("h1"));
        assert_eq!(manifest.hash_of("en-US/images/huge.png"), None);

        let report = syncer.sync_app(&app()).unwrap();
        assert!(report.updated.is_empty());
        assert_eq!(report.failed, vec!["en-US/images/huge.png"]);
    }

    #[test]
    fn test_tree_failure_aborts_without_saving() {
        let tmp = TempDir::new().unwrap();
        let remote = remote();
        let syncer = syncer(&remote, tmp.path());
        remote.fail_tree(REPO);

        let err = syncer.sync_app(&app()).unwrap_err();

        assert!(matches!(err, SyncError::Tree { .. }));
        assert!(!syncer.store().exists("gitea"));
    }

    #[test]
    fn test_file_fetch_failure_aborts_without_saving() {
        let tmp = TempDir::new().unwrap();
        let remote = remote();
        let syncer = syncer(&remote, tmp.path());
        remote.fail_file(REPO, "en-US/nav.json");

        let err = syncer.sync_app(&app()).unwrap_err();

        assert!(matches!(err, SyncError::File { ref path, .. } if path == "en-US/nav.json"));
        assert!(!syncer.store().exists("gitea"));
    }

    #[test]
    fn test_sync_all_continues_after_failed_app() {
        let tmp = TempDir::new().unwrap();
        let remote = remote();
        let syncer = syncer(&remote, tmp.path());
        let apps = vec![AppConfig::new("broken", "nobody/missing"), app()];

        let outcomes = syncer.sync_all(&apps);

        assert_eq!(outcomes.len(), 2);
        assert_eq!(outcomes[0].app, "broken");
        assert!(outcomes[0].result.is_err());
        assert_eq!(outcomes[1].result.as_ref().unwrap().updated.len(), 3);
    }

    #[test]
    fn test_corrupt_manifest_forces_full_resync() {
        let tmp = TempDir::new().unwrap();
        let remote = remote();
        let syncer = syncer(&remote, tmp.path());
        syncer.sync_app(&app()).unwrap();
        fs::write(syncer.store().path_for("gitea"), "{not json").unwrap();

        let report = syncer.sync_app(&app()).unwrap();

        assert_eq!(report.updated.len(), 3);
        assert!(syncer.store().load("gitea").is_ok());
    }
}

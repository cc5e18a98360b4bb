//! The documentation engine: cache rebuilds, reads and manual syncs.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use docmirror_cache::{AppDocuments, Document, DocumentCache};
use docmirror_config::{AppConfig, CheckStamp, Config, RuntimeMode};
use docmirror_manifest::layout::{CONF_DIR, cache_key, language_root_key};
use docmirror_remote::RemoteSource;
use docmirror_renderer::MirrorReader;

use crate::cycle::{AppSyncOutcome, Syncer};
use crate::scheduler::{SchedulerHandle, spawn_scheduler};

/// Mirrored documentation for a set of applications.
///
/// Owns the document cache and everything needed to refresh it. Share it
/// as `Arc<Docs>` between request handlers and the scheduler.
pub struct Docs {
    apps: Vec<AppConfig>,
    languages: Vec<String>,
    mode: RuntimeMode,
    interval: Duration,
    stale_after: Duration,
    conf_dir: PathBuf,
    reader: MirrorReader,
    cache: DocumentCache,
    syncer: Syncer,
}

impl Docs {
    /// Create an engine from loaded configuration. The cache starts empty;
    /// call [`Docs::initialize`] or [`Docs::rebuild_all`] to fill it.
    #[must_use]
    pub fn new(config: &Config, remote: Arc<dyn RemoteSource>) -> Self {
        let data_dir = &config.mirror.data_dir;
        Self {
            apps: config.apps.clone(),
            languages: config.mirror.languages.clone(),
            mode: config.mirror.mode,
            interval: config.mirror.interval(),
            stale_after: config.mirror.stale_after(),
            conf_dir: data_dir.join(CONF_DIR),
            reader: MirrorReader::new(data_dir),
            cache: DocumentCache::new(),
            syncer: Syncer::new(remote, data_dir),
        }
    }

    #[must_use]
    pub fn apps(&self) -> &[AppConfig] {
        &self.apps
    }

    #[must_use]
    pub fn mode(&self) -> RuntimeMode {
        self.mode
    }

    #[must_use]
    pub fn cache(&self) -> &DocumentCache {
        &self.cache
    }

    /// Fill the cache from local files and, outside dev mode, start the
    /// scheduler.
    ///
    /// Must be called from within a Tokio runtime unless in dev mode.
    pub fn initialize(self: &Arc<Self>) -> Option<SchedulerHandle> {
        self.rebuild_all();

        if self.mode.is_dev() {
            tracing::info!("Dev mode: serving documents from disk, scheduler disabled");
            return None;
        }
        Some(spawn_scheduler(Arc::clone(self), self.interval))
    }

    /// Look up a rendered document.
    ///
    /// In dev mode the file is re-read and re-rendered on every call.
    #[must_use]
    pub fn get_document(&self, app: &str, full_name: &str, lang: &str) -> Option<Arc<Document>> {
        if self.mode.is_dev() {
            return self
                .reader
                .document(app, &cache_key(lang, full_name))
                .map(Arc::new);
        }
        self.cache.get(app, full_name, lang)
    }

    /// Rebuild one application's cache from the mirror and swap it in.
    ///
    /// Keys come from the persisted manifest, or one root key per language
    /// when there is none yet. Returns the number of cached documents.
    pub fn rebuild(&self, app: &AppConfig) -> usize {
        for lang in &self.languages {
            if let Err(e) = self
                .syncer
                .materializer()
                .ensure_language_dir(&app.name, lang)
            {
                tracing::error!(
                    app = %app.name,
                    lang,
                    error = %e,
                    "Failed to create language directory"
                );
            }
        }

        let keys: Vec<String> = match self.syncer.previous_manifest(&app.name) {
            Some(manifest) => manifest.entries().iter().map(|e| e.path.clone()).collect(),
            None => self.languages.iter().map(|l| language_root_key(l)).collect(),
        };

        let documents =
            AppDocuments::build(&self.reader, &app.name, keys.iter().map(String::as_str));
        let count = documents.len();
        self.cache.replace(&app.name, documents);
        count
    }

    /// Rebuild every application's cache.
    pub fn rebuild_all(&self) {
        for app in &self.apps {
            self.rebuild(app);
        }
    }

    /// Run one full sync cycle, then rebuild every cache.
    pub fn sync_now(&self) -> Vec<AppSyncOutcome> {
        let outcomes = self.syncer.sync_all(&self.apps);
        self.rebuild_all();
        outcomes
    }

    /// Whether a sync should run at startup: the last check is absent or
    /// stale, or some application has no manifest yet.
    ///
    /// An unreadable check stamp counts as absent.
    #[must_use]
    pub fn needs_startup_sync(&self, now: DateTime<Utc>) -> bool {
        let stamp = CheckStamp::load(&self.conf_dir).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Ignoring unreadable check stamp");
            CheckStamp::default()
        });
        if stamp.is_stale(now, self.stale_after) {
            return true;
        }
        self.apps
            .iter()
            .any(|app| !self.syncer.store().exists(&app.name))
    }

    /// Record the current time as the last update check. Failures are
    /// logged.
    pub fn record_check(&self) {
        if let Err(e) = CheckStamp::now().save(&self.conf_dir) {
            tracing::error!(error = %e, "Failed to save check stamp");
        }
    }
}

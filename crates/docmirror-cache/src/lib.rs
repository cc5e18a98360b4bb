//! In-memory rendered document cache for docmirror.
//!
//! [`DocumentCache`] maps `(application, language, document name)` to a
//! rendered [`Document`]. Each application owns one immutable
//! [`AppDocuments`] snapshot; a rebuild renders a complete new snapshot
//! without holding any lock, then swaps it in.
//!
//! # Thread Safety
//!
//! - Lookups take the shared side of an internal `RwLock` just long enough
//!   to clone an `Arc`
//! - [`DocumentCache::replace`] takes the exclusive side only for the map
//!   insert, never while rendering
//! - Readers holding an older snapshot keep using it until they drop it
//!
//! # Example
//!
//! ```
//! use docmirror_cache::{AppDocuments, Document, DocumentCache};
//!
//! let cache = DocumentCache::new();
//! cache.replace(
//!     "gitea",
//!     AppDocuments::from_documents([("en-US/intro".to_owned(), Document::parse("# Intro\nHi"))]),
//! );
//!
//! let doc = cache.get("gitea", "intro", "en-US").unwrap();
//! assert_eq!(doc.title.as_deref(), Some("Intro"));
//! assert!(cache.get("gitea", "intro", "zh-CN").is_none());
//! ```

mod snapshot;

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

pub use docmirror_renderer::Document;
pub use snapshot::AppDocuments;

/// Rendered documents for every configured application.
#[derive(Debug, Default)]
pub struct DocumentCache {
    apps: RwLock<HashMap<String, Arc<AppDocuments>>>,
}

impl DocumentCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current snapshot for an application.
    ///
    /// The returned `Arc` stays consistent for as long as the caller holds
    /// it, regardless of concurrent rebuilds.
    ///
    /// # Panics
    ///
    /// Panics if the internal `RwLock` is poisoned.
    #[must_use]
    pub fn snapshot(&self, app: &str) -> Option<Arc<AppDocuments>> {
        self.apps.read().unwrap().get(app).cloned()
    }

    /// Look up a document by application, name and language.
    ///
    /// # Arguments
    ///
    /// * `app` - Application name
    /// * `full_name` - Document name relative to the language root (e.g. "intro/setup")
    /// * `lang` - Display language (e.g. "en-US")
    ///
    /// # Panics
    ///
    /// Panics if the internal `RwLock` is poisoned.
    #[must_use]
    pub fn get(&self, app: &str, full_name: &str, lang: &str) -> Option<Arc<Document>> {
        self.snapshot(app)?.get_localized(lang, full_name)
    }

    /// Swap in a new snapshot for an application, returning the old one.
    ///
    /// # Panics
    ///
    /// Panics if the internal `RwLock` is poisoned.
    pub fn replace(&self, app: &str, documents: AppDocuments) -> Option<Arc<AppDocuments>> {
        let documents = Arc::new(documents);
        let count = documents.len();
        let previous = self
            .apps
            .write()
            .unwrap()
            .insert(app.to_owned(), documents);
        tracing::debug!(app, documents = count, "Swapped document cache");
        previous
    }

    /// Names of applications with a snapshot.
    ///
    /// # Panics
    ///
    /// Panics if the internal `RwLock` is poisoned.
    #[must_use]
    pub fn applications(&self) -> Vec<String> {
        let mut names: Vec<_> = self.apps.read().unwrap().keys().cloned().collect();
        names.sort();
        names
    }
}

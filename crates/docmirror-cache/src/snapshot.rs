//! Immutable per-application document snapshots.

use std::collections::HashMap;
use std::sync::Arc;

use docmirror_manifest::layout::cache_key;
use docmirror_renderer::{Document, MirrorReader};
use rayon::prelude::*;

/// Rendered documents of one application, keyed by `<lang>/<name>`.
///
/// Never mutated after construction; a rebuild produces a new value.
#[derive(Debug, Default)]
pub struct AppDocuments {
    documents: HashMap<String, Arc<Document>>,
}

impl AppDocuments {
    /// Build a snapshot from already rendered documents.
    pub fn from_documents(documents: impl IntoIterator<Item = (String, Document)>) -> Self {
        Self {
            documents: documents
                .into_iter()
                .map(|(key, doc)| (key, Arc::new(doc)))
                .collect(),
        }
    }

    /// Render every eligible key from the mirror.
    ///
    /// Keys that are not leaf documents are skipped. Files that fail to load
    /// are logged and left out, so one broken file never blocks the rest.
    pub fn build<'a>(
        reader: &MirrorReader,
        app: &str,
        keys: impl IntoIterator<Item = &'a str>,
    ) -> Self {
        let keys: Vec<&str> = keys.into_iter().collect();
        let documents: HashMap<String, Arc<Document>> = keys
            .par_iter()
            .filter_map(|key| {
                reader
                    .document(app, key)
                    .map(|doc| ((*key).to_owned(), Arc::new(doc)))
            })
            .collect();

        tracing::info!(
            app,
            keys = keys.len(),
            documents = documents.len(),
            "Rebuilt document cache"
        );
        Self { documents }
    }

    /// Document by cache key (`<lang>/<name>`).
    #[must_use]
    pub fn get(&self, key: &str) -> Option<Arc<Document>> {
        self.documents.get(key).cloned()
    }

    /// Document by language and name.
    #[must_use]
    pub fn get_localized(&self, lang: &str, name: &str) -> Option<Arc<Document>> {
        self.get(&cache_key(lang, name))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Iterate over `(key, document)` pairs in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Document)> {
        self.documents.iter().map(|(k, d)| (k.as_str(), d.as_ref()))
    }

    /// Sorted cache keys.
    #[must_use]
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<_> = self.documents.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }
}

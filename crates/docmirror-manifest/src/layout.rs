//! Path and key normalization shared by every stage of the sync pipeline.
//!
//! The change detector, the manifest store, the materializer and the
//! document cache all agree on one canonical name per document: its remote
//! path with the markup extension stripped (`en-US/intro/setup.md` becomes
//! `en-US/intro/setup`). Every conversion between remote paths, canonical
//! names, local file names and cache keys lives here.

use std::borrow::Cow;

/// Markup extension of documentation files.
pub const MARKUP_EXT: &str = ".md";

/// Extension of structured-data files mirrored alongside documents.
pub const STRUCTURED_EXT: &str = ".json";

/// Path segment that marks image assets.
pub const IMAGES_SEGMENT: &str = "images";

/// Directory (under the data directory) holding the local mirror.
pub const MIRROR_DIR: &str = "docs";

/// Directory (under the data directory) holding manifests and state.
pub const CONF_DIR: &str = "conf";

/// Canonical document name for a remote path.
///
/// ```
/// use docmirror_manifest::layout::canonical_name;
///
/// assert_eq!(canonical_name("en-US/intro.md"), "en-US/intro");
/// assert_eq!(canonical_name("en-US/images/logo.png"), "en-US/images/logo.png");
/// ```
#[must_use]
pub fn canonical_name(remote_path: &str) -> &str {
    remote_path.strip_suffix(MARKUP_EXT).unwrap_or(remote_path)
}

/// Whether every `/`-separated segment of a name or key is a plain path
/// component. Empty, `.` and `..` segments would let the name resolve
/// outside its application directory.
///
/// ```
/// use docmirror_manifest::layout::is_safe_name;
///
/// assert!(is_safe_name("en-US/intro/setup"));
/// assert!(!is_safe_name("en-US/../../secret"));
/// assert!(!is_safe_name("/etc/passwd"));
/// ```
#[must_use]
pub fn is_safe_name(name: &str) -> bool {
    !name.split('/').any(|s| matches!(s, "" | "." | ".."))
}

/// Whether any segment of `path` is the images directory.
#[must_use]
pub fn has_images_segment(path: &str) -> bool {
    path.split('/').any(|segment| segment == IMAGES_SEGMENT)
}

/// Whether the file name of `path` starts with "readme" (any case).
#[must_use]
pub fn is_readme(path: &str) -> bool {
    let file_name = path.rsplit('/').next().unwrap_or(path);
    file_name.to_ascii_lowercase().starts_with("readme")
}

/// Whether a remote blob at `path` belongs to the documentation mirror.
///
/// Tracked files are markup documents, anything under an images directory,
/// and structured-data files. Readme files are never tracked.
#[must_use]
pub fn is_tracked(path: &str) -> bool {
    if is_readme(path) {
        return false;
    }
    path.ends_with(MARKUP_EXT) || has_images_segment(path) || path.ends_with(STRUCTURED_EXT)
}

/// Whether a canonical name refers to an asset (image or structured data)
/// rather than a markup document.
#[must_use]
pub fn is_asset(name: &str) -> bool {
    has_images_segment(name) || name.ends_with(STRUCTURED_EXT)
}

/// Local file name for a canonical name: documents get the markup
/// extension back, assets are written as-is.
///
/// ```
/// use docmirror_manifest::layout::local_file_name;
///
/// assert_eq!(local_file_name("en-US/intro"), "en-US/intro.md");
/// assert_eq!(local_file_name("en-US/nav.json"), "en-US/nav.json");
/// ```
#[must_use]
pub fn local_file_name(name: &str) -> Cow<'_, str> {
    if is_asset(name) {
        Cow::Borrowed(name)
    } else {
        Cow::Owned(format!("{name}{MARKUP_EXT}"))
    }
}

/// Cache key of a document in a given language.
///
/// ```
/// use docmirror_manifest::layout::cache_key;
///
/// assert_eq!(cache_key("en-US", "intro/setup"), "en-US/intro/setup");
/// ```
#[must_use]
pub fn cache_key(lang: &str, full_name: &str) -> String {
    format!("{lang}/{full_name}")
}

/// Synthetic root key used for a language before any manifest exists.
#[must_use]
pub fn language_root_key(lang: &str) -> String {
    cache_key(lang, "")
}

/// File name of an application's persisted manifest.
#[must_use]
pub fn manifest_file_name(app: &str) -> String {
    format!("tree_{app}.json")
}

/// Mirror path of a cache key: `docs/<app>/<key>`.
///
/// This is the path shape the renderer's eligibility rule is evaluated on,
/// independent of where the data directory lives on disk.
#[must_use]
pub fn mirror_path(app: &str, key: &str) -> String {
    let key = key.trim_end_matches('/');
    if key.is_empty() {
        format!("{MIRROR_DIR}/{app}")
    } else {
        format!("{MIRROR_DIR}/{app}/{key}")
    }
}

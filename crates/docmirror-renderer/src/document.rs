//! Rendered documents and the rules deciding what gets rendered.

use docmirror_manifest::layout::has_images_segment;

use crate::markdown::render_markdown;

/// Minimum segment count of a leaf document's mirror path
/// (`docs/<app>/<lang>` is a language root, not a page).
const MIN_LEAF_DEPTH: usize = 4;

/// A rendered documentation page.
///
/// Immutable once built: cache rebuilds replace documents wholesale.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Document {
    /// Title from the first line, heading markers stripped. `None` when the
    /// file has a single line.
    pub title: Option<String>,
    /// Rendered HTML body.
    pub body: String,
}

impl Document {
    /// Parse raw markup: split the title off and render the rest.
    #[must_use]
    pub fn parse(content: &str) -> Self {
        let (title, body) = split_title(content);
        Self {
            title,
            body: render_markdown(body),
        }
    }

    /// Rendered body as bytes.
    #[must_use]
    pub fn body_bytes(&self) -> &[u8] {
        self.body.as_bytes()
    }
}

/// Split raw markup into title and pre-render body.
///
/// With a newline present, the first line with every `#` removed and
/// whitespace trimmed is the title, and the trimmed remainder is the body.
/// Without one, the whole content is the body.
///
/// ```
/// use docmirror_renderer::split_title;
///
/// assert_eq!(
///     split_title("# Hello World\nBody text"),
///     (Some("Hello World".to_owned()), "Body text")
/// );
/// assert_eq!(split_title("just text"), (None, "just text"));
/// ```
#[must_use]
pub fn split_title(content: &str) -> (Option<String>, &str) {
    match content.split_once('\n') {
        Some((first, rest)) => {
            let title = first.replace('#', "").trim().to_owned();
            (Some(title), rest.trim())
        }
        None => (None, content),
    }
}

/// Whether a mirror path (`docs/<app>/<lang>/<name>`) is a leaf document.
///
/// Paths with an images segment and paths of three or fewer segments
/// are not.
///
/// ```
/// use docmirror_renderer::is_renderable;
///
/// assert!(is_renderable("docs/gitea/en-US/intro"));
/// assert!(!is_renderable("docs/gitea/en-US/images/foo"));
/// assert!(!is_renderable("docs/gitea/en-US"));
/// ```
#[must_use]
pub fn is_renderable(mirror_path: &str) -> bool {
    if has_images_segment(mirror_path) {
        return false;
    }
    mirror_path.split('/').count() >= MIN_LEAF_DEPTH
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_split_title_strips_all_hashes() {
        let (title, body) = split_title("## Install #1 ##\n\nSteps");
        assert_eq!(title.as_deref(), Some("Install 1"));
        assert_eq!(body, "Steps");
    }

    #[test]
    fn test_split_title_without_newline() {
        let (title, body) = split_title("# Only a heading");
        assert_eq!(title, None);
        assert_eq!(body, "# Only a heading");
    }

    #[test]
    fn test_split_title_trailing_newline_only() {
        let (title, body) = split_title("Title\n");
        assert_eq!(title.as_deref(), Some("Title"));
        assert_eq!(body, "");
    }

    #[test]
    fn test_split_title_crlf() {
        let (title, body) = split_title("# Title\r\nBody\r\n");
        assert_eq!(title.as_deref(), Some("Title"));
        assert_eq!(body, "Body");
    }

    #[test]
    fn test_parse_renders_body_only() {
        let doc = Document::parse("# Hello World\nBody text");
        assert_eq!(
            doc,
            Document {
                title: Some("Hello World".to_owned()),
                body: "<p>Body text</p>\n".to_owned(),
            }
        );
    }

    #[test]
    fn test_parse_without_title_renders_everything() {
        let doc = Document::parse("# Heading");
        assert_eq!(doc.title, None);
        assert_eq!(doc.body, "<h1>Heading</h1>\n");
    }

    #[test]
    fn test_is_renderable_excludes_images_and_shallow_paths() {
        assert!(!is_renderable("docs/app/en-US/images/foo"));
        assert!(!is_renderable("docs/app/en-US"));
        assert!(!is_renderable("docs/app"));
        assert!(!is_renderable("a/b/c"));
        assert!(is_renderable("a/b/c/d"));
        assert!(is_renderable("docs/app/en-US/intro/setup"));
    }
}

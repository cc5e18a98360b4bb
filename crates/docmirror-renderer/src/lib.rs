//! Markdown document parsing and rendering for docmirror.
//!
//! Turns one mirrored markup file into a [`Document`]: a title taken from
//! the first line and an HTML body rendered with `pulldown-cmark`.
//!
//! # Pipeline
//!
//! 1. [`is_renderable`] decides from the mirror path whether a file is a
//!    leaf document at all (images and shallow paths are not).
//! 2. [`split_title`] peels the first line off as the title.
//! 3. [`render_markdown`] renders the rest, expanding tabs inside code
//!    blocks to four spaces.
//!
//! [`MirrorReader`] runs the whole pipeline against files on disk.
//!
//! # Example
//!
//! ```
//! use docmirror_renderer::Document;
//!
//! let doc = Document::parse("# Hello World\nBody text");
//! assert_eq!(doc.title.as_deref(), Some("Hello World"));
//! assert_eq!(doc.body, "<p>Body text</p>\n");
//! ```

mod document;
mod markdown;
mod reader;

pub use document::{Document, is_renderable, split_title};
pub use markdown::{parser_options, render_markdown};
pub use reader::{MirrorReader, RenderError};

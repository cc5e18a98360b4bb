//! Markdown to HTML rendering.

use pulldown_cmark::{CowStr, Event, Options, Parser, Tag, TagEnd, html};

/// Replacement for each tab character inside code blocks.
const TAB_EXPANSION: &str = "    ";

/// Parser options for mirrored documentation.
///
/// Tables, strikethrough and smart punctuation are enabled.
#[must_use]
pub fn parser_options() -> Options {
    Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH | Options::ENABLE_SMART_PUNCTUATION
}

/// Render markdown to HTML.
///
/// Two presentation rules apply on top of plain `CommonMark`:
/// - every soft line break renders as a hard break (`<br />`)
/// - every tab inside a code block becomes four spaces
///
/// ```
/// use docmirror_renderer::render_markdown;
///
/// let html = render_markdown("```\nfn main() {\n\tprintln!();\n}\n```");
/// assert!(html.contains("    println!();"));
/// assert!(!html.contains('\t'));
/// ```
#[must_use]
pub fn render_markdown(markdown: &str) -> String {
    let mut in_code_block = false;

    let events = Parser::new_ext(markdown, parser_options()).map(|event| match event {
        Event::Start(Tag::CodeBlock(kind)) => {
            in_code_block = true;
            Event::Start(Tag::CodeBlock(kind))
        }
        Event::End(TagEnd::CodeBlock) => {
            in_code_block = false;
            Event::End(TagEnd::CodeBlock)
        }
        Event::Text(text) if in_code_block && text.contains('\t') => {
            Event::Text(CowStr::from(text.replace('\t', TAB_EXPANSION)))
        }
        Event::SoftBreak => Event::HardBreak,
        other => other,
    });

    let mut output = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut output, events);
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_fenced_code_tabs_become_spaces() {
        let html = render_markdown("```go\nfunc main() {\n\tif x {\n\t\treturn\n\t}\n}\n```");

        assert_eq!(
            html,
            "<pre><code class=\"language-go\">func main() {\n    if x {\n        return\n    }\n}\n</code></pre>\n"
        );
    }

    #[test]
    fn test_every_tab_in_code_block_is_expanded() {
        let html = render_markdown("```\na\tb\tc\n```");
        assert_eq!(html, "<pre><code>a    b    c\n</code></pre>\n");
    }

    #[test]
    fn test_tabs_outside_code_blocks_untouched() {
        let html = render_markdown("a\tb");
        assert_eq!(html, "<p>a\tb</p>\n");
    }

    #[test]
    fn test_soft_break_renders_hard_break() {
        let html = render_markdown("line one\nline two");
        assert_eq!(html, "<p>line one<br />\nline two</p>\n");
    }

    #[test]
    fn test_tables_enabled() {
        let html = render_markdown("| a | b |\n|---|---|\n| 1 | 2 |");
        assert!(html.contains("<table>"));
        assert!(html.contains("<td>1</td>"));
    }

    #[test]
    fn test_strikethrough_enabled() {
        let html = render_markdown("~~gone~~");
        assert_eq!(html, "<p><del>gone</del></p>\n");
    }

    #[test]
    fn test_html_escaped_in_code() {
        let html = render_markdown("```\n<b>\t&\n```");
        assert_eq!(html, "<pre><code>&lt;b&gt;    &amp;\n</code></pre>\n");
    }
}

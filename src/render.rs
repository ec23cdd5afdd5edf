//! Markdown rendering collaborator.
//!
//! The engine operates strictly on rendered HTML; this is the one place
//! markdown exists. Connection scoring and positioning run against this
//! base rendering, before callout injection touches the markup.

use pulldown_cmark::{Options, Parser, html};

/// Render a markdown body to an HTML fragment.
pub fn render_markdown(body: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_FOOTNOTES);

    let parser = Parser::new_ext(body, options);
    let mut out = String::with_capacity(body.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_paragraph() {
        let html = render_markdown("Hello *world*.");
        assert_eq!(html.trim(), "<p>Hello <em>world</em>.</p>");
    }

    #[test]
    fn test_render_escapes_raw_characters() {
        let html = render_markdown("Jane & Finch");
        assert!(html.contains("Jane &amp; Finch"));
    }

    #[test]
    fn test_render_strikethrough_enabled() {
        let html = render_markdown("~~gone~~");
        assert!(html.contains("<del>gone</del>"));
    }

    #[test]
    fn test_render_empty() {
        assert_eq!(render_markdown(""), "");
    }
}

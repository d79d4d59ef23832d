pub mod html_scraper;
pub mod parsing_utils;

use crate::content::parsing_utils::{extract_after_hr, extract_blog_content, extract_body, extract_marked_content};

/// Opening tag of the free-form content block in a rendered post page.
pub const CONTENT_OPEN: &str = r#"<div class="blog-content">"#;
/// Closing tag of the content block; the comment tells it apart from nested `</div>`s.
pub const CONTENT_CLOSE: &str = "</div><!-- /blog-content -->";

fn looks_like_document(raw: &str) -> bool {
    let lower = raw.to_lowercase();
    lower.contains("<body") || lower.contains("<html") || lower.contains(CONTENT_OPEN)
}

/// Reduces a whole pasted page to its article body.
///
/// Plain fragments are returned trimmed and otherwise untouched.
pub fn sanitize_content(raw: &str) -> String {
    if !looks_like_document(raw) {
        return raw.trim().to_string();
    }

    extract_marked_content(raw)
        .or_else(|| extract_blog_content(raw))
        .or_else(|| extract_after_hr(raw))
        .or_else(|| extract_body(raw))
        .unwrap_or_else(|| raw.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_fragment_untouched() {
        let fragment = "  <p>Primo</p>\n<hr>\n<p>Secondo</p>  ";
        assert_eq!(sanitize_content(fragment), "<p>Primo</p>\n<hr>\n<p>Secondo</p>");
    }

    #[test]
    fn test_sanitize_document() {
        let page = r#"<html><body><h1>T</h1><div class="blog-content"><p>Corpo</p></div><!-- /blog-content --><p>footer</p></body></html>"#;
        assert_eq!(sanitize_content(page), "<p>Corpo</p>");

        let page = "<html><body><h1>T</h1><hr/><p>Dopo la riga</p>\n</body></html>";
        assert_eq!(sanitize_content(page), "<p>Dopo la riga</p>");

        let page = "<html><body class=\"x\">\n<p>Solo corpo</p>\n</body></html>";
        assert_eq!(sanitize_content(page), "<p>Solo corpo</p>");
    }
}

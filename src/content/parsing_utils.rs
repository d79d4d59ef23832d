use lazy_static::lazy_static;
use regex::Regex;

use crate::content::{CONTENT_CLOSE, CONTENT_OPEN};

lazy_static! {
    static ref TITLE_REGEX: Regex = Regex::new(r"(?is)<title>(.*?)</title>").unwrap();
    static ref H1_REGEX: Regex = Regex::new(r"(?is)<h1[^>]*>(.*?)</h1>").unwrap();
    static ref META_DATE_REGEX: Regex = Regex::new(
        r#"(?i)<meta[^>]*name=["']?date["']?[^>]*content=["']?([\d\-/]+)["']?"#
    ).unwrap();
    static ref PUBLISHED_REGEX: Regex = Regex::new(r"Pubblicato il (\d{4}-\d{2}-\d{2})").unwrap();
    static ref META_AUTHOR_REGEX: Regex = Regex::new(
        r#"(?i)<meta[^>]*name=["']?author["']?[^>]*content=(?:"([^"]*)"|'([^']*)'|([^\s"'>]+))"#
    ).unwrap();
    static ref IMG_REGEX: Regex = Regex::new(r#"(?i)<img[^>]*src=(?:"([^"]*)"|'([^']*)')"#).unwrap();
    static ref SUMMARY_REGEX: Regex = Regex::new(r"(?is)<h3>\s*Riassunto\s*</h3>\s*<p>(.*?)</p>").unwrap();
    static ref PARAGRAPH_REGEX: Regex = Regex::new(r"(?is)<p>(.*?)</p>").unwrap();
    static ref HR_REGEX: Regex = Regex::new(r"(?i)<hr[^>]*>").unwrap();
    static ref BODY_CLOSE_REGEX: Regex = Regex::new(r"(?i)</body>").unwrap();
    static ref BLOG_CONTENT_REGEX: Regex = Regex::new(
        r#"(?is)<div\s+class=["']blog-content["']>(.*?)</div>"#
    ).unwrap();
    static ref BODY_REGEX: Regex = Regex::new(r"(?is)<body[^>]*>(.*?)</body>").unwrap();
}

fn first_capture(regex: &Regex, html: &str) -> Option<String> {
    regex.captures(html)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Like `first_capture`, for patterns with one group per quoting style.
fn quoted_capture(regex: &Regex, html: &str) -> Option<String> {
    regex.captures(html)
        .and_then(|caps| caps.iter().skip(1).flatten().next())
        .map(|m| m.as_str().trim().to_string())
        .filter(|s| !s.is_empty())
}

pub fn extract_title(html: &str) -> Option<String> {
    first_capture(&TITLE_REGEX, html)
}

pub fn extract_h1(html: &str) -> Option<String> {
    first_capture(&H1_REGEX, html)
}

pub fn extract_meta_date(html: &str) -> Option<String> {
    first_capture(&META_DATE_REGEX, html)
}

/// The `Pubblicato il YYYY-MM-DD` byline.
pub fn extract_published_date(html: &str) -> Option<String> {
    first_capture(&PUBLISHED_REGEX, html)
}

pub fn extract_meta_author(html: &str) -> Option<String> {
    quoted_capture(&META_AUTHOR_REGEX, html)
}

pub fn extract_first_image(html: &str) -> Option<String> {
    quoted_capture(&IMG_REGEX, html)
}

/// The paragraph right after a `<h3>Riassunto</h3>` heading.
pub fn extract_summary_paragraph(html: &str) -> Option<String> {
    first_capture(&SUMMARY_REGEX, html)
}

pub fn extract_first_paragraph(html: &str) -> Option<String> {
    first_capture(&PARAGRAPH_REGEX, html)
}

/// Everything between the first `<hr>` and `</body>`.
pub fn extract_after_hr(html: &str) -> Option<String> {
    let hr = HR_REGEX.find(html)?;
    let rest = &html[hr.end()..];
    let body_close = BODY_CLOSE_REGEX.find(rest)?;
    Some(rest[..body_close.start()].trim().to_string())
}

/// Content between the delimiters written by the post page template.
pub fn extract_marked_content(html: &str) -> Option<String> {
    let start = html.find(CONTENT_OPEN)? + CONTENT_OPEN.len();
    let end = html[start..].find(CONTENT_CLOSE)? + start;
    Some(html[start..end].trim().to_string())
}

pub fn extract_blog_content(html: &str) -> Option<String> {
    BLOG_CONTENT_REGEX.captures(html)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
}

pub fn extract_body(html: &str) -> Option<String> {
    BODY_REGEX.captures(html)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_title() {
        assert_eq!(extract_title("<head><TITLE> Festa </TITLE></head>"), Some("Festa".to_string()));
        assert_eq!(extract_title("<title></title>"), None);
        assert_eq!(extract_h1(r#"<h1 class="x">Titolo</h1>"#), Some("Titolo".to_string()));
    }

    #[test]
    fn test_extract_dates() {
        let html = r#"<meta name="date" content="2024-05-01">"#;
        assert_eq!(extract_meta_date(html), Some("2024-05-01".to_string()));
        let html = r#"<meta content="x" name='date' content='2024/05/01'>"#;
        assert_eq!(extract_meta_date(html), Some("2024/05/01".to_string()));
        assert_eq!(extract_meta_date(r#"<meta name="date" content="">"#), None);
        assert_eq!(extract_published_date("<p>Pubblicato il 2023-12-24 da ARCS-VV</p>"), Some("2023-12-24".to_string()));
    }

    #[test]
    fn test_extract_author_and_image() {
        assert_eq!(extract_meta_author(r#"<meta name="author" content="Mario Rossi">"#), Some("Mario Rossi".to_string()));
        assert_eq!(extract_first_image(r#"<p>x</p><IMG alt="a" src='../immagini/a.jpg'><img src="b.jpg">"#), Some("../immagini/a.jpg".to_string()));
        assert_eq!(extract_first_image("<p>niente</p>"), None);
        assert_eq!(extract_meta_author(r#"<meta name="author" content="Maria Dell'Orto">"#), Some("Maria Dell'Orto".to_string()));
        assert_eq!(extract_meta_author(r#"<meta name='author' content='Il "Gruppo" Giovani'>"#), Some("Il \"Gruppo\" Giovani".to_string()));
        assert_eq!(extract_meta_author("<meta name=author content=ARCS>"), Some("ARCS".to_string()));
        assert_eq!(extract_first_image(r#"<img src="l'albero.jpg">"#), Some("l'albero.jpg".to_string()));
    }

    #[test]
    fn test_extract_paragraphs() {
        let html = "<p>Primo</p><h3> Riassunto </h3>\n  <p>Il\nriassunto</p>";
        assert_eq!(extract_summary_paragraph(html), Some("Il\nriassunto".to_string()));
        assert_eq!(extract_first_paragraph(html), Some("Primo".to_string()));
        assert_eq!(extract_first_paragraph(r#"<p class="byline">x</p>"#), None);
    }

    #[test]
    fn test_extract_after_hr() {
        assert_eq!(extract_after_hr("<body><hr class=\"sep\">\n<p>A</p>\n</BODY>"), Some("<p>A</p>".to_string()));
        assert_eq!(extract_after_hr("<body><hr><p>A</p>"), None);
        assert_eq!(extract_after_hr("<body><p>A</p></body>"), None);
    }

    #[test]
    fn test_extract_marked_content() {
        let html = r#"<div class="blog-content"><div>interno</div></div><!-- /blog-content -->"#;
        assert_eq!(extract_marked_content(html), Some("<div>interno</div>".to_string()));
        assert_eq!(extract_blog_content(html), Some("<div>interno".to_string()));
    }
}

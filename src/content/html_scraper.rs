use std::path::Path;
use std::{fs, io};

use html_escape::decode_html_entities;

use crate::content::parsing_utils::*;
use crate::post::{Post, DEFAULT_AUTHOR};

/// Rebuilds a post record from a page.
///
/// Every field is best effort: a pattern that does not match leaves the
/// field to its fallback, nothing here fails.
pub fn scrape(html: &str, slug_fallback: &str) -> Post {
    let title = extract_title(html)
        .or_else(|| extract_h1(html))
        .map(|t| decode_html_entities(&t).to_string())
        .unwrap_or_else(|| slug_fallback.to_string());

    let date = extract_meta_date(html)
        .or_else(|| extract_published_date(html))
        .unwrap_or_default();

    let author = extract_meta_author(html)
        .map(|a| decode_html_entities(&a).to_string())
        .unwrap_or_else(|| DEFAULT_AUTHOR.to_string());

    let image = extract_first_image(html).map(|src| decode_html_entities(&src).to_string());

    let excerpt = extract_summary_paragraph(html)
        .or_else(|| extract_first_paragraph(html));

    let content = scrape_content(html);

    Post {
        title,
        slug: slug_fallback.to_string(),
        date,
        author,
        image,
        excerpt,
        content,
        pdf: None,
        video: None,
    }
}

fn scrape_content(html: &str) -> String {
    if let Some(region) = extract_after_hr(html) {
        // Pages we rendered ourselves delimit the body precisely
        return extract_marked_content(&region).unwrap_or(region);
    }

    extract_blog_content(html)
        .or_else(|| extract_body(html))
        .unwrap_or_else(|| html.trim().to_string())
}

/// Reads and scrapes `<slug>.html`, the slug being the file stem.
pub fn scrape_file(path: &Path) -> io::Result<Post> {
    let html = fs::read_to_string(path)?;
    let slug = path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default();
    Ok(scrape(&html, slug))
}

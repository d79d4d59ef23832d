use std::fmt::Write;
use std::io;
use std::io::ErrorKind;

use ramhorns::Template;

use crate::media::{resolve_asset, DEFAULT_COVER};
use crate::post::{sort_by_date, Post};
use crate::view::SiteInfo;

pub const CARD_TEMPLATE: &str = include_str!("../../res/template/card.tpl");
pub const LISTING_TEMPLATE: &str = include_str!("../../res/template/listing.tpl");

/// Opening tag of the news grid inside the listing page.
pub const TABLE_START: &str = r#"<table width="100%" cellpadding="0" cellspacing="0" border="0" style="margin:0 auto;max-width:900px;">"#;
/// Marker that follows the news grid.
pub const MOBILE_SECTION: &str = "<!-- Layout alternativo per MOBILE -->";

const EMPTY_CELL: &str = r#"        <td width="50%" valign="top"></td>"#;
const SPACER_ROW: &str = r#"      <tr><td colspan="2" style="height:2em"></td></tr>"#;
const NO_SUMMARY: &str = "Nessun riassunto disponibile.";

#[derive(ramhorns::Content)]
struct Card<'a> {
    video: bool,
    thumbnail: String,
    title: &'a str,
    slug: &'a str,
    date_label: String,
    summary: String,
    link_text: &'a str,
}

#[derive(ramhorns::Content)]
struct ListingPage<'a> {
    table: &'a str,
    organization: &'a str,
    organization_full: &'a str,
    copyright_year: String,
}

pub struct ListRenderer<'a> {
    pub card: Template<'a>,
    pub page: Template<'a>,
    pub site: SiteInfo,
}

fn parse_template<'a>(src: &'a str, name: &str) -> io::Result<Template<'a>> {
    match Template::new(src) {
        Ok(x) => Ok(x),
        Err(e) => Err(io::Error::new(ErrorKind::InvalidInput, format!("Error parsing {} template: {}", name, e))),
    }
}

fn date_label(post: &Post) -> String {
    match post.parsed_date() {
        Some(date) => date.format("%d %B %Y").to_string(),
        None => post.date.clone(),
    }
}

impl ListRenderer<'_> {
    pub fn new<'a>(card_tpl_src: &'a str, page_tpl_src: &'a str, site: SiteInfo) -> io::Result<ListRenderer<'a>> {
        Ok(ListRenderer {
            card: parse_template(card_tpl_src, "listing card")?,
            page: parse_template(page_tpl_src, "listing page")?,
            site,
        })
    }

    pub fn with_default_templates(site: SiteInfo) -> io::Result<ListRenderer<'static>> {
        ListRenderer::new(CARD_TEMPLATE, LISTING_TEMPLATE, site)
    }

    fn render_card(&self, post: &Post) -> String {
        let video = post.video_marker();
        let thumbnail = match (&video, post.image.as_deref()) {
            (Some(video), _) => video.thumbnail_url(),
            (None, Some(image)) => resolve_asset(image),
            (None, None) => DEFAULT_COVER.to_string(),
        };

        let summary = post.summary();
        let summary = if summary.is_empty() { NO_SUMMARY.to_string() } else { summary };

        let link_text = if video.is_some() { "🎥 Guarda il video →" } else { "Leggi tutto →" };

        let rendered = self.card.render(&Card {
            video: video.is_some(),
            thumbnail,
            title: &post.title,
            slug: &post.slug,
            date_label: date_label(post),
            summary,
            link_text,
        });
        rendered.trim_end().to_string()
    }

    /// The news grid: newest first, two cards per row, a spacer row after each pair.
    pub fn render_table(&self, posts: &[Post]) -> String {
        let mut sorted = posts.to_vec();
        sort_by_date(&mut sorted);

        let mut buf = String::new();
        let _ = writeln!(&mut buf, "{}", TABLE_START);
        let _ = writeln!(&mut buf);

        for (i, pair) in sorted.chunks(2).enumerate() {
            let _ = writeln!(&mut buf, "      <!-- COPPIA {} -->", i + 1);
            let _ = writeln!(&mut buf, "      <tr>");
            for post in pair {
                let _ = writeln!(&mut buf, "{}", self.render_card(post));
            }
            if pair.len() < 2 {
                let _ = writeln!(&mut buf, "{}", EMPTY_CELL);
            }
            let _ = writeln!(&mut buf, "      </tr>");
            let _ = writeln!(&mut buf, "{}", SPACER_ROW);
        }

        let _ = write!(&mut buf, "  </table>");
        buf
    }

    /// A complete listing page, used when the site has none yet.
    pub fn render_page(&self, posts: &[Post]) -> String {
        let table = self.render_table(posts);
        self.page.render(&ListingPage {
            table: &table,
            organization: &self.site.organization,
            organization_full: &self.site.organization_full,
            copyright_year: self.site.copyright_year.to_string(),
        })
    }

    /// Swaps the grid of an existing listing page for a freshly rendered one.
    pub fn update_page(&self, page: &str, posts: &[Post]) -> io::Result<String> {
        splice_table(page, &self.render_table(posts))
    }
}

/// Replaces everything from the grid's opening tag up to the mobile section marker.
///
/// Fails without touching anything when a delimiter is missing or out of order.
pub fn splice_table(page: &str, table: &str) -> io::Result<String> {
    let start = match page.find(TABLE_START) {
        Some(start) => start,
        None => return Err(io::Error::new(ErrorKind::InvalidData, "Listing page has no news table (missing table opening tag)")),
    };

    let end = match page[start..].find(MOBILE_SECTION) {
        Some(end) => start + end,
        None => {
            let msg = if page.contains(MOBILE_SECTION) {
                "Listing page has the mobile layout section before the news table"
            } else {
                "Listing page has no mobile layout section after the news table"
            };
            return Err(io::Error::new(ErrorKind::InvalidData, msg));
        }
    };

    let mut res = String::with_capacity(page.len() + table.len());
    res.push_str(&page[..start]);
    res.push_str(table);
    res.push_str("\n\n      ");
    res.push_str(&page[end..]);
    Ok(res)
}

/// Points links of the retired blog section to the news directory.
/// Returns the rewritten page and the number of links changed.
pub fn fix_legacy_links(page: &str) -> (String, usize) {
    let count = page.matches("../blog/posts/").count();
    (page.replace("../blog/posts/", "../news/"), count)
}

#[cfg(test)]
mod tests {
    use crate::test_data::LISTING_HTML;

    use super::*;

    const CELL: &str = r#"<td width="50%" valign="top">"#;

    fn renderer() -> ListRenderer<'static> {
        ListRenderer::with_default_templates(SiteInfo::default()).unwrap()
    }

    fn post(slug: &str, date: &str) -> Post {
        Post {
            title: format!("Titolo {}", slug),
            slug: slug.to_string(),
            date: date.to_string(),
            excerpt: Some(format!("Riassunto del post {}", slug)),
            ..Default::default()
        }
    }

    #[test]
    fn test_cell_count() {
        let renderer = renderer();
        for n in 0..6 {
            let posts: Vec<Post> = (0..n).map(|i| post(&format!("p{}", i), "2024-01-01")).collect();
            let table = renderer.render_table(&posts);
            assert_eq!(table.matches(CELL).count(), 2 * ((n + 1) / 2), "n={}", n);
            assert_eq!(table.matches("<tr><td colspan=\"2\"").count(), (n + 1) / 2, "n={}", n);
        }
    }

    #[test]
    fn test_order_newest_first() {
        let posts = vec![post("a", "2024-01-01"), post("b", "2024-06-01")];
        let table = renderer().render_table(&posts);
        let pos_a = table.find("news/a.html").unwrap();
        let pos_b = table.find("news/b.html").unwrap();
        assert!(pos_b < pos_a);
        assert!(table.contains("01 June 2024"));
    }

    #[test]
    fn test_video_card() {
        let mut video_post = post("video", "2024-02-01");
        video_post.image = Some("youtube_dQw4w9WgXcQ".to_string());
        let table = renderer().render_table(&[video_post]);
        assert!(table.contains("https://img.youtube.com/vi/dQw4w9WgXcQ/hqdefault.jpg"));
        assert!(table.contains("Guarda il video →"));
        assert!(!table.contains("Leggi tutto →"));
    }

    #[test]
    fn test_plain_card() {
        let mut plain = post("foto", "2024-02-01");
        plain.image = Some("immagini/foto.jpg".to_string());
        let mut bare = post("nuda", "2024-01-01");
        bare.excerpt = None;
        let table = renderer().render_table(&[plain, bare]);
        assert!(table.contains(r#"src="../immagini/foto.jpg""#));
        assert!(table.contains(DEFAULT_COVER));
        assert!(table.contains(NO_SUMMARY));
        assert_eq!(table.matches("Leggi tutto →").count(), 2);
    }

    #[test]
    fn test_update_page() {
        let posts = vec![post("a", "2024-01-01")];
        let page = renderer().update_page(LISTING_HTML, &posts).unwrap();
        assert!(!page.contains("vecchio contenuto"));
        assert!(page.contains("news/a.html"));
        assert!(page.contains("<title>News – ARCS-VV</title>"));
        assert!(page.contains(MOBILE_SECTION));
        assert_eq!(page.matches(TABLE_START).count(), 1);

        let again = renderer().update_page(&page, &posts).unwrap();
        assert_eq!(again, page);
    }

    #[test]
    fn test_splice_missing_delimiters() {
        let err = splice_table("<html><body></body></html>", "<table></table>").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidData);

        let no_mobile = LISTING_HTML.replace(MOBILE_SECTION, "");
        assert!(splice_table(&no_mobile, "x").is_err());

        let reversed = format!("{}\n{}", MOBILE_SECTION, TABLE_START);
        assert!(splice_table(&reversed, "x").is_err());
    }

    #[test]
    fn test_render_page_has_delimiters() {
        let page = renderer().render_page(&[post("a", "2024-01-01")]);
        assert!(page.contains(TABLE_START));
        assert!(page.contains(MOBILE_SECTION));
        assert!(splice_table(&page, "x").is_ok());
    }

    #[test]
    fn test_fix_legacy_links() {
        let (page, count) = fix_legacy_links(r#"<a href="../blog/posts/a.html"></a><a href="../blog/posts/b.html"></a>"#);
        assert_eq!(count, 2);
        assert_eq!(page, r#"<a href="../news/a.html"></a><a href="../news/b.html"></a>"#);
    }
}

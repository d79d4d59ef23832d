use std::io;
use std::io::ErrorKind;

use ramhorns::Template;

use crate::media::{resolve_asset, Video};
use crate::post::Post;
use crate::view::SiteInfo;

pub const POST_TEMPLATE: &str = include_str!("../../res/template/post.tpl");

#[derive(ramhorns::Content)]
struct PostPage<'a> {
    title: &'a str,
    date: &'a str,
    author: &'a str,
    has_image: bool,
    image_src: String,
    has_excerpt: bool,
    excerpt: String,
    content: &'a str,
    has_pdf: bool,
    pdf_href: String,
    has_video_embed: bool,
    video_embed: String,
    has_video_link: bool,
    video_link: &'a str,
    organization: &'a str,
    organization_full: &'a str,
    copyright_year: String,
}

pub struct PostRenderer<'a> {
    pub template: Template<'a>,
    pub site: SiteInfo,
}

impl PostRenderer<'_> {
    pub fn new(view_tpl_src: &str, site: SiteInfo) -> io::Result<PostRenderer> {
        let template = match Template::new(view_tpl_src) {
            Ok(x) => x,
            Err(e) => {
                return Err(io::Error::new(ErrorKind::InvalidInput, format!("Error parsing post page template: {}", e)));
            }
        };

        Ok(PostRenderer {
            template,
            site,
        })
    }

    pub fn with_default_template(site: SiteInfo) -> io::Result<PostRenderer<'static>> {
        PostRenderer::new(POST_TEMPLATE, site)
    }

    /// Full HTML document for one post. Title, date and author are escaped,
    /// content and excerpt are emitted as they are.
    pub fn render(&self, post: &Post) -> String {
        let marker = post.video_marker();
        let image = post.image.as_deref().filter(|_| marker.is_none());

        let video_url = post.video.as_deref();
        let embed = video_url.and_then(Video::from_url).or(marker);
        let video_link = match (video_url, &embed) {
            (Some(url), None) => url,
            _ => "",
        };

        let excerpt = post.summary();
        let pdf_href = post.pdf.as_deref().map(resolve_asset).unwrap_or_default();

        self.template.render(&PostPage {
            title: &post.title,
            date: &post.date,
            author: &post.author,
            has_image: image.is_some(),
            image_src: image.map(resolve_asset).unwrap_or_default(),
            has_excerpt: !excerpt.is_empty(),
            excerpt,
            content: post.content.trim(),
            has_pdf: !pdf_href.is_empty(),
            pdf_href,
            has_video_embed: embed.is_some(),
            video_embed: embed.map(|v| v.embed_url()).unwrap_or_default(),
            has_video_link: !video_link.is_empty(),
            video_link,
            organization: &self.site.organization,
            organization_full: &self.site.organization_full,
            copyright_year: self.site.copyright_year.to_string(),
        })
    }
}

use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;
use std::fmt::{Display, Formatter};

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};

use crate::content::sanitize_content;
use crate::media::Video;
use crate::text_utils::{derive_excerpt, excerpt_needs_rebuild, format_date, parse_date_any, parse_iso_date, slugify};

pub const DEFAULT_AUTHOR: &str = "ARCS-VV";

/// One news article, as stored in `news.json`.
///
/// Field order is the serialization order of the index file.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Post {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub author: String,
    #[serde(default, deserialize_with = "non_empty", skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, alias = "summary", deserialize_with = "non_empty", skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,
    #[serde(default, deserialize_with = "string_or_null")]
    pub content: String,
    #[serde(default, deserialize_with = "first_of", skip_serializing_if = "Option::is_none")]
    pub pdf: Option<String>,
    #[serde(default, alias = "youtube", deserialize_with = "first_of", skip_serializing_if = "Option::is_none")]
    pub video: Option<String>,
}

impl Display for Post {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "slug={}, date={}, author={}\ntitle={}\nimage={}\nexcerpt={}\ncontent:\n{}",
               self.slug,
               self.date,
               self.author,
               self.title,
               self.image.as_deref().unwrap_or(""),
               self.excerpt.as_deref().unwrap_or(""),
               self.content
        )
    }
}

impl Post {
    pub fn file_name(&self) -> String {
        format!("{}.html", self.slug)
    }

    pub fn parsed_date(&self) -> Option<NaiveDate> {
        parse_iso_date(&self.date)
    }

    /// The stored excerpt, or one derived from the content when the stored one is unusable.
    pub fn summary(&self) -> String {
        match self.excerpt.as_deref() {
            Some(excerpt) if !excerpt_needs_rebuild(excerpt) => excerpt.trim().to_string(),
            _ => derive_excerpt(&self.content),
        }
    }

    /// Video announced by the image field, if it carries a `youtube_`/`vimeo_` marker.
    pub fn video_marker(&self) -> Option<Video> {
        self.image.as_deref().and_then(Video::from_marker)
    }

    /// Brings a record to the canonical shape used by the index.
    /// Slug uniqueness is handled by [`normalize_posts`].
    pub fn normalize(&mut self) {
        self.title = self.title.trim().to_string();
        if self.title.is_empty() {
            self.title = self.slug.clone();
        }

        if let Some(date) = parse_date_any(&self.date) {
            self.date = format_date(&date);
        } else {
            self.date = self.date.trim().to_string();
        }

        self.author = self.author.trim().to_string();
        if self.author.is_empty() {
            self.author = DEFAULT_AUTHOR.to_string();
        }

        self.content = sanitize_content(&self.content);
        self.excerpt = Some(self.summary()).filter(|e| !e.is_empty());
    }
}

fn string_or_null<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn non_empty<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|v| !v.trim().is_empty()))
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

// Older index files store attachments as lists
fn first_of<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<OneOrMany>::deserialize(deserializer)?;
    let first = match value {
        None => None,
        Some(OneOrMany::One(s)) => Some(s),
        Some(OneOrMany::Many(list)) => list.into_iter().find(|s| !s.trim().is_empty()),
    };
    Ok(first.filter(|v| !v.trim().is_empty()))
}

fn fallback_slug() -> String {
    format!("post-{}", Local::now().format("%Y%m%d%H%M%S"))
}

/// Returns `base`, or `base-2`, `base-3`, … whichever is not taken yet.
pub fn unique_slug(base: &str, taken: &HashSet<String>) -> String {
    if !taken.contains(base) {
        return base.to_string();
    }
    let mut idx = 2;
    loop {
        let candidate = format!("{}-{}", base, idx);
        if !taken.contains(&candidate) {
            return candidate;
        }
        idx += 1;
    }
}

/// Slug for a new title, never empty, never clashing with `taken`.
pub fn slug_for_title(title: &str, taken: &HashSet<String>) -> String {
    let slug = slugify(title);
    let slug = if slug.is_empty() { fallback_slug() } else { slug };
    unique_slug(&slug, taken)
}

fn date_order(a: &Post, b: &Post) -> Ordering {
    match (a.parsed_date(), b.parsed_date()) {
        (Some(da), Some(db)) => db.cmp(&da),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Newest first. Undated posts go last; ties keep their relative order.
pub fn sort_by_date(posts: &mut [Post]) {
    posts.sort_by(date_order);
}

pub fn normalize_posts(posts: Vec<Post>) -> Vec<Post> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut normalized = Vec::with_capacity(posts.len());

    for mut post in posts {
        post.normalize();

        // Existing slugs are file names on disk, only missing ones are derived
        let slug = post.slug.trim().to_string();
        let slug = if slug.is_empty() { slugify(&post.title) } else { slug };
        let slug = if slug.is_empty() { fallback_slug() } else { slug };
        let slug = unique_slug(&slug, &seen);
        seen.insert(slug.clone());
        post.slug = slug;
        if post.title.is_empty() {
            post.title = post.slug.clone();
        }

        normalized.push(post);
    }

    sort_by_date(&mut normalized);
    normalized
}

use std::ops::Index;

use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;

pub const EXCERPT_MAX_CHARS: usize = 220;
pub const EXCERPT_MIN_CHARS: usize = 10;

lazy_static! {
    static ref TAG_REGEX: Regex = Regex::new(r"<[^>]+>").unwrap();
    static ref YMD_REGEX: Regex = Regex::new(r"^(\d{4})[-/.](\d{1,2})[-/.](\d{1,2})$").unwrap();
    static ref DMY_REGEX: Regex = Regex::new(r"^(\d{1,2})[-/.](\d{1,2})[-/.](\d{4})$").unwrap();
}

/// Turns a title into a file-name safe identifier.
///
/// Accents are transliterated, anything that is not a letter, a digit, a space
/// or a hyphen is dropped, and runs of separators collapse into a single `-`.
/// The result may be empty; callers have to supply a fallback.
pub fn slugify(title: &str) -> String {
    let ascii = unidecode::unidecode(&title.to_lowercase()).to_lowercase();

    let mut slug = String::with_capacity(ascii.len());
    let mut pending_sep = false;
    for c in ascii.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_sep && !slug.is_empty() {
                slug.push('-');
            }
            pending_sep = false;
            slug.push(c);
        } else if c.is_whitespace() || c == '-' || c == '_' {
            pending_sep = true;
        }
    }

    slug
}

pub fn strip_tags(html: &str) -> String {
    TAG_REGEX.replace_all(html, "").trim().to_string()
}

/// Plain-text summary of an HTML body, cut at `EXCERPT_MAX_CHARS` characters.
pub fn derive_excerpt(content: &str) -> String {
    let text = strip_tags(content);
    if text.chars().count() > EXCERPT_MAX_CHARS {
        let cut: String = text.chars().take(EXCERPT_MAX_CHARS).collect();
        format!("{}...", cut)
    } else {
        text
    }
}

/// An excerpt is replaced when it is empty, is just a link, or carries too little text.
pub fn excerpt_needs_rebuild(excerpt: &str) -> bool {
    let excerpt = excerpt.trim();
    excerpt.is_empty()
        || excerpt.to_lowercase().starts_with("<a ")
        || strip_tags(excerpt).chars().count() < EXCERPT_MIN_CHARS
}

fn to_int<T: std::str::FromStr>(num_str: &str) -> Option<T> {
    num_str.parse::<T>().ok()
}

pub fn parse_iso_date(date: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d").ok()
}

/// Accepts `YYYY-MM-DD`, `DD/MM/YYYY` and the `.`/`/`/`-` variants of both.
pub fn parse_date_any(buf: &str) -> Option<NaiveDate> {
    let buf = buf.trim();
    if let Some(caps) = YMD_REGEX.captures(buf) {
        let y: i32 = to_int(caps.index(1))?;
        let m: u32 = to_int(caps.index(2))?;
        let d: u32 = to_int(caps.index(3))?;
        return NaiveDate::from_ymd_opt(y, m, d);
    }

    if let Some(caps) = DMY_REGEX.captures(buf) {
        let d: u32 = to_int(caps.index(1))?;
        let m: u32 = to_int(caps.index(2))?;
        let y: i32 = to_int(caps.index(3))?;
        return NaiveDate::from_ymd_opt(y, m, d);
    }

    None
}

pub fn format_date(date: &NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

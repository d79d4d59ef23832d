use lazy_static::lazy_static;
use regex::Regex;

const IMAGE_EXTENSIONS: [&str; 6] = [".jpg", ".jpeg", ".png", ".gif", ".webp", ".svg"];

pub const DEFAULT_COVER: &str = "../immagini/blog-cover_photo-300.jpeg";

lazy_static! {
    static ref YOUTUBE_URL_REGEX: Regex = Regex::new(r"(?:youtu\.be/|v=)([A-Za-z0-9_-]{6,})").unwrap();
    static ref VIMEO_URL_REGEX: Regex = Regex::new(r"vimeo\.com/(?:video/)?(\d+)").unwrap();
    static ref YOUTUBE_MARKER_REGEX: Regex = Regex::new(r"(?i)^youtube_([A-Za-z0-9_-]+)$").unwrap();
    static ref VIMEO_MARKER_REGEX: Regex = Regex::new(r"(?i)^vimeo_(\d+)$").unwrap();
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Video {
    YouTube(String),
    Vimeo(String),
}

impl Video {
    /// Recognizes a watch/share URL. YouTube is tried first.
    pub fn from_url(url: &str) -> Option<Video> {
        if let Some(caps) = YOUTUBE_URL_REGEX.captures(url) {
            return Some(Video::YouTube(caps[1].to_string()));
        }
        VIMEO_URL_REGEX.captures(url).map(|caps| Video::Vimeo(caps[1].to_string()))
    }

    /// Recognizes the `youtube_<id>` / `vimeo_<id>` markers stored in a post image field.
    pub fn from_marker(image: &str) -> Option<Video> {
        let image = image.trim();
        if let Some(caps) = YOUTUBE_MARKER_REGEX.captures(image) {
            return Some(Video::YouTube(caps[1].to_string()));
        }
        VIMEO_MARKER_REGEX.captures(image).map(|caps| Video::Vimeo(caps[1].to_string()))
    }

    pub fn marker(&self) -> String {
        match self {
            Video::YouTube(id) => format!("youtube_{}", id),
            Video::Vimeo(id) => format!("vimeo_{}", id),
        }
    }

    pub fn embed_url(&self) -> String {
        match self {
            Video::YouTube(id) => format!("https://www.youtube.com/embed/{}", id),
            Video::Vimeo(id) => format!("https://player.vimeo.com/video/{}", id),
        }
    }

    pub fn thumbnail_url(&self) -> String {
        match self {
            Video::YouTube(id) => format!("https://img.youtube.com/vi/{}/hqdefault.jpg", id),
            Video::Vimeo(id) => format!("https://vumbnail.com/{}.jpg", id),
        }
    }
}

fn has_extension(path: &str, extensions: &[&str]) -> bool {
    let lower = path.to_lowercase();
    extensions.iter().any(|ext| lower.ends_with(ext))
}

fn is_bare_file_name(path: &str) -> bool {
    !path.contains('/') && !path.contains('\\')
}

/// Maps an image or PDF reference, as stored in the index, to the path used
/// from a page inside the posts directory.
///
/// - `../…` is kept as is
/// - `immagini/…` and `pdf/…` get a `../` prefix
/// - a bare image file name goes under `../immagini/`
/// - a bare `.pdf` file name goes under `../pdf/`
/// - anything else (URLs included) passes through
pub fn resolve_asset(path: &str) -> String {
    let path = path.trim();
    if path.starts_with("../") {
        return path.to_string();
    }
    if path.starts_with("immagini/") || path.starts_with("pdf/") {
        return format!("../{}", path);
    }
    if is_bare_file_name(path) {
        if has_extension(path, &IMAGE_EXTENSIONS) {
            return format!("../immagini/{}", path);
        }
        if has_extension(path, &[".pdf"]) {
            return format!("../pdf/{}", path);
        }
    }
    path.to_string()
}

pub fn is_remote(path: &str) -> bool {
    path.contains("://") || path.starts_with("//")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_video_from_url() {
        assert_eq!(Video::from_url("https://www.youtube.com/watch?v=dQw4w9WgXcQ&t=10"), Some(Video::YouTube("dQw4w9WgXcQ".to_string())));
        assert_eq!(Video::from_url("https://youtu.be/dQw4w9WgXcQ"), Some(Video::YouTube("dQw4w9WgXcQ".to_string())));
        assert_eq!(Video::from_url("https://vimeo.com/76979871"), Some(Video::Vimeo("76979871".to_string())));
        assert_eq!(Video::from_url("https://player.vimeo.com/video/76979871"), Some(Video::Vimeo("76979871".to_string())));
        assert_eq!(Video::from_url("https://youtu.be/abc"), None);
        assert_eq!(Video::from_url("https://example.org/video.mp4"), None);
    }

    #[test]
    fn test_video_from_marker() {
        let video = Video::from_marker("youtube_dQw4w9WgXcQ").unwrap();
        assert_eq!(video.thumbnail_url(), "https://img.youtube.com/vi/dQw4w9WgXcQ/hqdefault.jpg");
        assert_eq!(video.embed_url(), "https://www.youtube.com/embed/dQw4w9WgXcQ");
        assert_eq!(video.marker(), "youtube_dQw4w9WgXcQ");

        let video = Video::from_marker("vimeo_12345").unwrap();
        assert_eq!(video.thumbnail_url(), "https://vumbnail.com/12345.jpg");
        assert_eq!(video.embed_url(), "https://player.vimeo.com/video/12345");

        assert_eq!(Video::from_marker("foto.jpg"), None);
        assert_eq!(Video::from_marker("vimeo_abc"), None);
    }

    #[test]
    fn test_resolve_asset() {
        assert_eq!(resolve_asset("../immagini/a.jpg"), "../immagini/a.jpg");
        assert_eq!(resolve_asset("immagini/a.jpg"), "../immagini/a.jpg");
        assert_eq!(resolve_asset("pdf/bando.pdf"), "../pdf/bando.pdf");
        assert_eq!(resolve_asset("foto.JPEG"), "../immagini/foto.JPEG");
        assert_eq!(resolve_asset("bando.pdf"), "../pdf/bando.pdf");
        assert_eq!(resolve_asset("docs/bando.pdf"), "docs/bando.pdf");
        assert_eq!(resolve_asset("https://example.org/a.png"), "https://example.org/a.png");
        assert_eq!(resolve_asset("notes.txt"), "notes.txt");
    }
}

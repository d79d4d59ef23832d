use std::collections::HashSet;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::{fs, io};

use anyhow::{anyhow, bail, Context};
use chrono::Local;
use spdlog::{info, warn};

use crate::config::SiteLayout;
use crate::deploy::{deploy, DeployReport};
use crate::news_store::NewsStore;
use crate::post::{normalize_posts, slug_for_title, sort_by_date, Post, DEFAULT_AUTHOR};
use crate::post_list::{PostList, PREVIEW_FILE};
use crate::reconciler::{add_missing, compare, reconcile_from_disk, SyncReport};
use crate::text_utils::{format_date, parse_date_any};
use crate::util::fs_helper::write_atomic;
use crate::view::list_renderer::{fix_legacy_links, ListRenderer};
use crate::view::post_renderer::PostRenderer;
use crate::view::SiteInfo;

pub const PLACEHOLDER_CONTENT: &str = "<p>Inserisci il contenuto qui</p>";

/// Field values for a new post or an edit. `None` leaves a field alone,
/// an empty string clears an optional one.
#[derive(Debug, Default, Clone)]
pub struct PostFields {
    pub title: Option<String>,
    pub date: Option<String>,
    pub author: Option<String>,
    pub image: Option<String>,
    pub excerpt: Option<String>,
    pub content: Option<String>,
    pub pdf: Option<String>,
    pub video: Option<String>,
}

fn optional(value: String) -> Option<String> {
    let value = value.trim().to_string();
    if value.is_empty() { None } else { Some(value) }
}

fn canonical_date(date: &str) -> String {
    match parse_date_any(date) {
        Some(date) => format_date(&date),
        None => date.trim().to_string(),
    }
}

impl PostFields {
    fn apply(self, post: &mut Post) {
        if let Some(title) = self.title {
            post.title = title.trim().to_string();
        }
        if let Some(date) = self.date {
            post.date = canonical_date(&date);
        }
        if let Some(author) = self.author {
            post.author = author.trim().to_string();
        }
        if let Some(image) = self.image {
            post.image = optional(image);
        }
        if let Some(excerpt) = self.excerpt {
            post.excerpt = optional(excerpt);
        }
        if let Some(content) = self.content {
            post.content = content;
        }
        if let Some(pdf) = self.pdf {
            post.pdf = optional(pdf);
        }
        if let Some(video) = self.video {
            post.video = optional(video);
        }
        if post.author.is_empty() {
            post.author = DEFAULT_AUTHOR.to_string();
        }
    }
}

/// Every operation on the news section of one site.
pub struct Newsroom {
    pub layout: SiteLayout,
    pub site: SiteInfo,
    store: NewsStore,
}

impl Newsroom {
    pub fn new(layout: SiteLayout, site: SiteInfo) -> Newsroom {
        let store = NewsStore::new(layout.index_file.clone(), layout.backup_dir.clone());
        Newsroom { layout, site, store }
    }

    fn post_list(&self) -> PostList {
        let mut excluded = vec![PREVIEW_FILE.to_string()];
        excluded.extend(self.layout.listing_file_name());
        PostList::new(self.layout.posts_dir.clone(), excluded)
    }

    fn page_path(&self, slug: &str) -> PathBuf {
        self.layout.posts_dir.join(format!("{}.html", slug))
    }

    pub fn posts(&self) -> anyhow::Result<Vec<Post>> {
        self.store.load().with_context(|| format!("Could not load {}", self.layout.index_file.display()))
    }

    fn save(&self, posts: &[Post]) -> anyhow::Result<()> {
        self.store.save(posts).with_context(|| format!("Could not save {}", self.layout.index_file.display()))?;
        Ok(())
    }

    pub fn get(&self, slug: &str) -> anyhow::Result<Post> {
        self.posts()?
            .into_iter()
            .find(|p| p.slug == slug)
            .ok_or_else(|| anyhow!("No post with slug '{}'", slug))
    }

    /// Path of the page of `slug`, which must exist.
    pub fn post_file(&self, slug: &str) -> io::Result<PathBuf> {
        let path = self.page_path(slug);
        if !path.is_file() {
            return Err(io::Error::new(ErrorKind::NotFound, format!("file not found: {}", path.display())));
        }
        Ok(path)
    }

    fn write_page(&self, post: &Post, path: &Path) -> anyhow::Result<()> {
        let renderer = PostRenderer::with_default_template(self.site.clone())?;
        let html = renderer.render(post);
        write_atomic(path, &html).with_context(|| format!("Could not write {}", path.display()))?;
        info!("Post written: {}", path.display());
        Ok(())
    }

    /// Rewrites the listing after an index change. A site without a listing
    /// page is left alone.
    fn refresh_listing(&self, posts: &[Post]) -> anyhow::Result<()> {
        if !self.layout.listing_page.is_file() {
            warn!("Listing page {} not found, not updated", self.layout.listing_page.display());
            return Ok(());
        }
        self.write_listing(posts, false)?;
        Ok(())
    }

    fn write_listing(&self, posts: &[Post], create: bool) -> anyhow::Result<PathBuf> {
        let path = &self.layout.listing_page;
        let renderer = ListRenderer::with_default_templates(self.site.clone())?;

        let html = match fs::read_to_string(path) {
            Ok(page) => renderer.update_page(&page, posts)
                .with_context(|| format!("Could not update {}", path.display()))?,
            Err(e) if e.kind() == ErrorKind::NotFound && create => renderer.render_page(posts),
            Err(e) => return Err(e).with_context(|| format!("Could not read {}", path.display())),
        };

        write_atomic(path, &html).with_context(|| format!("Could not write {}", path.display()))?;
        info!("Listing updated with {} posts: {}", posts.len(), path.display());
        Ok(path.clone())
    }

    /// Adds a post dated today (unless a date is given) and writes its page.
    pub fn create(&self, fields: PostFields, with_listing: bool) -> anyhow::Result<Post> {
        let title = fields.title.as_deref().map(str::trim).unwrap_or_default();
        if title.is_empty() {
            bail!("A new post needs a title");
        }

        let mut posts = self.posts()?;
        let taken: HashSet<String> = posts.iter().map(|p| p.slug.clone()).collect();

        let mut post = Post {
            slug: slug_for_title(title, &taken),
            date: format_date(&Local::now().date_naive()),
            content: PLACEHOLDER_CONTENT.to_string(),
            ..Default::default()
        };
        fields.apply(&mut post);

        posts.insert(0, post.clone());
        sort_by_date(&mut posts);

        // The page goes first and is removed again when the index cannot be saved
        let page = self.page_path(&post.slug);
        self.write_page(&post, &page)?;
        if let Err(e) = self.save(&posts) {
            let _ = fs::remove_file(&page);
            return Err(e);
        }
        if with_listing {
            self.refresh_listing(&posts)?;
        }
        info!("Post created: {}", post.slug);
        Ok(post)
    }

    /// Replaces the given fields of `slug`. The slug itself never changes.
    pub fn update(&self, slug: &str, fields: PostFields, with_listing: bool) -> anyhow::Result<Post> {
        let mut posts = self.posts()?;
        let post = match posts.iter_mut().find(|p| p.slug == slug) {
            Some(post) => post,
            None => bail!("No post with slug '{}'", slug),
        };
        fields.apply(post);
        let post = post.clone();

        self.save(&posts)?;
        self.write_page(&post, &self.page_path(slug))?;
        if with_listing {
            self.refresh_listing(&posts)?;
        }
        info!("Post updated: {}", slug);
        Ok(post)
    }

    /// Removes the index entry and the page of `slug`, whichever of the two exists.
    /// Fails only when there is neither.
    pub fn delete(&self, slug: &str, with_listing: bool) -> anyhow::Result<()> {
        let mut posts = self.posts()?;
        let before = posts.len();
        posts.retain(|p| p.slug != slug);
        let indexed = posts.len() != before;

        let path = self.page_path(slug);
        if !indexed && !path.is_file() {
            bail!("No post with slug '{}'", slug);
        }

        if indexed {
            self.save(&posts)?;
        } else {
            warn!("{} has no index entry, deleting the page only", slug);
        }

        match fs::remove_file(&path) {
            Ok(()) => info!("File deleted: {}", path.display()),
            Err(e) if e.kind() == ErrorKind::NotFound => warn!("Page {} was already missing", path.display()),
            Err(e) => return Err(e).with_context(|| format!("Could not delete {}", path.display())),
        }

        if with_listing && indexed {
            self.refresh_listing(&posts)?;
        }
        info!("Post deleted: {}", slug);
        Ok(())
    }

    /// Renders `slug` to the preview file, never to its own page.
    pub fn preview(&self, slug: &str) -> anyhow::Result<PathBuf> {
        let post = self.get(slug)?;
        let path = self.layout.posts_dir.join(PREVIEW_FILE);
        self.write_page(&post, &path)?;
        Ok(path)
    }

    /// Rewrites every page and the listing from the index.
    pub fn regenerate_all(&self) -> anyhow::Result<usize> {
        let posts = self.posts()?;
        for post in posts.iter() {
            self.write_page(post, &self.page_path(&post.slug))?;
        }
        self.refresh_listing(&posts)?;
        info!("Regenerated {} posts", posts.len());
        Ok(posts.len())
    }

    /// Replaces the index with what the pages on disk say.
    pub fn rebuild_index(&self) -> anyhow::Result<usize> {
        let posts = reconcile_from_disk(&self.post_list())
            .with_context(|| format!("Could not scan {}", self.layout.posts_dir.display()))?;
        self.save(&posts)?;
        Ok(posts.len())
    }

    /// Adds index entries for pages that have none. Nothing is saved when nothing is missing.
    pub fn sync_missing(&self) -> anyhow::Result<usize> {
        let existing = self.posts()?;
        let (posts, added) = add_missing(existing, &self.post_list())
            .with_context(|| format!("Could not scan {}", self.layout.posts_dir.display()))?;
        if added > 0 {
            self.save(&posts)?;
        }
        Ok(added)
    }

    pub fn status(&self) -> anyhow::Result<SyncReport> {
        let posts = self.posts()?;
        let report = compare(&posts, &self.post_list())
            .with_context(|| format!("Could not scan {}", self.layout.posts_dir.display()))?;
        Ok(report)
    }

    pub fn normalize_index(&self) -> anyhow::Result<usize> {
        let posts = normalize_posts(self.posts()?);
        self.save(&posts)?;
        info!("Index normalized: {} posts", posts.len());
        Ok(posts.len())
    }

    /// Rewrites the news grid of the listing. With `create`, a missing
    /// listing page is generated from scratch.
    pub fn update_listing(&self, create: bool) -> anyhow::Result<PathBuf> {
        let posts = self.posts()?;
        self.write_listing(&posts, create)
    }

    /// Repoints retired blog links in the listing, keeping a `.html.backup` copy.
    pub fn fix_links(&self) -> anyhow::Result<usize> {
        let path = &self.layout.listing_page;
        let page = fs::read_to_string(path).with_context(|| format!("Could not read {}", path.display()))?;
        let (fixed, count) = fix_legacy_links(&page);
        if count == 0 {
            return Ok(0);
        }

        let backup = path.with_extension("html.backup");
        fs::copy(path, &backup).with_context(|| format!("Could not write {}", backup.display()))?;
        write_atomic(path, &fixed).with_context(|| format!("Could not write {}", path.display()))?;
        info!("Fixed {} links in {}", count, path.display());
        Ok(count)
    }

    pub fn deploy(&self, to: Option<&Path>) -> anyhow::Result<DeployReport> {
        let publish_dir = match to.map(Path::to_path_buf).or_else(|| self.layout.publish_dir.clone()) {
            Some(dir) => dir,
            None => bail!("No publish directory: set [deploy] publish_dir or pass --to"),
        };
        let posts = self.posts()?;
        let report = deploy(&self.layout, &posts, &publish_dir)
            .with_context(|| format!("Could not deploy to {}", publish_dir.display()))?;
        Ok(report)
    }

    pub fn backups(&self) -> anyhow::Result<Vec<PathBuf>> {
        self.store.list_backups().with_context(|| format!("Could not list {}", self.layout.backup_dir.display()))
    }

    pub fn restore_backup(&self, name: &str) -> anyhow::Result<()> {
        self.store.restore(name).with_context(|| format!("Could not restore {}", name))
    }

    pub fn delete_backup(&self, name: &str) -> anyhow::Result<()> {
        self.store.delete_backup(name).with_context(|| format!("Could not delete backup {}", name))
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use crate::view::list_renderer::{MOBILE_SECTION, TABLE_START};

    use super::*;

    fn newsroom(dir: &TempDir) -> Newsroom {
        let site = SiteInfo {
            organization: "ARCS-VV".to_string(),
            organization_full: "Associazione Rete di Cittadinanza Solidale".to_string(),
            copyright_year: 2025,
        };
        Newsroom::new(SiteLayout::under(dir.path()), site)
    }

    fn fields(title: &str, date: &str) -> PostFields {
        PostFields {
            title: Some(title.to_string()),
            date: Some(date.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_create() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let room = newsroom(&dir);

        let post = room.create(PostFields { title: Some("Festa di Natale".to_string()), ..Default::default() }, true)?;
        assert_eq!(post.slug, "festa-di-natale");
        assert_eq!(post.date, format_date(&Local::now().date_naive()));
        assert_eq!(post.author, DEFAULT_AUTHOR);
        assert_eq!(post.content, PLACEHOLDER_CONTENT);

        let page = fs::read_to_string(room.post_file("festa-di-natale")?)?;
        assert!(page.contains("<title>Festa di Natale</title>"));

        let again = room.create(fields("Festa di Natale", "24/12/2024"), false)?;
        assert_eq!(again.slug, "festa-di-natale-2");
        assert_eq!(again.date, "2024-12-24");
        assert_eq!(room.posts()?.len(), 2);

        assert!(room.create(PostFields::default(), false).is_err());
        Ok(())
    }

    #[test]
    fn test_update() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let room = newsroom(&dir);
        room.create(PostFields { image: Some("foto.jpg".to_string()), ..fields("Assemblea", "2024-03-01") }, false)?;

        let post = room.update("assemblea", PostFields {
            title: Some("Assemblea dei soci".to_string()),
            content: Some("<p>Ordine del giorno</p>".to_string()),
            image: Some(String::new()),
            ..Default::default()
        }, false)?;
        assert_eq!(post.slug, "assemblea");
        assert_eq!(post.image, None);
        assert_eq!(room.get("assemblea")?, post);

        let page = fs::read_to_string(room.post_file("assemblea")?)?;
        assert!(page.contains("<p>Ordine del giorno</p>"));
        assert!(!page.contains("foto.jpg"));

        assert!(room.update("nessuno", PostFields::default(), false).is_err());
        Ok(())
    }

    #[test]
    fn test_delete() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let room = newsroom(&dir);
        room.create(fields("x", "2024-01-01"), false)?;
        room.create(fields("y", "2024-01-02"), false)?;
        room.update_listing(true)?;

        room.delete("x", true)?;
        let slugs: Vec<String> = room.posts()?.into_iter().map(|p| p.slug).collect();
        assert_eq!(slugs, ["y"]);
        assert!(!room.layout.posts_dir.join("x.html").exists());
        assert_eq!(room.post_file("x").unwrap_err().kind(), ErrorKind::NotFound);

        let listing = fs::read_to_string(&room.layout.listing_page)?;
        assert!(!listing.contains("news/x.html"));
        assert!(listing.contains("news/y.html"));

        // Entry with its page already gone
        room.create(fields("z", "2024-01-03"), false)?;
        fs::remove_file(room.layout.posts_dir.join("z.html"))?;
        room.delete("z", false)?;
        assert!(room.delete("z", false).is_err());
        Ok(())
    }

    #[test]
    fn test_delete_orphan_page() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let room = newsroom(&dir);
        room.create(fields("y", "2024-01-02"), false)?;
        fs::write(room.layout.posts_dir.join("x.html"), "<html><body>x</body></html>")?;
        assert_eq!(room.status()?.orphans, ["x"]);
        let backups = room.backups()?.len();

        room.delete("x", true)?;
        assert!(!room.layout.posts_dir.join("x.html").exists());
        assert_eq!(room.posts()?.len(), 1);
        assert_eq!(room.backups()?.len(), backups);
        assert!(room.status()?.is_clean());
        assert!(room.delete("x", true).is_err());
        Ok(())
    }

    #[test]
    fn test_create_keeps_index_and_pages_paired() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let room = newsroom(&dir);
        fs::create_dir_all(&room.layout.posts_dir)?;
        // A file where the backup directory should be makes every save fail
        fs::write(&room.layout.backup_dir, "")?;

        assert!(room.create(fields("Senza indice", "2024-01-01"), false).is_err());
        assert!(!room.layout.posts_dir.join("senza-indice.html").exists());
        assert!(!room.layout.index_file.exists());
        Ok(())
    }

    #[test]
    fn test_update_listing() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let room = newsroom(&dir);
        room.create(fields("Primo", "2024-01-01"), false)?;

        assert!(room.update_listing(false).is_err());
        let path = room.update_listing(true)?;
        let page = fs::read_to_string(&path)?;
        assert!(page.contains(TABLE_START));
        assert!(page.contains(MOBILE_SECTION));
        assert!(page.contains("news/primo.html"));

        fs::write(&path, "<html>rotto</html>")?;
        assert!(room.update_listing(true).is_err());
        assert_eq!(fs::read_to_string(&path)?, "<html>rotto</html>");
        Ok(())
    }

    #[test]
    fn test_preview_not_indexed() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let room = newsroom(&dir);
        room.create(fields("Anteprima", "2024-01-01"), false)?;

        let path = room.preview("anteprima")?;
        assert_eq!(path.file_name().and_then(|n| n.to_str()), Some(PREVIEW_FILE));
        assert!(room.status()?.is_clean());
        assert_eq!(room.sync_missing()?, 0);
        Ok(())
    }

    #[test]
    fn test_rebuild_and_sync() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let room = newsroom(&dir);
        room.create(PostFields { excerpt: Some("Un riassunto abbastanza lungo.".to_string()), ..fields("Uno", "2024-01-01") }, false)?;
        room.create(fields("Due", "2024-02-01"), false)?;
        let before = room.posts()?;

        assert_eq!(room.rebuild_index()?, 2);
        let after = room.posts()?;
        assert_eq!(after.len(), 2);
        for (a, b) in before.iter().zip(after.iter()) {
            assert_eq!(a.slug, b.slug);
            assert_eq!(a.title, b.title);
            assert_eq!(a.date, b.date);
            assert_eq!(a.author, b.author);
            assert_eq!(a.content, b.content);
        }
        assert_eq!(after[1].excerpt.as_deref(), Some("Un riassunto abbastanza lungo."));

        let rebuilt = fs::read_to_string(&room.layout.index_file)?;
        room.rebuild_index()?;
        assert_eq!(fs::read_to_string(&room.layout.index_file)?, rebuilt);

        let mut posts = room.posts()?;
        posts.retain(|p| p.slug != "uno");
        room.store.save(&posts)?;
        let report = room.status()?;
        assert_eq!(report.orphans, ["uno"]);
        assert_eq!(room.sync_missing()?, 1);
        assert!(room.status()?.is_clean());
        Ok(())
    }

    #[test]
    fn test_normalize_index() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let room = newsroom(&dir);
        fs::create_dir_all(&room.layout.posts_dir)?;
        fs::write(&room.layout.index_file, r#"[
  {"title": "  Vecchio  ", "slug": "", "date": "01/02/2023", "content": "<p>Testo</p>"},
  {"title": "Vecchio", "slug": "", "date": "2023-03-01", "summary": null, "content": null}
]"#)?;

        assert_eq!(room.normalize_index()?, 2);
        let posts = room.posts()?;
        assert_eq!(posts[0].slug, "vecchio-2");
        assert_eq!(posts[1].slug, "vecchio");
        assert_eq!(posts[1].title, "Vecchio");
        assert_eq!(posts[1].date, "2023-02-01");
        assert_eq!(posts[1].author, DEFAULT_AUTHOR);
        Ok(())
    }

    #[test]
    fn test_fix_links() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let room = newsroom(&dir);
        let original = r#"<a href="../blog/posts/a.html">a</a>"#;
        fs::write(&room.layout.listing_page, original)?;

        assert_eq!(room.fix_links()?, 1);
        assert_eq!(fs::read_to_string(&room.layout.listing_page)?, r#"<a href="../news/a.html">a</a>"#);
        assert_eq!(fs::read_to_string(dir.path().join("news.html.backup"))?, original);
        assert_eq!(room.fix_links()?, 0);
        Ok(())
    }

    #[test]
    fn test_backups() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let room = newsroom(&dir);
        room.create(fields("Uno", "2024-01-01"), false)?;
        room.create(fields("Due", "2024-01-02"), false)?;
        assert_eq!(room.backups()?.len(), 2);

        let oldest = room.backups()?.pop().unwrap();
        let name = oldest.file_name().and_then(|n| n.to_str()).unwrap().to_string();
        room.restore_backup(&name)?;
        assert!(room.posts()?.is_empty());

        room.delete_backup(&name)?;
        assert_eq!(room.backups()?.len(), 2);
        Ok(())
    }

    #[test]
    fn test_deploy_needs_target() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let room = newsroom(&dir);
        assert!(room.deploy(None).is_err());

        let public = TempDir::new()?;
        room.create(fields("Uno", "2024-01-01"), false)?;
        let report = room.deploy(Some(public.path()))?;
        assert_eq!(report.pages, 1);
        assert!(report.index);
        Ok(())
    }
}

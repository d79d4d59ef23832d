use std::collections::HashSet;
use std::io;

use spdlog::{info, warn};

use crate::content::html_scraper::scrape_file;
use crate::post::{normalize_posts, Post};
use crate::post_list::PostList;

/// Index entries and post files that do not match up.
#[derive(Debug, Default, PartialEq)]
pub struct SyncReport {
    /// Each index entry and whether its page exists.
    pub entries: Vec<(String, bool)>,
    /// Pages with no index entry.
    pub orphans: Vec<String>,
}

impl SyncReport {
    pub fn missing(&self) -> Vec<&str> {
        self.entries.iter()
            .filter(|(_, present)| !present)
            .map(|(slug, _)| slug.as_str())
            .collect()
    }

    pub fn is_clean(&self) -> bool {
        self.orphans.is_empty() && self.entries.iter().all(|(_, present)| *present)
    }
}

fn scrape_all(post_list: &PostList, skip: &HashSet<String>) -> io::Result<Vec<Post>> {
    let mut posts = vec![];
    for path in post_list.retrieve_files()? {
        let slug = path.file_stem().and_then(|s| s.to_str()).unwrap_or_default();
        if skip.contains(slug) {
            continue;
        }
        match scrape_file(&path) {
            Ok(post) => posts.push(post),
            Err(e) => warn!("Skipping {}: {}", path.display(), e),
        }
    }
    Ok(posts)
}

/// Rebuilds the whole index from the pages on disk.
pub fn reconcile_from_disk(post_list: &PostList) -> io::Result<Vec<Post>> {
    let scraped = scrape_all(post_list, &HashSet::new())?;
    let posts = normalize_posts(scraped);
    info!("Index rebuilt from {} pages in {}", posts.len(), post_list.root_dir.display());
    Ok(posts)
}

/// Appends an entry for every page whose slug is not in `existing`.
/// Existing entries are kept as they are. Returns the new index and the count added.
pub fn add_missing(existing: Vec<Post>, post_list: &PostList) -> io::Result<(Vec<Post>, usize)> {
    let known: HashSet<String> = existing.iter().map(|p| p.slug.clone()).collect();
    let mut added = scrape_all(post_list, &known)?;
    for post in added.iter_mut() {
        post.normalize();
    }

    let count = added.len();
    let mut posts = existing;
    posts.extend(added);
    info!("Added {} pages missing from the index", count);
    Ok((posts, count))
}

pub fn compare(index: &[Post], post_list: &PostList) -> io::Result<SyncReport> {
    let on_disk: HashSet<String> = post_list.retrieve_slugs()?.into_iter().collect();
    let indexed: HashSet<&str> = index.iter().map(|p| p.slug.as_str()).collect();

    let entries = index.iter()
        .map(|p| (p.slug.clone(), on_disk.contains(&p.slug)))
        .collect();

    let mut orphans: Vec<String> = on_disk.into_iter()
        .filter(|slug| !indexed.contains(slug.as_str()))
        .collect();
    orphans.sort();

    Ok(SyncReport { entries, orphans })
}

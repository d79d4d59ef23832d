use std::collections::BTreeSet;
use std::io;
use std::path::{Path, PathBuf};

use spdlog::{info, warn};

use crate::config::SiteLayout;
use crate::media::{is_remote, resolve_asset};
use crate::post::Post;
use crate::post_list::{PostList, PREVIEW_FILE};
use crate::util::fs_helper::{copy_file, normalize_path};

#[derive(Debug, Default, PartialEq)]
pub struct DeployReport {
    pub index: bool,
    pub pages: usize,
    pub listing: bool,
    pub assets: usize,
    pub missing_assets: Vec<PathBuf>,
}

/// Copies `src` to the same place under `publish_dir` that it has under `site_root`.
fn mirror(src: &Path, layout: &SiteLayout, publish_dir: &Path) -> io::Result<bool> {
    let rel = match src.strip_prefix(&layout.site_root) {
        Ok(rel) => rel,
        Err(_) => {
            warn!("Not deploying {}: outside of {}", src.display(), layout.site_root.display());
            return Ok(false);
        }
    };
    copy_file(src, &publish_dir.join(rel))?;
    Ok(true)
}

/// Image and PDF files referenced by the posts, as paths on disk.
pub fn referenced_assets(posts: &[Post], posts_dir: &Path) -> BTreeSet<PathBuf> {
    let mut assets = BTreeSet::new();
    for post in posts {
        let image = post.image.as_deref().filter(|_| post.video_marker().is_none());
        for asset in image.into_iter().chain(post.pdf.as_deref()) {
            if is_remote(asset) {
                continue;
            }
            assets.insert(normalize_path(&posts_dir.join(resolve_asset(asset))));
        }
    }
    assets
}

/// Publishes the index, the post pages, the listing and the assets they use.
pub fn deploy(layout: &SiteLayout, posts: &[Post], publish_dir: &Path) -> io::Result<DeployReport> {
    let layout = SiteLayout {
        site_root: normalize_path(&layout.site_root),
        posts_dir: normalize_path(&layout.posts_dir),
        listing_page: normalize_path(&layout.listing_page),
        index_file: normalize_path(&layout.index_file),
        ..layout.clone()
    };
    let mut report = DeployReport::default();

    if layout.index_file.is_file() {
        report.index = mirror(&layout.index_file, &layout, publish_dir)?;
    }

    let mut excluded = vec![PREVIEW_FILE.to_string()];
    excluded.extend(layout.listing_file_name());
    let post_list = PostList::new(layout.posts_dir.clone(), excluded);
    for page in post_list.retrieve_files()? {
        if mirror(&page, &layout, publish_dir)? {
            report.pages += 1;
        }
    }

    if layout.listing_page.is_file() {
        report.listing = mirror(&layout.listing_page, &layout, publish_dir)?;
    }

    for asset in referenced_assets(posts, &layout.posts_dir) {
        if !asset.is_file() {
            warn!("Asset not found: {}", asset.display());
            report.missing_assets.push(asset);
            continue;
        }
        if mirror(&asset, &layout, publish_dir)? {
            report.assets += 1;
        }
    }

    info!("Deployed {} pages and {} assets to {}", report.pages, report.assets, publish_dir.display());
    Ok(report)
}

use std::fs;
use std::fs::File;
use std::io;
use std::io::Write;
use std::path::Path;

const CONFIG_SAMPLE: &str = r#"# For the file locations, if you want them relative to the executable directory
# use ${exe_dir}/location. Relative paths are relative to site_root, and a
# relative site_root is relative to this file.
[paths]
site_root = "."
posts_dir = "pages/news"
listing_page = "pages/news.html"
# index_file = "pages/news/news.json"
# backup_dir = "pages/news/backups"

[site]
organization = "ARCS-VV"
organization_full = "Associazione Rete di Cittadinanza Solidale"
# copyright_year = 2025

[deploy]
publish_dir = "public"

[log]
level = "Info"
log_to_console = true
# location = "logs/newsdesk.log"
"#;

pub(crate) fn write_sample_cfg(file_path: &Path) -> io::Result<()> {
    if let Some(parent) = file_path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = File::create(file_path)?;
    file.write_all(CONFIG_SAMPLE.as_bytes())
}

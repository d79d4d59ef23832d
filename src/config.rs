use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::{env, fs, io};

use serde::Deserialize;

use crate::view::SiteInfo;

#[derive(Deserialize)]
pub struct Paths {
    #[serde(default = "default_site_root")]
    pub site_root: PathBuf,
    pub posts_dir: PathBuf,
    pub listing_page: PathBuf,
    pub index_file: Option<PathBuf>,
    pub backup_dir: Option<PathBuf>,
}

fn default_site_root() -> PathBuf {
    PathBuf::from(".")
}

#[derive(Deserialize, Default)]
pub struct Site {
    pub organization: Option<String>,
    pub organization_full: Option<String>,
    pub copyright_year: Option<i32>,
}

#[derive(Deserialize)]
pub struct Deploy {
    pub publish_dir: PathBuf,
}

#[derive(Deserialize)]
pub struct Log {
    pub level: LogLevel,
    pub log_to_console: bool,
    pub location: Option<PathBuf>,
}

#[derive(Deserialize, Copy, Clone, Debug, PartialEq)]
pub enum LogLevel {
    Critical = 0,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

#[derive(Deserialize)]
pub struct Config {
    pub paths: Paths,
    #[serde(default)]
    pub site: Site,
    pub deploy: Option<Deploy>,
    pub log: Option<Log>,
}

/// Where everything lives, with every path already resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct SiteLayout {
    pub site_root: PathBuf,
    pub posts_dir: PathBuf,
    pub listing_page: PathBuf,
    pub index_file: PathBuf,
    pub backup_dir: PathBuf,
    pub publish_dir: Option<PathBuf>,
}

impl SiteLayout {
    /// Standard layout under `site_root`: posts in `news/`, listing next to it.
    pub fn under(site_root: &Path) -> SiteLayout {
        let posts_dir = site_root.join("news");
        SiteLayout {
            site_root: site_root.to_path_buf(),
            listing_page: site_root.join("news.html"),
            index_file: posts_dir.join("news.json"),
            backup_dir: posts_dir.join("backups"),
            posts_dir,
            publish_dir: None,
        }
    }

    pub fn listing_file_name(&self) -> Option<String> {
        self.listing_page.file_name().and_then(|n| n.to_str()).map(|n| n.to_string())
    }
}

impl Config {
    /// Resolves the configured paths against `site_root`. `site_root_override`
    /// takes the place of `paths.site_root` when given.
    pub fn layout(&self, site_root_override: Option<&Path>) -> SiteLayout {
        let site_root = match site_root_override {
            Some(root) => root.to_path_buf(),
            None => self.paths.site_root.clone(),
        };
        let posts_dir = site_root.join(&self.paths.posts_dir);
        let index_file = match self.paths.index_file {
            Some(ref p) => site_root.join(p),
            None => posts_dir.join("news.json"),
        };
        let backup_dir = match self.paths.backup_dir {
            Some(ref p) => site_root.join(p),
            None => posts_dir.join("backups"),
        };

        SiteLayout {
            listing_page: site_root.join(&self.paths.listing_page),
            publish_dir: self.deploy.as_ref().map(|d| site_root.join(&d.publish_dir)),
            site_root,
            posts_dir,
            index_file,
            backup_dir,
        }
    }

    pub fn site_info(&self) -> SiteInfo {
        let default = SiteInfo::default();
        SiteInfo {
            organization: self.site.organization.clone().unwrap_or(default.organization),
            organization_full: self.site.organization_full.clone().unwrap_or(default.organization_full),
            copyright_year: self.site.copyright_year.unwrap_or(default.copyright_year),
        }
    }
}

fn parse_path(path: PathBuf) -> io::Result<PathBuf> {
    if path.starts_with("${exe_dir}") {
        let cur_exe = env::current_exe()?;
        let exe_dir = cur_exe.parent().unwrap_or(Path::new("."));
        let str_path = path.to_string_lossy();
        Ok(PathBuf::from(str_path.replace("${exe_dir}", &exe_dir.to_string_lossy())))
    } else {
        Ok(path)
    }
}

pub fn parse_config(cfg_content: &str) -> io::Result<Config> {
    match toml::from_str::<Config>(cfg_content) {
        Ok(cfg) => Ok(cfg),
        Err(e) => Err(io::Error::new(
            ErrorKind::InvalidData, format!("Error parsing configuration file: {}", e))),
    }
}

pub fn read_config(cfg_path: &Path) -> io::Result<Config> {
    let cfg_content = match fs::read_to_string(cfg_path) {
        Ok(content) => content,
        Err(e) => return Err(io::Error::new(e.kind(), format!("Error opening configuration file {}: {}", cfg_path.display(), e))),
    };

    let mut cfg = parse_config(&cfg_content)?;

    // A relative site root is relative to the file that names it
    let cfg_dir = cfg_path.parent().unwrap_or(Path::new(""));
    let site_root = parse_path(cfg.paths.site_root)?;
    cfg.paths.site_root = if site_root.is_relative() { cfg_dir.join(site_root) } else { site_root };

    cfg.paths.posts_dir = parse_path(cfg.paths.posts_dir)?;
    cfg.paths.listing_page = parse_path(cfg.paths.listing_page)?;
    cfg.paths.index_file = cfg.paths.index_file.map(parse_path).transpose()?;
    cfg.paths.backup_dir = cfg.paths.backup_dir.map(parse_path).transpose()?;
    if let Some(ref mut deploy) = cfg.deploy {
        deploy.publish_dir = parse_path(deploy.publish_dir.clone())?;
    }
    if let Some(ref mut log) = cfg.log {
        log.location = log.location.clone().map(parse_path).transpose()?;
    }

    Ok(cfg)
}

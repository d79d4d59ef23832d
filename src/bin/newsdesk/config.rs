use std::env;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use newsdesk::config::{read_config, Config, SiteLayout};
use newsdesk::newsroom::Newsroom;
use newsdesk::view::SiteInfo;

use crate::config_data::write_sample_cfg;
use crate::CFG_FILE_NAME;

fn get_config_path() -> Option<PathBuf> {
    if let Ok(exe_path) = env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            if exe_dir.join(CFG_FILE_NAME).exists() {
                return Some(exe_dir.join(CFG_FILE_NAME));
            }
        }
    }

    if let Ok(cur_dir) = env::current_dir() {
        if cur_dir.join(CFG_FILE_NAME).exists() {
            return Some(cur_dir.join(CFG_FILE_NAME));
        }
    }

    let cfg_dir = dirs::config_dir()?;
    if cfg_dir.join(CFG_FILE_NAME).exists() {
        return Some(cfg_dir.join(CFG_FILE_NAME));
    }

    None
}

/// The configuration named on the command line, else the first one found.
/// Not finding one is only an error when a path was given.
pub(crate) fn open_config(cfg_path: Option<PathBuf>) -> Result<Option<Config>> {
    let config_path = match cfg_path.or_else(get_config_path) {
        None => return Ok(None),
        Some(x) => x,
    };
    let config = read_config(&config_path)?;
    Ok(Some(config))
}

pub(crate) fn open_newsroom(config: Option<&Config>, site_root: Option<&Path>) -> Result<Newsroom> {
    match (config, site_root) {
        (Some(config), _) => Ok(Newsroom::new(config.layout(site_root), config.site_info())),
        (None, Some(site_root)) => Ok(Newsroom::new(SiteLayout::under(site_root), SiteInfo::default())),
        (None, None) => bail!("Could not find {}. Run newsdesk init-config or pass --site-root", CFG_FILE_NAME),
    }
}

pub(crate) fn generate_cfg(config_path: Option<PathBuf>) -> Result<PathBuf> {
    let path = match config_path {
        Some(path) => path,
        None => {
            let cfg_dir = dirs::config_dir().ok_or_else(|| anyhow!("Could not find user config dir"))?;
            cfg_dir.join(CFG_FILE_NAME)
        }
    };

    if path.exists() {
        bail!("{} already exists", path.display());
    }
    write_sample_cfg(&path).with_context(|| format!("Could not write {}", path.display()))?;

    Ok(path)
}

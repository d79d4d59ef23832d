use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::{fs, io};

use chrono::Local;
use spdlog::info;

use crate::post::Post;
use crate::util::fs_helper::write_atomic;

const BACKUP_PREFIX: &str = "news_";

/// The `news.json` index plus its directory of timestamped snapshots.
pub struct NewsStore {
    pub index_file: PathBuf,
    pub backup_dir: PathBuf,
}

impl NewsStore {
    pub fn new(index_file: PathBuf, backup_dir: PathBuf) -> NewsStore {
        NewsStore { index_file, backup_dir }
    }

    /// An absent index reads as an empty one.
    pub fn load(&self) -> io::Result<Vec<Post>> {
        let raw = match fs::read_to_string(&self.index_file) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(vec![]),
            Err(e) => return Err(e),
        };

        if raw.trim().is_empty() {
            return Ok(vec![]);
        }

        match serde_json::from_str::<Vec<Post>>(&raw) {
            Ok(posts) => Ok(posts),
            Err(e) => Err(io::Error::new(
                ErrorKind::InvalidData, format!("Error parsing {}: {}", self.index_file.display(), e))),
        }
    }

    /// Snapshots the current index, then replaces it. Returns the snapshot path.
    pub fn save(&self, posts: &[Post]) -> io::Result<PathBuf> {
        let backup = self.backup()?;
        let json = serde_json::to_string_pretty(posts)?;
        write_atomic(&self.index_file, &json)?;
        info!("Saved {} posts to {}", posts.len(), self.index_file.display());
        Ok(backup)
    }

    fn next_backup_path(&self) -> PathBuf {
        let stamp = Local::now().format("%Y%m%d_%H%M%S").to_string();
        let path = self.backup_dir.join(format!("{}{}.json", BACKUP_PREFIX, stamp));
        if !path.exists() {
            return path;
        }
        let mut idx = 2;
        loop {
            let path = self.backup_dir.join(format!("{}{}_{}.json", BACKUP_PREFIX, stamp, idx));
            if !path.exists() {
                return path;
            }
            idx += 1;
        }
    }

    /// Writes one new snapshot of the index. Without an index the snapshot is `[]`.
    pub fn backup(&self) -> io::Result<PathBuf> {
        fs::create_dir_all(&self.backup_dir)?;
        let path = self.next_backup_path();
        if self.index_file.exists() {
            fs::copy(&self.index_file, &path)?;
        } else {
            fs::write(&path, "[]")?;
        }
        info!("Backup created: {}", path.display());
        Ok(path)
    }

    /// Snapshots, newest first.
    pub fn list_backups(&self) -> io::Result<Vec<PathBuf>> {
        let entries = match fs::read_dir(&self.backup_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(vec![]),
            Err(e) => return Err(e),
        };

        let mut backups = vec![];
        for entry in entries {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) == Some("json") {
                backups.push(path);
            }
        }

        backups.sort_by(|a, b| {
            let ma = fs::metadata(a).and_then(|m| m.modified()).ok();
            let mb = fs::metadata(b).and_then(|m| m.modified()).ok();
            mb.cmp(&ma).then_with(|| b.cmp(a))
        });
        Ok(backups)
    }

    fn backup_path(&self, name: &str) -> io::Result<PathBuf> {
        let file_name = Path::new(name).file_name();
        let path = match file_name {
            Some(file_name) if file_name == name => self.backup_dir.join(file_name),
            _ => return Err(io::Error::new(ErrorKind::InvalidInput, format!("Invalid backup name: {}", name))),
        };
        if !path.is_file() {
            return Err(io::Error::new(ErrorKind::NotFound, format!("Backup not found: {}", path.display())));
        }
        Ok(path)
    }

    /// Puts a snapshot back in place of the index; the index being replaced is snapshotted first.
    pub fn restore(&self, name: &str) -> io::Result<()> {
        let path = self.backup_path(name)?;
        let raw = fs::read_to_string(&path)?;
        if let Err(e) = serde_json::from_str::<Vec<Post>>(&raw) {
            return Err(io::Error::new(ErrorKind::InvalidData, format!("Backup {} is not a valid index: {}", name, e)));
        }
        self.backup()?;
        write_atomic(&self.index_file, &raw)?;
        info!("Index restored from {}", path.display());
        Ok(())
    }

    pub fn delete_backup(&self, name: &str) -> io::Result<()> {
        let path = self.backup_path(name)?;
        fs::remove_file(&path)?;
        info!("Backup deleted: {}", path.display());
        Ok(())
    }
}

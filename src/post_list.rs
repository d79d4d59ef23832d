use std::io::ErrorKind;
use std::path::PathBuf;
use std::{fs, io};

pub const PREVIEW_FILE: &str = "temp_preview.html";

/// The `*.html` post pages of a directory.
pub struct PostList {
    pub root_dir: PathBuf,
    /// File names that live next to the posts but are not posts.
    pub excluded: Vec<String>,
}

impl PostList {
    pub fn new(root_dir: PathBuf, excluded: Vec<String>) -> PostList {
        PostList { root_dir, excluded }
    }

    /// Post files sorted by name. A missing directory has no posts.
    pub fn retrieve_files(&self) -> io::Result<Vec<PathBuf>> {
        let entries = match fs::read_dir(self.root_dir.as_path()) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(vec![]),
            Err(e) => return Err(e),
        };

        let mut posts = vec![];
        for entry in entries.flatten() {
            if let Ok(file_type) = entry.file_type() {
                if !file_type.is_file() {
                    continue;
                }
                let file_name = entry.file_name();
                if let Some(file_name) = file_name.to_str() {
                    if file_name.ends_with(".html") && !self.excluded.iter().any(|x| x == file_name) {
                        posts.push(entry.path());
                    }
                }
            }
        }
        posts.sort();
        Ok(posts)
    }

    /// File stems of the post files, which are the slugs they belong to.
    pub fn retrieve_slugs(&self) -> io::Result<Vec<String>> {
        let files = self.retrieve_files()?;
        Ok(files.iter()
            .filter_map(|p| p.file_stem().and_then(|s| s.to_str()).map(|s| s.to_string()))
            .collect())
    }
}

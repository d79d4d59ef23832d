use std::ffi::OsString;
use std::path::{Component, Path, PathBuf};
use std::{fs, io};

/// Writes `contents` next to `path` and renames it into place, so readers
/// never see a half-written file.
pub fn write_atomic(path: &Path, contents: &str) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let mut tmp_name: OsString = path.file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| OsString::from("newsdesk"));
    tmp_name.push(".tmp");
    let tmp_path = path.with_file_name(tmp_name);

    fs::write(&tmp_path, contents)?;
    if let Err(e) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(e);
    }
    Ok(())
}

/// Resolves `.` and `..` without touching the file system.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut res = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !res.pop() {
                    res.push("..");
                }
            }
            other => res.push(other.as_os_str()),
        }
    }
    res
}

/// Copies `src` to `dst`, creating the destination directory when needed.
pub fn copy_file(src: &Path, dst: &Path) -> io::Result<u64> {
    if let Some(parent) = dst.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::copy(src, dst)
}

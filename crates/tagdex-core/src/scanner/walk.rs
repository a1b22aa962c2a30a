use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Lazily enumerate every non-directory entry below `root`.
///
/// Symlinks are not followed, so a link to a file shows up as a path of
/// its own. A link to a directory counts as a directory and is skipped.
/// Directories that cannot be read are skipped; per-file problems surface
/// later when the scan stats or hashes the file. Each call starts a fresh
/// traversal.
pub fn walk(root: &Path) -> impl Iterator<Item = PathBuf> {
    let root = root.to_path_buf();
    WalkDir::new(&root)
        .follow_links(false)
        .into_iter()
        .filter_map(move |entry| match entry {
            Ok(entry) => Some(entry),
            Err(err) => {
                debug!("Skipping unreadable entry below {}: {}", root.display(), err);
                None
            }
        })
        .filter(|entry| !entry.file_type().is_dir() && !is_dir_link(entry))
        .map(|entry| entry.into_path())
}

fn is_dir_link(entry: &walkdir::DirEntry) -> bool {
    entry.path_is_symlink() && fs::metadata(entry.path()).map_or(false, |m| m.is_dir())
}

/// Chain the walks of several roots into one pending sequence.
pub fn walk_all(roots: Vec<PathBuf>) -> impl Iterator<Item = PathBuf> {
    roots.into_iter().flat_map(|root| walk(&root))
}

/// Remove roots that live inside other roots so every file is walked once.
pub fn non_overlapping_roots(roots: Vec<PathBuf>) -> Vec<PathBuf> {
    let mut result: Vec<PathBuf> = Vec::new();

    for dir in roots {
        if result.iter().any(|kept| dir.starts_with(kept)) {
            continue;
        }
        result.retain(|kept| !kept.starts_with(&dir));
        result.push(dir);
    }

    result
}

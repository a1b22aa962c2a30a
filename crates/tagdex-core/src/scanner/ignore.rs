use std::fmt;
use std::fs;
use std::path::Path;

use crate::config::IgnoreConfig;

/// The rule that caused a file to be left out of the index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IgnoreReason {
    PathContains(String),
    FileName(String),
    Extension(String),
    EmptyFile,
    Symlink,
}

impl fmt::Display for IgnoreReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IgnoreReason::PathContains(pattern) => write!(f, "path contains \"{}\"", pattern),
            IgnoreReason::FileName(name) => write!(f, "file name is \"{}\"", name),
            IgnoreReason::Extension(ext) => write!(f, "extension \"{}\"", ext),
            IgnoreReason::EmptyFile => write!(f, "empty file"),
            IgnoreReason::Symlink => write!(f, "symbolic link"),
        }
    }
}

/// Layered ignore rules. Name-based rules are pure string checks; the
/// essential rules need filesystem metadata and are evaluated separately so
/// the scan can tell a vanished file from an ignored one.
#[derive(Debug, Clone, Default)]
pub struct IgnoreRules {
    paths: Vec<String>,
    filenames: Vec<String>,
    extensions: Vec<String>,
    empty_files: bool,
    symlinks: bool,
}

impl IgnoreRules {
    pub fn from_config(config: &IgnoreConfig) -> Self {
        Self {
            paths: non_empty(&config.name_based.paths),
            filenames: non_empty(&config.name_based.filenames),
            extensions: non_empty(&config.name_based.extensions),
            empty_files: config.empty_files,
            symlinks: config.symlinks,
        }
    }

    /// Path substrings, then exact file names, then extension suffixes.
    pub fn check_name(&self, path: &str, basename: &str) -> Option<IgnoreReason> {
        if let Some(pattern) = self.paths.iter().find(|p| path.contains(p.as_str())) {
            return Some(IgnoreReason::PathContains(pattern.clone()));
        }
        if let Some(name) = self.filenames.iter().find(|n| basename == n.as_str()) {
            return Some(IgnoreReason::FileName(name.clone()));
        }
        if let Some(ext) = self.extensions.iter().find(|e| basename.ends_with(e.as_str())) {
            return Some(IgnoreReason::Extension(ext.clone()));
        }
        None
    }

    /// Checks the entry itself (lstat), not its target. A path that cannot
    /// be inspected is left for the size check to classify.
    pub fn check_symlink(&self, path: &Path) -> Option<IgnoreReason> {
        if !self.symlinks {
            return None;
        }
        match fs::symlink_metadata(path) {
            Ok(meta) if meta.file_type().is_symlink() => Some(IgnoreReason::Symlink),
            _ => None,
        }
    }

    pub fn check_size(&self, size: u64) -> Option<IgnoreReason> {
        if self.empty_files && size == 0 {
            Some(IgnoreReason::EmptyFile)
        } else {
            None
        }
    }
}

fn non_empty(items: &[String]) -> Vec<String> {
    items.iter().filter(|s| !s.is_empty()).cloned().collect()
}

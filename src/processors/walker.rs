// img-diff/src/processors/walker.rs
use crate::core::{ImageDiffError, Result};
use crate::utils::has_image_extension;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// Guard against pathologically deep trees.
pub const MAX_DEPTH: usize = 256;

/// A source image and its position relative to the scan root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredFile {
    pub path: PathBuf,
    pub relative: PathBuf,
}

#[derive(Debug, Default)]
pub struct WalkReport {
    pub files: Vec<DiscoveredFile>,
    /// Entries that could not be read. They are excluded from `files`.
    pub errors: Vec<ImageDiffError>,
}

pub struct Walker {
    extensions: Vec<String>,
    skip_dirs: Vec<String>,
    skip_paths: Vec<PathBuf>,
    recursive: bool,
    max_depth: usize,
}

impl Walker {
    pub fn new(extensions: &[String]) -> Self {
        Self {
            extensions: extensions.to_vec(),
            skip_dirs: Vec::new(),
            skip_paths: Vec::new(),
            recursive: false,
            max_depth: MAX_DEPTH,
        }
    }

    /// Directory basenames never descended into.
    pub fn skip_dirs(mut self, names: &[String]) -> Self {
        self.skip_dirs.extend(names.iter().cloned());
        self
    }

    /// A specific directory (e.g. the output tree) never descended into.
    pub fn skip_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.skip_paths.push(path.into());
        self
    }

    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth.max(1);
        self
    }

    pub fn find(&self, root: &Path) -> Result<WalkReport> {
        if !root.is_dir() {
            return Err(ImageDiffError::FileSystem {
                path: root.to_path_buf(),
                message: "not a readable directory".to_string(),
            });
        }

        let max_depth = if self.recursive { self.max_depth } else { 1 };
        let walker = WalkDir::new(root)
            .min_depth(1)
            .max_depth(max_depth)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| !self.is_skipped(entry));

        let mut report = WalkReport::default();
        for result in walker {
            match result {
                Ok(entry) => {
                    if entry.file_type().is_file() && has_image_extension(entry.path(), &self.extensions) {
                        let path = entry.into_path();
                        let relative = path
                            .strip_prefix(root)
                            .map(Path::to_path_buf)
                            .unwrap_or_else(|_| path.clone());
                        report.files.push(DiscoveredFile { path, relative });
                    }
                }
                Err(err) => {
                    let path = err.path().map(Path::to_path_buf).unwrap_or_else(|| root.to_path_buf());
                    let message = match err.loop_ancestor() {
                        Some(ancestor) => format!("symlink loop back to {}", ancestor.display()),
                        None => err.to_string(),
                    };
                    log::warn!("Skipping {}: {}", path.display(), message);
                    report.errors.push(ImageDiffError::FileSystem { path, message });
                }
            }
        }

        log::debug!(
            "Found {} image(s) under {} ({} unreadable)",
            report.files.len(),
            root.display(),
            report.errors.len()
        );

        Ok(report)
    }

    fn is_skipped(&self, entry: &DirEntry) -> bool {
        if entry.depth() == 0 || !entry.file_type().is_dir() {
            return false;
        }

        let name = entry.file_name();
        self.skip_dirs.iter().any(|skip| OsStr::new(skip) == name)
            || self.skip_paths.iter().any(|skip| entry.path() == skip.as_path())
    }
}

/// Image files under `root`, descending into subdirectories when
/// `recursive` is set and their basename is not in `skip_dirs`.
pub fn find(root: &Path, skip_dirs: &[String], recursive: bool, extensions: &[String]) -> Result<WalkReport> {
    Walker::new(extensions)
        .skip_dirs(skip_dirs)
        .recursive(recursive)
        .find(root)
}

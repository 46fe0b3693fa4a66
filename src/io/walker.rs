//! Depth-first discovery of source packages and coverage profiles.
//!
//! One traversal, two modes. The walker resolves everything against a
//! canonicalized base path instead of mutating the process working
//! directory, so concurrent walks in one process are safe.

use crate::errors::{CovError, Result};
use crate::io::filter;
use log::{debug, warn};
use regex::Regex;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// What a traversal collects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkMode {
    /// Directories that directly contain buildable source files.
    SourceDirectories,
    /// Coverage profile files.
    ProfileFiles,
}

pub struct TreeWalker {
    base: PathBuf,
    skip_pattern: Option<Regex>,
}

impl TreeWalker {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self {
            base: base.into(),
            skip_pattern: None,
        }
    }

    /// Caller-supplied exclusion applied to every discovered path, in
    /// addition to the built-in hidden/underscore/vendor/fixture rules.
    pub fn with_skip_pattern(mut self, pattern: Option<Regex>) -> Self {
        self.skip_pattern = pattern;
        self
    }

    /// Walk the base directory once, collecting absolute paths per `mode`.
    ///
    /// An unreadable base directory is fatal. A mid-traversal error on an
    /// individual entry is logged and that entry skipped; it never aborts
    /// the walk. Result order is whatever the filesystem yields; consumers
    /// sort for themselves.
    pub fn walk(&self, mode: WalkMode) -> Result<Vec<PathBuf>> {
        let base = std::fs::canonicalize(&self.base)
            .map_err(|e| CovError::io(self.base.clone(), e))?;

        let mut found = Vec::new();
        let walker = WalkDir::new(&base).into_iter().filter_entry(|entry| {
            if entry.depth() == 0 || !entry.file_type().is_dir() {
                return true;
            }
            let name = entry.file_name().to_string_lossy();
            if filter::should_skip_directory(&name) {
                debug!("pruning directory '{}'", entry.path().display());
                false
            } else {
                true
            }
        });

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("failed to read entry under '{}': {}", base.display(), e);
                    continue;
                }
            };

            let collected = match mode {
                WalkMode::SourceDirectories => self.collect_source_dir(entry.path()),
                WalkMode::ProfileFiles => self.collect_profile_file(entry.path()),
            };

            if let Some(path) = collected {
                if self.is_skipped(&path) {
                    continue;
                }
                found.push(path);
            }
        }

        Ok(found)
    }

    fn collect_source_dir(&self, path: &Path) -> Option<PathBuf> {
        if !path.is_dir() || !filter::is_candidate_source_directory(path) {
            return None;
        }
        // Trailing separator marks the result as a directory.
        Some(path.join(""))
    }

    fn collect_profile_file(&self, path: &Path) -> Option<PathBuf> {
        if !path.is_file() {
            return None;
        }
        let name = path.file_name()?.to_str()?;
        filter::is_candidate_profile_file(name).then(|| path.to_path_buf())
    }

    fn is_skipped(&self, path: &Path) -> bool {
        let Some(pattern) = &self.skip_pattern else {
            return false;
        };
        if pattern.is_match(&path.to_string_lossy()) {
            debug!(
                "skipping '{}' due to skip pattern '{}'",
                path.display(),
                pattern.as_str()
            );
            true
        } else {
            false
        }
    }
}

/// Find every directory under `base` that directly holds buildable sources.
pub fn find_source_directories(base: &Path) -> Result<Vec<PathBuf>> {
    TreeWalker::new(base).walk(WalkMode::SourceDirectories)
}

/// Find every coverage profile file under `base`.
pub fn find_profile_files(base: &Path) -> Result<Vec<PathBuf>> {
    TreeWalker::new(base).walk(WalkMode::ProfileFiles)
}

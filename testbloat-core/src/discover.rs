//! Test file discovery
//!
//! Global invariants enforced:
//! - Depth-first order: files of a directory come before its subdirectories
//! - Entries within one directory are visited in file-name order
//! - Entries are resolved against their parent directory, never the process
//!   working directory
//! - Symlinked directories are not entered; hidden directories are skipped

use crate::error::{Error, Result};
use globset::GlobSet;
use std::path::{Path, PathBuf};

/// Suffixes recognised when no configuration overrides them
pub const DEFAULT_SUFFIXES: &[&str] = &["test.js", "spec.js"];

/// Case-insensitive file-name suffix predicate for test files
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestFileMatcher {
    suffixes: Vec<String>,
}

impl TestFileMatcher {
    /// Build a matcher from a list of suffixes; empty suffixes are ignored
    pub fn new<I, S>(suffixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let suffixes = suffixes
            .into_iter()
            .map(|s| s.as_ref().to_lowercase())
            .filter(|s| !s.is_empty())
            .collect();
        TestFileMatcher { suffixes }
    }

    pub fn suffixes(&self) -> &[String] {
        &self.suffixes
    }

    /// Check a bare file name (not a path) against the configured suffixes
    pub fn matches(&self, file_name: &str) -> bool {
        let lowered = file_name.to_lowercase();
        self.suffixes.iter().any(|suffix| lowered.ends_with(suffix))
    }
}

impl Default for TestFileMatcher {
    fn default() -> Self {
        TestFileMatcher::new(DEFAULT_SUFFIXES)
    }
}

/// Filters applied while walking
#[derive(Debug, Clone, Copy)]
pub struct DiscoverOptions<'a> {
    pub matcher: &'a TestFileMatcher,
    /// Paths (relative to the scan root) matching this set are neither
    /// selected nor descended into
    pub exclude: Option<&'a GlobSet>,
}

/// One directory entry with the metadata needed for selection
struct Entry {
    path: PathBuf,
    name: String,
    is_dir: bool,
}

/// Recursively collect test files under `root`
pub fn discover_test_files(root: &Path, options: DiscoverOptions<'_>) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    collect_recursive(root, root, options, &mut files)?;
    tracing::debug!(root = %root.display(), count = files.len(), "discovered test files");
    Ok(files)
}

fn collect_recursive(
    root: &Path,
    dir: &Path,
    options: DiscoverOptions<'_>,
    files: &mut Vec<PathBuf>,
) -> Result<()> {
    let entries = read_entries(dir)?;

    // Files at this level first
    for entry in entries.iter().filter(|e| !e.is_dir) {
        if options.matcher.matches(&entry.name) && !is_excluded(root, &entry.path, options) {
            files.push(entry.path.clone());
        }
    }

    // Then descend
    for entry in entries.iter().filter(|e| e.is_dir) {
        if entry.name.starts_with('.') || is_excluded(root, &entry.path, options) {
            continue;
        }
        collect_recursive(root, &entry.path, options, files)?;
    }

    Ok(())
}

/// List a directory, sorted by file name
fn read_entries(dir: &Path) -> Result<Vec<Entry>> {
    let read_dir_err = |source| Error::ReadDir {
        path: dir.to_path_buf(),
        source,
    };

    let mut entries = Vec::new();
    for entry_result in std::fs::read_dir(dir).map_err(read_dir_err)? {
        let entry = entry_result.map_err(read_dir_err)?;
        let path = entry.path();
        // lstat semantics: a symlink to a directory is not a directory here
        let metadata = std::fs::symlink_metadata(&path).map_err(|source| Error::ReadDir {
            path: path.clone(),
            source,
        })?;
        entries.push(Entry {
            name: entry.file_name().to_string_lossy().into_owned(),
            is_dir: metadata.is_dir(),
            path,
        });
    }

    entries.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(entries)
}

fn is_excluded(root: &Path, path: &Path, options: DiscoverOptions<'_>) -> bool {
    let Some(exclude) = options.exclude else {
        return false;
    };
    let relative = path.strip_prefix(root).unwrap_or(path);
    exclude.is_match(relative)
}

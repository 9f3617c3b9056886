//! Expand command-line paths into the list of files to process.

use crate::config::FilesConfig;
use std::collections::BTreeSet;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// Collect files to process, sorted and deduplicated.
///
/// Files named explicitly are always included. Directories are walked
/// recursively, keeping files with a configured extension and skipping
/// excluded directory names.
pub fn discover_files(paths: &[PathBuf], files: &FilesConfig) -> walkdir::Result<Vec<PathBuf>> {
    let mut found = BTreeSet::new();

    for path in paths {
        if !path.is_dir() {
            found.insert(path.clone());
            continue;
        }

        let walker = WalkDir::new(path)
            .follow_links(false)
            .into_iter()
            .filter_entry(|entry| entry.depth() == 0 || !is_excluded(entry, files));

        for entry in walker {
            let entry = entry?;
            if entry.file_type().is_file() && has_extension(entry.path(), files) {
                found.insert(entry.into_path());
            }
        }
    }

    tracing::debug!(count = found.len(), "discovered files");
    Ok(found.into_iter().collect())
}

fn is_excluded(entry: &DirEntry, files: &FilesConfig) -> bool {
    entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| files.exclude.iter().any(|ex| ex == name))
}

fn has_extension(path: &Path, files: &FilesConfig) -> bool {
    path.extension()
        .and_then(OsStr::to_str)
        .is_some_and(|ext| files.extensions.iter().any(|want| want == ext))
}

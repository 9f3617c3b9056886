//! Per-file driver: run the pipeline and either write or check the result.
//!
//! Output is only ever written after the whole token stream has been
//! processed, and then atomically (tempfile + fsync + rename), so a failure
//! never leaves a file half rewritten.

use crate::pipeline::{RewriteError, RewritePipeline};
use crate::unify::UnifyStats;
use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Whether files are rewritten or only checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Write,
    /// Report files that would change without touching them.
    Check,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileStatus {
    /// No literal needed rewriting.
    Consistent,
    /// Literals were rewritten and the file was written back.
    Rewritten,
    /// Check mode: literals would be rewritten.
    Inconsistent,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileReport {
    pub path: PathBuf,
    pub status: FileStatus,
    pub stats: UnifyStats,
}

/// A processed file along with its before and after contents.
#[derive(Debug, Clone)]
pub struct FixedFile {
    pub report: FileReport,
    pub original: Vec<u8>,
    pub rewritten: Vec<u8>,
}

#[derive(Error, Debug)]
pub enum FixError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path}: {source}")]
    Rewrite {
        path: PathBuf,
        #[source]
        source: RewriteError,
    },
}

impl FixError {
    pub fn path(&self) -> &Path {
        match self {
            FixError::Io { path, .. } | FixError::Rewrite { path, .. } => path,
        }
    }
}

/// Applies a [`RewritePipeline`] to files on disk.
#[derive(Debug, Clone, Default)]
pub struct Fixer {
    pipeline: RewritePipeline,
    mode: Mode,
}

impl Fixer {
    pub fn new(pipeline: RewritePipeline, mode: Mode) -> Self {
        Self { pipeline, mode }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Process one file.
    pub fn fix_file(&self, path: &Path) -> Result<FixedFile, FixError> {
        let io_err = |source| FixError::Io {
            path: path.to_path_buf(),
            source,
        };

        let original = fs::read(path).map_err(io_err)?;
        let rewrite = self
            .pipeline
            .run(original.as_slice())
            .map_err(|source| FixError::Rewrite {
                path: path.to_path_buf(),
                source,
            })?;

        let status = match (rewrite.changed(), self.mode) {
            (false, _) => FileStatus::Consistent,
            (true, Mode::Check) => FileStatus::Inconsistent,
            (true, Mode::Write) => {
                atomic_write(path, &rewrite.data).map_err(io_err)?;
                FileStatus::Rewritten
            }
        };

        tracing::debug!(
            path = %path.display(),
            ?status,
            rewritten = rewrite.stats.rewritten,
            "processed file"
        );

        Ok(FixedFile {
            report: FileReport {
                path: path.to_path_buf(),
                status,
                stats: rewrite.stats,
            },
            original,
            rewritten: rewrite.data,
        })
    }
}

/// Atomic file write: tempfile + fsync + rename.
///
/// The original file's permissions are carried over to the replacement.
fn atomic_write(path: &Path, content: &[u8]) -> std::io::Result<()> {
    // Create tempfile in same directory to ensure same filesystem
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let permissions = fs::metadata(path)?.permissions();

    let mut temp = tempfile::NamedTempFile::new_in(parent)?;
    temp.write_all(content)?;
    temp.as_file().sync_all()?;
    fs::set_permissions(temp.path(), permissions)?;

    temp.persist(path).map_err(|e| e.error)?;

    Ok(())
}

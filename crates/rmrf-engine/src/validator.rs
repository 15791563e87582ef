//! Root path safety checks.

use std::fs;
use std::path::{Path, PathBuf};

use rmrf_core::{DeleteConfig, DeleteError};

use crate::fs::EntryKind;

/// A root that passed validation.
#[derive(Debug, Clone)]
pub struct ValidatedPath {
    /// Resolved path the engine traverses. For a symlink root only the
    /// parent is resolved, so this still names the link.
    pub path: PathBuf,
    /// Kind of `path` itself, not of a link target.
    pub kind: EntryKind,
}

/// Gate run once on the deletion root before anything is mutated.
#[derive(Debug, Clone)]
pub struct PathValidator {
    dangerous: Vec<PathBuf>,
}

impl PathValidator {
    /// Build a validator from the configured dangerous paths.
    ///
    /// Entries are compared exactly, after dropping trailing separators and
    /// `.` components.
    pub fn new(config: &DeleteConfig) -> Self {
        let mut dangerous: Vec<PathBuf> =
            config.dangerous_paths.iter().map(|p| normalize(p)).collect();
        dangerous.sort();
        dangerous.dedup();
        Self { dangerous }
    }

    /// Check whether a path exactly matches a dangerous entry.
    pub fn is_dangerous(&self, path: &Path) -> bool {
        let path = normalize(path);
        self.dangerous.iter().any(|d| *d == path)
    }

    /// Validate a deletion root. Has no side effects.
    pub fn validate(&self, path: &Path) -> Result<ValidatedPath, DeleteError> {
        if self.is_dangerous(path) {
            return Err(DeleteError::DangerousPath {
                path: path.to_path_buf(),
            });
        }

        fs::symlink_metadata(path).map_err(|source| DeleteError::NotExist {
            path: path.to_path_buf(),
            source,
        })?;

        let absolute = std::path::absolute(path)
            .map(|p| normalize(&p))
            .map_err(|source| DeleteError::PathResolution {
                path: path.to_path_buf(),
                source,
            })?;
        if self.is_dangerous(&absolute) {
            return Err(DeleteError::DangerousPath { path: absolute });
        }

        // Classify the normalized path: `link/` would follow the link.
        let kind = fs::symlink_metadata(&absolute)
            .map(|m| EntryKind::from_file_type(m.file_type()))
            .map_err(|source| DeleteError::NotExist {
                path: absolute.clone(),
                source,
            })?;

        let resolved = canonical_root(&absolute, kind).map_err(|source| {
            DeleteError::PathResolution {
                path: absolute.clone(),
                source,
            }
        })?;
        if self.is_dangerous(&resolved) {
            return Err(DeleteError::DangerousPath { path: resolved });
        }

        Ok(ValidatedPath {
            path: resolved,
            kind,
        })
    }
}

/// Resolve a root. A symlink root is never followed: only its parent is.
fn canonical_root(path: &Path, kind: EntryKind) -> std::io::Result<PathBuf> {
    match (kind, path.parent(), path.file_name()) {
        (EntryKind::Symlink, Some(parent), Some(name)) => Ok(fs::canonicalize(parent)?.join(name)),
        _ => fs::canonicalize(path),
    }
}

/// Drop trailing separators and `.` components.
fn normalize(path: &Path) -> PathBuf {
    path.components().collect()
}

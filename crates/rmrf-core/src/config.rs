//! Deletion configuration types.

use std::path::PathBuf;

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

/// Paths that are refused as deletion roots unless the caller overrides the list.
pub const DEFAULT_DANGEROUS_PATHS: &[&str] = &["/", "/etc", "/usr", "/bin", "/sbin"];

/// Configuration for a deletion run.
///
/// Read-only for the lifetime of a delete call.
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct DeleteConfig {
    /// Maximum number of subtree tasks running at once.
    #[builder(default = "default_max_concurrency()")]
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,

    /// Compute counts without touching the filesystem.
    #[builder(default = "false")]
    #[serde(default)]
    pub dry_run: bool,

    /// Leave symbolic links alone instead of removing them.
    #[builder(default = "true")]
    #[serde(default = "default_true")]
    pub skip_symlinks: bool,

    /// Surface every per-item error to the user.
    #[builder(default = "false")]
    #[serde(default)]
    pub verbose: bool,

    /// Ask for confirmation before deleting (front end only).
    #[builder(default = "false")]
    #[serde(default)]
    pub interactive: bool,

    /// Roots that must never be deleted.
    #[builder(default = "default_dangerous_paths()")]
    #[serde(default = "default_dangerous_paths")]
    pub dangerous_paths: Vec<PathBuf>,
}

fn default_true() -> bool {
    true
}

/// Number of processing units available to this process, at least 1.
pub fn default_max_concurrency() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

fn default_dangerous_paths() -> Vec<PathBuf> {
    DEFAULT_DANGEROUS_PATHS.iter().map(PathBuf::from).collect()
}

impl DeleteConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        if let Some(0) = self.max_concurrency {
            return Err("max_concurrency must be at least 1".to_string());
        }
        if let Some(ref paths) = self.dangerous_paths {
            if paths.iter().any(|p| p.as_os_str().is_empty()) {
                return Err("Dangerous paths cannot be empty".to_string());
            }
        }
        Ok(())
    }
}

impl DeleteConfig {
    /// Create a new config builder.
    pub fn builder() -> DeleteConfigBuilder {
        DeleteConfigBuilder::default()
    }

    /// Create a config with default settings.
    pub fn new() -> Self {
        Self {
            max_concurrency: default_max_concurrency(),
            dry_run: false,
            skip_symlinks: true,
            verbose: false,
            interactive: false,
            dangerous_paths: default_dangerous_paths(),
        }
    }

    /// Concurrency limit, never below 1.
    pub fn concurrency(&self) -> usize {
        self.max_concurrency.max(1)
    }

    /// Add a path to the dangerous list.
    pub fn protect(mut self, path: impl Into<PathBuf>) -> Self {
        self.dangerous_paths.push(path.into());
        self
    }
}

impl Default for DeleteConfig {
    fn default() -> Self {
        Self::new()
    }
}

//! Core types for rmrf.
//!
//! This crate provides the data structures shared between the deletion
//! engine and its front ends: configuration, the error taxonomy and the
//! statistics returned by a run.

mod config;
mod error;
mod stats;

pub use config::{
    DEFAULT_DANGEROUS_PATHS, DeleteConfig, DeleteConfigBuilder, DeleteConfigBuilderError,
    default_max_concurrency,
};
pub use error::{DeleteError, ItemError, ItemErrorKind};
pub use stats::DeleteStats;

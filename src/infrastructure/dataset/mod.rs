//! Problem bank loading
//!
//! Two on-disk formats are supported:
//! - tagged files (`<problem>`, `<bug_code>`, ...) named `<id>.txt`
//! - TreeInstruct files (`problem: ---` sections) with ids assigned in config

pub mod bank;
pub mod normalize;
pub mod tagged;
pub mod tree_instruct;

use std::path::PathBuf;
use thiserror::Error;

use crate::domain::errors::DomainError;

pub use bank::FileProblemBank;

/// Errors raised while loading problem files
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("Problem file or directory not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid section pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error(transparent)]
    Invalid(#[from] DomainError),
}

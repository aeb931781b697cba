//! Error types for configuration loading and derivation.

use std::path::PathBuf;

use thiserror::Error;

use crate::mode::BuildTarget;
use crate::patterns::AssetClass;

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    NotFound(PathBuf),

    #[error("invalid config value: {0}")]
    InvalidValue(String),

    /// An asset class is routed into a target that excludes it, e.g. a
    /// stylesheet chain wired into the server-executable target.
    #[error("asset class {class:?} is not supported by target {target:?}")]
    ClassNotSupported {
        target: BuildTarget,
        class: AssetClass,
    },

    #[error("entry point is outside the source root: {0}")]
    EntryOutsideSourceRoot(PathBuf),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

//! Error types for the build pipeline.
//!
//! Every failure is fatal to the current build generation. The
//! orchestrator decides whether it is also fatal to the process (one-shot
//! builds) or only to the generation (dev watch loop).

use std::path::PathBuf;

use thiserror::Error;

use crate::collab::CollabError;

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;

#[derive(Debug, Error)]
pub enum PipelineError {
    /// A file under the source root matched no extension pattern. Failing
    /// hard here keeps unknown content from silently missing the manifest.
    #[error("unclassifiable asset under source root: {path}")]
    Classification { path: PathBuf },

    /// A transform stage failed. Carries the originating source path and
    /// the stage name so the orchestrator can report both.
    #[error("stage '{stage}' failed for {path}: {source}")]
    Compilation {
        path: PathBuf,
        stage: &'static str,
        #[source]
        source: CollabError,
    },

    /// Two assets mapped to one logical identifier within one generation.
    /// A classifier or configuration bug, never a legitimate collision.
    #[error("duplicate manifest key: {key}")]
    DuplicateManifestKey { key: String },

    /// Invalid target/mode wiring, e.g. a stylesheet routed into the
    /// server-executable target. Detected before Transforming begins.
    #[error("configuration error: {0}")]
    Configuration(#[from] tandem_config::ConfigError),

    /// A deployed name resolved outside the output directory.
    #[error("invalid output path: {0}")]
    InvalidOutputPath(String),

    /// I/O error with context message.
    #[error("{message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Manifest (de)serialization failure.
    #[error("manifest JSON error: {0}")]
    ManifestJson(#[from] serde_json::Error),
}

impl PipelineError {
    pub(crate) fn io(message: impl Into<String>, source: std::io::Error) -> Self {
        PipelineError::Io {
            message: message.into(),
            source,
        }
    }
}

impl miette::Diagnostic for PipelineError {
    fn code(&self) -> Option<Box<dyn std::fmt::Display + '_>> {
        Some(Box::new(match self {
            PipelineError::Classification { .. } => "CLASSIFICATION_ERROR",
            PipelineError::Compilation { .. } => "COMPILATION_ERROR",
            PipelineError::DuplicateManifestKey { .. } => "DUPLICATE_MANIFEST_KEY",
            PipelineError::Configuration(_) => "CONFIGURATION_ERROR",
            PipelineError::InvalidOutputPath(_) => "INVALID_OUTPUT_PATH",
            PipelineError::Io { .. } => "IO_ERROR",
            PipelineError::ManifestJson(_) => "MANIFEST_JSON_ERROR",
        }))
    }

    fn severity(&self) -> Option<miette::Severity> {
        Some(miette::Severity::Error)
    }

    fn help(&self) -> Option<Box<dyn std::fmt::Display + '_>> {
        match self {
            PipelineError::Classification { path } => Some(Box::new(format!(
                "'{}' is inside the source root but matches no classification pattern.\n\
                 Add its extension to the patterns table or move it out of the source root.",
                path.display()
            ))),
            PipelineError::DuplicateManifestKey { key } => Some(Box::new(format!(
                "Two assets registered the identifier '{}' in one build generation.\n\
                 Check the classifier patterns and target configuration for overlaps.",
                key
            ))),
            PipelineError::Configuration(err) => Some(Box::new(format!(
                "The target/mode wiring is invalid: {}",
                err
            ))),
            _ => None,
        }
    }
}

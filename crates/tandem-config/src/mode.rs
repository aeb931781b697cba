//! Build mode and deployment target enums.

use serde::{Deserialize, Serialize};

/// Runtime mode for a build invocation.
///
/// Selected once at process start and immutable for the lifetime of one
/// invocation. Governs output naming, minification and dev-only pipeline
/// stages (live-reload injection, recompression skipping).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildMode {
    Development,
    Production,
}

impl BuildMode {
    /// Resolve the mode from the `TANDEM_ENV` environment variable.
    ///
    /// Anything other than `development` (including an unset variable)
    /// selects production, matching the original `NODE_ENV` convention.
    pub fn from_env() -> Self {
        match std::env::var("TANDEM_ENV").as_deref() {
            Ok("development") => BuildMode::Development,
            _ => BuildMode::Production,
        }
    }

    pub fn is_production(self) -> bool {
        matches!(self, BuildMode::Production)
    }

    /// The value exposed to application code through the define table.
    pub fn as_str(self) -> &'static str {
        match self {
            BuildMode::Development => "development",
            BuildMode::Production => "production",
        }
    }
}

impl std::fmt::Display for BuildMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Deployment target for one derived configuration.
///
/// Determines the entry point, externalization policy and which asset
/// classes are eligible for processing (the server-executable target
/// excludes stylesheet and media classes entirely).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BuildTarget {
    Browser,
    ServerExecutable,
}

impl std::fmt::Display for BuildTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BuildTarget::Browser => f.write_str("browser"),
            BuildTarget::ServerExecutable => f.write_str("server-executable"),
        }
    }
}

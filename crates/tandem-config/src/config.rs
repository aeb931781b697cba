//! The per-target configuration value object.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::mode::{BuildMode, BuildTarget};
use crate::patterns::{AssetClass, ClassPatterns};

/// How the Output Namer computes a deployed filename.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NamingStrategy {
    /// Stable, human-readable name: the source-relative identifier with
    /// the deployed extension. Not unique across builds; only acceptable
    /// for uncached dev output.
    Stable,
    /// Content-addressed name from a SHA-256 digest of the final output
    /// buffer, truncated to 20 hex characters.
    ContentHash,
    /// One fixed filename for the target's entry bundle (server output).
    Fixed(String),
}

/// Whether dependencies are bundled into the output or left to the runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExternalizationPolicy {
    /// Everything is bundled (browser target).
    Bundle,
    /// Runtime dependencies are resolved natively, never bundled
    /// (server-executable target).
    Native,
}

/// A complete build configuration for one (target, mode) pair.
///
/// Produced by [`crate::derive`] from a [`crate::BaseTemplate`]. Every
/// nested structure is owned by this value; two derived configurations
/// never alias, so mutating one target's alias table or stage inputs is
/// not observable from another.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Configuration {
    pub mode: BuildMode,
    pub target: BuildTarget,

    /// Root of the application source tree.
    pub source_root: PathBuf,

    /// Entry point, relative to `source_root`.
    pub entry_point: PathBuf,

    /// Runtime modules prepended to the entry (dev live-reload patches).
    pub entry_preludes: Vec<String>,

    /// Directory artifacts are emitted into.
    pub output_dir: PathBuf,

    /// Naming scheme for primary output units.
    pub naming: NamingStrategy,

    /// Naming scheme for secondary chunks (side-effect files).
    pub chunk_naming: NamingStrategy,

    /// Public URL prefix the deployed names are served under.
    pub public_path: String,

    /// Module alias table consumed by the compile stage.
    pub alias_table: BTreeMap<String, String>,

    /// Compile-time defines exposed to application code.
    pub defines: BTreeMap<String, String>,

    /// Whether the Optimizer runs over this target's output.
    pub optimization_enabled: bool,

    pub externalization: ExternalizationPolicy,

    /// Asset classes this target is allowed to process. Encountering a
    /// source whose class is absent from this list is a configuration
    /// error, detected before any transforming begins.
    pub processed_classes: Vec<AssetClass>,

    /// Extension tables used by the classifier.
    pub patterns: ClassPatterns,

    /// Manifest location for this build generation.
    pub manifest_path: PathBuf,
}

impl Configuration {
    /// Absolute-or-project-relative path of the entry point.
    pub fn entry_path(&self) -> PathBuf {
        self.source_root.join(&self.entry_point)
    }

    pub fn processes(&self, class: AssetClass) -> bool {
        self.processed_classes.contains(&class)
    }
}

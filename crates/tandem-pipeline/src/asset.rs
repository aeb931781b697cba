//! Asset values flowing through the pipeline.

use std::path::PathBuf;

use tandem_config::AssetClass;

/// One classified source file.
///
/// Content is immutable after classification; transforms produce new
/// buffers instead of mutating in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    /// Source-relative identifier, `/`-separated. This is the manifest key.
    pub source_id: String,

    /// Absolute path of the source file.
    pub path: PathBuf,

    pub class: AssetClass,

    pub content: Vec<u8>,
}

/// A secondary output unit produced alongside an asset's primary buffer,
/// e.g. a split stylesheet chunk. Ordered as emitted by the stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SideEffectFile {
    /// Logical chunk name, used by stable naming schemes.
    pub logical_name: String,

    pub class: AssetClass,

    pub content: Vec<u8>,
}

/// The outcome of running one asset through its transform chain.
///
/// Produced once per asset per configuration and never shared across
/// configurations; browser and server builds process assets independently
/// even when the source bytes are identical.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformResult {
    pub source_id: String,
    pub class: AssetClass,

    /// Final output buffer after all stages ran.
    pub output: Vec<u8>,

    /// Local class-identifier rewrites performed by the extract-style
    /// stage, `(original, rewritten)` in source order. Empty for
    /// non-stylesheet assets.
    pub class_rewrites: Vec<(String, String)>,

    pub side_effects: Vec<SideEffectFile>,
}

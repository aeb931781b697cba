//! # tandem-pipeline
//!
//! Core build pipeline: asset classification, transform chains, output
//! naming, manifest accumulation, optimization and orchestration.
//!
//! ## Quick start
//!
//! ```no_run
//! use tandem_config::{BaseTemplate, BuildMode};
//! use tandem_pipeline::{Collaborators, Orchestrator};
//!
//! # fn main() -> tandem_pipeline::Result<()> {
//! let base = BaseTemplate::default();
//! let mut orchestrator = Orchestrator::new(".".into(), base, Collaborators::builtin());
//! let report = orchestrator.run(BuildMode::Production)?;
//! for (source, deployed) in &report.manifest {
//!     println!("{source} -> {deployed}");
//! }
//! # Ok(()) }
//! ```
//!
//! The pipeline performs no language transformation itself; script and
//! style compilation, minification and image recompression are external
//! collaborators behind the traits in [`collab`].

pub mod asset;
pub mod chain;
pub mod classify;
pub mod collab;
pub mod error;
pub mod manifest;
pub mod namer;
pub mod optimize;
pub mod orchestrator;

pub use asset::{Asset, SideEffectFile, TransformResult};
pub use chain::{stages_for, validate_wiring, ChainExecutor, Stage, LIVE_RELOAD_RUNTIME};
pub use classify::Classifier;
pub use collab::{
    Collaborators, CompileOptions, ImageCodec, Minifier, RecompressSettings, ScriptCompiler,
    StyleCompiler, StyleOutput, PRODUCTION_RECOMPRESS,
};
pub use error::{PipelineError, Result};
pub use manifest::{Manifest, ManifestBuilder};
pub use namer::OutputNamer;
pub use optimize::{clean_output_dir, Optimizer};
pub use orchestrator::{BuildPhase, BuildReport, EmittedAsset, Orchestrator, TargetReport};

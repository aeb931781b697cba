//! Build orchestration: the top-level driver and its state machine.
//!
//! One invocation runs `Idle → Configuring → Transforming → Optimizing
//! (production only) → Committing → Idle`, or `→ Failed` on the first
//! error. Files are only emitted during Committing, after every transform
//! and optimization pass succeeded, so a failed generation leaves the
//! previous generation's committed artifacts fully intact.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use path_clean::PathClean;
use rayon::prelude::*;
use tandem_config::{BaseTemplate, BuildMode, BuildTarget, Configuration, ExternalizationPolicy};
use tracing::{debug, info};

use crate::asset::{Asset, TransformResult};
use crate::chain::{validate_wiring, ChainExecutor};
use crate::classify::Classifier;
use crate::collab::Collaborators;
use crate::error::{PipelineError, Result};
use crate::manifest::ManifestBuilder;
use crate::namer::OutputNamer;
use crate::optimize::{clean_output_dir, Optimizer};

/// Lifecycle phase of the orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildPhase {
    Idle,
    Configuring,
    Transforming,
    Optimizing,
    Committing,
    Failed,
}

impl std::fmt::Display for BuildPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            BuildPhase::Idle => "idle",
            BuildPhase::Configuring => "configuring",
            BuildPhase::Transforming => "transforming",
            BuildPhase::Optimizing => "optimizing",
            BuildPhase::Committing => "committing",
            BuildPhase::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Summary of one target's committed output.
#[derive(Debug, Clone)]
pub struct TargetReport {
    pub target: BuildTarget,
    pub output_dir: PathBuf,
    /// Deployed filenames, in emission order.
    pub files: Vec<String>,
}

/// Summary of one committed build generation.
#[derive(Debug, Clone)]
pub struct BuildReport {
    pub mode: BuildMode,
    pub manifest_path: PathBuf,
    pub manifest: BTreeMap<String, String>,
    pub targets: Vec<TargetReport>,
}

/// One incrementally rebuilt asset (dev watch loop).
#[derive(Debug, Clone)]
pub struct EmittedAsset {
    pub source_id: String,
    pub deployed: String,
}

/// Top-level build driver.
///
/// Holds the base template and the collaborator set; each call to
/// [`Orchestrator::run`] executes one complete build generation.
pub struct Orchestrator<'a> {
    project_root: PathBuf,
    base: BaseTemplate,
    collabs: Collaborators<'a>,
    phase: BuildPhase,
}

impl<'a> Orchestrator<'a> {
    pub fn new(project_root: PathBuf, base: BaseTemplate, collabs: Collaborators<'a>) -> Self {
        Orchestrator {
            project_root,
            base,
            collabs,
            phase: BuildPhase::Idle,
        }
    }

    pub fn phase(&self) -> BuildPhase {
        self.phase
    }

    pub fn base(&self) -> &BaseTemplate {
        &self.base
    }

    /// Derive the configurations for one generation: browser always,
    /// server-executable only in production (development serves the
    /// browser bundle through the dev proxy and never renders server-side
    /// from a dev build).
    pub fn configurations(&self, mode: BuildMode) -> Result<Vec<Configuration>> {
        let mut configs = vec![tandem_config::derive(
            &self.base,
            BuildTarget::Browser,
            mode,
        )?];
        if mode.is_production() {
            configs.push(tandem_config::derive(
                &self.base,
                BuildTarget::ServerExecutable,
                mode,
            )?);
        }
        for config in &configs {
            validate_wiring(config)?;
        }
        Ok(configs)
    }

    /// Execute one build generation.
    ///
    /// On success the generation is fully committed (files + manifest) and
    /// the orchestrator returns to `Idle`; on any failure it moves to
    /// `Failed` and nothing of the new generation is visible.
    pub fn run(&mut self, mode: BuildMode) -> Result<BuildReport> {
        let outcome = self.run_generation(mode);
        self.phase = match &outcome {
            Ok(_) => BuildPhase::Idle,
            Err(_) => BuildPhase::Failed,
        };
        outcome
    }

    fn run_generation(&mut self, mode: BuildMode) -> Result<BuildReport> {
        self.transition(BuildPhase::Configuring);
        let configs = self.configurations(mode)?;

        self.transition(BuildPhase::Transforming);
        let mut built = Vec::with_capacity(configs.len());
        for config in configs {
            let results = self.transform_target(&config)?;
            info!(target = %config.target, assets = results.len(), "target transformed");
            built.push((config, results));
        }

        if mode.is_production() {
            self.transition(BuildPhase::Optimizing);
            for (config, results) in built.iter_mut() {
                if config.optimization_enabled {
                    Optimizer::new(self.collabs.minifier).optimize(results)?;
                }
            }
        }

        self.transition(BuildPhase::Committing);
        let manifest_path = self.resolve(&self.base.manifest_path);

        // Stale-artifact cleanup strictly precedes every write of the new
        // generation; the manifest survives for already-running readers.
        if mode.is_production() {
            let mut cleaned = Vec::new();
            for (config, _) in &built {
                let dir = self.resolve(&config.output_dir);
                if !cleaned.contains(&dir) {
                    clean_output_dir(&dir, &manifest_path)?;
                    cleaned.push(dir);
                }
            }
        }

        // Browser commits first so the server target can read asset names.
        let mut manifest = ManifestBuilder::new();
        let mut targets = Vec::new();
        for (config, results) in &built {
            let report = self.commit_target(config, results, &mut manifest)?;
            if config.target == BuildTarget::Browser {
                manifest.commit(&manifest_path)?;
            }
            targets.push(report);
        }

        info!(mode = %mode, entries = manifest.len(), "build generation committed");
        Ok(BuildReport {
            mode,
            manifest_path,
            manifest: manifest.entries().clone(),
            targets,
        })
    }

    /// Scan, classify and transform every asset of one target. Assets are
    /// independent of each other and run in parallel; each asset's chain
    /// is strictly sequential.
    ///
    /// Under native externalization only the entry module is emitted;
    /// everything it imports is left to the runtime's own resolution, so
    /// the rest of the tree never enters the chain.
    pub fn transform_target(&self, config: &Configuration) -> Result<Vec<TransformResult>> {
        let classifier = Classifier::new(self.resolve(&config.source_root), config);
        let mut assets = classifier.scan(config)?;
        let entry_path = self.resolve(&config.source_root).join(&config.entry_point);
        if config.externalization == ExternalizationPolicy::Native {
            assets.retain(|asset| asset.path == entry_path);
        }
        let executor = ChainExecutor::new(config, self.collabs);
        assets
            .par_iter()
            .map(|asset| executor.run(asset, asset.path == entry_path))
            .collect()
    }

    /// Re-transform a single changed file for an incremental dev rebuild.
    ///
    /// Returns `Ok(None)` when the path is outside the source root or its
    /// class is excluded by the target. The emitted file is written
    /// immediately; the caller owns the incremental manifest commit.
    pub fn transform_one(
        &self,
        config: &Configuration,
        path: &Path,
    ) -> Result<Option<EmittedAsset>> {
        let classifier = Classifier::new(self.resolve(&config.source_root), config);
        let Some(class) = classifier.classify(path)? else {
            return Ok(None);
        };
        if !config.processes(class) {
            return Ok(None);
        }
        let content = std::fs::read(path)
            .map_err(|e| PipelineError::io(format!("failed to read asset {}", path.display()), e))?;
        let source_id = classifier
            .source_id(path)
            .expect("classified path is under the source root");
        let asset = Asset {
            source_id: source_id.clone(),
            path: path.to_path_buf(),
            class,
            content,
        };

        let entry_path = self.resolve(&config.source_root).join(&config.entry_point);
        let executor = ChainExecutor::new(config, self.collabs);
        let result = executor.run(&asset, asset.path == entry_path)?;

        let namer = OutputNamer::new(config);
        let deployed = namer.name(&result.source_id, result.class, &result.output);
        let out_dir = self.resolve(&config.output_dir);
        write_unit(&out_dir, &deployed, &result.output)?;
        debug!(asset = %source_id, deployed = %deployed, "incremental rebuild");
        Ok(Some(EmittedAsset {
            source_id,
            deployed,
        }))
    }

    /// Name and write one target's output units, registering browser
    /// entries in the manifest. Side-effect chunks use the chunk naming
    /// scheme and are keyed by their logical name.
    fn commit_target(
        &self,
        config: &Configuration,
        results: &[TransformResult],
        manifest: &mut ManifestBuilder,
    ) -> Result<TargetReport> {
        let namer = OutputNamer::new(config);
        let out_dir = self.resolve(&config.output_dir);
        let register = config.target == BuildTarget::Browser;

        // Identical content under content-addressed naming collapses to
        // one emission; the name set keeps the write set unique.
        let mut emissions: Vec<(String, &[u8])> = Vec::new();
        let mut emitted_names = std::collections::BTreeSet::new();

        for result in results {
            let deployed = namer.name(&result.source_id, result.class, &result.output);
            if register {
                manifest.insert(&result.source_id, &deployed)?;
            }
            if emitted_names.insert(deployed.clone()) {
                emissions.push((deployed, &result.output));
            }
            for chunk in &result.side_effects {
                let chunk_name = namer.chunk_name(&chunk.logical_name, chunk.class, &chunk.content);
                if register {
                    manifest.insert(&chunk.logical_name, &chunk_name)?;
                }
                if emitted_names.insert(chunk_name.clone()) {
                    emissions.push((chunk_name, &chunk.content));
                }
            }
        }

        std::fs::create_dir_all(&out_dir).map_err(|e| {
            PipelineError::io(
                format!("failed to create output dir {}", out_dir.display()),
                e,
            )
        })?;
        let mut files = Vec::with_capacity(emissions.len());
        for (name, bytes) in emissions {
            write_unit(&out_dir, &name, bytes)?;
            files.push(name);
        }

        Ok(TargetReport {
            target: config.target,
            output_dir: out_dir,
            files,
        })
    }

    fn transition(&mut self, next: BuildPhase) {
        debug!(from = %self.phase, to = %next, "phase transition");
        self.phase = next;
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.project_root.join(path)
        }
    }
}

/// Write one output unit, refusing names that escape the output dir.
fn write_unit(out_dir: &Path, name: &str, bytes: &[u8]) -> Result<()> {
    let target = out_dir.join(name).clean();
    if !target.starts_with(out_dir) {
        return Err(PipelineError::InvalidOutputPath(name.to_string()));
    }
    if let Some(parent) = target.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            PipelineError::io(format!("failed to create {}", parent.display()), e)
        })?;
    }
    std::fs::write(&target, bytes)
        .map_err(|e| PipelineError::io(format!("failed to write {}", target.display()), e))
}

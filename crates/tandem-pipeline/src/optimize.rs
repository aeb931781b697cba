//! Production-only optimization passes and dead-output cleanup.

use std::path::Path;

use tandem_config::AssetClass;
use tracing::{debug, info};

use crate::asset::TransformResult;
use crate::collab::Minifier;
use crate::error::{PipelineError, Result};

/// Runs minification over the final bundle graph of the production
/// browser target. Both passes must complete before the generation can be
/// committed.
pub struct Optimizer<'a> {
    minifier: &'a dyn Minifier,
}

impl<'a> Optimizer<'a> {
    pub fn new(minifier: &'a dyn Minifier) -> Self {
        Optimizer { minifier }
    }

    /// Minify every script unit and minify + deduplicate every style
    /// unit, in place. Deterministic given identical input bytes.
    pub fn optimize(&self, results: &mut [TransformResult]) -> Result<()> {
        for result in results.iter_mut() {
            match result.class {
                AssetClass::Script => {
                    result.output = self
                        .minifier
                        .minify_script(&result.output)
                        .map_err(|source| PipelineError::Compilation {
                            path: result.source_id.clone().into(),
                            stage: "minify-script",
                            source,
                        })?;
                }
                AssetClass::Stylesheet => {
                    let minified = self
                        .minifier
                        .minify_style(&result.output)
                        .map_err(|source| PipelineError::Compilation {
                            path: result.source_id.clone().into(),
                            stage: "minify-style",
                            source,
                        })?;
                    result.output = dedup_style_rules(&minified);
                }
                AssetClass::FontOrMedia | AssetClass::RasterImage => {}
            }
        }
        Ok(())
    }
}

/// Drop exact duplicate rules within one minified style unit, keeping the
/// first occurrence. Operates on `}`-terminated segments, which is exact
/// for the flat rule sets the minifier emits.
fn dedup_style_rules(sheet: &[u8]) -> Vec<u8> {
    let Ok(text) = std::str::from_utf8(sheet) else {
        return sheet.to_vec();
    };
    let mut seen = std::collections::BTreeSet::new();
    let mut out = String::with_capacity(text.len());
    for rule in text.split_inclusive('}') {
        let trimmed = rule.trim();
        if trimmed.is_empty() {
            continue;
        }
        if seen.insert(trimmed.to_string()) {
            out.push_str(trimmed);
        }
    }
    out.into_bytes()
}

/// Remove every previously emitted artifact in `dir` except the manifest.
///
/// Runs once per production generation, strictly before any file of the
/// new generation is written, so stale-hash assets never accumulate while
/// the manifest an already-running server depends on stays readable until
/// the new table commits. Returns the number of files removed.
pub fn clean_output_dir(dir: &Path, manifest_path: &Path) -> Result<usize> {
    if !dir.is_dir() {
        return Ok(0);
    }
    let mut removed = 0;
    let entries = std::fs::read_dir(dir).map_err(|e| {
        PipelineError::io(format!("failed to list output dir {}", dir.display()), e)
    })?;
    for entry in entries {
        let entry = entry.map_err(|e| {
            PipelineError::io(format!("failed to list output dir {}", dir.display()), e)
        })?;
        let path = entry.path();
        if path == manifest_path || !path.is_file() {
            continue;
        }
        std::fs::remove_file(&path).map_err(|e| {
            PipelineError::io(format!("failed to remove stale artifact {}", path.display()), e)
        })?;
        debug!(artifact = %path.display(), "removed stale artifact");
        removed += 1;
    }
    if removed > 0 {
        info!(dir = %dir.display(), removed, "cleaned output directory");
    }
    Ok(removed)
}

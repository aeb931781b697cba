//! Transform chains: ordered stage descriptors and their executor.
//!
//! Each asset class maps to a fixed, mode-dependent list of [`Stage`]
//! descriptors interpreted by [`ChainExecutor`]. Stages compose strictly
//! in sequence; a failure at stage *k* aborts the chain without invoking
//! stage *k+1* and surfaces the asset's source path and the stage name.

use sha2::{Digest, Sha256};
use tandem_config::{AssetClass, BuildMode, BuildTarget, ConfigError, Configuration};
use tracing::trace;

use crate::asset::{Asset, TransformResult};
use crate::collab::{Collaborators, CompileOptions, PRODUCTION_RECOMPRESS};
use crate::error::{PipelineError, Result};

/// Runtime snippet appended to script output in development. Polls the
/// dev channel and reloads the page when a rebuild commits.
pub const LIVE_RELOAD_RUNTIME: &str = "\n;(function(){if(typeof window!==\"undefined\"&&!window.__TANDEM_RELOAD__){window.__TANDEM_RELOAD__=true;new EventSource(\"/__tandem/reload\").onmessage=function(){window.location.reload();};}})();\n";

/// One transform stage descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// External script compilation (syntax transform).
    Compile,
    /// Dev-only live-reload hook injection.
    InjectLiveReload,
    /// Stylesheet extraction plus local class-identifier rewriting.
    ExtractStyle,
    /// Production-only raster recompression.
    Recompress,
    /// Content passes through untouched; only the name changes.
    Passthrough,
}

impl Stage {
    pub const fn name(self) -> &'static str {
        match self {
            Stage::Compile => "compile",
            Stage::InjectLiveReload => "inject-live-reload",
            Stage::ExtractStyle => "extract-style",
            Stage::Recompress => "recompress",
            Stage::Passthrough => "passthrough",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// The ordered stage list for one asset class in one mode.
pub fn stages_for(class: AssetClass, mode: BuildMode) -> Vec<Stage> {
    match (class, mode) {
        (AssetClass::Script, BuildMode::Development) => {
            vec![Stage::Compile, Stage::InjectLiveReload]
        }
        (AssetClass::Script, BuildMode::Production) => vec![Stage::Compile],
        (AssetClass::Stylesheet, _) => vec![Stage::ExtractStyle],
        // Recompression is skipped in development to keep iteration fast.
        (AssetClass::RasterImage, BuildMode::Development) => vec![Stage::Passthrough],
        (AssetClass::RasterImage, BuildMode::Production) => vec![Stage::Recompress],
        (AssetClass::FontOrMedia, _) => vec![Stage::Passthrough],
    }
}

/// Reject invalid target/mode wiring before any Transforming begins.
///
/// The server-executable target excludes stylesheet and media classes; a
/// configuration that routes such a chain into it is a bug in the
/// derivation or in hand-built configuration, not a runtime condition.
pub fn validate_wiring(config: &Configuration) -> Result<()> {
    if config.target == BuildTarget::ServerExecutable {
        for class in [
            AssetClass::Stylesheet,
            AssetClass::FontOrMedia,
            AssetClass::RasterImage,
        ] {
            if config.processes(class) {
                return Err(PipelineError::Configuration(
                    ConfigError::ClassNotSupported {
                        target: config.target,
                        class,
                    },
                ));
            }
        }
    }
    Ok(())
}

/// Interprets stage descriptor lists over assets for one configuration.
pub struct ChainExecutor<'a> {
    config: &'a Configuration,
    collabs: Collaborators<'a>,
    options: CompileOptions,
}

impl<'a> ChainExecutor<'a> {
    pub fn new(config: &'a Configuration, collabs: Collaborators<'a>) -> Self {
        ChainExecutor {
            config,
            collabs,
            options: CompileOptions::from_config(config),
        }
    }

    /// Run an asset through its chain.
    ///
    /// `is_entry` marks the configuration's entry point, which receives
    /// the dev entry preludes before compilation.
    pub fn run(&self, asset: &Asset, is_entry: bool) -> Result<TransformResult> {
        if !self.config.processes(asset.class) {
            return Err(PipelineError::Configuration(
                ConfigError::ClassNotSupported {
                    target: self.config.target,
                    class: asset.class,
                },
            ));
        }

        let mut buffer = asset.content.clone();
        let mut class_rewrites = Vec::new();

        if is_entry && asset.class == AssetClass::Script && !self.config.entry_preludes.is_empty()
        {
            let mut prefixed = String::new();
            for prelude in &self.config.entry_preludes {
                prefixed.push_str(&format!("import \"{prelude}\";\n"));
            }
            prefixed.push_str(&String::from_utf8_lossy(&buffer));
            buffer = prefixed.into_bytes();
        }

        for stage in stages_for(asset.class, self.config.mode) {
            trace!(asset = %asset.source_id, stage = %stage, "running stage");
            match stage {
                Stage::Compile => {
                    buffer = self
                        .collabs
                        .script
                        .compile(&buffer, &self.options)
                        .map_err(|source| PipelineError::Compilation {
                            path: asset.path.clone(),
                            stage: stage.name(),
                            source,
                        })?;
                }
                Stage::InjectLiveReload => {
                    buffer.extend_from_slice(LIVE_RELOAD_RUNTIME.as_bytes());
                }
                Stage::ExtractStyle => {
                    let style = self
                        .collabs
                        .style
                        .compile(&buffer, &self.options)
                        .map_err(|source| PipelineError::Compilation {
                            path: asset.path.clone(),
                            stage: stage.name(),
                            source,
                        })?;
                    let suffix = short_content_hash(&asset.content);
                    class_rewrites = style
                        .local_idents
                        .iter()
                        .map(|ident| (ident.clone(), format!("{ident}-{suffix}")))
                        .collect();
                    let sheet = String::from_utf8_lossy(&style.sheet).into_owned();
                    buffer = rewrite_class_idents(&sheet, &class_rewrites).into_bytes();
                }
                Stage::Recompress => {
                    buffer = self
                        .collabs
                        .image
                        .recompress(&buffer, &PRODUCTION_RECOMPRESS)
                        .map_err(|source| PipelineError::Compilation {
                            path: asset.path.clone(),
                            stage: stage.name(),
                            source,
                        })?;
                }
                Stage::Passthrough => {}
            }
        }

        Ok(TransformResult {
            source_id: asset.source_id.clone(),
            class: asset.class,
            output: buffer,
            class_rewrites,
            side_effects: Vec::new(),
        })
    }
}

/// First 7 hex characters of the content digest, used as the class
/// identifier rewrite suffix.
fn short_content_hash(content: &[u8]) -> String {
    let digest = Sha256::digest(content);
    let hex = format!("{digest:x}");
    hex[..7].to_string()
}

/// Rewrite `.ident` selectors according to the rewrite table.
///
/// Matching is boundary-aware: the longest identifier run after each `.`
/// is looked up whole, so an identifier that prefixes another (`button` /
/// `button-primary`) never corrupts the longer one. Two sheets only share
/// a suffix when their content is byte-identical, in which case the
/// rewritten rules are identical too and the collision is harmless.
pub fn rewrite_class_idents(sheet: &str, rewrites: &[(String, String)]) -> String {
    let table: std::collections::BTreeMap<&str, &str> = rewrites
        .iter()
        .map(|(from, to)| (from.as_str(), to.as_str()))
        .collect();

    let bytes = sheet.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'.' {
            let start = i + 1;
            let mut end = start;
            while end < bytes.len()
                && (bytes[end].is_ascii_alphanumeric() || bytes[end] == b'-' || bytes[end] == b'_')
            {
                end += 1;
            }
            if end > start {
                let ident = &sheet[start..end];
                out.push(b'.');
                out.extend_from_slice(table.get(ident).copied().unwrap_or(ident).as_bytes());
                i = end;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    // Splits only happen at ASCII boundaries, so the bytes stay valid UTF-8.
    String::from_utf8(out).expect("rewritten sheet is UTF-8")
}

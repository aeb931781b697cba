//! External collaborator contracts.
//!
//! The pipeline does not implement language transformation or minification
//! itself; it drives collaborators through these narrow traits. The
//! builtins in [`builtin`] are deliberately naive stand-ins that honor the
//! contracts (determinism, idempotent minification) without any real
//! language semantics, so the pipeline is fully exercisable without a
//! compiler toolchain.

use std::collections::BTreeMap;

use tandem_config::{BuildMode, Configuration, ExternalizationPolicy};
use thiserror::Error;

/// Failure reported by a collaborator, wrapped into
/// [`crate::PipelineError::Compilation`] with the asset path and stage.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct CollabError {
    pub message: String,
}

impl CollabError {
    pub fn new(message: impl Into<String>) -> Self {
        CollabError {
            message: message.into(),
        }
    }
}

/// Options handed to compile-capable collaborators.
///
/// Derived from a [`Configuration`]; owned copies only, so a collaborator
/// can never reach back into the configuration of another target.
#[derive(Debug, Clone, PartialEq)]
pub struct CompileOptions {
    pub mode: BuildMode,
    pub defines: BTreeMap<String, String>,
    pub aliases: BTreeMap<String, String>,
    pub externalization: ExternalizationPolicy,
}

impl CompileOptions {
    pub fn from_config(config: &Configuration) -> Self {
        CompileOptions {
            mode: config.mode,
            defines: config.defines.clone(),
            aliases: config.alias_table.clone(),
            externalization: config.externalization,
        }
    }
}

/// Output of a stylesheet collaborator: the compiled sheet plus the local
/// class identifiers it found, in source order. The transform chain owns
/// the actual rewriting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleOutput {
    pub sheet: Vec<u8>,
    pub local_idents: Vec<String>,
}

/// Fixed recompression parameters for production raster assets.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecompressSettings {
    pub jpeg_quality: u8,
    pub jpeg_progressive: bool,
    pub png_quality_min: f32,
    pub png_quality_max: f32,
    pub gif_optimization_level: u8,
}

/// The documented production settings. Development skips recompression
/// entirely, so there is no dev variant.
pub const PRODUCTION_RECOMPRESS: RecompressSettings = RecompressSettings {
    jpeg_quality: 95,
    jpeg_progressive: true,
    png_quality_min: 0.90,
    png_quality_max: 1.00,
    gif_optimization_level: 2,
};

/// Script-to-script compilation capability.
pub trait ScriptCompiler: Send + Sync {
    fn compile(&self, source: &[u8], options: &CompileOptions) -> Result<Vec<u8>, CollabError>;
}

/// Stylesheet compilation capability.
pub trait StyleCompiler: Send + Sync {
    fn compile(&self, source: &[u8], options: &CompileOptions)
        -> Result<StyleOutput, CollabError>;
}

/// Minification capability. Both methods must be deterministic given
/// identical input bytes and tolerant of already-minified input.
pub trait Minifier: Send + Sync {
    fn minify_script(&self, source: &[u8]) -> Result<Vec<u8>, CollabError>;
    fn minify_style(&self, source: &[u8]) -> Result<Vec<u8>, CollabError>;
}

/// Lossy/lossless raster recompression capability.
pub trait ImageCodec: Send + Sync {
    fn recompress(
        &self,
        source: &[u8],
        settings: &RecompressSettings,
    ) -> Result<Vec<u8>, CollabError>;
}

/// The full collaborator set the orchestrator is wired with.
#[derive(Clone, Copy)]
pub struct Collaborators<'a> {
    pub script: &'a dyn ScriptCompiler,
    pub style: &'a dyn StyleCompiler,
    pub minifier: &'a dyn Minifier,
    pub image: &'a dyn ImageCodec,
}

impl Collaborators<'static> {
    /// The builtin stand-in collaborators.
    pub fn builtin() -> Self {
        Collaborators {
            script: &builtin::BuiltinScriptCompiler,
            style: &builtin::BuiltinStyleCompiler,
            minifier: &builtin::BuiltinMinifier,
            image: &builtin::BuiltinImageCodec,
        }
    }
}

pub mod builtin {
    //! Naive builtin collaborators.

    use super::*;

    /// Identity compile plus textual define substitution and alias
    /// rewriting of quoted module specifiers.
    pub struct BuiltinScriptCompiler;

    impl ScriptCompiler for BuiltinScriptCompiler {
        fn compile(&self, source: &[u8], options: &CompileOptions) -> Result<Vec<u8>, CollabError> {
            let text = String::from_utf8(source.to_vec())
                .map_err(|e| CollabError::new(format!("source is not valid UTF-8: {e}")))?;
            let mut out = text;
            for (key, value) in &options.defines {
                out = out.replace(key, &format!("{:?}", value));
            }
            for (alias, replacement) in &options.aliases {
                out = out.replace(&format!("\"{alias}\""), &format!("\"{replacement}\""));
                out = out.replace(&format!("'{alias}'"), &format!("'{replacement}'"));
            }
            Ok(out.into_bytes())
        }
    }

    /// Pass-through "compilation" that scans for local class selectors
    /// (`.name` at a rule boundary) and reports them for rewriting.
    pub struct BuiltinStyleCompiler;

    impl StyleCompiler for BuiltinStyleCompiler {
        fn compile(
            &self,
            source: &[u8],
            _options: &CompileOptions,
        ) -> Result<StyleOutput, CollabError> {
            let text = String::from_utf8(source.to_vec())
                .map_err(|e| CollabError::new(format!("stylesheet is not valid UTF-8: {e}")))?;
            let mut idents = Vec::new();
            let bytes = text.as_bytes();
            let mut i = 0;
            while i < bytes.len() {
                if bytes[i] == b'.' && at_rule_boundary(bytes, i) {
                    let start = i + 1;
                    let mut end = start;
                    while end < bytes.len() && is_ident_byte(bytes[end]) {
                        end += 1;
                    }
                    if end > start {
                        let ident = text[start..end].to_string();
                        if !idents.contains(&ident) {
                            idents.push(ident);
                        }
                        i = end;
                        continue;
                    }
                }
                i += 1;
            }
            Ok(StyleOutput {
                sheet: text.into_bytes(),
                local_idents: idents,
            })
        }
    }

    fn at_rule_boundary(bytes: &[u8], i: usize) -> bool {
        i == 0 || matches!(bytes[i - 1], b' ' | b'\t' | b'\n' | b'\r' | b',' | b'}' | b'{')
    }

    fn is_ident_byte(b: u8) -> bool {
        b.is_ascii_alphanumeric() || b == b'-' || b == b'_'
    }

    /// Whitespace-collapsing minifier. Collapsing is idempotent, so the
    /// already-minified tolerance requirement holds trivially.
    pub struct BuiltinMinifier;

    impl BuiltinMinifier {
        fn collapse(source: &[u8]) -> Result<Vec<u8>, CollabError> {
            let text = std::str::from_utf8(source)
                .map_err(|e| CollabError::new(format!("minifier input is not UTF-8: {e}")))?;
            let mut out = String::with_capacity(text.len());
            let mut last_was_space = true;
            for ch in text.chars() {
                if ch.is_whitespace() {
                    if !last_was_space {
                        out.push(' ');
                        last_was_space = true;
                    }
                } else {
                    out.push(ch);
                    last_was_space = false;
                }
            }
            while out.ends_with(' ') {
                out.pop();
            }
            Ok(out.into_bytes())
        }
    }

    impl Minifier for BuiltinMinifier {
        fn minify_script(&self, source: &[u8]) -> Result<Vec<u8>, CollabError> {
            Self::collapse(source)
        }

        fn minify_style(&self, source: &[u8]) -> Result<Vec<u8>, CollabError> {
            let collapsed = Self::collapse(source)?;
            let text = String::from_utf8(collapsed).expect("collapse preserves UTF-8");
            let mut out = text;
            for token in ["{", "}", ":", ";", ","] {
                out = out.replace(&format!(" {token}"), token);
                out = out.replace(&format!("{token} "), token);
            }
            Ok(out.into_bytes())
        }
    }

    /// Identity codec. Real deployments plug in an actual image toolchain;
    /// the pipeline only requires determinism.
    pub struct BuiltinImageCodec;

    impl ImageCodec for BuiltinImageCodec {
        fn recompress(
            &self,
            source: &[u8],
            _settings: &RecompressSettings,
        ) -> Result<Vec<u8>, CollabError> {
            Ok(source.to_vec())
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use tandem_config::BuildTarget;

        fn options() -> CompileOptions {
            let base = tandem_config::BaseTemplate {
                revision: Some("abc123".to_string()),
                ..Default::default()
            };
            let config =
                tandem_config::derive(&base, BuildTarget::Browser, BuildMode::Development)
                    .unwrap();
            CompileOptions::from_config(&config)
        }

        #[test]
        fn defines_are_substituted() {
            let out = BuiltinScriptCompiler
                .compile(b"console.log(TANDEM.GIT_REVISION);", &options())
                .unwrap();
            assert_eq!(out, b"console.log(\"abc123\");");
        }

        #[test]
        fn aliases_rewrite_quoted_specifiers() {
            let out = BuiltinScriptCompiler
                .compile(b"import { render } from 'react-dom';", &options())
                .unwrap();
            assert_eq!(
                String::from_utf8(out).unwrap(),
                "import { render } from '@hot-loader/react-dom';"
            );
        }

        #[test]
        fn style_compiler_reports_local_idents_once() {
            let sheet = b".button { color: red; }\n.button:hover, .label { color: blue; }";
            let out = BuiltinStyleCompiler.compile(sheet, &options()).unwrap();
            assert_eq!(out.local_idents, vec!["button", "label"]);
        }

        #[test]
        fn minifier_is_idempotent() {
            let once = BuiltinMinifier.minify_script(b"a  =  1;\n\n  b = 2;").unwrap();
            let twice = BuiltinMinifier.minify_script(&once).unwrap();
            assert_eq!(once, twice);
            assert_eq!(once, b"a = 1; b = 2;");
        }

        #[test]
        fn style_minifier_strips_separator_whitespace() {
            let out = BuiltinMinifier
                .minify_style(b".a { color : red ; }")
                .unwrap();
            assert_eq!(out, b".a{color:red;}");
        }
    }
}

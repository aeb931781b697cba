//! Target Configurator: pure derivation of per-target configurations.

use std::collections::BTreeMap;

use tracing::debug;

use crate::config::{Configuration, ExternalizationPolicy, NamingStrategy};
use crate::error::Result;
use crate::mode::{BuildMode, BuildTarget};
use crate::patterns::AssetClass;
use crate::template::BaseTemplate;

/// Derive a complete [`Configuration`] for one (target, mode) pair.
///
/// The base template is read, never mutated; every nested structure in the
/// returned configuration is a fresh owned copy. Calling this twice for
/// two targets yields values with no shared reachable state.
///
/// Browser overrides: application entry, public hashed naming in
/// production, everything bundled, all asset classes processed.
/// Server-executable overrides: renderable root entry, one fixed output
/// filename, native dependency resolution, script class only, never
/// optimized.
pub fn derive(base: &BaseTemplate, target: BuildTarget, mode: BuildMode) -> Result<Configuration> {
    base.validate()?;

    let mut defines = BTreeMap::new();
    defines.insert("process.env.NODE_ENV".to_string(), mode.as_str().to_string());
    if let Some(revision) = &base.revision {
        defines.insert("TANDEM.GIT_REVISION".to_string(), revision.clone());
    }

    let mut alias_table = base.aliases.clone();
    if mode == BuildMode::Development {
        // Hot-reload shims replace their real counterparts in dev only.
        alias_table.extend(base.dev_aliases.clone());
    }

    let config = match target {
        BuildTarget::Browser => Configuration {
            mode,
            target,
            source_root: base.source_root.clone(),
            entry_point: base.browser_entry.clone(),
            entry_preludes: if mode == BuildMode::Development {
                base.dev_entry_preludes.clone()
            } else {
                Vec::new()
            },
            output_dir: base.browser_out_dir.clone(),
            naming: match mode {
                BuildMode::Development => NamingStrategy::Stable,
                BuildMode::Production => NamingStrategy::ContentHash,
            },
            chunk_naming: match mode {
                BuildMode::Development => NamingStrategy::Stable,
                BuildMode::Production => NamingStrategy::ContentHash,
            },
            public_path: base.public_path.clone(),
            alias_table,
            defines,
            optimization_enabled: mode.is_production(),
            externalization: ExternalizationPolicy::Bundle,
            processed_classes: vec![
                AssetClass::Script,
                AssetClass::Stylesheet,
                AssetClass::FontOrMedia,
                AssetClass::RasterImage,
            ],
            patterns: base.patterns.clone(),
            manifest_path: base.manifest_path.clone(),
        },
        BuildTarget::ServerExecutable => Configuration {
            mode,
            target,
            source_root: base.source_root.clone(),
            entry_point: base.server_entry.clone(),
            entry_preludes: Vec::new(),
            output_dir: base.server_out_dir.clone(),
            // Server output is never cached downstream, so it keeps one
            // fixed, predictable filename.
            naming: NamingStrategy::Fixed(base.server_bundle_name.clone()),
            chunk_naming: NamingStrategy::Stable,
            public_path: base.public_path.clone(),
            alias_table,
            defines,
            optimization_enabled: false,
            externalization: ExternalizationPolicy::Native,
            processed_classes: vec![AssetClass::Script],
            patterns: base.patterns.clone(),
            manifest_path: base.manifest_path.clone(),
        },
    };

    debug!(
        target = %config.target,
        mode = %config.mode,
        entry = %config.entry_path().display(),
        "derived configuration"
    );
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> BaseTemplate {
        BaseTemplate {
            revision: Some("deadbeef".to_string()),
            ..BaseTemplate::default()
        }
    }

    #[test]
    fn browser_production_overrides() {
        let cfg = derive(&base(), BuildTarget::Browser, BuildMode::Production).unwrap();
        assert_eq!(cfg.naming, NamingStrategy::ContentHash);
        assert_eq!(cfg.externalization, ExternalizationPolicy::Bundle);
        assert!(cfg.optimization_enabled);
        assert!(cfg.entry_preludes.is_empty());
        assert!(cfg.processes(AssetClass::Stylesheet));
        assert_eq!(cfg.defines["TANDEM.GIT_REVISION"], "deadbeef");
        // Hot-reload shim must not leak into production.
        assert!(!cfg.alias_table.contains_key("react-dom"));
    }

    #[test]
    fn browser_development_overrides() {
        let cfg = derive(&base(), BuildTarget::Browser, BuildMode::Development).unwrap();
        assert_eq!(cfg.naming, NamingStrategy::Stable);
        assert!(!cfg.optimization_enabled);
        assert_eq!(cfg.entry_preludes.len(), 2);
        assert_eq!(cfg.alias_table["react-dom"], "@hot-loader/react-dom");
    }

    #[test]
    fn server_overrides_exclude_style_and_media() {
        let cfg = derive(&base(), BuildTarget::ServerExecutable, BuildMode::Production).unwrap();
        assert_eq!(cfg.naming, NamingStrategy::Fixed("App.js".to_string()));
        assert_eq!(cfg.externalization, ExternalizationPolicy::Native);
        assert!(!cfg.optimization_enabled);
        assert!(cfg.processes(AssetClass::Script));
        assert!(!cfg.processes(AssetClass::Stylesheet));
        assert!(!cfg.processes(AssetClass::FontOrMedia));
        assert!(!cfg.processes(AssetClass::RasterImage));
        assert_eq!(cfg.entry_point, std::path::PathBuf::from("components/App.jsx"));
    }

    #[test]
    fn derived_configurations_do_not_alias() {
        let template = base();
        let mut browser = derive(&template, BuildTarget::Browser, BuildMode::Production).unwrap();
        let server =
            derive(&template, BuildTarget::ServerExecutable, BuildMode::Production).unwrap();

        browser
            .alias_table
            .insert("poisoned".to_string(), "value".to_string());
        browser.processed_classes.clear();
        browser.patterns.scripts.push("exotic".to_string());

        assert!(!server.alias_table.contains_key("poisoned"));
        assert!(server.processes(AssetClass::Script));
        assert!(!server.patterns.scripts.contains(&"exotic".to_string()));
        // The base template itself is also untouched.
        assert!(!template.aliases.contains_key("poisoned"));
    }

    #[test]
    fn derivation_is_pure() {
        let template = base();
        let a = derive(&template, BuildTarget::Browser, BuildMode::Production).unwrap();
        let b = derive(&template, BuildTarget::Browser, BuildMode::Production).unwrap();
        assert_eq!(a, b);
    }
}

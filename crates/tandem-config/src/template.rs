//! The shared base template both targets derive from.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};
use crate::patterns::ClassPatterns;

/// Project-level build template, usually loaded from `tandem.config.json`.
///
/// This is the single input to [`crate::derive`]; it is never handed to the
/// pipeline directly. Defaults describe a conventional layout: sources in
/// `src/`, the browser bundle in `dist/`, the server bundle next to the
/// manifest in `http/dist/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct BaseTemplate {
    /// Root of the application source tree.
    pub source_root: PathBuf,

    /// Browser entry point, relative to `source_root`.
    pub browser_entry: PathBuf,

    /// Server-renderable root module, relative to `source_root`.
    pub server_entry: PathBuf,

    /// Output directory for the browser target.
    pub browser_out_dir: PathBuf,

    /// Output directory for the server-executable target.
    pub server_out_dir: PathBuf,

    /// Fixed output filename for the server-executable bundle.
    pub server_bundle_name: String,

    /// Manifest location. Lives alongside the server output so a running
    /// server process can read it without touching the browser dist.
    pub manifest_path: PathBuf,

    /// Public URL prefix under which browser artifacts are served.
    pub public_path: String,

    /// Extension tables for asset classification.
    pub patterns: ClassPatterns,

    /// Module aliases applied in every mode.
    pub aliases: BTreeMap<String, String>,

    /// Extra aliases installed only in development (hot-reload shims).
    pub dev_aliases: BTreeMap<String, String>,

    /// Runtime modules prepended to the browser entry in development.
    pub dev_entry_preludes: Vec<String>,

    /// Backend port for the development proxy. Opaque to the pipeline.
    pub dev_proxy_port: u16,

    /// Revision identifier injected as a compile-time define. Opaque.
    pub revision: Option<String>,
}

impl Default for BaseTemplate {
    fn default() -> Self {
        BaseTemplate {
            source_root: PathBuf::from("src"),
            browser_entry: PathBuf::from("main.jsx"),
            server_entry: PathBuf::from("components/App.jsx"),
            browser_out_dir: PathBuf::from("dist"),
            server_out_dir: PathBuf::from("http/dist"),
            server_bundle_name: "App.js".to_string(),
            manifest_path: PathBuf::from("http/dist/manifest.json"),
            public_path: "/dist/".to_string(),
            patterns: ClassPatterns::default(),
            aliases: BTreeMap::new(),
            dev_aliases: BTreeMap::from([(
                "react-dom".to_string(),
                "@hot-loader/react-dom".to_string(),
            )]),
            dev_entry_preludes: vec![
                "tandem/hot/patch".to_string(),
                "tandem/hot/dev-client".to_string(),
            ],
            dev_proxy_port: 6969,
            revision: None,
        }
    }
}

impl BaseTemplate {
    /// Load a template from a JSON file. Unknown keys are rejected so a
    /// typoed field never silently falls back to its default.
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|_| ConfigError::NotFound(path.to_path_buf()))?;
        let template: BaseTemplate = serde_json::from_str(&raw)?;
        template.validate()?;
        Ok(template)
    }

    /// Basic shape checks, run before any derivation.
    pub fn validate(&self) -> Result<()> {
        if self.browser_entry.is_absolute() {
            return Err(ConfigError::EntryOutsideSourceRoot(
                self.browser_entry.clone(),
            ));
        }
        if self.server_entry.is_absolute() {
            return Err(ConfigError::EntryOutsideSourceRoot(self.server_entry.clone()));
        }
        if self.public_path.is_empty() {
            return Err(ConfigError::InvalidValue(
                "publicPath must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_describe_the_conventional_layout() {
        let base = BaseTemplate::default();
        assert_eq!(base.source_root, PathBuf::from("src"));
        assert_eq!(base.manifest_path, PathBuf::from("http/dist/manifest.json"));
        assert_eq!(base.dev_proxy_port, 6969);
        assert!(base.validate().is_ok());
    }

    #[test]
    fn from_file_round_trips_overrides() {
        let dir = tempfile::TempDir::new().expect("tempdir");
        let path = dir.path().join("tandem.config.json");
        std::fs::write(
            &path,
            r#"{ "browserEntry": "index.jsx", "devProxyPort": 4000 }"#,
        )
        .expect("write config");

        let base = BaseTemplate::from_file(&path).expect("load");
        assert_eq!(base.browser_entry, PathBuf::from("index.jsx"));
        assert_eq!(base.dev_proxy_port, 4000);
        // Untouched fields keep their defaults.
        assert_eq!(base.server_bundle_name, "App.js");
    }

    #[test]
    fn missing_file_is_reported_as_not_found() {
        let err = BaseTemplate::from_file(Path::new("/nonexistent/tandem.config.json"))
            .expect_err("should fail");
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn absolute_entry_is_rejected() {
        let base = BaseTemplate {
            browser_entry: PathBuf::from("/abs/main.jsx"),
            ..BaseTemplate::default()
        };
        assert!(matches!(
            base.validate(),
            Err(ConfigError::EntryOutsideSourceRoot(_))
        ));
    }
}

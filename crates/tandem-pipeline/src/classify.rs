//! Asset classification and source-tree scanning.

use std::path::{Path, PathBuf};

use tandem_config::{AssetClass, ClassPatterns, Configuration};
use tracing::debug;
use walkdir::WalkDir;

use crate::asset::Asset;
use crate::error::{PipelineError, Result};

/// Classifies source paths and materializes [`Asset`] values.
///
/// Classification is a pure function of a path's extension and its
/// containment in the source root. Paths outside the root pass through
/// unclassified; paths inside the root that match no pattern fail the
/// build.
pub struct Classifier {
    source_root: PathBuf,
    patterns: ClassPatterns,
}

impl Classifier {
    /// Build a classifier for one configuration. Takes owned copies so
    /// the classifier cannot observe later configuration changes.
    pub fn new(source_root: PathBuf, config: &Configuration) -> Self {
        Classifier {
            source_root,
            patterns: config.patterns.clone(),
        }
    }

    /// Classify a single path.
    ///
    /// Returns `Ok(None)` for paths outside the source root (pass-through)
    /// and [`PipelineError::Classification`] for paths inside the root
    /// with no matching pattern.
    pub fn classify(&self, path: &Path) -> Result<Option<AssetClass>> {
        if !path.starts_with(&self.source_root) {
            return Ok(None);
        }
        match self.patterns.class_of(path) {
            Some(class) => Ok(Some(class)),
            None => Err(PipelineError::Classification {
                path: path.to_path_buf(),
            }),
        }
    }

    /// The source-relative, `/`-separated identifier of a path under the
    /// root. This is the manifest key for the asset.
    pub fn source_id(&self, path: &Path) -> Option<String> {
        let rel = path.strip_prefix(&self.source_root).ok()?;
        let mut id = String::new();
        for component in rel.components() {
            if !id.is_empty() {
                id.push('/');
            }
            id.push_str(&component.as_os_str().to_string_lossy());
        }
        Some(id)
    }

    /// Walk the source root and classify every regular file.
    ///
    /// Each classified file is read into an [`Asset`]. Any unclassifiable
    /// file aborts the scan. Classes the configuration excludes (style and
    /// media under the server-executable target) are skipped entirely;
    /// they belong to the browser generation only.
    pub fn scan(&self, config: &Configuration) -> Result<Vec<Asset>> {
        let mut assets = Vec::new();
        for entry in WalkDir::new(&self.source_root).sort_by_file_name() {
            let entry = entry.map_err(|e| {
                PipelineError::io(
                    format!("failed to walk source root {}", self.source_root.display()),
                    e.into_io_error()
                        .unwrap_or_else(|| std::io::Error::other("walkdir loop")),
                )
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path();
            let Some(class) = self.classify(path)? else {
                continue;
            };
            if !config.processes(class) {
                debug!(path = %path.display(), class = %class, "excluded by target");
                continue;
            }
            let content = std::fs::read(path).map_err(|e| {
                PipelineError::io(format!("failed to read asset {}", path.display()), e)
            })?;
            let source_id = self
                .source_id(path)
                .expect("scanned path is under the source root");
            debug!(asset = %source_id, class = %class, "classified");
            assets.push(Asset {
                source_id,
                path: path.to_path_buf(),
                class,
                content,
            });
        }
        Ok(assets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tandem_config::{BaseTemplate, BuildMode, BuildTarget};

    fn browser_config() -> Configuration {
        tandem_config::derive(
            &BaseTemplate::default(),
            BuildTarget::Browser,
            BuildMode::Production,
        )
        .unwrap()
    }

    fn classifier_in(dir: &Path) -> Classifier {
        Classifier::new(dir.join("src"), &browser_config())
    }

    #[test]
    fn outside_source_root_passes_through() {
        let dir = tempfile::TempDir::new().unwrap();
        let classifier = classifier_in(dir.path());
        let outside = dir.path().join("vendor/blob.xyz");
        assert!(classifier.classify(&outside).unwrap().is_none());
    }

    #[test]
    fn unknown_extension_under_root_is_fatal() {
        let dir = tempfile::TempDir::new().unwrap();
        let classifier = classifier_in(dir.path());
        let err = classifier
            .classify(&dir.path().join("src/notes.txt"))
            .unwrap_err();
        assert!(matches!(err, PipelineError::Classification { .. }));
    }

    #[test]
    fn scan_reads_and_identifies_assets() {
        let dir = tempfile::TempDir::new().unwrap();
        let src = dir.path().join("src");
        std::fs::create_dir_all(src.join("components")).unwrap();
        std::fs::write(src.join("app.js"), "let x = 1;").unwrap();
        std::fs::write(src.join("components/App.jsx"), "export {};").unwrap();

        let classifier = classifier_in(dir.path());
        let assets = classifier.scan(&browser_config()).unwrap();
        let ids: Vec<_> = assets.iter().map(|a| a.source_id.as_str()).collect();
        assert_eq!(ids, vec!["app.js", "components/App.jsx"]);
        assert_eq!(assets[0].content, b"let x = 1;");
    }

    #[test]
    fn scan_skips_classes_the_target_excludes() {
        let dir = tempfile::TempDir::new().unwrap();
        let src = dir.path().join("src");
        std::fs::create_dir_all(src.join("components")).unwrap();
        std::fs::write(src.join("theme.scss"), ".a { color: red; }").unwrap();
        std::fs::write(src.join("components/App.jsx"), "export {};").unwrap();

        let server = tandem_config::derive(
            &BaseTemplate::default(),
            BuildTarget::ServerExecutable,
            BuildMode::Production,
        )
        .unwrap();
        let classifier = Classifier::new(src, &server);
        let assets = classifier.scan(&server).unwrap();
        let ids: Vec<_> = assets.iter().map(|a| a.source_id.as_str()).collect();
        assert_eq!(ids, vec!["components/App.jsx"]);
    }
}

//! Manifest accumulation and atomic commit.
//!
//! The manifest maps source-relative identifiers to deployed names. It is
//! accumulated during one build generation and committed as a single unit
//! via temp-write-then-rename, so a concurrent reader observes either the
//! previous complete table or the new complete table, never a truncated
//! hybrid.

use std::collections::BTreeMap;
use std::path::Path;

use tracing::debug;

use crate::error::{PipelineError, Result};

/// Accumulates manifest entries for one build generation.
#[derive(Debug, Default, Clone)]
pub struct ManifestBuilder {
    entries: BTreeMap<String, String>,
}

impl ManifestBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a builder from an already-committed table (dev incremental
    /// updates re-commit the whole table after replacing one entry).
    pub fn from_entries(entries: BTreeMap<String, String>) -> Self {
        ManifestBuilder { entries }
    }

    /// Register a deployed name for a source identifier.
    ///
    /// Keys are write-once within a generation: a second registration of
    /// the same identifier indicates a classifier or configuration bug
    /// and fails with [`PipelineError::DuplicateManifestKey`].
    pub fn insert(&mut self, source_id: impl Into<String>, deployed: impl Into<String>) -> Result<()> {
        let key = source_id.into();
        if self.entries.contains_key(&key) {
            return Err(PipelineError::DuplicateManifestKey { key });
        }
        self.entries.insert(key, deployed.into());
        Ok(())
    }

    /// Replace (or add) one entry. Used by incremental dev rebuilds,
    /// where a re-transformed asset legitimately supersedes its previous
    /// registration.
    pub fn upsert(&mut self, source_id: impl Into<String>, deployed: impl Into<String>) {
        self.entries.insert(source_id.into(), deployed.into());
    }

    pub fn entries(&self) -> &BTreeMap<String, String> {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Commit the whole table atomically.
    ///
    /// Writes to a sibling temp file in the same directory, then renames
    /// over the destination. Rename within one directory is atomic on the
    /// file systems we care about.
    pub fn commit(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                PipelineError::io(
                    format!("failed to create manifest directory {}", parent.display()),
                    e,
                )
            })?;
        }

        let json = serde_json::to_vec_pretty(&self.entries)?;
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, &json).map_err(|e| {
            PipelineError::io(format!("failed to write manifest temp {}", tmp.display()), e)
        })?;
        std::fs::rename(&tmp, path).map_err(|e| {
            PipelineError::io(
                format!("failed to commit manifest to {}", path.display()),
                e,
            )
        })?;
        debug!(manifest = %path.display(), entries = self.entries.len(), "manifest committed");
        Ok(())
    }
}

/// A committed manifest, exposed read-only to the server-executable
/// target so server-rendered markup can resolve hashed asset names
/// without running the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    entries: BTreeMap<String, String>,
}

impl Manifest {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read(path).map_err(|e| {
            PipelineError::io(format!("failed to read manifest {}", path.display()), e)
        })?;
        let entries = serde_json::from_slice(&raw)?;
        Ok(Manifest { entries })
    }

    pub fn get(&self, source_id: &str) -> Option<&str> {
        self.entries.get(source_id).map(String::as_str)
    }

    pub fn entries(&self) -> &BTreeMap<String, String> {
        &self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_registration_fails() {
        let mut builder = ManifestBuilder::new();
        builder.insert("app.js", "abc.js").unwrap();
        let err = builder.insert("app.js", "def.js").unwrap_err();
        assert!(matches!(
            err,
            PipelineError::DuplicateManifestKey { key } if key == "app.js"
        ));
    }

    #[test]
    fn upsert_replaces_without_error() {
        let mut builder = ManifestBuilder::new();
        builder.insert("app.js", "abc.js").unwrap();
        builder.upsert("app.js", "def.js");
        assert_eq!(builder.entries()["app.js"], "def.js");
    }

    #[test]
    fn commit_then_load_round_trips() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("http/dist/manifest.json");

        let mut builder = ManifestBuilder::new();
        builder.insert("app.js", "0123456789abcdef0123.js").unwrap();
        builder.insert("theme.scss", "fedcba9876543210fedc.css").unwrap();
        builder.commit(&path).unwrap();

        let manifest = Manifest::load(&path).unwrap();
        assert_eq!(manifest.get("app.js"), Some("0123456789abcdef0123.js"));
        assert_eq!(manifest.entries().len(), 2);
    }

    #[test]
    fn commit_leaves_no_temp_file_behind() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("manifest.json");
        ManifestBuilder::new().commit(&path).unwrap();

        let names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(names, vec!["manifest.json"]);
    }

    #[test]
    fn interrupted_write_never_corrupts_the_committed_table() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("manifest.json");

        let mut first = ManifestBuilder::new();
        first.insert("app.js", "aaaa.js").unwrap();
        first.commit(&path).unwrap();

        // A writer killed mid-write leaves a truncated temp file behind;
        // the committed manifest must still parse as the old table.
        std::fs::write(path.with_extension("json.tmp"), b"{\"app.js\": \"trunc").unwrap();
        let manifest = Manifest::load(&path).unwrap();
        assert_eq!(manifest.get("app.js"), Some("aaaa.js"));

        // The next commit supersedes the stray temp file.
        let mut second = ManifestBuilder::new();
        second.insert("app.js", "bbbb.js").unwrap();
        second.commit(&path).unwrap();
        assert_eq!(Manifest::load(&path).unwrap().get("app.js"), Some("bbbb.js"));
    }

    #[test]
    fn recommit_replaces_the_table_wholesale() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("manifest.json");

        let mut first = ManifestBuilder::new();
        first.insert("app.js", "aaaa.js").unwrap();
        first.insert("gone.js", "bbbb.js").unwrap();
        first.commit(&path).unwrap();

        let mut second = ManifestBuilder::new();
        second.insert("app.js", "cccc.js").unwrap();
        second.commit(&path).unwrap();

        let manifest = Manifest::load(&path).unwrap();
        assert_eq!(manifest.get("app.js"), Some("cccc.js"));
        assert_eq!(manifest.get("gone.js"), None, "old keys never survive");
    }
}

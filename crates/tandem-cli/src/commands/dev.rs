//! Development watch loop.
//!
//! Runs one initial development build, then rebuilds the affected asset
//! on every file change, commits the updated manifest atomically and
//! publishes the deployed name on a live-reload broadcast channel. Fatal
//! pipeline errors fail the in-flight generation only: the loop reports
//! them, leaves the previous generation's artifacts live and waits for
//! the next change. The loop runs until the process is stopped.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use tandem_config::{BuildMode, Configuration};
use tandem_pipeline::{Collaborators, ManifestBuilder, Orchestrator};
use tokio::sync::broadcast;
use tracing::{error, info, warn};

use crate::cli::DevArgs;
use crate::dev::{FileChange, FileWatcher};
use crate::error::Result;

pub async fn execute(args: DevArgs) -> Result<()> {
    let project_root = super::resolve_project_root(args.project_root)?;
    let mut base = super::load_template(&project_root, args.config.as_deref())?;
    if let Some(port) = args.port {
        base.dev_proxy_port = port;
    }
    // The proxy itself is an external collaborator; we only carry its
    // port as an opaque value.
    info!(proxy_port = base.dev_proxy_port, "development proxy backend");

    let source_root = resolve(&project_root, &base.source_root);
    let manifest_path = resolve(&project_root, &base.manifest_path);
    let mut orchestrator =
        Orchestrator::new(project_root.clone(), base.clone(), Collaborators::builtin());

    // Initial generation. A failure here is reported, not fatal; the
    // watch loop still starts and the next change retries incrementally.
    let entries = Mutex::new(BTreeMap::new());
    match orchestrator.run(BuildMode::Development) {
        Ok(report) => {
            *entries.lock() = report.manifest;
            info!(entries = entries.lock().len(), "initial development build committed");
        }
        Err(err) => error!("initial build failed: {err}"),
    }

    let config = orchestrator
        .configurations(BuildMode::Development)?
        .remove(0);

    // Live-reload notification channel. The dev proxy subscribes to it;
    // with no subscriber, sends are silently dropped.
    let (reload_tx, mut reload_log) = broadcast::channel::<String>(16);
    tokio::spawn(async move {
        while let Ok(name) = reload_log.recv().await {
            info!(asset = %name, "live-reload");
        }
    });

    let (_watcher, mut changes) = FileWatcher::new(source_root.clone(), args.debounce_ms)?;
    info!(root = %source_root.display(), "watching for changes");

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("shutting down");
                break;
            }
            change = changes.recv() => {
                let Some(change) = change else { break };
                handle_change(
                    &orchestrator,
                    &config,
                    &entries,
                    &source_root,
                    &manifest_path,
                    &reload_tx,
                    change,
                );
            }
        }
    }
    Ok(())
}

/// Apply one file-change event to the in-flight dev generation.
fn handle_change(
    orchestrator: &Orchestrator<'_>,
    config: &Configuration,
    entries: &Mutex<BTreeMap<String, String>>,
    source_root: &Path,
    manifest_path: &Path,
    reload_tx: &broadcast::Sender<String>,
    change: FileChange,
) {
    match change {
        FileChange::Removed(path) => {
            let Some(source_id) = relative_id(source_root, &path) else {
                return;
            };
            let removed = entries.lock().remove(&source_id);
            if removed.is_some() {
                commit_entries(entries, manifest_path);
                info!(asset = %source_id, "asset removed");
            }
        }
        FileChange::Created(path) | FileChange::Modified(path) => {
            match orchestrator.transform_one(config, &path) {
                Ok(Some(emitted)) => {
                    entries
                        .lock()
                        .insert(emitted.source_id.clone(), emitted.deployed.clone());
                    commit_entries(entries, manifest_path);
                    let _ = reload_tx.send(emitted.deployed);
                    info!(asset = %emitted.source_id, "rebuilt");
                }
                Ok(None) => {}
                // The previous generation stays live; wait for the next
                // change event.
                Err(err) => error!("rebuild failed: {err}"),
            }
        }
    }
}

/// Re-commit the whole manifest table atomically after one entry changed.
fn commit_entries(entries: &Mutex<BTreeMap<String, String>>, manifest_path: &Path) {
    let snapshot = entries.lock().clone();
    if let Err(err) = ManifestBuilder::from_entries(snapshot).commit(manifest_path) {
        warn!("manifest commit failed: {err}");
    }
}

fn relative_id(source_root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(source_root).ok()?;
    Some(
        rel.components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/"),
    )
}

fn resolve(project_root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        project_root.join(path)
    }
}

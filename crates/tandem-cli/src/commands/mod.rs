//! Command implementations.

pub mod build;
pub mod dev;

use std::path::{Path, PathBuf};

use tandem_config::BaseTemplate;
use tracing::debug;

use crate::error::Result;

/// Default template filename looked up in the project root.
const CONFIG_FILENAME: &str = "tandem.config.json";

/// Resolve the project root from an optional flag.
pub(crate) fn resolve_project_root(flag: Option<PathBuf>) -> Result<PathBuf> {
    match flag {
        Some(root) => Ok(root),
        None => Ok(std::env::current_dir()?),
    }
}

/// Load the base template and apply environment-provided values.
///
/// Explicit `--config` paths must exist; the conventional
/// `tandem.config.json` is optional and falls back to defaults. The
/// revision identifier (`TANDEM_REVISION`) and proxy port (`PORT`) are
/// opaque environment inputs layered on top.
pub(crate) fn load_template(project_root: &Path, config: Option<&Path>) -> Result<BaseTemplate> {
    let mut base = match config {
        Some(path) => BaseTemplate::from_file(path)?,
        None => {
            let conventional = project_root.join(CONFIG_FILENAME);
            if conventional.is_file() {
                debug!(config = %conventional.display(), "loading conventional config");
                BaseTemplate::from_file(&conventional)?
            } else {
                BaseTemplate::default()
            }
        }
    };

    if base.revision.is_none() {
        if let Ok(revision) = std::env::var("TANDEM_REVISION") {
            base.revision = Some(revision);
        }
    }
    if let Ok(port) = std::env::var("PORT") {
        if let Ok(port) = port.parse() {
            base.dev_proxy_port = port;
        }
    }
    Ok(base)
}

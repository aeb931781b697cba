//! One-shot build command.

use tandem_config::BuildMode;
use tandem_pipeline::{Collaborators, Orchestrator};
use tracing::info;

use crate::cli::BuildArgs;
use crate::error::Result;

/// Run one build generation.
///
/// Exit code 0 means the generation was fully committed; any pipeline
/// failure propagates out, rendering the failing asset path and stage
/// name on the error stream with a non-zero exit.
pub async fn execute(args: BuildArgs) -> Result<()> {
    let project_root = super::resolve_project_root(args.project_root)?;
    let base = super::load_template(&project_root, args.config.as_deref())?;
    let mode = args
        .mode
        .map(BuildMode::from)
        .unwrap_or_else(BuildMode::from_env);

    info!(mode = %mode, root = %project_root.display(), "starting build generation");
    let mut orchestrator = Orchestrator::new(project_root, base, Collaborators::builtin());
    let report = orchestrator.run(mode)?;

    for target in &report.targets {
        info!(
            target = %target.target,
            files = target.files.len(),
            dir = %target.output_dir.display(),
            "target committed"
        );
    }
    info!(
        manifest = %report.manifest_path.display(),
        entries = report.manifest.len(),
        "build generation committed"
    );
    Ok(())
}

//! Integration tests for the build command over real project fixtures.

use std::path::PathBuf;

use tandem_cli::cli::{BuildArgs, Mode};
use tandem_cli::commands::build;
use tempfile::TempDir;

fn fixture_project() -> TempDir {
    let dir = TempDir::new().expect("tempdir");
    let src = dir.path().join("src");
    std::fs::create_dir_all(src.join("components")).unwrap();
    std::fs::write(src.join("main.jsx"), "console.log(\"hello\");\n").unwrap();
    std::fs::write(src.join("theme.scss"), ".app { color: red; }\n").unwrap();
    std::fs::write(src.join("components/App.jsx"), "export const App = 1;\n").unwrap();
    dir
}

#[tokio::test]
async fn production_build_commits_manifest_and_artifacts() {
    let dir = fixture_project();
    let args = BuildArgs {
        mode: Some(Mode::Production),
        config: None,
        project_root: Some(dir.path().to_path_buf()),
    };
    build::execute(args).await.expect("build succeeds");

    let manifest_path = dir.path().join("http/dist/manifest.json");
    assert!(manifest_path.exists());
    let manifest: std::collections::BTreeMap<String, String> =
        serde_json::from_slice(&std::fs::read(&manifest_path).unwrap()).unwrap();
    assert!(manifest.contains_key("main.jsx"));
    assert!(manifest.contains_key("theme.scss"));
    assert!(dir.path().join("http/dist/App.js").exists());
    for deployed in manifest.values() {
        assert!(dir.path().join("dist").join(deployed).exists());
    }
}

#[tokio::test]
async fn explicit_config_file_is_honored() {
    let dir = fixture_project();
    std::fs::rename(
        dir.path().join("src/main.jsx"),
        dir.path().join("src/entry.jsx"),
    )
    .unwrap();
    let config_path = dir.path().join("custom.config.json");
    std::fs::write(&config_path, r#"{ "browserEntry": "entry.jsx" }"#).unwrap();

    let args = BuildArgs {
        mode: Some(Mode::Development),
        config: Some(config_path),
        project_root: Some(dir.path().to_path_buf()),
    };
    build::execute(args).await.expect("build succeeds");

    // Stable dev names; the entry bundle carries the live-reload hook.
    let entry = std::fs::read_to_string(dir.path().join("dist/entry.js")).unwrap();
    assert!(entry.contains("__TANDEM_RELOAD__"));
}

#[tokio::test]
async fn missing_explicit_config_fails() {
    let dir = fixture_project();
    let args = BuildArgs {
        mode: Some(Mode::Production),
        config: Some(PathBuf::from("/nonexistent/tandem.config.json")),
        project_root: Some(dir.path().to_path_buf()),
    };
    assert!(build::execute(args).await.is_err());
}

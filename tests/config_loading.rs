// tests/config_loading.rs

use std::io::Write;
use std::sync::Arc;

use tempfile::NamedTempFile;
use testwatch::config::{load_and_validate, load_or_default};
use testwatch::engine::ChangeDispatcher;
use testwatch::errors::TestwatchError;
use testwatch::fs::mock::MockFileSystem;
use testwatch::types::{Artifact, ArtifactKind};

fn config_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{contents}").unwrap();
    file
}

#[test]
fn full_config_round_trips_into_a_dispatcher() {
    let file = config_file(
        r#"
[config]
interval_ms = 250
recent_secs = 60

[artifact.spec]
roots = ["lib", "spec"]
cmd = "rspec {artifacts}"

[artifact.test]
roots = ["app", "test"]
rails_layout = true
rewrite = { mailers = "unit/mailers" }

[coverage]
cmd = "rcov {artifacts}"
"#,
    );

    let cfg = load_and_validate(file.path()).unwrap();
    assert_eq!(cfg.config.interval_ms, 250);
    assert_eq!(cfg.config.recent_secs, Some(60));
    assert_eq!(cfg.artifacts.len(), 2);
    assert_eq!(cfg.artifact(ArtifactKind::Spec).unwrap().cmd, "rspec {artifacts}");
    assert!(cfg.coverage.is_some());

    let fs = MockFileSystem::new();
    fs.add_file("app/mailers/notifier.rb", 1);
    fs.add_file("test/unit/mailers/notifier_test.rb", 1);
    let mut dispatcher = ChangeDispatcher::from_config(&cfg, Arc::new(fs.clone()))
        .with_recent_window(None);
    assert_eq!(
        dispatcher.tick(),
        [Artifact::new(ArtifactKind::Test, "test/unit/mailers/notifier_test.rb")]
    );
}

#[test]
fn malformed_toml_is_a_toml_error() {
    let file = config_file("[config\ninterval_ms = ");
    match load_and_validate(file.path()) {
        Err(TestwatchError::TomlError(_)) => {}
        other => panic!("Expected TomlError, got: {:?}", other),
    }
}

#[test]
fn unknown_artifact_kind_is_structured() {
    let file = config_file("[artifact.features]\nroots = [\"lib\"]\n");
    match load_and_validate(file.path()) {
        Err(TestwatchError::UnknownArtifactKind(kind)) => assert_eq!(kind, "features"),
        other => panic!("Expected UnknownArtifactKind, got: {:?}", other),
    }
}

#[test]
fn explicit_missing_path_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("Testwatch.toml");
    match load_or_default(Some(&missing)) {
        Err(TestwatchError::IoError(e)) => assert_eq!(e.kind(), std::io::ErrorKind::NotFound),
        other => panic!("Expected IoError, got: {:?}", other),
    }
}

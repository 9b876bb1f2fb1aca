use std::fs;
use std::path::{Path, PathBuf};

use p2j_config::{Config, ConfigError, ConfigSourceKind, LoadOptions};
use tempfile::TempDir;

fn write_file(path: impl AsRef<Path>, contents: &str) {
    fs::write(path, contents).expect("write config");
}

fn canonical(path: impl AsRef<Path>) -> PathBuf {
    fs::canonicalize(path).expect("canonicalize path")
}

#[test]
fn loads_defaults_when_no_files_present() {
    let temp = TempDir::new().expect("tempdir");
    let working_dir = canonical(temp.path());

    let config = Config::load(LoadOptions::default().with_working_dir(working_dir.clone()))
        .expect("load defaults");

    assert!(config.convert.one_line_comments);
    assert!(config.convert.unindent_block_comments);
    assert!(config.badge.enabled);
    assert_eq!(config.badge.repository_url, None);
    assert_eq!(config.sources.working_directory, working_dir);
    assert_eq!(config.sources.layers.len(), 1);
    assert_eq!(config.sources.layers[0].kind, ConfigSourceKind::Default);
}

#[test]
fn applies_precedence_and_merges_fields() {
    let temp = TempDir::new().expect("tempdir");
    let git_root = canonical(temp.path());
    fs::create_dir(git_root.join(".git")).expect("create .git");

    write_file(
        git_root.join(".p2j.toml"),
        r#"
        [convert]
        one_line_comments = false

        [badge]
        repository_url = "https://github.com/org/repo/blob/main/"
        "#,
    );

    let nested = git_root.join("notebooks");
    fs::create_dir(&nested).expect("create nested");
    write_file(
        nested.join(".p2j.toml"),
        r#"
        [badge]
        enabled = false
        "#,
    );

    let config = Config::load(LoadOptions::default().with_working_dir(&nested)).expect("load");

    assert!(!config.convert.one_line_comments);
    assert!(!config.badge.enabled);
    assert_eq!(
        config.badge.repository_url.as_deref(),
        Some("https://github.com/org/repo/blob/main/")
    );

    let kinds: Vec<_> = config
        .sources
        .layers
        .iter()
        .map(|layer| layer.kind)
        .collect();
    assert_eq!(
        kinds,
        vec![
            ConfigSourceKind::Default,
            ConfigSourceKind::GitRoot,
            ConfigSourceKind::Local
        ]
    );
}

#[test]
fn override_file_wins() {
    let temp = TempDir::new().expect("tempdir");
    let working_dir = canonical(temp.path());

    write_file(
        working_dir.join(".p2j.toml"),
        "[convert]\nunindent_block_comments = false\n",
    );
    write_file(
        working_dir.join("custom.toml"),
        "[convert]\nunindent_block_comments = true\n",
    );

    let config = Config::load(
        LoadOptions::default()
            .with_working_dir(&working_dir)
            .with_override_path("custom.toml"),
    )
    .expect("load");

    assert!(config.convert.unindent_block_comments);
    let last = config.sources.layers.last().expect("layers");
    assert_eq!(last.kind, ConfigSourceKind::Override);
    assert_eq!(last.path.as_deref(), Some(working_dir.join("custom.toml").as_path()));
}

#[test]
fn missing_override_is_an_error() {
    let temp = TempDir::new().expect("tempdir");

    let err = Config::load(
        LoadOptions::default()
            .with_working_dir(temp.path())
            .with_override_path("absent.toml"),
    )
    .unwrap_err();

    assert!(matches!(err, ConfigError::OverrideNotFound { .. }));
}

#[test]
fn invalid_toml_reports_path() {
    let temp = TempDir::new().expect("tempdir");
    let working_dir = canonical(temp.path());
    write_file(working_dir.join(".p2j.toml"), "[convert\n");

    let err = Config::load(LoadOptions::default().with_working_dir(&working_dir)).unwrap_err();

    match err {
        ConfigError::Parse { path, .. } => assert_eq!(path, working_dir.join(".p2j.toml")),
        other => panic!("unexpected error: {other}"),
    }
}

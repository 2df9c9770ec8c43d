//! Layered loading against real config files.

use std::fs;
use std::path::PathBuf;

use kiln_config::{ConfigError, ConfigLoader, CspMode};
use tempfile::TempDir;

#[test]
fn load_defaults_without_config_file() {
    let dir = TempDir::new().expect("tempdir");

    let config = ConfigLoader::new(dir.path())
        .env_prefix("KILN_TEST_DEFAULTS_")
        .load()
        .expect("load");

    assert_eq!(config.inline_style_threshold, 0);
    assert_eq!(config.out_dir, PathBuf::from(".kiln/output"));
}

#[test]
fn load_toml_overrides_defaults() {
    let dir = TempDir::new().expect("tempdir");
    fs::write(
        dir.path().join("kiln.toml"),
        r#"
inline_style_threshold = 4096
service_worker = true

[paths]
base = "/docs"

[csp]
mode = "hash"

[csp.directives]
"script-src" = ["self"]

[version]
name = "1.2.3"
"#,
    )
    .expect("write config");

    let config = ConfigLoader::new(dir.path())
        .env_prefix("KILN_TEST_TOML_")
        .load()
        .expect("load");

    assert_eq!(config.inline_style_threshold, 4096);
    assert!(config.service_worker);
    assert_eq!(config.paths.base, "/docs");
    assert!(config.paths.relative);
    assert_eq!(config.csp.mode, CspMode::Hash);
    assert_eq!(config.csp.directives["script-src"], vec!["self".to_string()]);
    assert_eq!(config.version.name, "1.2.3");
}

#[test]
fn load_json_config() {
    let dir = TempDir::new().expect("tempdir");
    fs::write(
        dir.path().join("kiln.json"),
        r#"{ "env": { "public_prefix": "APP_" }, "csrf": { "trusted_origins": ["https://a.test"] } }"#,
    )
    .expect("write config");

    let config = ConfigLoader::new(dir.path())
        .env_prefix("KILN_TEST_JSON_")
        .load()
        .expect("load");

    assert_eq!(config.env.public_prefix, "APP_");
    assert_eq!(config.csrf.trusted_origins, vec!["https://a.test".to_string()]);
    assert!(config.csrf.check_origin);
}

#[test]
fn load_rejects_invalid_values() {
    let dir = TempDir::new().expect("tempdir");
    fs::write(dir.path().join("kiln.toml"), "[paths]\nbase = \"docs/\"\n").expect("write config");

    let err = ConfigLoader::new(dir.path())
        .env_prefix("KILN_TEST_INVALID_")
        .load()
        .unwrap_err();

    assert!(matches!(err, ConfigError::InvalidValue { field: "paths.base", .. }));
}

#[test]
fn load_reports_type_errors() {
    let dir = TempDir::new().expect("tempdir");
    fs::write(
        dir.path().join("kiln.toml"),
        "inline_style_threshold = \"large\"\n",
    )
    .expect("write config");

    let err = ConfigLoader::new(dir.path())
        .env_prefix("KILN_TEST_TYPES_")
        .load()
        .unwrap_err();

    assert!(matches!(err, ConfigError::Load(_)));
}

#[test]
fn load_explicit_file() {
    let dir = TempDir::new().expect("tempdir");
    fs::create_dir(dir.path().join("config")).expect("mkdir");
    fs::write(
        dir.path().join("config/prod.toml"),
        "out_dir = \"build\"\n",
    )
    .expect("write config");

    let config = ConfigLoader::new(dir.path())
        .file("config/prod.toml")
        .env_prefix("KILN_TEST_EXPLICIT_")
        .load()
        .expect("load");

    assert_eq!(config.out_dir, PathBuf::from("build"));
    assert_eq!(config.server_out_dir(), PathBuf::from("build/server"));
}

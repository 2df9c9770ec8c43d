//! End-to-end tests for the `kiln` binary.

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const GRAPH: &str = r#"{
    "src/routes/+page.svelte": {
        "file": "entries/pages/_page.svelte.js",
        "imports": ["src/lib/shared.js"],
        "css": ["assets/_page.css"],
        "isEntry": true
    },
    "src/lib/shared.js": {
        "file": "chunks/shared.js",
        "css": ["assets/shared.css"],
        "assets": ["assets/inter.woff2"]
    },
    "src/routes/api/+server.js": {
        "file": "entries/endpoints/api/_server.js",
        "isEntry": true
    }
}"#;

const ROUTES: &str = r#"{
    "nodes": [{ "component": "src/routes/+page.svelte" }],
    "routes": [
        { "id": "/", "leaf": { "component": "src/routes/+page.svelte" } },
        { "id": "/api", "endpoint": "src/routes/api/+server.js" }
    ]
}"#;

const EXPORTS: &str = r#"{ "src/routes/api/+server.js": ["GET", "POST", "config", "default"] }"#;

fn write(root: &Path, relative: &str, contents: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, contents).unwrap();
}

fn project() -> TempDir {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    write(root, "manifest.json", GRAPH);
    write(root, "routes.json", ROUTES);
    write(root, "exports.json", EXPORTS);
    write(
        root,
        "src/app.html",
        "<html><head>%kiln.head%</head><body>%kiln.body%</body></html>",
    );
    write(root, ".kiln/output/client/assets/_page.css", "h1{}");
    write(root, ".kiln/output/client/assets/shared.css", "p{}");
    dir
}

fn kiln() -> Command {
    let mut cmd = Command::cargo_bin("kiln").unwrap();
    cmd.env("NO_COLOR", "1").env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_help() {
    kiln()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("build"))
        .stdout(predicate::str::contains("resolve"))
        .stdout(predicate::str::contains("methods"));
}

#[test]
fn test_build_writes_server_output() {
    let dir = project();

    kiln()
        .args(["build", "--inline-threshold", "1024", "--cwd"])
        .arg(dir.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("Server build complete"));

    let server = dir.path().join(".kiln/output/server");
    for file in ["index.js", "nodes/0.js", "stylesheets/0.js", "stylesheets/1.js", "matchers.js", "methods.json"] {
        assert!(server.join(file).is_file(), "{file} missing");
    }
    let node = fs::read_to_string(server.join("nodes/0.js")).unwrap();
    assert!(node.contains(r#"export const imports = ["chunks/shared.js"];"#));
    assert!(node.contains(r#"export const fonts = ["assets/inter.woff2"];"#));
}

#[test]
fn test_build_reads_config_file() {
    let dir = project();
    write(dir.path(), "kiln.toml", "out_dir = \"build\"\n\n[paths]\nbase = \"/docs\"\n");

    kiln()
        .arg("build")
        .arg("--cwd")
        .arg(dir.path())
        .assert()
        .success();

    let entry = fs::read_to_string(dir.path().join("build/server/index.js")).unwrap();
    assert!(entry.contains("base: \"/docs\""));
}

#[test]
fn test_build_reports_missing_module() {
    let dir = project();
    write(
        dir.path(),
        "routes.json",
        r#"{ "nodes": [{ "component": "src/routes/ghost.js" }] }"#,
    );

    kiln()
        .arg("build")
        .arg("--cwd")
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("ghost.js"));
}

#[test]
fn test_build_reports_missing_input() {
    let dir = project();
    fs::remove_file(dir.path().join("exports.json")).unwrap();

    kiln()
        .arg("build")
        .arg("--cwd")
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("exports.json"));
}

#[test]
fn test_resolve_prints_json() {
    let dir = project();

    let output = kiln()
        .args(["resolve", "src/routes/+page.svelte", "--cwd"])
        .arg(dir.path())
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let resolved: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(resolved["file"], "entries/pages/_page.svelte.js");
    assert_eq!(resolved["importedChunks"], serde_json::json!(["chunks/shared.js"]));
    assert_eq!(
        resolved["stylesheets"],
        serde_json::json!(["assets/_page.css", "assets/shared.css"])
    );
}

#[test]
fn test_methods_prints_table() {
    let dir = project();

    kiln()
        .arg("methods")
        .arg("--cwd")
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""src/routes/api/+server.js": ["#))
        .stdout(predicate::str::contains("\"GET\""))
        .stdout(predicate::str::contains("config").not());
}

//! Shared fixtures for kiln-emit integration tests.

#![allow(dead_code)]

use std::fs;
use std::path::Path;

use kiln_config::KilnConfig;
use kiln_graph::{ArtifactEntry, ArtifactGraph, RouteManifest, RouteNode};
use tempfile::TempDir;

pub const APP_TEMPLATE: &str =
    "<!doctype html><html><head>%kiln.head%</head><body>%kiln.body%</body></html>";

/// A temporary project directory.
pub fn project() -> TempDir {
    tempfile::tempdir().expect("create temp dir")
}

/// Write `contents` to `root/relative`, creating parents.
pub fn write(root: &Path, relative: &str, contents: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent dirs");
    }
    fs::write(path, contents).expect("write fixture");
}

pub fn read(root: &Path, relative: &str) -> String {
    fs::read_to_string(root.join(relative)).expect("read output")
}

/// Config with a fixed version so output is reproducible.
pub fn config(threshold: u64) -> KilnConfig {
    let mut config = KilnConfig::default();
    config.version.name = "test".to_string();
    config.inline_style_threshold = threshold;
    config
}

/// Two pages sharing `src/lib/shared.js` and its stylesheet.
pub fn shared_graph() -> ArtifactGraph {
    ArtifactGraph::new()
        .with_entry(
            "src/routes/+page.svelte",
            ArtifactEntry::new("entries/pages/_page.svelte.js")
                .with_import("src/lib/shared.js")
                .with_css("assets/_page.css")
                .entry(true),
        )
        .with_entry(
            "src/routes/about/+page.svelte",
            ArtifactEntry::new("entries/pages/about/_page.svelte.js")
                .with_import("src/lib/shared.js")
                .with_deferred_import("src/lib/chart.js")
                .entry(true),
        )
        .with_entry(
            "src/routes/about/+page.server.js",
            ArtifactEntry::new("entries/pages/about/_page.server.js").entry(true),
        )
        .with_entry(
            "src/lib/shared.js",
            ArtifactEntry::new("chunks/shared.js").with_css("assets/shared.css"),
        )
        .with_entry(
            "src/lib/chart.js",
            ArtifactEntry::new("chunks/chart.js")
                .with_css("assets/chart.css")
                .dynamic_entry(true),
        )
        .with_entry(
            "src/params/slug.js",
            ArtifactEntry::new("entries/matchers/slug.js"),
        )
        .with_entry(
            "src/routes/api/+server.js",
            ArtifactEntry::new("entries/endpoints/api/_server.js").entry(true),
        )
}

pub fn shared_routes() -> RouteManifest {
    RouteManifest::from_json(
        r#"{
            "nodes": [
                { "component": "src/routes/+page.svelte" },
                {
                    "component": "src/routes/about/+page.svelte",
                    "server": "src/routes/about/+page.server.js"
                }
            ],
            "routes": [
                { "id": "/", "leaf": { "component": "src/routes/+page.svelte" } },
                {
                    "id": "/about",
                    "leaf": {
                        "component": "src/routes/about/+page.svelte",
                        "server": "src/routes/about/+page.server.js"
                    }
                },
                { "id": "/api", "endpoint": "src/routes/api/+server.js" }
            ],
            "matchers": { "slug": "src/params/slug.js" }
        }"#,
    )
    .expect("valid route manifest")
}

pub fn page_node(component: &str) -> RouteNode {
    RouteNode {
        component: Some(component.to_string()),
        ..RouteNode::default()
    }
}

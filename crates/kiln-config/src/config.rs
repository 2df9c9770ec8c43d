//! Typed settings consumed by the server build.

use std::path::PathBuf;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Top-level build configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KilnConfig {
    pub paths: PathsConfig,
    pub env: EnvConfig,
    /// Stylesheets strictly smaller than this many bytes are inlined into
    /// the rendered page. `0` disables inlining.
    pub inline_style_threshold: u64,
    pub csp: CspConfig,
    pub csrf: CsrfConfig,
    /// Whether a service worker is registered by the client.
    pub service_worker: bool,
    pub version: VersionConfig,
    pub files: FilesConfig,
    /// Build output root, relative to the project root.
    pub out_dir: PathBuf,
    /// Client build output, relative to `out_dir`. Inlined stylesheets are
    /// read from here.
    pub client_dir: PathBuf,
}

impl Default for KilnConfig {
    fn default() -> Self {
        Self {
            paths: PathsConfig::default(),
            env: EnvConfig::default(),
            inline_style_threshold: 0,
            csp: CspConfig::default(),
            csrf: CsrfConfig::default(),
            service_worker: false,
            version: VersionConfig::default(),
            files: FilesConfig::default(),
            out_dir: PathBuf::from(".kiln/output"),
            client_dir: PathBuf::from("client"),
        }
    }
}

impl KilnConfig {
    /// Directory generated server modules are written to.
    pub fn server_out_dir(&self) -> PathBuf {
        self.out_dir.join("server")
    }

    /// Directory emitted client assets (stylesheets, fonts) live in.
    pub fn client_out_dir(&self) -> PathBuf {
        self.out_dir.join(&self.client_dir)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Mount point of the app, `""` or `/something` without trailing slash.
    pub base: String,
    /// Absolute URL assets are served from, `""` to serve them from `base`.
    pub assets: String,
    /// Whether rendered pages reference assets with relative URLs.
    pub relative: bool,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            base: String::new(),
            assets: String::new(),
            relative: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvConfig {
    /// Variables starting with this prefix may be exposed to the client.
    pub public_prefix: String,
    /// Variables starting with this prefix are server-only.
    pub private_prefix: String,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            public_prefix: "PUBLIC_".to_string(),
            private_prefix: String::new(),
        }
    }
}

/// How CSP source expressions for inline content are produced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CspMode {
    /// Hashes for prerendered pages, nonces otherwise.
    #[default]
    Auto,
    Hash,
    Nonce,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CspConfig {
    pub mode: CspMode,
    /// Directive name -> sources, e.g. `"script-src": ["self"]`.
    pub directives: IndexMap<String, Vec<String>>,
    pub report_only: IndexMap<String, Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CsrfConfig {
    /// Reject cross-origin form submissions.
    pub check_origin: bool,
    /// Origins allowed to submit forms despite `check_origin`.
    pub trusted_origins: Vec<String>,
}

impl Default for CsrfConfig {
    fn default() -> Self {
        Self {
            check_origin: true,
            trusted_origins: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VersionConfig {
    /// Deployment version token. Defaults to the build start time in
    /// milliseconds.
    pub name: String,
}

impl Default for VersionConfig {
    fn default() -> Self {
        Self {
            name: chrono::Utc::now().timestamp_millis().to_string(),
        }
    }
}

/// Project-relative locations of the files the build reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilesConfig {
    pub app_template: PathBuf,
    pub error_template: PathBuf,
    /// Server hooks module without extension; `.js` and `.ts` are tried.
    pub hooks_server: PathBuf,
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            app_template: PathBuf::from("src/app.html"),
            error_template: PathBuf::from("src/error.html"),
            hooks_server: PathBuf::from("src/hooks.server"),
        }
    }
}

//! Configuration for the kiln server build.
//!
//! [`KilnConfig`] is loaded in layers: built-in defaults, then `kiln.toml`
//! or `kiln.json` from the project root, then `KILN_`-prefixed environment
//! variables (nested keys separated by `__`, e.g. `KILN_PATHS__BASE=/docs`).

pub mod config;
pub mod error;
pub mod loading;
pub mod validation;

pub use config::{
    CspConfig, CspMode, CsrfConfig, EnvConfig, FilesConfig, KilnConfig, PathsConfig,
    VersionConfig,
};
pub use error::{ConfigError, Result};
pub use loading::{CONFIG_FILE_NAMES, ConfigLoader, DEFAULT_ENV_PREFIX};

//! Layered configuration loading.
//!
//! Priority, lowest first: defaults, config file, environment.

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format as _, Json, Serialized, Toml, Yaml},
};
use tracing::debug;

use crate::config::KilnConfig;
use crate::error::{ConfigError, Result};

/// Config files looked for in the project root, in order.
pub const CONFIG_FILE_NAMES: [&str; 4] = ["kiln.toml", "kiln.json", "kiln.yaml", "kiln.yml"];

pub const DEFAULT_ENV_PREFIX: &str = "KILN_";

/// Builds a [`KilnConfig`] from defaults, a config file and the environment.
///
/// # Example
///
/// ```no_run
/// use kiln_config::ConfigLoader;
///
/// let config = ConfigLoader::new(".").load().unwrap();
/// println!("writing to {}", config.server_out_dir().display());
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    root: PathBuf,
    file: Option<PathBuf>,
    env_prefix: String,
}

impl ConfigLoader {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            file: None,
            env_prefix: DEFAULT_ENV_PREFIX.to_string(),
        }
    }

    /// Use this file instead of discovering one. Relative paths are taken
    /// from the root.
    pub fn file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file = Some(path.into());
        self
    }

    pub fn env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    /// Config file that will be read, if any.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NotFound`] if an explicit file was given and
    /// does not exist.
    pub fn find(&self) -> Result<Option<PathBuf>> {
        if let Some(file) = &self.file {
            let path = self.root.join(file);
            if !path.is_file() {
                return Err(ConfigError::NotFound(path));
            }
            return Ok(Some(path));
        }

        Ok(CONFIG_FILE_NAMES
            .iter()
            .map(|name| self.root.join(name))
            .find(|path| path.is_file()))
    }

    /// The merged provider chain, before extraction.
    pub fn figment(&self) -> Result<Figment> {
        let mut figment = Figment::new().merge(Serialized::defaults(KilnConfig::default()));

        if let Some(path) = self.find()? {
            debug!(path = %path.display(), "loading config file");
            figment = match path.extension().and_then(|ext| ext.to_str()) {
                Some("toml") => figment.merge(Toml::file(&path)),
                Some("json") => figment.merge(Json::file(&path)),
                Some("yaml" | "yml") => figment.merge(Yaml::file(&path)),
                _ => return Err(ConfigError::UnsupportedFormat(path)),
            };
        }

        Ok(figment.merge(Env::prefixed(&self.env_prefix).split("__")))
    }

    /// Load and validate.
    pub fn load(&self) -> Result<KilnConfig> {
        let config: KilnConfig = self.figment()?.extract()?;
        config.validate()?;
        Ok(config)
    }
}

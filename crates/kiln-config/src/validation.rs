//! Schema validation for loaded configuration.

use crate::config::KilnConfig;
use crate::error::{ConfigError, Result};

impl KilnConfig {
    /// Check values the type system cannot express.
    pub fn validate(&self) -> Result<()> {
        let base = &self.paths.base;
        if !base.is_empty() && (!base.starts_with('/') || base.ends_with('/')) {
            return Err(ConfigError::invalid(
                "paths.base",
                format!("{base:?} must be empty or a root-relative path"),
            )
            .with_hint("Use a value like \"/docs\": leading slash, no trailing slash"));
        }

        let assets = &self.paths.assets;
        if !assets.is_empty() {
            let absolute = assets.starts_with("http://") || assets.starts_with("https://");
            if !absolute || assets.ends_with('/') {
                return Err(ConfigError::invalid(
                    "paths.assets",
                    format!("{assets:?} must be empty or an absolute URL"),
                )
                .with_hint("Use a value like \"https://cdn.example.com\" with no trailing slash"));
            }
        }

        if self.env.public_prefix == self.env.private_prefix {
            return Err(ConfigError::invalid(
                "env.private_prefix",
                format!(
                    "public and private prefixes are both {:?}",
                    self.env.public_prefix
                ),
            )
            .with_hint("Give server-only variables a distinct prefix"));
        }

        if self.version.name.is_empty() {
            return Err(ConfigError::invalid("version.name", "must not be empty"));
        }

        Ok(())
    }
}

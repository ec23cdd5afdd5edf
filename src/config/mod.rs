//! Site configuration management for `marginalia.toml`.
//!
//! # Sections
//!
//! | Section    | Purpose                                        |
//! |------------|------------------------------------------------|
//! | `[site]`   | Directory layout (content, output)             |
//! | `[engine]` | Connection scoring constants                   |
//!
//! # Example
//!
//! ```toml
//! [site]
//! content = "content"
//! output = "public"
//!
//! [engine]
//! max_connections = 6
//! min_primary_connections = 3
//! ```

pub mod defaults;
mod engine;
mod error;
mod site;

pub use engine::EngineConfig;
pub use error::ConfigError;
pub use site::SiteSection;

use crate::cli::Cli;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Root configuration structure representing marginalia.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SiteConfig {
    #[serde(default)]
    pub site: SiteSection,

    #[serde(default)]
    pub engine: EngineConfig,

    /// Resolved config file path (not part of the TOML).
    #[serde(skip)]
    pub config_path: PathBuf,
}

impl SiteConfig {
    /// Load configuration from a TOML file.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        let mut config: Self = toml::from_str(&raw)?;
        config.config_path = path.to_path_buf();
        Ok(config)
    }

    /// Update configuration with CLI arguments.
    ///
    /// CLI flags win over file values; paths become relative to `--root`.
    pub fn update_with_cli(&mut self, cli: &Cli) {
        Self::update_option(&mut self.site.content, cli.content.as_ref());
        Self::update_option(&mut self.site.output, cli.output.as_ref());

        if let Some(root) = cli.root.as_deref() {
            self.site.content = root.join(&self.site.content);
            self.site.output = root.join(&self.site.output);
        }
    }

    /// Update config option if CLI value is provided
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    /// Validate configuration before running a command.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.engine.max_connections == 0 {
            return Err(ConfigError::Validation(
                "engine.max_connections must be >= 1".into(),
            ));
        }
        if self.engine.explicit_weight == 0 || self.engine.source_weight == 0 {
            return Err(ConfigError::Validation(
                "engine weights must be non-zero".into(),
            ));
        }
        if self.engine.explicit_weight <= self.engine.source_weight {
            return Err(ConfigError::Validation(format!(
                "engine.explicit_weight ({}) must exceed engine.source_weight ({})",
                self.engine.explicit_weight, self.engine.source_weight
            )));
        }
        if !self.site.content.is_dir() {
            return Err(ConfigError::Validation(format!(
                "content directory not found: {}",
                self.site.content.display()
            )));
        }
        Ok(())
    }
}

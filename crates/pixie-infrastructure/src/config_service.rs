//! Configuration service implementation.
//!
//! Loads [`AppConfig`] from `~/.config/pixie/config.toml` (or an explicit
//! path). A missing file means defaults; a malformed one is an error.

use crate::paths::PixiePaths;
use pixie_core::config::AppConfig;
use pixie_core::error::{PixieError, Result};
use std::fs;
use std::io::ErrorKind as IoErrorKind;
use std::path::{Path, PathBuf};

const STARTER_HEADER: &str = "\
# PixieAI configuration.
#
# Every key is optional; remove a line to fall back to its default.
# [model]       inference server address and model id
# [generation]  sampling parameters
# [search]      web search limits and the initial toggle state
# [persona]     assistant name and instructions

";

/// Loads the application configuration from one file.
#[derive(Debug, Clone)]
pub struct ConfigService {
    path: PathBuf,
}

impl ConfigService {
    /// Uses the default config file location.
    pub fn new() -> Result<Self> {
        Ok(Self::with_path(PixiePaths::config_file()?))
    }

    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the configuration file.
    ///
    /// # Errors
    ///
    /// I/O errors other than "not found", and TOML parse errors
    /// ([`PixieError::Serialization`]).
    pub fn load(&self) -> Result<AppConfig> {
        Self::load_from(&self.path)
    }

    /// Writes a starter config file with every default spelled out.
    ///
    /// Refuses to overwrite an existing file.
    pub fn save_default(&self) -> Result<PathBuf> {
        if self.path.exists() {
            return Err(PixieError::config(format!(
                "{} already exists",
                self.path.display()
            )));
        }
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let body = toml::to_string_pretty(&AppConfig::default())?;
        fs::write(&self.path, format!("{STARTER_HEADER}{body}"))?;
        tracing::info!("[ConfigService] Wrote starter config to {}", self.path.display());
        Ok(self.path.clone())
    }

    fn load_from(path: &Path) -> Result<AppConfig> {
        match fs::read_to_string(path) {
            Ok(text) => {
                let config: AppConfig = toml::from_str(&text)?;
                tracing::debug!("[ConfigService] Loaded {}", path.display());
                Ok(config)
            }
            Err(err) if err.kind() == IoErrorKind::NotFound => {
                tracing::debug!("[ConfigService] {} not found, using defaults", path.display());
                Ok(AppConfig::default())
            }
            Err(err) => Err(err.into()),
        }
    }
}

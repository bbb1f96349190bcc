//! Path management for pixie configuration and data files.
//!
//! # Directory Structure
//!
//! ```text
//! ~/.config/pixie/             # Config directory
//! └── config.toml              # Application configuration
//!
//! ~/.local/share/pixie/        # Data directory
//! └── logs/                    # Application logs
//!     └── pixie.log.YYYY-MM-DD
//! ```

use pixie_core::error::{PixieError, Result};
use std::path::PathBuf;

const APP_DIR: &str = "pixie";

/// Resolves platform directories (XDG on Linux, the native locations
/// elsewhere).
pub struct PixiePaths;

impl PixiePaths {
    /// Returns the pixie configuration directory (e.g. `~/.config/pixie/`).
    pub fn config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or_else(|| PixieError::config("Cannot find config directory"))
    }

    /// Returns the pixie data directory (e.g. `~/.local/share/pixie/`).
    pub fn data_dir() -> Result<PathBuf> {
        dirs::data_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or_else(|| PixieError::config("Cannot find data directory"))
    }

    pub fn config_file() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    pub fn log_dir() -> Result<PathBuf> {
        Ok(Self::data_dir()?.join("logs"))
    }
}

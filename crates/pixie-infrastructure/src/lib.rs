//! Infrastructure layer: file locations, configuration loading and the
//! logging bootstrap.

pub mod config_service;
pub mod logging;
pub mod paths;

pub use config_service::ConfigService;
pub use paths::PixiePaths;

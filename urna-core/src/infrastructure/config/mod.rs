mod env;
mod loader;
mod types;
pub mod validation;

pub use env::{resolve_config_path, resolve_data_dir};
pub use loader::{
    load_config, load_config_from_file, load_config_from_file_with_profile, load_config_with_profile, to_toml_string, CONFIG_FILE_NAME,
};
pub use types::*;

use crate::foundation::UrnaError;
use std::path::Path;

/// Resolves the data dir and config path from the environment, loads, and validates.
pub fn load_app_config() -> Result<AppConfig, UrnaError> {
    let data_dir = resolve_data_dir()?;
    let config_path = resolve_config_path(&data_dir)?;
    let config = load_config_from_file(&config_path, &data_dir)?;
    config.validate().map_err(|errors| UrnaError::ConfigError(format!("validation failed: {:?}", errors)))?;
    Ok(config)
}

pub fn load_app_config_from_path(path: &Path, profile: Option<&str>) -> Result<AppConfig, UrnaError> {
    let data_dir = resolve_data_dir()?;
    let config = match profile {
        Some(profile) => load_config_from_file_with_profile(path, &data_dir, profile)?,
        None => load_config_from_file(path, &data_dir)?,
    };
    config.validate().map_err(|errors| UrnaError::ConfigError(format!("validation failed: {:?}", errors)))?;
    Ok(config)
}

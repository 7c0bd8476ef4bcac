//! Configuration loader using Figment for layered config management.
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. TOML config file
//! 3. Profile overrides from `[profiles.<name>]`
//! 4. Environment variables (URNA_* prefix)

use crate::foundation::UrnaError;
use crate::infrastructure::config::types::AppConfig;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::value::Dict;
use figment::{Figment, Profile};
use log::{debug, info};
use std::path::Path;

/// Default config file name inside the data dir.
pub const CONFIG_FILE_NAME: &str = "urna-config.toml";

/// Environment variable prefix for config overrides.
///
/// Example: `URNA_VOTING__RECEIPT_TOKEN_BYTES` -> `voting.receipt_token_bytes`
const ENV_PREFIX: &str = "URNA_";

/// Load configuration from the default file in `data_dir` (`urna-config.toml`).
pub fn load_config(data_dir: &Path) -> Result<AppConfig, UrnaError> {
    load_config_from_file(&data_dir.join(CONFIG_FILE_NAME), data_dir)
}

/// Load configuration from the default file in `data_dir` with a profile.
pub fn load_config_with_profile(data_dir: &Path, profile: &str) -> Result<AppConfig, UrnaError> {
    load_config_from_file_with_profile(&data_dir.join(CONFIG_FILE_NAME), data_dir, profile)
}

/// Load configuration from a specific file path.
pub fn load_config_from_file(path: &Path, data_dir: &Path) -> Result<AppConfig, UrnaError> {
    info!("loading configuration path={} data_dir={}", path.display(), data_dir.display());
    let figment = figment_base(path).merge(env_provider());
    let mut config: AppConfig =
        figment.extract().map_err(|e| UrnaError::ConfigError(format!("config extraction failed: {e}")))?;
    postprocess(&mut config, data_dir);
    debug!(
        "configuration loaded backend={} data_dir={} audit_file={:?} structured_audit={}",
        config.storage.backend, config.storage.data_dir, config.audit.file_path, config.audit.structured_log
    );
    Ok(config)
}

/// Load configuration from a specific file path with profile overrides.
pub fn load_config_from_file_with_profile(path: &Path, data_dir: &Path, profile: &str) -> Result<AppConfig, UrnaError> {
    info!("loading configuration with profile path={} data_dir={} profile={}", path.display(), data_dir.display(), profile);

    // Extract once to read `profiles.<name>` from the file.
    let base: AppConfig =
        figment_base(path).extract().map_err(|e| UrnaError::ConfigError(format!("config extraction failed: {e}")))?;
    let overrides = profile_overrides(&base, profile)?;

    let figment = figment_base(path).merge(Serialized::from(overrides, Profile::Default)).merge(env_provider());
    let mut config: AppConfig = figment
        .extract()
        .map_err(|e| UrnaError::ConfigError(format!("config extraction failed for profile '{profile}': {e}")))?;
    postprocess(&mut config, data_dir);
    debug!("configuration loaded with profile profile={} backend={} data_dir={}", profile, config.storage.backend, config.storage.data_dir);
    Ok(config)
}

/// Renders the effective configuration (without profiles) as TOML.
pub fn to_toml_string(config: &AppConfig) -> Result<String, UrnaError> {
    Ok(toml::to_string_pretty(config)?)
}

fn figment_base(path: &Path) -> Figment {
    let mut figment = Figment::new().merge(Serialized::defaults(AppConfig::default()));
    if path.exists() {
        figment = figment.merge(Toml::file(path));
    } else {
        debug!("configuration file missing; using defaults and env only path={}", path.display());
    }
    figment
}

fn env_provider() -> Env {
    // Path-style variables are read directly by the resolvers, not as config keys.
    Env::prefixed(ENV_PREFIX).ignore(&["DATA_DIR", "CONFIG_PATH", "TEST_NOW_NANOS"]).split("__")
}

fn profile_overrides(config: &AppConfig, profile: &str) -> Result<Dict, UrnaError> {
    let profiles = config.profiles.as_ref().ok_or_else(|| UrnaError::ConfigError("no profiles section in config".to_string()))?;
    profiles.get(profile).cloned().ok_or_else(|| UrnaError::ConfigError(format!("profile '{profile}' not found in config")))
}

fn postprocess(config: &mut AppConfig, data_dir: &Path) {
    if config.storage.data_dir.trim().is_empty() {
        config.storage.data_dir = data_dir.to_string_lossy().to_string();
    }
    config.crypto.vote_secret_hex = config.crypto.vote_secret_hex.trim().to_string();
    if let Some(path) = config.audit.file_path.as_ref() {
        if path.trim().is_empty() {
            config.audit.file_path = None;
        }
    }
}

use crate::foundation::{UrnaError, CONFIG_PATH_ENV_VAR, DATA_DIR_ENV_VAR};
use crate::infrastructure::config::loader::CONFIG_FILE_NAME;
use std::path::{Path, PathBuf};

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().and_then(|value| {
        let trimmed = value.trim().to_string();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed)
        }
    })
}

pub fn resolve_config_path(data_dir: &Path) -> Result<PathBuf, UrnaError> {
    if let Some(value) = non_empty_env(CONFIG_PATH_ENV_VAR) {
        return Ok(PathBuf::from(value));
    }
    Ok(data_dir.join(CONFIG_FILE_NAME))
}

pub fn resolve_data_dir() -> Result<PathBuf, UrnaError> {
    if let Some(value) = non_empty_env(DATA_DIR_ENV_VAR) {
        return Ok(PathBuf::from(value));
    }
    let cwd = std::env::current_dir()
        .map_err(|err| UrnaError::StorageError { operation: "env::current_dir".to_string(), details: err.to_string() })?;
    Ok(cwd.join(".urna"))
}

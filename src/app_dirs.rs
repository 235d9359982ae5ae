//! Where the session manager keeps its config file and logs.
//!
//! Everything lives in one `.comment-predictor` folder under the OS config
//! directory, or under `COMMENT_PREDICTOR_CONFIG_HOME` when that is set.

use std::{ffi::OsString, path::PathBuf};

use directories::BaseDirs;
use thiserror::Error;

pub const APP_DIR_NAME: &str = ".comment-predictor";
const LOGS_DIR_NAME: &str = "logs";

/// Environment variable that replaces the OS config root.
pub const CONFIG_HOME_ENV: &str = "COMMENT_PREDICTOR_CONFIG_HOME";

#[derive(Debug, Error)]
pub enum AppDirError {
    #[error("No config directory available; set {CONFIG_HOME_ENV}")]
    NoBaseDir,
    #[error("Failed to create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// The `.comment-predictor` folder, created on first use.
pub fn app_root_dir() -> Result<PathBuf, AppDirError> {
    let base = resolve_base(std::env::var_os(CONFIG_HOME_ENV), || {
        BaseDirs::new().map(|dirs| dirs.config_dir().to_path_buf())
    })?;
    ensure_dir(base.join(APP_DIR_NAME))
}

pub fn logs_dir() -> Result<PathBuf, AppDirError> {
    ensure_dir(app_root_dir()?.join(LOGS_DIR_NAME))
}

/// A non-empty override wins; otherwise ask the platform.
fn resolve_base(
    override_home: Option<OsString>,
    platform: impl FnOnce() -> Option<PathBuf>,
) -> Result<PathBuf, AppDirError> {
    match override_home {
        Some(home) if !home.is_empty() => Ok(PathBuf::from(home)),
        _ => platform().ok_or(AppDirError::NoBaseDir),
    }
}

fn ensure_dir(path: PathBuf) -> Result<PathBuf, AppDirError> {
    if !path.is_dir() {
        std::fs::create_dir_all(&path).map_err(|source| AppDirError::CreateDir {
            path: path.clone(),
            source,
        })?;
    }
    Ok(path)
}
